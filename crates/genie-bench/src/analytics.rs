use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};
use thiserror::Error;

use crate::config::{BenchConfig, PlayerKind};
use crate::runner::GameOutcome;

const CONFIDENCE_LEVEL: f64 = 0.95;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("player '{0}' defined in results but missing from configuration")]
    UnknownPlayer(String),
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

pub struct AnalyticsCollector {
    players: HashMap<String, PlayerAccumulator>,
    player_order: Vec<String>,
    question_cap: u32,
}

impl AnalyticsCollector {
    pub fn new(config: &BenchConfig) -> Self {
        let mut players = HashMap::new();
        let mut order = Vec::new();
        for player in &config.players {
            players.insert(
                player.name.clone(),
                PlayerAccumulator::new(player.name.clone(), player.kind),
            );
            order.push(player.name.clone());
        }

        Self {
            players,
            player_order: order,
            question_cap: config.selector.params().question_cap,
        }
    }

    pub fn record_game(&mut self, outcome: &GameOutcome) -> Result<(), AnalyticsError> {
        let acc = self
            .players
            .get_mut(&outcome.player)
            .ok_or_else(|| AnalyticsError::UnknownPlayer(outcome.player.clone()))?;
        acc.record(outcome);
        Ok(())
    }

    pub fn finalize(mut self) -> AnalyticsSummary {
        let z = z_score(CONFIDENCE_LEVEL);
        let players = self
            .player_order
            .iter()
            .filter_map(|name| self.players.remove(name))
            .map(|acc| acc.into_report(z))
            .collect();

        AnalyticsSummary {
            players,
            question_cap: self.question_cap,
        }
    }
}

struct PlayerAccumulator {
    name: String,
    kind: PlayerKind,
    games: u32,
    wins: u32,
    wrong_guesses: u32,
    exhausted: u32,
    total_questions: u64,
}

impl PlayerAccumulator {
    fn new(name: String, kind: PlayerKind) -> Self {
        Self {
            name,
            kind,
            games: 0,
            wins: 0,
            wrong_guesses: 0,
            exhausted: 0,
            total_questions: 0,
        }
    }

    fn record(&mut self, outcome: &GameOutcome) {
        self.games += 1;
        self.total_questions += u64::from(outcome.questions_asked);
        if outcome.won {
            self.wins += 1;
        } else if outcome.guessed.is_some() {
            self.wrong_guesses += 1;
        } else {
            self.exhausted += 1;
        }
    }

    fn into_report(self, z: f64) -> PlayerReport {
        let win_rate = if self.games == 0 {
            0.0
        } else {
            self.wins as f64 / self.games as f64
        };
        let avg_questions = if self.games == 0 {
            0.0
        } else {
            self.total_questions as f64 / self.games as f64
        };

        PlayerReport {
            name: self.name,
            kind: self.kind,
            games: self.games as usize,
            wins: self.wins as usize,
            wrong_guesses: self.wrong_guesses as usize,
            exhausted: self.exhausted as usize,
            win_rate,
            ci95: proportion_interval(self.wins, self.games, z),
            avg_questions,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerReport {
    pub name: String,
    pub kind: PlayerKind,
    pub games: usize,
    pub wins: usize,
    /// Games lost on a rejected guess.
    pub wrong_guesses: usize,
    /// Games lost because every candidate was eliminated.
    pub exhausted: usize,
    pub win_rate: f64,
    pub ci95: (f64, f64),
    pub avg_questions: f64,
}

#[derive(Debug, Serialize)]
pub struct AnalyticsSummary {
    pub players: Vec<PlayerReport>,
    pub question_cap: u32,
}

impl AnalyticsSummary {
    pub fn write_markdown(&self, path: impl AsRef<Path>) -> Result<(), AnalyticsError> {
        let mut rows = String::new();
        rows.push_str("# Self-play Summary\n\n");
        rows.push_str(&format!(
            "Question cap: {} questions per game\n\n",
            self.question_cap
        ));
        rows.push_str("| Player | Kind | Games | Wins | Win % | 95% CI | Wrong guesses | Exhausted | Avg questions |\n");
        rows.push_str("|--------|------|-------|------|-------|--------|---------------|-----------|---------------|\n");
        for player in &self.players {
            rows.push_str(&format!(
                "| {name} | {kind:?} | {games} | {wins} | {win:.1}% | [{ci_low:.1}%, {ci_high:.1}%] | {wrong} | {exhausted} | {questions:.2} |\n",
                name = player.name,
                kind = player.kind,
                games = player.games,
                wins = player.wins,
                win = player.win_rate * 100.0,
                ci_low = player.ci95.0 * 100.0,
                ci_high = player.ci95.1 * 100.0,
                wrong = player.wrong_guesses,
                exhausted = player.exhausted,
                questions = player.avg_questions,
            ));
        }
        fs::write(path.as_ref(), rows).map_err(|e| AnalyticsError::Io {
            context: "writing summary markdown",
            source: e,
        })?;
        Ok(())
    }
}

/// Two-sided standard normal quantile for `level` (1.96 at 95%).
fn z_score(level: f64) -> f64 {
    match Normal::new(0.0, 1.0) {
        Ok(normal) => normal.inverse_cdf(0.5 + level / 2.0),
        Err(_) => 1.96,
    }
}

/// Normal-approximation interval for a win proportion, clamped to [0, 1].
fn proportion_interval(wins: u32, games: u32, z: f64) -> (f64, f64) {
    if games == 0 {
        return (0.0, 0.0);
    }
    let n = games as f64;
    let p = wins as f64 / n;
    let margin = z * (p * (1.0 - p) / n).sqrt();
    ((p - margin).max(0.0), (p + margin).min(1.0))
}
