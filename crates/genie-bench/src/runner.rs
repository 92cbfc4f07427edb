use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::analytics::{AnalyticsCollector, AnalyticsError};
use crate::config::{BenchConfig, ResolvedOutputs, ValidationError};
use crate::player::SimulatedPlayer;
use genie_bot::selector::{BalancedSelector, SelectorParams};
use genie_bot::session::{GameSession, SessionError};
use genie_core::belief::AnswerModel;
use genie_core::game::phase::GamePhase;
use genie_core::game::transcript::Turn;
use genie_core::model::roster::{Roster, RosterError};
use rand::seq::SliceRandom;
use rand::{RngCore, SeedableRng, rngs::StdRng};
use serde::Serialize;
use thiserror::Error;
use tracing::{Level, event};

/// Separates the players' answer stream from the genie's own RNG.
const ANSWER_STREAM_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

/// Plays every configured player against every roster candidate.
pub struct BenchRunner {
    config: BenchConfig,
    outputs: ResolvedOutputs,
    roster: Arc<Roster>,
    players: Vec<PlayerBlueprint>,
    params: SelectorParams,
    model: AnswerModel,
    logging_enabled: bool,
}

/// Summary details returned after a run.
pub struct RunSummary {
    pub games_played: usize,
    pub rounds: usize,
    pub rows_written: usize,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
    pub telemetry_path: Option<PathBuf>,
}

/// Result of one simulated game.
#[derive(Debug, Clone)]
pub struct GameOutcome {
    pub player: String,
    pub secret: String,
    pub won: bool,
    pub guessed: Option<String>,
    pub questions_asked: u32,
    pub live_count: usize,
    pub top_confidence: Option<f64>,
    pub top_margin: Option<f64>,
    pub entropy: f64,
    pub turns: Vec<Turn>,
}

#[derive(Debug, Serialize)]
struct GameLogRow<'a> {
    run_id: &'a str,
    game_id: String,
    round: usize,
    game_seed: u64,
    player: &'a str,
    secret: &'a str,
    outcome: &'static str,
    guessed: Option<&'a str>,
    questions_asked: u32,
    live_count: usize,
    top_confidence: Option<f64>,
    top_margin: Option<f64>,
    entropy: f64,
    transcript: &'a [Turn],
}

struct PlayerBlueprint {
    name: String,
    player: SimulatedPlayer,
}

impl BenchRunner {
    /// Build a runner from a validated configuration.
    pub fn new(config: BenchConfig, outputs: ResolvedOutputs) -> Result<Self, RunnerError> {
        let roster = match config.roster.as_ref() {
            Some(path) => Roster::from_path(path)?,
            None => Roster::builtin(),
        };

        let players = config
            .players
            .iter()
            .map(|player| {
                Ok(PlayerBlueprint {
                    name: player.name.clone(),
                    player: SimulatedPlayer::from_config(player)?,
                })
            })
            .collect::<Result<Vec<_>, ValidationError>>()?;

        Ok(Self {
            logging_enabled: config.logging.enable_structured,
            params: config.selector.params(),
            model: AnswerModel::from_env(),
            roster: Arc::new(roster),
            config,
            outputs,
            players,
        })
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Execute every game, streaming JSONL rows to disk.
    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        ensure_parent(self.outputs.jsonl.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;

        let mut writer = BufWriter::new(File::create(&self.outputs.jsonl)?);
        let mut rng = StdRng::seed_from_u64(self.config.games.seed.unwrap_or(0));
        let mut rows_written = 0usize;
        let mut analytics = AnalyticsCollector::new(&self.config);
        let mut secrets: Vec<usize> = (0..self.roster.candidates().len()).collect();

        for round in 0..self.config.games.rounds {
            if self.config.games.shuffle_roster {
                secrets.shuffle(&mut rng);
            }

            for blueprint in &self.players {
                for &secret in &secrets {
                    let game_seed = rng.next_u64();
                    let outcome = self.play_game(blueprint, secret, game_seed)?;
                    analytics.record_game(&outcome)?;
                    write_game_row(
                        &mut writer,
                        &self.config.run_id,
                        rows_written,
                        round,
                        game_seed,
                        &outcome,
                    )?;
                    rows_written += 1;
                }
            }
        }

        writer.flush()?;

        let summary = analytics.finalize();
        summary.write_markdown(&self.outputs.summary_md)?;

        let telemetry_path = if self.logging_enabled {
            let dir = self
                .outputs
                .summary_md
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            Some(dir.join("telemetry.jsonl"))
        } else {
            None
        };

        Ok(RunSummary {
            games_played: rows_written,
            rounds: self.config.games.rounds,
            rows_written,
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
            telemetry_path,
        })
    }

    fn play_game(
        &self,
        blueprint: &PlayerBlueprint,
        secret_index: usize,
        game_seed: u64,
    ) -> Result<GameOutcome, RunnerError> {
        let secret = self.roster.candidate(secret_index);
        let mut session = GameSession::with_components(
            self.roster.clone(),
            game_seed,
            Box::new(BalancedSelector::new(self.params)),
            self.model.clone(),
        );
        let mut answers = StdRng::seed_from_u64(game_seed ^ ANSWER_STREAM_SALT);

        while let Some(question) = session.current_question() {
            let answer = blueprint.player.answer(secret, question, &mut answers);
            session.answer(answer)?;
        }

        let guessed = session.guessed_candidate().map(|c| c.id.clone());
        if let Some(guess) = session.guessed_candidate() {
            let correct = blueprint.player.confirms(secret, guess);
            session.confirm_guess(correct)?;
        }

        let won = match session.phase() {
            GamePhase::Won(_) => true,
            GamePhase::Lost => false,
            other => {
                return Err(RunnerError::game(format!(
                    "game for '{}' stopped while {other}",
                    secret.id
                )));
            }
        };

        let progress = session.progress();
        let metrics = session.metrics();
        let outcome = GameOutcome {
            player: blueprint.name.clone(),
            secret: secret.id.clone(),
            won,
            guessed,
            questions_asked: progress.questions_asked,
            live_count: progress.live_count,
            top_confidence: progress.top_confidence,
            top_margin: metrics.margin,
            entropy: metrics.entropy,
            turns: session.transcript().turns.clone(),
        };

        if self.logging_enabled && tracing::enabled!(Level::INFO) {
            event!(
                target: "genie_bench::game",
                Level::INFO,
                run_id = %self.config.run_id,
                player = %outcome.player,
                secret = %outcome.secret,
                guessed = outcome.guessed.as_deref().unwrap_or("-"),
                won = outcome.won,
                questions = outcome.questions_asked,
                live = outcome.live_count,
                top_confidence = outcome.top_confidence.unwrap_or(0.0),
                game_seed,
            );
        }

        Ok(outcome)
    }
}

fn ensure_parent(path: Option<&Path>) -> Result<(), RunnerError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

fn write_game_row(
    writer: &mut BufWriter<File>,
    run_id: &str,
    game_index: usize,
    round: usize,
    game_seed: u64,
    outcome: &GameOutcome,
) -> Result<(), RunnerError> {
    let row = GameLogRow {
        run_id,
        game_id: format!("G{game_index:05}"),
        round,
        game_seed,
        player: &outcome.player,
        secret: &outcome.secret,
        outcome: if outcome.won { "won" } else { "lost" },
        guessed: outcome.guessed.as_deref(),
        questions_asked: outcome.questions_asked,
        live_count: outcome.live_count,
        top_confidence: outcome.top_confidence,
        top_margin: outcome.top_margin,
        entropy: outcome.entropy,
        transcript: &outcome.turns,
    };

    serde_json::to_writer(&mut *writer, &row)?;
    writer.write_all(b"\n")?;
    Ok(())
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("{0}")]
    Player(#[from] ValidationError),
    #[error("failed to load roster: {0}")]
    Roster(#[from] RosterError),
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failed to serialize log row: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
    #[error("session rejected a move: {0}")]
    Session(#[from] SessionError),
    #[error("game execution failed: {message}")]
    Game { message: String },
    #[error("analytics error: {0}")]
    Analytics(#[from] AnalyticsError),
}

impl RunnerError {
    fn game(message: String) -> Self {
        RunnerError::Game { message }
    }
}
