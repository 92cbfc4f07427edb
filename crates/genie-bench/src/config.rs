use genie_bot::selector::{MAX_QUESTION_CAP, SelectorParams};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::Level;

const DEFAULT_ROUNDS: usize = 1;
const RUN_ID_ALLOWED: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789._-";

/// Root benchmark configuration loaded from YAML.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BenchConfig {
    pub run_id: String,
    pub games: GamesConfig,
    /// Roster JSON to play against; the bundled table when absent.
    #[serde(default)]
    pub roster: Option<PathBuf>,
    pub players: Vec<PlayerConfig>,
    #[serde(default)]
    pub selector: SelectorOverrides,
    pub outputs: OutputsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl BenchConfig {
    /// Load configuration from a YAML file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_buf = path.to_path_buf();
        let file = File::open(path).map_err(|source| ConfigError::Read {
            source,
            path: path_buf.clone(),
        })?;
        let reader = BufReader::new(file);
        let mut cfg: BenchConfig =
            serde_yaml::from_reader(reader).map_err(|source| ConfigError::Parse {
                source,
                path: path_buf.clone(),
            })?;
        cfg.validate().map_err(|source| ConfigError::Invalid {
            path: path_buf,
            source,
        })?;
        Ok(cfg)
    }

    /// Validate the configuration without performing I/O.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        validate_run_id(&self.run_id)?;
        self.games.validate()?;
        self.selector.validate()?;
        self.outputs.validate(&self.run_id)?;
        self.logging.normalize();
        validate_players(&mut self.players)?;
        Ok(())
    }

    /// Resolve output templates (e.g., `{run_id}` placeholders) into concrete paths.
    pub fn resolved_outputs(&self) -> ResolvedOutputs {
        ResolvedOutputs {
            jsonl: resolve_template(&self.run_id, &self.outputs.jsonl),
            summary_md: resolve_template(&self.run_id, &self.outputs.summary_md),
        }
    }
}

/// How many games to play and how to seed them.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct GamesConfig {
    pub seed: Option<u64>,
    /// Passes over the roster; every player plays every candidate once per round.
    #[serde(default = "default_rounds")]
    pub rounds: usize,
    /// Visit secrets in a seeded random order instead of roster order.
    #[serde(default)]
    pub shuffle_roster: bool,
}

impl GamesConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.rounds == 0 {
            return Err(ValidationError::InvalidField {
                field: "games.rounds".to_string(),
                message: "number of rounds must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

fn default_rounds() -> usize {
    DEFAULT_ROUNDS
}

/// Definition of a simulated player.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PlayerConfig {
    pub name: String,
    pub kind: PlayerKind,
    #[serde(default)]
    pub params: serde_yaml::Value,
}

impl PlayerConfig {
    /// Reads a float parameter, `None` when it is absent.
    pub fn float_param(&self, key: &str) -> Result<Option<f64>, ValidationError> {
        match self.params.get(key) {
            None | Some(serde_yaml::Value::Null) => Ok(None),
            Some(value) => value
                .as_f64()
                .map(Some)
                .ok_or_else(|| ValidationError::InvalidField {
                    field: format!("players[{}].params.{key}", self.name),
                    message: "expected a number".to_string(),
                }),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PlayerKind {
    Truthful,
    Hedging,
    Noisy,
    Indifferent,
}

/// Optional overrides applied on top of [`SelectorParams::default`].
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct SelectorOverrides {
    #[serde(default)]
    pub guess_confidence: Option<f64>,
    #[serde(default)]
    pub guess_margin: Option<f64>,
    #[serde(default)]
    pub question_cap: Option<u32>,
    #[serde(default)]
    pub jitter: Option<f64>,
}

impl SelectorOverrides {
    fn validate(&self) -> Result<(), ValidationError> {
        for (label, value) in [
            ("selector.guess_confidence", self.guess_confidence),
            ("selector.guess_margin", self.guess_margin),
        ] {
            if let Some(value) = value.filter(|value| !(0.0..=1.0).contains(value)) {
                return Err(ValidationError::InvalidField {
                    field: label.to_string(),
                    message: format!("{value} is outside [0, 1]"),
                });
            }
        }

        if self
            .question_cap
            .is_some_and(|cap| !(1..=MAX_QUESTION_CAP).contains(&cap))
        {
            return Err(ValidationError::InvalidField {
                field: "selector.question_cap".to_string(),
                message: format!("question cap must be within 1..={MAX_QUESTION_CAP}"),
            });
        }

        if let Some(jitter) = self.jitter.filter(|jitter| !(0.0..=0.5).contains(jitter)) {
            return Err(ValidationError::InvalidField {
                field: "selector.jitter".to_string(),
                message: format!("{jitter} is outside [0, 0.5]"),
            });
        }

        Ok(())
    }

    pub fn params(&self) -> SelectorParams {
        let mut params = SelectorParams::default();
        if let Some(value) = self.guess_confidence {
            params.guess_confidence = value;
        }
        if let Some(value) = self.guess_margin {
            params.guess_margin = value;
        }
        if let Some(value) = self.jitter {
            params.jitter = value;
        }
        match self.question_cap {
            Some(cap) => params.with_question_cap(cap),
            None => params,
        }
    }
}

/// Output artifact configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OutputsConfig {
    pub jsonl: String,
    pub summary_md: String,
}

impl OutputsConfig {
    fn validate(&self, run_id: &str) -> Result<(), ValidationError> {
        for (label, value) in [
            ("outputs.jsonl", &self.jsonl),
            ("outputs.summary_md", &self.summary_md),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::InvalidField {
                    field: label.to_string(),
                    message: "path must not be empty".to_string(),
                });
            }

            let resolved = resolve_template(run_id, value);
            if resolved.components().count() == 0 {
                return Err(ValidationError::InvalidField {
                    field: label.to_string(),
                    message: "resolved path is invalid".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Logging configuration defaults to disabled structured logs.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enable_structured: bool,
    #[serde(default = "default_tracing_level")]
    pub tracing_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable_structured: false,
            tracing_level: default_tracing_level(),
        }
    }
}

impl LoggingConfig {
    fn normalize(&mut self) {
        if self.tracing_level.trim().is_empty() {
            self.tracing_level = default_tracing_level();
        }
    }

    pub fn level(&self) -> Option<Level> {
        match self.tracing_level.to_ascii_lowercase().as_str() {
            "trace" => Some(Level::TRACE),
            "debug" => Some(Level::DEBUG),
            "info" => Some(Level::INFO),
            "warn" | "warning" => Some(Level::WARN),
            "error" => Some(Level::ERROR),
            _ => None,
        }
    }
}

fn default_tracing_level() -> String {
    "info".to_string()
}

fn validate_run_id(run_id: &str) -> Result<(), ValidationError> {
    if run_id.trim().is_empty() {
        return Err(ValidationError::InvalidField {
            field: "run_id".to_string(),
            message: "run_id must not be empty".to_string(),
        });
    }

    if !run_id.chars().all(|c| RUN_ID_ALLOWED.contains(c)) {
        return Err(ValidationError::InvalidField {
            field: "run_id".to_string(),
            message: "run_id may only contain alphanumeric characters, '.', '_' or '-'".to_string(),
        });
    }

    Ok(())
}

fn validate_players(players: &mut [PlayerConfig]) -> Result<(), ValidationError> {
    if players.is_empty() {
        return Err(ValidationError::InvalidField {
            field: "players".to_string(),
            message: "at least one player must be specified".to_string(),
        });
    }

    let mut seen = HashSet::new();
    for player in players.iter_mut() {
        if player.name.trim().is_empty() {
            return Err(ValidationError::InvalidField {
                field: "players.name".to_string(),
                message: "player name must not be empty".to_string(),
            });
        }

        if !player.name.chars().all(|c| RUN_ID_ALLOWED.contains(c)) {
            return Err(ValidationError::InvalidField {
                field: format!("players[{}].name", player.name),
                message: "player name contains invalid characters".to_string(),
            });
        }

        if !seen.insert(player.name.clone()) {
            return Err(ValidationError::InvalidField {
                field: "players".to_string(),
                message: format!("player name '{}' defined more than once", player.name),
            });
        }

        if player.params.is_null() {
            player.params = serde_yaml::Value::Mapping(Default::default());
        }

        if player.kind == PlayerKind::Noisy {
            let flip_rate = player.float_param("flip_rate")?.unwrap_or(0.0);
            if !(0.0..=1.0).contains(&flip_rate) {
                return Err(ValidationError::InvalidField {
                    field: format!("players[{}].params.flip_rate", player.name),
                    message: format!("{flip_rate} is outside [0, 1]"),
                });
            }
        }
    }

    Ok(())
}

fn resolve_template(run_id: &str, template: &str) -> PathBuf {
    let replaced = template.replace("{run_id}", run_id);
    PathBuf::from(replaced)
}

/// Fully resolved output paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOutputs {
    pub jsonl: PathBuf,
    pub summary_md: PathBuf,
}

/// Errors surfaced when loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        #[source]
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("invalid configuration in {path:?}: {source}")]
    Invalid {
        path: PathBuf,
        source: ValidationError,
    },
}

impl ConfigError {
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. }
            | ConfigError::Parse { path, .. }
            | ConfigError::Invalid { path, .. } => path.as_path(),
        }
    }
}

/// Validation failures captured with contextual metadata.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASIC_YAML: &str = r#"
run_id: "famous_smoke"
games:
  seed: 123
players:
  - name: "truthful"
    kind: "truthful"
  - name: "noisy10"
    kind: "noisy"
    params:
      flip_rate: 0.1
selector:
  question_cap: 12
outputs:
  jsonl: "bench/out/{run_id}/games.jsonl"
  summary_md: "bench/out/{run_id}/summary.md"
logging:
  enable_structured: true
  tracing_level: "debug"
"#;

    #[test]
    fn loads_and_validates_basic_config() {
        let mut cfg: BenchConfig = serde_yaml::from_str(BASIC_YAML).expect("parse yaml");
        cfg.validate().expect("validate");

        assert_eq!(cfg.games.rounds, DEFAULT_ROUNDS);
        assert!(!cfg.games.shuffle_roster);
        assert!(cfg.roster.is_none());
        assert!(cfg.logging.enable_structured);
        assert_eq!(cfg.logging.level(), Some(Level::DEBUG));
        assert_eq!(cfg.players[1].float_param("flip_rate").unwrap(), Some(0.1));
        assert!(cfg.players[0].params.is_mapping());

        let params = cfg.selector.params();
        assert_eq!(params.question_cap, 12);
        assert_eq!(params.guess_confidence, SelectorParams::default().guess_confidence);

        let outputs = cfg.resolved_outputs();
        assert_eq!(
            outputs.jsonl,
            PathBuf::from("bench/out/famous_smoke/games.jsonl")
        );
    }

    #[test]
    fn rejects_duplicate_players() {
        let yaml = BASIC_YAML.replace("name: \"noisy10\"", "name: \"truthful\"");
        let mut cfg: BenchConfig = serde_yaml::from_str(&yaml).expect("parse");
        let err = cfg.validate().expect_err("duplicate players should fail");
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, .. } if field == "players"
        ));
    }

    #[test]
    fn rejects_flip_rate_outside_unit_interval() {
        let yaml = BASIC_YAML.replace("flip_rate: 0.1", "flip_rate: 1.5");
        let mut cfg: BenchConfig = serde_yaml::from_str(&yaml).expect("parse");
        let err = cfg.validate().expect_err("flip rate too large");
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, .. } if field == "players[noisy10].params.flip_rate"
        ));
    }

    #[test]
    fn rejects_out_of_range_question_cap() {
        let yaml = BASIC_YAML.replace("question_cap: 12", "question_cap: 0");
        let mut cfg: BenchConfig = serde_yaml::from_str(&yaml).expect("parse");
        let err = cfg.validate().expect_err("zero cap");
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, .. } if field == "selector.question_cap"
        ));
    }

    #[test]
    fn rejects_invalid_run_id() {
        let yaml = BASIC_YAML.replace("famous_smoke", "famous smoke");
        let mut cfg: BenchConfig = serde_yaml::from_str(&yaml).expect("parse");
        let err = cfg.validate().expect_err("invalid run id");
        assert!(matches!(
            err,
            ValidationError::InvalidField { field, .. } if field == "run_id"
        ));
    }

    #[test]
    fn rejects_zero_rounds() {
        let yaml = BASIC_YAML.replace("seed: 123", "seed: 123\n  rounds: 0");
        let mut cfg: BenchConfig = serde_yaml::from_str(&yaml).expect("parse");
        let err = cfg.validate().expect_err("zero rounds");
        assert!(err.to_string().starts_with("games.rounds"));
    }

    #[test]
    fn outputs_resolve_template_multiple_occurrences() {
        let yaml = BASIC_YAML.replace(
            "bench/out/{run_id}/summary.md",
            "bench/out/{run_id}/{run_id}/summary.md",
        );
        let mut cfg: BenchConfig = serde_yaml::from_str(&yaml).expect("parse");
        cfg.validate().expect("valid");
        assert_eq!(
            cfg.resolved_outputs().summary_md,
            PathBuf::from("bench/out/famous_smoke/famous_smoke/summary.md")
        );
    }
}
