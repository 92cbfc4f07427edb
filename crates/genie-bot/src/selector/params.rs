/// Tunable selector parameters.
///
/// Defaults reproduce the shipped game feel; every field can be overridden
/// from the environment for tuning runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectorParams {
    /// Top confidence must exceed this before an early guess (default: 0.8)
    pub guess_confidence: f64,

    /// Required lead of the top candidate over the runner-up (default: 0.3)
    pub guess_margin: f64,

    /// Questions after which a guess is forced (default: 15)
    pub question_cap: u32,

    /// Upper bound of the uniform noise added to split scores (default: 0.1)
    pub jitter: f64,
}

pub const DEFAULT_QUESTION_CAP: u32 = 15;
pub const MAX_QUESTION_CAP: u32 = 50;

impl Default for SelectorParams {
    fn default() -> Self {
        Self {
            guess_confidence: 0.8,
            guess_margin: 0.3,
            question_cap: DEFAULT_QUESTION_CAP,
            jitter: 0.1,
        }
    }
}

impl SelectorParams {
    pub fn from_env() -> Self {
        Self::from_reader(|key| std::env::var(key).ok())
    }

    pub fn with_question_cap(mut self, cap: u32) -> Self {
        self.question_cap = cap.clamp(1, MAX_QUESTION_CAP);
        self
    }

    fn from_reader<F>(mut read: F) -> Self
    where
        F: FnMut(&str) -> Option<String>,
    {
        let base = Self::default();

        let guess_confidence = read("GENIE_GUESS_CONFIDENCE")
            .and_then(|raw| raw.trim().parse::<f64>().ok())
            .filter(|value| value.is_finite() && (0.0..=1.0).contains(value))
            .unwrap_or(base.guess_confidence);

        let guess_margin = read("GENIE_GUESS_MARGIN")
            .and_then(|raw| raw.trim().parse::<f64>().ok())
            .filter(|value| value.is_finite() && (0.0..=1.0).contains(value))
            .unwrap_or(base.guess_margin);

        let question_cap = read("GENIE_QUESTION_CAP")
            .and_then(|raw| raw.trim().parse::<u32>().ok())
            .map(|value| value.clamp(1, MAX_QUESTION_CAP))
            .unwrap_or(base.question_cap);

        let jitter = read("GENIE_JITTER")
            .and_then(|raw| raw.trim().parse::<f64>().ok())
            .filter(|value| value.is_finite())
            .map(|value| value.clamp(0.0, 0.5))
            .unwrap_or(base.jitter);

        Self {
            guess_confidence,
            guess_margin,
            question_cap,
            jitter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reader_overrides_and_clamps() {
        let params = SelectorParams::from_reader(|key| match key {
            "GENIE_QUESTION_CAP" => Some("200".into()),
            "GENIE_JITTER" => Some("-1".into()),
            "GENIE_GUESS_CONFIDENCE" => Some("0.9".into()),
            "GENIE_GUESS_MARGIN" => Some("1.5".into()),
            _ => None,
        });
        assert_eq!(params.question_cap, MAX_QUESTION_CAP);
        assert_eq!(params.jitter, 0.0);
        assert_eq!(params.guess_confidence, 0.9);
        assert_eq!(params.guess_margin, 0.3);
    }

    #[test]
    fn missing_env_yields_defaults() {
        assert_eq!(SelectorParams::from_reader(|_| None), SelectorParams::default());
    }

    #[test]
    fn question_cap_never_drops_to_zero() {
        assert_eq!(SelectorParams::default().with_question_cap(0).question_cap, 1);
    }
}
