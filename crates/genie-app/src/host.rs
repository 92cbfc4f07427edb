//! Handshake with an embedding host (a launcher or social client) that
//! wants to know when the game is ready and may supply the player's identity.
//!
//! The handshake never blocks play: a missing host and a failing host both
//! resolve to "ready", the latter with the error recorded for display.

use core::fmt;
use tracing::warn;

const HOST_USER_ENV: &str = "GENIE_HOST_USER";

/// Identity reported by the host, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostUser {
    pub username: String,
    pub display_name: Option<String>,
}

impl HostUser {
    pub fn greeting_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.username)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    Handshake(String),
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostError::Handshake(message) => write!(f, "host handshake failed: {message}"),
        }
    }
}

impl std::error::Error for HostError {}

pub trait HostEnvironment {
    /// One-shot readiness signal; returns the host's user when it has one.
    fn ready(&self) -> Result<Option<HostUser>, HostError>;
}

/// Host described by `GENIE_HOST_USER` (`username` or `username:Display Name`).
#[derive(Debug, Clone, Default)]
pub struct EnvHost {
    raw_user: Option<String>,
}

impl EnvHost {
    /// `None` when the variable is unset, meaning no host is present.
    pub fn from_env() -> Option<Self> {
        Self::from_reader(|key| std::env::var(key).ok())
    }

    fn from_reader<F>(mut read: F) -> Option<Self>
    where
        F: FnMut(&str) -> Option<String>,
    {
        read(HOST_USER_ENV).map(|raw| Self {
            raw_user: Some(raw),
        })
    }
}

impl HostEnvironment for EnvHost {
    fn ready(&self) -> Result<Option<HostUser>, HostError> {
        let Some(raw) = self.raw_user.as_deref() else {
            return Ok(None);
        };

        let (username, display_name) = match raw.split_once(':') {
            Some((user, display)) => (user.trim(), Some(display.trim())),
            None => (raw.trim(), None),
        };
        if username.is_empty() {
            return Err(HostError::Handshake(format!(
                "{HOST_USER_ENV} does not name a user"
            )));
        }

        Ok(Some(HostUser {
            username: username.to_string(),
            display_name: display_name
                .filter(|name| !name.is_empty())
                .map(str::to_string),
        }))
    }
}

/// Outcome of [`await_ready`]. `ready` is always set once the call returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadyState {
    pub ready: bool,
    pub user: Option<HostUser>,
    pub error: Option<HostError>,
}

pub fn await_ready(host: Option<&dyn HostEnvironment>) -> ReadyState {
    let Some(host) = host else {
        return ReadyState {
            ready: true,
            user: None,
            error: None,
        };
    };

    match host.ready() {
        Ok(user) => ReadyState {
            ready: true,
            user,
            error: None,
        },
        Err(err) => {
            warn!(target: "genie_app::host", error = %err, "continuing without host");
            ReadyState {
                ready: true,
                user: None,
                error: Some(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingHost;

    impl HostEnvironment for FailingHost {
        fn ready(&self) -> Result<Option<HostUser>, HostError> {
            Err(HostError::Handshake("bridge closed".into()))
        }
    }

    fn env_host(value: Option<&str>) -> Option<EnvHost> {
        EnvHost::from_reader(|key| {
            assert_eq!(key, HOST_USER_ENV);
            value.map(str::to_string)
        })
    }

    #[test]
    fn missing_host_is_ready() {
        let state = await_ready(None);
        assert!(state.ready);
        assert_eq!(state.user, None);
        assert_eq!(state.error, None);
        assert!(env_host(None).is_none());
    }

    #[test]
    fn host_user_is_reported() {
        let host = env_host(Some("djinn:Jasmine")).unwrap();
        let state = await_ready(Some(&host));
        let user = state.user.expect("user present");
        assert_eq!(user.username, "djinn");
        assert_eq!(user.greeting_name(), "Jasmine");

        let host = env_host(Some("djinn")).unwrap();
        let user = await_ready(Some(&host)).user.unwrap();
        assert_eq!(user.display_name, None);
        assert_eq!(user.greeting_name(), "djinn");
    }

    #[test]
    fn failing_handshake_degrades_to_ready() {
        let state = await_ready(Some(&FailingHost));
        assert!(state.ready);
        assert_eq!(state.user, None);
        assert_eq!(
            state.error.map(|err| err.to_string()),
            Some("host handshake failed: bridge closed".to_string())
        );

        let host = env_host(Some("  ")).unwrap();
        let state = await_ready(Some(&host));
        assert!(state.ready);
        assert!(matches!(state.error, Some(HostError::Handshake(_))));
    }
}
