use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

/// Retry schedule for metadata writes that race room creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, the first one included.
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Delay after failed attempt number `attempt` (1-based): `base_delay * attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(500),
        }
    }
}

/// Who may put themselves on stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelfStagePolicy {
    #[default]
    HostOnly,
    Anyone,
}

impl FromStr for SelfStagePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "host_only" | "host" => Ok(Self::HostOnly),
            "anyone" | "any" => Ok(Self::Anyone),
            other => Err(format!("unknown self-stage policy '{}'", other)),
        }
    }
}

/// Server configuration for the stage endpoints.
#[derive(Debug, Clone)]
pub struct StageConfig {
    pub retry: RetryPolicy,
    pub self_stage: SelfStagePolicy,
    /// Callers presenting this secret may claim host of a room without a host.
    pub host_secret: Option<String>,
    pub bind_addr: SocketAddr,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            self_stage: SelfStagePolicy::default(),
            host_secret: None,
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 7880)),
        }
    }
}

impl StageConfig {
    /// Reads `LIMELIGHT_*` variables. Unset or invalid values keep their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let max_attempts = parse_var(&lookup, "LIMELIGHT_RETRY_ATTEMPTS")
            .filter(|attempts: &u32| *attempts > 0)
            .unwrap_or(defaults.retry.max_attempts);
        let base_delay = parse_var(&lookup, "LIMELIGHT_RETRY_BASE_MS")
            .map(Duration::from_millis)
            .unwrap_or(defaults.retry.base_delay);

        Self {
            retry: RetryPolicy {
                max_attempts,
                base_delay,
            },
            self_stage: parse_var(&lookup, "LIMELIGHT_SELF_STAGE").unwrap_or(defaults.self_stage),
            host_secret: lookup("LIMELIGHT_HOST_SECRET").filter(|s| !s.is_empty()),
            bind_addr: parse_var(&lookup, "LIMELIGHT_BIND").unwrap_or(defaults.bind_addr),
        }
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring invalid {}={:?}, using default", key, raw);
            None
        }
    }
}
