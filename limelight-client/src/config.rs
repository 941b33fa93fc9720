use limelight_core::LayoutMode;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Layout mode a freshly attached view starts in.
    pub layout_mode: LayoutMode,
    /// Base URL of the stage server.
    pub endpoint: String,
    /// Offer the self toggle to non-hosts. The server enforces its own policy.
    pub allow_self_stage: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            layout_mode: LayoutMode::default(),
            endpoint: "http://127.0.0.1:7880".to_string(),
            allow_self_stage: false,
        }
    }
}

impl ClientConfig {
    /// Reads `LIMELIGHT_ENDPOINT`, `LIMELIGHT_LAYOUT` and `LIMELIGHT_SELF_STAGE`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(endpoint) = lookup("LIMELIGHT_ENDPOINT").filter(|e| !e.is_empty()) {
            config.endpoint = endpoint;
        }
        if let Some(raw) = lookup("LIMELIGHT_LAYOUT") {
            match raw.parse() {
                Ok(mode) => config.layout_mode = mode,
                Err(e) => warn!("Ignoring LIMELIGHT_LAYOUT: {}", e),
            }
        }
        if let Some(raw) = lookup("LIMELIGHT_SELF_STAGE") {
            config.allow_self_stage = matches!(raw.trim(), "anyone" | "any");
        }

        config
    }
}
