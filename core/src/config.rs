//! Construction-time configuration (spec §6 "Config recognized at
//! construction") and the ambient logging configuration used to wire up
//! `tracing-subscriber` the way a host embedding this adapter would.

use serde::Deserialize;
use serde::Serialize;

pub const DEFAULT_MODEL: &str = "gpt-5-codex";
pub const DEFAULT_TEMPERATURE: f32 = 1.0;
pub const DEFAULT_COMPACT_STRATEGY: &str = "simple";

/// Default garbled-output detection patterns. Deliberately small and
/// externalized (spec §9: "the pattern set is a defensive layer, not a
/// correctness layer; expect it to drift").
pub fn default_garbled_patterns() -> Vec<String> {
    vec![
        r"^\s*$".to_string(),
        r"(?i)as an ai language model".to_string(),
        r"(.)\1{40,}".to_string(),
    ]
}

#[derive(Debug, Clone)]
pub struct AdapterConfig {
    pub api_key: String,
    pub base_url: Option<String>,
    pub model: String,
    pub enable_stateful_chaining: bool,
    pub max_output_tokens: Option<u32>,
    pub temperature: f32,
    pub auto_compact_enabled: bool,
    pub compact_strategy: String,
    pub garbled_patterns: Vec<String>,
    pub logging: LoggingConfig,
}

impl AdapterConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: None,
            model: DEFAULT_MODEL.to_string(),
            enable_stateful_chaining: true,
            max_output_tokens: None,
            temperature: DEFAULT_TEMPERATURE,
            auto_compact_enabled: true,
            compact_strategy: DEFAULT_COMPACT_STRATEGY.to_string(),
            garbled_patterns: default_garbled_patterns(),
            logging: LoggingConfig::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

/// Logging configuration for `tracing-subscriber`, mirroring the shape a
/// host's own config file would carry for this adapter's log output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Show file name and line number in log output.
    pub location: bool,
    /// Show module path (target) in log output.
    pub target: bool,
    /// Timezone for log timestamps.
    pub timezone: TimezoneConfig,
    /// Default log level (trace, debug, info, warn, error).
    pub level: String,
    /// Module-specific log levels, e.g. "adapter_core=debug".
    #[serde(default)]
    pub modules: Vec<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            location: false,
            target: false,
            timezone: TimezoneConfig::Local,
            level: "info".to_string(),
            modules: vec![],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum TimezoneConfig {
    Local,
    Utc,
}

impl Default for TimezoneConfig {
    fn default() -> Self {
        Self::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let config = AdapterConfig::new("sk-test");
        assert_eq!(config.model, "gpt-5-codex");
        assert!(config.enable_stateful_chaining);
        assert_eq!(config.temperature, 1.0);
        assert!(config.auto_compact_enabled);
    }

    #[test]
    fn logging_config_default_is_quiet() {
        let logging = LoggingConfig::default();
        assert!(!logging.location);
        assert!(!logging.target);
        assert_eq!(logging.level, "info");
    }
}
