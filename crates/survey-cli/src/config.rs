//! CLI configuration from environment.

use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    /// tracing filter directive
    pub log_directive: String,
    /// Emit log lines as JSON instead of text
    pub log_json: bool,
    /// Pretty-print project and export files
    pub pretty_json: bool,
    /// Grid cell edge used by `init` when no size is given
    pub cell_size_m: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_directive: "survey_cli=info,survey_core=info".to_string(),
            log_json: false,
            pretty_json: true,
            cell_size_m: 1_000.0,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            log_directive: lookup("SURVEY_LOG").unwrap_or(defaults.log_directive),
            log_json: lookup("SURVEY_LOG_JSON")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.log_json),
            pretty_json: lookup("SURVEY_PRETTY_JSON")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.pretty_json),
            cell_size_m: lookup("SURVEY_CELL_SIZE_M")
                .and_then(|s| s.parse().ok())
                .filter(|v: &f64| v.is_finite() && *v > 0.0)
                .unwrap_or(defaults.cell_size_m),
        }
    }
}
