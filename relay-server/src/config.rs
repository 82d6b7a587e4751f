//! Configuration module for environment variable parsing.
//!
//! All settings are read once at startup. The three secrets are optional so the
//! server can still boot (and answer health checks) while misconfigured.

use std::env;
use tracing::warn;

/// Default Graph API base for the Messenger Send API.
pub const DEFAULT_GRAPH_API_BASE: &str = "https://graph.facebook.com/v19.0";

/// Default base URL of the Gemini REST API.
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Default generation model.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-pro";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the web server to listen on
    pub port: u16,

    /// Secret the platform echoes back during the verification handshake
    pub verify_token: Option<String>,

    /// Messenger page access token used by the Send API
    pub page_access_token: Option<String>,

    /// Gemini API key
    pub gemini_api_key: Option<String>,

    /// Gemini model identifier
    pub gemini_model: String,

    /// Base URL of the Gemini REST API
    pub gemini_api_base: String,

    /// Base URL of the Graph API, including the version segment
    pub graph_api_base: String,

    /// Outbound HTTP request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 3000,
            verify_token: None,
            page_access_token: None,
            gemini_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            gemini_api_base: DEFAULT_GEMINI_API_BASE.to_string(),
            graph_api_base: DEFAULT_GRAPH_API_BASE.to_string(),
            request_timeout_ms: 30_000,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Config::default();

        Config {
            port: parse_number("PORT", defaults.port),

            verify_token: parse_secret("VERIFY_TOKEN"),

            page_access_token: parse_secret("PAGE_ACCESS_TOKEN"),

            gemini_api_key: parse_secret("GEMINI_API_KEY"),

            gemini_model: parse_secret("GEMINI_MODEL").unwrap_or(defaults.gemini_model),

            gemini_api_base: parse_secret("GEMINI_API_BASE")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or(defaults.gemini_api_base),

            graph_api_base: parse_secret("GRAPH_API_BASE")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or(defaults.graph_api_base),

            request_timeout_ms: parse_number("REQUEST_TIMEOUT_MS", defaults.request_timeout_ms),
        }
    }

    /// Names of the secrets that are not configured.
    pub fn missing_secrets(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.verify_token.is_none() {
            missing.push("VERIFY_TOKEN");
        }
        if self.page_access_token.is_none() {
            missing.push("PAGE_ACCESS_TOKEN");
        }
        if self.gemini_api_key.is_none() {
            missing.push("GEMINI_API_KEY");
        }
        missing
    }
}

/// Read a string variable, treating blank values as unset.
fn parse_secret(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse a numeric variable, falling back to `default` when unset or invalid.
fn parse_number<T: std::str::FromStr>(name: &str, default: T) -> T {
    let raw = match env::var(name) {
        Ok(v) => v,
        Err(_) => return default,
    };

    match raw.trim().parse() {
        Ok(v) => v,
        Err(_) => {
            warn!(env_var = name, value = %raw, "Invalid number, using default");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_secret_blank_is_none() {
        env::set_var("TEST_RELAY_BLANK_SECRET", "   ");
        assert_eq!(parse_secret("TEST_RELAY_BLANK_SECRET"), None);
        env::remove_var("TEST_RELAY_BLANK_SECRET");
    }

    #[test]
    fn test_parse_secret_trims() {
        env::set_var("TEST_RELAY_SECRET", " s3cret \n");
        assert_eq!(parse_secret("TEST_RELAY_SECRET"), Some("s3cret".to_string()));
        env::remove_var("TEST_RELAY_SECRET");
    }

    #[test]
    fn test_parse_number_valid() {
        env::set_var("TEST_RELAY_PORT", "8081");
        assert_eq!(parse_number("TEST_RELAY_PORT", 3000u16), 8081);
        env::remove_var("TEST_RELAY_PORT");
    }

    #[test]
    fn test_parse_number_invalid_uses_default() {
        env::set_var("TEST_RELAY_BAD_PORT", "not-a-port");
        assert_eq!(parse_number("TEST_RELAY_BAD_PORT", 3000u16), 3000);
        env::remove_var("TEST_RELAY_BAD_PORT");
    }

    #[test]
    fn test_parse_number_default() {
        assert_eq!(parse_number("NONEXISTENT_RELAY_VAR", 42u64), 42);
    }

    #[test]
    fn test_missing_secrets() {
        let mut config = Config::default();
        assert_eq!(
            config.missing_secrets(),
            vec!["VERIFY_TOKEN", "PAGE_ACCESS_TOKEN", "GEMINI_API_KEY"]
        );

        config.verify_token = Some("v".to_string());
        config.gemini_api_key = Some("k".to_string());
        assert_eq!(config.missing_secrets(), vec!["PAGE_ACCESS_TOKEN"]);
    }
}
