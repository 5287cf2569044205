//! Configuration module

use std::env;
use std::path::PathBuf;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind address
    pub host: String,

    /// Server port
    pub port: u16,

    /// Allowed CORS origins, `["*"]` for any
    pub cors_origins: Vec<String>,

    /// Log level used when RUST_LOG is not set
    pub log_level: String,

    /// Environment (development, production)
    pub environment: String,

    /// Project base directory; artifacts are read from `<base_dir>/models`
    pub base_dir: PathBuf,

    /// Public address shown in the startup banner
    pub public_ip: Option<String>,

    /// Refuse to start when the classifier is missing
    pub model_required: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),

            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),

            cors_origins: parse_origins(lookup("CORS_ORIGINS").as_deref().unwrap_or("*")),

            log_level: lookup("LOG_LEVEL")
                .map(|level| normalize_log_level(&level))
                .unwrap_or_else(|| "info".to_string()),

            environment: lookup("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),

            base_dir: lookup("BASE_DIR")
                .map(PathBuf::from)
                .or_else(|| env::current_dir().ok())
                .unwrap_or_else(|| PathBuf::from(".")),

            public_ip: lookup("PUBLIC_IP").filter(|ip| !ip.is_empty()),

            model_required: lookup("MODEL_REQUIRED")
                .map(|v| !matches!(v.to_lowercase().as_str(), "0" | "false" | "no"))
                .unwrap_or(true),
        }
    }

    /// Directory holding the model artifacts
    pub fn models_dir(&self) -> PathBuf {
        self.base_dir.join("models")
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment.to_lowercase() == "production"
    }

    /// Auto-reload is a development convenience only
    pub fn reload_enabled(&self) -> bool {
        !self.is_production()
    }

    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|o| o == "*")
    }

    /// Base URL for the startup banner
    pub fn public_url(&self) -> String {
        let host = match (&self.public_ip, self.host.as_str()) {
            (Some(ip), _) => ip.as_str(),
            (None, "0.0.0.0") => "localhost",
            (None, host) => host,
        };
        format!("http://{}:{}", host, self.port)
    }
}

/// Map uvicorn-style level names onto tracing's
fn normalize_log_level(raw: &str) -> String {
    match raw.trim().to_lowercase().as_str() {
        "warning" => "warn".to_string(),
        "critical" | "fatal" => "error".to_string(),
        other => other.to_string(),
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    let origins: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect();

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        vec!["*".to_string()]
    } else {
        origins
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]);

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8000);
        assert_eq!(config.cors_origins, vec!["*"]);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.environment, "development");
        assert!(config.model_required);
        assert!(config.reload_enabled());
        assert!(config.allows_any_origin());
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "9000"),
            ("ENVIRONMENT", "Production"),
            ("BASE_DIR", "/srv/diabetes"),
            ("MODEL_REQUIRED", "false"),
        ]);

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 9000);
        assert!(config.is_production());
        assert!(!config.reload_enabled());
        assert_eq!(config.models_dir(), PathBuf::from("/srv/diabetes/models"));
        assert!(!config.model_required);
    }

    #[test]
    fn test_log_level_aliases() {
        assert_eq!(config(&[("LOG_LEVEL", "warning")]).log_level, "warn");
        assert_eq!(config(&[("LOG_LEVEL", "CRITICAL")]).log_level, "error");
        assert_eq!(config(&[("LOG_LEVEL", "Debug")]).log_level, "debug");
        assert_eq!(config(&[("LOG_LEVEL", "trace")]).log_level, "trace");
    }

    #[test]
    fn test_log_level_builds_filter() {
        for level in ["critical", "error", "warning", "info", "debug", "trace"] {
            let config = config(&[("LOG_LEVEL", level)]);
            let directive = format!("diabetes_api={0},tower_http={0}", config.log_level);
            assert!(
                tracing_subscriber::EnvFilter::try_new(&directive).is_ok(),
                "LOG_LEVEL={} produced an unusable filter",
                level
            );
        }
    }

    #[test]
    fn test_invalid_port_falls_back() {
        assert_eq!(config(&[("PORT", "eighty")]).port, 8000);
    }

    #[test]
    fn test_cors_origin_list() {
        let config = config(&[("CORS_ORIGINS", "https://a.example, https://b.example,")]);

        assert_eq!(config.cors_origins, vec!["https://a.example", "https://b.example"]);
        assert!(!config.allows_any_origin());
    }

    #[test]
    fn test_public_url() {
        assert_eq!(config(&[]).public_url(), "http://localhost:8000");
        assert_eq!(config(&[("HOST", "10.0.0.5")]).public_url(), "http://10.0.0.5:8000");
        assert_eq!(
            config(&[("PUBLIC_IP", "3.3.3.3"), ("PORT", "80")]).public_url(),
            "http://3.3.3.3:80"
        );
    }
}
