//! Runtime configuration loaded from the environment.
//!
//! Only the bind address can be overridden on the command line; everything
//! else comes from `CREDIT_RISK_*` variables.

use std::env;
use std::path::PathBuf;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_MODEL_PATH: &str = "models/naive_bayes_model.json";
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Output format of the log subscriber.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Text,
        }
    }
}

/// Snapshot of configuration values consumed by the service.
#[derive(Clone, Debug)]
pub struct AppCfg {
    pub host: String,
    pub port: u16,
    pub model_path: PathBuf,
    pub log_filter: String,
    pub log_format: LogFormat,
}

impl Default for AppCfg {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            log_format: LogFormat::Text,
        }
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl AppCfg {
    /// Create a configuration snapshot from the process environment.
    pub fn load() -> Self {
        let mut cfg = Self::default();

        if let Some(v) = env_non_empty("CREDIT_RISK_HOST") {
            cfg.host = v;
        }
        if let Some(v) = env_non_empty("CREDIT_RISK_PORT") {
            if let Ok(parsed) = v.parse::<u16>() {
                cfg.port = parsed;
            }
        }
        if let Some(v) = env_non_empty("CREDIT_RISK_MODEL_PATH") {
            cfg.model_path = PathBuf::from(v);
        }
        if let Some(v) = env_non_empty("CREDIT_RISK_LOG") {
            cfg.log_filter = v;
        }
        if let Some(v) = env_non_empty("CREDIT_RISK_LOG_FORMAT") {
            cfg.log_format = LogFormat::parse(&v);
        }

        cfg
    }

    /// Apply command-line bind overrides on top of the environment snapshot.
    pub fn with_bind_overrides(mut self, host: Option<String>, port: Option<u16>) -> Self {
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(port) = port {
            self.port = port;
        }
        self
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, OnceLock};

    fn env_lock() -> &'static Mutex<()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_env() {
        for v in [
            "CREDIT_RISK_HOST",
            "CREDIT_RISK_PORT",
            "CREDIT_RISK_MODEL_PATH",
            "CREDIT_RISK_LOG",
            "CREDIT_RISK_LOG_FORMAT",
        ] {
            env::remove_var(v);
        }
    }

    #[test]
    fn defaults_apply_without_env() {
        let _guard = env_lock().lock().expect("env lock");
        clear_env();

        let cfg = AppCfg::load();
        assert_eq!(cfg.host, DEFAULT_HOST);
        assert_eq!(cfg.port, DEFAULT_PORT);
        assert_eq!(cfg.model_path, PathBuf::from(DEFAULT_MODEL_PATH));
        assert_eq!(cfg.log_format, LogFormat::Text);
        assert_eq!(cfg.bind_addr(), "0.0.0.0:5000");
    }

    #[test]
    fn env_values_override_defaults() {
        let _guard = env_lock().lock().expect("env lock");
        clear_env();
        env::set_var("CREDIT_RISK_HOST", "127.0.0.1");
        env::set_var("CREDIT_RISK_PORT", "8080");
        env::set_var("CREDIT_RISK_MODEL_PATH", "/srv/model.json");
        env::set_var("CREDIT_RISK_LOG_FORMAT", "JSON");

        let cfg = AppCfg::load();
        clear_env();

        assert_eq!(cfg.bind_addr(), "127.0.0.1:8080");
        assert_eq!(cfg.model_path, PathBuf::from("/srv/model.json"));
        assert_eq!(cfg.log_format, LogFormat::Json);
    }

    #[test]
    fn unparseable_port_falls_back_to_default() {
        let _guard = env_lock().lock().expect("env lock");
        clear_env();
        env::set_var("CREDIT_RISK_PORT", "not-a-port");

        let cfg = AppCfg::load();
        clear_env();

        assert_eq!(cfg.port, DEFAULT_PORT);
    }

    #[test]
    fn cli_overrides_win_over_env() {
        let cfg = AppCfg::default().with_bind_overrides(Some("localhost".into()), Some(9000));
        assert_eq!(cfg.bind_addr(), "localhost:9000");

        let untouched = AppCfg::default().with_bind_overrides(None, None);
        assert_eq!(untouched.bind_addr(), "0.0.0.0:5000");
    }
}
