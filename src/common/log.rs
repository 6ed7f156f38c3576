//! Logging setup and helpers for rendering payloads into log fields.

use serde::Serialize;
use tracing_subscriber::EnvFilter;

use super::config::{AppCfg, LogFormat};

/// Install the global tracing subscriber. Safe to call more than once; later
/// calls are ignored.
pub fn init(cfg: &AppCfg) {
    let filter = EnvFilter::try_new(&cfg.log_filter)
        .unwrap_or_else(|_| EnvFilter::new(super::config::DEFAULT_LOG_FILTER));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let _ = match cfg.log_format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    };
}

/// Render a payload as compact JSON for a log field. Never fails: a payload
/// that cannot be serialised is replaced by a placeholder.
pub fn render<T: Serialize + ?Sized>(payload: &T) -> String {
    serde_json::to_string(payload).unwrap_or_else(|err| format!("<unrenderable: {err}>"))
}
