//! ERP Dashboard - analytics backend
//!
//! Serves the dashboard's data endpoints over HTTP. The analytics endpoint
//! aggregates the legacy order and stock exports into summary views and
//! caches the result; the inventory endpoints accept form posts and redirect
//! without persisting.

use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// App start time for uptime calculation (epoch seconds).
pub(crate) static APP_START_EPOCH: AtomicU64 = AtomicU64::new(0);

pub mod analytics;
pub mod cache;
pub mod commands;
pub mod config;
pub mod data_helpers;
pub mod diagnostics;
pub mod error;
pub mod records;
pub mod server;

/// First non-empty string under any of `keys`. Numeric cells are rendered as text.
pub(crate) fn value_str(v: &serde_json::Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        match v.get(*key) {
            Some(serde_json::Value::String(s)) => {
                let trimmed = s.trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
            }
            Some(serde_json::Value::Number(n)) => return Some(n.to_string()),
            _ => {}
        }
    }
    None
}

/// First numeric value under any of `keys`, accepting numeric strings.
pub(crate) fn value_f64(v: &serde_json::Value, keys: &[&str]) -> Option<f64> {
    for key in keys {
        if let Some(n) = v.get(*key).and_then(data_helpers::number_from_value) {
            return Some(n);
        }
    }
    None
}

// ============================================================================
// App entry point
// ============================================================================

pub fn run() -> anyhow::Result<()> {
    // Record start time for uptime tracking
    let epoch = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    APP_START_EPOCH.store(epoch, Ordering::Relaxed);

    let config = config::ServerConfig::from_env()?;

    // Initialize structured logging (console + rolling file)
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,erp_dashboard_lib=debug"));

    // Prune old log files before setting up the appender
    diagnostics::prune_old_logs(&config.log_dir);

    let file_appender = diagnostics::build_log_appender(&config.log_dir)?;
    // Dropping the guard flushes buffered lines; it is held until `run()` returns.
    let (non_blocking, _log_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true);
    let console_layer = fmt::layer().with_target(true);
    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    info!(
        data_dir = %config.data_dir.display(),
        log_dir = %config.log_dir.display(),
        "Starting ERP Dashboard v{}",
        env!("CARGO_PKG_VERSION")
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(server::serve(config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn value_str_skips_blank_and_renders_numbers() {
        let row = json!({ "Order No": "  ", "PO No": 1042, "Buyer": " Acme " });
        assert_eq!(
            value_str(&row, &["Order No", "PO No"]).as_deref(),
            Some("1042")
        );
        assert_eq!(value_str(&row, &["Buyer"]).as_deref(), Some("Acme"));
        assert_eq!(value_str(&row, &["Missing"]), None);
    }

    #[test]
    fn value_f64_uses_first_numeric_alias() {
        let row = json!({ "Quantity": "", "Qty": "2,500", "Qty (Kg)": 9 });
        assert_eq!(value_f64(&row, &["Quantity", "Qty", "Qty (Kg)"]), Some(2500.0));
        assert_eq!(value_f64(&row, &["Nope"]), None);
    }
}
