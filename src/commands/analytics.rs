use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use tracing::{debug, info};

use crate::analytics::{build_analytics, AnalyticsResponse};
use crate::config::ServerConfig;
use crate::data_helpers::read_rows_file;
use crate::error::AnalyticsError;
use crate::records::{normalize_orders, normalize_stock};
use crate::server::AppState;

pub const CACHE_HEADER: &str = "x-cache";

fn respond(response: Arc<AnalyticsResponse>, cache_status: &'static str) -> Response {
    ([(CACHE_HEADER, cache_status)], Json(response)).into_response()
}

/// `GET /api/analytics/excel`
pub async fn analytics_excel(
    State(state): State<Arc<AppState>>,
) -> Result<Response, AnalyticsError> {
    if let Some(cached) = state.cache.get(Instant::now()) {
        debug!(cache = "hit", timestamp = %cached.timestamp, "Serving cached analytics");
        return Ok(respond(cached, "HIT"));
    }

    let computed = compute_analytics(&state.config).await?;
    let stored = state.cache.store(Instant::now(), computed);
    Ok(respond(stored, "MISS"))
}

/// Load the three exports one after another and aggregate them.
pub async fn compute_analytics(config: &ServerConfig) -> Result<AnalyticsResponse, AnalyticsError> {
    let export_rows = read_rows_file(&config.export_orders_path()).await?;
    let local_rows = read_rows_file(&config.local_orders_path()).await?;
    let stock_rows = read_rows_file(&config.stock_boxes_path()).await?;

    let export_count = export_rows.len();
    let local_count = local_rows.len();
    let box_count = stock_rows.len();

    let response = tokio::task::spawn_blocking(move || {
        let orders = normalize_orders(&export_rows, &local_rows);
        let stock = normalize_stock(&stock_rows);
        build_analytics(&orders, &stock, Utc::now())
    })
    .await
    .map_err(|e| AnalyticsError::Processing(format!("aggregation task: {e}")))?;

    info!(
        export_orders = export_count,
        local_orders = local_count,
        boxes = box_count,
        cache = "miss",
        "Analytics recomputed"
    );
    Ok(response)
}
