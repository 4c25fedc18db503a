use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::Json;
use serde_json::Value;

use crate::diagnostics;
use crate::server::AppState;

/// `GET /api/health`
pub async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    let mut body = diagnostics::get_about_info();
    if let Value::Object(map) = &mut body {
        map.insert("status".into(), Value::from("ok"));
        map.insert(
            "uptimeSeconds".into(),
            Value::from(diagnostics::uptime_seconds()),
        );
        map.insert(
            "cacheAgeSeconds".into(),
            state
                .cache
                .age(Instant::now())
                .map(|age| Value::from(age.as_secs()))
                .unwrap_or(Value::Null),
        );
    }
    Json(body)
}
