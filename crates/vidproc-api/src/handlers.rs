//! HTTP handlers.

use axum::extract::State;
use axum::Json;

use crate::error::ApiResult;
use crate::pipeline::processed_name;
use crate::state::AppState;
use crate::trigger::decode_trigger;

/// Trigger endpoint: decode the notification and drive one pipeline run.
pub async fn process_video(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> ApiResult<String> {
    let event = decode_trigger(body)?;

    state.pipeline.run(&event).await?;

    Ok(format!(
        "Processing finished: {}\n",
        processed_name(&event.name)
    ))
}

/// Liveness probe.
pub async fn health() -> &'static str {
    "ok"
}
