//! Handlers for queue observability.

use std::time::Instant;

use axum::extract::{Path, State};
use serde::Serialize;

use scrivener_types::session::ClientId;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// A client's current place in the queue.
#[derive(Debug, Serialize)]
pub struct QueuePositionDto {
    /// 1-based position, or null when the client is not waiting.
    pub position: Option<usize>,
    /// Live queue length at the time of the query.
    pub queue_length: usize,
}

/// GET /api/v1/clients/{id}/queue-position
///
/// Answered lock-free off the shared position board; no coordinator
/// round trip.
pub async fn get_queue_position(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
) -> Result<ApiResponse<QueuePositionDto>, AppError> {
    let started = Instant::now();
    let client_id = ClientId::new(client_id);
    let dto = QueuePositionDto {
        position: state.coordinator.queue_position(&client_id),
        queue_length: state.queue.len(),
    };
    Ok(ApiResponse::success(
        dto,
        started.elapsed().as_millis() as u64,
    ))
}
