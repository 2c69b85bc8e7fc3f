//! Handlers for client actions: free text, discrete choices, cancellation.

use std::time::Instant;

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use scrivener_types::action::{ClientAction, Reply};
use scrivener_types::job::StatusHandle;
use scrivener_types::session::{ClientId, DialogState};

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Request body for a free-text message.
#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    pub text: String,
}

/// Request body for a discrete choice.
#[derive(Debug, Deserialize)]
pub struct ChoiceRequest {
    pub choice_id: String,
    pub expected_state: DialogState,
    #[serde(default)]
    pub status_handle: Option<String>,
}

/// POST /api/v1/clients/{id}/messages
pub async fn post_message(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
    Json(body): Json<MessageRequest>,
) -> Result<ApiResponse<Reply>, AppError> {
    let started = Instant::now();
    let reply = state
        .coordinator
        .submit_action(ClientAction::FreeText {
            client_id: ClientId::new(client_id),
            text: body.text,
        })
        .await?;
    Ok(ApiResponse::success(
        reply,
        started.elapsed().as_millis() as u64,
    ))
}

/// POST /api/v1/clients/{id}/choices
pub async fn post_choice(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
    Json(body): Json<ChoiceRequest>,
) -> Result<ApiResponse<Reply>, AppError> {
    let started = Instant::now();
    if body.choice_id.is_empty() {
        return Err(AppError::Validation("choice_id must not be empty".into()));
    }
    let reply = state
        .coordinator
        .submit_action(ClientAction::Choice {
            client_id: ClientId::new(client_id),
            choice_id: body.choice_id,
            expected_state: body.expected_state,
            status_handle: body.status_handle.map(StatusHandle::new),
        })
        .await?;
    Ok(ApiResponse::success(
        reply,
        started.elapsed().as_millis() as u64,
    ))
}

/// POST /api/v1/clients/{id}/cancel
pub async fn post_cancel(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
) -> Result<ApiResponse<Reply>, AppError> {
    let started = Instant::now();
    let reply = state.coordinator.cancel(ClientId::new(client_id)).await?;
    Ok(ApiResponse::success(
        reply,
        started.elapsed().as_millis() as u64,
    ))
}
