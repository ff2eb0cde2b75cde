use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use tracing::error;

use hush_ai::AiError;
use hush_types::api::{CheckMessageRequest, CheckMessageResponse, SuggestMessagesResponse};

use crate::error::ApiError;
use crate::state::AppState;

/// Classify content as toxic ("Yes") or not ("No").
pub async fn check_message(
    State(state): State<AppState>,
    payload: Result<Json<CheckMessageRequest>, JsonRejection>,
) -> Result<Json<CheckMessageResponse>, ApiError> {
    let Json(req) = payload?;
    if req.content.is_empty() {
        return Err(ApiError::bad_request("Content is required"));
    }

    match hush_ai::check_toxicity(state.model.as_ref(), &req.content).await {
        Ok(verdict) => Ok(Json(CheckMessageResponse { message: verdict })),
        Err(AiError::InvalidVerdict(reply)) => {
            error!("Model broke the Yes/No contract: {:?}", reply);
            Err(ApiError::internal("Invalid response from Gemini API"))
        }
        Err(e) => {
            error!("Error checking message: {}", e);
            Err(ApiError::internal("Failed to check message"))
        }
    }
}

/// Three conversation starters joined by `||`.
pub async fn suggest_messages(
    State(state): State<AppState>,
) -> Result<Json<SuggestMessagesResponse>, ApiError> {
    let messages = hush_ai::suggest_messages(state.model.as_ref())
        .await
        .map_err(|e| {
            error!("Error generating questions: {}", e);
            ApiError::internal("Failed to generate questions")
        })?;

    Ok(Json(SuggestMessagesResponse { messages }))
}
