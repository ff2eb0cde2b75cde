use axum::{
    Extension, Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{error, info, warn};
use uuid::Uuid;

use hush_db::MessageRow;
use hush_types::api::{ApiResponse, Claims, SendMessageRequest};
use hush_types::models::Message;

use crate::error::ApiError;
use crate::state::{AppState, with_db};

const MAX_CONTENT_LEN: usize = 1000;

pub async fn get_messages(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse>, ApiError> {
    let user_id = claims.sub.to_string();
    let rows = with_db(&state, move |db| {
        if db.get_user_by_id(&user_id)?.is_none() {
            return Ok(None);
        }
        db.get_messages(&user_id).map(Some)
    })
    .await
    .map_err(|e| {
        error!("Error fetching messages: {:#}", e);
        ApiError::internal("Error fetching messages")
    })?
    .ok_or_else(|| ApiError::not_found("User not found"))?;

    let mut body = ApiResponse::ok("Messages fetched");
    body.messages = Some(rows.into_iter().filter_map(to_message).collect());
    Ok(Json(body))
}

pub async fn delete_message(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<ApiResponse>, ApiError> {
    let Path(message_id) = path?;

    let user_id = claims.sub.to_string();
    let mid = message_id.to_string();
    let removed = with_db(&state, move |db| db.delete_message(&user_id, &mid))
        .await
        .map_err(|e| {
            error!("Error deleting message {}: {:#}", message_id, e);
            ApiError::internal("Error deleting message")
        })?;

    if !removed {
        return Err(ApiError::not_found("Message not found or already deleted"));
    }

    Ok(Json(ApiResponse::ok("Message deleted")))
}

/// Anonymous submission to a user's inbox. Recipients with safe mode on only
/// receive messages the model does not flag as toxic.
pub async fn send_message(
    State(state): State<AppState>,
    payload: Result<Json<SendMessageRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;

    let content = req.content.trim().to_string();
    if content.is_empty() {
        return Err(ApiError::bad_request("Content is required"));
    }
    if content.chars().count() > MAX_CONTENT_LEN {
        return Err(ApiError::bad_request(format!(
            "Content must be at most {} characters",
            MAX_CONTENT_LEN
        )));
    }

    let username = req.username.clone();
    let recipient = with_db(&state, move |db| db.get_user_by_username(&username))
        .await
        .map_err(|e| {
            error!("Error loading recipient: {:#}", e);
            ApiError::internal("Error sending message")
        })?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    if !recipient.accepting_messages {
        return Err(ApiError::forbidden("User is not accepting messages"));
    }

    if recipient.safe_mode {
        // Fail closed: an unavailable model must not let messages through.
        let verdict = hush_ai::check_toxicity(state.model.as_ref(), &content)
            .await
            .map_err(|e| {
                error!("Safe mode check failed: {}", e);
                ApiError::internal("Failed to check message")
            })?;

        if verdict.is_toxic() {
            info!("Safe mode blocked a message to {}", recipient.username);
            return Err(ApiError::forbidden("Message was blocked by safe mode"));
        }
    }

    let message_id = Uuid::new_v4().to_string();
    let recipient_id = recipient.id.clone();
    with_db(&state, move |db| db.insert_message(&message_id, &recipient_id, &content))
        .await
        .map_err(|e| {
            error!("Error storing message: {:#}", e);
            ApiError::internal("Error sending message")
        })?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok("Message sent successfully"))))
}

/// Rows whose id is not a UUID are skipped: the client could never delete them.
fn to_message(row: MessageRow) -> Option<Message> {
    let id = match row.id.parse::<Uuid>() {
        Ok(id) => id,
        Err(e) => {
            warn!("Skipping message with corrupt id '{}': {}", row.id, e);
            return None;
        }
    };

    Some(Message {
        id,
        created_at: row
            .created_at
            .parse::<chrono::DateTime<chrono::Utc>>()
            .or_else(|_| {
                // datetime('now') style timestamps carry no timezone
                chrono::NaiveDateTime::parse_from_str(&row.created_at, "%Y-%m-%d %H:%M:%S")
                    .map(|ndt| ndt.and_utc())
            })
            .unwrap_or_else(|e| {
                warn!("Corrupt created_at '{}' on message '{}': {}", row.created_at, row.id, e);
                chrono::DateTime::default()
            }),
        content: row.content,
    })
}
