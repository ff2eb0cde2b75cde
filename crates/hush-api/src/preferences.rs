use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
};
use tracing::{error, info};

use hush_db::UserFlag;
use hush_types::api::{AcceptMessagesRequest, ApiResponse, Claims, SafeModeRequest};

use crate::error::ApiError;
use crate::state::{AppState, with_db};

// -- Accept messages --

pub async fn get_accept_messages(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse>, ApiError> {
    let value = read_flag(
        &state,
        &claims,
        UserFlag::AcceptingMessages,
        "Error retrieving message acceptance status",
    )
    .await?;

    let mut body = ApiResponse::ok("Message acceptance status retrieved");
    body.is_accepting_messages = Some(value);
    Ok(Json(body))
}

pub async fn update_accept_messages(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<AcceptMessagesRequest>, JsonRejection>,
) -> Result<Json<ApiResponse>, ApiError> {
    let Json(req) = payload?;

    let value = write_flag(
        &state,
        &claims,
        UserFlag::AcceptingMessages,
        req.accept_messages,
        "Error updating message acceptance status",
    )
    .await?;

    let mut body = ApiResponse::ok("Message acceptance status updated successfully");
    body.is_accepting_messages = Some(value);
    Ok(Json(body))
}

// -- Safe mode --

pub async fn get_safe_mode(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse>, ApiError> {
    let value = read_flag(&state, &claims, UserFlag::SafeMode, "Error retrieving safe mode status").await?;

    let mut body = ApiResponse::ok("Safe mode status retrieved");
    body.safe_mode = Some(value);
    Ok(Json(body))
}

pub async fn update_safe_mode(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<SafeModeRequest>, JsonRejection>,
) -> Result<Json<ApiResponse>, ApiError> {
    let Json(req) = payload?;

    let value = write_flag(&state, &claims, UserFlag::SafeMode, req.safe_mode, "Error updating safe mode").await?;

    let mut body = ApiResponse::ok("Safe mode updated successfully");
    body.safe_mode = Some(value);
    Ok(Json(body))
}

async fn read_flag(
    state: &AppState,
    claims: &Claims,
    flag: UserFlag,
    failure: &'static str,
) -> Result<bool, ApiError> {
    let user_id = claims.sub.to_string();
    with_db(state, move |db| db.get_flag(&user_id, flag))
        .await
        .map_err(|e| {
            error!("{}: {:#}", failure, e);
            ApiError::internal(failure)
        })?
        .ok_or_else(|| ApiError::not_found("User not found"))
}

async fn write_flag(
    state: &AppState,
    claims: &Claims,
    flag: UserFlag,
    value: bool,
    failure: &'static str,
) -> Result<bool, ApiError> {
    let user_id = claims.sub.to_string();
    let stored = with_db(state, move |db| db.set_flag(&user_id, flag, value))
        .await
        .map_err(|e| {
            error!("{}: {:#}", failure, e);
            ApiError::internal(failure)
        })?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    info!("User {} set {:?} to {}", claims.username, flag, stored);
    Ok(stored)
}
