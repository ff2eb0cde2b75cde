use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use jsonwebtoken::{EncodingKey, Header, encode};
use tracing::{error, info};
use uuid::Uuid;

use hush_types::api::{Claims, SignInRequest, SignInResponse, SignUpRequest, SignUpResponse};

use crate::error::ApiError;
use crate::state::{AppState, with_db};

const SESSION_DAYS: i64 = 30;

pub async fn sign_up(
    State(state): State<AppState>,
    payload: Result<Json<SignUpRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;

    validate_username(&req.username)?;
    if req.password.len() < 8 {
        return Err(ApiError::bad_request("Password must be at least 8 characters"));
    }

    let username = req.username.clone();
    let existing = with_db(&state, move |db| db.get_user_by_username(&username))
        .await
        .map_err(|e| {
            error!("Error checking username: {:#}", e);
            ApiError::internal("Error registering user")
        })?;
    if existing.is_some() {
        return Err(ApiError::conflict("Username is already taken"));
    }

    // Hash password with Argon2id
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| {
            error!("Password hashing failed: {}", e);
            ApiError::internal("Error registering user")
        })?
        .to_string();

    let user_id = Uuid::new_v4();
    let id = user_id.to_string();
    let username = req.username.clone();
    with_db(&state, move |db| db.create_user(&id, &username, &password_hash))
        .await
        .map_err(|e| {
            error!("Error creating user: {:#}", e);
            ApiError::internal("Error registering user")
        })?;

    let token = create_token(&state.jwt_secret, user_id, &req.username).map_err(|e| {
        error!("Token creation failed: {}", e);
        ApiError::internal("Error registering user")
    })?;

    info!("Registered user {}", req.username);

    Ok((StatusCode::CREATED, Json(SignUpResponse { user_id, token })))
}

pub async fn sign_in(
    State(state): State<AppState>,
    payload: Result<Json<SignInRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let invalid = || ApiError::unauthorized("Invalid username or password");

    let username = req.username.clone();
    let user = with_db(&state, move |db| db.get_user_by_username(&username))
        .await
        .map_err(|e| {
            error!("Error loading user: {:#}", e);
            ApiError::internal("Error signing in")
        })?
        .ok_or_else(invalid)?;

    // Verify password
    let parsed_hash = PasswordHash::new(&user.password).map_err(|e| {
        error!("Stored hash for {} is unreadable: {}", user.username, e);
        ApiError::internal("Error signing in")
    })?;

    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| invalid())?;

    let user_id: Uuid = user.id.parse().map_err(|e| {
        error!("Corrupt user id '{}': {}", user.id, e);
        ApiError::internal("Error signing in")
    })?;

    let token = create_token(&state.jwt_secret, user_id, &user.username).map_err(|e| {
        error!("Token creation failed: {}", e);
        ApiError::internal("Error signing in")
    })?;

    Ok(Json(SignInResponse {
        user_id,
        username: user.username,
        token,
    }))
}

/// Usernames appear in profile URLs, so only ASCII letters, digits and
/// underscores are allowed.
fn validate_username(username: &str) -> Result<(), ApiError> {
    if username.len() < 3 || username.len() > 32 {
        return Err(ApiError::bad_request("Username must be 3-32 characters"));
    }
    if !username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(ApiError::bad_request(
            "Username may only contain letters, digits and underscores",
        ));
    }
    Ok(())
}

pub fn create_token(secret: &str, user_id: Uuid, username: &str) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::days(SESSION_DAYS)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}
