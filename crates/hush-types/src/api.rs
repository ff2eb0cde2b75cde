use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Message;

// -- Session Claims --

/// JWT claims carried by every authenticated request. Shared by the REST
/// middleware that resolves sessions and the handlers that issue them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub exp: usize,
}

// -- Envelope --

/// Common response envelope. Every error body is `{ success: false, message }`;
/// successful responses fill in whichever optional field the route returns.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_accepting_messages: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safe_mode: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<Message>>,
}

impl ApiResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            ..Self::default()
        }
    }
}

// -- Auth --

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignUpRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpResponse {
    pub user_id: Uuid,
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignInRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInResponse {
    pub user_id: Uuid,
    pub username: String,
    pub token: String,
}

// -- Preferences --

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AcceptMessagesRequest {
    pub accept_messages: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SafeModeRequest {
    pub safe_mode: bool,
}

// -- Messages --

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SendMessageRequest {
    pub username: String,
    pub content: String,
}

// -- AI --

#[derive(Debug, Serialize, Deserialize)]
pub struct CheckMessageRequest {
    #[serde(default)]
    pub content: String,
}

/// Toxicity verdict. Serialized as the literal tokens `"Yes"` / `"No"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Yes,
    No,
}

impl Verdict {
    /// Strict match: anything other than the exact token is rejected.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "Yes" => Some(Self::Yes),
            "No" => Some(Self::No),
            _ => None,
        }
    }

    pub fn is_toxic(self) -> bool {
        self == Self::Yes
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CheckMessageResponse {
    pub message: Verdict,
}

/// Suggested prompts, still joined by [`SUGGESTION_SEPARATOR`].
#[derive(Debug, Serialize, Deserialize)]
pub struct SuggestMessagesResponse {
    pub messages: String,
}

pub const SUGGESTION_SEPARATOR: &str = "||";

/// Split a suggestion string into its non-empty, trimmed questions.
pub fn split_suggestions(raw: &str) -> Vec<String> {
    raw.split(SUGGESTION_SEPARATOR)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
