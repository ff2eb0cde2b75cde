//! Client-side dashboard for a signed-in user: preference switches, inbox,
//! and toast notifications, driven against the hush REST API.

pub mod backend;
pub mod dashboard;

pub use backend::{DashboardBackend, HttpBackend};
pub use dashboard::{Dashboard, Phase, Session, Setting, Settings, Toast, ToastVariant};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server responded {status}: {}", .message.as_deref().unwrap_or("<no message>"))]
    Api { status: u16, message: Option<String> },
}

impl ClientError {
    /// The human-readable message from the server's error envelope, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Api { message, .. } => message.as_deref(),
            Self::Transport(_) => None,
        }
    }
}
