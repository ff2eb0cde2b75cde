/// Database row types. These map directly to SQLite rows.
/// Distinct from hush-types API models to keep the DB layer independent.

pub struct UserRow {
    pub id: String,
    pub username: String,
    pub password: String,
    pub accepting_messages: bool,
    pub safe_mode: bool,
    pub created_at: String,
}

pub struct MessageRow {
    pub id: String,
    pub user_id: String,
    pub content: String,
    pub created_at: String,
}

/// Per-user boolean preferences. The two flags are independent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserFlag {
    AcceptingMessages,
    SafeMode,
}

impl UserFlag {
    pub(crate) fn column(self) -> &'static str {
        match self {
            Self::AcceptingMessages => "accepting_messages",
            Self::SafeMode => "safe_mode",
        }
    }
}
