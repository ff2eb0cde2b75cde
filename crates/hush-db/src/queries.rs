use crate::Database;
use crate::models::{MessageRow, UserFlag, UserRow};
use anyhow::Result;
use rusqlite::{Connection, OptionalExtension};

impl Database {
    // -- Users --

    pub fn create_user(&self, id: &str, username: &str, password_hash: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, username, password) VALUES (?1, ?2, ?3)",
                (id, username, password_hash),
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "username", username))
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id", id))
    }

    // -- Preferences --

    /// Returns `None` when the user does not exist.
    pub fn get_flag(&self, user_id: &str, flag: UserFlag) -> Result<Option<bool>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {} FROM users WHERE id = ?1", flag.column());
            let value = conn
                .query_row(&sql, [user_id], |row| row.get(0))
                .optional()?;
            Ok(value)
        })
    }

    /// Persist a flag and return the stored value, or `None` when the user
    /// does not exist.
    pub fn set_flag(&self, user_id: &str, flag: UserFlag, value: bool) -> Result<Option<bool>> {
        self.with_conn(|conn| {
            let column = flag.column();
            let sql = format!("UPDATE users SET {column} = ?2 WHERE id = ?1 RETURNING {column}");
            let stored = conn
                .query_row(&sql, rusqlite::params![user_id, value], |row| row.get(0))
                .optional()?;
            Ok(stored)
        })
    }

    // -- Messages --

    pub fn insert_message(&self, id: &str, user_id: &str, content: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (id, user_id, content) VALUES (?1, ?2, ?3)",
                (id, user_id, content),
            )?;
            Ok(())
        })
    }

    /// All messages received by a user, newest first.
    pub fn get_messages(&self, user_id: &str) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, content, created_at
                 FROM messages
                 WHERE user_id = ?1
                 ORDER BY created_at DESC, rowid DESC",
            )?;

            let rows = stmt
                .query_map([user_id], |row| {
                    Ok(MessageRow {
                        id: row.get(0)?,
                        user_id: row.get(1)?,
                        content: row.get(2)?,
                        created_at: row.get(3)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// Delete one of the user's messages. Returns false when no such message
    /// belongs to the user.
    pub fn delete_message(&self, user_id: &str, message_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let removed = conn.execute(
                "DELETE FROM messages WHERE id = ?1 AND user_id = ?2",
                (message_id, user_id),
            )?;
            Ok(removed > 0)
        })
    }
}

fn query_user(conn: &Connection, key: &'static str, value: &str) -> Result<Option<UserRow>> {
    let sql = format!(
        "SELECT id, username, password, accepting_messages, safe_mode, created_at
         FROM users WHERE {key} = ?1"
    );
    let mut stmt = conn.prepare(&sql)?;

    let row = stmt
        .query_row([value], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                username: row.get(1)?,
                password: row.get(2)?,
                accepting_messages: row.get(3)?,
                safe_mode: row.get(4)?,
                created_at: row.get(5)?,
            })
        })
        .optional()?;

    Ok(row)
}
