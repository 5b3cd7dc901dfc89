//! Database row types. These map directly to SQLite rows and are kept apart
//! from the wire models in missive-types.

use missive_types::models::{Message, User};

pub struct UserRow {
    pub id: String,
    pub username: String,
    /// Argon2 PHC string.
    pub password: String,
}

impl UserRow {
    /// Attach the back-reference list (most-recent-first) and drop the hash.
    pub fn into_user(self, messages: Vec<String>) -> User {
        User {
            id: self.id,
            username: self.username,
            messages,
        }
    }
}

pub struct MessageRow {
    pub id: String,
    pub title: String,
    pub body: String,
    pub author: String,
}

impl From<MessageRow> for Message {
    fn from(row: MessageRow) -> Self {
        Message {
            id: row.id,
            title: row.title,
            body: row.body,
            author: row.author,
        }
    }
}

pub struct UserMessageRow {
    pub user_id: String,
    pub message_id: String,
}
