use std::collections::HashMap;

use crate::Database;
use crate::models::{MessageRow, UserMessageRow, UserRow};
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

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "WHERE id = ?1", id))
    }

    pub fn list_users(&self) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT id, username, password FROM users ORDER BY rowid")?;
            let rows = stmt
                .query_map([], map_user)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Overwrite whichever fields are `Some`. Returns false if no user matched.
    pub fn update_user(
        &self,
        id: &str,
        username: Option<&str>,
        password_hash: Option<&str>,
    ) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE users
                 SET username = COALESCE(?2, username),
                     password = COALESCE(?3, password)
                 WHERE id = ?1",
                rusqlite::params![id, username, password_hash],
            )?;
            Ok(changed > 0)
        })
    }

    /// Removes the user and, through the cascade, its back-reference list.
    /// Messages the user authored are left alone.
    pub fn delete_user(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute("DELETE FROM users WHERE id = ?1", [id])?;
            Ok(changed > 0)
        })
    }

    // -- Back-references --

    /// Put `message_id` at the front of the user's message list.
    pub fn prepend_user_message(&self, user_id: &str, message_id: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO user_messages (user_id, message_id) VALUES (?1, ?2)",
                (user_id, message_id),
            )?;
            Ok(())
        })
    }

    /// The user's message ids, most recent first.
    pub fn get_user_message_ids(&self, user_id: &str) -> Result<Vec<String>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT message_id FROM user_messages WHERE user_id = ?1 ORDER BY seq DESC",
            )?;
            let ids = stmt
                .query_map([user_id], |row| row.get(0))?
                .collect::<std::result::Result<Vec<String>, _>>()?;
            Ok(ids)
        })
    }

    /// Batch-fetch the message lists of every user, keyed by user id.
    pub fn get_all_user_message_ids(&self) -> Result<HashMap<String, Vec<String>>> {
        let rows = self.with_conn(|conn| {
            let mut stmt = conn
                .prepare("SELECT user_id, message_id FROM user_messages ORDER BY seq DESC")?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(UserMessageRow {
                        user_id: row.get(0)?,
                        message_id: row.get(1)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })?;

        let mut lists: HashMap<String, Vec<String>> = HashMap::new();
        for row in rows {
            lists.entry(row.user_id).or_default().push(row.message_id);
        }
        Ok(lists)
    }

    // -- Messages --

    pub fn insert_message(&self, id: &str, title: &str, body: &str, author: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (id, title, body, author) VALUES (?1, ?2, ?3, ?4)",
                (id, title, body, author),
            )?;
            Ok(())
        })
    }

    pub fn get_message(&self, id: &str) -> Result<Option<MessageRow>> {
        self.with_conn(|conn| query_message(conn, "WHERE id = ?1", id))
    }

    /// First message with an exact title match, if any.
    pub fn find_message_by_title(&self, title: &str) -> Result<Option<MessageRow>> {
        self.with_conn(|conn| query_message(conn, "WHERE title = ?1 ORDER BY rowid LIMIT 1", title))
    }

    /// All messages in insertion order.
    pub fn list_messages(&self) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT id, title, body, author FROM messages ORDER BY rowid")?;
            let rows = stmt
                .query_map([], map_message)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Overwrite whichever fields are `Some`. Returns false if no message matched.
    pub fn update_message(
        &self,
        id: &str,
        title: Option<&str>,
        body: Option<&str>,
        author: Option<&str>,
    ) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE messages
                 SET title = COALESCE(?2, title),
                     body = COALESCE(?3, body),
                     author = COALESCE(?4, author)
                 WHERE id = ?1",
                rusqlite::params![id, title, body, author],
            )?;
            Ok(changed > 0)
        })
    }

    /// Returns false if no message matched. Back-references are not touched.
    pub fn delete_message(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute("DELETE FROM messages WHERE id = ?1", [id])?;
            Ok(changed > 0)
        })
    }
}

fn map_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        password: row.get(2)?,
    })
}

fn map_message(row: &rusqlite::Row<'_>) -> rusqlite::Result<MessageRow> {
    Ok(MessageRow {
        id: row.get(0)?,
        title: row.get(1)?,
        body: row.get(2)?,
        author: row.get(3)?,
    })
}

fn query_user(conn: &Connection, filter: &str, value: &str) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(&format!("SELECT id, username, password FROM users {}", filter))?;
    let row = stmt.query_row([value], map_user).optional()?;
    Ok(row)
}

fn query_message(conn: &Connection, filter: &str, value: &str) -> Result<Option<MessageRow>> {
    let mut stmt =
        conn.prepare(&format!("SELECT id, title, body, author FROM messages {}", filter))?;
    let row = stmt.query_row([value], map_message).optional()?;
    Ok(row)
}
