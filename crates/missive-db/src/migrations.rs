use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id          TEXT PRIMARY KEY,
            username    TEXT NOT NULL UNIQUE,
            password    TEXT NOT NULL
        );

        -- author is not a foreign key: a message may outlive its author
        -- or cite one that never existed.
        CREATE TABLE IF NOT EXISTS messages (
            id          TEXT PRIMARY KEY,
            title       TEXT NOT NULL,
            body        TEXT NOT NULL,
            author      TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_messages_title
            ON messages(title);

        -- Back-references from a user to the messages they wrote. Highest seq
        -- is the most recent. message_id is unconstrained: deleting a message
        -- leaves its entry behind.
        CREATE TABLE IF NOT EXISTS user_messages (
            seq         INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id     TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            message_id  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_user_messages_user
            ON user_messages(user_id, seq);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
