use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id          TEXT PRIMARY KEY,
            username    TEXT NOT NULL UNIQUE,
            password    TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS profiles (
            id          TEXT PRIMARY KEY,
            user_id     TEXT NOT NULL UNIQUE REFERENCES users(id),
            username    TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS pastes (
            id          TEXT PRIMARY KEY,
            user_id     TEXT NOT NULL REFERENCES users(id),
            title       TEXT NOT NULL,
            content     TEXT NOT NULL,
            slug        TEXT NOT NULL UNIQUE,
            is_public   INTEGER NOT NULL DEFAULT 1,
            created_at  TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS comments (
            id          TEXT PRIMARY KEY,
            paste_id    TEXT NOT NULL REFERENCES pastes(id),
            user_id     TEXT NOT NULL REFERENCES users(id),
            content     TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_comments_paste
            ON comments(paste_id, created_at);

        CREATE TABLE IF NOT EXISTS likes (
            id          TEXT PRIMARY KEY,
            paste_id    TEXT NOT NULL REFERENCES pastes(id),
            user_id     TEXT NOT NULL REFERENCES users(id),
            created_at  TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(paste_id, user_id)
        );

        CREATE INDEX IF NOT EXISTS idx_likes_paste
            ON likes(paste_id);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
