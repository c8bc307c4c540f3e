use anyhow::Context;
use libsql::{Builder, Connection};

/// Opens the local database at `path` (`:memory:` works too) and makes sure
/// the schema exists.
pub async fn connect(path: &str) -> anyhow::Result<Connection> {
    let db = Builder::new_local(path)
        .build()
        .await
        .with_context(|| format!("failed to open database {}", path))?;
    let conn = db.connect()?;

    init_db(&conn).await?;

    Ok(conn)
}

pub async fn init_db(conn: &Connection) -> Result<(), libsql::Error> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            hashed_password TEXT NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1,
            is_admin INTEGER NOT NULL DEFAULT 0,
            role TEXT NOT NULL DEFAULT 'user',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        (),
    )
    .await?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_users_name ON users (name)",
        (),
    )
    .await?;

    Ok(())
}
