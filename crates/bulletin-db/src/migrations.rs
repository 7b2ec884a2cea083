use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (clients, public_messages)");
        conn.execute_batch(
            "
            CREATE TABLE clients (
                client_id   INTEGER PRIMARY KEY,
                full_name   TEXT,
                email_id    TEXT
            );

            CREATE TABLE public_messages (
                message_id       INTEGER PRIMARY KEY,
                title            TEXT NOT NULL,
                message_content  TEXT NOT NULL,
                addressed_to     TEXT,
                client_id        INTEGER REFERENCES clients(client_id) ON DELETE SET NULL,
                posted_on        TEXT,
                valid_until      TEXT
            );

            CREATE INDEX idx_public_messages_client
                ON public_messages(client_id);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run(&conn).unwrap();
        run(&conn).unwrap();

        let versions: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(versions, 1);

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .unwrap()
            .query_map([], |r| r.get(0))
            .unwrap()
            .collect::<std::result::Result<_, _>>()
            .unwrap();
        assert!(tables.contains(&"clients".to_string()));
        assert!(tables.contains(&"public_messages".to_string()));
    }
}
