use rusqlite::{Connection, Result};

/// Initialize the picture table, versioned through `<table>_schema_version`.
///
/// `table` must already be validated as a plain identifier (see `AlbumConfig::validate`).
pub fn init_schema(conn: &Connection, table: &str) -> Result<()> {
    conn.execute(
        &format!(
            "CREATE TABLE IF NOT EXISTS {table}_schema_version (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            )"
        ),
        [],
    )?;

    // Check current schema version
    let current_version: i32 = conn
        .query_row(
            &format!("SELECT version FROM {table}_schema_version ORDER BY version DESC LIMIT 1"),
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);

    if current_version < 1 {
        log::info!("Creating picture table '{}' (schema v1)", table);
        create_schema_v1(conn, table)?;
        conn.execute(
            &format!("INSERT INTO {table}_schema_version (version) VALUES (1)"),
            [],
        )?;
    }

    Ok(())
}

/// Create picture schema version 1
fn create_schema_v1(conn: &Connection, table: &str) -> Result<()> {
    conn.execute(
        &format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                owner_type TEXT NOT NULL DEFAULT '',
                owner_id INTEGER NOT NULL,
                date_uploaded TEXT,
                title TEXT NOT NULL DEFAULT '',
                description TEXT NOT NULL DEFAULT '',
                privacy INTEGER NOT NULL DEFAULT 0 CHECK(privacy IN (0, 2, 4, 6, 10)),
                pic_org_url TEXT NOT NULL DEFAULT '',
                pic_org_path TEXT NOT NULL DEFAULT '',
                pic_mid_url TEXT NOT NULL DEFAULT '',
                pic_mid_path TEXT NOT NULL DEFAULT '',
                pic_thumb_url TEXT NOT NULL DEFAULT '',
                pic_thumb_path TEXT NOT NULL DEFAULT ''
            )"
        ),
        [],
    )?;

    // Owner lookups and bulk deletes
    conn.execute(
        &format!("CREATE INDEX IF NOT EXISTS idx_{table}_owner ON {table}(owner_type, owner_id)"),
        [],
    )?;
    conn.execute(
        &format!("CREATE INDEX IF NOT EXISTS idx_{table}_privacy ON {table}(privacy)"),
        [],
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_schema_creates_table() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn, "bp_album").unwrap();

        let columns: i32 = conn
            .query_row(
                "SELECT COUNT(*) FROM pragma_table_info('bp_album')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(columns, 13);
    }

    #[test]
    fn test_init_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn, "bp_album").unwrap();
        init_schema(&conn, "bp_album").unwrap();

        let versions: i32 = conn
            .query_row("SELECT COUNT(*) FROM bp_album_schema_version", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(versions, 1);
    }

    #[test]
    fn test_privacy_check_constraint() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn, "bp_album").unwrap();

        let result = conn.execute(
            "INSERT INTO bp_album (owner_type, owner_id, privacy) VALUES ('user', 1, 3)",
            [],
        );
        assert!(result.is_err());
    }
}
