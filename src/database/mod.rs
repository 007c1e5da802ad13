pub mod schema;

use std::path::Path;

use rusqlite::Connection;

use crate::config::AlbumConfig;
use crate::error::AlbumError;

/// Opens (or creates) the album database file and initializes the schema
pub fn open_database(path: impl AsRef<Path>, config: &AlbumConfig) -> Result<Connection, AlbumError> {
    let path = path.as_ref();
    config.validate()?;

    // Make sure the directory exists
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    log::info!("Opening album database at {:?}", path);
    let conn = Connection::open(path)?;
    schema::init_schema(&conn, &config.table_name)?;

    Ok(conn)
}

/// In-memory database with the schema in place
pub fn open_in_memory(config: &AlbumConfig) -> Result<Connection, AlbumError> {
    config.validate()?;
    let conn = Connection::open_in_memory()?;
    schema::init_schema(&conn, &config.table_name)?;
    Ok(conn)
}
