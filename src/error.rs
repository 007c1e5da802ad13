use std::fmt;

/// Central error type for the album store
#[derive(Debug)]
pub enum AlbumError {
    /// Database error (rusqlite)
    Database(rusqlite::Error),
    /// Filesystem error (database file, config file)
    Filesystem(std::io::Error),
    /// Invalid or unreadable configuration
    Config(String),
    /// Loose query options could not be deserialized
    Serialization(serde_json::Error),
}

impl fmt::Display for AlbumError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AlbumError::Database(e) => write!(f, "Database error: {}", e),
            AlbumError::Filesystem(e) => write!(f, "Filesystem error: {}", e),
            AlbumError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AlbumError::Serialization(e) => write!(f, "Serialization error: {}", e),
        }
    }
}

impl std::error::Error for AlbumError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AlbumError::Database(e) => Some(e),
            AlbumError::Filesystem(e) => Some(e),
            AlbumError::Serialization(e) => Some(e),
            _ => None,
        }
    }
}

// Conversions from other error types
impl From<rusqlite::Error> for AlbumError {
    fn from(e: rusqlite::Error) -> Self {
        AlbumError::Database(e)
    }
}

impl From<std::io::Error> for AlbumError {
    fn from(e: std::io::Error) -> Self {
        AlbumError::Filesystem(e)
    }
}

impl From<serde_json::Error> for AlbumError {
    fn from(e: serde_json::Error) -> Self {
        AlbumError::Serialization(e)
    }
}

impl From<toml::de::Error> for AlbumError {
    fn from(e: toml::de::Error) -> Self {
        AlbumError::Config(e.to_string())
    }
}
