use std::collections::BTreeMap;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::AlbumError;

static IDENTIFIER_EXPR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

/// Configuration for the album store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AlbumConfig {
    /// Name of the picture table; interpolated into SQL, so it must be a plain identifier
    pub table_name: String,
    /// Page size used when the caller does not ask for one
    pub per_page: i64,
    /// Navigation action that shows a single picture
    pub single_slug: String,
    /// Navigation action that lists pictures page by page
    pub pictures_slug: String,
    /// Tags (and their attributes) that survive the description filter
    pub allowed_description_tags: BTreeMap<String, Vec<String>>,
}

impl Default for AlbumConfig {
    fn default() -> Self {
        Self {
            table_name: "bp_album".to_string(),
            per_page: 20,
            single_slug: "picture".to_string(),
            pictures_slug: "pictures".to_string(),
            allowed_description_tags: default_allowed_tags(),
        }
    }
}

fn default_allowed_tags() -> BTreeMap<String, Vec<String>> {
    let tags: [(&str, &[&str]); 13] = [
        ("a", &["href", "title"]),
        ("abbr", &["title"]),
        ("acronym", &["title"]),
        ("b", &[]),
        ("blockquote", &["cite"]),
        ("cite", &[]),
        ("code", &[]),
        ("del", &["datetime"]),
        ("em", &[]),
        ("i", &[]),
        ("q", &["cite"]),
        ("strike", &[]),
        ("strong", &[]),
    ];
    tags.iter()
        .map(|(tag, attrs)| {
            (
                tag.to_string(),
                attrs.iter().map(|a| a.to_string()).collect(),
            )
        })
        .collect()
}

impl AlbumConfig {
    /// Parses a TOML document; missing keys keep their defaults
    pub fn from_toml_str(s: &str) -> Result<Self, AlbumError> {
        let config: AlbumConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AlbumError> {
        let path = path.as_ref();
        log::debug!("Loading album config from {:?}", path);
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<(), AlbumError> {
        if !IDENTIFIER_EXPR.is_match(&self.table_name) {
            return Err(AlbumError::Config(format!(
                "table_name '{}' is not a plain SQL identifier",
                self.table_name
            )));
        }
        if self.per_page < 0 {
            return Err(AlbumError::Config(format!(
                "per_page must not be negative (got {})",
                self.per_page
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AlbumConfig::default();
        assert_eq!(config.table_name, "bp_album");
        assert_eq!(config.per_page, 20);
        assert!(config.allowed_description_tags.contains_key("strong"));
        assert_eq!(
            config.allowed_description_tags["a"],
            vec!["href".to_string(), "title".to_string()]
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AlbumConfig::from_toml_str("per_page = 12\nsingle_slug = \"photo\"").unwrap();
        assert_eq!(config.per_page, 12);
        assert_eq!(config.single_slug, "photo");
        assert_eq!(config.pictures_slug, "pictures");
        assert_eq!(config.table_name, "bp_album");
    }

    #[test]
    fn test_rejects_unsafe_table_name() {
        let result = AlbumConfig::from_toml_str("table_name = \"album; DROP TABLE users\"");
        assert!(matches!(result, Err(AlbumError::Config(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "table_name = \"wp_bp_album\"").unwrap();
        writeln!(file, "[allowed_description_tags]").unwrap();
        writeln!(file, "p = []").unwrap();

        let config = AlbumConfig::load(file.path()).unwrap();
        assert_eq!(config.table_name, "wp_bp_album");
        assert_eq!(config.allowed_description_tags.len(), 1);
        assert!(config.allowed_description_tags.contains_key("p"));
    }
}
