use chrono::NaiveDateTime;
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use super::privacy::PrivacyLevel;

/// Owner type used for pictures that belong to a member
pub const USER_OWNER_TYPE: &str = "user";

/// Columns in the order `Picture::try_from(&Row)` reads them
pub const PICTURE_COLUMNS: &str = "id, owner_type, owner_id, date_uploaded, title, description, privacy, \
     pic_org_url, pic_org_path, pic_mid_url, pic_mid_path, pic_thumb_url, pic_thumb_path";

/// One stored rendition of a picture: where it is served from and where it lives on disk
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rendition {
    pub url: String,
    pub path: String,
}

impl Rendition {
    pub fn new(url: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            path: path.into(),
        }
    }
}

/// Size variants kept for every picture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenditionSize {
    Original,
    Medium,
    Thumbnail,
}

/// A picture row
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Picture {
    pub id: Option<i64>,
    pub owner_type: String,
    pub owner_id: Option<i64>,
    pub date_uploaded: Option<NaiveDateTime>,
    pub title: String,
    pub description: String,
    pub privacy: PrivacyLevel,
    pub original: Rendition,
    pub medium: Rendition,
    pub thumbnail: Rendition,
}

impl Picture {
    /// Creates an unsaved picture stamped with the current upload time
    pub fn new(owner_type: impl Into<String>, owner_id: i64) -> Self {
        Self {
            owner_type: owner_type.into(),
            owner_id: Some(owner_id),
            date_uploaded: Some(chrono::Utc::now().naive_utc()),
            ..Default::default()
        }
    }

    /// Shortcut for a picture owned by a member
    pub fn for_user(user_id: i64) -> Self {
        Self::new(USER_OWNER_TYPE, user_id)
    }

    pub fn rendition(&self, size: RenditionSize) -> &Rendition {
        match size {
            RenditionSize::Original => &self.original,
            RenditionSize::Medium => &self.medium,
            RenditionSize::Thumbnail => &self.thumbnail,
        }
    }

    pub fn rendition_mut(&mut self, size: RenditionSize) -> &mut Rendition {
        match size {
            RenditionSize::Original => &mut self.original,
            RenditionSize::Medium => &mut self.medium,
            RenditionSize::Thumbnail => &mut self.thumbnail,
        }
    }

    /// True once the row has been written and has a storage-assigned id
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}

impl<'r> TryFrom<&Row<'r>> for Picture {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'r>) -> Result<Self, Self::Error> {
        Ok(Picture {
            id: Some(row.get(0)?),
            owner_type: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
            owner_id: row.get(2)?,
            date_uploaded: row.get(3)?,
            title: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
            description: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
            privacy: row.get(6)?,
            original: Rendition {
                url: row.get::<_, Option<String>>(7)?.unwrap_or_default(),
                path: row.get::<_, Option<String>>(8)?.unwrap_or_default(),
            },
            medium: Rendition {
                url: row.get::<_, Option<String>>(9)?.unwrap_or_default(),
                path: row.get::<_, Option<String>>(10)?.unwrap_or_default(),
            },
            thumbnail: Rendition {
                url: row.get::<_, Option<String>>(11)?.unwrap_or_default(),
                path: row.get::<_, Option<String>>(12)?.unwrap_or_default(),
            },
        })
    }
}
