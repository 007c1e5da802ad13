use rusqlite::{params, Connection, OptionalExtension};

use crate::config::AlbumConfig;
use crate::error::AlbumError;
use crate::hooks::AlbumHooks;
use crate::models::{Picture, PICTURE_COLUMNS, USER_OWNER_TYPE};
use crate::sanitize::{filter_description, sanitize_title};

/// Album service: owns the configuration and hook chains, borrows a connection per call
#[derive(Debug, Default)]
pub struct PictureAlbum {
    pub(crate) config: AlbumConfig,
    pub(crate) hooks: AlbumHooks,
}

impl PictureAlbum {
    pub fn new(config: AlbumConfig) -> Self {
        Self {
            config,
            hooks: AlbumHooks::default(),
        }
    }

    pub fn with_hooks(config: AlbumConfig, hooks: AlbumHooks) -> Self {
        Self { config, hooks }
    }

    pub fn config(&self) -> &AlbumConfig {
        &self.config
    }

    pub fn hooks_mut(&mut self) -> &mut AlbumHooks {
        &mut self.hooks
    }

    fn table(&self) -> &str {
        &self.config.table_name
    }

    /// Fetches the row with `id`, if there is one
    pub fn find(&self, conn: &Connection, id: i64) -> Result<Option<Picture>, AlbumError> {
        let picture = conn
            .query_row(
                &format!("SELECT {} FROM {} WHERE id = ?1", PICTURE_COLUMNS, self.table()),
                [id],
                |row| Picture::try_from(row),
            )
            .optional()?;
        Ok(picture)
    }

    /// Like `find`, but a missing row yields an empty picture instead of `None`
    pub fn load(&self, conn: &Connection, id: i64) -> Result<Picture, AlbumError> {
        Ok(self.find(conn, id)?.unwrap_or_default())
    }

    /// Inserts or updates `picture` and returns the number of rows written.
    ///
    /// A picture without an owner is never written and yields 0, as does an
    /// update that matched no row. On insert the new id is stored in `picture`.
    pub fn save(&self, conn: &Connection, picture: &mut Picture) -> Result<usize, AlbumError> {
        let title = std::mem::take(&mut picture.title);
        picture.title = self.hooks.filter_title(title, picture.id);
        let description = std::mem::take(&mut picture.description);
        picture.description = self.hooks.filter_description(description, picture.id);

        self.hooks.notify_before_save(picture);

        let Some(owner_id) = picture.owner_id.filter(|id| *id != 0) else {
            log::warn!("Not saving picture {:?}: no owner set", picture.id);
            return Ok(0);
        };

        picture.title = sanitize_title(&picture.title);
        picture.description =
            filter_description(&picture.description, &self.config.allowed_description_tags);

        let rows = match picture.id {
            Some(id) => conn.execute(
                &format!(
                    "UPDATE {} SET
                        owner_type = ?1,
                        owner_id = ?2,
                        date_uploaded = ?3,
                        title = ?4,
                        description = ?5,
                        privacy = ?6,
                        pic_org_url = ?7,
                        pic_org_path = ?8,
                        pic_mid_url = ?9,
                        pic_mid_path = ?10,
                        pic_thumb_url = ?11,
                        pic_thumb_path = ?12
                     WHERE id = ?13",
                    self.table()
                ),
                params![
                    &picture.owner_type,
                    owner_id,
                    &picture.date_uploaded,
                    &picture.title,
                    &picture.description,
                    &picture.privacy,
                    &picture.original.url,
                    &picture.original.path,
                    &picture.medium.url,
                    &picture.medium.path,
                    &picture.thumbnail.url,
                    &picture.thumbnail.path,
                    id,
                ],
            )?,
            None => conn.execute(
                &format!(
                    "INSERT INTO {} (
                        owner_type, owner_id, date_uploaded, title, description, privacy,
                        pic_org_url, pic_org_path, pic_mid_url, pic_mid_path,
                        pic_thumb_url, pic_thumb_path
                     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                    self.table()
                ),
                params![
                    &picture.owner_type,
                    owner_id,
                    &picture.date_uploaded,
                    &picture.title,
                    &picture.description,
                    &picture.privacy,
                    &picture.original.url,
                    &picture.original.path,
                    &picture.medium.url,
                    &picture.medium.path,
                    &picture.thumbnail.url,
                    &picture.thumbnail.path,
                ],
            )?,
        };

        if rows == 0 {
            log::debug!("Save of picture {:?} wrote no rows", picture.id);
            return Ok(0);
        }

        if picture.id.is_none() {
            picture.id = Some(conn.last_insert_rowid());
        }
        log::debug!("Saved picture {:?} for owner {}", picture.id, owner_id);

        self.hooks.notify_after_save(picture);

        Ok(rows)
    }

    /// Deletes the row behind `picture`; an unsaved picture deletes nothing
    pub fn delete(&self, conn: &Connection, picture: &Picture) -> Result<usize, AlbumError> {
        let Some(id) = picture.id else {
            return Ok(0);
        };
        let rows = conn.execute(&format!("DELETE FROM {} WHERE id = ?1", self.table()), [id])?;
        log::debug!("Deleted picture {} ({} rows)", id, rows);
        Ok(rows)
    }

    /// Removes every picture of one owner
    pub fn delete_by_owner(
        &self,
        conn: &Connection,
        owner_id: i64,
        owner_type: &str,
    ) -> Result<usize, AlbumError> {
        let rows = conn.execute(
            &format!(
                "DELETE FROM {} WHERE owner_type = ?1 AND owner_id = ?2",
                self.table()
            ),
            params![owner_type, owner_id],
        )?;
        log::info!("Deleted {} pictures of {} {}", rows, owner_type, owner_id);
        Ok(rows)
    }

    pub fn delete_by_user_id(&self, conn: &Connection, user_id: i64) -> Result<usize, AlbumError> {
        self.delete_by_owner(conn, user_id, USER_OWNER_TYPE)
    }
}
