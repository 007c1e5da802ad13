//! # BP Album
//!
//! Picture storage for member photo albums on a social network.
//!
//! This crate provides:
//! - Picture records with owner, privacy tier and three renditions (original, medium, thumbnail)
//! - Insert-or-update saves with title/description sanitization and hook chains
//! - A picture query builder with privacy tiers, next/prev navigation, pagination and counts
//! - Query defaults derived from the current request
//!
//! All storage goes through a borrowed SQLite [`rusqlite::Connection`].
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use bp_album::{database, AlbumConfig, Picture, PictureAlbum, PictureQuery, RequestContext, ViewerRole};
//!
//! let config = AlbumConfig::default();
//! let conn = database::open_in_memory(&config)?;
//! let album = PictureAlbum::new(config);
//!
//! let mut picture = Picture::for_user(42);
//! picture.title = "Harbour".to_string();
//! album.save(&conn, &mut picture)?;
//!
//! let ctx = RequestContext::new()
//!     .with_displayed_user(42)
//!     .with_permission(ViewerRole::Friend);
//! let pictures = album.query_pictures(&conn, &ctx, PictureQuery::new())?.into_pictures();
//! ```

pub mod config;
pub mod context;
pub mod database;
pub mod error;
pub mod hooks;
pub mod models;
pub mod sanitize;
pub mod services;

pub use config::AlbumConfig;
pub use context::{PermissionResolver, RequestContext, ViewerRole};
pub use error::AlbumError;
pub use hooks::AlbumHooks;
pub use models::{
    Adjacent, GroupBy, OrderKey, Picture, PictureQuery, PictureQueryResult, PrivacyCount,
    PrivacyFilter, PrivacyLevel, QueryArgs, Rendition, RenditionSize, SortOrder,
};
pub use services::{build_query, BuiltQuery, PictureAlbum, QueryMode};
