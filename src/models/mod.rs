pub mod picture;
pub mod privacy;
pub mod query;

pub use picture::{Picture, Rendition, RenditionSize, PICTURE_COLUMNS, USER_OWNER_TYPE};
pub use privacy::{PrivacyFilter, PrivacyLevel};
pub use query::{
    Adjacent, GroupBy, OrderKey, PictureQuery, PictureQueryResult, PrivacyCount, QueryArgs,
    SortOrder,
};
