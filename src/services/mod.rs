pub mod default_args;
pub mod picture_service;
pub mod query_service;

pub use default_args::parse_canonical_int;
pub use picture_service::PictureAlbum;
pub use query_service::{build_query, BuiltQuery, QueryMode};
