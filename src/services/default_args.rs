use super::picture_service::PictureAlbum;
use crate::context::RequestContext;
use crate::models::{PrivacyFilter, QueryArgs};

/// Parses `s` only if it is the canonical decimal form of an integer ("12", "-3"; not "012" or "+1")
pub fn parse_canonical_int(s: &str) -> Option<i64> {
    s.parse::<i64>().ok().filter(|n| n.to_string() == s)
}

impl PictureAlbum {
    /// Query defaults derived from the request: whose album, which picture, which page
    pub fn default_query_args(&self, ctx: &RequestContext) -> QueryArgs {
        let mut args = QueryArgs {
            owner_id: ctx.displayed_user_id.filter(|id| *id != 0),
            id: None,
            page: 1,
            per_page: Some(self.config.per_page).filter(|n| *n > 0),
            privacy: PrivacyFilter::Permitted,
            priv_override: false,
            ordersort: "ASC".to_string(),
            orderkey: "id".to_string(),
            groupby: None,
            ..Default::default()
        };

        if ctx.is_action(&self.config.single_slug) {
            args.id = ctx
                .first_action_variable()
                .and_then(parse_canonical_int)
                .filter(|id| *id != 0);
            args.per_page = Some(1);
        }
        if ctx.is_action(&self.config.pictures_slug) {
            args.page = ctx
                .first_action_variable()
                .and_then(parse_canonical_int)
                .unwrap_or(1);
        }

        args
    }
}
