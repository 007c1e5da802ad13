use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};

use super::picture_service::PictureAlbum;
use crate::context::RequestContext;
use crate::error::AlbumError;
use crate::models::{
    Adjacent, GroupBy, OrderKey, Picture, PictureQuery, PictureQueryResult, PrivacyCount,
    PrivacyFilter, PrivacyLevel, QueryArgs, SortOrder, PICTURE_COLUMNS,
};

/// Shape of the rows a built query returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMode {
    Pictures,
    Count,
    PrivacyCounts,
}

/// SQL text plus its bound parameters
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltQuery {
    pub sql: String,
    pub params: Vec<Value>,
    pub mode: QueryMode,
}

/// Privacy restriction resolved against the viewer's permission level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PrivacyScope {
    Exactly(PrivacyLevel),
    UpTo(i64),
    Unrestricted,
    Denied,
}

fn privacy_scope(args: &QueryArgs, permission: i64) -> PrivacyScope {
    match args.privacy {
        PrivacyFilter::Tier(tier) if args.priv_override || tier.is_visible_to(permission) => {
            PrivacyScope::Exactly(tier)
        }
        PrivacyFilter::Tier(_) => PrivacyScope::Denied,
        PrivacyFilter::All if args.priv_override => PrivacyScope::Unrestricted,
        // "all" without the override is still capped at the viewer's level
        PrivacyFilter::All | PrivacyFilter::Permitted => PrivacyScope::UpTo(permission),
    }
}

fn order_clause(args: &QueryArgs) -> String {
    let key = OrderKey::parse(&args.orderkey);
    if key == OrderKey::Id && args.orderkey != "id" {
        log::warn!("Unknown order key {:?}, ordering by id", args.orderkey);
    }
    let sort = SortOrder::parse(&args.ordersort);
    if sort == SortOrder::Desc && args.ordersort != "DESC" {
        log::warn!("Unknown sort direction {:?}, using DESC", args.ordersort);
    }
    format!(" ORDER BY {} {}", key.column(), sort.as_sql())
}

/// Translates resolved options into SQL for `table`.
///
/// Returns `None` when the viewer may not see the requested privacy tier.
pub fn build_query(table: &str, args: &QueryArgs, permission: i64) -> Option<BuiltQuery> {
    let mut clauses = vec!["1 = 1".to_string()];
    let mut params: Vec<Value> = Vec::new();

    if let Some(owner_id) = args.owner_id {
        clauses.push("owner_id = ?".to_string());
        params.push(Value::Integer(owner_id));
    }
    if let Some(id) = args.id {
        if args.adjacent.is_none() && !args.count {
            clauses.push("id = ?".to_string());
            params.push(Value::Integer(id));
        }
    }

    match privacy_scope(args, permission) {
        PrivacyScope::Exactly(tier) => {
            clauses.push("privacy = ?".to_string());
            params.push(Value::Integer(tier.code()));
        }
        PrivacyScope::UpTo(level) => {
            clauses.push("privacy <= ?".to_string());
            params.push(Value::Integer(level));
        }
        PrivacyScope::Unrestricted => {}
        PrivacyScope::Denied => return None,
    }

    if args.count {
        let where_clause = clauses.join(" AND ");
        let (sql, mode) = match args.groupby {
            Some(GroupBy::Privacy) => (
                format!(
                    "SELECT privacy, COUNT(id) AS count FROM {} WHERE {} GROUP BY privacy ORDER BY privacy",
                    table, where_clause
                ),
                QueryMode::PrivacyCounts,
            ),
            None => (
                format!(
                    "SELECT COUNT(DISTINCT id) AS count FROM {} WHERE {}",
                    table, where_clause
                ),
                QueryMode::Count,
            ),
        };
        return Some(BuiltQuery { sql, params, mode });
    }

    let mut tail = String::new();
    match (args.adjacent, args.id) {
        (Some(Adjacent::Next), anchor) => {
            clauses.push("id > ?".to_string());
            params.push(Value::Integer(anchor.unwrap_or(0)));
            tail.push_str(" ORDER BY id ASC LIMIT 1");
        }
        (Some(Adjacent::Prev), anchor) => {
            clauses.push("id < ?".to_string());
            params.push(Value::Integer(anchor.unwrap_or(0)));
            tail.push_str(" ORDER BY id DESC LIMIT 1");
        }
        (None, Some(_)) => {}
        (None, None) => {
            tail.push_str(&order_clause(args));
            if let Some(per_page) = args.per_page.filter(|n| *n > 0) {
                let offset = args
                    .offset
                    .filter(|o| *o > 0)
                    .unwrap_or_else(|| (args.page.max(1) - 1).saturating_mul(per_page));
                tail.push_str(" LIMIT ? OFFSET ?");
                params.push(Value::Integer(per_page));
                params.push(Value::Integer(offset));
            }
        }
    }

    let sql = format!(
        "SELECT {} FROM {} WHERE {}{}",
        PICTURE_COLUMNS,
        table,
        clauses.join(" AND "),
        tail
    );
    Some(BuiltQuery {
        sql,
        params,
        mode: QueryMode::Pictures,
    })
}

impl PictureAlbum {
    /// Context defaults, overridden by `query`, then passed through the query-args hooks
    pub fn resolve_query_args(&self, ctx: &RequestContext, query: PictureQuery) -> QueryArgs {
        let args = query.merge_over(self.default_query_args(ctx));
        self.hooks.filter_query_args(args)
    }

    pub fn build_query(&self, args: &QueryArgs, permission: i64) -> Option<BuiltQuery> {
        build_query(&self.config.table_name, args, permission)
    }

    /// Runs a picture query: rows, a count, or counts per privacy tier
    pub fn query_pictures(
        &self,
        conn: &Connection,
        ctx: &RequestContext,
        query: PictureQuery,
    ) -> Result<PictureQueryResult, AlbumError> {
        let args = self.resolve_query_args(ctx, query);
        self.query_with_args(conn, &args, ctx.privacy_level_permitted())
    }

    /// Runs already resolved options; no defaults or hooks are applied
    pub fn query_with_args(
        &self,
        conn: &Connection,
        args: &QueryArgs,
        permission: i64,
    ) -> Result<PictureQueryResult, AlbumError> {
        let Some(built) = self.build_query(args, permission) else {
            log::debug!(
                "Privacy filter {:?} denied at permission level {}",
                args.privacy,
                permission
            );
            return Ok(PictureQueryResult::denied(args));
        };

        let mut stmt = conn.prepare(&built.sql)?;
        let params = params_from_iter(built.params.iter());

        let result = match built.mode {
            QueryMode::Pictures => {
                let pictures = stmt
                    .query_map(params, |row| Picture::try_from(row))?
                    .collect::<Result<Vec<_>, _>>()?;
                PictureQueryResult::Pictures(pictures)
            }
            QueryMode::Count => {
                let count: i64 = stmt.query_row(params, |row| row.get(0))?;
                PictureQueryResult::Count(count)
            }
            QueryMode::PrivacyCounts => {
                let counts = stmt
                    .query_map(params, |row| {
                        Ok(PrivacyCount {
                            privacy: row.get(0)?,
                            count: row.get(1)?,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                PictureQueryResult::PrivacyCounts(counts)
            }
        };

        Ok(result)
    }

    fn adjacent_picture(
        &self,
        conn: &Connection,
        ctx: &RequestContext,
        id: i64,
        direction: Adjacent,
    ) -> Result<Option<Picture>, AlbumError> {
        let query = PictureQuery::new().id(id).adjacent(direction).count(false);
        Ok(self
            .query_pictures(conn, ctx, query)?
            .into_pictures()
            .into_iter()
            .next())
    }

    /// The picture with the smallest id above `id`
    pub fn next_picture(
        &self,
        conn: &Connection,
        ctx: &RequestContext,
        id: i64,
    ) -> Result<Option<Picture>, AlbumError> {
        self.adjacent_picture(conn, ctx, id, Adjacent::Next)
    }

    /// The picture with the largest id below `id`
    pub fn prev_picture(
        &self,
        conn: &Connection,
        ctx: &RequestContext,
        id: i64,
    ) -> Result<Option<Picture>, AlbumError> {
        self.adjacent_picture(conn, ctx, id, Adjacent::Prev)
    }

    /// Number of pictures matching `query`, summed over tiers if it groups
    pub fn count_pictures(
        &self,
        conn: &Connection,
        ctx: &RequestContext,
        query: PictureQuery,
    ) -> Result<i64, AlbumError> {
        Ok(self.query_pictures(conn, ctx, query.count(true))?.total())
    }
}
