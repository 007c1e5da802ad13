use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::picture::Picture;
use super::privacy::{PrivacyFilter, PrivacyLevel};
use crate::error::AlbumError;

/// Direction of an adjacency lookup relative to an anchor id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Adjacent {
    Next,
    Prev,
}

impl Adjacent {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "next" => Some(Adjacent::Next),
            "prev" => Some(Adjacent::Prev),
            _ => None,
        }
    }
}

/// Whitelisted ordering columns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrderKey {
    #[default]
    Id,
    Owner,
    Status,
}

impl OrderKey {
    /// Unknown keys fall back to `Id`; the raw value never reaches the SQL text
    pub fn parse(s: &str) -> Self {
        match s {
            "id" => OrderKey::Id,
            "owner_id" | "user_id" => OrderKey::Owner,
            "status" | "privacy" => OrderKey::Status,
            _ => OrderKey::Id,
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            OrderKey::Id => "id",
            OrderKey::Owner => "owner_id",
            OrderKey::Status => "privacy",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// Anything other than exactly `ASC` or `DESC` falls back to `Desc`
    pub fn parse(s: &str) -> Self {
        match s {
            "ASC" => SortOrder::Asc,
            "DESC" => SortOrder::Desc,
            _ => SortOrder::Desc,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Aggregation for count queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    Privacy,
}

impl GroupBy {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "privacy" => Some(GroupBy::Privacy),
            _ => None,
        }
    }
}

/// Fully resolved query options
#[derive(Debug, Clone, PartialEq)]
pub struct QueryArgs {
    pub owner_id: Option<i64>,
    pub id: Option<i64>,
    pub adjacent: Option<Adjacent>,
    pub privacy: PrivacyFilter,
    pub priv_override: bool,
    pub count: bool,
    pub groupby: Option<GroupBy>,
    pub page: i64,
    pub per_page: Option<i64>,
    pub offset: Option<i64>,
    /// Raw order key, whitelisted when the SQL is built
    pub orderkey: String,
    /// Raw sort direction, whitelisted when the SQL is built
    pub ordersort: String,
}

impl Default for QueryArgs {
    fn default() -> Self {
        Self {
            owner_id: None,
            id: None,
            adjacent: None,
            privacy: PrivacyFilter::Permitted,
            priv_override: false,
            count: false,
            groupby: None,
            page: 1,
            per_page: None,
            offset: None,
            orderkey: "id".to_string(),
            ordersort: "ASC".to_string(),
        }
    }
}

/// Caller-supplied overrides, merged over the context defaults.
///
/// Deserializes from a loose JSON object: integers may be numbers or numeric
/// strings, and `false`, `null` or `0` clear an id-like default.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct PictureQuery {
    #[serde(deserialize_with = "lenient::clearable_int")]
    pub owner_id: Option<Option<i64>>,
    #[serde(deserialize_with = "lenient::clearable_int")]
    pub id: Option<Option<i64>>,
    #[serde(deserialize_with = "lenient::adjacent")]
    pub adjacent: Option<Adjacent>,
    pub privacy: Option<PrivacyFilter>,
    #[serde(deserialize_with = "lenient::flag")]
    pub priv_override: Option<bool>,
    #[serde(deserialize_with = "lenient::flag")]
    pub count: Option<bool>,
    #[serde(deserialize_with = "lenient::text")]
    pub groupby: Option<String>,
    #[serde(deserialize_with = "lenient::int")]
    pub page: Option<i64>,
    #[serde(deserialize_with = "lenient::clearable_int")]
    pub per_page: Option<Option<i64>>,
    #[serde(deserialize_with = "lenient::int")]
    pub offset: Option<i64>,
    #[serde(deserialize_with = "lenient::text")]
    pub orderkey: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub ordersort: Option<String>,
}

impl PictureQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses loose options, e.g. decoded request parameters
    pub fn from_json(value: Value) -> Result<Self, AlbumError> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn owner(mut self, owner_id: i64) -> Self {
        self.owner_id = Some(Some(owner_id));
        self
    }

    pub fn any_owner(mut self) -> Self {
        self.owner_id = Some(None);
        self
    }

    pub fn id(mut self, id: i64) -> Self {
        self.id = Some(Some(id));
        self
    }

    pub fn adjacent(mut self, adjacent: Adjacent) -> Self {
        self.adjacent = Some(adjacent);
        self
    }

    pub fn privacy(mut self, privacy: impl Into<PrivacyFilter>) -> Self {
        self.privacy = Some(privacy.into());
        self
    }

    pub fn priv_override(mut self, enabled: bool) -> Self {
        self.priv_override = Some(enabled);
        self
    }

    pub fn count(mut self, enabled: bool) -> Self {
        self.count = Some(enabled);
        self
    }

    pub fn groupby(mut self, groupby: impl Into<String>) -> Self {
        self.groupby = Some(groupby.into());
        self
    }

    pub fn page(mut self, page: i64) -> Self {
        self.page = Some(page);
        self
    }

    pub fn per_page(mut self, per_page: Option<i64>) -> Self {
        self.per_page = Some(per_page);
        self
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn order_by(mut self, orderkey: impl Into<String>, ordersort: impl Into<String>) -> Self {
        self.orderkey = Some(orderkey.into());
        self.ordersort = Some(ordersort.into());
        self
    }

    /// Applies every option the caller set on top of `defaults`
    pub fn merge_over(self, defaults: QueryArgs) -> QueryArgs {
        let mut args = defaults;
        if let Some(owner_id) = self.owner_id {
            args.owner_id = owner_id.filter(|id| *id != 0);
        }
        if let Some(id) = self.id {
            args.id = id.filter(|id| *id != 0);
        }
        if let Some(adjacent) = self.adjacent {
            args.adjacent = Some(adjacent);
        }
        if let Some(privacy) = self.privacy {
            args.privacy = privacy;
        }
        if let Some(priv_override) = self.priv_override {
            args.priv_override = priv_override;
        }
        if let Some(count) = self.count {
            args.count = count;
        }
        if let Some(groupby) = self.groupby {
            args.groupby = GroupBy::parse(&groupby);
        }
        if let Some(page) = self.page {
            args.page = page;
        }
        if let Some(per_page) = self.per_page {
            args.per_page = per_page.filter(|n| *n > 0);
        }
        if let Some(offset) = self.offset {
            args.offset = Some(offset);
        }
        if let Some(orderkey) = self.orderkey {
            args.orderkey = orderkey;
        }
        if let Some(ordersort) = self.ordersort {
            args.ordersort = ordersort;
        }
        args
    }
}

/// Number of matching pictures in one privacy tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PrivacyCount {
    pub privacy: PrivacyLevel,
    pub count: i64,
}

/// What a picture query produced, depending on its mode
#[derive(Debug, Clone, PartialEq)]
pub enum PictureQueryResult {
    Pictures(Vec<Picture>),
    Count(i64),
    PrivacyCounts(Vec<PrivacyCount>),
}

impl PictureQueryResult {
    /// Empty result of the same shape the query would have produced
    pub fn denied(args: &QueryArgs) -> Self {
        match (args.count, args.groupby) {
            (false, _) => PictureQueryResult::Pictures(Vec::new()),
            (true, Some(GroupBy::Privacy)) => PictureQueryResult::PrivacyCounts(Vec::new()),
            (true, None) => PictureQueryResult::Count(0),
        }
    }

    pub fn into_pictures(self) -> Vec<Picture> {
        match self {
            PictureQueryResult::Pictures(pictures) => pictures,
            _ => Vec::new(),
        }
    }

    /// Total number of matches, whatever the mode
    pub fn total(&self) -> i64 {
        match self {
            PictureQueryResult::Pictures(pictures) => pictures.len() as i64,
            PictureQueryResult::Count(count) => *count,
            PictureQueryResult::PrivacyCounts(counts) => counts.iter().map(|c| c.count).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

mod lenient {
    use super::*;

    fn as_int(value: &Value) -> Option<i64> {
        match value {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(as_int(&value))
    }

    /// Present-but-falsy becomes `Some(None)` so it can clear a default
    pub fn clearable_int<'de, D>(deserializer: D) -> Result<Option<Option<i64>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Some(as_int(&value).filter(|n| *n != 0)))
    }

    pub fn flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Some(match value {
            Value::Bool(b) => b,
            Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
            Value::String(s) => !matches!(s.trim(), "" | "0" | "false"),
            Value::Null => false,
            Value::Array(a) => !a.is_empty(),
            Value::Object(o) => !o.is_empty(),
        }))
    }

    pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            // `false` is how callers say "none"
            _ => Some(String::new()),
        })
    }

    pub fn adjacent<'de, D>(deserializer: D) -> Result<Option<Adjacent>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(value.as_str().and_then(Adjacent::parse))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_order_whitelist() {
        assert_eq!(OrderKey::parse("id"), OrderKey::Id);
        assert_eq!(OrderKey::parse("user_id").column(), "owner_id");
        assert_eq!(OrderKey::parse("status").column(), "privacy");
        assert_eq!(OrderKey::parse("DROP TABLE"), OrderKey::Id);
        assert_eq!(SortOrder::parse("ASC"), SortOrder::Asc);
        assert_eq!(SortOrder::parse("asc; --"), SortOrder::Desc);
        assert_eq!(SortOrder::parse(""), SortOrder::Desc);
    }

    #[test]
    fn test_merge_keeps_unset_defaults() {
        let defaults = QueryArgs {
            owner_id: Some(7),
            per_page: Some(20),
            ..Default::default()
        };
        let args = PictureQuery::new().page(3).merge_over(defaults);
        assert_eq!(args.owner_id, Some(7));
        assert_eq!(args.per_page, Some(20));
        assert_eq!(args.page, 3);
        assert_eq!(args.orderkey, "id");
    }

    #[test]
    fn test_loose_json_options() {
        let query = PictureQuery::from_json(json!({
            "owner_id": false,
            "id": "12",
            "adjacent": "next",
            "privacy": "friends",
            "priv_override": "1",
            "per_page": "5",
            "groupby": "privacy",
            "count": 0
        }))
        .unwrap();

        let defaults = QueryArgs {
            owner_id: Some(3),
            ..Default::default()
        };
        let args = query.merge_over(defaults);
        assert_eq!(args.owner_id, None);
        assert_eq!(args.id, Some(12));
        assert_eq!(args.adjacent, Some(Adjacent::Next));
        assert_eq!(args.privacy, PrivacyFilter::Tier(PrivacyLevel::Friends));
        assert!(args.priv_override);
        assert!(!args.count);
        assert_eq!(args.per_page, Some(5));
        assert_eq!(args.groupby, Some(GroupBy::Privacy));
    }

    #[test]
    fn test_unknown_groupby_and_adjacent_are_ignored() {
        let query = PictureQuery::from_json(json!({
            "adjacent": "sideways",
            "groupby": "owner_id"
        }))
        .unwrap();
        let args = query.merge_over(QueryArgs::default());
        assert_eq!(args.adjacent, None);
        assert_eq!(args.groupby, None);
    }

    #[test]
    fn test_denied_result_shape() {
        let mut args = QueryArgs::default();
        assert_eq!(PictureQueryResult::denied(&args), PictureQueryResult::Pictures(vec![]));
        args.count = true;
        assert_eq!(PictureQueryResult::denied(&args), PictureQueryResult::Count(0));
        args.groupby = Some(GroupBy::Privacy);
        assert!(PictureQueryResult::denied(&args).is_empty());
    }
}
