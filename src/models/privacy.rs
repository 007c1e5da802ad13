use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

/// Visibility tier of a picture; higher codes are more restrictive
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrivacyLevel {
    #[default]
    Public,
    Members,
    Friends,
    Private,
    Admin,
}

/// Permission level a viewer needs before a tier may be queried on its own.
/// `None` means the tier is open to everyone.
const TIER_REQUIREMENTS: [(PrivacyLevel, Option<i64>); 5] = [
    (PrivacyLevel::Public, None),
    (PrivacyLevel::Members, Some(2)),
    (PrivacyLevel::Friends, Some(4)),
    (PrivacyLevel::Private, Some(6)),
    (PrivacyLevel::Admin, Some(10)),
];

impl PrivacyLevel {
    pub fn code(&self) -> i64 {
        match self {
            PrivacyLevel::Public => 0,
            PrivacyLevel::Members => 2,
            PrivacyLevel::Friends => 4,
            PrivacyLevel::Private => 6,
            PrivacyLevel::Admin => 10,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(PrivacyLevel::Public),
            2 => Some(PrivacyLevel::Members),
            4 => Some(PrivacyLevel::Friends),
            6 => Some(PrivacyLevel::Private),
            10 => Some(PrivacyLevel::Admin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            PrivacyLevel::Public => "public",
            PrivacyLevel::Members => "members",
            PrivacyLevel::Friends => "friends",
            PrivacyLevel::Private => "private",
            PrivacyLevel::Admin => "admin",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "public" => Some(PrivacyLevel::Public),
            "members" => Some(PrivacyLevel::Members),
            "friends" => Some(PrivacyLevel::Friends),
            "private" => Some(PrivacyLevel::Private),
            "admin" => Some(PrivacyLevel::Admin),
            _ => None,
        }
    }

    pub fn all() -> &'static [PrivacyLevel] {
        static ALL: [PrivacyLevel; 5] = [
            PrivacyLevel::Public,
            PrivacyLevel::Members,
            PrivacyLevel::Friends,
            PrivacyLevel::Private,
            PrivacyLevel::Admin,
        ];
        &ALL
    }

    /// Looks the tier up in the requirement table
    pub fn required_permission(&self) -> Option<i64> {
        TIER_REQUIREMENTS
            .iter()
            .find(|(tier, _)| tier == self)
            .and_then(|(_, required)| *required)
    }

    /// Whether a viewer with `permission` may query this tier
    pub fn is_visible_to(&self, permission: i64) -> bool {
        match self.required_permission() {
            Some(required) => permission >= required,
            None => true,
        }
    }
}

impl ToSql for PrivacyLevel {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.code()))
    }
}

impl FromSql for PrivacyLevel {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let code = i64::column_result(value)?;
        PrivacyLevel::from_code(code).ok_or(FromSqlError::OutOfRange(code))
    }
}

/// Which privacy tiers a query should return
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PrivacyFilter {
    /// Exactly one tier; denied outright if the viewer may not see it
    Tier(PrivacyLevel),
    /// Every tier, but only with the override flag; otherwise same as `Permitted`
    All,
    /// Every tier up to and including the viewer's permission level
    #[default]
    Permitted,
}

impl PrivacyFilter {
    /// Lenient parse: tier names, numeric codes, "all" and "permitted".
    /// Anything unrecognised falls back to `Permitted`.
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if let Some(tier) = PrivacyLevel::from_name(s) {
            return PrivacyFilter::Tier(tier);
        }
        if let Ok(code) = s.parse::<i64>() {
            return PrivacyFilter::from_code(code);
        }
        match s.to_lowercase().as_str() {
            "all" => PrivacyFilter::All,
            _ => PrivacyFilter::Permitted,
        }
    }

    pub fn from_code(code: i64) -> Self {
        PrivacyLevel::from_code(code)
            .map(PrivacyFilter::Tier)
            .unwrap_or(PrivacyFilter::Permitted)
    }
}

impl From<PrivacyLevel> for PrivacyFilter {
    fn from(level: PrivacyLevel) -> Self {
        PrivacyFilter::Tier(level)
    }
}

impl<'de> Deserialize<'de> for PrivacyFilter {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Code(i64),
            Name(String),
            Other(serde_json::Value),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Code(code) => PrivacyFilter::from_code(code),
            Raw::Name(name) => PrivacyFilter::parse(&name),
            Raw::Other(_) => PrivacyFilter::Permitted,
        })
    }
}
