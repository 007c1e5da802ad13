//! Per-request state the album reads instead of platform globals.

use std::fmt;

/// Resolves the highest privacy code the current viewer may see
pub trait PermissionResolver {
    fn privacy_level_permitted(&self) -> i64;
}

impl<F> PermissionResolver for F
where
    F: Fn() -> i64,
{
    fn privacy_level_permitted(&self) -> i64 {
        self()
    }
}

/// How the viewer relates to the member whose album is displayed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewerRole {
    #[default]
    Anonymous,
    Member,
    Friend,
    Owner,
    Admin,
}

impl PermissionResolver for ViewerRole {
    fn privacy_level_permitted(&self) -> i64 {
        match self {
            ViewerRole::Anonymous => 0,
            ViewerRole::Member => 2,
            ViewerRole::Friend => 4,
            ViewerRole::Owner => 6,
            ViewerRole::Admin => 10,
        }
    }
}

/// Request-scoped context: who is being viewed, which page, and who is looking
pub struct RequestContext {
    pub displayed_user_id: Option<i64>,
    pub current_action: Option<String>,
    pub action_variables: Vec<String>,
    permission: Box<dyn PermissionResolver + Send + Sync>,
}

impl Default for RequestContext {
    fn default() -> Self {
        Self {
            displayed_user_id: None,
            current_action: None,
            action_variables: Vec::new(),
            permission: Box::new(ViewerRole::Anonymous),
        }
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("displayed_user_id", &self.displayed_user_id)
            .field("current_action", &self.current_action)
            .field("action_variables", &self.action_variables)
            .field("permission", &self.privacy_level_permitted())
            .finish()
    }
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_displayed_user(mut self, user_id: i64) -> Self {
        self.displayed_user_id = Some(user_id);
        self
    }

    pub fn with_action<I, S>(mut self, action: impl Into<String>, variables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.current_action = Some(action.into());
        self.action_variables = variables.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_permission<P>(mut self, resolver: P) -> Self
    where
        P: PermissionResolver + Send + Sync + 'static,
    {
        self.permission = Box::new(resolver);
        self
    }

    pub fn privacy_level_permitted(&self) -> i64 {
        self.permission.privacy_level_permitted()
    }

    pub fn is_action(&self, action: &str) -> bool {
        self.current_action.as_deref() == Some(action)
    }

    /// First path segment after the action, if any
    pub fn first_action_variable(&self) -> Option<&str> {
        self.action_variables.first().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_anonymous() {
        let ctx = RequestContext::new();
        assert_eq!(ctx.privacy_level_permitted(), 0);
        assert_eq!(ctx.displayed_user_id, None);
        assert_eq!(ctx.first_action_variable(), None);
    }

    #[test]
    fn test_builder() {
        let ctx = RequestContext::new()
            .with_displayed_user(5)
            .with_action("picture", ["17"])
            .with_permission(ViewerRole::Friend);
        assert_eq!(ctx.displayed_user_id, Some(5));
        assert!(ctx.is_action("picture"));
        assert!(!ctx.is_action("pictures"));
        assert_eq!(ctx.first_action_variable(), Some("17"));
        assert_eq!(ctx.privacy_level_permitted(), 4);
    }

    #[test]
    fn test_closure_resolver() {
        let ctx = RequestContext::new().with_permission(|| 6);
        assert_eq!(ctx.privacy_level_permitted(), 6);
    }
}
