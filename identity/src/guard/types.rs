use serde::Serialize;

use crate::role::Role;

/// Verified caller identity for the duration of one request.
///
/// - Built only from edge-injected headers, never from request bodies
/// - Never persisted; business code copies `user_id` onto the entities it creates
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityContext {
    pub user_id: i64,
    pub role: Role,
    pub correlation_id: Option<String>,
}

impl IdentityContext {
    pub fn new(user_id: i64, role: Role) -> Self {
        Self {
            user_id,
            role,
            correlation_id: None,
        }
    }

    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
