use crate::role::Role;

/// Authorization tier of an operation.
///
/// The same vocabulary is used by the edge route table and by each service when
/// it declares what an operation requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// Never authenticated.
    Public,
    /// Never blocked, but a valid token (edge) or identity headers (service) are
    /// picked up when present.
    PublicOptional,
    /// Requires a verified identity.
    Protected,
    /// Requires a verified identity with the ADMIN role.
    AdminOnly,
}

impl Visibility {
    pub fn requires_identity(&self) -> bool {
        matches!(self, Visibility::Protected | Visibility::AdminOnly)
    }

    pub fn required_role(&self) -> Option<Role> {
        match self {
            Visibility::AdminOnly => Some(Role::Admin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::PublicOptional => "public_optional",
            Visibility::Protected => "protected",
            Visibility::AdminOnly => "admin_only",
        }
    }
}
