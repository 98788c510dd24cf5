//! Resource access policy.
//!
//! Each action declares the capabilities it needs; a requester holds a set of
//! capabilities derived from their identity. Checks run in declaration order
//! so the first missing capability decides the error.

use tracing::debug;

use crate::error::{Error, Result};
use crate::middleware::AuthUser;

/// Operations exposed on a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    List,
    Retrieve,
    Create,
    Update,
    PartialUpdate,
    Destroy,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Retrieve => "retrieve",
            Self::Create => "create",
            Self::Update => "update",
            Self::PartialUpdate => "partial_update",
            Self::Destroy => "destroy",
        }
    }
}

/// Something a requester may be allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Carries a verified identity.
    Authenticated,
    /// Holds the elevated (admin) role.
    Admin,
}

impl Capability {
    /// Error reported when a requester lacks this capability.
    fn denial(&self) -> Error {
        match self {
            Self::Authenticated => Error::AuthenticationRequired,
            Self::Admin => Error::PermissionDenied,
        }
    }
}

const READ: &[Capability] = &[Capability::Authenticated];
const WRITE: &[Capability] = &[Capability::Authenticated, Capability::Admin];

/// The policy table.
pub fn required_capabilities(action: Action) -> &'static [Capability] {
    match action {
        Action::List | Action::Retrieve => READ,
        Action::Create | Action::Update | Action::PartialUpdate | Action::Destroy => WRITE,
    }
}

/// Capabilities held by a requester (`None` is anonymous).
pub fn capabilities_of(requester: Option<&AuthUser>) -> Vec<Capability> {
    match requester {
        None => Vec::new(),
        Some(user) if user.is_admin() => vec![Capability::Authenticated, Capability::Admin],
        Some(_) => vec![Capability::Authenticated],
    }
}

/// Check a requester against the policy for `action`.
pub fn authorize(requester: Option<&AuthUser>, action: Action) -> Result<()> {
    let held = capabilities_of(requester);

    for required in required_capabilities(action) {
        if !held.contains(required) {
            debug!(
                action = action.as_str(),
                missing = ?required,
                user_id = requester.map(|u| u.user_id.as_str()),
                "Access denied"
            );
            return Err(required.denial());
        }
    }

    Ok(())
}
