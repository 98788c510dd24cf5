//! Middleware for Bookshelf.
//!
//! - `token_auth` - API token validation; attaches an [`AuthUser`] to the
//!   request when a valid bearer token is presented.

mod token_auth;

pub use token_auth::{authenticate, resolve_token};

/// Identity injected into request extensions after successful token validation.
///
/// Handlers take `Option<Extension<AuthUser>>`: anonymous requests simply
/// carry no extension and are judged by the policy table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: String,
    pub username: String,
    /// "admin" or "member"
    pub role: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

impl From<crate::db::User> for AuthUser {
    fn from(user: crate::db::User) -> Self {
        AuthUser {
            user_id: user.id,
            username: user.username,
            role: user.role,
        }
    }
}
