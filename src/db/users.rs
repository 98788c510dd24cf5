//! User and API token database queries.
//!
//! Token format: `shelf_{prefix}_{secret}` where `{prefix}` is 8 chars used
//! for the indexed lookup and the SHA-256 of the whole token is what gets
//! stored and compared.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::FromRow;

use super::DbPool;
use crate::{Error, Result};

/// Fixed prefix identifying Bookshelf API tokens.
pub const TOKEN_PREFIX: &str = "shelf_";

const LOOKUP_PREFIX_LEN: usize = 8;

/// Username provisioned for `ADMIN_BOOTSTRAP_TOKEN`.
pub const BOOTSTRAP_ADMIN: &str = "admin";

// ============================================================================
// User Types
// ============================================================================

/// User role enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    #[default]
    Member,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Member => "member",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "admin" => Self::Admin,
            _ => Self::Member,
        }
    }
}

/// User record from the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub role: String,
    pub created_at: String,
}

impl User {
    pub fn role_enum(&self) -> UserRole {
        UserRole::from_str(&self.role)
    }

    pub fn is_admin(&self) -> bool {
        self.role_enum() == UserRole::Admin
    }
}

// ============================================================================
// API Token Types
// ============================================================================

/// API token record. Only the hash of the secret is kept.
#[derive(Debug, Clone, FromRow)]
pub struct ApiToken {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub token_prefix: String,
    pub token_hash: String,
    pub created_at: String,
    pub last_used_at: Option<String>,
    pub revoked_at: Option<String>,
}

/// Extract the lookup prefix from a raw token, if it is well formed.
pub fn token_lookup_prefix(token: &str) -> Option<&str> {
    let body = token.strip_prefix(TOKEN_PREFIX)?;
    if body.len() <= LOOKUP_PREFIX_LEN || !body.is_char_boundary(LOOKUP_PREFIX_LEN) {
        return None;
    }
    Some(&body[..LOOKUP_PREFIX_LEN])
}

/// SHA-256 hex digest of a raw token.
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Generate a fresh random token string.
pub fn generate_token() -> String {
    const ALPHABET: [char; 36] = [
        '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h',
        'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
    ];
    format!(
        "{}{}_{}",
        TOKEN_PREFIX,
        nanoid::nanoid!(LOOKUP_PREFIX_LEN, &ALPHABET),
        nanoid::nanoid!(32, &ALPHABET)
    )
}

// ============================================================================
// User Queries
// ============================================================================

/// Create a new user.
pub async fn create_user(pool: &DbPool, username: &str, role: UserRole) -> Result<User> {
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, username, role)
        VALUES (?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(uuid::Uuid::new_v4().to_string())
    .bind(username)
    .bind(role.as_str())
    .fetch_one(pool)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            Error::AlreadyExists(format!("User '{}' already exists", username))
        }
        _ => Error::Database(e),
    })
}

/// Get a user by ID.
pub async fn get_user(pool: &DbPool, id: &str) -> Result<User> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("User not found: {}", id)))
}

/// Get a user by username.
pub async fn get_user_by_username(pool: &DbPool, username: &str) -> Result<Option<User>> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(pool)
        .await
        .map_err(Error::Database)
}

// ============================================================================
// API Token Queries
// ============================================================================

/// Store a caller-supplied token for a user.
pub async fn register_api_token(
    pool: &DbPool,
    user_id: &str,
    name: &str,
    token: &str,
) -> Result<ApiToken> {
    let prefix = token_lookup_prefix(token).ok_or_else(|| {
        Error::Internal(format!(
            "API tokens must look like {}<8 chars>_<secret>",
            TOKEN_PREFIX
        ))
    })?;

    let row = sqlx::query_as::<_, ApiToken>(
        r#"
        INSERT INTO api_tokens (id, user_id, name, token_prefix, token_hash)
        VALUES (?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(uuid::Uuid::new_v4().to_string())
    .bind(user_id)
    .bind(name)
    .bind(prefix)
    .bind(hash_token(token))
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Issue a new random token for a user. The raw token is only returned here.
pub async fn issue_api_token(pool: &DbPool, user_id: &str, name: &str) -> Result<(ApiToken, String)> {
    let token = generate_token();
    let record = register_api_token(pool, user_id, name, &token).await?;
    Ok((record, token))
}

/// Active (non-revoked) tokens sharing a lookup prefix.
pub async fn list_active_tokens_by_prefix(pool: &DbPool, prefix: &str) -> Result<Vec<ApiToken>> {
    sqlx::query_as::<_, ApiToken>(
        r#"
        SELECT * FROM api_tokens
        WHERE token_prefix = ? AND revoked_at IS NULL
        "#,
    )
    .bind(prefix)
    .fetch_all(pool)
    .await
    .map_err(Error::Database)
}

/// Whether any token (revoked or not) already uses this hash.
pub async fn token_hash_exists(pool: &DbPool, token: &str) -> Result<bool> {
    let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM api_tokens WHERE token_hash = ?")
        .bind(hash_token(token))
        .fetch_optional(pool)
        .await?;

    Ok(found.is_some())
}

/// Record that a token was used.
pub async fn touch_api_token(pool: &DbPool, id: &str) -> Result<()> {
    sqlx::query("UPDATE api_tokens SET last_used_at = datetime('now') WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Revoke a token.
pub async fn revoke_api_token(pool: &DbPool, id: &str) -> Result<()> {
    let result = sqlx::query(
        "UPDATE api_tokens SET revoked_at = datetime('now') WHERE id = ? AND revoked_at IS NULL",
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("API token not found: {}", id)));
    }

    Ok(())
}

/// Ensure an `admin` user owns `token`. Returns `false` if the token was
/// already registered.
pub async fn bootstrap_admin_token(pool: &DbPool, token: &str) -> Result<bool> {
    if token_hash_exists(pool, token).await? {
        return Ok(false);
    }

    let admin = match get_user_by_username(pool, BOOTSTRAP_ADMIN).await? {
        Some(user) => user,
        None => create_user(pool, BOOTSTRAP_ADMIN, UserRole::Admin).await?,
    };
    register_api_token(pool, &admin.id, "bootstrap", token).await?;

    Ok(true)
}
