//! Author database queries.
//!
//! Mutations are single conditional statements: an update or delete against
//! a missing id reports "nothing happened" instead of failing, so callers
//! never have to check existence first.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, SqliteExecutor};

use super::{from_micros, to_micros};
use crate::Result;

// ============================================================================
// Types
// ============================================================================

/// Author record.
#[derive(Debug, Clone, PartialEq)]
pub struct Author {
    pub id: String,
    pub name: String,
    pub biography: String,
    pub birthday: Option<NaiveDate>,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl Author {
    /// Age in whole years on `today`, counting 365-day years.
    pub fn age(&self, today: NaiveDate) -> Option<i64> {
        self.birthday
            .map(|birthday| (today - birthday).num_days() / 365)
    }
}

#[derive(Debug, FromRow)]
struct AuthorRow {
    id: String,
    name: String,
    biography: String,
    birthday: Option<NaiveDate>,
    created: i64,
    modified: i64,
}

impl From<AuthorRow> for Author {
    fn from(row: AuthorRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            biography: row.biography,
            birthday: row.birthday,
            created: from_micros(row.created),
            modified: from_micros(row.modified),
        }
    }
}

/// Input for creating a new author.
#[derive(Debug, Clone, Default)]
pub struct CreateAuthor {
    pub name: String,
    pub biography: String,
    pub birthday: Option<NaiveDate>,
}

/// Input for updating an author. `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateAuthor {
    pub name: Option<String>,
    pub biography: Option<String>,
    /// `Some(None)` clears the birthday.
    pub birthday: Option<Option<NaiveDate>>,
}

// ============================================================================
// Queries
// ============================================================================

/// Create a new author. `created` and `modified` are both set to `now`.
pub async fn create_author(
    executor: impl SqliteExecutor<'_>,
    input: CreateAuthor,
    now: DateTime<Utc>,
) -> Result<Author> {
    let id = uuid::Uuid::new_v4().to_string();
    let at = to_micros(now);

    let row = sqlx::query_as::<_, AuthorRow>(
        r#"
        INSERT INTO authors (id, name, biography, birthday, created, modified)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(&id)
    .bind(&input.name)
    .bind(&input.biography)
    .bind(input.birthday)
    .bind(at)
    .bind(at)
    .fetch_one(executor)
    .await?;

    Ok(row.into())
}

/// Get an author by ID.
pub async fn get_author(executor: impl SqliteExecutor<'_>, id: &str) -> Result<Option<Author>> {
    let row = sqlx::query_as::<_, AuthorRow>("SELECT * FROM authors WHERE id = ?")
        .bind(id)
        .fetch_optional(executor)
        .await?;

    Ok(row.map(Author::from))
}

/// Check whether an author exists.
pub async fn author_exists(executor: impl SqliteExecutor<'_>, id: &str) -> Result<bool> {
    let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM authors WHERE id = ?")
        .bind(id)
        .fetch_optional(executor)
        .await?;

    Ok(found.is_some())
}

/// List authors ordered by name (ties broken by id for a stable page order).
pub async fn list_authors_paginated(
    executor: impl SqliteExecutor<'_>,
    limit: i64,
    offset: i64,
) -> Result<Vec<Author>> {
    let rows = sqlx::query_as::<_, AuthorRow>(
        r#"
        SELECT * FROM authors
        ORDER BY name ASC, id ASC
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(executor)
    .await?;

    Ok(rows.into_iter().map(Author::from).collect())
}

/// Count all authors.
pub async fn count_authors(executor: impl SqliteExecutor<'_>) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM authors")
        .fetch_one(executor)
        .await?;

    Ok(count)
}

/// Update an author in place, returning `None` when the id does not exist.
///
/// `modified` becomes `max(now, modified + 1µs)` so it strictly increases
/// even when the clock has not moved.
pub async fn update_author(
    executor: impl SqliteExecutor<'_>,
    id: &str,
    input: UpdateAuthor,
    now: DateTime<Utc>,
) -> Result<Option<Author>> {
    let (set_birthday, birthday) = match input.birthday {
        Some(value) => (true, value),
        None => (false, None),
    };

    let row = sqlx::query_as::<_, AuthorRow>(
        r#"
        UPDATE authors SET
            name = COALESCE(?, name),
            biography = COALESCE(?, biography),
            birthday = CASE WHEN ? THEN ? ELSE birthday END,
            modified = MAX(?, modified + 1)
        WHERE id = ?
        RETURNING *
        "#,
    )
    .bind(input.name)
    .bind(input.biography)
    .bind(set_birthday)
    .bind(birthday)
    .bind(to_micros(now))
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(row.map(Author::from))
}

/// Delete an author and, through the foreign key, all of their books.
///
/// Returns `false` when no author had that id.
pub async fn delete_author(executor: impl SqliteExecutor<'_>, id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM authors WHERE id = ?")
        .bind(id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}
