//! Collaborator database queries.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteExecutor};

use super::{from_micros, to_micros};
use crate::Result;

/// Collaborator record.
#[derive(Debug, Clone, PartialEq)]
pub struct Collaborator {
    pub id: String,
    pub name: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct CollaboratorRow {
    id: String,
    name: String,
    created: i64,
    modified: i64,
}

impl From<CollaboratorRow> for Collaborator {
    fn from(row: CollaboratorRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            created: from_micros(row.created),
            modified: from_micros(row.modified),
        }
    }
}

/// Create a new collaborator.
pub async fn create_collaborator(
    executor: impl SqliteExecutor<'_>,
    name: &str,
    now: DateTime<Utc>,
) -> Result<Collaborator> {
    let id = uuid::Uuid::new_v4().to_string();
    let at = to_micros(now);

    let row = sqlx::query_as::<_, CollaboratorRow>(
        r#"
        INSERT INTO collaborators (id, name, created, modified)
        VALUES (?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(&id)
    .bind(name)
    .bind(at)
    .bind(at)
    .fetch_one(executor)
    .await?;

    Ok(row.into())
}

/// Get a collaborator by ID.
pub async fn get_collaborator(
    executor: impl SqliteExecutor<'_>,
    id: &str,
) -> Result<Option<Collaborator>> {
    let row = sqlx::query_as::<_, CollaboratorRow>("SELECT * FROM collaborators WHERE id = ?")
        .bind(id)
        .fetch_optional(executor)
        .await?;

    Ok(row.map(Collaborator::from))
}

/// Collaborators of a book, ordered by name.
pub async fn list_collaborators_for_book(
    executor: impl SqliteExecutor<'_>,
    book_id: &str,
) -> Result<Vec<Collaborator>> {
    let rows = sqlx::query_as::<_, CollaboratorRow>(
        r#"
        SELECT c.* FROM collaborators c
        INNER JOIN book_collaborators bc ON bc.collaborator_id = c.id
        WHERE bc.book_id = ?
        ORDER BY c.name ASC, c.id ASC
        "#,
    )
    .bind(book_id)
    .fetch_all(executor)
    .await?;

    Ok(rows.into_iter().map(Collaborator::from).collect())
}

/// Delete a collaborator, unlinking it from every book.
pub async fn delete_collaborator(executor: impl SqliteExecutor<'_>, id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM collaborators WHERE id = ?")
        .bind(id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}
