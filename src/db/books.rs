//! Book database queries.
//!
//! Books hang off an author (cascade on delete) and link to collaborators
//! through `book_collaborators`.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteExecutor};

use super::{from_micros, to_micros};
use crate::{Error, Result};

// ============================================================================
// Types
// ============================================================================

/// Book record.
#[derive(Debug, Clone, PartialEq)]
pub struct Book {
    pub id: String,
    pub author_id: String,
    pub name: String,
    pub publish_date: Option<NaiveDate>,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct BookRow {
    id: String,
    author_id: String,
    name: String,
    publish_date: Option<NaiveDate>,
    created: i64,
    modified: i64,
}

impl From<BookRow> for Book {
    fn from(row: BookRow) -> Self {
        Self {
            id: row.id,
            author_id: row.author_id,
            name: row.name,
            publish_date: row.publish_date,
            created: from_micros(row.created),
            modified: from_micros(row.modified),
        }
    }
}

/// Input for creating a new book.
#[derive(Debug, Clone)]
pub struct CreateBook {
    pub author_id: String,
    pub name: String,
    pub publish_date: Option<NaiveDate>,
}

// ============================================================================
// Queries
// ============================================================================

/// Create a new book. Fails with `NotFound` if the author does not exist.
pub async fn create_book(
    executor: impl SqliteExecutor<'_>,
    input: CreateBook,
    now: DateTime<Utc>,
) -> Result<Book> {
    let id = uuid::Uuid::new_v4().to_string();
    let at = to_micros(now);

    sqlx::query_as::<_, BookRow>(
        r#"
        INSERT INTO books (id, author_id, name, publish_date, created, modified)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(&id)
    .bind(&input.author_id)
    .bind(&input.name)
    .bind(input.publish_date)
    .bind(at)
    .bind(at)
    .fetch_one(executor)
    .await
    .map(Book::from)
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
            Error::NotFound(format!(
                "Author with id '{}' was not found.",
                input.author_id
            ))
        }
        _ => Error::Database(e),
    })
}

/// Get a book by ID.
pub async fn get_book(executor: impl SqliteExecutor<'_>, id: &str) -> Result<Option<Book>> {
    let row = sqlx::query_as::<_, BookRow>("SELECT * FROM books WHERE id = ?")
        .bind(id)
        .fetch_optional(executor)
        .await?;

    Ok(row.map(Book::from))
}

/// List an author's books ordered by name.
pub async fn list_books_by_author(
    executor: impl SqliteExecutor<'_>,
    author_id: &str,
) -> Result<Vec<Book>> {
    let rows = sqlx::query_as::<_, BookRow>(
        r#"
        SELECT * FROM books
        WHERE author_id = ?
        ORDER BY name ASC, id ASC
        "#,
    )
    .bind(author_id)
    .fetch_all(executor)
    .await?;

    Ok(rows.into_iter().map(Book::from).collect())
}

/// List the books of several authors in one query, ordered by name.
pub async fn list_books_for_authors(
    executor: impl SqliteExecutor<'_>,
    author_ids: &[String],
) -> Result<Vec<Book>> {
    if author_ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut builder: QueryBuilder<Sqlite> =
        QueryBuilder::new("SELECT * FROM books WHERE author_id IN (");
    let mut separated = builder.separated(", ");
    for id in author_ids {
        separated.push_bind(id);
    }
    separated.push_unseparated(") ORDER BY name ASC, id ASC");

    let rows = builder
        .build_query_as::<BookRow>()
        .fetch_all(executor)
        .await?;

    Ok(rows.into_iter().map(Book::from).collect())
}

/// Count an author's books.
pub async fn count_books_by_author(
    executor: impl SqliteExecutor<'_>,
    author_id: &str,
) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE author_id = ?")
        .bind(author_id)
        .fetch_one(executor)
        .await?;

    Ok(count)
}

/// Delete a book. Collaborators are detached, not deleted.
pub async fn delete_book(executor: impl SqliteExecutor<'_>, id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM books WHERE id = ?")
        .bind(id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Associate a collaborator with a book. Linking twice is a no-op.
pub async fn add_book_collaborator(
    executor: impl SqliteExecutor<'_>,
    book_id: &str,
    collaborator_id: &str,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO book_collaborators (book_id, collaborator_id)
        VALUES (?, ?)
        ON CONFLICT (book_id, collaborator_id) DO NOTHING
        "#,
    )
    .bind(book_id)
    .bind(collaborator_id)
    .execute(executor)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
            Error::NotFound(format!(
                "Book '{}' or collaborator '{}' was not found.",
                book_id, collaborator_id
            ))
        }
        _ => Error::Database(e),
    })?;

    Ok(())
}

/// Remove a collaborator from a book.
pub async fn remove_book_collaborator(
    executor: impl SqliteExecutor<'_>,
    book_id: &str,
    collaborator_id: &str,
) -> Result<bool> {
    let result =
        sqlx::query("DELETE FROM book_collaborators WHERE book_id = ? AND collaborator_id = ?")
            .bind(book_id)
            .bind(collaborator_id)
            .execute(executor)
            .await?;

    Ok(result.rows_affected() > 0)
}
