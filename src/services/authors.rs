//! Author resource controller.
//!
//! Every operation runs the access policy first, then a single logical
//! storage transaction, and returns the wire representation.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};
use url::Url;

use super::permissions::{authorize, Action};
use crate::clock::Clock;
use crate::db::{self, Book, DbPool};
use crate::middleware::AuthUser;
use crate::models::{AuthorPayload, AuthorView, PageWindow, Paginated};
use crate::{Error, Result};

/// Path of the author collection relative to the public URL.
pub const AUTHORS_PATH: &str = "/api/v1/authors";

/// Author CRUD on top of the database pool.
#[derive(Clone)]
pub struct AuthorService {
    db: DbPool,
    clock: Arc<dyn Clock>,
    endpoint: Url,
}

impl AuthorService {
    /// Create a new author service; pagination links are rooted at `public_url`.
    pub fn new(db: DbPool, clock: Arc<dyn Clock>, public_url: &str) -> Result<Self> {
        let endpoint = Url::parse(&format!("{}{}", public_url.trim_end_matches('/'), AUTHORS_PATH))
            .map_err(|e| Error::Internal(format!("Invalid public URL '{}': {}", public_url, e)))?;

        Ok(Self {
            db,
            clock,
            endpoint,
        })
    }

    /// Absolute URL of the author collection.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// List authors by name, one page at a time.
    pub async fn list(
        &self,
        requester: Option<&AuthUser>,
        page: Option<&str>,
    ) -> Result<Paginated<AuthorView>> {
        authorize(requester, Action::List)?;

        let mut tx = self.db.begin().await?;

        let count = db::count_authors(&mut *tx).await?;
        let window = PageWindow::resolve(page, count.max(0) as u64)?;

        let authors = db::list_authors_paginated(&mut *tx, window.limit(), window.offset()).await?;
        let ids: Vec<String> = authors.iter().map(|a| a.id.clone()).collect();
        let books = db::list_books_for_authors(&mut *tx, &ids).await?;

        tx.commit().await?;

        let mut by_author: HashMap<String, Vec<Book>> = HashMap::new();
        for book in books {
            by_author.entry(book.author_id.clone()).or_default().push(book);
        }

        let results: Vec<AuthorView> = authors
            .into_iter()
            .map(|author| {
                let books = by_author.remove(&author.id).unwrap_or_default();
                AuthorView::new(author, books)
            })
            .collect();

        debug!(page = window.number, count, "Listed authors");

        Ok(window.paginate(&self.endpoint, results))
    }

    /// Get one author with their books.
    pub async fn retrieve(&self, requester: Option<&AuthUser>, id: &str) -> Result<AuthorView> {
        authorize(requester, Action::Retrieve)?;

        let key = normalize_id(id);
        let mut tx = self.db.begin().await?;

        let author = db::get_author(&mut *tx, &key)
            .await?
            .ok_or_else(|| author_not_found(id))?;
        let books = db::list_books_by_author(&mut *tx, &key).await?;

        tx.commit().await?;

        Ok(AuthorView::new(author, books))
    }

    /// Create an author from a JSON body.
    pub async fn create(&self, requester: Option<&AuthUser>, body: &[u8]) -> Result<AuthorView> {
        authorize(requester, Action::Create)?;

        let payload = AuthorPayload::from_body(body, false)?;
        let author = db::create_author(&self.db, payload.into_create(), self.clock.now()).await?;

        info!(
            author_id = %author.id,
            user_id = requester.map(|u| u.user_id.as_str()),
            "Created author"
        );

        Ok(AuthorView::new(author, Vec::new()))
    }

    /// Replace an author's fields. `name` is required; omitted optional
    /// fields keep their stored values.
    pub async fn update(
        &self,
        requester: Option<&AuthUser>,
        id: &str,
        body: &[u8],
    ) -> Result<AuthorView> {
        authorize(requester, Action::Update)?;
        self.apply_update(requester, id, body, false).await
    }

    /// Change only the fields present in the body.
    pub async fn partial_update(
        &self,
        requester: Option<&AuthUser>,
        id: &str,
        body: &[u8],
    ) -> Result<AuthorView> {
        authorize(requester, Action::PartialUpdate)?;
        self.apply_update(requester, id, body, true).await
    }

    /// Delete an author along with their books.
    pub async fn destroy(&self, requester: Option<&AuthUser>, id: &str) -> Result<()> {
        authorize(requester, Action::Destroy)?;

        let key = normalize_id(id);
        if !db::delete_author(&self.db, &key).await? {
            return Err(author_not_found(id));
        }

        info!(
            author_id = %key,
            user_id = requester.map(|u| u.user_id.as_str()),
            "Deleted author"
        );

        Ok(())
    }

    async fn apply_update(
        &self,
        requester: Option<&AuthUser>,
        id: &str,
        body: &[u8],
        partial: bool,
    ) -> Result<AuthorView> {
        let key = normalize_id(id);

        // A missing author is reported as 404 even when the payload is bad.
        let payload = match AuthorPayload::from_body(body, partial) {
            Ok(payload) => payload,
            Err(err) => {
                if !db::author_exists(&self.db, &key).await? {
                    return Err(author_not_found(id));
                }
                return Err(err);
            }
        };

        let mut tx = self.db.begin().await?;

        let author = db::update_author(&mut *tx, &key, payload.into_update(), self.clock.now())
            .await?
            .ok_or_else(|| author_not_found(id))?;
        let books = db::list_books_by_author(&mut *tx, &key).await?;

        tx.commit().await?;

        info!(
            author_id = %author.id,
            partial,
            user_id = requester.map(|u| u.user_id.as_str()),
            "Updated author"
        );

        Ok(AuthorView::new(author, books))
    }
}

/// Canonical storage key for a path id: UUIDs in any accepted spelling map to
/// their lowercase hyphenated form, anything else is used verbatim.
fn normalize_id(raw: &str) -> String {
    uuid::Uuid::parse_str(raw)
        .map(|id| id.to_string())
        .unwrap_or_else(|_| raw.to_string())
}

fn author_not_found(raw_id: &str) -> Error {
    Error::NotFound(format!("Author with id '{}' was not found.", raw_id))
}
