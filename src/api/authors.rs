//! Authors Routes
//!
//! CRUD operations for authors. Listing and retrieval need any
//! authenticated requester; mutations need an admin.
//!
//! Routes:
//! - GET /api/v1/authors - List authors (paginated, `?page=N|last`)
//! - POST /api/v1/authors - Create an author
//! - GET /api/v1/authors/:id - Get author details
//! - PUT /api/v1/authors/:id - Update an author
//! - PATCH /api/v1/authors/:id - Partially update an author
//! - DELETE /api/v1/authors/:id - Delete an author and their books

use axum::{
    body::Bytes,
    extract::{Path, RawQuery, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};

use crate::middleware::{authenticate, AuthUser};
use crate::models::{page_param, AuthorView, Paginated};
use crate::{AppState, Result};

/// Build author routes.
pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(list_authors).post(create_author))
        .route(
            "/:id",
            get(get_author)
                .put(update_author)
                .patch(partial_update_author)
                .delete(delete_author),
        )
        .layer(axum::middleware::from_fn_with_state(state, authenticate))
}

fn requester(auth: &Option<Extension<AuthUser>>) -> Option<&AuthUser> {
    auth.as_ref().map(|Extension(user)| user)
}

/// List authors ordered by name.
///
/// GET /api/v1/authors
///
/// A repeated `page` resolves to its last value.
async fn list_authors(
    State(state): State<AppState>,
    auth: Option<Extension<AuthUser>>,
    RawQuery(query): RawQuery,
) -> Result<Json<Paginated<AuthorView>>> {
    let page_number = page_param(query.as_deref());
    let page = state
        .authors
        .list(requester(&auth), page_number.as_deref())
        .await?;
    Ok(Json(page))
}

/// Create a new author.
///
/// POST /api/v1/authors
async fn create_author(
    State(state): State<AppState>,
    auth: Option<Extension<AuthUser>>,
    body: Bytes,
) -> Result<(StatusCode, Json<AuthorView>)> {
    let author = state.authors.create(requester(&auth), &body).await?;
    Ok((StatusCode::CREATED, Json(author)))
}

/// Get author details with their books.
///
/// GET /api/v1/authors/:id
async fn get_author(
    State(state): State<AppState>,
    auth: Option<Extension<AuthUser>>,
    Path(id): Path<String>,
) -> Result<Json<AuthorView>> {
    let author = state.authors.retrieve(requester(&auth), &id).await?;
    Ok(Json(author))
}

/// Update an author.
///
/// PUT /api/v1/authors/:id
async fn update_author(
    State(state): State<AppState>,
    auth: Option<Extension<AuthUser>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<AuthorView>> {
    let author = state.authors.update(requester(&auth), &id, &body).await?;
    Ok(Json(author))
}

/// Update only the supplied fields of an author.
///
/// PATCH /api/v1/authors/:id
async fn partial_update_author(
    State(state): State<AppState>,
    auth: Option<Extension<AuthUser>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<AuthorView>> {
    let author = state
        .authors
        .partial_update(requester(&auth), &id, &body)
        .await?;
    Ok(Json(author))
}

/// Delete an author.
///
/// DELETE /api/v1/authors/:id
async fn delete_author(
    State(state): State<AppState>,
    auth: Option<Extension<AuthUser>>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.authors.destroy(requester(&auth), &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
