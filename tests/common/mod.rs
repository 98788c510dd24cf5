//! Shared fixtures for the HTTP tests.
//!
//! Every app runs over its own in-memory database with the clock frozen at
//! 2023-01-20T10:00:00Z and two users: `user_1` (member) and `user_2` (admin).

#![allow(dead_code)]

use std::sync::Arc;

use axum::http::HeaderValue;
use axum::Router;
use axum_test::TestServer;
use bookshelf::api;
use bookshelf::clock::FrozenClock;
use bookshelf::db::{self, Author, Book, Collaborator, CreateAuthor, CreateBook, DbPool, UserRole};
use bookshelf::AppState;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};

pub const PUBLIC_URL: &str = "http://testserver";
pub const BIOGRAPHY: &str = "Some biography of the author here";

pub fn jan_20() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 1, 20, 10, 0, 0).unwrap()
}

pub fn jun_30() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 6, 30, 10, 0, 0).unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Bearer Authorization header value.
pub fn bearer(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {}", token)).unwrap()
}

pub struct TestApp {
    pub server: TestServer,
    pub pool: DbPool,
    pub clock: FrozenClock,
    /// Token of `user_1`, a member.
    pub member_token: String,
    /// Token of `user_2`, an admin.
    pub admin_token: String,
}

/// Build a test server with API routes and the two standard users.
pub async fn spawn_app() -> TestApp {
    let pool = db::init_pool(":memory:")
        .await
        .expect("Failed to create test database");
    db::initialize_schema(&pool)
        .await
        .expect("Failed to initialize schema");

    let member = db::create_user(&pool, "user_1", UserRole::Member).await.unwrap();
    let admin = db::create_user(&pool, "user_2", UserRole::Admin).await.unwrap();
    let (_, member_token) = db::issue_api_token(&pool, &member.id, "test").await.unwrap();
    let (_, admin_token) = db::issue_api_token(&pool, &admin.id, "test").await.unwrap();

    let clock = FrozenClock::new(jan_20());
    let state = AppState::from_parts(pool.clone(), Arc::new(clock.clone()), PUBLIC_URL)
        .expect("Failed to build state");

    let app = Router::new()
        .merge(api::routes(state.clone()))
        .with_state(state);

    let server = TestServer::new(app).expect("Failed to create test server");

    TestApp {
        server,
        pool,
        clock,
        member_token,
        admin_token,
    }
}

pub async fn seed_author(pool: &DbPool, name: &str, birthday: Option<NaiveDate>) -> Author {
    db::create_author(
        pool,
        CreateAuthor {
            name: name.to_string(),
            biography: BIOGRAPHY.to_string(),
            birthday,
        },
        jan_20(),
    )
    .await
    .unwrap()
}

pub async fn seed_book(
    pool: &DbPool,
    author: &Author,
    name: &str,
    publish_date: Option<NaiveDate>,
) -> Book {
    db::create_book(
        pool,
        CreateBook {
            author_id: author.id.clone(),
            name: name.to_string(),
            publish_date,
        },
        jan_20(),
    )
    .await
    .unwrap()
}

/// Three authors, two collaborators and three books.
pub struct Library {
    pub rowling: Author,
    pub borges: Author,
    pub martin: Author,
    pub collaborators: Vec<Collaborator>,
    pub book_1: Book,
    pub book_2: Book,
    pub book_3: Book,
}

pub async fn seed_library(pool: &DbPool) -> Library {
    let rowling = seed_author(pool, "J. K. Rowling", Some(date(1965, 7, 31))).await;
    let borges = seed_author(pool, "Jorge Luis Borges", Some(date(1899, 8, 24))).await;
    let martin = seed_author(pool, "George R. R. Martin", Some(date(1948, 9, 20))).await;

    let mut collaborators = Vec::new();
    for name in ["Collaborator 1", "Collaborator 2"] {
        collaborators.push(db::create_collaborator(pool, name, jan_20()).await.unwrap());
    }

    let book_1 = seed_book(pool, &rowling, "Book 1", Some(date(1997, 6, 26))).await;
    let book_2 = seed_book(pool, &rowling, "Book 2", Some(date(1998, 7, 2))).await;
    let book_3 = seed_book(pool, &borges, "Book 3", Some(date(1949, 1, 1))).await;

    db::add_book_collaborator(pool, &book_1.id, &collaborators[0].id)
        .await
        .unwrap();

    Library {
        rowling,
        borges,
        martin,
        collaborators,
        book_1,
        book_2,
        book_3,
    }
}

pub async fn author_count(pool: &DbPool) -> i64 {
    db::count_authors(pool).await.unwrap()
}
