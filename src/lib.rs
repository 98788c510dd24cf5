//! Bookshelf - authors, books and collaborators over a REST API.
//!
//! Reads are open to any authenticated requester; writes need an admin.

pub mod api;
pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;
pub mod state;

pub use config::config;
pub use error::{Error, Result};
pub use state::AppState;
