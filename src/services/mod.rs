//! Service layer for Bookshelf.
//!
//! - Permissions (policy table consulted before every operation)
//! - Authors (resource controller for the author collection)

mod authors;
pub mod permissions;

pub use authors::{AuthorService, AUTHORS_PATH};
pub use permissions::{authorize, Action, Capability};
