//! Database module for the blog server
//!
//! This module holds the persisted models, the store traits the routes
//! depend on, and the Postgres and in-memory implementations of them.

pub mod memory;
pub mod models;
pub mod operations;
pub mod store;

pub use memory::MemoryStore;
pub use models::{Author, Identity, NewPost, Post, PostPatch};
pub use operations::DbOperations;
pub use store::{CredentialStore, PostStore};
