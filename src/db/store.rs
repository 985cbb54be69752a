use async_trait::async_trait;
use uuid::Uuid;

use crate::db::models::{Identity, Post, PostPatch};
use crate::Result;

/// Persistence for the admin identity. Each call is atomic on its own.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Identity>>;

    /// Inserts the identity or overwrites the stored record with the same id.
    async fn save(&self, identity: &Identity) -> Result<()>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Newest first, optionally restricted to one category.
    async fn list_posts(&self, category: Option<String>) -> Result<Vec<Post>>;

    async fn find_post(&self, id: Uuid) -> Result<Option<Post>>;

    async fn insert_post(&self, post: &Post) -> Result<Post>;

    /// Returns `None` when no post has this id.
    async fn update_post(&self, id: Uuid, patch: &PostPatch) -> Result<Option<Post>>;

    /// Returns `false` when no post has this id.
    async fn delete_post(&self, id: Uuid) -> Result<bool>;
}
