use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::db::models::{Identity, Post, PostPatch};
use crate::db::store::{CredentialStore, PostStore};
use crate::Result;

/// Process-local store selected by a `memory://` database url.
/// Contents do not survive a restart.
#[derive(Clone, Default)]
pub struct MemoryStore {
    identities: Arc<RwLock<HashMap<Uuid, Identity>>>,
    posts: Arc<RwLock<HashMap<Uuid, Post>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>> {
        let identities = self.identities.read().await;
        Ok(identities.values().find(|i| i.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Identity>> {
        Ok(self.identities.read().await.get(&id).cloned())
    }

    async fn save(&self, identity: &Identity) -> Result<()> {
        self.identities
            .write()
            .await
            .insert(identity.id, identity.clone());
        Ok(())
    }
}

#[async_trait]
impl PostStore for MemoryStore {
    async fn list_posts(&self, category: Option<String>) -> Result<Vec<Post>> {
        let posts = self.posts.read().await;
        let mut matching: Vec<Post> = posts
            .values()
            .filter(|p| category.as_deref().map_or(true, |c| p.category == c))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matching)
    }

    async fn find_post(&self, id: Uuid) -> Result<Option<Post>> {
        Ok(self.posts.read().await.get(&id).cloned())
    }

    async fn insert_post(&self, post: &Post) -> Result<Post> {
        self.posts.write().await.insert(post.id, post.clone());
        Ok(post.clone())
    }

    async fn update_post(&self, id: Uuid, patch: &PostPatch) -> Result<Option<Post>> {
        let mut posts = self.posts.write().await;
        Ok(posts.get_mut(&id).map(|post| {
            patch.apply(post);
            post.clone()
        }))
    }

    async fn delete_post(&self, id: Uuid) -> Result<bool> {
        Ok(self.posts.write().await.remove(&id).is_some())
    }
}
