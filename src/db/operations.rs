use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Transaction};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::error;
use uuid::Uuid;

use crate::db::models::{Identity, Post, PostPatch, PostRow};
use crate::db::store::{CredentialStore, PostStore};
use crate::Result;

const POST_COLUMNS: &str = "id, title, excerpt, content, cover_image, category, author_name, author_avatar, created_at, updated_at";

/// Runs the rollback and hands back the error that caused it. A failed
/// rollback is only logged; the connection is discarded by the pool anyway.
async fn rollback_then_fail<T, R>(cause: crate::AppError, rollback: R) -> Result<T>
where
    R: Future<Output = std::result::Result<(), sqlx::Error>>,
{
    if let Err(rollback_err) = rollback.await {
        error!("Rollback failed after update error ({}): {}", cause, rollback_err);
    }
    Err(cause)
}

/// Postgres-backed store for the admin identity and posts.
#[derive(Clone)]
pub struct DbOperations {
    pool: Arc<PgPool>,
}

impl DbOperations {
    pub async fn new_with_options(
        url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect(url)
            .await?;

        Ok(Self { pool: Arc::new(pool) })
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(self.pool.as_ref()).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    pub async fn begin_transaction(&self) -> Result<Transaction<'_, Postgres>> {
        Ok(self.pool.as_ref().begin().await?)
    }

    async fn update_post_with_transaction(
        &self,
        id: Uuid,
        patch: &PostPatch,
        transaction: &mut Transaction<'_, Postgres>,
    ) -> Result<Option<Post>> {
        let current = sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {} FROM posts WHERE id = $1 FOR UPDATE",
            POST_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut **transaction)
        .await?;

        let mut post: Post = match current {
            Some(row) => row.into(),
            None => return Ok(None),
        };
        patch.apply(&mut post);

        sqlx::query(
            r#"
            UPDATE posts
            SET title = $2, excerpt = $3, content = $4, cover_image = $5, category = $6,
                author_name = $7, author_avatar = $8, updated_at = $9
            WHERE id = $1
            "#,
        )
        .bind(post.id)
        .bind(&post.title)
        .bind(&post.excerpt)
        .bind(&post.content)
        .bind(&post.cover_image)
        .bind(&post.category)
        .bind(&post.author.name)
        .bind(&post.author.avatar)
        .bind(post.updated_at)
        .execute(&mut **transaction)
        .await?;

        Ok(Some(post))
    }
}

#[async_trait]
impl CredentialStore for DbOperations {
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>> {
        let identity = sqlx::query_as::<_, Identity>(
            "SELECT id, username, email, password_hash FROM identities WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(identity)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Identity>> {
        let identity = sqlx::query_as::<_, Identity>(
            "SELECT id, username, email, password_hash FROM identities WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(identity)
    }

    async fn save(&self, identity: &Identity) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO identities (id, username, email, password_hash)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE
            SET username = EXCLUDED.username,
                email = EXCLUDED.email,
                password_hash = EXCLUDED.password_hash
            "#,
        )
        .bind(identity.id)
        .bind(&identity.username)
        .bind(&identity.email)
        .bind(&identity.password_hash)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }
}

#[async_trait]
impl PostStore for DbOperations {
    async fn list_posts(&self, category: Option<String>) -> Result<Vec<Post>> {
        let rows = match category {
            Some(category) => {
                sqlx::query_as::<_, PostRow>(&format!(
                    "SELECT {} FROM posts WHERE category = $1 ORDER BY created_at DESC",
                    POST_COLUMNS
                ))
                .bind(category)
                .fetch_all(self.pool.as_ref())
                .await?
            }
            None => {
                sqlx::query_as::<_, PostRow>(&format!(
                    "SELECT {} FROM posts ORDER BY created_at DESC",
                    POST_COLUMNS
                ))
                .fetch_all(self.pool.as_ref())
                .await?
            }
        };

        Ok(rows.into_iter().map(Post::from).collect())
    }

    async fn find_post(&self, id: Uuid) -> Result<Option<Post>> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {} FROM posts WHERE id = $1",
            POST_COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Post::from))
    }

    async fn insert_post(&self, post: &Post) -> Result<Post> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            r#"
            INSERT INTO posts ({cols})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {cols}
            "#,
            cols = POST_COLUMNS
        ))
        .bind(post.id)
        .bind(&post.title)
        .bind(&post.excerpt)
        .bind(&post.content)
        .bind(&post.cover_image)
        .bind(&post.category)
        .bind(&post.author.name)
        .bind(&post.author.avatar)
        .bind(post.created_at)
        .bind(post.updated_at)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn update_post(&self, id: Uuid, patch: &PostPatch) -> Result<Option<Post>> {
        let mut transaction = self.begin_transaction().await?;

        let result = self.update_post_with_transaction(id, patch, &mut transaction).await;

        match result {
            Ok(post) => {
                transaction.commit().await?;
                Ok(post)
            }
            Err(e) => rollback_then_fail(e, transaction.rollback()).await,
        }
    }

    async fn delete_post(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
