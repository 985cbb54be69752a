use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// The admin account. Only one exists per deployment.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Identity {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

impl Identity {
    pub fn new(username: String, email: String, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            username,
            email,
            password_hash,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    pub category: String,
    pub author: Author,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Flat row shape of the `posts` table.
#[derive(Debug, FromRow)]
pub struct PostRow {
    pub id: Uuid,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub cover_image: Option<String>,
    pub category: String,
    pub author_name: String,
    pub author_avatar: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            excerpt: row.excerpt,
            content: row.content,
            cover_image: row.cover_image,
            category: row.category,
            author: Author {
                name: row.author_name,
                avatar: row.author_avatar,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Client payload for a new post. Every field defaults so that missing
/// fields surface as validation failures rather than body parse errors.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub author: Option<Author>,
}

impl NewPost {
    pub fn into_post(self) -> Option<Post> {
        let author = self.author?;
        if [&self.title, &self.excerpt, &self.content, &self.category, &author.name]
            .iter()
            .any(|field| field.trim().is_empty())
        {
            return None;
        }

        let now = Utc::now();
        Some(Post {
            id: Uuid::new_v4(),
            title: self.title,
            excerpt: self.excerpt,
            content: self.content,
            cover_image: self.cover_image,
            category: self.category,
            author,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPatch {
    pub title: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub cover_image: Option<String>,
    pub category: Option<String>,
    pub author: Option<Author>,
}

impl PostPatch {
    /// A patch may omit required fields but may not blank them.
    pub fn is_valid(&self) -> bool {
        let blank = |v: &Option<String>| v.as_deref().is_some_and(|s| s.trim().is_empty());
        !(blank(&self.title)
            || blank(&self.excerpt)
            || blank(&self.content)
            || blank(&self.category)
            || self.author.as_ref().is_some_and(|a| a.name.trim().is_empty()))
    }

    pub fn apply(&self, post: &mut Post) {
        if let Some(title) = &self.title {
            post.title = title.clone();
        }
        if let Some(excerpt) = &self.excerpt {
            post.excerpt = excerpt.clone();
        }
        if let Some(content) = &self.content {
            post.content = content.clone();
        }
        if let Some(cover_image) = &self.cover_image {
            post.cover_image = Some(cover_image.clone());
        }
        if let Some(category) = &self.category {
            post.category = category.clone();
        }
        if let Some(author) = &self.author {
            post.author = author.clone();
        }
        post.updated_at = Utc::now();
    }
}
