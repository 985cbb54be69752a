use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::SessionIdentity;
use crate::db::models::{NewPost, PostPatch};
use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub category: Option<String>,
}

fn not_found() -> AppError {
    AppError::NotFound("Not found".into())
}

fn invalid_data() -> AppError {
    AppError::ValidationError("Invalid data".into())
}

/// Ids that do not parse cannot name a stored post.
fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| not_found())
}

pub async fn list_posts(
    query: web::Query<ListQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let category = query.into_inner().category.filter(|c| !c.is_empty());
    let posts = state.posts.list_posts(category).await?;
    Ok(HttpResponse::Ok().json(posts))
}

pub async fn get_post(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let id = parse_id(&path)?;
    let post = state.posts.find_post(id).await?.ok_or_else(not_found)?;
    Ok(HttpResponse::Ok().json(post))
}

pub async fn create_post(
    session: SessionIdentity,
    body: web::Json<NewPost>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let post = body.into_inner().into_post().ok_or_else(invalid_data)?;
    let created = state.posts.insert_post(&post).await?;

    info!("Post {} created by {}", created.id, session.username);
    Ok(HttpResponse::Created().json(created))
}

pub async fn update_post(
    session: SessionIdentity,
    path: web::Path<String>,
    body: web::Json<PostPatch>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let id = parse_id(&path)?;
    let patch = body.into_inner();
    if !patch.is_valid() {
        return Err(invalid_data());
    }

    let updated = state
        .posts
        .update_post(id, &patch)
        .await?
        .ok_or_else(not_found)?;

    info!("Post {} updated by {}", id, session.username);
    Ok(HttpResponse::Ok().json(updated))
}

pub async fn delete_post(
    session: SessionIdentity,
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let id = parse_id(&path)?;
    if !state.posts.delete_post(id).await? {
        return Err(not_found());
    }

    info!("Post {} deleted by {}", id, session.username);
    Ok(HttpResponse::NoContent().finish())
}
