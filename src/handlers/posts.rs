use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppError,
    models::post::{
        CreatePostRequest, Language, Localized, NewPost, Post, PostListParams, UpdatePostRequest,
        filter_and_sort,
    },
    utils::jwt::Claims,
    utils::seo::{self, SeoChecks},
};

/// Fetches the full post list, newest first. The dashboard and the list
/// endpoint both derive their views from this in memory.
pub(crate) async fn fetch_all_posts(pool: &PgPool) -> Result<Vec<Post>, AppError> {
    sqlx::query_as::<_, Post>("SELECT * FROM posts ORDER BY created_at DESC")
        .fetch_all(pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list posts: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })
}

async fn fetch_post(pool: &PgPool, id: Uuid) -> Result<Option<Post>, AppError> {
    sqlx::query_as::<_, Post>("SELECT * FROM posts WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))
}

fn map_insert_error(e: sqlx::Error) -> AppError {
    // Postgres error code for unique violation is 23505
    if e.to_string().contains("unique constraint") || e.to_string().contains("23505") {
        AppError::Conflict("A post with this slug already exists in that language".to_string())
    } else {
        tracing::error!("Failed to write post: {:?}", e);
        AppError::InternalServerError(e.to_string())
    }
}

/// List posts with client-requested filtering and sorting.
///
/// The full list is fetched newest-first and the filter/sort projection runs
/// in memory, so repeated queries with different parameters always see the
/// same snapshot semantics.
pub async fn list_posts(
    State(pool): State<PgPool>,
    Query(params): Query<PostListParams>,
) -> Result<impl IntoResponse, AppError> {
    let posts = fetch_all_posts(&pool).await?;
    Ok(Json(filter_and_sort(&posts, &params)))
}

/// Get a single post by ID.
pub async fn get_post(
    State(pool): State<PgPool>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let post = fetch_post(&pool, id)
        .await?
        .ok_or(AppError::NotFound("Post not found".to_string()))?;

    Ok(Json(post))
}

/// Create a new post.
///
/// The payload goes through the editor form rules (trim, auto-slug, meta
/// fallbacks, sanitization) before it is written; see
/// [`CreatePostRequest::prepare`].
pub async fn create_post(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreatePostRequest>,
) -> Result<impl IntoResponse, AppError> {
    // 1. Validate payload
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let user_id = claims.sub.parse::<i64>().unwrap_or(0);

    // 2. Apply form rules and invariants
    let new_post = payload.prepare()?;

    // 3. Insert and return the stored record so the client reconciles from
    //    the confirmed state, not an optimistic local copy.
    let post = insert_post(&pool, &new_post, user_id).await?;

    Ok((StatusCode::CREATED, Json(post)))
}

async fn insert_post(pool: &PgPool, new_post: &NewPost, user_id: i64) -> Result<Post, AppError> {
    sqlx::query_as::<_, Post>(
        r#"
        INSERT INTO posts (
            title_vi, title_en, excerpt_vi, excerpt_en, content_vi, content_en,
            slug_vi, slug_en, meta_title_vi, meta_title_en,
            meta_description_vi, meta_description_en,
            image, date, author, category, status, user_id
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
        RETURNING *
        "#,
    )
    .bind(&new_post.title.vi)
    .bind(&new_post.title.en)
    .bind(&new_post.excerpt.vi)
    .bind(&new_post.excerpt.en)
    .bind(&new_post.content.vi)
    .bind(&new_post.content.en)
    .bind(&new_post.slug.vi)
    .bind(&new_post.slug.en)
    .bind(&new_post.meta_title.vi)
    .bind(&new_post.meta_title.en)
    .bind(&new_post.meta_description.vi)
    .bind(&new_post.meta_description.en)
    .bind(&new_post.image)
    .bind(&new_post.date)
    .bind(&new_post.author)
    .bind(new_post.category.as_str())
    .bind(new_post.status.as_str())
    .bind(user_id)
    .fetch_one(pool)
    .await
    .map_err(map_insert_error)
}

/// Update a post.
///
/// The patch is merged over the stored record, the merged result is
/// re-validated like a create, and the whole row is written back with a
/// fresh `updated_at`. Toggling status is just `{"status": "published"}`.
pub async fn update_post(
    State(pool): State<PgPool>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePostRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let existing = fetch_post(&pool, id)
        .await?
        .ok_or(AppError::NotFound("Post not found".to_string()))?;

    let merged = payload.apply_to(&existing)?;

    let post = sqlx::query_as::<_, Post>(
        r#"
        UPDATE posts SET
            title_vi = $1, title_en = $2, excerpt_vi = $3, excerpt_en = $4,
            content_vi = $5, content_en = $6, slug_vi = $7, slug_en = $8,
            meta_title_vi = $9, meta_title_en = $10,
            meta_description_vi = $11, meta_description_en = $12,
            image = $13, date = $14, author = $15, category = $16, status = $17,
            updated_at = NOW()
        WHERE id = $18
        RETURNING *
        "#,
    )
    .bind(&merged.title.vi)
    .bind(&merged.title.en)
    .bind(&merged.excerpt.vi)
    .bind(&merged.excerpt.en)
    .bind(&merged.content.vi)
    .bind(&merged.content.en)
    .bind(&merged.slug.vi)
    .bind(&merged.slug.en)
    .bind(&merged.meta_title.vi)
    .bind(&merged.meta_title.en)
    .bind(&merged.meta_description.vi)
    .bind(&merged.meta_description.en)
    .bind(&merged.image)
    .bind(&merged.date)
    .bind(&merged.author)
    .bind(merged.category.as_str())
    .bind(merged.status.as_str())
    .bind(id)
    .fetch_one(&pool)
    .await
    .map_err(map_insert_error)?;

    Ok(Json(post))
}

/// Delete a post permanently (hard delete, no tombstone).
pub async fn delete_post(
    State(pool): State<PgPool>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM posts WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete post: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Post not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// DTO for an SEO check. All fields default to empty so partially filled
/// forms can be checked while typing.
#[derive(Debug, Default, Deserialize)]
pub struct SeoCheckRequest {
    #[serde(default)]
    pub title: Localized<String>,
    #[serde(default)]
    pub excerpt: Localized<String>,
    #[serde(default)]
    pub content: Localized<String>,
}

/// SEO flags for both language variants, evaluated independently.
#[derive(Debug, Serialize)]
pub struct SeoReport {
    pub vi: SeoChecks,
    pub en: SeoChecks,
}

/// Evaluate the advisory SEO heuristics for both language variants.
/// Never blocks saving; the editor shows these as hints only.
pub async fn seo_check(Json(payload): Json<SeoCheckRequest>) -> Json<SeoReport> {
    let variant = |lang: Language| {
        seo::check(
            payload.title.get(lang).map(String::as_str).unwrap_or(""),
            payload.excerpt.get(lang).map(String::as_str).unwrap_or(""),
            payload.content.get(lang).map(String::as_str).unwrap_or(""),
        )
    };

    Json(SeoReport {
        vi: variant(Language::Vi),
        en: variant(Language::En),
    })
}
