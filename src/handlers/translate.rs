// src/handlers/translate.rs

use axum::{Json, extract::State, response::IntoResponse};
use serde::{Deserialize, Serialize};

use crate::{
    error::AppError,
    translator::Translator,
    utils::{slug::slugify, text::truncate_chars},
};

/// Vietnamese source fields to translate. Empty fields are skipped.
#[derive(Debug, Deserialize)]
pub struct TranslatePostRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub content: String,
}

/// A complete English variant derived from the translation: the translated
/// fields plus the slug and SEO meta fields computed from them.
#[derive(Debug, Serialize)]
pub struct TranslatedVariant {
    pub title: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub slug: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
}

/// Translate the Vietnamese variant of a post into English.
///
/// One upstream request per non-empty field, sequentially. Any upstream
/// failure or malformed reply aborts the whole operation with a 502; there
/// is no partial-result recovery.
pub async fn translate_post(
    State(translator): State<Translator>,
    Json(payload): Json<TranslatePostRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut fields: Vec<(&str, &str)> = Vec::new();
    if !payload.title.trim().is_empty() {
        fields.push(("title", payload.title.as_str()));
    }
    if !payload.excerpt.trim().is_empty() {
        fields.push(("excerpt", payload.excerpt.as_str()));
    }
    if !payload.content.trim().is_empty() {
        fields.push(("content", payload.content.as_str()));
    }

    if fields.is_empty() {
        return Err(AppError::BadRequest(
            "Nothing to translate: Vietnamese content is empty".to_string(),
        ));
    }

    let mut translated = translator.translate_bulk(&fields).await?;

    let title = translated.remove("title").filter(|s| !s.is_empty());
    let excerpt = translated.remove("excerpt").filter(|s| !s.is_empty());
    let content = translated.remove("content").filter(|s| !s.is_empty());

    let slug = title.as_deref().map(slugify).filter(|s| !s.is_empty());
    let meta_title = title.as_deref().map(|t| truncate_chars(t, 60));
    let meta_description = excerpt.as_deref().map(|e| truncate_chars(e, 160));

    Ok(Json(TranslatedVariant {
        title,
        excerpt,
        content,
        slug,
        meta_title,
        meta_description,
    }))
}
