// src/models/post.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;
use crate::utils::html::clean_html;
use crate::utils::slug::slugify;
use crate::utils::text::truncate_chars;

/// Language variant selector for bilingual fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Vi,
    En,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::Vi, Language::En];
}

/// A bilingual field: Vietnamese is the primary value, English is optional.
///
/// Variants are selected through [`Language`], never by string-keyed lookup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Localized<T> {
    pub vi: T,
    #[serde(default)]
    pub en: Option<T>,
}

impl<T> Localized<T> {
    pub fn get(&self, lang: Language) -> Option<&T> {
        match lang {
            Language::Vi => Some(&self.vi),
            Language::En => self.en.as_ref(),
        }
    }
}

impl Localized<String> {
    /// Trims both variants; an English variant that trims to empty is
    /// treated as absent.
    pub fn trimmed(&self) -> Localized<String> {
        Localized {
            vi: self.vi.trim().to_string(),
            en: self
                .en
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        }
    }
}

/// Fixed category set; the serialized labels are the Vietnamese display
/// names stored in the database.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    /// Default category for new posts, mirroring the editor form.
    #[default]
    #[serde(rename = "Tin tức")]
    News,
    #[serde(rename = "Hướng dẫn")]
    Guide,
    #[serde(rename = "Review")]
    Review,
    #[serde(rename = "Công nghệ")]
    Technology,
    #[serde(rename = "Sản phẩm")]
    Product,
    #[serde(rename = "Pháp lý")]
    Legal,
    #[serde(rename = "Nhiếp ảnh")]
    Photography,
    #[serde(rename = "Bảo trì")]
    Maintenance,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::News => "Tin tức",
            Category::Guide => "Hướng dẫn",
            Category::Review => "Review",
            Category::Technology => "Công nghệ",
            Category::Product => "Sản phẩm",
            Category::Legal => "Pháp lý",
            Category::Photography => "Nhiếp ảnh",
            Category::Maintenance => "Bảo trì",
        }
    }

    pub fn parse(s: &str) -> Result<Category, String> {
        match s {
            "Tin tức" => Ok(Category::News),
            "Hướng dẫn" => Ok(Category::Guide),
            "Review" => Ok(Category::Review),
            "Công nghệ" => Ok(Category::Technology),
            "Sản phẩm" => Ok(Category::Product),
            "Pháp lý" => Ok(Category::Legal),
            "Nhiếp ảnh" => Ok(Category::Photography),
            "Bảo trì" => Ok(Category::Maintenance),
            other => Err(format!("unknown category '{other}'")),
        }
    }
}

/// Post lifecycle status. Exactly two states exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Draft,
    Published,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
        }
    }
}

/// Represents the 'posts' table in the database.
///
/// Bilingual columns (`title_vi`/`title_en`, ...) are folded into
/// [`Localized`] pairs by the hand-written `FromRow` below.
#[derive(Debug, Clone, Serialize)]
pub struct Post {
    pub id: Uuid,
    pub title: Localized<String>,
    pub excerpt: Localized<String>,
    pub content: Localized<String>,
    pub slug: Localized<String>,
    pub meta_title: Localized<String>,
    pub meta_description: Localized<String>,

    /// Cover image URL.
    pub image: String,
    /// Display publish date. Stored as entered; parsed only for sorting.
    pub date: String,
    pub author: String,
    pub category: Category,
    pub status: PostStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user_id: i64,

    /// View counter, written only by the external view tracker.
    pub views: i64,
}

fn localized_columns(row: &PgRow, base: &str) -> Result<Localized<String>, sqlx::Error> {
    Ok(Localized {
        vi: row.try_get(format!("{base}_vi").as_str())?,
        en: row.try_get(format!("{base}_en").as_str())?,
    })
}

impl FromRow<'_, PgRow> for Post {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        let category: String = row.try_get("category")?;
        let status: String = row.try_get("status")?;

        Ok(Post {
            id: row.try_get("id")?,
            title: localized_columns(row, "title")?,
            excerpt: localized_columns(row, "excerpt")?,
            content: localized_columns(row, "content")?,
            slug: localized_columns(row, "slug")?,
            meta_title: localized_columns(row, "meta_title")?,
            meta_description: localized_columns(row, "meta_description")?,
            image: row.try_get("image")?,
            date: row.try_get("date")?,
            author: row.try_get("author")?,
            category: Category::parse(&category).map_err(|e| sqlx::Error::Decode(e.into()))?,
            status: match status.as_str() {
                "draft" => PostStatus::Draft,
                "published" => PostStatus::Published,
                other => {
                    return Err(sqlx::Error::Decode(
                        format!("unknown post status '{other}'").into(),
                    ));
                }
            },
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            user_id: row.try_get("user_id")?,
            views: row.try_get("views")?,
        })
    }
}

/// DTO for creating a new post. Bilingual fields arrive as `{vi, en}` pairs.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[serde(default)]
    pub title: Localized<String>,
    #[serde(default)]
    pub excerpt: Localized<String>,
    #[serde(default)]
    pub content: Localized<String>,
    #[serde(default)]
    pub slug: Localized<String>,
    #[serde(default)]
    pub meta_title: Localized<String>,
    #[serde(default)]
    pub meta_description: Localized<String>,

    #[validate(url(message = "Cover image must be a valid URL"))]
    pub image: String,
    #[serde(default)]
    pub date: String,
    #[validate(length(max = 100, message = "Author name must be at most 100 characters"))]
    #[serde(default)]
    pub author: String,
    pub category: Category,
    #[serde(default)]
    pub status: PostStatus,
}

/// A create payload after the form rules have been applied: trimmed,
/// slug/meta defaults filled in, content sanitized, publish invariants
/// enforced. This is what actually gets written to the database.
#[derive(Debug)]
pub struct NewPost {
    pub title: Localized<String>,
    pub excerpt: Localized<String>,
    pub content: Localized<String>,
    pub slug: Localized<String>,
    pub meta_title: Localized<String>,
    pub meta_description: Localized<String>,
    pub image: String,
    pub date: String,
    pub author: String,
    pub category: Category,
    pub status: PostStatus,
}

fn non_empty_or(value: String, fallback: impl FnOnce() -> String) -> String {
    if value.is_empty() { fallback() } else { value }
}

impl CreatePostRequest {
    /// Applies the editor form rules.
    ///
    /// * every field is trimmed; empty English variants become absent
    /// * the Vietnamese slug is derived from the title when not supplied,
    ///   and a supplied slug is never regenerated
    /// * meta title defaults to the first 60 characters of the title, meta
    ///   description to the first 160 characters of the excerpt, per variant
    /// * content HTML is sanitized in both languages
    /// * publishing requires non-empty Vietnamese title, slug and content
    pub fn prepare(self) -> Result<NewPost, AppError> {
        let title = self.title.trimmed();
        if title.vi.is_empty() {
            return Err(AppError::BadRequest(
                "Vietnamese title is required".to_string(),
            ));
        }

        let excerpt = self.excerpt.trimmed();

        let mut slug = self.slug.trimmed();
        if slug.vi.is_empty() {
            slug.vi = slugify(&title.vi);
        }
        if slug.vi.is_empty() {
            return Err(AppError::BadRequest(
                "Vietnamese slug is required".to_string(),
            ));
        }
        if slug.en.is_none() {
            slug.en = title
                .en
                .as_deref()
                .map(slugify)
                .filter(|s| !s.is_empty());
        }

        let content = Localized {
            vi: clean_html(self.content.vi.trim()),
            en: self
                .content
                .en
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(clean_html),
        };

        let image = self.image.trim().to_string();
        if image.is_empty() {
            return Err(AppError::BadRequest("Cover image is required".to_string()));
        }

        if self.status == PostStatus::Published && content.vi.is_empty() {
            return Err(AppError::BadRequest(
                "Vietnamese content is required to publish".to_string(),
            ));
        }

        let meta_title_input = self.meta_title.trimmed();
        let meta_title = Localized {
            vi: non_empty_or(meta_title_input.vi, || truncate_chars(&title.vi, 60)),
            en: meta_title_input
                .en
                .or_else(|| title.en.as_deref().map(|t| truncate_chars(t, 60))),
        };

        let meta_description_input = self.meta_description.trimmed();
        let meta_description = Localized {
            vi: non_empty_or(meta_description_input.vi, || truncate_chars(&excerpt.vi, 160)),
            en: meta_description_input
                .en
                .or_else(|| excerpt.en.as_deref().map(|e| truncate_chars(e, 160))),
        };

        let author = non_empty_or(self.author.trim().to_string(), || "Admin".to_string());
        let date = non_empty_or(self.date.trim().to_string(), || {
            Utc::now().format("%Y-%m-%d").to_string()
        });

        Ok(NewPost {
            title,
            excerpt,
            content,
            slug,
            meta_title,
            meta_description,
            image,
            date,
            author,
            category: self.category,
            status: self.status,
        })
    }
}

/// DTO for partially updating a post. Absent fields keep their stored values.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdatePostRequest {
    pub title: Option<Localized<String>>,
    pub excerpt: Option<Localized<String>>,
    pub content: Option<Localized<String>>,
    pub slug: Option<Localized<String>>,
    pub meta_title: Option<Localized<String>>,
    pub meta_description: Option<Localized<String>>,

    #[validate(url(message = "Cover image must be a valid URL"))]
    pub image: Option<String>,
    pub date: Option<String>,
    #[validate(length(max = 100, message = "Author name must be at most 100 characters"))]
    pub author: Option<String>,
    pub category: Option<Category>,
    pub status: Option<PostStatus>,
}

impl UpdatePostRequest {
    /// Merges the patch over the stored post and re-applies the form rules,
    /// so invariants hold for the merged record exactly as they do at
    /// creation time.
    pub fn apply_to(self, existing: &Post) -> Result<NewPost, AppError> {
        let merged = CreatePostRequest {
            title: self.title.unwrap_or_else(|| existing.title.clone()),
            excerpt: self.excerpt.unwrap_or_else(|| existing.excerpt.clone()),
            content: self.content.unwrap_or_else(|| existing.content.clone()),
            slug: self.slug.unwrap_or_else(|| existing.slug.clone()),
            meta_title: self.meta_title.unwrap_or_else(|| existing.meta_title.clone()),
            meta_description: self
                .meta_description
                .unwrap_or_else(|| existing.meta_description.clone()),
            image: self.image.unwrap_or_else(|| existing.image.clone()),
            date: self.date.unwrap_or_else(|| existing.date.clone()),
            author: self.author.unwrap_or_else(|| existing.author.clone()),
            category: self.category.unwrap_or(existing.category),
            status: self.status.unwrap_or(existing.status),
        };

        merged.prepare()
    }
}

/// Query parameters for listing posts.
#[derive(Debug, Default, Deserialize)]
pub struct PostListParams {
    /// Search keyword matched against title, content and author.
    pub q: Option<String>,
    /// Category label, or the sentinel "all".
    pub category: Option<String>,
    /// "draft", "published", or the sentinel "all".
    pub status: Option<String>,
    /// Sort key (default: date).
    pub sort: Option<SortKey>,
    /// Sort direction (default: desc).
    pub order: Option<SortOrder>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Date,
    Title,
    Author,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Applies the search/category/status filters, then the requested sort.
///
/// Pure projection: the result is a subset of `posts` by identity, the input
/// is never mutated, and the sort is stable so posts with equal keys keep
/// their relative order from the input.
pub fn filter_and_sort(posts: &[Post], params: &PostListParams) -> Vec<Post> {
    let mut filtered: Vec<Post> = posts
        .iter()
        .filter(|p| matches_query(p, params.q.as_deref()))
        .filter(|p| matches_filter(params.category.as_deref(), p.category.as_str()))
        .filter(|p| matches_filter(params.status.as_deref(), p.status.as_str()))
        .cloned()
        .collect();

    let key = params.sort.unwrap_or(SortKey::Date);
    let order = params.order.unwrap_or(SortOrder::Desc);

    filtered.sort_by(|a, b| {
        let ordering = match key {
            SortKey::Date => parse_date(&a.date).cmp(&parse_date(&b.date)),
            SortKey::Title => a.title.vi.to_lowercase().cmp(&b.title.vi.to_lowercase()),
            SortKey::Author => a.author.to_lowercase().cmp(&b.author.to_lowercase()),
        };
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });

    filtered
}

fn matches_query(post: &Post, q: Option<&str>) -> bool {
    let Some(q) = q.map(str::trim).filter(|q| !q.is_empty()) else {
        return true;
    };
    let needle = q.to_lowercase();

    if post.author.to_lowercase().contains(&needle) {
        return true;
    }
    for lang in Language::ALL {
        if let Some(title) = post.title.get(lang) {
            if title.to_lowercase().contains(&needle) {
                return true;
            }
        }
        if let Some(content) = post.content.get(lang) {
            if content.to_lowercase().contains(&needle) {
                return true;
            }
        }
    }
    false
}

fn matches_filter(filter: Option<&str>, value: &str) -> bool {
    match filter {
        None | Some("all") => true,
        Some(f) => f == value,
    }
}

/// Parses the display date for sorting; anything unparseable sorts as the
/// Unix epoch (the minimum).
fn parse_date(s: &str) -> NaiveDate {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(s).map(|dt| dt.date_naive()))
        .unwrap_or_default()
}
