// src/models/stats.rs

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::post::{Category, Post, PostStatus};

/// Aggregate counters shown on the dashboard header cards.
#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub total_posts: usize,
    pub total_published: usize,
    pub total_drafts: usize,
    /// Sum of views over published posts only.
    pub total_views: i64,
    /// `total_views / total_published`, rounded; 0 when nothing is published.
    pub avg_views: i64,
    /// Category with the most posts (draft + published). `None` when there
    /// are no posts at all.
    pub top_category: Option<Category>,
    /// Posts created within the trailing 7 days of the computation instant.
    pub recent_activity: usize,
}

/// One entry of the category distribution.
#[derive(Debug, Serialize)]
pub struct CategoryCount {
    pub name: Category,
    pub count: usize,
}

/// Everything the dashboard screen needs, derived in one pass over the full
/// post list.
#[derive(Debug, Serialize)]
pub struct DashboardData {
    pub stats: DashboardStats,
    /// First 5 posts of the input, which is expected newest-first.
    pub recent_posts: Vec<Post>,
    /// Top 3 published posts by views, input order breaking ties.
    pub popular_posts: Vec<Post>,
    /// Category distribution, by count descending. Equal counts keep
    /// first-encountered order.
    pub categories: Vec<CategoryCount>,
}

impl DashboardData {
    /// Recomputes all statistics from the full post list.
    ///
    /// No caching: every call derives everything from `posts` again; the
    /// caller re-fetches when the underlying data changes. `now` is passed
    /// in so the 7-day activity window is testable.
    pub fn compute(posts: &[Post], now: DateTime<Utc>) -> DashboardData {
        let total_posts = posts.len();
        let published: Vec<&Post> = posts
            .iter()
            .filter(|p| p.status == PostStatus::Published)
            .collect();
        let total_published = published.len();
        let total_drafts = total_posts - total_published;

        let total_views: i64 = published.iter().map(|p| p.views).sum();
        let avg_views = if published.is_empty() {
            0
        } else {
            (total_views as f64 / published.len() as f64).round() as i64
        };

        // Grouped in first-encountered order; the count sort below is stable,
        // so equal counts keep that order rather than an alphabetical one.
        let mut categories: Vec<CategoryCount> = Vec::new();
        for post in posts {
            match categories.iter_mut().find(|c| c.name == post.category) {
                Some(entry) => entry.count += 1,
                None => categories.push(CategoryCount {
                    name: post.category,
                    count: 1,
                }),
            }
        }
        categories.sort_by(|a, b| b.count.cmp(&a.count));

        let top_category = categories.first().map(|c| c.name);

        let week_ago = now - Duration::days(7);
        let recent_activity = posts.iter().filter(|p| p.created_at > week_ago).count();

        let recent_posts: Vec<Post> = posts.iter().take(5).cloned().collect();

        let mut popular_posts: Vec<Post> = published.into_iter().cloned().collect();
        popular_posts.sort_by(|a, b| b.views.cmp(&a.views));
        popular_posts.truncate(3);

        DashboardData {
            stats: DashboardStats {
                total_posts,
                total_published,
                total_drafts,
                total_views,
                avg_views,
                top_category,
                recent_activity,
            },
            recent_posts,
            popular_posts,
            categories,
        }
    }
}
