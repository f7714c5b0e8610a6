//! Blog route handlers.
//!
//! Posts come from the backend and are cached for 60 seconds by the client.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use refaccionaria_core::models::BlogPost;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::state::AppState;
use crate::views::Layout;

/// Number of recent posts to show under a post.
const RECENT_POSTS_COUNT: usize = 3;

/// Post view for templates.
#[derive(Clone)]
pub struct PostView {
    pub slug: String,
    pub title: String,
    pub resume: String,
    pub image: String,
    pub category: String,
    pub published: String,
    /// Body split on blank lines.
    pub paragraphs: Vec<String>,
}

impl From<&BlogPost> for PostView {
    fn from(post: &BlogPost) -> Self {
        let resume = if post.resume.trim().is_empty() {
            excerpt(&post.description, 160)
        } else {
            post.resume.trim().to_owned()
        };
        Self {
            slug: post.slug.clone(),
            title: post.title.clone(),
            resume,
            image: post.image.clone().unwrap_or_default(),
            category: post.category.clone().unwrap_or_default(),
            published: post.published.clone().unwrap_or_default(),
            paragraphs: paragraphs(&post.description),
        }
    }
}

fn paragraphs(text: &str) -> Vec<String> {
    text.replace("\r\n", "\n")
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_owned)
        .collect()
}

/// First `max` characters, cut at a word boundary.
fn excerpt(text: &str, max: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max {
        return text.to_owned();
    }
    let cut: String = text.chars().take(max).collect();
    let cut = cut.rsplit_once(' ').map_or(cut.as_str(), |(head, _)| head);
    format!("{}…", cut.trim_end())
}

/// Blog index page template.
#[derive(Template, WebTemplate)]
#[template(path = "blog/index.html")]
pub struct BlogIndexTemplate {
    pub layout: Layout,
    pub posts: Vec<PostView>,
}

/// Blog post detail template.
#[derive(Template, WebTemplate)]
#[template(path = "blog/show.html")]
pub struct BlogShowTemplate {
    pub layout: Layout,
    pub post: PostView,
    pub recent_posts: Vec<PostView>,
    /// Base URL for canonical links.
    pub base_url: String,
}

/// Display the blog index page.
#[instrument(skip(state, session, auth))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(auth): OptionalAuth,
) -> Result<impl IntoResponse> {
    let posts = state.backend().blog_posts().await?;
    Ok(BlogIndexTemplate {
        layout: Layout::load(&session, &auth).await,
        posts: posts.iter().map(PostView::from).collect(),
    })
}

/// Display a single blog post by slug.
///
/// # Errors
///
/// Returns 404 if the backend has no such post.
#[instrument(skip(state, session, auth))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(auth): OptionalAuth,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse> {
    let (post, posts) = tokio::join!(state.backend().blog_post(&slug), state.backend().blog_posts());
    let post = post?;
    let recent_posts = posts
        .unwrap_or_else(|e| {
            tracing::warn!("Failed to fetch recent posts: {e}");
            Vec::new()
        })
        .iter()
        .filter(|p| p.slug != slug)
        .take(RECENT_POSTS_COUNT)
        .map(PostView::from)
        .collect();

    Ok(BlogShowTemplate {
        layout: Layout::load(&session, &auth).await,
        post: PostView::from(&post),
        recent_posts,
        base_url: state.config().base_url.clone(),
    })
}
