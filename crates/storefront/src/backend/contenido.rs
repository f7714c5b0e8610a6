//! Blog and newsletter calls.

use refaccionaria_core::models::{BlogPost, Listado};
use refaccionaria_core::types::Email;
use reqwest::Method;
use serde_json::json;
use tracing::{debug, instrument};

use super::cache::{CacheKey, CacheValue};
use super::{BackendClient, BackendError};

impl BackendClient {
    /// Published posts. Cached for 60 seconds.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn blog_posts(&self) -> Result<Vec<BlogPost>, BackendError> {
        let key = CacheKey::BlogPosts;
        if let Some(CacheValue::BlogPosts(posts)) = self.inner.blog_cache.get(&key).await {
            debug!("Cache hit for blog posts");
            return Ok(posts);
        }

        let listado: Listado<BlogPost> = self
            .send(self.request(Method::GET, "/blog/posts/", None))
            .await?;
        let posts = listado.into_vec();

        self.inner
            .blog_cache
            .insert(key, CacheValue::BlogPosts(posts.clone()))
            .await;
        Ok(posts)
    }

    /// A single post. Cached for 60 seconds.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no post has that slug.
    #[instrument(skip(self))]
    pub async fn blog_post(&self, slug: &str) -> Result<BlogPost, BackendError> {
        let key = CacheKey::BlogPost(slug.to_owned());
        if let Some(CacheValue::BlogPost(post)) = self.inner.blog_cache.get(&key).await {
            debug!("Cache hit for blog post");
            return Ok(*post);
        }

        let post: BlogPost = self
            .send(self.request(
                Method::GET,
                &format!("/blog/posts/{}/", urlencoding::encode(slug)),
                None,
            ))
            .await?;

        self.inner
            .blog_cache
            .insert(key, CacheValue::BlogPost(Box::new(post.clone())))
            .await;
        Ok(post)
    }

    /// Subscribe an email to the newsletter.
    ///
    /// # Errors
    ///
    /// Returns `Validation` when the address is already subscribed.
    #[instrument(skip(self, email))]
    pub async fn suscribir_newsletter(&self, email: &Email) -> Result<(), BackendError> {
        self.send_empty(
            self.request(Method::POST, "/common/newsletters/", None)
                .json(&json!({ "email": email.as_str() })),
        )
        .await
    }
}
