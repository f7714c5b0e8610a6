//! Cache types for backend responses.

use refaccionaria_core::models::{BlogPost, Categoria, Refaccion};

/// Cache key for catalog and blog reads.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Categorias,
    Destacados { limit: usize },
    BlogPosts,
    BlogPost(String),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Categorias(Vec<Categoria>),
    Refacciones(Vec<Refaccion>),
    BlogPosts(Vec<BlogPost>),
    BlogPost(Box<BlogPost>),
}
