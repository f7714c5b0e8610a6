//! Light/dark theme preference, kept in the `admin_theme` cookie.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use tower_sessions::cookie::time::Duration;
use tower_sessions::cookie::{Cookie, SameSite};

use crate::config::AppEnv;

pub const THEME_COOKIE: &str = "admin_theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(Cookie::split_parse)
            .filter_map(Result::ok)
            .find(|cookie| cookie.name() == THEME_COOKIE)
            .and_then(|cookie| Self::parse(cookie.value()))
            .unwrap_or_default()
    }

    /// Cookie remembering this theme for a year. Scripts read it, so it is
    /// not httpOnly.
    #[must_use]
    pub fn cookie(self, env: AppEnv) -> Cookie<'static> {
        Cookie::build((THEME_COOKIE, self.as_str()))
            .http_only(false)
            .same_site(SameSite::Lax)
            .secure(env.secure_cookies())
            .path("/")
            .max_age(Duration::days(365))
            .build()
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<S> FromRequestParts<S> for Theme
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_reads_cookie_and_defaults_to_light() {
        let mut headers = HeaderMap::new();
        assert_eq!(Theme::from_headers(&headers), Theme::Light);

        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("access_cookie=x; admin_theme=dark"),
        );
        assert_eq!(Theme::from_headers(&headers), Theme::Dark);

        headers.insert(header::COOKIE, HeaderValue::from_static("admin_theme=sepia"));
        assert_eq!(Theme::from_headers(&headers), Theme::Light);
    }

    #[test]
    fn test_cookie_lasts_a_year() {
        let cookie = Theme::Dark.cookie(AppEnv::Production);
        assert_eq!(cookie.value(), "dark");
        assert_eq!(cookie.max_age(), Some(Duration::days(365)));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
    }
}
