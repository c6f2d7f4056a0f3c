// src/config.rs

use dotenvy::dotenv;
use std::env;
use url::Url;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    /// Token lifetime in seconds.
    pub jwt_expiration: u64,
    pub rust_log: String,
    pub port: u16,

    /// Admin account seeded at startup when both are set.
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,

    /// Translation collaborator (OpenAI-compatible chat completions).
    pub openai_api_key: Option<String>,
    pub openai_api_base: String,
    pub translator_model: String,

    /// Local directory for uploaded cover images, served at /uploads.
    pub upload_dir: String,
    /// Base URL used to build public upload URLs.
    pub public_base_url: Url,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");

        let jwt_expiration = env::var("JWT_EXPIRATION")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(86400);

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let port = env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3000);

        let public_base_url =
            env::var("PUBLIC_BASE_URL").unwrap_or_else(|_| format!("http://localhost:{port}"));
        let public_base_url = normalize_base_url(
            Url::parse(&public_base_url).expect("PUBLIC_BASE_URL must be a valid URL"),
        );

        Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            rust_log,
            port,
            admin_email: env::var("ADMIN_EMAIL").ok(),
            admin_password: env::var("ADMIN_PASSWORD").ok(),
            openai_api_key: env::var("OPENAI_API_KEY").ok(),
            openai_api_base: env::var("OPENAI_API_BASE")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            translator_model: env::var("TRANSLATOR_MODEL")
                .unwrap_or_else(|_| "gpt-3.5-turbo".to_string()),
            upload_dir: env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string()),
            public_base_url,
        }
    }
}

/// Ensures the base URL path ends with a slash, so joining a relative
/// path appends to it instead of replacing the last segment.
fn normalize_base_url(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[cfg(test)]
mod tests {
    use super::normalize_base_url;
    use url::Url;

    #[test]
    fn base_url_with_path_keeps_its_last_segment_on_join() {
        let base = normalize_base_url(Url::parse("https://example.com/api").unwrap());
        let joined = base.join("uploads/anh.jpg").unwrap();
        assert_eq!(joined.as_str(), "https://example.com/api/uploads/anh.jpg");
    }

    #[test]
    fn already_normalized_base_url_is_unchanged() {
        let base = normalize_base_url(Url::parse("http://localhost:3000/").unwrap());
        assert_eq!(base.as_str(), "http://localhost:3000/");
        let joined = base.join("uploads/anh.jpg").unwrap();
        assert_eq!(joined.as_str(), "http://localhost:3000/uploads/anh.jpg");
    }
}
