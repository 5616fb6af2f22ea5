use jsonwebtoken::Algorithm;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub secret_key: String,
    pub algorithm: Algorithm,
    pub token_ttl_minutes: i64,
    /// When true, users with `is_active = false` fail authentication.
    pub reject_inactive: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub cors_origins: Vec<String>,
    pub first_superuser: Option<String>,
    pub first_superuser_password: Option<String>,
    pub auth: AuthConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let secret_key = std::env::var("SECRET_KEY")
            .map_err(|_| anyhow::anyhow!("SECRET_KEY must be set"))?;
        let algorithm: Algorithm = std::env::var("ALGORITHM")
            .unwrap_or_else(|_| "HS256".into())
            .parse()
            .map_err(|_| anyhow::anyhow!("ALGORITHM is not a valid JWT algorithm"))?;
        let auth = AuthConfig {
            secret_key,
            algorithm,
            token_ttl_minutes: std::env::var("ACCESS_TOKEN_EXPIRE_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(30),
            reject_inactive: std::env::var("AUTH_REJECT_INACTIVE")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        };

        Ok(Self {
            database_url: database_url_from_env()?,
            cors_origins: cors_origins_from_env(std::env::var("BACKEND_CORS_ORIGINS").ok()),
            first_superuser: std::env::var("FIRST_SUPERUSER").ok(),
            first_superuser_password: std::env::var("FIRST_SUPERUSER_PASSWORD").ok(),
            auth,
        })
    }
}

/// Prefer a full DATABASE_URL; otherwise assemble one from POSTGRES_* parts.
fn database_url_from_env() -> anyhow::Result<String> {
    if let Ok(url) = std::env::var("DATABASE_URL") {
        return Ok(url);
    }
    let server = std::env::var("POSTGRES_SERVER").unwrap_or_else(|_| "localhost".into());
    let user = std::env::var("POSTGRES_USER").unwrap_or_else(|_| "postgres".into());
    let password = std::env::var("POSTGRES_PASSWORD").unwrap_or_else(|_| "postgres".into());
    let db = std::env::var("POSTGRES_DB").unwrap_or_else(|_| "postgres".into());
    let port = std::env::var("POSTGRES_PORT").unwrap_or_else(|_| "5432".into());
    Ok(format!(
        "postgres://{}:{}@{}:{}/{}",
        user, password, server, port, db
    ))
}

fn cors_origins_from_env(raw: Option<String>) -> Vec<String> {
    raw.map(|v| {
        v.split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    })
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cors_origins_split_and_trimmed() {
        let origins = cors_origins_from_env(Some(
            "http://localhost:3000, https://app.example.com".into(),
        ));
        assert_eq!(
            origins,
            vec![
                "http://localhost:3000".to_string(),
                "https://app.example.com".to_string()
            ]
        );
    }

    #[test]
    fn cors_origins_empty_when_unset() {
        assert!(cors_origins_from_env(None).is_empty());
        assert!(cors_origins_from_env(Some("".into())).is_empty());
    }
}
