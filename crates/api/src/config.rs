use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Context;
use infra::repos::announcements::DEFAULT_ANNOUNCEMENT_CAPACITY;
use infra::repos::news::DEFAULT_NEWS_CAPACITY;

use crate::auth::AuthConfig;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Postgres holding the events table. Without it events live in the
    /// local store only.
    pub database_url: Option<String>,
    /// Directory for the JSON-backed local store. In-memory when unset.
    pub data_dir: Option<PathBuf>,
    pub port: u16,
    /// Requests without a token act as the stored demo user.
    pub demo_mode: bool,
    pub announcement_capacity: usize,
    pub news_capacity: usize,
    /// Account that is made super-admin on registration or at startup.
    /// Without one nobody can hand out roles.
    pub super_admin_email: Option<String>,
    pub auth: AuthConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: optional_var("DATABASE_URL"),
            data_dir: optional_var("DATA_DIR").map(PathBuf::from),
            port: parse_var("PORT", 8080)?,
            demo_mode: parse_var("DEMO_MODE", false)?,
            announcement_capacity: parse_var("ANNOUNCEMENT_CAPACITY", DEFAULT_ANNOUNCEMENT_CAPACITY)?,
            news_capacity: parse_var("NEWS_CAPACITY", DEFAULT_NEWS_CAPACITY)?,
            super_admin_email: optional_var("SUPER_ADMIN_EMAIL").map(|e| e.trim().to_lowercase()),
            auth: AuthConfig::from_env()?,
        })
    }

    /// In-memory configuration with no database, used by tests and tooling.
    pub fn local(jwt_secret: impl Into<String>) -> Self {
        Self {
            database_url: None,
            data_dir: None,
            port: 0,
            demo_mode: false,
            announcement_capacity: DEFAULT_ANNOUNCEMENT_CAPACITY,
            news_capacity: DEFAULT_NEWS_CAPACITY,
            super_admin_email: None,
            auth: AuthConfig {
                jwt_secret: jwt_secret.into(),
                jwt_expiration_hours: 24,
            },
        }
    }

    pub fn is_super_admin_email(&self, email: &str) -> bool {
        self.super_admin_email
            .as_deref()
            .is_some_and(|configured| configured == email.trim().to_lowercase())
    }
}

pub(crate) fn optional_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

pub(crate) fn parse_var<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {key}: {raw:?}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_var_reports_the_key() {
        std::env::set_var("VOLLEY_TEST_PORT", "eighty");
        let err = parse_var::<u16>("VOLLEY_TEST_PORT", 8080).unwrap_err();
        assert!(err.to_string().contains("VOLLEY_TEST_PORT"));
        std::env::remove_var("VOLLEY_TEST_PORT");

        assert_eq!(parse_var::<u16>("VOLLEY_TEST_PORT", 8080).unwrap(), 8080);
    }

    #[test]
    fn super_admin_email_matches_case_insensitively() {
        let mut config = AppConfig::local("secret");
        assert!(!config.is_super_admin_email("root@example.jp"));

        config.super_admin_email = Some("root@example.jp".into());
        assert!(config.is_super_admin_email(" Root@Example.JP "));
        assert!(!config.is_super_admin_email("other@example.jp"));
    }
}
