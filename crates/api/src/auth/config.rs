use anyhow::Context;

use crate::config::{optional_var, parse_var};

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiration_hours: u64,
}

impl AuthConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let jwt_secret = optional_var("JWT_SECRET").context("JWT_SECRET must be set")?;
        Ok(Self {
            jwt_secret,
            jwt_expiration_hours: parse_var("JWT_EXPIRATION_HOURS", 24)?,
        })
    }
}
