use anyhow::Context;

use crate::env::parse_or;

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            url: std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 10),
        })
    }
}
