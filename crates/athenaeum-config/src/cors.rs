use crate::env::string_or;

#[derive(Clone, Debug)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    pub fn from_env() -> Self {
        Self::parse(&string_or(
            "ALLOWED_ORIGINS",
            "http://localhost:3000,http://localhost:5173",
        ))
    }

    pub fn parse(origins: &str) -> Self {
        let allowed_origins = origins
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Self { allowed_origins }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_and_trims() {
        let config = CorsConfig::parse(" http://a.test , ,http://b.test");
        assert_eq!(config.allowed_origins, vec!["http://a.test", "http://b.test"]);
    }
}
