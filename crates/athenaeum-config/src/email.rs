use crate::env::{flag_or, parse_or, string_or};

#[derive(Clone, Debug)]
pub struct EmailConfig {
    pub enabled: bool,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub from_email: String,
    pub from_name: String,
    pub frontend_url: String,
}

impl EmailConfig {
    pub fn from_env() -> Self {
        Self {
            enabled: flag_or("SMTP_ENABLED", false),
            smtp_host: string_or("SMTP_HOST", "localhost"),
            smtp_port: parse_or("SMTP_PORT", 1025),
            smtp_username: string_or("SMTP_USERNAME", ""),
            smtp_password: string_or("SMTP_PASSWORD", ""),
            from_email: string_or("FROM_EMAIL", "noreply@library.uew.edu.gh"),
            from_name: string_or("FROM_NAME", "UEW Digital Library"),
            frontend_url: string_or("FRONTEND_URL", "http://localhost:5173")
                .trim_end_matches('/')
                .to_string(),
        }
    }
}
