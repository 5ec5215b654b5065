use crate::env::string_or;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub addr: String,
    pub metrics_addr: String,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            addr: string_or("SERVER_ADDR", "0.0.0.0:5000"),
            metrics_addr: string_or("METRICS_ADDR", "0.0.0.0:9090"),
        }
    }
}
