use std::sync::OnceLock;

static OBSERVABILITY_ENABLED: OnceLock<bool> = OnceLock::new();

/// Reads `OBSERVABILITY_ENABLED` once; enabled unless set to `false` or `0`.
pub fn is_observability_enabled() -> bool {
    if cfg!(not(feature = "observability")) {
        return false;
    }
    *OBSERVABILITY_ENABLED.get_or_init(|| {
        std::env::var("OBSERVABILITY_ENABLED")
            .map(|v| v.to_lowercase() != "false" && v != "0")
            .unwrap_or(true)
    })
}
