use std::str::FromStr;

pub(crate) fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

pub(crate) fn string_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

pub(crate) fn flag_or(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| parse_flag(&v))
        .unwrap_or(default)
}

pub(crate) fn parse_flag(value: &str) -> bool {
    let value = value.trim().to_lowercase();
    value == "true" || value == "1"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags() {
        assert!(parse_flag("true"));
        assert!(parse_flag("TRUE"));
        assert!(parse_flag("1"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag("0"));
        assert!(!parse_flag(""));
    }

    #[test]
    fn missing_vars_fall_back() {
        assert_eq!(parse_or("ATHENAEUM_TEST_UNSET_NUMBER", 42u32), 42);
        assert_eq!(string_or("ATHENAEUM_TEST_UNSET_STRING", "x"), "x");
        assert!(flag_or("ATHENAEUM_TEST_UNSET_FLAG", true));
    }
}
