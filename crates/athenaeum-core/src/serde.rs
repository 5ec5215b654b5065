use serde::{Deserialize, Deserializer};

/// Treats a missing, null, or blank string field as "leave unchanged".
pub fn deserialize_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.filter(|s| !s.trim().is_empty()))
}

/// Strips surrounding whitespace before validation sees the value.
pub fn deserialize_trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Ok(s.trim().to_string())
}

/// [`deserialize_optional_string`], with the kept value trimmed.
pub fn deserialize_optional_trimmed<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(deserialize_optional_string(deserializer)?.map(|s| s.trim().to_string()))
}
