use serde::{Deserialize, Deserializer};

pub const FIRST_PAGE: i64 = 1;

// `?page=abc` falls back to the first page instead of rejecting the request
pub fn deserialize_page<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value
        .and_then(|v| v.trim().parse::<i64>().ok())
        .unwrap_or(FIRST_PAGE))
}

pub fn default_page() -> i64 {
    FIRST_PAGE
}
