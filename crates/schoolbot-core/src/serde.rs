use serde::{Deserialize, Deserializer};

/// Accepts a chat identity written either as a JSON number or a string.
///
/// Empty strings and `null` become `None`. Import files are edited by hand, so
/// both `"parent_id": 12345` and `"parent_id": "12345"` show up in practice.
pub fn deserialize_optional_i64_lenient<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumOrString {
        Num(i64),
        Str(String),
    }

    let opt: Option<NumOrString> = Option::deserialize(deserializer)?;
    match opt {
        Some(NumOrString::Num(n)) => Ok(Some(n)),
        Some(NumOrString::Str(s)) if s.trim().is_empty() => Ok(None),
        Some(NumOrString::Str(s)) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}
