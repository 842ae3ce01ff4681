//! Deserialization helpers for query strings, where every value arrives as text
//! and an empty value (`?teacher_id=`) means "not provided".

use serde::{Deserialize, Deserializer};
use uuid::Uuid;

fn non_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.and_then(|s| {
        let trimmed = s.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }))
}

pub fn deserialize_optional_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match non_empty(deserializer)? {
        Some(s) => s.parse::<i64>().map(Some).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

pub fn deserialize_optional_uuid<'de, D>(deserializer: D) -> Result<Option<Uuid>, D::Error>
where
    D: Deserializer<'de>,
{
    match non_empty(deserializer)? {
        Some(s) => Uuid::parse_str(&s)
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

pub fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    non_empty(deserializer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Query {
        #[serde(default, deserialize_with = "deserialize_optional_uuid")]
        teacher_id: Option<Uuid>,
        #[serde(default, deserialize_with = "empty_string_as_none")]
        search: Option<String>,
    }

    #[test]
    fn empty_values_are_none() {
        let q: Query = serde_json::from_str(r#"{"teacher_id": "", "search": "  "}"#).unwrap();
        assert!(q.teacher_id.is_none());
        assert!(q.search.is_none());
    }

    #[test]
    fn values_are_parsed_and_trimmed() {
        let id = Uuid::new_v4();
        let q: Query =
            serde_json::from_str(&format!(r#"{{"teacher_id": "{}", "search": " web "}}"#, id))
                .unwrap();
        assert_eq!(q.teacher_id, Some(id));
        assert_eq!(q.search.as_deref(), Some("web"));
    }

    #[test]
    fn invalid_uuid_is_rejected() {
        let result: Result<Query, _> = serde_json::from_str(r#"{"teacher_id": "nope"}"#);
        assert!(result.is_err());
    }
}
