//! Search result types.
//!
//! Providers disagree on field names (`title` vs `name`, `content` vs
//! `snippet`, `url` vs `link`) and some return bare strings, so results keep
//! whatever arrived and resolve display fields lazily.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A structured search record.
///
/// Known text fields are lifted out; everything else the provider sent
/// (scores, dates, raw content) is kept in `extra` and serialized back
/// unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,

    /// Provider fields without a dedicated slot
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SearchRecord {
    /// Record with the three primary fields set.
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            title: Some(title.into()),
            content: Some(content.into()),
            url: Some(url.into()),
            ..Self::default()
        }
    }

    /// First non-empty of `title`, `name`.
    pub fn display_title(&self) -> Option<&str> {
        first_present([&self.title, &self.name])
    }

    /// First non-empty of `content`, `snippet`, `description`.
    pub fn display_content(&self) -> Option<&str> {
        first_present([&self.content, &self.snippet, &self.description])
    }

    /// First non-empty of `url`, `link`.
    pub fn display_url(&self) -> Option<&str> {
        first_present([&self.url, &self.link])
    }
}

fn first_present<const N: usize>(fields: [&Option<String>; N]) -> Option<&str> {
    fields
        .into_iter()
        .filter_map(|f| f.as_deref())
        .find(|s| !s.is_empty())
}

/// One raw search result as returned by a provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SearchResult {
    /// A structured record
    Record(SearchRecord),
    /// A bare string result
    Text(String),
}

impl<'de> Deserialize<'de> for SearchResult {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(SearchResult::from)
    }
}

impl From<SearchRecord> for SearchResult {
    fn from(record: SearchRecord) -> Self {
        SearchResult::Record(record)
    }
}

impl From<Value> for SearchResult {
    /// Lenient conversion: never fails, whatever the JSON shape.
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => SearchResult::Text(s),
            Value::Object(mut map) => {
                let mut take = |key: &str| match map.remove(key) {
                    Some(Value::String(s)) => Some(s),
                    Some(Value::Null) | None => None,
                    // Wrong type: keep it verbatim among the extras
                    Some(other) => {
                        map.insert(key.to_string(), other);
                        None
                    }
                };

                let mut record = SearchRecord {
                    title: take("title"),
                    name: take("name"),
                    content: take("content"),
                    snippet: take("snippet"),
                    description: take("description"),
                    url: take("url"),
                    link: take("link"),
                    extra: Map::new(),
                };
                record.extra = map;
                SearchResult::Record(record)
            }
            other => SearchResult::Text(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_value_record_with_alternates() {
        let result = SearchResult::from(json!({
            "name": "Acme Corp",
            "snippet": "Shares rose",
            "link": "https://acme.test",
            "score": 0.93
        }));

        let SearchResult::Record(record) = result else {
            panic!("expected a record");
        };
        assert_eq!(record.display_title(), Some("Acme Corp"));
        assert_eq!(record.display_content(), Some("Shares rose"));
        assert_eq!(record.display_url(), Some("https://acme.test"));
        assert_eq!(record.extra.get("score"), Some(&json!(0.93)));
    }

    #[test]
    fn test_primary_fields_take_priority() {
        let record = SearchRecord {
            title: Some("Primary".to_string()),
            name: Some("Alternate".to_string()),
            ..SearchRecord::default()
        };
        assert_eq!(record.display_title(), Some("Primary"));
    }

    #[test]
    fn test_empty_fields_fall_through() {
        let record = SearchRecord {
            title: Some(String::new()),
            name: Some("Fallback".to_string()),
            ..SearchRecord::default()
        };
        assert_eq!(record.display_title(), Some("Fallback"));
        assert_eq!(record.display_content(), None);
        assert_eq!(record.display_url(), None);
    }

    #[test]
    fn test_from_value_odd_shapes() {
        assert_eq!(
            SearchResult::from(json!("plain text")),
            SearchResult::Text("plain text".to_string())
        );
        assert_eq!(SearchResult::from(json!(42)), SearchResult::Text("42".to_string()));

        let SearchResult::Record(record) = SearchResult::from(json!({"title": 7, "url": null}))
        else {
            panic!("expected a record");
        };
        assert_eq!(record.title, None);
        assert_eq!(record.url, None);
        assert_eq!(record.extra.get("title"), Some(&json!(7)));
    }

    #[test]
    fn test_serialization_preserves_raw_shape() {
        let raw = json!({"title": "T", "content": "C", "url": "U", "score": 1.5});
        let result: SearchResult = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(serde_json::to_value(&result).unwrap(), raw);

        let text: SearchResult = serde_json::from_value(json!("bare")).unwrap();
        assert_eq!(serde_json::to_value(&text).unwrap(), json!("bare"));
    }
}
