use indexmap::IndexMap;
use serde::Deserialize;

use super::schema::SchemaOrRef;

/// A media type entry of a `content` map.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct MediaType {
    #[serde(default)]
    pub schema: Option<SchemaOrRef>,
}

/// A request body definition.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RequestBody {
    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub content: IndexMap<String, MediaType>,

    #[serde(default)]
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RequestBodyOrRef {
    Ref {
        #[serde(rename = "$ref")]
        ref_path: String,
    },
    RequestBody(RequestBody),
}

/// A response definition.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub content: IndexMap<String, MediaType>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ResponseOrRef {
    Ref {
        #[serde(rename = "$ref")]
        ref_path: String,
    },
    Response(Response),
}

/// Pick the media type the SDK speaks: `application/json` when present,
/// otherwise any other JSON flavour, otherwise the first declared entry.
pub fn preferred_media(content: &IndexMap<String, MediaType>) -> Option<(&str, &MediaType)> {
    content
        .get_key_value("application/json")
        .or_else(|| content.iter().find(|(ct, _)| ct.ends_with("+json")))
        .or_else(|| content.first())
        .map(|(ct, mt)| (ct.as_str(), mt))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content(types: &[&str]) -> IndexMap<String, MediaType> {
        types
            .iter()
            .map(|t| (t.to_string(), MediaType::default()))
            .collect()
    }

    #[test]
    fn prefers_application_json() {
        let c = content(&["text/plain", "application/json"]);
        assert_eq!(preferred_media(&c).map(|(ct, _)| ct), Some("application/json"));
    }

    #[test]
    fn falls_back_to_json_suffix_then_first() {
        let c = content(&["text/plain", "application/problem+json"]);
        assert_eq!(
            preferred_media(&c).map(|(ct, _)| ct),
            Some("application/problem+json")
        );

        let c = content(&["application/octet-stream", "text/plain"]);
        assert_eq!(
            preferred_media(&c).map(|(ct, _)| ct),
            Some("application/octet-stream")
        );
        assert!(preferred_media(&IndexMap::new()).is_none());
    }
}
