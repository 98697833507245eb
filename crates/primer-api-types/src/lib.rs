//! Shared request and response types for the Primer items API.
//!
//! The item resources follow the HAL conventions: links live under `_links`, embedded
//! collections under `_embedded`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Media type of item and collection responses.
pub const HAL_JSON: &str = "application/hal+json";

/// A single hypermedia link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
}

impl Link {
    pub fn new(href: impl Into<String>) -> Self {
        Self { href: href.into() }
    }
}

/// Links keyed by relation name (`self`, `first`, `next`, ...).
pub type Links = BTreeMap<String, Link>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemModel {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    #[serde(rename = "_links", default)]
    pub links: Links,
}

/// Body of `POST /api/items` and `PUT /api/items/{id}`.
///
/// Fields are optional on the wire so that a missing field surfaces as a validation
/// failure rather than a decoding failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewItemRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
    pub size: u32,
    pub total_elements: u64,
    pub total_pages: u32,
    pub number: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddedItems {
    #[serde(default)]
    pub items: Vec<ItemModel>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemCollection {
    #[serde(rename = "_embedded", default)]
    pub embedded: EmbeddedItems,
    #[serde(rename = "_links", default)]
    pub links: Links,
    pub page: PageMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Greeting {
    pub id: u64,
    pub content: String,
}

/// Uniform error body returned by every failing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub status: u16,
    pub error: String,
    pub message: String,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_errors: Vec<ApiSubError>,
}

/// One rejected field of a request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiSubError {
    pub field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejected_value: Option<String>,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_model_uses_hal_link_key() {
        let mut links = Links::new();
        links.insert("self".to_string(), Link::new("/api/items/abc"));
        let model = ItemModel {
            id: Uuid::nil(),
            name: "n".to_string(),
            description: "d".to_string(),
            links,
        };

        let value = serde_json::to_value(&model).expect("serialize");
        assert_eq!(value["_links"]["self"]["href"], "/api/items/abc");
    }

    #[test]
    fn new_item_request_tolerates_missing_fields() {
        let request: NewItemRequest = serde_json::from_str(r#"{"name":"only"}"#).expect("decode");
        assert_eq!(request.name.as_deref(), Some("only"));
        assert!(request.description.is_none());
    }

    #[test]
    fn empty_sub_errors_are_omitted() {
        let body = ApiErrorBody {
            status: 404,
            error: "not_found".to_string(),
            message: "missing".to_string(),
            timestamp: "2024-01-01T00:00:00Z".to_string(),
            sub_errors: Vec::new(),
        };
        let value = serde_json::to_value(&body).expect("serialize");
        assert!(value.get("sub_errors").is_none());
    }
}
