//! Entity-tag fingerprints for conditional requests.
//!
//! A single item is fingerprinted by the MD5 of its decimal version; a page by the MD5 of
//! its JSON form, metadata included. Fingerprints are computed on demand and never stored.

use std::fmt;

use md5::{Digest, Md5};

use crate::application::pagination::Page;
use crate::domain::entities::ItemRecord;

/// Lowercase hex digest, without quotes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn of_version(version: i32) -> Self {
        Self::of_bytes(version.to_string().as_bytes())
    }

    pub fn of_item(item: &ItemRecord) -> Self {
        Self::of_version(item.version)
    }

    pub fn of_page(page: &Page<ItemRecord>) -> Result<Self, serde_json::Error> {
        let bytes = serde_json::to_vec(page)?;
        Ok(Self::of_bytes(&bytes))
    }

    fn of_bytes(bytes: &[u8]) -> Self {
        Self(hex::encode(Md5::digest(bytes)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Quoted form used in the `ETag` header.
    pub fn header_value(&self) -> String {
        format!("\"{}\"", self.0)
    }

    /// Compares against the raw first entry of a client header. Absent or malformed tags
    /// never match.
    pub fn matches(&self, client_tag: Option<&str>) -> bool {
        client_tag
            .and_then(parse_entity_tag)
            .is_some_and(|opaque| opaque == self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// First comma-separated entry of an `If-None-Match` / `If-Match` value.
pub fn first_entity_tag(header: &str) -> Option<&str> {
    header
        .split(',')
        .map(str::trim)
        .find(|candidate| !candidate.is_empty())
}

/// Opaque part of `"tag"` or `W/"tag"`.
pub fn parse_entity_tag(raw: &str) -> Option<&str> {
    let raw = raw.trim();
    let raw = raw.strip_prefix("W/").unwrap_or(raw);
    let inner = raw.strip_prefix('"')?.strip_suffix('"')?;
    (!inner.contains('"')).then_some(inner)
}
