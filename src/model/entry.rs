//! Entry resources as returned by the entries API.

use serde::{Deserialize, Serialize};

use super::timestamp::{WireTimestamp, int_flag, null_as_default, serialize_int_flag};

/// Hypermedia link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Target URL.
    #[serde(default, deserialize_with = "null_as_default")]
    pub href: String,
}

/// Link set attached to pages and entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Links {
    /// Link to this resource.
    #[serde(rename = "self", default)]
    pub self_link: Option<Link>,
    /// First page.
    #[serde(default)]
    pub first: Option<Link>,
    /// Last page.
    #[serde(default)]
    pub last: Option<Link>,
    /// Next page, absent on the last page.
    #[serde(default)]
    pub next: Option<Link>,
}

/// A tag attached to an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Tag id.
    #[serde(default)]
    pub id: u64,
    /// Display label.
    #[serde(default, deserialize_with = "null_as_default")]
    pub label: String,
    /// URL slug.
    #[serde(default, deserialize_with = "null_as_default")]
    pub slug: String,
}

/// Highlighted range inside an annotation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotationRange {
    #[serde(default, deserialize_with = "null_as_default")]
    pub start: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub end: String,
    /// Offsets arrive as either numbers or strings depending on server version.
    #[serde(rename = "startOffset", default)]
    pub start_offset: serde_json::Value,
    #[serde(rename = "endOffset", default)]
    pub end_offset: serde_json::Value,
}

/// A user annotation on an entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    #[serde(default)]
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub annotator_schema_version: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub quote: String,
    #[serde(default)]
    pub created_at: WireTimestamp,
    #[serde(default)]
    pub updated_at: WireTimestamp,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ranges: Vec<AnnotationRange>,
}

/// A saved article.
///
/// Immutable once decoded; patching an entry on the server does not change
/// a local value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Server-assigned id.
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub domain_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub language: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub mimetype: String,
    #[serde(default)]
    pub preview_picture: Option<String>,
    /// Estimated reading time in minutes.
    #[serde(default, deserialize_with = "null_as_default")]
    pub reading_time: u32,
    #[serde(default, deserialize_with = "int_flag", serialize_with = "serialize_int_flag")]
    pub is_archived: bool,
    #[serde(default, deserialize_with = "int_flag", serialize_with = "serialize_int_flag")]
    pub is_starred: bool,
    #[serde(default)]
    pub created_at: WireTimestamp,
    #[serde(default)]
    pub updated_at: WireTimestamp,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<Tag>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub annotations: Vec<Annotation>,
    #[serde(rename = "_links", default)]
    pub links: Links,
    #[serde(default)]
    pub user_id: Option<u64>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub user_email: Option<String>,
}

impl Entry {
    /// Tag labels in server order.
    #[must_use]
    pub fn tag_labels(&self) -> Vec<&str> {
        self.tags.iter().map(|tag| tag.label.as_str()).collect()
    }
}

/// Embedded payload of an entries page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedEntries {
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<Entry>,
}

/// One page of the entries listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryPage {
    /// 1-based current page number.
    #[serde(default)]
    pub page: u32,
    /// Page size.
    #[serde(default)]
    pub limit: u32,
    /// Total number of pages.
    #[serde(default)]
    pub pages: u32,
    /// Total number of entries across pages.
    #[serde(default)]
    pub total: u64,
    #[serde(rename = "_links", default)]
    pub links: Links,
    #[serde(rename = "_embedded", default)]
    pub embedded: EmbeddedEntries,
}

impl EntryPage {
    /// Returns true while more pages follow this one.
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.page < self.pages
    }

    /// `href` of the next page link, if present and non-empty.
    #[must_use]
    pub fn next_href(&self) -> Option<&str> {
        self.links
            .next
            .as_ref()
            .map(|link| link.href.as_str())
            .filter(|href| !href.is_empty())
    }
}
