//! Persisted document records.
//!
//! These are the shapes the record store speaks. The editing core owns a
//! richer in-memory `Document`; sessions convert to and from these at the
//! store boundary.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Identifier of a stored document.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(SmolStr);

impl DocumentId {
    pub fn new(id: impl Into<SmolStr>) -> Self {
        Self(id.into())
    }

    /// Fresh time-ordered id.
    pub fn generate() -> Self {
        Self(SmolStr::new(uuid::Uuid::now_v7().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which representation of a document is the ground truth.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentMode {
    #[default]
    Markdown,
    Html,
}

/// The two producers of content in the admin console.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// Blog article body.
    #[default]
    Article,
    /// Email newsletter body.
    Newsletter,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishStatus {
    #[default]
    Draft,
    Published,
    Sent,
}

/// A document as stored by the record store.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: Option<DocumentId>,
    pub kind: DocumentKind,
    pub title: String,
    /// Email subject line. Newsletters only.
    pub subject: Option<String>,
    /// Article category. Articles only.
    pub category: Option<String>,
    pub author: Option<SmolStr>,
    pub markdown_source: String,
    pub html_source: String,
    pub content_mode: ContentMode,
    pub status: PublishStatus,
    pub updated_at: Option<DateTime<Utc>>,
}

impl DocumentRecord {
    pub fn new(kind: DocumentKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            ..Default::default()
        }
    }

    /// Merge a partial update into this record.
    pub fn apply(&mut self, patch: DocumentPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(subject) = patch.subject {
            self.subject = Some(subject);
        }
        if let Some(category) = patch.category {
            self.category = Some(category);
        }
        if let Some(markdown) = patch.markdown_source {
            self.markdown_source = markdown;
        }
        if let Some(html) = patch.html_source {
            self.html_source = html;
        }
        if let Some(mode) = patch.content_mode {
            self.content_mode = mode;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
    }
}

/// Partial update. `None` fields are left untouched by the store.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentPatch {
    pub title: Option<String>,
    pub subject: Option<String>,
    pub category: Option<String>,
    pub markdown_source: Option<String>,
    pub html_source: Option<String>,
    pub content_mode: Option<ContentMode>,
    pub status: Option<PublishStatus>,
}

impl DocumentPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn with_status(mut self, status: PublishStatus) -> Self {
        self.status = Some(status);
        self
    }
}
