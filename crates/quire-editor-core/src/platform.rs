//! Capabilities the host UI supplies to the editing core.
//!
//! The core never queries a rendering surface. Whatever hosts the editor
//! (a web view, a terminal UI, a test) reports the current selection and
//! picks images through these traits.

use std::future::Future;

use quire_common::ContentMode;

use crate::types::Selection;

/// Error reported by a host capability.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct PlatformError(pub String);

impl From<&str> for PlatformError {
    fn from(s: &str) -> Self {
        PlatformError(s.to_string())
    }
}

impl From<String> for PlatformError {
    fn from(s: String) -> Self {
        PlatformError(s)
    }
}

/// Reports the selection in the authoritative buffer at the moment a
/// command is invoked.
pub trait SelectionProvider {
    /// Current selection in char offsets, or `None` when no editing surface
    /// is focused.
    fn selection(&self) -> Option<Selection>;
}

impl SelectionProvider for Selection {
    fn selection(&self) -> Option<Selection> {
        Some(*self)
    }
}

/// Uploads or selects an image and returns the markdown tag to insert.
pub trait ImagePicker {
    /// `Ok(None)` means the user cancelled.
    fn pick_image(&self) -> impl Future<Output = Result<Option<String>, PlatformError>> + Send;
}

/// Which input modes the host surface offers.
///
/// A plain textarea supports markdown input only; a rich surface edits HTML.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorCapabilities {
    pub supports_rich_input: bool,
    pub supports_markdown_input: bool,
}

impl Default for EditorCapabilities {
    fn default() -> Self {
        Self::all()
    }
}

impl EditorCapabilities {
    pub const fn all() -> Self {
        Self {
            supports_rich_input: true,
            supports_markdown_input: true,
        }
    }

    pub const fn markdown_only() -> Self {
        Self {
            supports_rich_input: false,
            supports_markdown_input: true,
        }
    }

    pub const fn rich_only() -> Self {
        Self {
            supports_rich_input: true,
            supports_markdown_input: false,
        }
    }

    pub fn supports(&self, mode: ContentMode) -> bool {
        match mode {
            ContentMode::Markdown => self.supports_markdown_input,
            ContentMode::Html => self.supports_rich_input,
        }
    }
}

/// Build a markdown image tag.
pub fn image_markdown(alt: &str, url: &str) -> String {
    let alt = alt.replace(['[', ']'], "");
    format!("![{alt}]({url})")
}
