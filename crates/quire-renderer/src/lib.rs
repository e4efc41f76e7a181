//! quire-renderer: turning stored content into HTML that is safe to show.
//!
//! - [`markdown::to_html`] - ordered pattern-substitution converter
//! - [`sanitize`] / [`SanitizerPolicy`] - allow-list HTML sanitizer
//! - [`template`] - `{{placeholder}}` substitution
//! - [`email`] - email shell and the send-time composition step
//!
//! Nothing here sanitizes implicitly except [`RenderedArtifact`], which can
//! only be built from sanitized output.

pub mod email;
pub mod markdown;
pub mod sanitize;
pub mod template;
mod types;
mod utils;

pub use email::{RenderedEmail, compose_email, default_shell};
pub use markdown::to_html;
pub use sanitize::{SanitizerPolicy, sanitize};
pub use template::{TemplateDocument, TemplateValues, render, render_str, render_subject};
pub use types::RenderedArtifact;
pub use utils::escape_html;
