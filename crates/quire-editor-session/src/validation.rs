//! Required-field checks run before anything is persisted.

use std::fmt;

use miette::Diagnostic;
use quire_common::DocumentKind;

use crate::session::Metadata;

/// The user action being validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Save,
    Publish,
    Send,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::Save => "save",
            Action::Publish => "publish",
            Action::Send => "send",
        })
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
#[error("cannot {action}: missing {}", .missing.join(", "))]
#[diagnostic(
    code(quire::session::validation),
    help("fill in the missing fields and try again")
)]
pub struct ValidationError {
    pub action: Action,
    pub missing: Vec<&'static str>,
}

fn blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

/// Check the fields `action` needs.
///
/// Every action needs a title. Publishing an article also needs content and
/// a category; sending a newsletter also needs a subject and content.
pub fn validate(
    action: Action,
    kind: DocumentKind,
    metadata: &Metadata,
    has_content: bool,
) -> Result<(), ValidationError> {
    let mut missing = Vec::new();

    if metadata.title.trim().is_empty() {
        missing.push("title");
    }
    match action {
        Action::Publish => {
            if !has_content {
                missing.push("content");
            }
            if blank(metadata.category.as_deref()) {
                missing.push("category");
            }
        }
        Action::Send => {
            if blank(metadata.subject.as_deref()) {
                missing.push("subject");
            }
            if !has_content {
                missing.push("content");
            }
        }
        Action::Save => {}
    }

    if missing.is_empty() {
        Ok(())
    } else {
        tracing::debug!(%action, ?kind, ?missing, "validation failed");
        Err(ValidationError { action, missing })
    }
}
