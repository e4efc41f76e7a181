//! `{{placeholder}}` substitution.
//!
//! A key with no value is left in the output verbatim, braces and all, so a
//! missing merge field shows up in review instead of silently producing a
//! blank. Substitution is a single pass: values are never re-scanned for
//! placeholders. Output is not sanitized here.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z0-9_.\-]+)\s*\}\}").expect("placeholder pattern must compile")
});

/// Merge-field values keyed by placeholder name.
pub type TemplateValues = HashMap<String, String>;

/// A named starting point for a campaign.
///
/// Read-only once selected. Applying it to a document copies `html` and
/// `subject`; the document never refers back to the template.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateDocument {
    pub id: SmolStr,
    pub name: String,
    #[serde(default)]
    pub subject: String,
    pub html: String,
}

impl TemplateDocument {
    pub fn new(
        id: impl Into<SmolStr>,
        name: impl Into<String>,
        subject: impl Into<String>,
        html: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            subject: subject.into(),
            html: html.into(),
        }
    }

    /// Placeholder names used by the body and subject, in first-seen order.
    pub fn placeholders(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for source in [&self.subject, &self.html] {
            for caps in PLACEHOLDER.captures_iter(source) {
                if !names.iter().any(|n| n == &caps[1]) {
                    names.push(caps[1].to_string());
                }
            }
        }
        names
    }
}

/// Render the template body.
pub fn render(template: &TemplateDocument, values: &TemplateValues) -> String {
    render_str(&template.html, values)
}

/// Render the template subject line.
pub fn render_subject(template: &TemplateDocument, values: &TemplateValues) -> String {
    render_str(&template.subject, values)
}

/// Substitute placeholders in any string.
pub fn render_str(source: &str, values: &TemplateValues) -> String {
    PLACEHOLDER
        .replace_all(source, |caps: &Captures| match values.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}
