//! The markdown/HTML pair behind one editing session.
//!
//! A `Document` holds both representations but only one is ground truth at a
//! time, named by [`ContentMode`]. The other side is either empty or a
//! derived copy that may be out of date; it is regenerated before anything
//! trusts it. HTML is derived from markdown, never the reverse.

use std::borrow::Cow;

use quire_common::{ContentMode, DocumentPatch, DocumentRecord};
use quire_renderer::{RenderedArtifact, SanitizerPolicy, TemplateDocument, to_html};

use crate::actions::FormatCommand;
use crate::execute::apply_command;
use crate::types::{CommandOutcome, Selection};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    markdown_source: String,
    html_source: String,
    content_mode: ContentMode,
    /// The non-authoritative side no longer matches the authoritative one.
    stale: bool,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_markdown(markdown: impl Into<String>) -> Self {
        Self {
            markdown_source: markdown.into(),
            stale: true,
            ..Default::default()
        }
    }

    pub fn from_html(html: impl Into<String>) -> Self {
        Self {
            html_source: html.into(),
            content_mode: ContentMode::Html,
            stale: true,
            ..Default::default()
        }
    }

    /// Rebuild from a stored record. A stored derived side is never trusted.
    pub fn from_record(record: &DocumentRecord) -> Self {
        Self {
            markdown_source: record.markdown_source.clone(),
            html_source: record.html_source.clone(),
            content_mode: record.content_mode,
            stale: true,
        }
    }

    pub fn content_mode(&self) -> ContentMode {
        self.content_mode
    }

    pub fn markdown_source(&self) -> &str {
        &self.markdown_source
    }

    /// The HTML as currently held, possibly stale. Use [`Self::html`] to read
    /// it for display.
    pub fn html_source(&self) -> &str {
        &self.html_source
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// The buffer edits and commands apply to.
    pub fn authoritative(&self) -> &str {
        match self.content_mode {
            ContentMode::Markdown => &self.markdown_source,
            ContentMode::Html => &self.html_source,
        }
    }

    pub fn has_content(&self) -> bool {
        !self.authoritative().trim().is_empty()
    }

    /// Direct input into the markdown buffer. Markdown becomes authoritative.
    pub fn edit_markdown(&mut self, markdown: impl Into<String>) {
        self.markdown_source = markdown.into();
        self.content_mode = ContentMode::Markdown;
        self.stale = true;
    }

    /// Direct input into the HTML buffer. HTML becomes authoritative.
    pub fn edit_html(&mut self, html: impl Into<String>) {
        self.html_source = html.into();
        self.content_mode = ContentMode::Html;
        self.stale = true;
    }

    /// Replace the authoritative buffer, whichever it is.
    pub fn set_authoritative(&mut self, text: impl Into<String>) {
        match self.content_mode {
            ContentMode::Markdown => self.edit_markdown(text),
            ContentMode::Html => self.edit_html(text),
        }
    }

    /// Run a formatting command over the authoritative buffer.
    pub fn apply(
        &mut self,
        selection: Selection,
        command: &FormatCommand,
        placeholder: Option<&str>,
    ) -> CommandOutcome {
        let outcome = apply_command(self.authoritative(), selection, command, placeholder);
        self.set_authoritative(outcome.buffer.clone());
        outcome
    }

    /// HTML fit for display: regenerated from markdown when stale, as-is
    /// when HTML is authoritative.
    pub fn html(&mut self) -> &str {
        if self.content_mode == ContentMode::Markdown && self.stale {
            self.html_source = to_html(&self.markdown_source);
            self.stale = false;
            tracing::debug!(len = self.html_source.len(), "regenerated html from markdown");
        }
        &self.html_source
    }

    /// Like [`Self::html`] without caching the regenerated value.
    pub fn current_html(&self) -> Cow<'_, str> {
        if self.content_mode == ContentMode::Markdown && self.stale {
            Cow::Owned(to_html(&self.markdown_source))
        } else {
            Cow::Borrowed(&self.html_source)
        }
    }

    /// Sanitized HTML for a preview surface. Built fresh on every call.
    pub fn preview(&self, policy: &SanitizerPolicy) -> RenderedArtifact {
        RenderedArtifact::sanitized(&self.current_html(), policy)
    }

    /// Make `mode` authoritative. Returns `true` when divergent content on
    /// the side being dropped was discarded.
    ///
    /// Markdown to HTML regenerates the HTML and hands it over. HTML to
    /// markdown keeps the markdown and drops HTML edits that no longer match
    /// what the markdown renders to.
    pub fn switch_mode(&mut self, mode: ContentMode) -> bool {
        if mode == self.content_mode {
            return false;
        }

        let discarded = match mode {
            ContentMode::Html => {
                self.html();
                false
            }
            ContentMode::Markdown => {
                let regenerated = to_html(&self.markdown_source);
                let diverged = regenerated != self.html_source;
                if diverged {
                    tracing::debug!(
                        dropped_len = self.html_source.len(),
                        "discarding html edits on switch to markdown"
                    );
                }
                self.html_source = regenerated;
                diverged
            }
        };

        self.content_mode = mode;
        // Each side now matches the other; markdown never derives from html,
        // so a later html edit marks it stale again.
        self.stale = false;
        tracing::debug!(?mode, discarded, "switched content mode");
        discarded
    }

    /// Start over from a template. The document takes its own copy of the
    /// template HTML, which becomes authoritative; markdown is cleared.
    pub fn apply_template(&mut self, template: &TemplateDocument) {
        self.html_source = template.html.clone();
        self.markdown_source.clear();
        self.content_mode = ContentMode::Html;
        self.stale = false;
        tracing::debug!(template = %template.id, "applied template");
    }

    /// Content fields for the record store, with fresh derived HTML.
    pub fn to_patch(&self) -> DocumentPatch {
        DocumentPatch {
            markdown_source: Some(self.markdown_source.clone()),
            html_source: Some(self.current_html().into_owned()),
            content_mode: Some(self.content_mode),
            ..Default::default()
        }
    }
}
