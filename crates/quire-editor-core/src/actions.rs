//! Formatting commands.
//!
//! `FormatCommand` names a transform independently of how it was triggered
//! (toolbar button, shortcut, CLI). The markdown each command produces is
//! fixed; see [`FormatCommand::wrap`].

use std::fmt;
use std::str::FromStr;

/// Fixed table skeleton: three columns, one body row.
pub const TABLE_SKELETON: &str =
    "\n| Column 1 | Column 2 | Column 3 |\n| --- | --- | --- |\n| Cell | Cell | Cell |\n";

/// Horizontal rule, inserted literally.
pub const HORIZONTAL_RULE: &str = "\n\n---\n\n";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FormatCommand {
    Bold,
    Italic,
    /// Inline code.
    Code,
    Link,
    /// Level-2 heading.
    Heading,
    UnorderedList,
    OrderedList,
    Quote,
    /// Fenced code block.
    CodeBlock,
    HorizontalRule,
    Table,
    /// Insert a markdown image tag obtained from the image picker.
    Image { markdown: String },
}

impl FormatCommand {
    /// Word substituted when the selection is empty.
    pub fn placeholder(&self) -> &'static str {
        match self {
            Self::Bold => "bold text",
            Self::Italic => "italic text",
            Self::Code => "code",
            Self::Link => "link text",
            Self::Heading => "Heading",
            Self::UnorderedList | Self::OrderedList => "List item",
            Self::Quote => "Quote",
            Self::CodeBlock => "code",
            Self::HorizontalRule | Self::Table | Self::Image { .. } => "",
        }
    }

    /// Whether the command inserts fixed text at the caret and leaves the
    /// selection alone.
    pub fn ignores_selection(&self) -> bool {
        matches!(self, Self::HorizontalRule | Self::Table | Self::Image { .. })
    }

    /// The text this command puts in place of `text`.
    pub fn wrap(&self, text: &str) -> String {
        match self {
            Self::Bold => format!("**{text}**"),
            Self::Italic => format!("*{text}*"),
            Self::Code => format!("`{text}`"),
            Self::Link => format!("[{text}](url)"),
            Self::Heading => format!("\n## {text}"),
            Self::UnorderedList => format!("\n- {text}"),
            Self::OrderedList => format!("\n1. {text}"),
            Self::Quote => format!("\n> {text}"),
            Self::CodeBlock => format!("\n```\n{text}\n```\n"),
            Self::HorizontalRule => HORIZONTAL_RULE.to_string(),
            Self::Table => TABLE_SKELETON.to_string(),
            Self::Image { markdown } => markdown.clone(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Bold => "bold",
            Self::Italic => "italic",
            Self::Code => "code",
            Self::Link => "link",
            Self::Heading => "heading",
            Self::UnorderedList => "list",
            Self::OrderedList => "ordered-list",
            Self::Quote => "quote",
            Self::CodeBlock => "code-block",
            Self::HorizontalRule => "rule",
            Self::Table => "table",
            Self::Image { .. } => "image",
        }
    }
}

impl fmt::Display for FormatCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown formatting command `{0}`")]
pub struct UnknownCommand(pub String);

impl FromStr for FormatCommand {
    type Err = UnknownCommand;

    /// Parse a command name. `image` is not parseable: its markdown comes
    /// from the image picker.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "bold" => Self::Bold,
            "italic" => Self::Italic,
            "code" => Self::Code,
            "link" => Self::Link,
            "heading" | "h2" => Self::Heading,
            "list" | "unordered-list" => Self::UnorderedList,
            "ordered-list" | "numbered-list" => Self::OrderedList,
            "quote" => Self::Quote,
            "code-block" => Self::CodeBlock,
            "rule" | "hr" => Self::HorizontalRule,
            "table" => Self::Table,
            _ => return Err(UnknownCommand(s.to_string())),
        })
    }
}
