//! Markdown to HTML conversion.
//!
//! A deliberately small, line/pattern based converter. Rules run in a fixed
//! order and each later rule sees the output of the earlier ones:
//!
//! 1. fenced code blocks and inline code spans are lifted out so no other
//!    rule touches them, and the remaining text is escaped
//! 2. headings, longest prefix first (`###`, `##`, `#`)
//! 3. horizontal rules
//! 4. bold, italic
//! 5. images, links, tables
//! 6. blockquote, unordered and ordered list lines
//! 7. paragraph and line-break normalization
//!
//! Every rule applies to all occurrences. Syntax no rule recognizes passes
//! through untouched, as text: a `<` the author typed never opens a tag. The conversion is one-way and not idempotent: feeding
//! HTML back in is undefined, so callers track which representation is
//! authoritative instead.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::utils::{escape_html, escape_text};

/// Marks a lifted code block. U+0001 is stripped from input up front, so the
/// marker cannot collide with author text.
const CODE_MARK: char = '\u{1}';
/// Marks a lifted inline code span. Stripped up front like [`CODE_MARK`].
const SPAN_MARK: char = '\u{2}';

macro_rules! rule {
    ($name:ident, $pattern:expr) => {
        static $name: LazyLock<Regex> =
            LazyLock::new(|| Regex::new($pattern).expect("markdown rule must compile"));
    };
}

rule!(FENCE, r"(?ms)^```([^\n`]*)\n(.*?)^```[ \t]*$");
rule!(H3, r"(?m)^### (.*)$");
rule!(H2, r"(?m)^## (.*)$");
rule!(H1, r"(?m)^# (.*)$");
rule!(RULE, r"(?m)^(?:---|\*\*\*|___)[ \t]*$");
rule!(BOLD, r"\*\*(.+?)\*\*");
rule!(ITALIC, r"\*([^*\s][^*\n]*?)\*");
rule!(INLINE_CODE, r"`([^`\n]+)`");
rule!(IMAGE, r"!\[([^\]\n]*)\]\(([^)\s]+)\)");
rule!(LINK, r"\[([^\]\n]+)\]\(([^)\s]+)\)");
rule!(QUOTE, r"(?m)^> ?(.*)$");
rule!(UL_ITEM, r"^- (.*)$");
rule!(OL_ITEM, r"^\d+\. (.*)$");
rule!(TABLE_SEPARATOR, r"^\|?\s*:?-+:?\s*(?:\|\s*:?-+:?\s*)*\|?\s*$");

/// Convert markdown to HTML.
pub fn to_html(markdown: &str) -> String {
    let text = markdown
        .replace("\r\n", "\n")
        .replace([CODE_MARK, SPAN_MARK], "");

    let mut code_blocks = Vec::new();
    let text = FENCE.replace_all(&text, |caps: &Captures| {
        let lang = caps[1].trim();
        let body = caps[2].strip_suffix('\n').unwrap_or(&caps[2]);
        let class = if lang.is_empty() {
            String::new()
        } else {
            format!(" class=\"language-{}\"", escape_html(lang))
        };
        code_blocks.push(format!("<pre><code{class}>{}</code></pre>", escape_html(body)));
        format!("{CODE_MARK}{}{CODE_MARK}", code_blocks.len() - 1)
    });

    let mut code_spans = Vec::new();
    let text = INLINE_CODE.replace_all(&text, |caps: &Captures| {
        code_spans.push(format!("<code>{}</code>", escape_html(&caps[1])));
        format!("{SPAN_MARK}{}{SPAN_MARK}", code_spans.len() - 1)
    });
    let text = escape_text(&text);

    let text = H3.replace_all(&text, "<h3>$1</h3>");
    let text = H2.replace_all(&text, "<h2>$1</h2>");
    let text = H1.replace_all(&text, "<h1>$1</h1>");
    let text = RULE.replace_all(&text, "<hr>");
    let text = BOLD.replace_all(&text, "<strong>$1</strong>");
    let text = ITALIC.replace_all(&text, "<em>$1</em>");
    let text = IMAGE.replace_all(&text, r#"<img src="$2" alt="$1">"#);
    let text = LINK.replace_all(&text, r#"<a href="$2">$1</a>"#);
    let text = convert_tables(&text);
    let text = QUOTE.replace_all(&text, "<blockquote>$1</blockquote>");
    let text = wrap_list(&text, &UL_ITEM, "ul");
    let text = wrap_list(&text, &OL_ITEM, "ol");
    let mut html = paragraphs(&text);

    for (i, span) in code_spans.iter().enumerate() {
        html = html.replace(&format!("{SPAN_MARK}{i}{SPAN_MARK}"), span);
    }
    for (i, block) in code_blocks.iter().enumerate() {
        html = html.replace(&format!("{CODE_MARK}{i}{CODE_MARK}"), block);
    }

    tracing::trace!(input_len = markdown.len(), output_len = html.len(), "converted markdown");
    html
}

/// Turn runs of lines matching `item` into one `<tag>` list.
fn wrap_list(text: &str, item: &Regex, tag: &str) -> String {
    let mut out = Vec::new();
    let mut in_list = false;

    for line in text.split('\n') {
        match item.captures(line) {
            Some(caps) => {
                if !in_list {
                    out.push(format!("<{tag}>"));
                    in_list = true;
                }
                out.push(format!("<li>{}</li>", &caps[1]));
            }
            None => {
                if in_list {
                    out.push(format!("</{tag}>"));
                    in_list = false;
                }
                out.push(line.to_string());
            }
        }
    }
    if in_list {
        out.push(format!("</{tag}>"));
    }

    out.join("\n")
}

/// Convert pipe tables (header row, separator row, body rows).
fn convert_tables(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut out = Vec::with_capacity(lines.len());
    let mut i = 0;

    while i < lines.len() {
        let is_table = lines[i].trim_start().starts_with('|')
            && lines.get(i + 1).is_some_and(|next| TABLE_SEPARATOR.is_match(next.trim()));
        if !is_table {
            out.push(lines[i].to_string());
            i += 1;
            continue;
        }

        out.push("<table>".to_string());
        out.push(format!("<thead><tr>{}</tr></thead>", table_cells(lines[i], "th")));
        i += 2;
        out.push("<tbody>".to_string());
        while i < lines.len() && lines[i].trim_start().starts_with('|') {
            out.push(format!("<tr>{}</tr>", table_cells(lines[i], "td")));
            i += 1;
        }
        out.push("</tbody>".to_string());
        out.push("</table>".to_string());
    }

    out.join("\n")
}

fn table_cells(row: &str, tag: &str) -> String {
    let row = row.trim();
    let row = row.strip_prefix('|').unwrap_or(row);
    let row = row.strip_suffix('|').unwrap_or(row);
    row.split('|')
        .map(|cell| format!("<{tag}>{}</{tag}>", cell.trim()))
        .collect()
}

const BLOCK_PREFIXES: &[&str] = &[
    "<h1", "<h2", "<h3", "<h4", "<h5", "<h6", "<hr", "<ul", "</ul", "<ol", "</ol", "<li",
    "<blockquote", "<pre", "<table", "</table", "<thead", "<tbody", "</tbody", "<tr", "<div",
    "</div", "<p>", "<p ",
];

fn is_block_line(line: &str) -> bool {
    let line = line.trim_start();
    line.starts_with(CODE_MARK) || BLOCK_PREFIXES.iter().any(|prefix| line.starts_with(prefix))
}

/// Blank lines separate paragraphs; single newlines inside one become `<br>`.
/// Lines already holding block-level markup stand on their own.
fn paragraphs(text: &str) -> String {
    let mut blocks: Vec<String> = Vec::new();
    let mut para: Vec<&str> = Vec::new();

    fn flush(para: &mut Vec<&str>, blocks: &mut Vec<String>) {
        if !para.is_empty() {
            blocks.push(format!("<p>{}</p>", para.join("<br>")));
            para.clear();
        }
    }

    for line in text.split('\n') {
        if line.trim().is_empty() {
            flush(&mut para, &mut blocks);
        } else if is_block_line(line) {
            flush(&mut para, &mut blocks);
            blocks.push(line.to_string());
        } else {
            para.push(line);
        }
    }
    flush(&mut para, &mut blocks);

    blocks.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_levels() {
        assert_eq!(to_html("## Title"), "<h2>Title</h2>");
        assert_eq!(to_html("# One"), "<h1>One</h1>");
        // The `##` rule must not eat the front of a `###` line.
        assert_eq!(to_html("### Deep"), "<h3>Deep</h3>");
    }

    #[test]
    fn test_bold_and_italic() {
        assert_eq!(to_html("**bold**"), "<p><strong>bold</strong></p>");
        assert_eq!(
            to_html("some *soft* and **loud** words"),
            "<p>some <em>soft</em> and <strong>loud</strong> words</p>"
        );
    }

    #[test]
    fn test_rules_apply_globally() {
        let html = to_html("**a** and **b**\n\n## x\n## y");
        assert_eq!(html.matches("<strong>").count(), 2);
        assert!(html.contains("<h2>x</h2>\n<h2>y</h2>"));
    }

    #[test]
    fn test_inline_code_link_image() {
        assert_eq!(to_html("run `cargo`"), "<p>run <code>cargo</code></p>");
        assert_eq!(
            to_html("[docs](https://example.com)"),
            r#"<p><a href="https://example.com">docs</a></p>"#
        );
        assert_eq!(
            to_html("![logo](/logo.png)"),
            r#"<p><img src="/logo.png" alt="logo"></p>"#
        );
    }

    #[test]
    fn test_lists_are_wrapped() {
        insta::assert_snapshot!(to_html("- one\n- two"), @r"
        <ul>
        <li>one</li>
        <li>two</li>
        </ul>
        ");
        insta::assert_snapshot!(to_html("1. first\n2. second"), @r"
        <ol>
        <li>first</li>
        <li>second</li>
        </ol>
        ");
    }

    #[test]
    fn test_quote() {
        assert_eq!(to_html("> wise words"), "<blockquote>wise words</blockquote>");
    }

    #[test]
    fn test_paragraphs_and_breaks() {
        assert_eq!(to_html("a\nb\n\nc"), "<p>a<br>b</p>\n<p>c</p>");
    }

    #[test]
    fn test_fenced_code_is_protected() {
        let html = to_html("```rust\nlet x = **1** < 2;\n```");
        assert_eq!(
            html,
            r#"<pre><code class="language-rust">let x = **1** &lt; 2;</code></pre>"#
        );
    }

    #[test]
    fn test_horizontal_rule() {
        assert_eq!(to_html("above\n\n---\n\nbelow"), "<p>above</p>\n<hr>\n<p>below</p>");
    }

    #[test]
    fn test_table() {
        insta::assert_snapshot!(
            to_html("| A | B |\n| --- | --- |\n| 1 | 2 |"),
            @r"
        <table>
        <thead><tr><th>A</th><th>B</th></tr></thead>
        <tbody>
        <tr><td>1</td><td>2</td></tr>
        </tbody>
        </table>
        "
        );
    }

    #[test]
    fn test_unknown_syntax_passes_through() {
        assert_eq!(to_html("~~strike~~ {{name}}"), "<p>~~strike~~ {{name}}</p>");
    }

    #[test]
    fn test_inline_code_is_escaped() {
        assert_eq!(
            to_html("Use `<script>` to load JS."),
            "<p>Use <code>&lt;script&gt;</code> to load JS.</p>"
        );
        assert_eq!(
            to_html("Wrap it in `<iframe>`"),
            "<p>Wrap it in <code>&lt;iframe&gt;</code></p>"
        );
        assert_eq!(to_html("Keep `a<b` small"), "<p>Keep <code>a&lt;b</code> small</p>");
        // Markers inside a span are literal.
        assert_eq!(to_html("`**x**`"), "<p><code>**x**</code></p>");
    }

    #[test]
    fn test_plain_text_angle_brackets_are_text() {
        assert_eq!(to_html("if a<b && c"), "<p>if a&lt;b &amp;&amp; c</p>");
        assert_eq!(to_html("<u>raw</u>"), "<p>&lt;u>raw&lt;/u></p>");
        assert_eq!(
            to_html("[q](/s?a=1&b=\"2\")"),
            r#"<p><a href="/s?a=1&amp;b=&quot;2&quot;">q</a></p>"#
        );
    }

    #[test]
    fn test_crlf_input() {
        assert_eq!(to_html("## T\r\nbody"), "<h2>T</h2>\n<p>body</p>");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(to_html(""), "");
    }
}
