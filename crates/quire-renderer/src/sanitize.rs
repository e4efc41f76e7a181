//! Allow-list HTML sanitizer.
//!
//! Runs on every HTML string before it reaches a live preview or an outgoing
//! email. Tags outside the allow-list are dropped but their text is kept;
//! script-like containers are dropped together with their content. Event
//! handler attributes and unsafe URL schemes never survive.
//!
//! The scanner is a single forward pass over the input and never fails: input
//! it cannot make sense of is escaped as text.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

use crate::utils::{decode_entities, escape_html};

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([^\s"'>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+)))?"#)
        .expect("attribute pattern must compile")
});

static DEFAULT_POLICY: LazyLock<SanitizerPolicy> = LazyLock::new(SanitizerPolicy::default);

/// Structural and formatting tags kept by default.
const ALLOWED_TAGS: &[&str] = &[
    "h1", "h2", "h3", "h4", "h5", "h6", "p", "br", "hr", "strong", "b", "em", "i", "u", "s",
    "del", "ins", "mark", "small", "sub", "sup", "ul", "ol", "li", "a", "img", "blockquote",
    "code", "pre", "table", "thead", "tbody", "tfoot", "tr", "th", "td", "caption", "div", "span",
    "center", "font",
];

/// Tags whose content is removed along with the tag.
const DROP_CONTENT_TAGS: &[&str] = &[
    "script", "style", "iframe", "object", "embed", "noscript", "template", "textarea", "select",
    "title", "head", "svg", "math", "frameset", "applet",
];

const VOID_TAGS: &[&str] = &["br", "hr", "img", "embed"];

/// Attributes allowed on any kept tag.
const GLOBAL_ATTRS: &[&str] = &["title", "class", "style", "align", "dir", "lang", "id"];

const TAG_ATTRS: &[(&str, &[&str])] = &[
    ("a", &["href", "target", "rel", "name"]),
    ("img", &["src", "alt", "width", "height", "border"]),
    ("ol", &["start", "type"]),
    ("table", &["width", "border", "cellpadding", "cellspacing", "bgcolor", "role"]),
    ("td", &["colspan", "rowspan", "width", "height", "valign", "bgcolor"]),
    ("th", &["colspan", "rowspan", "width", "height", "valign", "bgcolor", "scope"]),
    ("tr", &["valign", "bgcolor"]),
    ("font", &["color", "face", "size"]),
    ("iframe", &["src", "width", "height", "allowfullscreen", "frameborder"]),
    ("object", &["data", "type", "width", "height"]),
    ("embed", &["src", "type", "width", "height"]),
];

const URL_ATTRS: &[&str] = &["href", "src", "data"];

/// Forced on links that open a new browsing context.
const TARGET_REL: &str = "noopener noreferrer";

const SAFE_SCHEMES: &[&str] = &["http", "https", "mailto", "tel", "cid"];

const SAFE_DATA_IMAGES: &[&str] = &[
    "data:image/png",
    "data:image/gif",
    "data:image/jpeg",
    "data:image/webp",
];

const STYLE_DENYLIST: &[&str] = &["expression(", "javascript:", "vbscript:", "url(", "@import", "behavior:", "-moz-binding"];

/// What the sanitizer keeps.
#[derive(Clone, Debug)]
pub struct SanitizerPolicy {
    allowed_tags: HashSet<String>,
    drop_content: HashSet<String>,
    tag_attrs: HashMap<String, HashSet<String>>,
}

impl Default for SanitizerPolicy {
    fn default() -> Self {
        Self {
            allowed_tags: ALLOWED_TAGS.iter().map(|t| t.to_string()).collect(),
            drop_content: DROP_CONTENT_TAGS.iter().map(|t| t.to_string()).collect(),
            tag_attrs: TAG_ATTRS
                .iter()
                .map(|(tag, attrs)| {
                    (tag.to_string(), attrs.iter().map(|a| a.to_string()).collect())
                })
                .collect(),
        }
    }
}

impl SanitizerPolicy {
    /// Allow-list an extra tag, e.g. `iframe` for embedded video.
    ///
    /// `script` and `style` can never be allowed; asking for them is ignored.
    pub fn allow_tag(mut self, tag: &str) -> Self {
        let tag = tag.to_ascii_lowercase();
        if matches!(tag.as_str(), "script" | "style") {
            tracing::warn!(%tag, "refusing to allow-list executable tag");
            return self;
        }
        self.drop_content.remove(&tag);
        self.allowed_tags.insert(tag);
        self
    }

    /// Policy with each of `tags` allow-listed.
    pub fn with_allowed<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        tags.into_iter()
            .fold(Self::default(), |policy, tag| policy.allow_tag(tag.as_ref()))
    }

    pub fn is_allowed(&self, tag: &str) -> bool {
        self.allowed_tags.contains(tag)
    }

    /// Sanitize `html` under this policy.
    pub fn sanitize(&self, html: &str) -> String {
        let bytes = html.as_bytes();
        let mut out = String::with_capacity(html.len());
        let mut i = 0;
        let mut text_start = 0;

        while i < bytes.len() {
            if bytes[i] != b'<' {
                i += 1;
                continue;
            }
            out.push_str(&html[text_start..i]);

            let rest = &html[i..];
            if rest.starts_with("<!--") {
                i = rest[4..].find("-->").map_or(html.len(), |end| i + 4 + end + 3);
            } else if rest.starts_with("<!") || rest.starts_with("<?") {
                // Doctype, CDATA, processing instructions.
                i = rest.find('>').map_or(html.len(), |end| i + end + 1);
            } else if let Some(tag) = parse_tag(html, i) {
                i = self.emit_tag(html, &tag, &mut out);
            } else {
                out.push_str("&lt;");
                i += 1;
            }
            text_start = i;
        }
        out.push_str(&html[text_start.min(html.len())..]);

        out
    }

    /// Write the sanitized form of `tag`, returning where scanning resumes.
    fn emit_tag(&self, html: &str, tag: &RawTag<'_>, out: &mut String) -> usize {
        let name = tag.name.as_str();

        if self.drop_content.contains(name) {
            if tag.closing || tag.self_closing || VOID_TAGS.contains(&name) {
                return tag.end;
            }
            tracing::debug!(tag = name, "dropping element and its content");
            return skip_past_closing(html, tag.end, name);
        }

        if !self.allowed_tags.contains(name) {
            return tag.end;
        }

        if tag.closing {
            if !VOID_TAGS.contains(&name) {
                out.push_str("</");
                out.push_str(name);
                out.push('>');
            }
            return tag.end;
        }

        out.push('<');
        out.push_str(name);
        for (attr, value) in self.filter_attributes(name, tag.attrs) {
            out.push(' ');
            out.push_str(&attr);
            if let Some(value) = value {
                out.push_str("=\"");
                out.push_str(&escape_html(&value));
                out.push('"');
            }
        }
        out.push('>');
        if tag.self_closing && !VOID_TAGS.contains(&name) {
            out.push_str("</");
            out.push_str(name);
            out.push('>');
        }
        tag.end
    }

    fn filter_attributes(&self, tag: &str, attrs: &str) -> Vec<(String, Option<String>)> {
        let mut kept: Vec<(String, Option<String>)> = Vec::new();
        for caps in ATTRIBUTE.captures_iter(attrs) {
            let attr = caps[1].to_ascii_lowercase();
            let raw = caps.get(2).or(caps.get(3)).or(caps.get(4)).map(|m| m.as_str());

            if attr.starts_with("on") || !self.attr_allowed(tag, &attr) {
                continue;
            }
            if kept.iter().any(|(seen, _)| *seen == attr) {
                continue;
            }

            let value = raw.map(decode_entities);
            if let Some(value) = value.as_deref() {
                if URL_ATTRS.contains(&attr.as_str()) && !is_safe_url(tag, value) {
                    tracing::debug!(tag, attr = %attr, "dropping unsafe url");
                    continue;
                }
                if attr == "style" && !is_safe_style(value) {
                    continue;
                }
            }
            kept.push((attr, value));
        }
        if tag == "a" && kept.iter().any(|(attr, _)| attr == "target") {
            kept.retain(|(attr, _)| attr != "rel");
            kept.push(("rel".to_string(), Some(TARGET_REL.to_string())));
        }
        kept
    }

    fn attr_allowed(&self, tag: &str, attr: &str) -> bool {
        GLOBAL_ATTRS.contains(&attr)
            || self
                .tag_attrs
                .get(tag)
                .is_some_and(|attrs| attrs.contains(attr))
    }
}

/// Sanitize with the default policy.
pub fn sanitize(html: &str) -> String {
    DEFAULT_POLICY.sanitize(html)
}

struct RawTag<'a> {
    name: String,
    closing: bool,
    self_closing: bool,
    attrs: &'a str,
    /// Byte offset just past the closing `>`.
    end: usize,
}

/// Parse the tag starting at `start` (which holds `<`).
///
/// Returns `None` when the `<` does not open a well-formed tag, in which case
/// the caller treats it as text.
fn parse_tag(html: &str, start: usize) -> Option<RawTag<'_>> {
    let bytes = html.as_bytes();
    let mut pos = start + 1;
    let closing = bytes.get(pos) == Some(&b'/');
    if closing {
        pos += 1;
    }
    if !bytes.get(pos).is_some_and(u8::is_ascii_alphabetic) {
        return None;
    }

    let name_start = pos;
    while bytes
        .get(pos)
        .is_some_and(|b| b.is_ascii_alphanumeric() || *b == b'-' || *b == b':')
    {
        pos += 1;
    }
    let name = html[name_start..pos].to_ascii_lowercase();
    let attrs_start = pos;

    let mut quote: Option<u8> = None;
    while pos < bytes.len() {
        let b = bytes[pos];
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'"' || b == b'\'' => quote = Some(b),
            None if b == b'>' => break,
            None => {}
        }
        pos += 1;
    }
    if pos >= bytes.len() {
        return None;
    }

    let inner = html[attrs_start..pos].trim_end();
    let self_closing = inner.ends_with('/');
    let attrs = inner.strip_suffix('/').unwrap_or(inner);

    Some(RawTag {
        name,
        closing,
        self_closing,
        attrs,
        end: pos + 1,
    })
}

/// Skip to just past `</name ...>`, or to the end of input if it never closes.
fn skip_past_closing(html: &str, from: usize, name: &str) -> usize {
    let needle = format!("</{name}");
    let haystack = html[from..].to_ascii_lowercase();
    let mut search = 0;
    while let Some(found) = haystack[search..].find(&needle) {
        let at = search + found;
        let after = at + needle.len();
        let boundary = haystack[after..]
            .chars()
            .next()
            .is_none_or(|c| c == '>' || c.is_ascii_whitespace() || c == '/');
        if boundary {
            return match haystack[after..].find('>') {
                Some(close) => from + after + close + 1,
                None => html.len(),
            };
        }
        search = after;
    }
    html.len()
}

/// Whether `url` may appear in a `href`/`src` on `tag`.
///
/// Relative URLs are fine. Absolute ones must use a known-safe scheme;
/// images may also use raster `data:` URLs.
fn is_safe_url(tag: &str, url: &str) -> bool {
    // Browsers ignore whitespace and control characters inside the scheme.
    let normalized: String = url
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();

    let Some(colon) = normalized.find(':') else {
        return true;
    };
    let scheme = &normalized[..colon];
    if scheme.contains(['/', '?', '#']) {
        return true;
    }
    if SAFE_SCHEMES.contains(&scheme) {
        return true;
    }
    tag == "img" && SAFE_DATA_IMAGES.iter().any(|prefix| normalized.starts_with(prefix))
}

fn is_safe_style(style: &str) -> bool {
    let normalized: String = style
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();
    !normalized.contains('\\') && !STYLE_DENYLIST.iter().any(|bad| normalized.contains(bad))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_removed_paragraph_kept() {
        let out = sanitize("<script>alert(1)</script><p>ok</p>");
        assert!(out.contains("<p>ok</p>"));
        assert!(!out.contains("<script"));
        assert!(!out.contains("alert"));
    }

    #[test]
    fn test_script_case_and_spacing() {
        let out = sanitize("<SCRIPT type=\"text/javascript\">x()</SCRIPT >after");
        assert_eq!(out, "after");
    }

    #[test]
    fn test_unclosed_script_drops_rest() {
        assert_eq!(sanitize("before<script>never closed"), "before");
    }

    #[test]
    fn test_event_handlers_stripped() {
        let out = sanitize(r#"<img src="/a.png" onerror="alert(1)" alt="A"><p onclick='x()'>t</p>"#);
        assert_eq!(out, r#"<img src="/a.png" alt="A"><p>t</p>"#);
    }

    #[test]
    fn test_unquoted_handler() {
        let out = sanitize("<img src=x onerror=alert(1)>");
        assert_eq!(out, r#"<img src="x">"#);
    }

    #[test]
    fn test_javascript_urls_dropped() {
        assert_eq!(sanitize(r#"<a href="javascript:alert(1)">x</a>"#), "<a>x</a>");
        assert_eq!(sanitize(r#"<a href=" JaVaScRiPt:alert(1)">x</a>"#), "<a>x</a>");
        assert_eq!(sanitize(r#"<a href="java&#x09;script:alert(1)">x</a>"#), "<a>x</a>");
        assert_eq!(sanitize(r#"<a href="javascript&colon;alert(1)">x</a>"#), "<a>x</a>");
        assert_eq!(sanitize(r#"<img src="vbscript:msgbox">"#), "<img>");
    }

    #[test]
    fn test_safe_urls_kept() {
        assert_eq!(
            sanitize(r#"<a href="https://example.com/?a=1&amp;b=2">x</a>"#),
            r#"<a href="https://example.com/?a=1&amp;b=2">x</a>"#
        );
        assert_eq!(sanitize(r#"<a href="/relative:path">x</a>"#), r#"<a href="/relative:path">x</a>"#);
        assert_eq!(sanitize(r#"<a href="mailto:hi@example.com">x</a>"#), r#"<a href="mailto:hi@example.com">x</a>"#);
    }

    #[test]
    fn test_target_forces_rel() {
        assert_eq!(
            sanitize(r#"<a href="/x" target="_blank">x</a>"#),
            r#"<a href="/x" target="_blank" rel="noopener noreferrer">x</a>"#
        );
        assert_eq!(
            sanitize(r#"<a rel="opener" target="_blank" href="/x">x</a>"#),
            r#"<a target="_blank" href="/x" rel="noopener noreferrer">x</a>"#
        );
        assert_eq!(sanitize(r#"<a href="/x" rel="nofollow">x</a>"#), r#"<a href="/x" rel="nofollow">x</a>"#);
    }

    #[test]
    fn test_data_urls_only_for_images() {
        assert_eq!(
            sanitize(r#"<img src="data:image/png;base64,AAAA">"#),
            r#"<img src="data:image/png;base64,AAAA">"#
        );
        assert_eq!(sanitize(r#"<img src="data:image/svg+xml,<svg>">"#), "<img>");
        assert_eq!(sanitize(r#"<a href="data:text/html,hi">x</a>"#), "<a>x</a>");
    }

    #[test]
    fn test_embeds_removed_by_default() {
        let html = r#"<p>a</p><iframe src="https://video.example/1">fallback</iframe><object data="x"></object><embed src="y">"#;
        assert_eq!(sanitize(html), "<p>a</p>");
    }

    #[test]
    fn test_embeds_allow_listed() {
        let policy = SanitizerPolicy::default().allow_tag("iframe");
        let out = policy.sanitize(r#"<iframe src="https://video.example/1" onload="x()"></iframe>"#);
        assert_eq!(out, r#"<iframe src="https://video.example/1"></iframe>"#);

        let out = policy.sanitize(r#"<iframe src="javascript:alert(1)"></iframe>"#);
        assert_eq!(out, "<iframe></iframe>");
    }

    #[test]
    fn test_script_cannot_be_allowed() {
        let policy = SanitizerPolicy::with_allowed(["script", "embed"]);
        assert!(!policy.is_allowed("script"));
        assert!(policy.is_allowed("embed"));
        assert_eq!(policy.sanitize("<script>x</script>"), "");
    }

    #[test]
    fn test_unknown_tags_keep_text() {
        assert_eq!(
            sanitize("<html><body><article>Hello <blink>world</blink></article></body></html>"),
            "Hello world"
        );
    }

    #[test]
    fn test_allowed_structure_survives() {
        let html = "<h2>T</h2><ul><li><strong>a</strong></li></ul><blockquote>q</blockquote><pre><code>c</code></pre><table><tr><td colspan=\"2\">x</td></tr></table><hr><br/>";
        assert_eq!(
            sanitize(html),
            "<h2>T</h2><ul><li><strong>a</strong></li></ul><blockquote>q</blockquote><pre><code>c</code></pre><table><tr><td colspan=\"2\">x</td></tr></table><hr><br>"
        );
    }

    #[test]
    fn test_unsafe_style_dropped() {
        assert_eq!(
            sanitize(r#"<div style="color: red">x</div>"#),
            r#"<div style="color: red">x</div>"#
        );
        assert_eq!(
            sanitize(r#"<div style="background: url(javascript:x)">x</div>"#),
            "<div>x</div>"
        );
        assert_eq!(sanitize(r#"<div style="width: expression(alert(1))">x</div>"#), "<div>x</div>");
    }

    #[test]
    fn test_comments_and_doctype_removed() {
        assert_eq!(sanitize("<!DOCTYPE html><!-- <script>x</script> --><p>k</p>"), "<p>k</p>");
        assert_eq!(sanitize("a<!-- never closed"), "a");
    }

    #[test]
    fn test_stray_angle_brackets_escaped() {
        assert_eq!(sanitize("1 < 2 and <3"), "1 &lt; 2 and &lt;3");
        assert_eq!(sanitize("<p title=\"unterminated>oops"), "&lt;p title=\"unterminated>oops");
    }

    #[test]
    fn test_nested_script_trick() {
        // Only inert text is left over.
        assert_eq!(sanitize("<scr<script>ipt>alert(1)</script>"), "ipt>alert(1)");
    }

    #[test]
    fn test_head_content_dropped() {
        assert_eq!(
            sanitize("<html><head><title>T</title><style>p{}</style></head><body><p>b</p></body></html>"),
            "<p>b</p>"
        );
    }

    #[test]
    fn test_multibyte_text() {
        assert_eq!(sanitize("<p>héllo 🌍</p><x>ü</x>"), "<p>héllo 🌍</p>ü");
    }

    #[test]
    fn test_duplicate_attributes_first_wins() {
        assert_eq!(
            sanitize(r#"<a href="/ok" href="javascript:x">t</a>"#),
            r#"<a href="/ok">t</a>"#
        );
    }
}
