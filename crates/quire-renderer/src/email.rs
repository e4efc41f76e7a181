//! Send-time composition of newsletter emails.
//!
//! A newsletter body is wrapped in an email-safe shell: a table-based layout
//! with inline styles only, since mail clients drop `<style>` blocks and most
//! CSS layout. The composed HTML always goes through the sanitizer.

use crate::sanitize::SanitizerPolicy;
use crate::template::{TemplateDocument, TemplateValues, render_str};
use crate::types::RenderedArtifact;
use crate::utils::escape_html;

/// Placeholder the shell uses for the rendered body.
pub const CONTENT_KEY: &str = "content";
/// Placeholder the shell uses for the (escaped) subject line.
pub const SUBJECT_KEY: &str = "subject";

const DEFAULT_SHELL_HTML: &str = r##"<table role="presentation" width="100%" cellpadding="0" cellspacing="0" bgcolor="#f4f4f5">
<tr><td align="center" style="padding: 24px 12px;">
<div style="display: none; max-height: 0; overflow: hidden;">{{preheader}}</div>
<table role="presentation" width="600" cellpadding="0" cellspacing="0" bgcolor="#ffffff" style="max-width: 600px; border-radius: 6px;">
<tr><td style="padding: 32px; font-family: Helvetica, Arial, sans-serif; font-size: 16px; line-height: 1.5; color: #18181b;">
<h1 style="font-size: 24px; margin: 0 0 16px;">{{subject}}</h1>
{{content}}
</td></tr>
</table>
<p style="font-family: Helvetica, Arial, sans-serif; font-size: 12px; color: #71717a;"><a href="{{unsubscribe_url}}" style="color: #71717a;">Unsubscribe</a></p>
</td></tr>
</table>"##;

/// The built-in newsletter shell.
///
/// Placeholders: `subject`, `content`, `preheader`, `unsubscribe_url`.
pub fn default_shell() -> TemplateDocument {
    TemplateDocument::new("default-shell", "Default newsletter", "{{subject}}", DEFAULT_SHELL_HTML)
}

/// A fully rendered email, ready for a transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub html: RenderedArtifact,
}

/// Compose the outgoing email for a newsletter.
///
/// `body_html` is the newsletter's current HTML (already regenerated from
/// markdown if needed). Merge fields are substituted in the subject and body
/// first, the body is then placed into `shell`, and the whole result is
/// sanitized under `policy`.
pub fn compose_email(
    shell: &TemplateDocument,
    subject: &str,
    body_html: &str,
    values: &TemplateValues,
    policy: &SanitizerPolicy,
) -> RenderedEmail {
    let subject = render_str(subject, values);
    let body = render_str(body_html, values);

    let mut shell_values = values.clone();
    shell_values.insert(CONTENT_KEY.to_string(), body);
    shell_values.insert(SUBJECT_KEY.to_string(), escape_html(&subject));

    let html = render_str(&shell.html, &shell_values);
    tracing::debug!(shell = %shell.id, html_len = html.len(), "composed email");

    RenderedEmail {
        subject,
        html: RenderedArtifact::sanitized(&html, policy),
    }
}
