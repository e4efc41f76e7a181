use std::fmt;

use crate::sanitize::SanitizerPolicy;

/// Sanitized HTML ready for a preview surface or an outgoing email.
///
/// Only constructible through sanitization, so holding one means the
/// sanitizer ran. Rebuild it after every content change; it is never
/// patched in place.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedArtifact(String);

impl RenderedArtifact {
    /// Sanitize `html` under `policy` and wrap the result.
    pub fn sanitized(html: &str, policy: &SanitizerPolicy) -> Self {
        Self(policy.sanitize(html))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for RenderedArtifact {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RenderedArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
