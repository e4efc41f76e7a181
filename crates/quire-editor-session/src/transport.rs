//! Outbound email delivery seam.

use std::future::Future;

use quire_renderer::RenderedArtifact;

/// A composed newsletter. The body has already been sanitized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub subject: String,
    pub html: RenderedArtifact,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("email transport failed: {0}")]
pub struct TransportError(pub String);

/// Hands a composed email to whatever actually delivers it.
pub trait EmailTransport: Send + Sync {
    fn send(&self, email: OutgoingEmail) -> impl Future<Output = Result<(), TransportError>> + Send;
}
