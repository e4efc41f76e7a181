use miette::Diagnostic;
use quire_common::StoreError;
use quire_editor_core::PlatformError;

use crate::transport::TransportError;
use crate::validation::ValidationError;

/// Errors from session action handlers.
///
/// Whenever one of these is returned the in-memory document is exactly as
/// it was before the call.
#[derive(thiserror::Error, Debug, Diagnostic)]
#[non_exhaustive]
pub enum SessionError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    #[diagnostic(code(quire::session::transport))]
    Transport(#[from] TransportError),

    #[error("image picker failed: {0}")]
    #[diagnostic(code(quire::session::platform))]
    Platform(#[from] PlatformError),

    /// The operation does not apply in the session's current state.
    #[error("unsupported: {0}")]
    #[diagnostic(code(quire::session::unsupported))]
    Unsupported(String),

    #[error("session is closed")]
    #[diagnostic(code(quire::session::closed))]
    Closed,
}

impl SessionError {
    pub(crate) fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }
}
