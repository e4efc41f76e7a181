//! Error types shared across quire crates.

use miette::Diagnostic;

use crate::record::DocumentId;

/// Failure reported by a [`RecordStore`](crate::RecordStore).
///
/// The editing core treats these as opaque: it reports them once and never
/// retries or branches on the specific variant.
#[derive(thiserror::Error, Debug, Clone, Diagnostic)]
#[non_exhaustive]
pub enum StoreError {
    /// The store could not be reached.
    #[error("store unavailable: {0}")]
    #[diagnostic(code(quire::store::network))]
    Network(String),

    /// The store rejected the record.
    #[error("store rejected record: {0}")]
    #[diagnostic(code(quire::store::rejected))]
    Rejected(String),

    /// No record with this id.
    #[error("document {0} not found")]
    #[diagnostic(code(quire::store::not_found))]
    NotFound(DocumentId),
}

/// Configuration loading errors.
#[derive(thiserror::Error, Debug, Diagnostic)]
#[non_exhaustive]
pub enum ConfigError {
    #[error(transparent)]
    #[diagnostic(code(quire::config::io))]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    #[diagnostic(code(quire::config::parse), help("check the TOML syntax and field names"))]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    #[diagnostic(code(quire::config::invalid))]
    Invalid(String),
}
