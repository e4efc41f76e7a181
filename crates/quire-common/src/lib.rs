//! quire-common: types shared by every quire crate.
//!
//! - `DocumentRecord` / `DocumentPatch` - what the record store persists
//! - `RecordStore` - the external persistence collaborator, plus `MemoryStore`
//! - `EditorConfig` - tunables loaded from TOML
//! - `telemetry` - tracing subscriber setup (feature `telemetry`)

pub mod config;
pub mod error;
pub mod record;
pub mod store;
#[cfg(feature = "telemetry")]
pub mod telemetry;

pub use config::EditorConfig;
pub use error::{ConfigError, StoreError};
pub use record::{ContentMode, DocumentId, DocumentKind, DocumentPatch, DocumentRecord, PublishStatus};
pub use store::{MemoryStore, RecordStore};
