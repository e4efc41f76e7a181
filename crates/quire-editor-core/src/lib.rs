//! quire-editor-core: editing logic with no UI or storage dependencies.
//!
//! This crate provides:
//! - `apply_command` - the formatting-command engine over a flat buffer
//! - `EditHistory<T>` - bounded linear undo/redo over snapshots
//! - `Document` - markdown/HTML pair with an explicit authoritative side
//! - `SelectionProvider` / `ImagePicker` - capabilities the host UI supplies

pub mod actions;
pub mod document;
pub mod execute;
pub mod history;
pub mod platform;
pub mod text_helpers;
pub mod types;

pub use actions::{FormatCommand, UnknownCommand};
pub use document::Document;
pub use execute::apply_command;
pub use history::{DEFAULT_HISTORY_CAP, EditHistory};
pub use platform::{
    EditorCapabilities, ImagePicker, PlatformError, SelectionProvider, image_markdown,
};
pub use quire_common::ContentMode;
pub use types::{CommandOutcome, Selection};
