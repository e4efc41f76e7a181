//! quire-editor-session: one author editing one document.
//!
//! Ties the editing core to the outside world:
//! - [`EditorSession`] - formatting, undo/redo, mode switches and the
//!   save/publish/send action handlers
//! - [`AutosaveCoordinator`] - debounced background persists
//! - [`Notifier`] and [`EmailTransport`] - injected collaborators
//!
//! Every async operation here needs a tokio runtime.

pub mod autosave;
pub mod error;
pub mod notify;
pub mod session;
pub mod transport;
pub mod validation;

pub use autosave::{AutosaveCoordinator, Debouncer};
pub use error::SessionError;
pub use notify::{Notice, NoticeLevel, Notifier, TracingNotifier};
pub use session::{EditorSession, Metadata, SessionContext};
pub use transport::{EmailTransport, OutgoingEmail, TransportError};
pub use validation::{Action, ValidationError, validate};
