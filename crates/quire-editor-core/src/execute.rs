//! The formatting-command engine.
//!
//! Pure: a buffer, a selection and a command go in; a new buffer and caret
//! come out. Nothing here touches a rendering surface or the history.

use crate::actions::FormatCommand;
use crate::text_helpers::{char_len, replace_chars, slice_chars};
use crate::types::{CommandOutcome, Selection};

/// Apply `command` to `buffer` at `selection`.
///
/// A non-empty selection is wrapped; an empty one gets `placeholder` (or the
/// command's default word) so the command always inserts something.
/// Rule, table and image insert at `selection.start` and keep the selected
/// text.
///
/// The caret lands at `selection.start + chars(inserted)`.
pub fn apply_command(
    buffer: &str,
    selection: Selection,
    command: &FormatCommand,
    placeholder: Option<&str>,
) -> CommandOutcome {
    let selection = selection.clamp(char_len(buffer));

    let (inserted, replace_end) = if command.ignores_selection() {
        (command.wrap(""), selection.start)
    } else {
        let selected = slice_chars(buffer, selection.start, selection.end);
        let text = if selected.is_empty() {
            placeholder.unwrap_or(command.placeholder())
        } else {
            selected
        };
        (command.wrap(text), selection.end)
    };

    let buffer = replace_chars(buffer, selection.start, replace_end, &inserted);
    let caret = selection.start + char_len(&inserted);
    tracing::trace!(command = %command, caret, "applied formatting command");

    CommandOutcome {
        buffer,
        caret,
        inserted,
    }
}
