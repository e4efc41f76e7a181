//! Selection and command result types.

use std::ops::Range;

/// A selection in the authoritative buffer, in char offsets.
///
/// Always ordered: `start <= end`. A collapsed selection is a caret.
#[derive(Clone, Debug, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    /// Create a selection; the bounds may be given in either order.
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    pub fn caret(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.is_collapsed()
    }

    /// Clamp both ends to a buffer of `len` chars.
    pub fn clamp(self, len: usize) -> Self {
        Self {
            start: self.start.min(len),
            end: self.end.min(len),
        }
    }

    pub fn to_range(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl From<Range<usize>> for Selection {
    fn from(r: Range<usize>) -> Self {
        Self::new(r.start, r.end)
    }
}

/// Result of applying a formatting command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandOutcome {
    /// The full buffer after the command.
    pub buffer: String,
    /// Char offset just past the inserted text.
    pub caret: usize,
    /// The text the command put into the buffer.
    pub inserted: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_normalizes() {
        let sel = Selection::new(8, 3);
        assert_eq!(sel.start, 3);
        assert_eq!(sel.end, 8);
        assert_eq!(sel.len(), 5);
    }

    #[test]
    fn test_clamp() {
        assert_eq!(Selection::new(2, 40).clamp(10), Selection::new(2, 10));
        assert!(Selection::new(20, 40).clamp(10).is_collapsed());
    }
}
