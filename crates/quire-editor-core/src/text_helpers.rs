//! Char-offset helpers for plain `&str` buffers.
//!
//! Editor offsets count Unicode scalar values (chars), not bytes; these
//! convert at the boundary where `str` slicing needs bytes.

/// Length of `text` in chars.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Byte index of the char at `char_offset`, or `text.len()` past the end.
pub fn char_to_byte(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map_or(text.len(), |(byte, _)| byte)
}

/// Replace the chars in `start..end` with `replacement`.
pub fn replace_chars(text: &str, start: usize, end: usize, replacement: &str) -> String {
    let start_byte = char_to_byte(text, start);
    let end_byte = char_to_byte(text, end);

    let mut out = String::with_capacity(text.len() - (end_byte - start_byte) + replacement.len());
    out.push_str(&text[..start_byte]);
    out.push_str(replacement);
    out.push_str(&text[end_byte..]);
    out
}

/// The chars in `start..end`.
pub fn slice_chars(text: &str, start: usize, end: usize) -> &str {
    &text[char_to_byte(text, start)..char_to_byte(text, end)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_conversion() {
        // "hello 🌍" - emoji is 4 bytes, 1 char
        let text = "hello 🌍!";
        assert_eq!(char_len(text), 8);
        assert_eq!(char_to_byte(text, 6), 6);
        assert_eq!(char_to_byte(text, 7), 10);
        assert_eq!(char_to_byte(text, 99), text.len());
    }

    #[test]
    fn test_replace_and_slice() {
        let text = "héllo world";
        assert_eq!(slice_chars(text, 0, 5), "héllo");
        assert_eq!(replace_chars(text, 6, 11, "rust"), "héllo rust");
        assert_eq!(replace_chars(text, 0, 0, ">"), ">héllo world");
    }
}
