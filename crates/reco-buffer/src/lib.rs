//! Cursor-centered text buffer (spec.md §4.1).
//!
//! Backed by a `ropey::Rope` rather than a `String` for the same reason
//! `core-text::Buffer` uses one: the recognizer re-derives a bounded window
//! around the cursor on every keystroke, and a rope makes that a cheap slice
//! regardless of document size. Every index on this type is a **char
//! offset**, never a byte offset — `Span`s produced by plugins slice the
//! rope via `char_to_byte` internally so callers never have to reason about
//! UTF-8 boundaries.

use ropey::Rope;

pub use reco_types::Window;

/// Holds the current text, cursor, and a monotonic revision counter
/// (spec.md §3 `Buffer`).
///
/// Lifecycle: created by the Recognizer, mutated only via [`Buffer::update`],
/// reset via [`Buffer::reset`].
#[derive(Debug, Clone)]
pub struct Buffer {
    rope: Rope,
    cursor: usize,
    revision: u64,
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Buffer {
    pub fn new() -> Self {
        Self {
            rope: Rope::new(),
            cursor: 0,
            revision: 0,
        }
    }

    /// Replaces the buffer text if it differs from the current text,
    /// incrementing `revision` and setting the cursor (defaulting to
    /// end-of-text). If only the cursor differs, updates the cursor alone
    /// and leaves `revision` untouched. Returns whether the text changed
    /// (spec.md §4.1).
    pub fn update(&mut self, text: &str, cursor: Option<usize>) -> bool {
        let char_len = self.rope.len_chars();
        let current_text_matches = self.rope_eq_str(text);

        if !current_text_matches {
            self.rope = Rope::from_str(text);
            self.revision += 1;
            let new_len = self.rope.len_chars();
            self.cursor = cursor.unwrap_or(new_len).min(new_len);
            tracing::trace!(
                target: "buffer",
                revision = self.revision,
                len_chars = new_len,
                cursor = self.cursor,
                "buffer_text_changed"
            );
            return true;
        }

        if let Some(requested) = cursor {
            let clamped = requested.min(char_len);
            if clamped != self.cursor {
                self.cursor = clamped;
                tracing::trace!(target: "buffer", cursor = self.cursor, "buffer_cursor_moved");
            }
        }
        false
    }

    fn rope_eq_str(&self, text: &str) -> bool {
        // Rope has no direct `==  &str`; compare lengths first to avoid an
        // O(n) string materialization on the common "unchanged" path when
        // lengths already differ.
        if self.rope.len_bytes() != text.len() {
            return false;
        }
        self.rope.to_string() == text
    }

    /// Computes the cursor-centered window (spec.md §4.1). `window_size` is
    /// a char count. The returned text has length `min(window_size, len)`
    /// whenever possible; if the naive half-window would spill past one
    /// boundary, the excess is pushed to the other side so the window stays
    /// full length.
    pub fn get_window(&self, window_size: usize) -> Window {
        let len = self.rope.len_chars();
        if window_size >= len {
            return Window {
                text: self.rope.to_string(),
                offset: 0,
            };
        }

        let half = window_size / 2;
        let right = window_size - half; // absorbs the odd remainder on this side
        let mut start = self.cursor.saturating_sub(half);
        let mut end = (self.cursor + right).min(len);

        // Extend the opposite side if one boundary clipped the window short.
        let current_len = end - start;
        if current_len < window_size {
            let deficit = window_size - current_len;
            if start == 0 {
                end = (end + deficit).min(len);
            } else if end == len {
                start = start.saturating_sub(deficit);
            }
        }

        let text = self.rope.slice(start..end).to_string();
        Window { text, offset: start }
    }

    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn reset(&mut self) {
        self.rope = Rope::new();
        self.cursor = 0;
        self.revision = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_returns_true_only_when_text_changes() {
        let mut buf = Buffer::new();
        assert!(buf.update("hello", None));
        assert_eq!(buf.revision(), 1);
        assert!(!buf.update("hello", None));
        assert_eq!(buf.revision(), 1);
        assert!(!buf.update("hello", Some(2)));
        assert_eq!(buf.cursor(), 2);
        assert_eq!(buf.revision(), 1);
        assert!(buf.update("hello world", None));
        assert_eq!(buf.revision(), 2);
    }

    #[test]
    fn update_defaults_cursor_to_end_of_text() {
        let mut buf = Buffer::new();
        buf.update("abc", None);
        assert_eq!(buf.cursor(), 3);
    }

    #[test]
    fn window_covers_min_of_window_size_and_len() {
        let mut buf = Buffer::new();
        buf.update("0123456789", Some(5));
        let w = buf.get_window(4);
        assert_eq!(w.text.len(), 4);
        assert!(w.offset <= 5 && w.offset + 4 >= 5);
    }

    #[test]
    fn window_clamps_at_start_boundary_and_extends_right() {
        let mut buf = Buffer::new();
        buf.update("0123456789", Some(0));
        let w = buf.get_window(6);
        assert_eq!(w.offset, 0);
        assert_eq!(w.text, "012345");
    }

    #[test]
    fn window_clamps_at_end_boundary_and_extends_left() {
        let mut buf = Buffer::new();
        let len = "0123456789".len();
        buf.update("0123456789", Some(len));
        let w = buf.get_window(6);
        assert_eq!(w.text, "456789");
        assert_eq!(w.offset + w.text.chars().count(), len);
    }

    #[test]
    fn window_size_covering_whole_text_returns_full_text_at_offset_zero() {
        let mut buf = Buffer::new();
        buf.update("short", Some(2));
        let w = buf.get_window(500);
        assert_eq!(w.text, "short");
        assert_eq!(w.offset, 0);
    }

    #[test]
    fn empty_text_has_empty_window() {
        let buf = Buffer::new();
        let w = buf.get_window(500);
        assert_eq!(w.text, "");
        assert_eq!(w.offset, 0);
        assert_eq!(buf.cursor(), 0);
    }

    #[test]
    fn reset_zeroes_all_state() {
        let mut buf = Buffer::new();
        buf.update("hello", Some(3));
        buf.reset();
        assert_eq!(buf.text(), "");
        assert_eq!(buf.cursor(), 0);
        assert_eq!(buf.revision(), 0);
    }

    proptest::proptest! {
        #[test]
        fn window_never_escapes_buffer_bounds(
            text in "\\PC{0,80}",
            cursor in 0usize..120,
            window_size in 0usize..40,
        ) {
            let mut buf = Buffer::new();
            let len = text.chars().count();
            buf.update(&text, Some(cursor.min(len)));
            let w = buf.get_window(window_size);
            let w_len = w.text.chars().count();
            proptest::prop_assert!(w.offset <= len);
            proptest::prop_assert!(w.offset + w_len <= len);
            proptest::prop_assert_eq!(w_len, window_size.min(len));
        }
    }
}
