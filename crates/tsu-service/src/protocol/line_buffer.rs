//! Reassembles newline-delimited messages from arbitrarily split chunks.

use memchr::memchr_iter;

/// Bytes received after the last line feed are held until the next chunk
/// completes them. Lines are returned without the `\n` and without one
/// trailing `\r`.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        LineBuffer::default()
    }

    /// Feed one chunk; returns every line it completes, in order.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();
        let mut start = 0;
        for newline in memchr_iter(b'\n', chunk) {
            let line = if self.pending.is_empty() {
                line_text(&chunk[start..newline])
            } else {
                self.pending.extend_from_slice(&chunk[start..newline]);
                let text = line_text(&self.pending);
                self.pending.clear();
                text
            };
            lines.push(line);
            start = newline + 1;
        }
        self.pending.extend_from_slice(&chunk[start..]);
        lines
    }

    /// The unterminated tail, if any. Used at end of input.
    pub fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let line = line_text(&self.pending);
        self.pending.clear();
        Some(line)
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}

fn line_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_line_is_buffered() {
        let mut buffer = LineBuffer::new();
        assert!(buffer.push(b"{\"file\":").is_empty());
        assert!(buffer.has_pending());
        assert_eq!(buffer.push(b"\"a.ts\"}\n"), vec![r#"{"file":"a.ts"}"#]);
        assert!(!buffer.has_pending());
    }

    #[test]
    fn test_chunk_with_many_lines() {
        let mut buffer = LineBuffer::new();
        buffer.push(b"one-");
        let lines = buffer.push(b"head\r\ntwo\nthree\nfou");
        assert_eq!(lines, vec!["one-head", "two", "three"]);
        assert_eq!(buffer.push(b"r\n"), vec!["four"]);
    }

    #[test]
    fn test_multibyte_character_split_across_chunks() {
        let text = "{\"file\":\"é.ts\"}\n".as_bytes();
        let split = text.iter().position(|&b| b >= 0x80).expect("non-ascii") + 1;
        let mut buffer = LineBuffer::new();
        assert!(buffer.push(&text[..split]).is_empty());
        assert_eq!(buffer.push(&text[split..]), vec!["{\"file\":\"é.ts\"}"]);
    }

    #[test]
    fn test_finish_returns_tail() {
        let mut buffer = LineBuffer::new();
        buffer.push(b"a\nb");
        assert_eq!(buffer.finish().as_deref(), Some("b"));
        assert_eq!(buffer.finish(), None);
    }
}
