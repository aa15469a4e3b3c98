//! Reassembles text lines from a body that arrives in arbitrary chunks.
//!
//! Network reads split the stream wherever they like, including in the middle
//! of a line or of a multi-byte UTF-8 sequence. The buffer keeps raw bytes
//! until a line terminator arrives, so only whole lines are ever decoded.
//! `\n`, `\r\n` and a lone `\r` all end a line.
//!
//! ```rust
//! use dify_core::LineBuffer;
//!
//! let mut buf = LineBuffer::new();
//! assert!(buf.push(b"data: {\"ev").is_empty());
//! assert_eq!(buf.push(b"ent\":\"ping\"}\r\n\r\n"), ["data: {\"event\":\"ping\"}", ""]);
//! ```

#[derive(Debug, Default)]
pub struct LineBuffer {
    buf: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `chunk` and return every line it completed, without the line
    /// terminator.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some((end, next)) = self.next_line() {
            let raw: Vec<u8> = self.buf.drain(..next).collect();
            lines.push(String::from_utf8_lossy(&raw[..end]).into_owned());
        }
        lines
    }

    /// End of the first complete line and start of the one after it.
    fn next_line(&self) -> Option<(usize, usize)> {
        let pos = self.buf.iter().position(|b| matches!(b, b'\n' | b'\r'))?;
        match (self.buf[pos], self.buf.get(pos + 1)) {
            (b'\n', _) => Some((pos, pos + 1)),
            (_, Some(b'\n')) => Some((pos, pos + 2)),
            (_, Some(_)) => Some((pos, pos + 1)),
            // `\r` at the end of the buffer: the `\n` may be in the next chunk
            (_, None) => None,
        }
    }

    /// Flush a trailing line that never received its terminator.
    pub fn finish(&mut self) -> Option<String> {
        if self.buf.is_empty() {
            return None;
        }
        let raw = std::mem::take(&mut self.buf);
        Some(decode(&raw))
    }

    /// Bytes held back waiting for a line terminator.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }
}

fn decode(raw: &[u8]) -> String {
    let mut end = raw.len();
    while end > 0 && matches!(raw[end - 1], b'\n' | b'\r') {
        end -= 1;
    }
    String::from_utf8_lossy(&raw[..end]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_split_across_chunks() {
        let mut buf = LineBuffer::new();
        assert!(buf.push(b"data: hel").is_empty());
        assert_eq!(buf.pending(), 9);
        assert_eq!(buf.push(b"lo\n\ndata: world\n"), ["data: hello", "", "data: world"]);
        assert_eq!(buf.pending(), 0);
    }

    #[test]
    fn multibyte_character_split_across_chunks() {
        let text = "data: 你好\n".as_bytes();
        let (head, tail) = text.split_at(8);

        let mut buf = LineBuffer::new();
        assert!(buf.push(head).is_empty());
        assert_eq!(buf.push(tail), ["data: 你好"]);
    }

    #[test]
    fn finish_flushes_unterminated_tail() {
        let mut buf = LineBuffer::new();
        assert!(buf.push(b"data: {\"event\":\"ping\"}").is_empty());
        assert_eq!(buf.finish().as_deref(), Some("data: {\"event\":\"ping\"}"));
        assert_eq!(buf.finish(), None);
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let mut buf = LineBuffer::new();
        let lines = buf.push(b"data: \xff\n");
        assert_eq!(lines, ["data: \u{FFFD}"]);
    }

    #[test]
    fn bare_carriage_returns_end_lines() {
        let mut buf = LineBuffer::new();
        assert_eq!(buf.push(b"data: a\rdata: b\r"), ["data: a"]);
        assert_eq!(buf.push(b"\r"), ["data: b"]);
        assert_eq!(buf.finish().as_deref(), Some(""));
    }

    #[test]
    fn crlf_split_between_chunks_is_one_terminator() {
        let mut buf = LineBuffer::new();
        assert!(buf.push(b"data: a\r").is_empty());
        assert_eq!(buf.push(b"\ndata: b\n"), ["data: a", "data: b"]);
        assert_eq!(buf.pending(), 0);
    }
}
