/// Buffers serial input and yields one newline-terminated line at a time.
///
/// Partial lines are kept across reads, so a record split over two
/// chunks (or interrupted by a read timeout) is reassembled. Several lines
/// arriving in one chunk are handed out one per call to [`next_line`].
///
/// [`next_line`]: LineFramer::next_line
pub struct LineFramer {
    buffer: Vec<u8>,
    max_line_bytes: usize,
}

impl LineFramer {
    pub fn new(max_line_bytes: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(256),
            max_line_bytes,
        }
    }

    /// Append raw bytes. Returns the number of bytes discarded because an
    /// unterminated line grew past the limit (0 in the normal case).
    pub fn push(&mut self, bytes: &[u8]) -> usize {
        self.buffer.extend_from_slice(bytes);

        let tail_start = self
            .buffer
            .iter()
            .rposition(|&b| b == b'\n')
            .map_or(0, |pos| pos + 1);

        if self.buffer.len() - tail_start > self.max_line_bytes {
            let discarded = self.buffer.len() - tail_start;
            self.buffer.truncate(tail_start);
            return discarded;
        }
        0
    }

    /// Take the next complete line, decoded as UTF-8 (lossy) with trailing
    /// whitespace (including `\r\n`) removed.
    pub fn next_line(&mut self) -> Option<String> {
        let pos = self.buffer.iter().position(|&b| b == b'\n')?;
        let line: Vec<u8> = self.buffer.drain(..=pos).collect();
        Some(String::from_utf8_lossy(&line).trim_end().to_string())
    }

    /// Bytes of an incomplete line currently held.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}
