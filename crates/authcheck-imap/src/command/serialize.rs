//! Command serialization helpers.

/// A command split at synchronizing literals.
///
/// Every chunk but the last ends with a `{n}\r\n` announcement; the client
/// must wait for a continuation request before sending the next chunk.
#[derive(Debug, Default)]
pub struct Chunks {
    sent: Vec<Vec<u8>>,
    current: Vec<u8>,
}

impl Chunks {
    /// Appends raw bytes to the current chunk.
    pub fn push(&mut self, bytes: &[u8]) {
        self.current.extend_from_slice(bytes);
    }

    /// Announces `data` as a literal and starts a new chunk with it.
    fn literal(&mut self, data: &[u8]) {
        self.current
            .extend_from_slice(format!("{{{}}}\r\n", data.len()).as_bytes());
        self.sent.push(std::mem::take(&mut self.current));
        self.current.extend_from_slice(data);
    }

    /// Returns the chunks in send order.
    pub fn finish(mut self) -> Vec<Vec<u8>> {
        self.sent.push(self.current);
        self.sent
    }
}

/// Writes an astring: a bare atom when possible, a quoted string for 7-bit
/// text, and a literal for anything a quoted string cannot carry (8-bit
/// data, CR, LF, NUL).
pub fn write_astring(chunks: &mut Chunks, s: &str) {
    if !s.is_empty() && s.bytes().all(is_atom_char) {
        chunks.push(s.as_bytes());
        return;
    }
    if !s.bytes().all(is_quoted_char) {
        chunks.literal(s.as_bytes());
        return;
    }

    chunks.push(b"\"");
    for b in s.bytes() {
        if matches!(b, b'"' | b'\\') {
            chunks.push(b"\\");
        }
        chunks.push(&[b]);
    }
    chunks.push(b"\"");
}

/// ASTRING-CHAR from RFC 9051 (atom chars plus `]`).
const fn is_atom_char(b: u8) -> bool {
    b > 0x20 && b < 0x7F && !matches!(b, b'(' | b')' | b'{' | b'%' | b'*' | b'"' | b'\\')
}

/// TEXT-CHAR from RFC 3501.
const fn is_quoted_char(b: u8) -> bool {
    b > 0 && b < 0x80 && b != b'\r' && b != b'\n'
}
