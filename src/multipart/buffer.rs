//! Byte accumulation for multipart bodies.

use bytes::{BufMut, Bytes, BytesMut};

const CRLF: &[u8] = b"\r\n";

/// Accumulates text and raw binary segments into one contiguous body.
///
/// Text segments are written as their UTF-8 bytes. Binary segments are
/// copied verbatim, so file contents are never transcoded.
#[derive(Debug, Default)]
pub(crate) struct BodyBuffer {
    buf: BytesMut,
}

impl BodyBuffer {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    /// Appends the UTF-8 encoding of `text`.
    pub(crate) fn put_text(&mut self, text: &str) {
        self.buf.put_slice(text.as_bytes());
    }

    /// Appends `text` followed by CRLF.
    pub(crate) fn put_line(&mut self, text: &str) {
        self.put_text(text);
        self.put_crlf();
    }

    /// Appends raw bytes unchanged.
    pub(crate) fn put_bytes(&mut self, bytes: &[u8]) {
        self.buf.put_slice(bytes);
    }

    pub(crate) fn put_crlf(&mut self) {
        self.buf.put_slice(CRLF);
    }

    pub(crate) fn len(&self) -> usize {
        self.buf.len()
    }

    pub(crate) fn freeze(self) -> Bytes {
        self.buf.freeze()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mixed_segments() {
        let mut buf = BodyBuffer::with_capacity(16);
        buf.put_line("héllo");
        buf.put_bytes(&[0x00, 0xFF, 0xFE, b'\n']);
        buf.put_crlf();

        let body = buf.freeze();
        let mut expected = "héllo\r\n".as_bytes().to_vec();
        expected.extend_from_slice(&[0x00, 0xFF, 0xFE, b'\n', b'\r', b'\n']);
        assert_eq!(&body[..], &expected[..]);
    }

    #[test]
    fn test_invalid_utf8_survives() {
        // a lone continuation byte would be replaced by any text conversion
        let mut buf = BodyBuffer::default();
        buf.put_text("a");
        buf.put_bytes(&[0x80, 0xC3]);
        assert_eq!(buf.len(), 3);
        assert_eq!(&buf.freeze()[..], &[b'a', 0x80, 0xC3]);
    }
}
