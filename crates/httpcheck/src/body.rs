//! Buffered response body adapter.

use bytes::Bytes;
use std::io::{self, Cursor, Read};

/// A captured response body exposed as a sequential, closable byte source.
///
/// Body-reading assertions consume response content through this adapter
/// regardless of how the response was produced. Reading drains the buffer: a
/// second full read observes end-of-stream, matching how a consumed network
/// body would behave.
pub struct BufferedBody {
    cursor: Cursor<Bytes>,
}

impl BufferedBody {
    /// Creates an adapter over captured body bytes.
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            cursor: Cursor::new(bytes.into()),
        }
    }

    /// Creates an empty adapter.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(Bytes::new())
    }

    /// Returns the number of unread bytes remaining in the buffer.
    #[must_use]
    pub fn remaining(&self) -> usize {
        let len = self.cursor.get_ref().len() as u64;
        let pos = self.cursor.position().min(len);
        (len - pos) as usize
    }

    /// Closes the body. Always succeeds; the adapter owns no releasable
    /// resource.
    pub fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Read for BufferedBody {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.cursor.read(buf)
    }
}

impl From<Bytes> for BufferedBody {
    fn from(bytes: Bytes) -> Self {
        Self::new(bytes)
    }
}

impl From<Vec<u8>> for BufferedBody {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl From<&str> for BufferedBody {
    fn from(text: &str) -> Self {
        Self::new(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_delegates_to_buffer() {
        let mut body = BufferedBody::from("hello");
        let mut buf = [0u8; 3];

        let n = body.read(&mut buf).unwrap();
        assert_eq!(n, 3);
        assert_eq!(&buf, b"hel");
        assert_eq!(body.remaining(), 2);
    }

    #[test]
    fn test_read_to_end_drains() {
        let mut body = BufferedBody::from("pong");
        let mut out = Vec::new();

        body.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"pong");
        assert_eq!(body.remaining(), 0);

        // A second read observes end-of-stream.
        let mut again = Vec::new();
        body.read_to_end(&mut again).unwrap();
        assert!(again.is_empty());
    }

    #[test]
    fn test_close_is_noop() {
        let mut body = BufferedBody::empty();
        assert!(body.close().is_ok());
        assert!(body.close().is_ok());
    }

    #[test]
    fn test_empty_body() {
        let mut body = BufferedBody::empty();
        let mut out = Vec::new();
        body.read_to_end(&mut out).unwrap();
        assert!(out.is_empty());
    }
}
