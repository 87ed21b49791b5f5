//! Blocking line framing.
//!
//! [`LineReader`] reads newline-terminated lines from any [`BufRead`],
//! strips the `\r\n` terminator and decodes UTF-8 lossily. Lines longer than
//! the limit are consumed in full and reported as
//! [`ProtocolError::LineTooLong`] so the stream stays aligned on line
//! boundaries.

use std::io::{BufRead, Read};

use crate::error::{ProtocolError, Result};

/// Default maximum line length, tags included.
///
/// Tagged chat lines routinely exceed the classic 512-byte IRC limit.
pub const DEFAULT_MAX_LINE_LEN: usize = 8192;

/// Line reader over a buffered byte stream.
#[derive(Debug)]
pub struct LineReader<R> {
    inner: R,
    buf: Vec<u8>,
    max_len: usize,
}

impl<R: BufRead> LineReader<R> {
    /// Create a reader with [`DEFAULT_MAX_LINE_LEN`].
    pub fn new(inner: R) -> Self {
        Self::with_max_len(inner, DEFAULT_MAX_LINE_LEN)
    }

    /// Create a reader with a custom maximum line length.
    pub fn with_max_len(inner: R, max_len: usize) -> Self {
        Self {
            inner,
            buf: Vec::with_capacity(512),
            max_len,
        }
    }

    /// Read the next line, blocking until one is available.
    ///
    /// Returns `Ok(None)` at end of stream. A final line without a
    /// terminator is still returned.
    pub fn read_line(&mut self) -> Result<Option<String>> {
        self.buf.clear();
        // Room for the content plus a CRLF terminator.
        let limit = self.max_len as u64 + 2;
        let n = (&mut self.inner).take(limit).read_until(b'\n', &mut self.buf)?;
        if n == 0 {
            return Ok(None);
        }

        let terminated = self.buf.last() == Some(&b'\n');
        if !terminated && n as u64 == limit {
            let skipped = self.skip_rest_of_line()?;
            return Err(ProtocolError::LineTooLong {
                actual: self.buf.len() + skipped,
                limit: self.max_len,
            });
        }

        let mut end = self.buf.len();
        while end > 0 && matches!(self.buf[end - 1], b'\n' | b'\r') {
            end -= 1;
        }
        if end > self.max_len {
            return Err(ProtocolError::LineTooLong {
                actual: end,
                limit: self.max_len,
            });
        }

        Ok(Some(String::from_utf8_lossy(&self.buf[..end]).into_owned()))
    }

    /// Discard input up to and including the next `\n`.
    fn skip_rest_of_line(&mut self) -> Result<usize> {
        let mut skipped = 0;
        loop {
            let available = self.inner.fill_buf()?;
            if available.is_empty() {
                return Ok(skipped);
            }
            match available.iter().position(|b| *b == b'\n') {
                Some(pos) => {
                    self.inner.consume(pos + 1);
                    return Ok(skipped + pos + 1);
                }
                None => {
                    let len = available.len();
                    self.inner.consume(len);
                    skipped += len;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_reads_crlf_and_lf_lines() {
        let mut reader = LineReader::new(Cursor::new("PING :a\r\nPING :b\nlast"));
        assert_eq!(reader.read_line().unwrap().as_deref(), Some("PING :a"));
        assert_eq!(reader.read_line().unwrap().as_deref(), Some("PING :b"));
        assert_eq!(reader.read_line().unwrap().as_deref(), Some("last"));
        assert_eq!(reader.read_line().unwrap(), None);
    }

    #[test]
    fn test_empty_line_is_returned_as_empty() {
        let mut reader = LineReader::new(Cursor::new("\r\nx\n"));
        assert_eq!(reader.read_line().unwrap().as_deref(), Some(""));
        assert_eq!(reader.read_line().unwrap().as_deref(), Some("x"));
    }

    #[test]
    fn test_too_long_line_is_skipped() {
        let input = format!("{}\nok\n", "a".repeat(40));
        let mut reader = LineReader::with_max_len(Cursor::new(input), 10);

        let err = reader.read_line().unwrap_err();
        assert!(matches!(err, ProtocolError::LineTooLong { limit: 10, .. }));
        assert!(err.is_recoverable());
        assert_eq!(reader.read_line().unwrap().as_deref(), Some("ok"));
    }

    #[test]
    fn test_line_at_limit_is_accepted() {
        let input = format!("{}\r\n", "b".repeat(10));
        let mut reader = LineReader::with_max_len(Cursor::new(input), 10);
        assert_eq!(reader.read_line().unwrap().map(|l| l.len()), Some(10));
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let mut reader = LineReader::new(Cursor::new(b"hi \xff there\n".to_vec()));
        assert_eq!(
            reader.read_line().unwrap().as_deref(),
            Some("hi \u{FFFD} there")
        );
    }
}
