//! Buffered, line-oriented reading over a forward-only byte source.

use memchr::memmem;
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt};

pub(crate) const DEFAULT_BUFFER_SIZE: usize = 8192;

/// Line, byte and read-to-end access over an [`AsyncRead`] source.
///
/// Owns one fixed-capacity buffer, allocated at construction and reused for
/// every fill. All three read operations share the same cursor, so they can
/// be mixed freely as long as a single task drives the reader.
///
/// # End of stream
///
/// - [`read_line`](LineReader::read_line) and [`read_bytes`](LineReader::read_bytes)
///   keep reading until they have what they need or the source reports EOF
///   (a read of `0` bytes).
/// - [`read_to_end`](LineReader::read_to_end) stops after the first read that does
///   not fill the whole buffer. Clients do not close their side of the socket
///   while waiting for a response, so a short read is the only end marker
///   available for a body without framing.
///
/// # Examples
///
/// ```
/// use embed_http::LineReader;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> std::io::Result<()> {
/// let mut reader = LineReader::new(&b"GET / HTTP/1.1\r\nHost: a\r\n\r\nbody"[..]);
///
/// assert_eq!(reader.read_line().await?.as_deref(), Some("GET / HTTP/1.1"));
/// assert_eq!(reader.read_line().await?.as_deref(), Some("Host: a"));
/// assert_eq!(reader.read_line().await?.as_deref(), Some(""));
/// assert_eq!(reader.read_to_end().await?, "body");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct LineReader<R> {
    source: R,
    buffer: Box<[u8]>,
    len: usize,
    cursor: usize,
    primed: bool,
}

impl<R: AsyncRead + Unpin> LineReader<R> {
    /// Creates a reader with the default capacity of `8192` bytes.
    #[inline]
    pub fn new(source: R) -> Self {
        Self::with_capacity(source, DEFAULT_BUFFER_SIZE)
    }

    /// Creates a reader whose buffer holds `capacity` bytes.
    ///
    /// A capacity of zero is raised to one byte.
    #[inline]
    pub fn with_capacity(source: R, capacity: usize) -> Self {
        LineReader {
            source,
            buffer: vec![0; capacity.max(1)].into_boxed_slice(),
            len: 0,
            cursor: 0,
            primed: false,
        }
    }

    /// Capacity of the internal buffer.
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Returns the source, discarding any buffered bytes.
    #[inline]
    pub fn into_inner(self) -> R {
        self.source
    }

    /// Reads the next line, without its `CRLF`, decoded as UTF-8.
    ///
    /// Bytes are accumulated across as many fills as needed, and a `CRLF`
    /// whose `CR` ends one fill and whose `LF` starts the next is still one
    /// line break. At EOF the pending bytes are returned as the last line;
    /// `None` means EOF was reached with nothing pending.
    ///
    /// Invalid UTF-8 sequences are replaced with `U+FFFD`.
    pub async fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = Vec::new();
        let mut pending = false;

        loop {
            if self.is_drained() {
                if self.fill_buffer().await? == 0 {
                    break;
                }

                if line.last() == Some(&b'\r') && self.buffer[0] == b'\n' {
                    line.pop();
                    self.cursor = 1;
                    return Ok(Some(into_text(line)));
                }
            }

            let window = self.get_slice(self.cursor, self.len);
            pending = true;

            match memmem::find(window, b"\r\n") {
                Some(i) => {
                    line.extend_from_slice(&window[..i]);
                    self.cursor += i + 2;
                    return Ok(Some(into_text(line)));
                }
                None => {
                    line.extend_from_slice(window);
                    self.cursor = self.len;
                }
            }
        }

        Ok(pending.then(|| into_text(line)))
    }

    /// Reads everything left in the stream, decoded as UTF-8.
    ///
    /// See [`read_remaining`](LineReader::read_remaining) for where the stream is
    /// considered finished.
    pub async fn read_to_end(&mut self) -> io::Result<String> {
        self.read_remaining().await.map(into_text)
    }

    /// Reads everything left in the stream as raw bytes.
    ///
    /// Returns the unread part of the buffer, then refills for as long as the
    /// previous fill saturated the buffer (or no fill happened yet).
    pub async fn read_remaining(&mut self) -> io::Result<Vec<u8>> {
        let mut data = self.get_slice(self.cursor, self.len).to_vec();
        self.cursor = self.len;

        while self.may_have_more() {
            let n = self.fill_buffer().await?;
            data.extend_from_slice(self.get_slice(0, n));
            self.cursor = n;
        }

        Ok(data)
    }

    /// Copies up to `dst.len()` raw bytes into `dst`.
    ///
    /// Returns the number of bytes copied, which is less than `dst.len()`
    /// only when the source reached EOF.
    pub async fn read_bytes(&mut self, dst: &mut [u8]) -> io::Result<usize> {
        let mut copied = 0;

        while copied < dst.len() {
            if self.is_drained() && self.fill_buffer().await? == 0 {
                break;
            }

            let available = self.get_slice(self.cursor, self.len);
            let n = available.len().min(dst.len() - copied);

            dst[copied..copied + n].copy_from_slice(&available[..n]);
            copied += n;
            self.cursor += n;
        }

        Ok(copied)
    }
}

// Work with Buffer
impl<R: AsyncRead + Unpin> LineReader<R> {
    // Replaces the buffer content with the next chunk from the source.
    #[inline]
    async fn fill_buffer(&mut self) -> io::Result<usize> {
        let n = self.source.read(&mut self.buffer).await?;

        self.len = n;
        self.cursor = 0;
        self.primed = true;

        Ok(n)
    }

    #[inline(always)]
    fn is_drained(&self) -> bool {
        self.cursor >= self.len
    }

    // A full buffer means the source probably had more to give than fit.
    #[inline(always)]
    fn may_have_more(&self) -> bool {
        !self.primed || self.len == self.buffer.len()
    }

    #[inline(always)]
    fn get_slice(&self, start: usize, end: usize) -> &[u8] {
        &self.buffer[start..end]
    }
}

#[inline]
pub(crate) fn into_text(bytes: Vec<u8>) -> String {
    match simdutf8::basic::from_utf8(&bytes) {
        // SAFETY: `simdutf8` has just validated the whole vector.
        Ok(_) => unsafe { String::from_utf8_unchecked(bytes) },
        Err(_) => String::from_utf8_lossy(&bytes).into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::io::Builder;

    #[tokio::test]
    async fn lines_from_single_fill() {
        let mut reader = LineReader::new(&b"first\r\nsecond\r\n\r\nlast"[..]);

        assert_eq!(reader.read_line().await.unwrap().as_deref(), Some("first"));
        assert_eq!(reader.read_line().await.unwrap().as_deref(), Some("second"));
        assert_eq!(reader.read_line().await.unwrap().as_deref(), Some(""));
        assert_eq!(reader.read_line().await.unwrap().as_deref(), Some("last"));
        assert_eq!(reader.read_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn empty_stream() {
        let mut reader = LineReader::new(&b""[..]);

        assert_eq!(reader.read_line().await.unwrap(), None);
        assert_eq!(reader.read_to_end().await.unwrap(), "");

        let mut dst = [0; 4];
        assert_eq!(reader.read_bytes(&mut dst).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn line_straddles_fills() {
        let source = Builder::new()
            .read(b"GET /very/")
            .read(b"long/path HT")
            .read(b"TP/1.1\r\nHost: x\r\n\r\n")
            .build();
        let mut reader = LineReader::new(source);

        assert_eq!(
            reader.read_line().await.unwrap().as_deref(),
            Some("GET /very/long/path HTTP/1.1")
        );
        assert_eq!(reader.read_line().await.unwrap().as_deref(), Some("Host: x"));
        assert_eq!(reader.read_line().await.unwrap().as_deref(), Some(""));
    }

    #[tokio::test]
    async fn crlf_split_between_fills() {
        // `CR` is the last byte of the first fill, `LF` the first of the second.
        let source = Builder::new()
            .read(b"GET /ab\r")
            .read(b"\nHost: x")
            .read(b"\r\n\r\n")
            .build();
        let mut reader = LineReader::with_capacity(source, 8);

        assert_eq!(reader.read_line().await.unwrap().as_deref(), Some("GET /ab"));
        assert_eq!(reader.read_line().await.unwrap().as_deref(), Some("Host: x"));
        assert_eq!(reader.read_line().await.unwrap().as_deref(), Some(""));
        assert_eq!(reader.read_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn crlf_split_with_short_fills() {
        let source = Builder::new()
            .read(b"a\r")
            .read(b"\nb\r")
            .read(b"\n")
            .build();
        let mut reader = LineReader::new(source);

        assert_eq!(reader.read_line().await.unwrap().as_deref(), Some("a"));
        assert_eq!(reader.read_line().await.unwrap().as_deref(), Some("b"));
        assert_eq!(reader.read_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn lone_cr_is_kept() {
        let source = Builder::new().read(b"a\r").read(b"b\r\n").build();
        let mut reader = LineReader::with_capacity(source, 2);

        assert_eq!(reader.read_line().await.unwrap().as_deref(), Some("a\rb"));
    }

    #[tokio::test]
    async fn utf8_split_between_fills() {
        let text = "ключ: значение\r\n";
        let (head, tail) = text.as_bytes().split_at(3); // inside the second letter
        let source = Builder::new().read(head).read(tail).build();
        let mut reader = LineReader::with_capacity(source, 4);

        assert_eq!(
            reader.read_line().await.unwrap().as_deref(),
            Some("ключ: значение")
        );
    }

    #[tokio::test]
    async fn invalid_utf8_is_replaced() {
        let mut reader = LineReader::new(&b"ab\xFFcd\r\n"[..]);

        assert_eq!(
            reader.read_line().await.unwrap().as_deref(),
            Some("ab\u{FFFD}cd")
        );
    }

    #[tokio::test]
    async fn read_to_end_follows_full_fills() {
        // Every fill saturates the 4-byte buffer except the last one.
        let source = Builder::new().read(b"0123456789").build();
        let mut reader = LineReader::with_capacity(source, 4);

        assert_eq!(reader.read_to_end().await.unwrap(), "0123456789");
    }

    #[tokio::test]
    async fn read_to_end_exact_multiple_of_capacity() {
        let source = Builder::new().read(b"01234567").build();
        let mut reader = LineReader::with_capacity(source, 4);

        assert_eq!(reader.read_to_end().await.unwrap(), "01234567");
    }

    #[tokio::test]
    async fn read_to_end_stops_at_short_fill() {
        let source = Builder::new().read(b"head\r\nbo").build();
        let mut reader = LineReader::new(source);

        assert_eq!(reader.read_line().await.unwrap().as_deref(), Some("head"));
        assert_eq!(reader.read_to_end().await.unwrap(), "bo");
        assert_eq!(reader.read_to_end().await.unwrap(), "");
    }

    #[tokio::test]
    async fn lines_drain_like_read_to_end() {
        let data = b"alpha\r\nbeta\r\n\r\ngamma\r\ndelta";

        let mut by_lines = LineReader::with_capacity(&data[..], 5);
        let mut lines = Vec::new();
        while let Some(line) = by_lines.read_line().await.unwrap() {
            lines.push(line);
        }

        let mut whole = LineReader::new(&data[..]);
        assert_eq!(lines.join("\r\n"), whole.read_to_end().await.unwrap());
    }

    #[tokio::test]
    async fn read_bytes_across_fills() {
        let mut reader = LineReader::with_capacity(&b"0123456789"[..], 4);

        let mut dst = [0; 6];
        assert_eq!(reader.read_bytes(&mut dst).await.unwrap(), 6);
        assert_eq!(&dst, b"012345");

        let mut dst = [0; 10];
        assert_eq!(reader.read_bytes(&mut dst).await.unwrap(), 4);
        assert_eq!(&dst[..4], b"6789");
    }

    #[tokio::test]
    async fn mixed_operations_share_cursor() {
        let mut reader = LineReader::with_capacity(&b"line\r\nRAWtail"[..], 3);

        assert_eq!(reader.read_line().await.unwrap().as_deref(), Some("line"));

        let mut dst = [0; 3];
        assert_eq!(reader.read_bytes(&mut dst).await.unwrap(), 3);
        assert_eq!(&dst, b"RAW");

        assert_eq!(reader.read_to_end().await.unwrap(), "tail");
    }

    #[tokio::test]
    async fn capacity() {
        #[rustfmt::skip]
        let cases = [
            (LineReader::new(&b"abc"[..]),                  DEFAULT_BUFFER_SIZE),
            (LineReader::with_capacity(&b"abc"[..], 16),    16),
            (LineReader::with_capacity(&b"abc"[..], 0),     1),
        ];

        for (mut reader, expected) in cases {
            assert_eq!(reader.capacity(), expected);
            assert_eq!(reader.read_to_end().await.unwrap(), "abc");
        }
    }

    #[tokio::test]
    async fn zero_capacity_still_reads_lines() {
        let mut reader = LineReader::with_capacity(&b"GET / HTTP/1.1\r\n\r\nrest"[..], 0);

        assert_eq!(reader.read_line().await.unwrap().as_deref(), Some("GET / HTTP/1.1"));
        assert_eq!(reader.read_line().await.unwrap().as_deref(), Some(""));
        assert_eq!(reader.read_to_end().await.unwrap(), "rest");
    }

    #[tokio::test]
    async fn into_inner_returns_unread_source() {
        let mut reader = LineReader::with_capacity(&b"ab\r\ncdef"[..], 6);
        assert_eq!(reader.read_line().await.unwrap().as_deref(), Some("ab"));

        // "cd" was buffered and is dropped with the reader
        let rest = reader.into_inner();
        assert_eq!(rest, b"ef");
    }

    #[tokio::test]
    async fn io_errors_propagate() {
        let source = Builder::new()
            .read(b"partial")
            .read_error(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
            .build();
        let mut reader = LineReader::new(source);

        let err = reader.read_line().await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::ConnectionReset);
    }
}
