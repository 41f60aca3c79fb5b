use crate::{
    errors::Error,
    http::{
        multipart::{FormDecoder, MultipartDecoder, MultipartForm},
        reader::LineReader,
    },
    query::QueryParams,
    HeaderName, Method,
};
use memchr::{memchr, memmem};
use std::collections::HashMap;
use tokio::io::AsyncRead;
use tracing::debug;

/// HTTP request read from one connection.
///
/// Built once by [`Request::parse`] and never modified afterwards.
///
/// # Input format
///
/// #### General designations
/// - `SP`: ASCII space (0x20), a single one separates every token
/// - `CRLF`: Carriage return + line feed (`"\r\n"`)
///
/// ## First line
///
/// | Template                                  | Example                        |
/// |-------------------------------------------|--------------------------------|
/// | `[METHOD] SP [TARGET] [SP [VERSION]] CRLF` | `GET /api/users?id=7 HTTP/1.1` |
///
/// - `[METHOD]`: one of [`Method`], anything else fails with
///   [`Error::UnknownMethod`].
/// - `[TARGET]`: path, optionally followed by `?` and a query string.
/// - `[VERSION]`: kept as text, never validated.
///
/// A line with fewer than two tokens fails with [`Error::MalformedRequestLine`].
///
/// ## Header
///
/// ```text
/// [NAME] ": " [VALUE] CRLF
/// ```
///
/// The line is split on the first `": "`, a line without it is skipped.
/// Names keep the case they were sent with, and a repeated name (same case)
/// replaces the earlier value. The header block ends at the first empty line.
///
/// A [`HeaderName`] lookup ignores case and yields the value of the last line
/// carrying that name in any casing. The body decision below uses it too.
///
/// ## Body
///
/// | Condition                                   | [`Body`]                                |
/// |---------------------------------------------|-----------------------------------------|
/// | `GET` or `OPTIONS`                          | `Empty`, the stream is not read further |
/// | `Content-Type` contains `multipart/form-data` | `Multipart`, decoded by a [`FormDecoder`] |
/// | otherwise, rest of the stream is not empty  | `Text`                                  |
/// | otherwise                                   | `Empty`                                 |
///
/// `Content-Length` is not used for framing. The body is everything the
/// client sends until a read comes back short, see
/// [`LineReader::read_to_end`].
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    line: RequestLine,
    headers: HashMap<String, String>,
    known: HashMap<HeaderName, String>,
    body: Body,
}

/// First line of a request.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestLine {
    raw: String,
    method: Method,
    target: String,
    path: String,
    query: QueryParams,
    version: Option<String>,
}

/// Request payload, exactly one case per request.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Empty,
    Text(String),
    Multipart(MultipartForm),
}

impl Request {
    /// Reads one request from `reader`.
    ///
    /// Multipart bodies are decoded with [`MultipartDecoder`].
    #[inline]
    pub async fn parse<R>(reader: &mut LineReader<R>) -> Result<Self, Error>
    where
        R: AsyncRead + Unpin + Send,
    {
        Self::parse_with(reader, &MultipartDecoder).await
    }

    /// Reads one request from `reader`, handing multipart bodies to `decoder`.
    pub async fn parse_with<R, D>(reader: &mut LineReader<R>, decoder: &D) -> Result<Self, Error>
    where
        R: AsyncRead + Unpin + Send,
        D: FormDecoder,
    {
        let raw = reader.read_line().await?.unwrap_or_default();
        let line = RequestLine::parse(raw)?;

        let mut headers = HashMap::new();
        let mut known = HashMap::new();
        while let Some(header_line) = reader.read_line().await? {
            if header_line.is_empty() {
                break;
            }

            match memmem::find(header_line.as_bytes(), b": ") {
                Some(i) => {
                    let value = header_line[i + 2..].to_owned();
                    let mut name = header_line;
                    name.truncate(i);

                    if let Ok(header) = HeaderName::from_wire(&name) {
                        known.insert(header, value.clone());
                    }
                    headers.insert(name, value);
                }
                None => debug!(line = %header_line, "skipping header line without `: `"),
            }
        }

        let body = if line.method.is_bodyless() {
            Body::Empty
        } else {
            match known.get(&HeaderName::ContentType) {
                Some(content_type) if content_type.contains("multipart/form-data") => {
                    Body::Multipart(decoder.decode(content_type, reader).await?)
                }
                _ => match reader.read_to_end().await? {
                    text if text.is_empty() => Body::Empty,
                    text => Body::Text(text),
                },
            }
        };

        Ok(Request {
            line,
            headers,
            known,
            body,
        })
    }
}

// Public API
impl Request {
    #[inline(always)]
    pub const fn line(&self) -> &RequestLine {
        &self.line
    }

    #[inline(always)]
    pub const fn method(&self) -> Method {
        self.line.method
    }

    /// The target up to the first `?`, not percent-decoded.
    #[inline(always)]
    pub fn path(&self) -> &str {
        &self.line.path
    }

    #[inline(always)]
    pub const fn query(&self) -> &QueryParams {
        &self.line.query
    }

    #[inline(always)]
    pub const fn body(&self) -> &Body {
        &self.body
    }

    /// All headers, keyed by the name exactly as received.
    #[inline(always)]
    pub const fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Value of the header sent with exactly the name `name`.
    #[inline]
    pub fn header_str(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// Value of a typed header, from the last line sent with that name in
    /// any casing.
    #[inline]
    pub fn header(&self, name: HeaderName) -> Option<&str> {
        self.known.get(&name).map(String::as_str)
    }

    #[inline]
    pub fn contains_header(&self, name: HeaderName) -> bool {
        self.header(name).is_some()
    }
}

impl RequestLine {
    fn parse(raw: String) -> Result<Self, Error> {
        let mut tokens = raw.split(' ');

        let (Some(method), Some(target)) = (tokens.next(), tokens.next()) else {
            return Err(Error::MalformedRequestLine(raw));
        };

        let method = Method::from_token(method)?;
        let target = target.to_owned();
        let version = tokens.next().map(str::to_owned);

        let (path, query) = match memchr(b'?', target.as_bytes()) {
            Some(i) => (target[..i].to_owned(), QueryParams::parse(&target[i + 1..])),
            None => (target.clone(), QueryParams::default()),
        };

        Ok(RequestLine {
            raw,
            method,
            target,
            path,
            query,
            version,
        })
    }

    /// The whole line as received, without `CRLF`.
    #[inline(always)]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    #[inline(always)]
    pub const fn method(&self) -> Method {
        self.method
    }

    /// Raw request target, path and query string.
    #[inline(always)]
    pub fn target(&self) -> &str {
        &self.target
    }

    #[inline(always)]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[inline(always)]
    pub const fn query(&self) -> &QueryParams {
        &self.query
    }

    /// Third token of the line, not validated.
    #[inline(always)]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }
}
