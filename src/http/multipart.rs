//! `multipart/form-data` bodies.
//!
//! The request parser hands the rest of the stream to a [`FormDecoder`] as
//! soon as it sees a multipart `Content-Type`. [`MultipartDecoder`] is the
//! decoder used by [`Request::parse`](crate::Request::parse): it buffers the
//! remaining body and splits it on the boundary.

use crate::{errors::Error, http::reader::LineReader};
use memchr::memmem;
use std::future::Future;
use thiserror::Error as ThisError;
use tokio::io::AsyncRead;

/// Everything that can go wrong inside a multipart body.
#[derive(Debug, ThisError, Clone, PartialEq, Eq)]
pub enum MultipartError {
    #[error("boundary parameter is missing")]
    MissingBoundary,

    /// The body ended before the closing boundary.
    #[error("body ended before the closing boundary")]
    UnexpectedEof,

    #[error("part has no Content-Disposition header")]
    MissingContentDisposition,

    #[error("invalid part: {0}")]
    InvalidPart(&'static str),
}

/// Seam between the request parser and a multipart body decoder.
///
/// The decoder receives the request's `Content-Type` value and the reader
/// positioned at the first body byte, and owns the rest of the stream.
pub trait FormDecoder: Send + Sync {
    fn decode<R: AsyncRead + Unpin + Send>(
        &self,
        content_type: &str,
        reader: &mut LineReader<R>,
    ) -> impl Future<Output = Result<MultipartForm, Error>> + Send;
}

/// Buffering boundary decoder.
///
/// Reads the remaining body with the same end-of-stream rule as
/// [`LineReader::read_to_end`], then splits it into [`Part`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct MultipartDecoder;

impl FormDecoder for MultipartDecoder {
    async fn decode<R: AsyncRead + Unpin + Send>(
        &self,
        content_type: &str,
        reader: &mut LineReader<R>,
    ) -> Result<MultipartForm, Error> {
        let boundary = parse_boundary(content_type)?;
        let body = reader.read_remaining().await?;

        Ok(parse_form(&body, &boundary)?)
    }
}

/// One field or file of a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    /// `name` parameter of `Content-Disposition`.
    pub name: String,
    /// `filename` parameter of `Content-Disposition`, set for file parts.
    pub filename: Option<String>,
    /// The part's own `Content-Type`, if sent.
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl Part {
    #[inline(always)]
    pub fn is_file(&self) -> bool {
        self.filename.is_some()
    }

    /// Data as text, `None` if it is not valid UTF-8.
    #[inline]
    pub fn text(&self) -> Option<&str> {
        simdutf8::basic::from_utf8(&self.data).ok()
    }
}

/// Parts of a decoded form, in body order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartForm {
    parts: Vec<Part>,
}

impl MultipartForm {
    #[inline]
    pub fn from_parts(parts: Vec<Part>) -> Self {
        MultipartForm { parts }
    }

    #[inline(always)]
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    #[inline]
    pub fn into_parts(self) -> Vec<Part> {
        self.parts
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Text of the first non-file part called `name`.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.parts
            .iter()
            .find(|p| p.name == name && !p.is_file())
            .and_then(Part::text)
    }

    /// First file part called `name`.
    pub fn file(&self, name: &str) -> Option<&Part> {
        self.parts.iter().find(|p| p.name == name && p.is_file())
    }

    /// All file parts.
    pub fn files(&self) -> impl Iterator<Item = &Part> {
        self.parts.iter().filter(|p| p.is_file())
    }
}

/// Extracts the `boundary` parameter from a `Content-Type` value.
///
/// Surrounding quotes are removed.
pub fn parse_boundary(content_type: &str) -> Result<String, MultipartError> {
    content_type
        .split(';')
        .skip(1)
        .filter_map(|param| param.split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("boundary"))
        .map(|(_, value)| value.trim().trim_matches('"'))
        .filter(|boundary| !boundary.is_empty())
        .map(str::to_owned)
        .ok_or(MultipartError::MissingBoundary)
}

/// Splits a complete multipart body into parts.
pub(crate) fn parse_form(body: &[u8], boundary: &str) -> Result<MultipartForm, MultipartError> {
    let delimiter = format!("--{boundary}");
    let separator = format!("\r\n{delimiter}");

    // The first delimiter may open the body or follow a preamble.
    let mut pos = match body.starts_with(delimiter.as_bytes()) {
        true => 0,
        false => {
            memmem::find(body, separator.as_bytes()).ok_or(MultipartError::UnexpectedEof)? + 2
        }
    };

    let mut parts = Vec::new();
    loop {
        let after = &body[pos + delimiter.len()..];

        if after.starts_with(b"--") {
            break;
        }
        if !after.starts_with(b"\r\n") {
            return Err(match after.len() < 2 {
                true => MultipartError::UnexpectedEof,
                false => MultipartError::InvalidPart("expected CRLF after boundary"),
            });
        }

        let start = pos + delimiter.len() + 2;
        let (head, data_start) = match body[start..].starts_with(b"\r\n") {
            true => (&body[start..start], start + 2),
            false => {
                let end = memmem::find(&body[start..], b"\r\n\r\n")
                    .ok_or(MultipartError::UnexpectedEof)?;
                (&body[start..start + end], start + end + 4)
            }
        };

        let data_end = memmem::find(&body[data_start..], separator.as_bytes())
            .map(|i| data_start + i)
            .ok_or(MultipartError::UnexpectedEof)?;

        let mut part = parse_part_head(head)?;
        part.data = body[data_start..data_end].to_vec();
        parts.push(part);

        pos = data_end + 2;
    }

    Ok(MultipartForm { parts })
}

fn parse_part_head(head: &[u8]) -> Result<Part, MultipartError> {
    let head = String::from_utf8_lossy(head);

    let mut disposition = None;
    let mut content_type = None;

    for line in head.split("\r\n") {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };

        if name.trim().eq_ignore_ascii_case("content-disposition") {
            disposition = Some(value.trim());
        } else if name.trim().eq_ignore_ascii_case("content-type") {
            content_type = Some(value.trim().to_owned());
        }
    }

    let disposition = disposition.ok_or(MultipartError::MissingContentDisposition)?;

    let mut name = None;
    let mut filename = None;
    for param in disposition.split(';').skip(1) {
        let Some((key, value)) = param.split_once('=') else {
            continue;
        };
        let value = value.trim().trim_matches('"').to_owned();

        match key.trim() {
            k if k.eq_ignore_ascii_case("name") => name = Some(value),
            k if k.eq_ignore_ascii_case("filename") => filename = Some(value),
            _ => {}
        }
    }

    Ok(Part {
        name: name.ok_or(MultipartError::InvalidPart("missing name parameter"))?,
        filename,
        content_type,
        data: Vec::new(),
    })
}
