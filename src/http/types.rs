#![allow(rustdoc::bare_urls)]

//! Protocol string tables: methods, status lines and header names

use crate::errors::Error;
use std::fmt;

// METHOD

/// HTTP request methods
///
/// # References
///
/// - [RFC 7231, Section 4](https://datatracker.ietf.org/doc/html/rfc7231#section-4)
///
/// # Unsupported methods
///
/// Any other token (`HEAD`, `PATCH`, `TRACE`, ...) fails request parsing
/// with [`Error::UnknownMethod`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET method - transfer a current representation of the target resource
    /// [[RFC7231, Section 4.3.1](https://tools.ietf.org/html/rfc7231#section-4.3.1)]
    Get,
    /// POST method - perform resource-specific processing on the request payload
    /// [[RFC7231, Section 4.3.3](https://tools.ietf.org/html/rfc7231#section-4.3.3)]
    Post,
    /// PUT method - replace all current representations of the target resource with the request payload
    /// [[RFC7231, Section 4.3.4](https://tools.ietf.org/html/rfc7231#section-4.3.4)]
    Put,
    /// DELETE method - remove all current representations of the target resource
    /// [[RFC7231, Section 4.3.5](https://tools.ietf.org/html/rfc7231#section-4.3.5)]
    Delete,
    /// OPTIONS method - describe the communication options for the target resource
    /// [[RFC7231, Section 4.3.7](https://tools.ietf.org/html/rfc7231#section-4.3.7)]
    Options,
}

impl Method {
    /// Parses a method token. Matching is exact (upper case).
    #[inline]
    pub fn from_token(token: &str) -> Result<Self, Error> {
        match token.as_bytes() {
            b"GET" => Ok(Method::Get),
            b"POST" => Ok(Method::Post),
            b"PUT" => Ok(Method::Put),
            b"DELETE" => Ok(Method::Delete),
            b"OPTIONS" => Ok(Method::Options),
            _ => Err(Error::UnknownMethod(token.to_owned())),
        }
    }

    /// Wire text of the method.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Options => "OPTIONS",
        }
    }

    // Methods whose requests never carry a body.
    #[inline(always)]
    pub(crate) const fn is_bodyless(&self) -> bool {
        matches!(self, Method::Get | Method::Options)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// STATUS_CODE

macro_rules! set_status_codes {
    ($(
        $(#[$docs:meta])+
        $name:ident = ($num:literal, $str:literal);
    )+) => {
        /// HTTP status codes
        ///
        /// Every variant maps to exactly one status line, so writing a
        /// `StatusCode` can never fail. Numeric codes outside this table are
        /// rejected by [`StatusCode::try_from`] with [`Error::UnmappedStatus`].
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum StatusCode { $(
            #[doc = concat!(stringify!($num), " ", $str)]
            $(#[$docs])+
            $name = $num,
        )+ }

        impl StatusCode {
            /// Returns the full status line (e.g., `"HTTP/1.1 200 OK\r\n"`).
            #[inline]
            pub const fn status_line(&self) -> &'static str {
                match self { $(
                    StatusCode::$name => concat!("HTTP/1.1 ", $num, " ", $str, "\r\n"),
                )+ }
            }

            /// Returns the reason phrase (e.g., `"Not Found"`).
            #[inline]
            pub const fn reason(&self) -> &'static str {
                match self { $(
                    StatusCode::$name => $str,
                )+ }
            }
        }

        impl TryFrom<u16> for StatusCode {
            type Error = Error;

            fn try_from(code: u16) -> Result<Self, Error> {
                match code {
                    $( $num => Ok(StatusCode::$name), )+
                    _ => Err(Error::UnmappedStatus(code)),
                }
            }
        }
    }
}

set_status_codes! {
    /// [[RFC9110, Section 15.2.1](https://datatracker.ietf.org/doc/html/rfc9110#section-15.2.1)]
    Continue = (100, "Continue");

    /// [[RFC9110, Section 15.3.1](https://datatracker.ietf.org/doc/html/rfc9110#section-15.3.1)]
    Ok = (200, "OK");
    /// [[RFC9110, Section 15.3.2](https://datatracker.ietf.org/doc/html/rfc9110#section-15.3.2)]
    Created = (201, "Created");
    /// [[RFC9110, Section 15.3.5](https://datatracker.ietf.org/doc/html/rfc9110#section-15.3.5)]
    NoContent = (204, "No Content");

    /// [[RFC9110, Section 15.4.2](https://datatracker.ietf.org/doc/html/rfc9110#section-15.4.2)]
    MovedPermanently = (301, "Moved Permanently");
    /// [[RFC9110, Section 15.4.3](https://datatracker.ietf.org/doc/html/rfc9110#section-15.4.3)]
    Found = (302, "Found");
    /// [[RFC9110, Section 15.4.5](https://datatracker.ietf.org/doc/html/rfc9110#section-15.4.5)]
    NotModified = (304, "Not Modified");

    /// [[RFC9110, Section 15.5.1](https://datatracker.ietf.org/doc/html/rfc9110#section-15.5.1)]
    BadRequest = (400, "Bad Request");
    /// [[RFC9110, Section 15.5.2](https://datatracker.ietf.org/doc/html/rfc9110#section-15.5.2)]
    Unauthorized = (401, "Unauthorized");
    /// [[RFC9110, Section 15.5.4](https://datatracker.ietf.org/doc/html/rfc9110#section-15.5.4)]
    Forbidden = (403, "Forbidden");
    /// [[RFC9110, Section 15.5.5](https://datatracker.ietf.org/doc/html/rfc9110#section-15.5.5)]
    NotFound = (404, "Not Found");
    /// [[RFC9110, Section 15.5.6](https://datatracker.ietf.org/doc/html/rfc9110#section-15.5.6)]
    MethodNotAllowed = (405, "Method Not Allowed");
    /// [[RFC9110, Section 15.5.14](https://datatracker.ietf.org/doc/html/rfc9110#section-15.5.14)]
    PayloadTooLarge = (413, "Payload Too Large");

    /// [[RFC9110, Section 15.6.1](https://datatracker.ietf.org/doc/html/rfc9110#section-15.6.1)]
    InternalServerError = (500, "Internal Server Error");
    /// [[RFC9110, Section 15.6.2](https://datatracker.ietf.org/doc/html/rfc9110#section-15.6.2)]
    NotImplemented = (501, "Not Implemented");
    /// [[RFC9110, Section 15.6.4](https://datatracker.ietf.org/doc/html/rfc9110#section-15.6.4)]
    ServiceUnavailable = (503, "Service Unavailable");
}

impl StatusCode {
    /// Numeric value of the code.
    #[inline(always)]
    pub const fn code(&self) -> u16 {
        *self as u16
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code(), self.reason())
    }
}

// HEADER_NAME

macro_rules! set_header_names {
    ($(
        $(#[$docs:meta])*
        $name:ident = $wire:literal;
    )+) => {
        /// Header names addressable through the typed accessors
        ///
        /// Any other header is still kept in the raw header map of a
        /// [`Request`](crate::Request), it just has no variant here.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum HeaderName { $(
            #[doc = concat!("`", $wire, "`")]
            $(#[$docs])*
            $name,
        )+ }

        impl HeaderName {
            /// Wire text of the header name (e.g., `"Content-Type"`).
            #[inline]
            pub const fn as_str(&self) -> &'static str {
                match self { $(
                    HeaderName::$name => $wire,
                )+ }
            }

            /// Maps wire text back to a header name, ignoring ASCII case.
            ///
            /// Fails with [`Error::UnmappedHeaderName`] for any other text.
            pub fn from_wire(text: &str) -> Result<Self, Error> {
                $(
                    if text.eq_ignore_ascii_case($wire) {
                        return Ok(HeaderName::$name);
                    }
                )+
                Err(Error::UnmappedHeaderName(text.to_owned()))
            }
        }
    }
}

set_header_names! {
    ContentType = "Content-Type";
    ContentLength = "Content-Length";
    /// Sent as `Connection: close` when a response does not set it.
    Connection = "Connection";
    CacheControl = "Cache-Control";
    Pragma = "Pragma";
    Expires = "Expires";
    AccessControlAllowOrigin = "Access-Control-Allow-Origin";
    AccessControlAllowHeaders = "Access-Control-Allow-Headers";
    AccessControlAllowMethods = "Access-Control-Allow-Methods";
    AccessControlAllowCredentials = "Access-Control-Allow-Credentials";
}

impl fmt::Display for HeaderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_tokens() {
        #[rustfmt::skip]
        let cases = [
            ("GET",     Method::Get),
            ("POST",    Method::Post),
            ("PUT",     Method::Put),
            ("DELETE",  Method::Delete),
            ("OPTIONS", Method::Options),
        ];

        for (token, method) in cases {
            assert_eq!(Method::from_token(token), Ok(method));
            assert_eq!(method.as_str(), token);
        }
    }

    #[test]
    fn unknown_methods() {
        for token in ["HEAD", "PATCH", "TRACE", "get", "", "GET "] {
            assert_eq!(
                Method::from_token(token),
                Err(Error::UnknownMethod(token.to_owned()))
            );
        }
    }

    #[test]
    fn bodyless_methods() {
        assert!(Method::Get.is_bodyless());
        assert!(Method::Options.is_bodyless());
        assert!(!Method::Post.is_bodyless());
        assert!(!Method::Put.is_bodyless());
        assert!(!Method::Delete.is_bodyless());
    }

    #[test]
    fn status_lines() {
        #[rustfmt::skip]
        let cases = [
            (StatusCode::Continue,            "HTTP/1.1 100 Continue\r\n"),
            (StatusCode::Ok,                  "HTTP/1.1 200 OK\r\n"),
            (StatusCode::NoContent,           "HTTP/1.1 204 No Content\r\n"),
            (StatusCode::NotFound,            "HTTP/1.1 404 Not Found\r\n"),
            (StatusCode::InternalServerError, "HTTP/1.1 500 Internal Server Error\r\n"),
        ];

        for (status, line) in cases {
            assert_eq!(status.status_line(), line);
        }
    }

    #[test]
    fn status_from_number() {
        assert_eq!(StatusCode::try_from(200u16), Ok(StatusCode::Ok));
        assert_eq!(StatusCode::try_from(404u16), Ok(StatusCode::NotFound));
        assert_eq!(StatusCode::NotFound.code(), 404);
        assert_eq!(StatusCode::NotFound.to_string(), "404 Not Found");

        for code in [0u16, 299, 418, 999] {
            assert_eq!(StatusCode::try_from(code), Err(Error::UnmappedStatus(code)));
        }
    }

    #[test]
    fn header_names_map_both_ways() {
        #[rustfmt::skip]
        let names = [
            HeaderName::ContentType,              HeaderName::ContentLength,
            HeaderName::Connection,               HeaderName::CacheControl,
            HeaderName::Pragma,                   HeaderName::Expires,
            HeaderName::AccessControlAllowOrigin, HeaderName::AccessControlAllowHeaders,
            HeaderName::AccessControlAllowMethods,
            HeaderName::AccessControlAllowCredentials,
        ];

        for name in names {
            assert_eq!(HeaderName::from_wire(name.as_str()), Ok(name));
            assert_eq!(HeaderName::from_wire(&name.as_str().to_lowercase()), Ok(name));
        }
    }

    #[test]
    fn unmapped_header_name() {
        assert_eq!(
            HeaderName::from_wire("X-Request-Id"),
            Err(Error::UnmappedHeaderName("X-Request-Id".to_owned()))
        );
    }
}
