//! URL query string parser with percent-decoded values.

use crate::errors::Error;
use memchr::memchr;
use std::borrow::Cow;

/// Ordered query parameters of one request target.
///
/// Keys are kept as written, values are percent-decoded (`+` reads as a
/// space). A segment without `=` yields a key with no value. Duplicates are
/// kept in source order and every key lookup ignores ASCII case.
///
/// # Examples
/// ```rust
/// use embed_http::query::QueryParams;
///
/// let query = QueryParams::parse("a=1&flag&b=hello%20world&a=3");
///
/// assert_eq!(query.len(), 4);
/// assert!(query.contains("FLAG"));
/// assert_eq!(query.get_all("a").collect::<Vec<_>>(), [Some("1"), Some("3")]);
/// assert_eq!(query.single("b").unwrap(), Some("hello world"));
/// assert!(query.single("a").is_err()); // two matches
/// ```
/// All possible formats:
/// ```rust
/// use embed_http::query::QueryParams;
///
/// let query = QueryParams::parse("debug&name=&=Qwe&&key=a=b");
/// let params: Vec<_> = query.iter().collect();
///
/// assert_eq!(
///     params,
///     [
///         ("debug", None),
///         ("name", Some("")),
///         ("", Some("Qwe")),
///         ("key", Some("a=b")),
///     ]
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, Option<String>)>);

impl QueryParams {
    /// Parses a raw query string (the part after `?`, without it).
    ///
    /// Empty segments are discarded. Each segment is split on its first `=`.
    /// Escapes that do not decode to UTF-8 are left as written.
    pub fn parse(raw: &str) -> Self {
        let data = raw.as_bytes();
        let mut params = Vec::new();

        let mut start = 0;
        while start < data.len() {
            let end = memchr(b'&', &data[start..])
                .map(|pos| start + pos)
                .unwrap_or(data.len());

            if end > start {
                let segment = &raw[start..end];

                let param = match memchr(b'=', segment.as_bytes()) {
                    Some(i) => (segment[..i].to_owned(), Some(decode(&segment[i + 1..]))),
                    None => (segment.to_owned(), None),
                };
                params.push(param);
            }

            start = end + 1;
        }

        QueryParams(params)
    }

    /// Number of parameters, duplicates included.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// All parameters in source order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    /// Checks whether any parameter has the key `key`.
    #[inline]
    pub fn contains(&self, key: &str) -> bool {
        self.any(|k| k.eq_ignore_ascii_case(key))
    }

    /// Checks whether any parameter key satisfies `predicate`.
    #[inline]
    pub fn any<P: Fn(&str) -> bool>(&self, predicate: P) -> bool {
        self.0.iter().any(|(k, _)| predicate(k))
    }

    /// Values of every parameter with the key `key`, in source order.
    ///
    /// The iterator is lazy and can be recreated at will.
    #[inline]
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = Option<&'a str>> + 'a {
        self.filter(move |k| k.eq_ignore_ascii_case(key))
    }

    /// Values of every parameter whose key satisfies `predicate`, in source order.
    #[inline]
    pub fn filter<'a, P>(&'a self, predicate: P) -> impl Iterator<Item = Option<&'a str>> + 'a
    where
        P: Fn(&str) -> bool + 'a,
    {
        self.0
            .iter()
            .filter(move |(k, _)| predicate(k))
            .map(|(_, v)| v.as_deref())
    }

    /// Value of the only parameter with the key `key`.
    ///
    /// - no match: `Ok(None)`
    /// - one match without a value: `Ok(None)`
    /// - one match: `Ok(Some(value))`
    /// - several matches: [`Error::AmbiguousParameter`]
    pub fn single(&self, key: &str) -> Result<Option<&str>, Error> {
        let mut matches = self
            .0
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_deref());

        match (matches.next(), matches.next()) {
            (None, _) => Ok(None),
            (Some(value), None) => Ok(value),
            (Some(_), Some(_)) => Err(Error::AmbiguousParameter(key.to_owned())),
        }
    }
}

#[inline]
fn decode(value: &str) -> String {
    let value: Cow<str> = match memchr(b'+', value.as_bytes()) {
        Some(_) => Cow::Owned(value.replace('+', " ")),
        None => Cow::Borrowed(value),
    };

    let decoded = urlencoding::decode(&value).map(Cow::into_owned);
    decoded.unwrap_or_else(|_| value.into_owned())
}
