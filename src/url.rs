//! Endpoint templates and URL helpers.
//!
//! Templates use positional slots `{0}`, `{1}` and `{2}`. Media services
//! templates put the subscription name in `{0}` and object ids after it;
//! account templates put the customer id in `{0}` and the subscription id in
//! `{1}`. Every render checks that the caller supplied exactly as many values
//! as the template has slots.

use std::fmt;

use crate::errors::{MkioError, Result};

const MAX_SLOTS: usize = 3;

/// An immutable path pattern such as `api/ams/{0}/assets/{1}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointTemplate {
    pattern: &'static str,
}

impl EndpointTemplate {
    /// Wrap a pattern. Slot validation happens on [`render`](Self::render).
    pub const fn new(pattern: &'static str) -> Self {
        Self { pattern }
    }

    /// The raw pattern.
    pub fn pattern(&self) -> &'static str {
        self.pattern
    }

    /// Number of slots, `{0}` included. Slots must be contiguous from `{0}`.
    pub fn slots(&self) -> Result<usize> {
        let mut seen = [false; MAX_SLOTS];
        for segment in Segments::new(self.pattern) {
            if let Segment::Slot(n) = segment? {
                seen[n] = true;
            }
        }

        let count = seen.iter().take_while(|s| **s).count();
        if seen[count..].iter().any(|s| *s) {
            return Err(MkioError::ContractViolation(format!(
                "template `{}` has non-contiguous slots",
                self.pattern
            )));
        }
        Ok(count)
    }

    /// Number of id slots (`{1}`, `{2}`); the subscription slot is not counted.
    pub fn id_slots(&self) -> Result<usize> {
        match self.slots()? {
            0 => Err(MkioError::ContractViolation(format!(
                "template `{}` has no subscription slot {{0}}",
                self.pattern
            ))),
            n => Ok(n - 1),
        }
    }

    /// Substitute the subscription and ids and prefix the base URL.
    ///
    /// Ids are percent-encoded as path segments. Supplying a different number
    /// of ids than the template has id slots is a
    /// [`MkioError::ContractViolation`].
    pub fn render(&self, base_url: &str, subscription: &str, ids: &[&str]) -> Result<String> {
        let expected = self.id_slots()?;
        if ids.len() != expected {
            return Err(MkioError::ContractViolation(format!(
                "template `{}` takes {expected} id(s), got {}",
                self.pattern,
                ids.len()
            )));
        }

        let mut values = Vec::with_capacity(ids.len() + 1);
        values.push(subscription);
        values.extend_from_slice(ids);
        self.render_slots(base_url, &values)
    }

    /// Substitute `values` into the slots in order, `{0}` included.
    ///
    /// Used for templates whose leading slots are not the subscription name,
    /// such as account-level paths.
    pub fn render_slots(&self, base_url: &str, values: &[&str]) -> Result<String> {
        let expected = self.slots()?;
        if values.len() != expected {
            return Err(MkioError::ContractViolation(format!(
                "template `{}` takes {expected} value(s), got {}",
                self.pattern,
                values.len()
            )));
        }

        let mut path = String::with_capacity(self.pattern.len() + 32);
        for segment in Segments::new(self.pattern) {
            match segment? {
                Segment::Literal(text) => path.push_str(text),
                Segment::Slot(n) => path.push_str(&urlencoding::encode(values[n])),
            }
        }

        Ok(join(base_url, &path))
    }
}

impl fmt::Display for EndpointTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.pattern)
    }
}

enum Segment<'a> {
    Literal(&'a str),
    Slot(usize),
}

struct Segments<'a> {
    pattern: &'static str,
    rest: &'a str,
}

impl<'a> Segments<'a> {
    fn new(pattern: &'static str) -> Self {
        Self {
            pattern,
            rest: pattern,
        }
    }
}

impl<'a> Iterator for Segments<'a> {
    type Item = Result<Segment<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }

        let Some(open) = self.rest.find('{') else {
            let literal = self.rest;
            self.rest = "";
            return Some(Ok(Segment::Literal(literal)));
        };

        if open > 0 {
            let literal = &self.rest[..open];
            self.rest = &self.rest[open..];
            return Some(Ok(Segment::Literal(literal)));
        }

        let slot = self.rest[1..]
            .find('}')
            .map(|close| &self.rest[1..=close])
            .and_then(|digits| match digits.as_bytes() {
                [d] if d.is_ascii_digit() => Some(usize::from(d - b'0')),
                _ => None,
            })
            .filter(|n| *n < MAX_SLOTS);

        match slot {
            Some(n) => {
                self.rest = &self.rest[3..];
                Some(Ok(Segment::Slot(n)))
            }
            None => {
                self.rest = "";
                Some(Err(MkioError::ContractViolation(format!(
                    "template `{}` has a malformed slot",
                    self.pattern
                ))))
            }
        }
    }
}

/// Join a base URL and a path with exactly one `/` between them.
pub(crate) fn join(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Append `name=value` to `url` when `value` is present.
///
/// Uses `?` if the URL has no query string yet and `&` otherwise. The value
/// is percent-encoded; the name is appended verbatim so OData names such as
/// `$orderby` stay readable.
pub fn add_query_param(url: &str, name: &str, value: Option<&str>) -> String {
    let Some(value) = value else {
        return url.to_string();
    };
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}{name}={}", urlencoding::encode(value))
}

/// Turn a next-page or monitor link into an absolute URL.
///
/// Absolute links are returned unchanged; relative ones are rendered against
/// the configured base URL, path included.
pub(crate) fn resolve_link(base_url: &str, link: &str) -> String {
    if link.starts_with("http://") || link.starts_with("https://") {
        return link.to_string();
    }
    join(base_url, link)
}
