//! JSON Pointer (RFC 6901) paths for documents and schemas.
use std::fmt;

use percent_encoding::percent_decode_str;
use serde::{Serialize, Serializer};

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pointer(Vec<String>);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PointerError {
    #[error("pointer must be empty or start with `/`")]
    MissingSlash,
    #[error("invalid escape in segment `{0}`")]
    BadEscape(String),
}

impl Pointer {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn push(&mut self, segment: impl Into<String>) {
        self.0.push(segment.into());
    }

    pub fn pop(&mut self) -> Option<String> {
        self.0.pop()
    }

    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut out = self.clone();
        out.push(segment);
        out
    }

    pub fn index(&self, index: usize) -> Self {
        self.child(index.to_string())
    }

    /// `self` relative to `prefix`, if `prefix` is an ancestor (or equal).
    pub fn strip_prefix(&self, prefix: &Pointer) -> Option<Pointer> {
        self.0
            .strip_prefix(prefix.0.as_slice())
            .map(|rest| Pointer(rest.to_vec()))
    }

    /// Parse the string form: `""` is the root, otherwise `/`-separated escaped segments.
    pub fn parse(src: &str) -> Result<Self, PointerError> {
        if src.is_empty() {
            return Ok(Self::root());
        }
        let Some(rest) = src.strip_prefix('/') else {
            return Err(PointerError::MissingSlash);
        };
        rest.split('/')
            .map(unescape_segment)
            .collect::<Result<Vec<_>, _>>()
            .map(Pointer)
    }

    /// Parse a URI fragment (without the leading `#`), percent-decoding first.
    pub fn from_fragment(fragment: &str) -> Option<Self> {
        let decoded = percent_decode(fragment)?;
        Self::parse(&decoded).ok()
    }

    /// `#`-prefixed form used in human-facing messages.
    pub fn fragment(&self) -> String {
        format!("#{self}")
    }
}

fn unescape_segment(segment: &str) -> Result<String, PointerError> {
    let mut out = String::with_capacity(segment.len());
    let mut chars = segment.chars();
    while let Some(c) = chars.next() {
        if c != '~' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('0') => out.push('~'),
            Some('1') => out.push('/'),
            _ => return Err(PointerError::BadEscape(segment.to_string())),
        }
    }
    Ok(out)
}

/// Decode `%XX` escapes; anything that is not a valid escape stays literal.
pub(crate) fn percent_decode(src: &str) -> Option<String> {
    percent_decode_str(src)
        .decode_utf8()
        .ok()
        .map(|decoded| decoded.into_owned())
}

impl fmt::Display for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.0 {
            f.write_str("/")?;
            f.write_str(&segment.replace('~', "~0").replace('/', "~1"))?;
        }
        Ok(())
    }
}

impl Serialize for Pointer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
