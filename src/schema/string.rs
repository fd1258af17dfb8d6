use std::net::{Ipv4Addr, Ipv6Addr};

use chrono::{DateTime, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::pointer::Pointer;

#[derive(Debug, Clone, Default)]
pub struct StringConstraints {
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub pattern: Option<Pattern>,
    pub format: Option<Format>,
}

/// A `pattern` keyword: matched against the whole string unless the source
/// carries its own `^` or `$` anchor.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(source)?;
        let regex = if is_anchored(source) {
            regex
        } else {
            Regex::new(&format!("^(?:{source})$"))?
        };
        Ok(Self { source: source.to_string(), regex })
    }

    /// The pattern as written in the schema.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, s: &str) -> bool {
        self.regex.is_match(s)
    }
}

fn is_anchored(source: &str) -> bool {
    source.starts_with('^') || (source.ends_with('$') && !source.ends_with("\\$"))
}

/// Well-known string formats. Checks are best-effort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    DateTime,
    Time,
    Date,
    Email,
    IdnEmail,
    Hostname,
    IdnHostname,
    Ipv4,
    Ipv6,
    Uri,
    UriReference,
    Iri,
    IriReference,
    UriTemplate,
    JsonPointer,
    RelativeJsonPointer,
    Regex,
    String,
}

impl Format {
    pub const ALL: [Format; 18] = [
        Format::DateTime,
        Format::Time,
        Format::Date,
        Format::Email,
        Format::IdnEmail,
        Format::Hostname,
        Format::IdnHostname,
        Format::Ipv4,
        Format::Ipv6,
        Format::Uri,
        Format::UriReference,
        Format::Iri,
        Format::IriReference,
        Format::UriTemplate,
        Format::JsonPointer,
        Format::RelativeJsonPointer,
        Format::Regex,
        Format::String,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Format::DateTime => "date-time",
            Format::Time => "time",
            Format::Date => "date",
            Format::Email => "email",
            Format::IdnEmail => "idn-email",
            Format::Hostname => "hostname",
            Format::IdnHostname => "idn-hostname",
            Format::Ipv4 => "ipv4",
            Format::Ipv6 => "ipv6",
            Format::Uri => "uri",
            Format::UriReference => "uri-reference",
            Format::Iri => "iri",
            Format::IriReference => "iri-reference",
            Format::UriTemplate => "uri-template",
            Format::JsonPointer => "json-pointer",
            Format::RelativeJsonPointer => "relative-json-pointer",
            Format::Regex => "regex",
            Format::String => "string",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    pub fn matches(self, s: &str) -> bool {
        match self {
            Format::DateTime => DateTime::parse_from_rfc3339(s).is_ok(),
            Format::Time => is_time(s),
            Format::Date => DATE.is_match(s) && NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok(),
            Format::Email => is_email(s, true),
            Format::IdnEmail => is_email(s, false),
            Format::Hostname => is_hostname(s, true),
            Format::IdnHostname => is_hostname(s, false),
            Format::Ipv4 => s.parse::<Ipv4Addr>().is_ok(),
            Format::Ipv6 => s.parse::<Ipv6Addr>().is_ok(),
            Format::Uri => s.is_ascii() && is_uri(s),
            Format::Iri => is_uri(s),
            Format::UriReference => s.is_ascii() && is_uri_reference(s),
            Format::IriReference => is_uri_reference(s),
            Format::UriTemplate => is_uri_template(s),
            Format::JsonPointer => Pointer::parse(s).is_ok(),
            Format::RelativeJsonPointer => is_relative_json_pointer(s),
            Format::Regex => Regex::new(s).is_ok(),
            Format::String => true,
        }
    }
}

static DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("static regex"));

static TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{2}:\d{2}:\d{2}(\.\d+)?([Zz]|[+-]\d{2}:\d{2})$").expect("static regex")
});

static EMAIL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([^\s@]+)@([^\s@]+)$").expect("static regex"));

static REFERENCE_BASE: Lazy<Option<Url>> = Lazy::new(|| Url::parse("http://reference.invalid/").ok());

fn is_time(s: &str) -> bool {
    // borrow chrono's range checks by anchoring the time to an arbitrary date
    TIME.is_match(s) && DateTime::parse_from_rfc3339(&format!("1970-01-01T{s}")).is_ok()
}

fn is_email(s: &str, ascii: bool) -> bool {
    if ascii && !s.is_ascii() {
        return false;
    }
    let Some(caps) = EMAIL.captures(s) else {
        return false;
    };
    let local = &caps[1];
    let domain = &caps[2];
    if local.len() > 64 || local.starts_with('.') || local.ends_with('.') || local.contains("..") {
        return false;
    }
    match domain.strip_prefix('[').and_then(|d| d.strip_suffix(']')) {
        Some(literal) => {
            literal.parse::<Ipv4Addr>().is_ok()
                || literal
                    .strip_prefix("IPv6:")
                    .is_some_and(|v6| v6.parse::<Ipv6Addr>().is_ok())
        }
        None => is_hostname(domain, ascii),
    }
}

fn is_hostname(s: &str, ascii: bool) -> bool {
    let s = s.strip_suffix('.').unwrap_or(s);
    if s.is_empty() || s.len() > 253 {
        return false;
    }
    s.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| {
                c == '-' || if ascii { c.is_ascii_alphanumeric() } else { c.is_alphanumeric() }
            })
    })
}

fn is_uri(s: &str) -> bool {
    !s.chars().any(char::is_whitespace) && Url::parse(s).is_ok()
}

fn is_uri_reference(s: &str) -> bool {
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    Url::parse(s).is_ok()
        || REFERENCE_BASE
            .as_ref()
            .is_some_and(|base| base.join(s).is_ok())
}

fn is_uri_template(s: &str) -> bool {
    let mut open = false;
    for c in s.chars() {
        match c {
            '{' if open => return false,
            '{' => open = true,
            '}' if !open => return false,
            '}' => open = false,
            _ => {}
        }
    }
    !open
}

fn is_relative_json_pointer(s: &str) -> bool {
    let digits = s.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 || (digits > 1 && s.starts_with('0')) {
        return false;
    }
    let rest = &s[digits..];
    rest == "#" || Pointer::parse(rest).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patterns_match_whole_strings_unless_anchored() {
        let digits = Pattern::new("[0-9]+").unwrap();
        assert!(digits.is_match("123"));
        assert!(!digits.is_match("abc123def"));
        assert_eq!(digits.as_str(), "[0-9]+");

        let alternation = Pattern::new("cat|dog").unwrap();
        assert!(alternation.is_match("dog"));
        assert!(!alternation.is_match("hotdog"));

        let prefix = Pattern::new("^ab").unwrap();
        assert!(prefix.is_match("abc"));
        let suffix = Pattern::new("[0-9]$").unwrap();
        assert!(suffix.is_match("abc1"));
        let dollar = Pattern::new("cost \\$").unwrap();
        assert!(!dollar.is_match("the cost $"));
        assert!(dollar.is_match("cost $"));

        assert!(Pattern::new("(unclosed").is_err());
    }

    #[test]
    fn names_round_trip() {
        for f in Format::ALL {
            assert_eq!(Format::from_name(f.name()), Some(f));
        }
        assert_eq!(Format::from_name("color"), None);
    }

    #[test]
    fn dates_and_times() {
        assert!(Format::DateTime.matches("2024-02-29T12:30:00Z"));
        assert!(Format::DateTime.matches("2024-02-29T12:30:00.25+02:00"));
        assert!(!Format::DateTime.matches("2023-02-29T12:30:00Z"));
        assert!(Format::Date.matches("2024-01-05"));
        assert!(!Format::Date.matches("2024-1-5"));
        assert!(!Format::Date.matches("2024-13-01"));
        assert!(Format::Time.matches("08:15:00Z"));
        assert!(Format::Time.matches("23:59:59.5-05:00"));
        assert!(!Format::Time.matches("25:00:00Z"));
        assert!(!Format::Time.matches("08:15:00"));
    }

    #[test]
    fn hosts_and_addresses() {
        assert!(Format::Hostname.matches("api.example.com"));
        assert!(!Format::Hostname.matches("-bad.example.com"));
        assert!(!Format::Hostname.matches("bücher.example"));
        assert!(Format::IdnHostname.matches("bücher.example"));
        assert!(!Format::Hostname.matches(&"a".repeat(64)));
        assert!(Format::Ipv4.matches("192.168.0.1"));
        assert!(!Format::Ipv4.matches("256.0.0.1"));
        assert!(Format::Ipv6.matches("::1"));
        assert!(!Format::Ipv6.matches("12345::"));
    }

    #[test]
    fn emails() {
        assert!(Format::Email.matches("joe.bloggs@example.com"));
        assert!(Format::Email.matches("joe@[127.0.0.1]"));
        assert!(!Format::Email.matches("joe..bloggs@example.com"));
        assert!(!Format::Email.matches("no-at-sign"));
        assert!(!Format::Email.matches("jöe@example.com"));
        assert!(Format::IdnEmail.matches("jöe@bücher.example"));
    }

    #[test]
    fn uris_and_pointers() {
        assert!(Format::Uri.matches("https://example.com/a?b=c#d"));
        assert!(!Format::Uri.matches("/relative/path"));
        assert!(!Format::Uri.matches("https://example.com/a b"));
        assert!(Format::UriReference.matches("/relative/path"));
        assert!(Format::UriReference.matches("#fragment"));
        assert!(Format::Iri.matches("https://例え.テスト/パス"));
        assert!(!Format::Uri.matches("https://例え.テスト/パス"));
        assert!(Format::UriTemplate.matches("http://example.com/{user}/items{?page}"));
        assert!(!Format::UriTemplate.matches("http://example.com/{user"));
        assert!(!Format::UriTemplate.matches("{a{b}}"));
        assert!(Format::JsonPointer.matches("/a~1b/0"));
        assert!(!Format::JsonPointer.matches("a/b"));
        assert!(Format::RelativeJsonPointer.matches("0#"));
        assert!(Format::RelativeJsonPointer.matches("1/a/b"));
        assert!(!Format::RelativeJsonPointer.matches("01/a"));
        assert!(!Format::RelativeJsonPointer.matches("/a"));
        assert!(Format::Regex.matches("^[a-z]+$"));
        assert!(!Format::Regex.matches("(unclosed"));
    }
}
