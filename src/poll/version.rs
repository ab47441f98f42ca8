//! Collection version and its entity-tag encoding.
//!
//! The version is carried on the wire as a quoted decimal (`ETag: "3"`), read
//! back from `If-None-Match`, and compared as a plain string. Clients that send
//! anything that is not the current version are treated as never having seen
//! the collection.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

/// Monotonic counter of successful mutations since process start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct Version(u64);

impl Version {
    pub const INITIAL: Version = Version(0);

    pub fn get(self) -> u64 {
        self.0
    }

    pub(crate) fn next(self) -> Self {
        Version(self.0 + 1)
    }

    /// Quoted form written to the `ETag` header.
    pub fn etag(self) -> String {
        format!("\"{}\"", self.0)
    }

    /// True when a client's last-seen tag names exactly this version.
    pub fn matches_tag(
        self,
        tag: Option<&str>,
    ) -> bool {
        tag.is_some_and(|t| t == self.0.to_string())
    }
}

impl fmt::Display for Version {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Extracts the bare tag from an `If-None-Match` header value.
///
/// Strips surrounding whitespace, a weak `W/` prefix and the quotes. Returns
/// `None` for empty values, `*`, and lists of several tags, none of which can
/// name a single version.
pub fn parse_if_none_match(header: &str) -> Option<String> {
    let value = header.trim();
    let value = value.strip_prefix("W/").unwrap_or(value);
    if value.is_empty() || value == "*" || value.contains(',') {
        return None;
    }

    let bare = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value);
    Some(bare.to_string())
}

/// Finds a `wait=<seconds>` preference in a `Prefer` header value.
///
/// Preferences may be separated by commas or semicolons. A missing token, a
/// negative or non-numeric value all mean the client does not want to wait.
pub fn parse_prefer_wait(header: &str) -> Option<Duration> {
    header
        .split([',', ';'])
        .filter_map(|token| {
            let (name, value) = token.split_once('=')?;
            if !name.trim().eq_ignore_ascii_case("wait") {
                return None;
            }
            value.trim().trim_matches('"').parse::<u64>().ok()
        })
        .next()
        .map(Duration::from_secs)
}
