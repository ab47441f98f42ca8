use std::time::Duration;

use super::*;

#[test]
fn test_version_starts_at_zero_and_steps_by_one() {
    let v = Version::INITIAL;
    assert_eq!(v.get(), 0);
    assert_eq!(v.next().get(), 1);
    assert_eq!(v.next().next().get(), 2);
}

#[test]
fn test_etag_is_quoted_decimal() {
    assert_eq!(Version::INITIAL.etag(), "\"0\"");
    assert_eq!(Version::INITIAL.next().etag(), "\"1\"");
}

#[test]
fn test_matches_tag() {
    let v = Version::INITIAL.next();

    assert!(v.matches_tag(Some("1")));
    assert!(!v.matches_tag(Some("0")));
    assert!(!v.matches_tag(Some("01")));
    assert!(!v.matches_tag(Some("\"1\"")));
    assert!(!v.matches_tag(None));
}

#[test]
fn test_parse_if_none_match_strips_quotes() {
    assert_eq!(parse_if_none_match("\"7\""), Some("7".to_string()));
    assert_eq!(parse_if_none_match("  \"7\"  "), Some("7".to_string()));
    assert_eq!(parse_if_none_match("W/\"7\""), Some("7".to_string()));
    assert_eq!(parse_if_none_match("7"), Some("7".to_string()));
}

#[test]
fn test_parse_if_none_match_rejects_wildcards_and_lists() {
    assert_eq!(parse_if_none_match(""), None);
    assert_eq!(parse_if_none_match("*"), None);
    assert_eq!(parse_if_none_match("\"1\", \"2\""), None);
}

#[test]
fn test_parse_prefer_wait() {
    assert_eq!(parse_prefer_wait("wait=5"), Some(Duration::from_secs(5)));
    assert_eq!(parse_prefer_wait("wait=0"), Some(Duration::ZERO));
    assert_eq!(
        parse_prefer_wait("respond-async, wait=90"),
        Some(Duration::from_secs(90))
    );
    assert_eq!(
        parse_prefer_wait("return=minimal; wait = 3"),
        Some(Duration::from_secs(3))
    );
}

#[test]
fn test_parse_prefer_wait_ignores_invalid_values() {
    assert_eq!(parse_prefer_wait(""), None);
    assert_eq!(parse_prefer_wait("respond-async"), None);
    assert_eq!(parse_prefer_wait("wait=-1"), None);
    assert_eq!(parse_prefer_wait("wait=soon"), None);
    assert_eq!(parse_prefer_wait("handling=lenient"), None);
}
