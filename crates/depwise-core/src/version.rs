//! Version parsing and comparison for npm-style version strings.
//!
//! Parsing is lenient on the front (any run of `^ ~ > = <` is stripped) and
//! strict on the shape: the remainder must start with `major.minor.patch`.
//! A trailing `-prerelease` is captured but never used for ordering, so
//! `1.0.0-beta` and `1.0.0` compare equal.

use crate::types::UpdateType;
use std::cmp::Ordering;

/// A parsed `major.minor.patch[-prerelease]` version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub prerelease: Option<String>,
}

fn strip_range_operators(text: &str) -> &str {
    text.trim_start_matches(['^', '~', '>', '=', '<'])
}

/// Consume a run of ASCII digits from the front of `text`.
fn take_number(text: &str) -> Option<(u64, &str)> {
    let end = text
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    if end == 0 {
        return None;
    }
    let value = text[..end].parse().ok()?;
    Some((value, &text[end..]))
}

/// Parse the `digits.digits.digits` prefix of an unstripped string.
fn parse_core(text: &str) -> Option<ParsedVersion> {
    let (major, rest) = take_number(text)?;
    let (minor, rest) = take_number(rest.strip_prefix('.')?)?;
    let (patch, rest) = take_number(rest.strip_prefix('.')?)?;

    let prerelease = rest
        .strip_prefix('-')
        .filter(|pre| !pre.is_empty())
        .map(str::to_string);

    Some(ParsedVersion {
        major,
        minor,
        patch,
        prerelease,
    })
}

/// Parse a version, stripping leading range operators first.
///
/// Returns `None` when the remaining text does not start with
/// `digits.digits.digits`.
pub fn parse_version(text: &str) -> Option<ParsedVersion> {
    parse_core(strip_range_operators(text))
}

/// Compare two versions by major, minor, then patch.
///
/// Prerelease tags are ignored. If either side fails to parse the versions
/// compare equal.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    match (parse_version(a), parse_version(b)) {
        (Some(va), Some(vb)) => (va.major, va.minor, va.patch).cmp(&(vb.major, vb.minor, vb.patch)),
        _ => Ordering::Equal,
    }
}

/// Classify the update from `current` to `latest`.
///
/// Returns [`UpdateType::None`] when either version fails to parse or when
/// `latest` is not newer than `current`. Otherwise the highest-order field
/// that increased decides the kind.
pub fn classify_update(current: &str, latest: &str) -> UpdateType {
    let (Some(c), Some(l)) = (parse_version(current), parse_version(latest)) else {
        return UpdateType::None;
    };

    if compare_versions(current, latest) != Ordering::Less {
        return UpdateType::None;
    }

    if l.major > c.major {
        UpdateType::Major
    } else if l.minor > c.minor {
        UpdateType::Minor
    } else if l.patch > c.patch {
        UpdateType::Patch
    } else {
        UpdateType::None
    }
}

/// Strip leading range operators from a declared version range.
pub fn clean_version(version: &str) -> String {
    strip_range_operators(version).to_string()
}

/// Keep a tool-reported version only if it is numeric-dotted; otherwise empty.
pub fn normalize_version(version: &str) -> String {
    let version = version.trim();
    if parse_core(version).is_some() {
        version.to_string()
    } else {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triple(v: &ParsedVersion) -> (u64, u64, u64) {
        (v.major, v.minor, v.patch)
    }

    #[test]
    fn test_parse_strips_range_operators() {
        for input in ["^1.2.3", "~1.2.3", ">=1.2.3", "1.2.3", "<=1.2.3", "=1.2.3"] {
            let parsed = parse_version(input).unwrap();
            assert_eq!(triple(&parsed), (1, 2, 3), "input {input}");
        }
    }

    #[test]
    fn test_parse_rejects_non_versions() {
        assert!(parse_version("not-a-version").is_none());
        assert!(parse_version("1.2").is_none());
        assert!(parse_version("latest").is_none());
        assert!(parse_version("*").is_none());
        assert!(parse_version("").is_none());
    }

    #[test]
    fn test_parse_captures_prerelease() {
        let parsed = parse_version("2.0.0-rc.1").unwrap();
        assert_eq!(parsed.prerelease.as_deref(), Some("rc.1"));
        assert!(parse_version("2.0.0").unwrap().prerelease.is_none());
    }

    #[test]
    fn test_compare_ignores_prerelease() {
        assert_eq!(compare_versions("1.0.0-beta", "1.0.0"), Ordering::Equal);
        assert_eq!(compare_versions("1.0.0", "1.0.1"), Ordering::Less);
        assert_eq!(compare_versions("2.0.0", "1.9.9"), Ordering::Greater);
        assert_eq!(compare_versions("1.10.0", "1.9.0"), Ordering::Greater);
    }

    #[test]
    fn test_compare_unparseable_is_equal() {
        assert_eq!(compare_versions("garbage", "1.0.0"), Ordering::Equal);
    }

    #[test]
    fn test_classify_update() {
        assert_eq!(classify_update("1.0.0", "2.0.0"), UpdateType::Major);
        assert_eq!(classify_update("1.9.9", "2.0.0"), UpdateType::Major);
        assert_eq!(classify_update("1.0.0", "1.1.0"), UpdateType::Minor);
        assert_eq!(classify_update("1.0.5", "1.1.0"), UpdateType::Minor);
        assert_eq!(classify_update("1.0.0", "1.0.1"), UpdateType::Patch);
        assert_eq!(classify_update("^1.0.0", "1.0.1"), UpdateType::Patch);
        assert_eq!(classify_update("1.0.0", "1.0.0"), UpdateType::None);
        assert_eq!(classify_update("2.0.0", "1.0.0"), UpdateType::None);
        assert_eq!(classify_update("workspace:*", "1.0.0"), UpdateType::None);
    }

    #[test]
    fn test_clean_version() {
        assert_eq!(clean_version("^1.2.3"), "1.2.3");
        assert_eq!(clean_version(">=1.2.3"), "1.2.3");
        assert_eq!(clean_version("latest"), "latest");
    }
}
