//! Content types of fetched data.
//!
//! Unrecognized content is plain text unless a structured type is declared,
//! either by the backend or by the `type` URL query parameter.

use std::path::Path;
use url::Url;

/// Plain text, the fallback type.
pub const TEXT: &str = "text/plain";
/// JSON documents.
pub const JSON: &str = "application/json";
/// YAML documents.
pub const YAML: &str = "application/yaml";
/// Comma-separated values.
pub const CSV: &str = "text/csv";
/// TOML documents.
pub const TOML: &str = "application/toml";

/// Reserved query parameter forcing a content type.
pub const TYPE_PARAM: &str = "type";

/// Guess a content type from a file extension.
pub fn from_extension(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase());
    match ext.as_deref() {
        Some("json") => JSON,
        Some("yml") | Some("yaml") => YAML,
        Some("csv") => CSV,
        Some("toml") => TOML,
        _ => TEXT,
    }
}

/// Reduce a `Content-Type` header to its media type.
///
/// `application/json; charset=utf-8` becomes `application/json`.
pub fn from_header(value: &str) -> Option<String> {
    let essence = value.split(';').next()?.trim().to_ascii_lowercase();
    if essence.is_empty() {
        None
    } else {
        Some(essence)
    }
}

/// Split the `type` override off a URL.
///
/// Returns the URL without the parameter and the override, if present.
pub fn split_override(url: &Url) -> (Url, Option<String>) {
    let mut forced = None;
    let mut kept = Vec::new();
    for (key, value) in url.query_pairs() {
        if key == TYPE_PARAM {
            forced = Some(value.into_owned());
        } else {
            kept.push((key.into_owned(), value.into_owned()));
        }
    }

    let mut stripped = url.clone();
    if forced.is_none() {
        return (stripped, None);
    }
    if kept.is_empty() {
        stripped.set_query(None);
    } else {
        stripped.query_pairs_mut().clear().extend_pairs(kept);
    }
    (stripped, forced)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_sniffing() {
        assert_eq!(from_extension(Path::new("/d/config.json")), JSON);
        assert_eq!(from_extension(Path::new("/d/config.YAML")), YAML);
        assert_eq!(from_extension(Path::new("/d/config.yml")), YAML);
        assert_eq!(from_extension(Path::new("/d/data.csv")), CSV);
        assert_eq!(from_extension(Path::new("/d/Cargo.toml")), TOML);
        assert_eq!(from_extension(Path::new("/d/notes")), TEXT);
        assert_eq!(from_extension(Path::new("/d/notes.md")), TEXT);
    }

    #[test]
    fn header_drops_parameters() {
        assert_eq!(
            from_header("application/json; charset=utf-8").as_deref(),
            Some(JSON)
        );
        assert_eq!(from_header("  ").as_deref(), None);
    }

    #[test]
    fn split_override_removes_type_only() {
        let url = Url::parse("consul:///app?type=application/json&recurse=true").unwrap();
        let (stripped, forced) = split_override(&url);
        assert_eq!(forced.as_deref(), Some(JSON));
        assert_eq!(stripped.query(), Some("recurse=true"));
    }

    #[test]
    fn split_override_clears_empty_query() {
        let url = Url::parse("file:///data/x?type=text/csv").unwrap();
        let (stripped, forced) = split_override(&url);
        assert_eq!(forced.as_deref(), Some(CSV));
        assert_eq!(stripped.query(), None);
        assert_eq!(stripped.as_str(), "file:///data/x");
    }

    #[test]
    fn split_override_without_type() {
        let url = Url::parse("https://example.com/data.json").unwrap();
        let (stripped, forced) = split_override(&url);
        assert!(forced.is_none());
        assert_eq!(stripped, url);
    }
}
