//! Feed description documents.
//!
//! A description is a [`Feed`] written out as TOML or JSON, for example:
//!
//! ```toml
//! title = "My blog"
//! link = "https://example.com/"
//! pub_date = "2024-05-01T10:00:00Z"
//!
//! [[authors]]
//! name = "Jo"
//!
//! [[entries]]
//! title = "Hello"
//! link = "https://example.com/hello"
//! pub_date = "2024-05-01T10:00:00Z"
//! content = "<p>Hi there</p>"
//!
//! [[entries.categories]]
//! term = "greetings"
//! ```
//!
//! Timestamps must be quoted RFC 3339 strings.
use std::path::Path;

use thiserror::Error;

use crate::atom::Feed;

/// Maximum description file size (16 MB).
const MAX_FILE_SIZE: u64 = 16 * 1_048_576;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("Failed to read feed description: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML feed description: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid JSON feed description: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Feed description too large: {size} bytes (max {max} bytes)", max = MAX_FILE_SIZE)]
    TooLarge { size: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Toml,
    Json,
}

impl InputFormat {
    /// `.json` files are JSON, everything else is TOML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Toml,
        }
    }
}

/// Parses a feed description.
pub fn parse_feed(content: &str, format: InputFormat) -> Result<Feed, InputError> {
    let feed: Feed = match format {
        InputFormat::Toml => toml::from_str(content)?,
        InputFormat::Json => serde_json::from_str(content)?,
    };
    tracing::debug!(
        format = ?format,
        entries = feed.entries().len(),
        "Parsed feed description"
    );
    Ok(feed)
}

/// Reads and parses the feed description at `path`, picking the format from
/// its extension.
pub fn read_feed(path: &Path) -> Result<Feed, InputError> {
    let size = std::fs::metadata(path)?.len();
    if size > MAX_FILE_SIZE {
        return Err(InputError::TooLarge { size });
    }

    let content = std::fs::read_to_string(path)?;
    parse_feed(&content, InputFormat::from_path(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::{Author, Category};

    #[test]
    fn test_format_from_extension() {
        assert_eq!(InputFormat::from_path(Path::new("feed.json")), InputFormat::Json);
        assert_eq!(InputFormat::from_path(Path::new("FEED.JSON")), InputFormat::Json);
        assert_eq!(InputFormat::from_path(Path::new("feed.toml")), InputFormat::Toml);
        assert_eq!(InputFormat::from_path(Path::new("feed")), InputFormat::Toml);
    }

    #[test]
    fn test_parse_toml_description() {
        let content = r#"
title = "My blog"
link = "https://example.com/"
pub_date = "2024-05-01T10:00:00Z"

[[authors]]
name = "Jo"
email = "jo@example.com"

[[entries]]
title = "Hello"
link = "https://example.com/hello"
pub_date = "2024-05-01T12:30:00+02:00"
content = "<p>Hi there</p>"

[[entries.categories]]
term = "greetings"
label = "Greetings"
"#;
        let feed = parse_feed(content, InputFormat::Toml).unwrap();

        assert_eq!(feed.title, "My blog");
        assert_eq!(feed.link, "https://example.com/");
        assert!(feed.pub_date.is_some());
        assert_eq!(
            feed.authors(),
            &[Author::new("Jo").with_email("jo@example.com")]
        );
        assert_eq!(feed.entries().len(), 1);

        let entry = &feed.entries()[0];
        assert_eq!(entry.content.as_deref(), Some("<p>Hi there</p>"));
        assert_eq!(entry.description, None);
        assert_eq!(
            entry.categories(),
            &[Category::new("greetings").with_label("Greetings")]
        );
        assert_eq!(entry.id(), "tag:example.com,2024-05-01:/hello");
    }

    #[test]
    fn test_parse_json_description() {
        let content = r#"{
            "title": "t",
            "link": "https://example.com/",
            "entries": [{ "title": "e", "authors": [{ "name": "Ann" }] }]
        }"#;
        let feed = parse_feed(content, InputFormat::Json).unwrap();

        assert_eq!(feed.pub_date, None);
        assert_eq!(feed.entries()[0].authors()[0].name, "Ann");
    }

    #[test]
    fn test_bad_timestamp_is_an_error() {
        let err = parse_feed("pub_date = \"yesterday\"\n", InputFormat::Toml).unwrap_err();
        assert!(matches!(err, InputError::Toml(_)));
    }

    #[test]
    fn test_read_feed_from_file() {
        let dir = std::env::temp_dir().join("atomgen_input_test_read");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("feed.json");
        std::fs::write(&path, r#"{ "title": "from disk" }"#).unwrap();

        let feed = read_feed(&path).unwrap();
        assert_eq!(feed.title, "from disk");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_feed(Path::new("/tmp/atomgen_no_such_feed.toml")).unwrap_err();
        assert!(matches!(err, InputError::Io(_)));
    }
}
