//! Atom (RFC 4287) feed model, validation and XML generation.
//!
//! - [`model`] - `Feed`, `Entry`, `Author` and `Category` with their mutators
//! - [`validate`] - Mandatory-field rules, reported as [`ValidationError`]s
//! - [`id`] - Stable `tag:` URIs for entries
//! - [`writer`] - quick-xml based serializer
//!
//! # Example
//!
//! ```
//! use atomgen::atom::{Author, Entry, Feed};
//! use chrono::DateTime;
//!
//! let mut feed = Feed::new("My blog", "https://example.com/");
//! feed.pub_date = DateTime::parse_from_rfc3339("2024-05-01T10:00:00Z").ok();
//! feed.add_author(Author::new("Jo"));
//!
//! let mut entry = Entry::new("Hello", "https://example.com/hello");
//! entry.pub_date = feed.pub_date;
//! feed.add_entry(entry);
//!
//! assert!(feed.validate().is_empty());
//! let xml = feed.generate_xml().unwrap();
//! assert!(xml.starts_with(b"<?xml"));
//! ```

pub mod id;
pub mod model;
pub mod validate;
pub mod writer;

pub use id::tag_uri;
pub use model::{Author, Category, Entry, Feed};
pub use validate::ValidationError;
pub use writer::{format_timestamp, GenerateError, XmlOptions, ATOM_NAMESPACE};
