use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::id::tag_uri;
use super::validate::{self, ValidationError};
use super::writer::{self, GenerateError, XmlOptions};

/// An Atom feed.
///
/// Create one with [`Feed::new`] (or `Default`), assign the public fields,
/// append authors and entries with [`Feed::add_author`] and [`Feed::add_entry`],
/// then call [`Feed::generate_xml`]. [`Feed::validate`] is advisory and may be
/// called any number of times.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Feed {
    /// Required.
    pub title: String,
    /// Required. Rendered as `<updated>`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pub_date: Option<DateTime<FixedOffset>>,
    /// Canonical URL of the feed. Also used as the feed's `<id>`.
    pub link: String,
    /// Required unless every entry has at least one author.
    authors: Vec<Author>,
    entries: Vec<Entry>,
}

impl Feed {
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            ..Self::default()
        }
    }

    /// Appends an entry. Entries are written in insertion order.
    pub fn add_entry(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    /// Appends a feed-level author.
    pub fn add_author(&mut self, author: Author) {
        self.authors.push(author);
    }

    pub fn authors(&self) -> &[Author] {
        &self.authors
    }

    pub fn authors_mut(&mut self) -> &mut [Author] {
        &mut self.authors
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn entries_mut(&mut self) -> &mut [Entry] {
        &mut self.entries
    }

    /// Checks the feed against the mandatory-field rules of RFC 4287.
    ///
    /// Returns every problem found; an empty vector means the feed is valid.
    /// The check is fairly thorough but not a full schema validation.
    pub fn validate(&self) -> Vec<ValidationError> {
        validate::validate_feed(self)
    }

    /// Renders the feed as an Atom document with a one-space indent.
    pub fn generate_xml(&self) -> Result<Vec<u8>, GenerateError> {
        self.generate_xml_with(&XmlOptions::default())
    }

    pub fn generate_xml_with(&self, options: &XmlOptions) -> Result<Vec<u8>, GenerateError> {
        writer::write_feed(self, options)
    }
}

/// A single item of a feed, such as a blog post.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Entry {
    /// Required.
    pub title: String,
    /// Required.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pub_date: Option<DateTime<FixedOffset>>,
    pub link: String,
    /// HTML summary, written as `<summary type="html">`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// HTML body, written as `<content type="html">`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Required unless the feed has at least one author.
    authors: Vec<Author>,
    categories: Vec<Category>,
}

impl Entry {
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            ..Self::default()
        }
    }

    pub fn add_author(&mut self, author: Author) {
        self.authors.push(author);
    }

    pub fn add_category(&mut self, category: Category) {
        self.categories.push(category);
    }

    pub fn authors(&self) -> &[Author] {
        &self.authors
    }

    pub fn authors_mut(&mut self) -> &mut [Author] {
        &mut self.authors
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn categories_mut(&mut self) -> &mut [Category] {
        &mut self.categories
    }

    /// The entry's globally unique `tag:` identifier.
    ///
    /// Derived only from `link` and `pub_date`, so it stays the same every
    /// time the feed is regenerated. See [`tag_uri`].
    pub fn id(&self) -> String {
        tag_uri(&self.link, self.pub_date.as_ref())
    }
}

/// A person credited on a feed or an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Author {
    /// Required whenever this author satisfies the authorship requirement.
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

impl Author {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }
}

/// A tag attached to an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Category {
    /// Required.
    pub term: String,
    /// URI identifying the categorization scheme.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
    /// Human-readable form of `term`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Category {
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            ..Self::default()
        }
    }

    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = Some(scheme.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}
