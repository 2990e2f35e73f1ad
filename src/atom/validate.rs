use thiserror::Error;

use super::model::Feed;

/// A single way in which a feed fails the mandatory-field rules of RFC 4287.
///
/// Entry, author and category positions are zero-based indices into the
/// owning collection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Feed must have a title")]
    MissingFeedTitle,

    #[error("Feed must have a publication date")]
    MissingFeedPubDate,

    /// The feed has no authors, so every entry needs its own.
    #[error("Feed has no authors, and entry '{title}' has none either")]
    EntryWithoutAuthor { title: String },

    #[error("Feed author {index} must have a name")]
    FeedAuthorWithoutName { index: usize },

    /// An entry author that stands in for missing feed authors has no name.
    #[error("Author {index} of entry {entry} must have a name")]
    EntryAuthorWithoutName { entry: usize, index: usize },

    #[error("Entry {index} must have a title")]
    MissingEntryTitle { index: usize },

    #[error("Entry {index} must have a publication date")]
    MissingEntryPubDate { index: usize },

    #[error("Category {index} of entry {entry} must have a term")]
    CategoryWithoutTerm { entry: usize, index: usize },
}

/// Runs every rule against `feed` and collects all failures.
///
/// Rules do not short-circuit each other. Errors come out grouped by rule,
/// each rule in the iteration order of the collection it checks.
pub(crate) fn validate_feed(feed: &Feed) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    // The id is generated, so title and updated are all the feed itself needs.
    if feed.title.is_empty() {
        errors.push(ValidationError::MissingFeedTitle);
    }
    if feed.pub_date.is_none() {
        errors.push(ValidationError::MissingFeedPubDate);
    }

    // Either the feed has authors, or every entry brings its own.
    if feed.authors().is_empty() {
        for (entry_index, entry) in feed.entries().iter().enumerate() {
            if entry.authors().is_empty() {
                errors.push(ValidationError::EntryWithoutAuthor {
                    title: entry.title.clone(),
                });
                continue;
            }
            for (index, author) in entry.authors().iter().enumerate() {
                if author.name.is_empty() {
                    errors.push(ValidationError::EntryAuthorWithoutName {
                        entry: entry_index,
                        index,
                    });
                }
            }
        }
    } else {
        for (index, author) in feed.authors().iter().enumerate() {
            if author.name.is_empty() {
                errors.push(ValidationError::FeedAuthorWithoutName { index });
            }
        }
    }

    for (index, entry) in feed.entries().iter().enumerate() {
        if entry.title.is_empty() {
            errors.push(ValidationError::MissingEntryTitle { index });
        }
        if entry.pub_date.is_none() {
            errors.push(ValidationError::MissingEntryPubDate { index });
        }
    }

    for (entry_index, entry) in feed.entries().iter().enumerate() {
        for (index, category) in entry.categories().iter().enumerate() {
            if category.term.is_empty() {
                errors.push(ValidationError::CategoryWithoutTerm {
                    entry: entry_index,
                    index,
                });
            }
        }
    }

    tracing::debug!(
        entries = feed.entries().len(),
        errors = errors.len(),
        "Validated feed"
    );
    errors
}
