use chrono::{DateTime, FixedOffset};
use url::Url;

/// Builds a `tag:` URI (RFC 4151) for an entry.
///
/// The result has the form `tag:<host>,<YYYY-MM-DD>:<path>`, with the URL
/// fragment appended as an extra path segment when present. Because it only
/// depends on the entry's link and publication date, regenerating a feed never
/// changes the ids of existing entries.
///
/// A link that cannot be parsed as a URL, or an entry without a publication
/// date, falls back to the raw link. That is never an error.
///
/// # Examples
///
/// ```
/// use atomgen::atom::tag_uri;
/// use chrono::DateTime;
///
/// let date = DateTime::parse_from_rfc3339("2009-10-11T12:13:00Z").unwrap();
/// assert_eq!(
///     tag_uri("http://host/entry", Some(&date)),
///     "tag:host,2009-10-11:/entry"
/// );
/// assert_eq!(tag_uri("not a url", Some(&date)), "not a url");
/// ```
pub fn tag_uri(link: &str, pub_date: Option<&DateTime<FixedOffset>>) -> String {
    let url = match Url::parse(link) {
        Ok(url) => url,
        Err(e) => {
            tracing::debug!(link = %link, error = %e, "Link is not a URL, using it as the entry id");
            return link.to_string();
        }
    };
    let Some(pub_date) = pub_date else {
        tracing::debug!(link = %link, "Entry has no publication date, using its link as the id");
        return link.to_string();
    };

    let mut id = String::with_capacity(link.len() + 16);
    id.push_str("tag:");
    id.push_str(url.host_str().unwrap_or_default());
    // `Url` normalizes away the scheme's default port, so only explicit
    // non-default ports end up in the tag authority.
    if let Some(port) = url.port() {
        id.push(':');
        id.push_str(&port.to_string());
    }
    id.push(',');
    id.push_str(&pub_date.format("%Y-%m-%d").to_string());
    id.push(':');
    id.push_str(url.path());

    if let Some(fragment) = url.fragment().filter(|f| !f.is_empty()) {
        if !url.path().ends_with('/') {
            id.push('/');
        }
        id.push_str(fragment);
    }

    id
}
