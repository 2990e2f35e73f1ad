use std::borrow::Cow;
use std::io;

use chrono::{DateTime, FixedOffset, SecondsFormat};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use thiserror::Error;

use super::model::{Author, Category, Entry, Feed};

/// XML namespace of RFC 4287 documents.
pub const ATOM_NAMESPACE: &str = "http://www.w3.org/2005/Atom";

/// Errors raised while rendering a feed.
///
/// These only come from the XML writer itself; an incomplete model is still
/// rendered (see [`Feed::validate`] for the domain checks).
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("Failed to write <{element}> element: {source}")]
    Write {
        element: &'static str,
        #[source]
        source: io::Error,
    },
}

/// Output formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XmlOptions {
    /// Spaces per nesting level.
    pub indent_width: usize,
}

impl Default for XmlOptions {
    fn default() -> Self {
        Self { indent_width: 1 }
    }
}

/// Formats a timestamp for `<updated>` (RFC 3339, whole seconds, `Z` for UTC).
pub fn format_timestamp(ts: &DateTime<FixedOffset>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Renders `feed` as a complete Atom document.
///
/// The document starts with the XML declaration and has one element per line,
/// indented by `options.indent_width` spaces per level. Text and attribute
/// values are escaped by quick-xml, and characters XML cannot carry are
/// replaced with U+FFFD. Nothing is returned on failure.
pub(crate) fn write_feed(feed: &Feed, options: &XmlOptions) -> Result<Vec<u8>, GenerateError> {
    let mut writer = AtomWriter::new(options.indent_width);

    writer.event(
        "xml",
        Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
    )?;

    let mut root = BytesStart::new("feed");
    root.push_attribute(("xmlns", ATOM_NAMESPACE));
    writer.event("feed", Event::Start(root))?;

    writer.text_element("title", &feed.title)?;
    writer.link(&feed.link)?;
    // Feeds reuse their link as the id; entries get a generated tag URI.
    writer.text_element("id", &feed.link)?;
    if let Some(pub_date) = &feed.pub_date {
        writer.text_element("updated", &format_timestamp(pub_date))?;
    }
    for author in feed.authors() {
        writer.author(author)?;
    }
    for entry in feed.entries() {
        writer.entry(entry)?;
    }

    writer.end("feed")?;

    let bytes = writer.into_inner();
    tracing::debug!(
        entries = feed.entries().len(),
        bytes = bytes.len(),
        "Generated Atom feed"
    );
    Ok(bytes)
}

/// Replaces characters outside the XML 1.0 `Char` production with U+FFFD.
///
/// quick-xml escapes markup characters but passes control characters through,
/// which would make the document malformed.
fn xml_safe(value: &str) -> Cow<'_, str> {
    fn allowed(c: char) -> bool {
        matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}')
            || c >= '\u{10000}'
    }

    if value.chars().all(allowed) {
        return Cow::Borrowed(value);
    }
    Cow::Owned(
        value
            .chars()
            .map(|c| if allowed(c) { c } else { char::REPLACEMENT_CHARACTER })
            .collect(),
    )
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

struct AtomWriter {
    inner: Writer<Vec<u8>>,
}

impl AtomWriter {
    fn new(indent_width: usize) -> Self {
        Self {
            inner: Writer::new_with_indent(Vec::new(), b' ', indent_width),
        }
    }

    fn into_inner(self) -> Vec<u8> {
        self.inner.into_inner()
    }

    fn event(&mut self, element: &'static str, event: Event<'_>) -> Result<(), GenerateError> {
        self.inner
            .write_event(event)
            .map_err(|source| GenerateError::Write { element, source })
    }

    fn start(&mut self, element: &'static str) -> Result<(), GenerateError> {
        self.event(element, Event::Start(BytesStart::new(element)))
    }

    fn end(&mut self, element: &'static str) -> Result<(), GenerateError> {
        self.event(element, Event::End(BytesEnd::new(element)))
    }

    fn text_element(&mut self, element: &'static str, text: &str) -> Result<(), GenerateError> {
        self.start(element)?;
        self.event(element, Event::Text(BytesText::new(&xml_safe(text))))?;
        self.end(element)
    }

    /// `<summary>` and `<content>` carry HTML as escaped character data.
    fn html_element(&mut self, element: &'static str, html: &str) -> Result<(), GenerateError> {
        let mut start = BytesStart::new(element);
        start.push_attribute(("type", "html"));
        self.event(element, Event::Start(start))?;
        self.event(element, Event::Text(BytesText::new(&xml_safe(html))))?;
        self.end(element)
    }

    fn link(&mut self, href: &str) -> Result<(), GenerateError> {
        let mut link = BytesStart::new("link");
        link.push_attribute(("href", xml_safe(href).as_ref()));
        link.push_attribute(("rel", "alternate"));
        self.event("link", Event::Empty(link))
    }

    fn author(&mut self, author: &Author) -> Result<(), GenerateError> {
        self.start("author")?;
        self.text_element("name", &author.name)?;
        if let Some(email) = present(&author.email) {
            self.text_element("email", email)?;
        }
        if let Some(uri) = present(&author.uri) {
            self.text_element("uri", uri)?;
        }
        self.end("author")
    }

    fn category(&mut self, category: &Category) -> Result<(), GenerateError> {
        let mut element = BytesStart::new("category");
        element.push_attribute(("term", xml_safe(&category.term).as_ref()));
        if let Some(scheme) = present(&category.scheme) {
            element.push_attribute(("scheme", xml_safe(scheme).as_ref()));
        }
        if let Some(label) = present(&category.label) {
            element.push_attribute(("label", xml_safe(label).as_ref()));
        }
        self.event("category", Event::Empty(element))
    }

    fn entry(&mut self, entry: &Entry) -> Result<(), GenerateError> {
        self.start("entry")?;
        self.text_element("title", &entry.title)?;
        self.link(&entry.link)?;
        if let Some(pub_date) = &entry.pub_date {
            self.text_element("updated", &format_timestamp(pub_date))?;
        }
        self.text_element("id", &entry.id())?;
        if let Some(description) = present(&entry.description) {
            self.html_element("summary", description)?;
        }
        if let Some(content) = present(&entry.content) {
            self.html_element("content", content)?;
        }
        for author in entry.authors() {
            self.author(author)?;
        }
        for category in entry.categories() {
            self.category(category)?;
        }
        self.end("entry")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(feed: &Feed) -> String {
        String::from_utf8(feed.generate_xml().unwrap()).unwrap()
    }

    #[test]
    fn test_format_timestamp() {
        let utc = DateTime::parse_from_rfc3339("2008-09-10T11:12:00.250Z").unwrap();
        assert_eq!(format_timestamp(&utc), "2008-09-10T11:12:00Z");

        let cest = DateTime::parse_from_rfc3339("2008-09-10T11:12:00+02:00").unwrap();
        assert_eq!(format_timestamp(&cest), "2008-09-10T11:12:00+02:00");
    }

    #[test]
    fn test_empty_feed_layout() {
        let feed = Feed::new("t", "http://example.com/");
        assert_eq!(
            render(&feed),
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <feed xmlns=\"http://www.w3.org/2005/Atom\">\n \
             <title>t</title>\n \
             <link href=\"http://example.com/\" rel=\"alternate\"/>\n \
             <id>http://example.com/</id>\n\
             </feed>"
        );
    }

    #[test]
    fn test_indent_width_option() {
        let feed = Feed::new("t", "l");
        let xml = feed
            .generate_xml_with(&XmlOptions { indent_width: 4 })
            .unwrap();
        let xml = String::from_utf8(xml).unwrap();
        assert!(xml.contains("\n    <title>t</title>"), "{xml}");
    }

    #[test]
    fn test_optional_author_fields_omitted() {
        let mut feed = Feed::new("t", "l");
        feed.add_author(Author::new("Ann"));
        feed.add_author(Author {
            name: "Bob".to_string(),
            email: Some(String::new()),
            uri: Some("https://bob.example".to_string()),
        });

        let xml = render(&feed);
        assert_eq!(xml.matches("<email>").count(), 0);
        assert_eq!(xml.matches("<uri>").count(), 1);
        assert_eq!(xml.matches("<name>").count(), 2);
    }

    #[test]
    fn test_summary_and_content_omitted_when_empty() {
        let mut feed = Feed::new("t", "l");
        let mut entry = Entry::new("e", "http://example.com/e");
        entry.description = Some(String::new());
        feed.add_entry(entry);

        let xml = render(&feed);
        assert!(!xml.contains("<summary"));
        assert!(!xml.contains("<content"));
    }

    #[test]
    fn test_category_attributes() {
        let mut feed = Feed::new("t", "l");
        let mut entry = Entry::new("e", "l");
        entry.add_category(Category::new("rust"));
        entry.add_category(
            Category::new("xml")
                .with_scheme("http://example.com/tags")
                .with_label("XML"),
        );
        feed.add_entry(entry);

        let xml = render(&feed);
        assert!(xml.contains(r#"<category term="rust"/>"#), "{xml}");
        assert!(
            xml.contains(r#"<category term="xml" scheme="http://example.com/tags" label="XML"/>"#),
            "{xml}"
        );
    }

    #[test]
    fn test_text_and_attribute_escaping() {
        let mut feed = Feed::new("Tom & Jerry", "http://example.com/?a=1&b=2");
        let mut entry = Entry::new("e", "l");
        entry.content = Some("<p>hi</p>".to_string());
        feed.add_entry(entry);

        let xml = render(&feed);
        assert!(xml.contains("<title>Tom &amp; Jerry</title>"), "{xml}");
        assert!(xml.contains(r#"href="http://example.com/?a=1&amp;b=2""#), "{xml}");
        assert!(
            xml.contains(r#"<content type="html">&lt;p&gt;hi&lt;/p&gt;</content>"#),
            "{xml}"
        );
    }

    #[test]
    fn test_xml_safe_keeps_valid_text() {
        assert!(matches!(xml_safe("tab\tline\ncr\r ä €"), Cow::Borrowed(_)));
        assert_eq!(xml_safe("\u{10348}"), "\u{10348}");
    }

    #[test]
    fn test_xml_safe_replaces_forbidden_chars() {
        assert_eq!(
            xml_safe("a\u{0}b\u{1}c\u{b}\u{c}\u{1f}"),
            "a\u{fffd}b\u{fffd}c\u{fffd}\u{fffd}\u{fffd}"
        );
        assert_eq!(xml_safe("\u{fffe}\u{ffff}"), "\u{fffd}\u{fffd}");
    }

    #[test]
    fn test_control_chars_in_text_and_attributes_are_replaced() {
        let mut feed = Feed::new("a\u{1}b", "http://example.com/\u{8}");
        let mut entry = Entry::new("e", "l");
        entry.content = Some("c\u{0}d".to_string());
        entry.add_category(Category::new("t\u{1b}").with_label("\u{ffff}"));
        feed.add_entry(entry);

        let bytes = feed.generate_xml().unwrap();
        assert!(
            !bytes.iter().any(|&b| b < 0x20 && !matches!(b, b'\t' | b'\n' | b'\r')),
            "control bytes in output"
        );

        let xml = String::from_utf8(bytes).unwrap();
        assert!(xml.contains("<title>a\u{fffd}b</title>"), "{xml}");
        assert!(xml.contains(r#"href="http://example.com/\u{fffd}""#), "{xml}");
        assert!(xml.contains("<content type=\"html\">c\u{fffd}d</content>"), "{xml}");
        assert!(
            xml.contains("<category term=\"t\u{fffd}\" label=\"\u{fffd}\"/>"),
            "{xml}"
        );
    }

    #[test]
    fn test_updated_omitted_without_pub_date() {
        let mut feed = Feed::new("t", "l");
        feed.add_entry(Entry::new("e", "l"));
        assert!(!render(&feed).contains("<updated>"));
    }
}
