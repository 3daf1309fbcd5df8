//! Element tree for `metadata.xml`
//!
//! A small owned tree built with `quick-xml`. Each [`Element`] keeps the
//! character data that precedes its first child as `text`; character data
//! after a child (the "tail") is dropped. Text is kept as written, except
//! that whitespace-only text counts as no text, so the indentation of
//! pretty-printed documents does not produce blank values.

use crate::domain::errors::ParseError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// One XML element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    /// Qualified tag name as written in the document
    pub tag: String,

    /// Attributes in document order
    pub attributes: Vec<(String, String)>,

    /// Text before the first child, `None` when empty
    pub text: Option<String>,

    /// Child elements in document order
    pub children: Vec<Element>,
}

impl Element {
    /// Creates an element without attributes, text or children
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// Sets the text
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Adds an attribute
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Appends a child
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Value of the attribute `name`
    pub fn get(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Element text, if any
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// This element followed by all of its descendants, in document order
    pub fn iter(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// First element matching `path`
    pub fn find(&self, path: &str) -> Option<&Element> {
        self.find_all(path).into_iter().next()
    }

    /// All elements matching `path`, in document order
    ///
    /// `path` is relative to this element: `tag` selects direct children,
    /// `a/b` walks child steps, `*` matches any tag and an empty step
    /// (`.//tag`, `a//b`) searches all descendants.
    pub fn find_all(&self, path: &str) -> Vec<&Element> {
        let mut current: Vec<&Element> = vec![self];
        let mut descend = false;
        let mut stepped = false;

        for step in path.split('/') {
            match step {
                "" => {
                    descend = true;
                    continue;
                }
                "." => continue,
                _ => {}
            }

            let mut next: Vec<&Element> = Vec::new();
            for element in &current {
                let scopes: Vec<&Element> = if descend {
                    element.iter().collect()
                } else {
                    vec![element]
                };
                for scope in scopes {
                    for child in &scope.children {
                        if (step == "*" || child.tag == step)
                            && !next.iter().any(|seen| std::ptr::eq(*seen, child))
                        {
                            next.push(child);
                        }
                    }
                }
            }

            current = next;
            descend = false;
            stepped = true;
        }

        if stepped {
            current
        } else {
            Vec::new()
        }
    }
}

/// Depth-first iterator over an element and its descendants
pub struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let element = self.stack.pop()?;
        self.stack.extend(element.children.iter().rev());
        Some(element)
    }
}

/// Parses a complete XML document and returns its root element
///
/// # Errors
///
/// Returns [`ParseError::Encoding`] for non UTF-8 input and
/// [`ParseError::Malformed`] when the document is not well-formed.
pub fn parse_document(bytes: &[u8]) -> Result<Element, ParseError> {
    let source = std::str::from_utf8(bytes).map_err(|e| ParseError::Encoding(e.to_string()))?;
    let source = source.trim_start_matches('\u{feff}');

    let mut reader = Reader::from_str(source);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => stack.push(open_element(&start)?),
            Event::Empty(start) => {
                let element = open_element(&start)?;
                close_element(element, &mut stack, &mut root)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| ParseError::Malformed("unexpected closing tag".to_string()))?;
                close_element(element, &mut stack, &mut root)?;
            }
            Event::Text(text) => {
                let value = text.unescape()?;
                append_text(&mut stack, &value);
            }
            Event::CData(data) => {
                let value =
                    std::str::from_utf8(&data).map_err(|e| ParseError::Encoding(e.to_string()))?;
                append_text(&mut stack, value);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(ParseError::Malformed(format!(
            "unclosed element <{}>",
            open.tag
        )));
    }

    root.ok_or_else(|| ParseError::Malformed("document has no root element".to_string()))
}

fn open_element(start: &BytesStart<'_>) -> Result<Element, ParseError> {
    let tag = std::str::from_utf8(start.name().as_ref())
        .map_err(|e| ParseError::Encoding(e.to_string()))?
        .to_string();

    let mut element = Element::new(tag);
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| ParseError::Malformed(e.to_string()))?;
        let key = std::str::from_utf8(attribute.key.as_ref())
            .map_err(|e| ParseError::Encoding(e.to_string()))?
            .to_string();
        let value = attribute.unescape_value()?.into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn append_text(stack: &mut [Element], value: &str) {
    // text after the first child is a tail and is not kept
    if let Some(current) = stack.last_mut() {
        if current.children.is_empty() {
            current.text.get_or_insert_with(String::new).push_str(value);
        }
    }
}

fn close_element(
    mut element: Element,
    stack: &mut [Element],
    root: &mut Option<Element>,
) -> Result<(), ParseError> {
    element.text = element.text.take().filter(|text| !text.trim().is_empty());

    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_some() => {
            return Err(ParseError::Malformed(
                "document has more than one root element".to_string(),
            ))
        }
        None => *root = Some(element),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_text_and_attributes() {
        let root = parse_document(br#"<meta><tissue id="x:y">Liver</tissue></meta>"#).unwrap();
        assert_eq!(root.tag, "meta");
        let tissue = root.find("tissue").unwrap();
        assert_eq!(tissue.text(), Some("Liver"));
        assert_eq!(tissue.get("id"), Some("x:y"));
        assert_eq!(tissue.get("name"), None);
    }

    #[test]
    fn test_text_before_first_child_only() {
        let root = parse_document(b"<contact>head<name>Jane</name>tail</contact>").unwrap();
        assert_eq!(root.text(), Some("head"));
        assert_eq!(root.children.len(), 1);
    }

    #[test]
    fn test_whitespace_only_text_is_none() {
        let xml = b"<meta>\n  <date>2020-01-01</date>\n  <empty>   </empty>\n</meta>";
        let root = parse_document(xml).unwrap();
        assert_eq!(root.text(), None);
        assert_eq!(root.find("empty").unwrap().text(), None);
        assert_eq!(root.find("date").unwrap().text(), Some("2020-01-01"));
    }

    #[test]
    fn test_text_kept_as_written() {
        let root = parse_document(
            b"<meta><date> 2020-01-01 </date><tissue>  Liver  </tissue><note>a\n b</note></meta>",
        )
        .unwrap();
        assert_eq!(root.find("date").unwrap().text(), Some(" 2020-01-01 "));
        assert_eq!(root.find("tissue").unwrap().text(), Some("  Liver  "));
        assert_eq!(root.find("note").unwrap().text(), Some("a\n b"));
    }

    #[test]
    fn test_entities_and_cdata() {
        let root = parse_document(
            b"<meta><title>Mice &amp; Men</title><note><![CDATA[a < b]]></note></meta>",
        )
        .unwrap();
        assert_eq!(root.find("title").unwrap().text(), Some("Mice & Men"));
        assert_eq!(root.find("note").unwrap().text(), Some("a < b"));
    }

    #[test]
    fn test_self_closing_element() {
        let root = parse_document(br#"<meta><tissue name="liver"/></meta>"#).unwrap();
        let tissue = root.find("tissue").unwrap();
        assert_eq!(tissue.text(), None);
        assert_eq!(tissue.get("name"), Some("liver"));
    }

    #[test]
    fn test_prolog_and_comments_ignored() {
        let root = parse_document(
            b"\xEF\xBB\xBF<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!-- c --><meta><date>d</date></meta>\n",
        )
        .unwrap();
        assert_eq!(root.find("date").unwrap().text(), Some("d"));
    }

    #[test]
    fn test_malformed_documents() {
        assert!(matches!(
            parse_document(b"<meta><date></meta>"),
            Err(ParseError::Malformed(_))
        ));
        assert!(matches!(
            parse_document(b"<meta><date>x</date>"),
            Err(ParseError::Malformed(_))
        ));
        assert!(matches!(parse_document(b""), Err(ParseError::Malformed(_))));
        assert!(matches!(
            parse_document(b"<a/><b/>"),
            Err(ParseError::Malformed(_))
        ));
    }

    #[test]
    fn test_invalid_utf8() {
        assert!(matches!(
            parse_document(&[0x3c, 0x61, 0x3e, 0xff, 0x3c, 0x2f, 0x61, 0x3e]),
            Err(ParseError::Encoding(_))
        ));
    }

    #[test]
    fn test_iter_document_order() {
        let root = parse_document(b"<a><b><c/></b><d/></a>").unwrap();
        let tags: Vec<&str> = root.iter().map(|e| e.tag.as_str()).collect();
        assert_eq!(tags, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_find_all_paths() {
        let root = parse_document(
            b"<meta><article><ref>1</ref></article><group><article><ref>2</ref></article></group></meta>",
        )
        .unwrap();

        assert_eq!(root.find_all("article").len(), 1);
        assert_eq!(root.find_all(".//article").len(), 2);
        assert_eq!(root.find_all("group/article/ref")[0].text(), Some("2"));
        assert_eq!(root.find_all("*").len(), 2);
        assert!(root.find_all("missing").is_empty());
        assert!(root.find_all("").is_empty());
    }

    #[test]
    fn test_find_all_descendants_without_duplicates() {
        let root = parse_document(b"<a><b><b><c>1</c></b></b></a>").unwrap();
        assert_eq!(root.find_all(".//b").len(), 2);
        assert_eq!(root.find_all(".//b//c").len(), 1);
    }

    #[test]
    fn test_builder() {
        let element = Element::new("tissue")
            .with_attribute("id", "UBERON:http://x")
            .with_text("Liver")
            .with_child(Element::new("note"));
        assert_eq!(element.get("id"), Some("UBERON:http://x"));
        assert_eq!(element.text(), Some("Liver"));
        assert_eq!(element.children.len(), 1);
    }
}
