//! XML parser adapter.
//!
//! Wraps the quick-xml event reader behind a small owned DOM with strict
//! well-formedness rules: exactly one root element, no stray top-level text,
//! every tag closed and matched. Failure is all-or-nothing; no partially
//! recovered document is ever returned.

use quick_xml::Reader;
use quick_xml::events::{BytesDecl, BytesStart, Event};

use crate::error::{ParseError, ParseResult};

/// Fields of an `<?xml ...?>` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDeclaration {
    pub version: String,
    pub encoding: Option<String>,
    pub standalone: Option<String>,
}

/// A node in element content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction(String),
}

/// An element with its qualified name, document-ordered attributes and
/// child nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<XmlNode>,
}

impl XmlElement {
    /// Qualified tag name as written in the document.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tag name with any namespace prefix removed.
    pub fn local_name(&self) -> &str {
        local_part(&self.name)
    }

    /// Attributes in document order, qualified keys.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// All direct child nodes in document order.
    pub fn children(&self) -> &[XmlNode] {
        &self.children
    }

    /// Direct element children only, in document order.
    pub fn child_elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(element) => Some(element),
            _ => None,
        })
    }

    /// Value of the first direct text node (CDATA counts as text), untrimmed.
    pub fn first_text(&self) -> Option<&str> {
        self.children.iter().find_map(|node| match node {
            XmlNode::Text(value) | XmlNode::CData(value) => Some(value.as_str()),
            _ => None,
        })
    }
}

/// Strip any namespace prefix from a qualified name.
pub fn local_part(name: &str) -> &str {
    match name.rsplit_once(':') {
        Some((_, local)) => local,
        None => name,
    }
}

/// A fully parsed, well-formed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    declaration: Option<XmlDeclaration>,
    doctype: Option<String>,
    prolog: Vec<XmlNode>,
    root: XmlElement,
    epilog: Vec<XmlNode>,
}

impl XmlDocument {
    /// Parse `text` into a document, or report the first well-formedness
    /// violation with its line and column.
    pub fn parse(text: &str) -> ParseResult<XmlDocument> {
        let mut reader = Reader::from_str(text);
        reader.config_mut().check_end_names = true;

        let mut declaration = None;
        let mut doctype = None;
        let mut prolog = Vec::new();
        let mut epilog = Vec::new();
        let mut root: Option<XmlElement> = None;
        let mut stack: Vec<XmlElement> = Vec::new();
        let mut seen_any = false;

        loop {
            let event = match reader.read_event() {
                Ok(event) => event,
                Err(source) => {
                    return Err(error_at(text, reader.buffer_position(), source.to_string()));
                }
            };
            let position = reader.buffer_position();

            match event {
                Event::Eof => {
                    if let Some(open) = stack.last() {
                        return Err(error_at(
                            text,
                            position,
                            format!("unclosed tag `{}`", open.name),
                        ));
                    }
                    break;
                }
                Event::Decl(decl) => {
                    if seen_any {
                        return Err(error_at(
                            text,
                            position,
                            "XML declaration must be at the start of the document",
                        ));
                    }
                    declaration = Some(read_declaration(&decl, text, position)?);
                }
                Event::DocType(content) => {
                    if root.is_some() || !stack.is_empty() {
                        return Err(error_at(text, position, "DOCTYPE after the root element"));
                    }
                    doctype = Some(String::from_utf8_lossy(&content).trim().to_string());
                }
                Event::Start(start) => {
                    if stack.is_empty() && root.is_some() {
                        return Err(error_at(
                            text,
                            position,
                            "document contains multiple root elements",
                        ));
                    }
                    stack.push(read_element(&start, text, position)?);
                }
                Event::Empty(start) => {
                    if stack.is_empty() && root.is_some() {
                        return Err(error_at(
                            text,
                            position,
                            "document contains multiple root elements",
                        ));
                    }
                    let element = read_element(&start, text, position)?;
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(XmlNode::Element(element)),
                        None => root = Some(element),
                    }
                }
                Event::End(_) => {
                    // check_end_names already rejects mismatches; an empty
                    // stack here is a closing tag with no opener.
                    let Some(element) = stack.pop() else {
                        return Err(error_at(text, position, "unexpected closing tag"));
                    };
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(XmlNode::Element(element)),
                        None => root = Some(element),
                    }
                }
                Event::Text(content) => {
                    let value = content
                        .unescape()
                        .map_err(|source| error_at(text, position, source.to_string()))?
                        .into_owned();
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(XmlNode::Text(value)),
                        None if value.trim().is_empty() => {}
                        None => {
                            return Err(error_at(
                                text,
                                position,
                                "text outside of the root element",
                            ));
                        }
                    }
                }
                Event::CData(content) => {
                    let value = String::from_utf8_lossy(&content).into_owned();
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(XmlNode::CData(value)),
                        None => {
                            return Err(error_at(
                                text,
                                position,
                                "CDATA outside of the root element",
                            ));
                        }
                    }
                }
                Event::Comment(content) => {
                    let node = XmlNode::Comment(String::from_utf8_lossy(&content).into_owned());
                    attach_misc(node, &mut stack, root.is_some(), &mut prolog, &mut epilog);
                }
                Event::PI(content) => {
                    let node = XmlNode::ProcessingInstruction(
                        String::from_utf8_lossy(&content).into_owned(),
                    );
                    attach_misc(node, &mut stack, root.is_some(), &mut prolog, &mut epilog);
                }
            }
            seen_any = true;
        }

        let Some(root) = root else {
            return Err(ParseError::malformed("document has no root element"));
        };

        Ok(XmlDocument {
            declaration,
            doctype,
            prolog,
            root,
            epilog,
        })
    }

    pub fn declaration(&self) -> Option<&XmlDeclaration> {
        self.declaration.as_ref()
    }

    pub fn doctype(&self) -> Option<&str> {
        self.doctype.as_deref()
    }

    /// Comments and processing instructions before the root element.
    pub fn prolog(&self) -> &[XmlNode] {
        &self.prolog
    }

    pub fn root(&self) -> &XmlElement {
        &self.root
    }

    /// Comments and processing instructions after the root element.
    pub fn epilog(&self) -> &[XmlNode] {
        &self.epilog
    }
}

fn attach_misc(
    node: XmlNode,
    stack: &mut Vec<XmlElement>,
    root_is_set: bool,
    prolog: &mut Vec<XmlNode>,
    epilog: &mut Vec<XmlNode>,
) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
    } else if root_is_set {
        epilog.push(node);
    } else {
        prolog.push(node);
    }
}

fn read_element(start: &BytesStart, text: &str, position: u64) -> ParseResult<XmlElement> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|source| error_at(text, position, source.to_string()))?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute
            .unescape_value()
            .map_err(|source| error_at(text, position, source.to_string()))?
            .into_owned();
        attributes.push((key, value));
    }
    Ok(XmlElement {
        name,
        attributes,
        children: Vec::new(),
    })
}

fn read_declaration(decl: &BytesDecl, text: &str, position: u64) -> ParseResult<XmlDeclaration> {
    let version = decl
        .version()
        .map_err(|source| error_at(text, position, format!("invalid XML declaration: {source}")))?;
    let version = String::from_utf8_lossy(&version).into_owned();
    let encoding = match decl.encoding() {
        Some(Ok(value)) => Some(String::from_utf8_lossy(&value).into_owned()),
        Some(Err(source)) => {
            return Err(error_at(
                text,
                position,
                format!("invalid XML declaration: {source}"),
            ));
        }
        None => None,
    };
    let standalone = match decl.standalone() {
        Some(Ok(value)) => Some(String::from_utf8_lossy(&value).into_owned()),
        Some(Err(source)) => {
            return Err(error_at(
                text,
                position,
                format!("invalid XML declaration: {source}"),
            ));
        }
        None => None,
    };
    Ok(XmlDeclaration {
        version,
        encoding,
        standalone,
    })
}

fn error_at(text: &str, offset: u64, message: impl Into<String>) -> ParseError {
    let (line, column) = line_column(text, offset as usize);
    ParseError::syntax(message, line, column)
}

/// 1-based line/column of a byte offset. Columns count characters, so the
/// offset is walked bytewise skipping UTF-8 continuation bytes.
fn line_column(text: &str, offset: usize) -> (u64, u64) {
    let end = offset.min(text.len());
    let mut line = 1;
    let mut column = 1;
    for &byte in &text.as_bytes()[..end] {
        if byte == b'\n' {
            line += 1;
            column = 1;
        } else if byte & 0xC0 != 0x80 {
            column += 1;
        }
    }
    (line, column)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_document() {
        let document = XmlDocument::parse("<root><child/></root>").unwrap();
        assert_eq!(document.root().name(), "root");
        assert_eq!(document.root().child_elements().count(), 1);
        assert!(document.declaration().is_none());
    }

    #[test]
    fn test_parse_attributes_in_document_order() {
        let document = XmlDocument::parse(r#"<a z="1" y="2" x="3"/>"#).unwrap();
        let attributes: Vec<_> = document.root().attributes().collect();
        assert_eq!(attributes, vec![("z", "1"), ("y", "2"), ("x", "3")]);
    }

    #[test]
    fn test_local_names_strip_namespace_prefixes() {
        let document =
            XmlDocument::parse(r#"<ns:root xmlns:ns="urn:x" ns:attr="v"/>"#).unwrap();
        assert_eq!(document.root().name(), "ns:root");
        assert_eq!(document.root().local_name(), "root");
        assert_eq!(local_part("ns:attr"), "attr");
        assert_eq!(local_part("plain"), "plain");
    }

    #[test]
    fn test_text_and_entities_are_unescaped() {
        let document = XmlDocument::parse("<a>one &amp; two</a>").unwrap();
        assert_eq!(document.root().first_text(), Some("one & two"));
    }

    #[test]
    fn test_cdata_counts_as_text() {
        let document = XmlDocument::parse("<a><![CDATA[<raw>]]></a>").unwrap();
        assert_eq!(document.root().first_text(), Some("<raw>"));
    }

    #[test]
    fn test_whitespace_text_nodes_are_kept() {
        let document = XmlDocument::parse("<a> <b/>real</a>").unwrap();
        assert_eq!(document.root().first_text(), Some(" "));
        assert_eq!(document.root().children().len(), 3);
    }

    #[test]
    fn test_declaration_is_captured() {
        let document =
            XmlDocument::parse(r#"<?xml version="1.0" encoding="UTF-8"?><a/>"#).unwrap();
        let declaration = document.declaration().unwrap();
        assert_eq!(declaration.version, "1.0");
        assert_eq!(declaration.encoding.as_deref(), Some("UTF-8"));
        assert_eq!(declaration.standalone, None);
    }

    #[test]
    fn test_comments_outside_root_are_prolog_and_epilog() {
        let document = XmlDocument::parse("<!--before--><a/><!--after-->").unwrap();
        assert_eq!(document.prolog().len(), 1);
        assert_eq!(document.epilog().len(), 1);
        assert_eq!(
            document.prolog()[0],
            XmlNode::Comment("before".to_string())
        );
    }

    #[test]
    fn test_mismatched_tags_fail() {
        let error = XmlDocument::parse("<a><b></a>").unwrap_err();
        assert!(error.line().is_some());
    }

    #[test]
    fn test_unclosed_tag_fails() {
        let error = XmlDocument::parse("<a>").unwrap_err();
        assert!(error.to_string().contains("unclosed tag `a`"));
    }

    #[test]
    fn test_unclosed_nested_tag_names_innermost() {
        let error = XmlDocument::parse("<a><b>").unwrap_err();
        assert!(error.to_string().contains("unclosed tag `b`"));
    }

    #[test]
    fn test_empty_input_fails() {
        let error = XmlDocument::parse("").unwrap_err();
        assert_eq!(error.to_string(), "document has no root element");
    }

    #[test]
    fn test_whitespace_only_input_fails() {
        let error = XmlDocument::parse("   \n  ").unwrap_err();
        assert_eq!(error.to_string(), "document has no root element");
    }

    #[test]
    fn test_multiple_root_elements_fail() {
        let error = XmlDocument::parse("<a/><b/>").unwrap_err();
        assert!(error.to_string().contains("multiple root elements"));
    }

    #[test]
    fn test_text_outside_root_fails() {
        let error = XmlDocument::parse("<a/>stray").unwrap_err();
        assert!(error.to_string().contains("outside of the root element"));
    }

    #[test]
    fn test_unexpected_closing_tag_fails() {
        assert!(XmlDocument::parse("</a>").is_err());
    }

    #[test]
    fn test_duplicate_attributes_fail() {
        assert!(XmlDocument::parse(r#"<a x="1" x="2"/>"#).is_err());
    }

    #[test]
    fn test_misplaced_declaration_fails() {
        let error = XmlDocument::parse(r#"<a/><?xml version="1.0"?>"#).unwrap_err();
        assert!(error.to_string().contains("start of the document"));
    }

    #[test]
    fn test_error_position_points_into_the_input() {
        let error = XmlDocument::parse("<a>\n  <b></c>\n</a>").unwrap_err();
        assert_eq!(error.line(), Some(2));
    }

    #[test]
    fn test_line_column_counts_characters_not_bytes() {
        // "é" is two bytes but one column.
        let (line, column) = line_column("é<", 3);
        assert_eq!(line, 1);
        assert_eq!(column, 3);
    }

    #[test]
    fn test_element_with_no_children() {
        let document = XmlDocument::parse("<a></a>").unwrap();
        assert!(document.root().children().is_empty());
        assert_eq!(document.root().first_text(), None);
    }
}
