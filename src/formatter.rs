//! Canonical pretty-printer.
//!
//! Parses the input (failing exactly when the parser adapter fails) and
//! re-serializes it with fixed two-space indentation. Elements without
//! renderable content self-close, whitespace-only text is dropped, and the
//! declaration, DOCTYPE, comments, CDATA sections and processing
//! instructions all survive the round trip. The indent width is not
//! configurable.

use quick_xml::Writer;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesPI, BytesStart, BytesText, Event};

use crate::error::{ParseError, ParseResult};
use crate::parser::{XmlDocument, XmlElement, XmlNode};

const INDENT_CHAR: u8 = b' ';
const INDENT_SIZE: usize = 2;

/// Re-serialize `text` in canonical form, or fail with the parser's error
/// unmodified.
pub fn format(text: &str) -> ParseResult<String> {
    let document = XmlDocument::parse(text)?;
    serialize(&document)
}

fn serialize(document: &XmlDocument) -> ParseResult<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), INDENT_CHAR, INDENT_SIZE);

    if let Some(declaration) = document.declaration() {
        writer
            .write_event(Event::Decl(BytesDecl::new(
                &declaration.version,
                declaration.encoding.as_deref(),
                declaration.standalone.as_deref(),
            )))
            .map_err(write_error)?;
    }
    if let Some(doctype) = document.doctype() {
        writer
            .write_event(Event::DocType(BytesText::from_escaped(doctype)))
            .map_err(write_error)?;
    }
    for node in document.prolog() {
        write_node(&mut writer, node)?;
    }
    write_element(&mut writer, document.root())?;
    for node in document.epilog() {
        write_node(&mut writer, node)?;
    }

    String::from_utf8(writer.into_inner())
        .map_err(|source| ParseError::malformed(format!("serialized output not UTF-8: {source}")))
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &XmlElement) -> ParseResult<()> {
    let mut start = BytesStart::new(element.name());
    for (key, value) in element.attributes() {
        start.push_attribute((key, value));
    }

    if element.children().iter().all(is_ignorable) {
        return writer.write_event(Event::Empty(start)).map_err(write_error);
    }

    writer.write_event(Event::Start(start)).map_err(write_error)?;
    for node in element.children() {
        write_node(writer, node)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(element.name())))
        .map_err(write_error)
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &XmlNode) -> ParseResult<()> {
    match node {
        XmlNode::Element(element) => write_element(writer, element),
        XmlNode::Text(value) => {
            if value.trim().is_empty() {
                return Ok(());
            }
            writer
                .write_event(Event::Text(BytesText::new(value)))
                .map_err(write_error)
        }
        XmlNode::CData(value) => writer
            .write_event(Event::CData(BytesCData::new(value.as_str())))
            .map_err(write_error),
        XmlNode::Comment(value) => writer
            .write_event(Event::Comment(BytesText::from_escaped(value.as_str())))
            .map_err(write_error),
        XmlNode::ProcessingInstruction(value) => writer
            .write_event(Event::PI(BytesPI::new(value.as_str())))
            .map_err(write_error),
    }
}

/// Whitespace-only text contributes nothing to the canonical form.
fn is_ignorable(node: &XmlNode) -> bool {
    match node {
        XmlNode::Text(value) => value.trim().is_empty(),
        _ => false,
    }
}

fn write_error(source: std::io::Error) -> ParseError {
    ParseError::malformed(format!("failed to write formatted XML: {source}"))
}
