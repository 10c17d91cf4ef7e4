//! Parse module for the view compiler.
//!
//! Reads view document XML into the [`Document`] tree with `quick-xml`.
//! Namespace prefixes are dropped (`v:Nodes` and `Nodes` are the same element)
//! and `xmlns` declarations never reach the tree, so schema-bound documents and
//! bare ones translate identically.

use quick_xml::events::attributes::Attributes;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::document::{Attribute, Document, Element};
use crate::validate::{CompileError, Result};

/// 1-based line numbers for byte offsets. Events arrive in document order, so
/// the counter only scans the bytes between consecutive offsets.
struct LineCounter<'a> {
    source: &'a [u8],
    offset: usize,
    line: u32,
}

impl<'a> LineCounter<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source: source.as_bytes(),
            offset: 0,
            line: 1,
        }
    }

    fn line_at(&mut self, offset: usize) -> u32 {
        let offset = offset.min(self.source.len());
        if offset >= self.offset {
            self.line += count_newlines(&self.source[self.offset..offset]);
        } else {
            self.line -= count_newlines(&self.source[offset..self.offset]);
        }
        self.offset = offset;
        self.line
    }
}

fn count_newlines(bytes: &[u8]) -> u32 {
    bytes.iter().filter(|b| **b == b'\n').count() as u32
}

fn xml_error(line: u32, message: impl ToString) -> CompileError {
    CompileError::Xml {
        message: message.to_string(),
        line,
    }
}

fn utf8(bytes: &[u8], line: u32) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| xml_error(line, e))
}

fn read_attributes(attributes: Attributes, line: u32) -> Result<Vec<Attribute>> {
    let mut out = Vec::new();
    for attr in attributes {
        let attr = attr.map_err(|e| xml_error(line, e))?;
        let key = attr.key;
        if key.as_ref() == b"xmlns" || key.as_ref().starts_with(b"xmlns:") {
            continue;
        }
        let name = utf8(key.local_name().as_ref(), line)?;
        let value = attr
            .unescape_value()
            .map_err(|e| xml_error(line, e))?
            .into_owned();
        out.push(Attribute { name, value });
    }
    Ok(out)
}

fn open_element(start: &BytesStart, line: u32) -> Result<Element> {
    Ok(Element {
        tag: utf8(start.local_name().as_ref(), line)?,
        attributes: read_attributes(start.attributes(), line)?,
        children: Vec::new(),
        text: String::new(),
        line,
    })
}

/// Closes `element` into its parent, or makes it the root.
fn attach(element: Element, stack: &mut [Element], root: &mut Option<Element>, line: u32) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(element);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(xml_error(line, "document has more than one root element")),
    }
}

pub fn parse_document(source: &str) -> Result<Document> {
    let mut reader = Reader::from_str(source);
    reader.config_mut().trim_text(true);
    let mut lines = LineCounter::new(source);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let before = reader.buffer_position() as usize;
        // Offset of the markup the next event starts at.
        let offset = source
            .get(before..)
            .and_then(|rest| rest.find('<'))
            .map_or(before, |i| before + i);

        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => return Err(xml_error(lines.line_at(reader.error_position() as usize), e)),
        };
        let line = lines.line_at(offset);

        match event {
            Event::Start(start) => {
                stack.push(open_element(&start, line)?);
            }
            Event::Empty(start) => {
                let element = open_element(&start, line)?;
                attach(element, &mut stack, &mut root, line)?;
            }
            Event::End(_) => {
                let Some(element) = stack.pop() else {
                    return Err(xml_error(line, "unexpected closing tag"));
                };
                attach(element, &mut stack, &mut root, line)?;
            }
            Event::Text(text) => {
                let value = text.unescape().map_err(|e| xml_error(line, e))?;
                match stack.last_mut() {
                    Some(current) => current.text.push_str(&value),
                    None => return Err(xml_error(line, "text outside the root element")),
                }
            }
            Event::CData(data) => {
                let value = utf8(&data, line)?;
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&value);
                }
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions, doctype.
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(xml_error(
            lines.line_at(source.len()),
            format!("element <{}> is never closed", open.tag),
        ));
    }
    root.map(Document::new)
        .ok_or_else(|| xml_error(lines.line_at(source.len()), "document has no root element"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_counter_moves_both_ways() {
        let mut lines = LineCounter::new("a\nb\n\nc");
        assert_eq!(lines.line_at(0), 1);
        assert_eq!(lines.line_at(2), 2);
        assert_eq!(lines.line_at(5), 4);
        assert_eq!(lines.line_at(3), 2);
        assert_eq!(lines.line_at(100), 4);
    }
}
