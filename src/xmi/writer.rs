//! Streaming XML writer with an explicit open-element stack.
//!
//! Output is written incrementally — inputs can reach thousands of
//! elements, so no full document tree is materialized. The stack is the
//! single record of open contexts: `close` always closes the most
//! recently opened element, which makes out-of-order closing impossible
//! by construction, including on error paths that bail through
//! `close_all`.

use std::io::Write;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::error::GenerateError;

pub struct XmlStreamWriter<W: Write> {
    writer: Writer<W>,
    stack: Vec<String>,
}

impl<W: Write> XmlStreamWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            writer: Writer::new_with_indent(inner, b' ', 2),
            stack: Vec::new(),
        }
    }

    /// Write the XML declaration. Call once, before any element.
    pub fn declaration(&mut self) -> Result<(), GenerateError> {
        self.writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(|e| GenerateError::xml(format!("write error: {e}")))
    }

    /// Open an element and push it on the context stack.
    pub fn open(&mut self, elem: BytesStart<'_>) -> Result<(), GenerateError> {
        let name = String::from_utf8_lossy(elem.name().as_ref()).into_owned();
        self.writer
            .write_event(Event::Start(elem))
            .map_err(|e| GenerateError::xml(format!("write error: {e}")))?;
        self.stack.push(name);
        Ok(())
    }

    /// Write a self-closing element; the stack is untouched.
    pub fn empty(&mut self, elem: BytesStart<'_>) -> Result<(), GenerateError> {
        self.writer
            .write_event(Event::Empty(elem))
            .map_err(|e| GenerateError::xml(format!("write error: {e}")))
    }

    /// Write escaped character data inside the current element.
    pub fn text(&mut self, text: &str) -> Result<(), GenerateError> {
        self.writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(|e| GenerateError::xml(format!("write error: {e}")))
    }

    /// Close the most recently opened element.
    pub fn close(&mut self) -> Result<(), GenerateError> {
        let name = self
            .stack
            .pop()
            .ok_or_else(|| GenerateError::xml("close without matching open"))?;
        self.writer
            .write_event(Event::End(BytesEnd::new(&name)))
            .map_err(|e| GenerateError::xml(format!("write error: {e}")))
    }

    /// Close every remaining open element, innermost first.
    pub fn close_all(&mut self) -> Result<(), GenerateError> {
        while !self.stack.is_empty() {
            self.close()?;
        }
        Ok(())
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Close any remaining contexts and return the inner writer.
    pub fn finish(mut self) -> Result<W, GenerateError> {
        self.close_all()?;
        Ok(self.writer.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attr_elem(name: &str, attrs: &[(&str, &str)]) -> BytesStart<'static> {
        let mut e = BytesStart::new(name.to_string());
        for (k, v) in attrs {
            e.push_attribute((*k, *v));
        }
        e
    }

    #[test]
    fn test_lifo_close_order() {
        let mut w = XmlStreamWriter::new(Vec::new());
        w.open(attr_elem("a", &[])).unwrap();
        w.open(attr_elem("b", &[])).unwrap();
        assert_eq!(w.depth(), 2);
        w.close().unwrap();
        w.close().unwrap();
        let out = String::from_utf8(w.finish().unwrap()).unwrap();
        assert!(out.contains("</b>"));
        assert!(out.rfind("</a>").unwrap() > out.rfind("</b>").unwrap());
    }

    #[test]
    fn test_close_without_open_is_error() {
        let mut w = XmlStreamWriter::new(Vec::new());
        assert!(w.close().is_err());
    }

    #[test]
    fn test_finish_closes_remaining() {
        let mut w = XmlStreamWriter::new(Vec::new());
        w.open(attr_elem("outer", &[("k", "v")])).unwrap();
        w.open(attr_elem("inner", &[])).unwrap();
        let out = String::from_utf8(w.finish().unwrap()).unwrap();
        assert!(out.contains("</inner>"));
        assert!(out.ends_with("</outer>"));
    }
}
