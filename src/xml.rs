//! Generic XML to ordered-map conversion
//!
//! The tree follows the usual xml-to-dict conventions: attributes become
//! `@name` keys, mixed text becomes `#text`, leaf elements collapse to their
//! text (or `null` when empty) and repeated siblings turn into arrays.

use quick_xml::{
    Reader,
    events::{BytesStart, Event},
};
use serde_json::{Map, Value};

use crate::{Error, Result};

const TEXT_KEY: &str = "#text";

struct Element {
    name: String,
    children: Map<String, Value>,
    text: String,
}

impl Element {
    fn open(start: &BytesStart<'_>) -> Result<Self> {
        let mut children = Map::new();
        for attribute in start.attributes() {
            let attribute = attribute.map_err(quick_xml::Error::from)?;
            let key = format!("@{}", String::from_utf8_lossy(attribute.key.as_ref()));
            let value = attribute.unescape_value()?.into_owned();
            children.insert(key, Value::String(value));
        }

        Ok(Self {
            name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
            children,
            text: String::new(),
        })
    }

    fn into_entry(self) -> (String, Value) {
        let text = self.text.trim();
        let value = match (self.children.is_empty(), text.is_empty()) {
            (true, true) => Value::Null,
            (true, false) => Value::String(text.to_owned()),
            (false, _) => {
                let mut children = self.children;
                if !text.is_empty() {
                    children.insert(TEXT_KEY.into(), Value::String(text.to_owned()));
                }
                Value::Object(children)
            }
        };
        (self.name, value)
    }
}

fn insert_child(parent: &mut Map<String, Value>, key: String, value: Value) {
    match parent.get_mut(&key) {
        // element values are never arrays, so an array here means repetition
        Some(Value::Array(siblings)) => siblings.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            parent.insert(key, value);
        }
    }
}

struct TreeBuilder {
    stack: Vec<Element>,
    document: Option<Map<String, Value>>,
}

impl TreeBuilder {
    fn open(&mut self, element: Element) -> Result<()> {
        if self.stack.is_empty() && self.document.is_some() {
            return Err(Error::MalformedXml("more than one root element"));
        }
        self.stack.push(element);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        let element = self
            .stack
            .pop()
            .ok_or(Error::MalformedXml("closing tag without an open element"))?;
        let (name, value) = element.into_entry();

        match self.stack.last_mut() {
            Some(parent) => insert_child(&mut parent.children, name, value),
            None => {
                let mut root = Map::new();
                root.insert(name, value);
                self.document = Some(root);
            }
        }
        Ok(())
    }

    fn text(&mut self, text: &str) -> Result<()> {
        match self.stack.last_mut() {
            Some(element) => element.text.push_str(text),
            None if text.trim().is_empty() => {}
            None => return Err(Error::MalformedXml("text outside the root element")),
        }
        Ok(())
    }

    fn finish(self) -> Result<Map<String, Value>> {
        if !self.stack.is_empty() {
            return Err(Error::MalformedXml("unclosed element at end of input"));
        }
        self.document
            .ok_or(Error::MalformedXml("document has no root element"))
    }
}

/// Parses `body` into `{ root_name: value }`, keeping document order.
pub(crate) fn parse(body: &str) -> Result<Map<String, Value>> {
    let mut reader = Reader::from_str(body);
    let mut builder = TreeBuilder {
        stack: Vec::new(),
        document: None,
    };

    loop {
        match reader.read_event()? {
            Event::Start(start) => builder.open(Element::open(&start)?)?,
            Event::Empty(start) => {
                builder.open(Element::open(&start)?)?;
                builder.close()?;
            }
            Event::End(_) => builder.close()?,
            Event::Text(text) => builder.text(&text.unescape()?)?,
            Event::CData(data) => builder.text(&String::from_utf8_lossy(&data))?,
            Event::Eof => break,
            // declarations, comments, processing instructions, doctype
            _ => {}
        }
    }

    builder.finish()
}
