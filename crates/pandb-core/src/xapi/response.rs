//! Parse `<response status="...">` documents returned by the XML API.
//!
//! Builds a small element tree with quick-xml; responses are a few hundred
//! bytes so there is no need for streaming extraction.

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use super::XapiError;

/// Minimal XML element: name, attributes, direct text and children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    /// Concatenated text nodes that are direct children of this element.
    pub text: String,
    pub children: Vec<Element>,
}

impl Element {
    fn from_start(start: &BytesStart<'_>) -> Result<Self, quick_xml::Error> {
        let mut attrs = Vec::new();
        for attr in start.attributes() {
            let attr = attr?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            attrs.push((key, value));
        }
        Ok(Self {
            name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
            attrs,
            ..Self::default()
        })
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// First direct child with the given name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// First descendant (depth-first, pre-order) with the given name.
    pub fn find(&self, name: &str) -> Option<&Element> {
        for c in &self.children {
            if c.name == name {
                return Some(c);
            }
            if let Some(found) = c.find(name) {
                return Some(found);
            }
        }
        None
    }

    /// Direct text, or None when the element has no text at all.
    pub fn text_opt(&self) -> Option<&str> {
        if self.text.is_empty() {
            None
        } else {
            Some(&self.text)
        }
    }
}

/// Parsed XML API response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub root: Element,
}

impl ApiResponse {
    pub fn parse(xml: &str) -> Result<Self, XapiError> {
        let root = parse_tree(xml)?;
        if root.name != "response" {
            return Err(XapiError::MissingElement("response"));
        }
        Ok(Self { root })
    }

    pub fn status(&self) -> &str {
        self.root.attr("status").unwrap_or("")
    }

    pub fn is_success(&self) -> bool {
        self.status() == "success"
    }

    /// The `<result>` element, if any.
    pub fn result(&self) -> Option<&Element> {
        self.root.child("result")
    }

    /// Human-readable message from `<msg>`, either its `<line>` children or its text.
    pub fn message(&self) -> Option<String> {
        let msg = self.root.find("msg")?;
        let lines: Vec<&str> = msg
            .children
            .iter()
            .filter(|c| c.name == "line")
            .map(|c| c.text.trim())
            .filter(|s| !s.is_empty())
            .collect();
        if !lines.is_empty() {
            return Some(lines.join("; "));
        }
        let text = msg.text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }

    /// Ok(self) for `status="success"`, otherwise an [`XapiError::Api`].
    pub fn into_success(self) -> Result<Self, XapiError> {
        if self.is_success() {
            return Ok(self);
        }
        let status = self.status().to_string();
        let message = self
            .message()
            .unwrap_or_else(|| format!("request failed with status {status:?}"));
        Err(XapiError::Api { status, message })
    }
}

fn parse_tree(xml: &str) -> Result<Element, XapiError> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => stack.push(Element::from_start(&start)?),
            Event::Empty(start) => {
                let elem = Element::from_start(&start)?;
                attach(&mut stack, &mut root, elem);
            }
            Event::End(_) => {
                if let Some(elem) = stack.pop() {
                    attach(&mut stack, &mut root, elem);
                }
            }
            Event::Text(text) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&text.unescape()?);
                }
            }
            Event::CData(cdata) => {
                if let Some(top) = stack.last_mut() {
                    top.text
                        .push_str(&String::from_utf8_lossy(&cdata.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    root.ok_or(XapiError::MissingElement("response"))
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, elem: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(elem),
        None => {
            if root.is_none() {
                *root = Some(elem);
            }
        }
    }
}
