use quick_xml::{
    events::{BytesStart, Event},
    Reader,
};
use shared::error::DocumentError;

use crate::raw::{XmlElement, XmlNode};

/// Parses an XML document into an element tree rooted at its single root element.
pub fn parse(source: &str) -> Result<XmlElement, DocumentError> {
    let mut reader = Reader::from_str(source);
    let mut open: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            DocumentError::Xml(format!("parse error at byte {}: {e}", reader.buffer_position()))
        })?;
        match event {
            Event::Start(ref start) => open.push(element_from(start)?),
            Event::Empty(ref start) => {
                let element = element_from(start)?;
                attach(&mut open, &mut root, element)?;
            }
            Event::End(_) => {
                let element = open
                    .pop()
                    .ok_or_else(|| DocumentError::Xml("unexpected closing tag".into()))?;
                attach(&mut open, &mut root, element)?;
            }
            Event::Text(ref text) => {
                let text = text
                    .unescape()
                    .map_err(|e| DocumentError::Xml(format!("invalid text: {e}")))?;
                push_text(&mut open, text.into_owned())?;
            }
            Event::CData(ref data) => {
                push_text(&mut open, String::from_utf8_lossy(data).into_owned())?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(unclosed) = open.last() {
        return Err(DocumentError::Xml(format!(
            "element <{}> is never closed",
            unclosed.tag
        )));
    }
    root.ok_or(DocumentError::MissingRoot)
}

fn element_from(start: &BytesStart<'_>) -> Result<XmlElement, DocumentError> {
    let mut element = XmlElement::new(String::from_utf8_lossy(start.name().as_ref()));
    for attr in start.attributes() {
        let attr = attr.map_err(|e| DocumentError::Xml(format!("attribute error: {e}")))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| DocumentError::Xml(format!("attribute '{key}': {e}")))?
            .into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn attach(
    open: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<(), DocumentError> {
    if let Some(parent) = open.last_mut() {
        parent.children.push(XmlNode::Element(element));
        return Ok(());
    }
    if root.is_some() {
        return Err(DocumentError::Xml(format!(
            "second root element <{}>",
            element.tag
        )));
    }
    *root = Some(element);
    Ok(())
}

/// Adjacent text and CDATA runs collapse into one text node; only child elements split
/// them.
fn push_text(open: &mut [XmlElement], text: String) -> Result<(), DocumentError> {
    match open.last_mut() {
        Some(parent) => {
            match parent.children.last_mut() {
                Some(XmlNode::Text(previous)) => previous.push_str(&text),
                _ => parent.children.push(XmlNode::Text(text)),
            }
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(DocumentError::Xml("text outside the root element".into())),
    }
}
