//! Parsed-but-unresolved configuration documents.
//!
//! Both schemas land here first; [`crate::builder`] turns either variant into the
//! canonical [`shared::domain::CommandTree`].

use std::{fmt, marker::PhantomData};

use serde::{
    de::{MapAccess, Visitor},
    Deserialize, Deserializer,
};
use serde_json::Value;
use shared::error::DocumentError;

#[derive(Debug, Clone, PartialEq)]
pub enum RawDocument {
    Xml(XmlElement),
    Json(JsonDocument),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    /// `name` attribute when present, tag otherwise.
    pub fn display_name(&self) -> &str {
        self.attribute("name").unwrap_or(&self.tag)
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|child| match child {
            XmlNode::Element(element) => Some(element),
            XmlNode::Text(_) => None,
        })
    }

    /// Concatenated text of every descendant text node, in document order.
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        self.collect_text(&mut text);
        text
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                XmlNode::Element(element) => element.collect_text(out),
                XmlNode::Text(text) => out.push_str(text),
            }
        }
    }
}

/// Object entries in document order, duplicates included. The builder decides what a
/// repeated key means.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedEntries<V>(pub Vec<(String, V)>);

impl<V> Default for OrderedEntries<V> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<'de, V> Deserialize<'de> for OrderedEntries<V>
where
    V: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EntriesVisitor<V>(PhantomData<V>);

        impl<'de, V> Visitor<'de> for EntriesVisitor<V>
        where
            V: Deserialize<'de>,
        {
            type Value = OrderedEntries<V>;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("an object")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<String, V>()? {
                    entries.push((key, value));
                }
                Ok(OrderedEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor(PhantomData))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct JsonDocument {
    pub categories: Vec<JsonCategory>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JsonCategory {
    pub name: String,
    pub actions: Vec<(String, JsonActionValue)>,
}

/// The three shapes an action may take in the JSON schema.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonActionValue {
    Single(String),
    List(Vec<String>),
    Detailed {
        commands: Vec<String>,
        show: Option<Value>,
    },
}

impl JsonActionValue {
    pub fn from_value(category: &str, action: &str, value: Value) -> Result<Self, DocumentError> {
        match value {
            Value::String(command) => Ok(Self::Single(command)),
            Value::Array(items) => Ok(Self::List(string_list(category, action, items)?)),
            Value::Object(mut fields) => {
                let commands = match fields.remove("commands") {
                    None | Some(Value::Null) => Vec::new(),
                    Some(Value::String(command)) => vec![command],
                    Some(Value::Array(items)) => string_list(category, action, items)?,
                    Some(other) => {
                        return Err(shape_error(
                            category,
                            action,
                            format!("`commands` must be a string or list, found {}", kind_of(&other)),
                        ))
                    }
                };
                Ok(Self::Detailed {
                    commands,
                    show: fields.remove("show"),
                })
            }
            other => Err(shape_error(
                category,
                action,
                format!("expected a string, list or object, found {}", kind_of(&other)),
            )),
        }
    }
}

fn string_list(category: &str, action: &str, items: Vec<Value>) -> Result<Vec<String>, DocumentError> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::String(command) => Ok(command),
            other => Err(shape_error(
                category,
                action,
                format!("command [{index}] must be a string, found {}", kind_of(&other)),
            )),
        })
        .collect()
}

fn shape_error(category: &str, action: &str, message: String) -> DocumentError {
    DocumentError::Json(format!("action '{action}' in category '{category}': {message}"))
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
