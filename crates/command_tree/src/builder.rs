//! Raw document → [`CommandTree`].
//!
//! Duplicate names are resolved the same way for both schemas: a repeated category
//! merges into the first one, a repeated action replaces the earlier action in place.

use serde_json::Value;
use shared::domain::{Action, Category, CommandTree};
use tracing::debug;

use crate::raw::{JsonActionValue, JsonDocument, RawDocument, XmlElement, XmlNode};

pub fn build(raw: &RawDocument) -> CommandTree {
    match raw {
        RawDocument::Xml(root) => build_from_xml(root),
        RawDocument::Json(document) => build_from_json(document),
    }
}

pub fn build_from_xml(root: &XmlElement) -> CommandTree {
    let mut builder = TreeBuilder::default();
    for category in root.child_elements() {
        let index = builder.category(category.display_name());
        for action in category.child_elements() {
            let commands = action.children.iter().map(|node| match node {
                XmlNode::Element(element) => element.text_content(),
                XmlNode::Text(text) => text.clone(),
            });
            builder.action(
                index,
                Action::new(
                    action.display_name(),
                    resolve_show(action.attribute("show")),
                    normalize_commands(commands),
                ),
            );
        }
    }
    builder.finish()
}

pub fn build_from_json(document: &JsonDocument) -> CommandTree {
    let mut builder = TreeBuilder::default();
    for category in &document.categories {
        let index = builder.category(&category.name);
        for (name, value) in &category.actions {
            let action = match value {
                JsonActionValue::Single(command) => {
                    Action::new(name, false, normalize_commands([command.clone()]))
                }
                JsonActionValue::List(commands) => {
                    Action::new(name, false, normalize_commands(commands.iter().cloned()))
                }
                JsonActionValue::Detailed { commands, show } => {
                    let show = match show {
                        Some(Value::String(flag)) => resolve_show(Some(flag.as_str())),
                        _ => false,
                    };
                    Action::new(name, show, normalize_commands(commands.iter().cloned()))
                }
            };
            builder.action(index, action);
        }
    }
    builder.finish()
}

/// `"true"` in any letter case enables echoing; everything else disables it.
pub fn resolve_show(flag: Option<&str>) -> bool {
    flag.is_some_and(|flag| flag.trim().eq_ignore_ascii_case("true"))
}

/// Trims every entry and drops the ones left blank, keeping document order.
pub fn normalize_commands<I>(commands: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    commands
        .into_iter()
        .filter_map(|command| {
            let trimmed = command.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .collect()
}

#[derive(Default)]
struct TreeBuilder {
    categories: Vec<Category>,
}

impl TreeBuilder {
    fn category(&mut self, name: &str) -> usize {
        if let Some(index) = self.categories.iter().position(|c| c.name == name) {
            debug!(category = name, "merging repeated category");
            return index;
        }
        self.categories.push(Category::new(name));
        self.categories.len() - 1
    }

    fn action(&mut self, category: usize, action: Action) {
        let category = &mut self.categories[category];
        match category.actions.iter_mut().find(|a| a.name == action.name) {
            Some(existing) => {
                debug!(
                    category = %category.name,
                    action = %action.name,
                    "repeated action replaces earlier definition"
                );
                *existing = action;
            }
            None => category.actions.push(action),
        }
    }

    fn finish(self) -> CommandTree {
        CommandTree::from_categories(self.categories)
    }
}

#[cfg(test)]
#[path = "tests/builder_tests.rs"]
mod tests;
