use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a connected device as reported by the device-listing command.
///
/// An empty serial means no device is selected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceSerial(String);

impl DeviceSerial {
    pub fn new(serial: impl Into<String>) -> Self {
        Self(serial.into().trim().to_string())
    }

    pub fn none() -> Self {
        Self(String::new())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for DeviceSerial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("<none>")
        } else {
            f.write_str(&self.0)
        }
    }
}

impl From<&str> for DeviceSerial {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for DeviceSerial {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceState {
    Device,
    Offline,
    Unauthorized,
    Other,
}

impl DeviceState {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "device" => Self::Device,
            "offline" => Self::Offline,
            "unauthorized" => Self::Unauthorized,
            _ => Self::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSummary {
    pub serial: DeviceSerial,
    pub state: DeviceState,
    pub raw_state: String,
}

/// A named, invokable unit bound to an ordered list of command templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub name: String,
    pub show: bool,
    pub commands: Vec<String>,
}

impl Action {
    pub fn new(name: impl Into<String>, show: bool, commands: Vec<String>) -> Self {
        Self {
            name: name.into(),
            show,
            commands,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub actions: Vec<Action>,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            actions: Vec::new(),
        }
    }

    pub fn action(&self, name: &str) -> Option<&Action> {
        self.actions.iter().find(|action| action.name == name)
    }
}

/// Category → Action → command hierarchy loaded from one configuration document.
///
/// The tree is immutable once built; a new configuration means a new tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CommandTree {
    categories: Vec<Category>,
}

impl CommandTree {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_categories(categories: Vec<Category>) -> Self {
        Self { categories }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|category| category.name == name)
    }

    pub fn find(&self, category: &str, action: &str) -> Option<&Action> {
        self.category(category)?.action(action)
    }

    pub fn action_count(&self) -> usize {
        self.categories
            .iter()
            .map(|category| category.actions.len())
            .sum()
    }

    /// Actions in display order, numbered from 1 across all categories.
    pub fn numbered_actions(&self) -> impl Iterator<Item = (usize, &Category, &Action)> {
        self.categories
            .iter()
            .flat_map(|category| category.actions.iter().map(move |action| (category, action)))
            .enumerate()
            .map(|(index, (category, action))| (index + 1, category, action))
    }

    pub fn action_by_number(&self, number: usize) -> Option<(&Category, &Action)> {
        self.numbered_actions()
            .find(|(n, _, _)| *n == number)
            .map(|(_, category, action)| (category, action))
    }
}
