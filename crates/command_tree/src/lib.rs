//! Loading and building the Category → Action → command tree.
//!
//! Two document schemas are supported:
//!
//! * XML: root element, category elements, action elements whose child elements and
//!   text nodes are commands. `name` attributes override tags; actions take an
//!   optional `show` attribute.
//! * JSON: `{ category: { action: "cmd" | ["cmd", ..] | { "commands": .., "show": "true" } } }`.

pub mod builder;
pub mod json;
pub mod loader;
pub mod raw;
pub mod xml;

pub use builder::build;
pub use loader::{load, ConfigLoader, LoadReport, Schema, SchemaHint, DEFAULT_COMMAND_FILE};
pub use raw::RawDocument;
