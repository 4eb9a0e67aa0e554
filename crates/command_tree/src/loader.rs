use std::{
    fs, io,
    path::Path,
    str::FromStr,
};

use serde::Deserialize;
use shared::{
    domain::CommandTree,
    error::{ConfigError, DocumentError},
};
use tracing::{info, warn};

use crate::{builder, json, raw::RawDocument, xml};

pub const DEFAULT_COMMAND_FILE: &str = "Data/cmd.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schema {
    Xml,
    Json,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaHint {
    #[default]
    Auto,
    Xml,
    Json,
}

impl FromStr for SchemaHint {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "auto" | "" => Ok(Self::Auto),
            "xml" => Ok(Self::Xml),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown schema '{other}' (expected auto, xml or json)")),
        }
    }
}

impl SchemaHint {
    /// Extension decides first; otherwise a leading `<` means XML.
    pub fn resolve(self, path: &Path, source: &str) -> Schema {
        match self {
            Self::Xml => Schema::Xml,
            Self::Json => Schema::Json,
            Self::Auto => {
                let extension = path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .map(str::to_ascii_lowercase);
                match extension.as_deref() {
                    Some("xml") => Schema::Xml,
                    Some("json") => Schema::Json,
                    _ if source.trim_start().starts_with('<') => Schema::Xml,
                    _ => Schema::Json,
                }
            }
        }
    }
}

/// Tree plus the warning to surface when loading fell back to an empty tree.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub tree: CommandTree,
    pub warning: Option<ConfigError>,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    schema: SchemaHint,
}

impl ConfigLoader {
    pub fn new(schema: SchemaHint) -> Self {
        Self { schema }
    }

    pub fn load(&self, path: impl AsRef<Path>) -> Result<CommandTree, ConfigError> {
        let path = path.as_ref();
        let source = read_source(path)?;
        if source.trim().is_empty() {
            return Err(ConfigError::parse_failure(path, "document is empty"));
        }

        let schema = self.schema.resolve(path, &source);
        let raw = parse_document(&source, schema)
            .map_err(|e| ConfigError::parse_failure(path, e.to_string()))?;
        let tree = builder::build(&raw);
        info!(
            path = %path.display(),
            ?schema,
            categories = tree.categories().len(),
            actions = tree.action_count(),
            "loaded command tree"
        );
        Ok(tree)
    }

    /// Never fails: any error yields an empty tree and is returned as a warning.
    pub fn load_lenient(&self, path: impl AsRef<Path>) -> LoadReport {
        match self.load(path) {
            Ok(tree) => LoadReport {
                tree,
                warning: None,
            },
            Err(error) => {
                warn!(kind = ?error.kind, %error, "continuing with an empty command tree");
                LoadReport {
                    tree: CommandTree::empty(),
                    warning: Some(error),
                }
            }
        }
    }
}

pub fn load(path: impl AsRef<Path>) -> Result<CommandTree, ConfigError> {
    ConfigLoader::default().load(path)
}

pub fn parse_document(source: &str, schema: Schema) -> Result<RawDocument, DocumentError> {
    match schema {
        Schema::Xml => xml::parse(source).map(RawDocument::Xml),
        Schema::Json => json::parse(source).map(RawDocument::Json),
    }
}

fn read_source(path: &Path) -> Result<String, ConfigError> {
    if path.as_os_str().is_empty() {
        return Err(ConfigError::empty_path());
    }
    match fs::read_to_string(path) {
        Ok(source) => Ok(source.trim_start_matches('\u{feff}').to_string()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(ConfigError::not_found(path)),
        Err(e) => Err(ConfigError::unreadable(path, e.to_string())),
    }
}

#[cfg(test)]
#[path = "tests/loader_tests.rs"]
mod tests;
