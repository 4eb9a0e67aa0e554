use std::{
    fs, io,
    path::{Path, PathBuf},
};

use anyhow::Context;
use command_tree::{SchemaHint, DEFAULT_COMMAND_FILE};
use device_core::{StderrMode, DEFAULT_PROGRAM};
use serde::Deserialize;
use shared::input::parse_or_default;
use tracing::warn;

pub const DEFAULT_SETTINGS_FILE: &str = "devdeck.toml";
pub const DEFAULT_LAYOUT_WIDTH: u16 = 80;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub command_file: PathBuf,
    pub schema: SchemaHint,
    pub program: String,
    pub stderr: StderrMode,
    pub layout_width: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            command_file: PathBuf::from(DEFAULT_COMMAND_FILE),
            schema: SchemaHint::Auto,
            program: DEFAULT_PROGRAM.into(),
            stderr: StderrMode::Inherit,
            layout_width: DEFAULT_LAYOUT_WIDTH,
        }
    }
}

/// Defaults, then the settings file, then `APP__*` environment overrides.
///
/// An explicitly named settings file must exist and parse. The implicit
/// `devdeck.toml` is optional, and a broken one is skipped with a warning.
pub fn load_settings(explicit: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = match explicit {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read settings file '{}'", path.display()))?;
            parse_settings(&raw)
                .with_context(|| format!("invalid settings file '{}'", path.display()))?
        }
        None => match fs::read_to_string(DEFAULT_SETTINGS_FILE) {
            Ok(raw) => parse_settings(&raw).unwrap_or_else(|error| {
                warn!(file = DEFAULT_SETTINGS_FILE, %error, "ignoring invalid settings file");
                Settings::default()
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Settings::default(),
            Err(error) => {
                warn!(file = DEFAULT_SETTINGS_FILE, %error, "ignoring unreadable settings file");
                Settings::default()
            }
        },
    };

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

/// A positive column count, or `fallback` for invalid input and zero.
pub fn parse_layout_width(raw: &str, fallback: u16) -> u16 {
    match parse_or_default(raw, fallback) {
        0 => fallback,
        width => width,
    }
}

pub fn parse_settings(raw: &str) -> Result<Settings, toml::de::Error> {
    toml::from_str(raw)
}

pub fn apply_env_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("APP__COMMAND_FILE") {
        settings.command_file = PathBuf::from(v);
    }

    if let Some(v) = lookup("APP__SCHEMA") {
        match v.parse() {
            Ok(schema) => settings.schema = schema,
            Err(error) => warn!(%error, "ignoring APP__SCHEMA"),
        }
    }

    if let Some(v) = lookup("APP__PROGRAM") {
        settings.program = v;
    }

    if let Some(v) = lookup("APP__STDERR") {
        match v.parse() {
            Ok(mode) => settings.stderr = mode,
            Err(error) => warn!(%error, "ignoring APP__STDERR"),
        }
    }

    if let Some(v) = lookup("APP__LAYOUT_WIDTH") {
        settings.layout_width = parse_layout_width(&v, settings.layout_width);
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
