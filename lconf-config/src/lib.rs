//! Parse and serialize settings for the lconf tools, read from TOML.
//!
//! The baseline is `defaults/lconf.default.toml`, compiled in with
//! `include_str!`. A [`Loader`] stacks user files and single-key overrides on
//! it and produces an [`LconfConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use lconf::{ParseOptions, SerializeOptions};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/lconf.default.toml");

/// The `[parse]` and `[serialize]` tables
#[derive(Debug, Clone, Deserialize)]
pub struct LconfConfig {
    pub parse: ParseOptions,
    pub serialize: SerializeOptions,
}

/// Builds an [`LconfConfig`] from the embedded defaults plus whatever the
/// caller layers on top. Later layers win key by key.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    pub fn new() -> Self {
        Self {
            builder: Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml)),
        }
    }

    /// Layer a TOML file that must exist.
    pub fn with_file(self, path: impl AsRef<Path>) -> Self {
        self.layer(path.as_ref(), true)
    }

    /// Layer a TOML file if it exists, e.g. a per-user `lconf.toml`.
    pub fn with_optional_file(self, path: impl AsRef<Path>) -> Self {
        self.layer(path.as_ref(), false)
    }

    fn layer(mut self, path: &Path, required: bool) -> Self {
        let file = File::from(path).format(FileFormat::Toml).required(required);
        self.builder = self.builder.add_source(file);
        self
    }

    /// Override one dotted key such as `serialize.indent_width`.
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Reject `@"path"` directives regardless of what the files say.
    pub fn without_includes(self) -> Result<Self, ConfigError> {
        self.set_override("parse.allow_includes", false)
    }

    pub fn build(self) -> Result<LconfConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// The configuration with nothing layered over the defaults.
pub fn load_defaults() -> Result<LconfConfig, ConfigError> {
    Loader::new().build()
}
