//! Container configuration, loadable from YAML or JSON.
//!
//! ```yaml
//! missing_metadata: empty   # or `reject`
//! constructors:
//!   UserService: [UserRepository, Mailer, Logger]
//!   UserRepository: []
//! ```

use crate::error::{Error, Result};
use crate::metadata::MetadataTable;

use serde::Deserialize;
use std::fs;
use std::path::Path;

/// What to do when a bound class has no entry in the metadata table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingMetadata {
  /// Construct the class with no arguments.
  #[default]
  Empty,
  /// Fail the resolution with [`Error::MissingMetadata`].
  Reject,
}

/// Behavioral switches of a [`Container`](crate::Container).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContainerOptions {
  pub missing_metadata: MissingMetadata,
}

// --- Raw (as written in the file) ---

#[derive(Debug, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
struct ContainerConfigRaw {
  #[serde(default)]
  missing_metadata: MissingMetadata,
  // Kept loose so that a non-string dependency name is reported as an
  // unsupported token kind instead of a generic parse error.
  #[serde(default)]
  constructors: Option<serde_json::Value>,
}

// --- Processed ---

/// A validated container configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerConfig {
  pub options: ContainerOptions,
  pub metadata: MetadataTable,
}

impl ContainerConfig {
  fn from_raw(raw: ContainerConfigRaw) -> Result<Self> {
    let metadata = match raw.constructors {
      None | Some(serde_json::Value::Null) => MetadataTable::new(),
      Some(value) => MetadataTable::from_value(&value)?,
    };
    Ok(Self {
      options: ContainerOptions {
        missing_metadata: raw.missing_metadata,
      },
      metadata,
    })
  }

  pub fn from_yaml_str(source: &str) -> Result<Self> {
    let raw: ContainerConfigRaw =
      serde_yaml::from_str(source).map_err(|e| Error::ConfigParse(e.to_string()))?;
    Self::from_raw(raw)
  }

  pub fn from_json_str(source: &str) -> Result<Self> {
    let raw: ContainerConfigRaw =
      serde_json::from_str(source).map_err(|e| Error::ConfigParse(e.to_string()))?;
    Self::from_raw(raw)
  }

  /// Loads a configuration file, picking the format from its extension.
  ///
  /// `.json` is parsed as JSON; `.yaml`, `.yml` and anything else as YAML.
  pub fn from_file(path: &Path) -> Result<Self> {
    tracing::debug!(path = %path.display(), "loading container configuration");
    let source = fs::read_to_string(path)?;
    match path.extension().and_then(|ext| ext.to_str()) {
      Some("json") => Self::from_json_str(&source),
      _ => Self::from_yaml_str(&source),
    }
  }
}
