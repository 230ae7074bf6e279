//! The read-only table of constructor dependencies, keyed by class name.

use crate::error::{Error, Result};
use crate::token::Token;

use std::collections::HashMap;
use std::sync::Arc;

/// Maps a class name to the ordered list of tokens its constructor takes.
///
/// The table is supplied once, when the container is built, and never
/// changes afterwards. Producing it (by hand, from a config file, or from a
/// code generator) is the caller's business.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataTable {
  constructors: HashMap<Token, Arc<[Token]>>,
}

impl MetadataTable {
  /// Creates an empty table. Every class then resolves with zero dependencies.
  pub fn new() -> Self {
    Self::default()
  }

  /// Adds (or replaces) the dependency list for `class`.
  pub fn with<C, I, D>(mut self, class: C, dependencies: I) -> Self
  where
    C: Into<Token>,
    I: IntoIterator<Item = D>,
    D: Into<Token>,
  {
    self.insert(class, dependencies);
    self
  }

  pub fn insert<C, I, D>(&mut self, class: C, dependencies: I)
  where
    C: Into<Token>,
    I: IntoIterator<Item = D>,
    D: Into<Token>,
  {
    let dependencies: Arc<[Token]> = dependencies.into_iter().map(Into::into).collect();
    self.constructors.insert(class.into(), dependencies);
  }

  /// Returns the declared dependencies of `class`, or `None` when the table
  /// has no entry for it.
  pub fn dependencies_of(&self, class: &Token) -> Option<Arc<[Token]>> {
    self.constructors.get(class).cloned()
  }

  pub fn contains(&self, class: &Token) -> bool {
    self.constructors.contains_key(class)
  }

  pub fn len(&self) -> usize {
    self.constructors.len()
  }

  pub fn is_empty(&self) -> bool {
    self.constructors.is_empty()
  }

  /// Iterates over `(class, dependencies)` pairs in no particular order.
  pub fn iter(&self) -> impl Iterator<Item = (&Token, &[Token])> {
    self.constructors.iter().map(|(k, v)| (k, &**v))
  }

  // --- Loading ---

  /// Builds a table from an already parsed document of the shape
  /// `{ "ClassName": ["Dep", ...], ... }`.
  pub fn from_value(value: &serde_json::Value) -> Result<Self> {
    let entries = value.as_object().ok_or_else(|| {
      Error::ConfigParse("constructor metadata must be a mapping of class name to a list".into())
    })?;

    let mut table = MetadataTable::new();
    for (class, deps) in entries {
      let deps = deps.as_array().ok_or_else(|| {
        Error::ConfigParse(format!(
          "dependencies of class '{}' must be a list of names",
          class
        ))
      })?;
      let deps = deps.iter().map(Token::try_from).collect::<Result<Vec<_>>>()?;
      table.insert(class.as_str(), deps);
    }
    Ok(table)
  }

  pub fn from_json_str(source: &str) -> Result<Self> {
    let value: serde_json::Value =
      serde_json::from_str(source).map_err(|e| Error::ConfigParse(e.to_string()))?;
    Self::from_value(&value)
  }

  pub fn from_yaml_str(source: &str) -> Result<Self> {
    let value: serde_json::Value =
      serde_yaml::from_str(source).map_err(|e| Error::ConfigParse(e.to_string()))?;
    Self::from_value(&value)
  }
}

impl<C, I, D> FromIterator<(C, I)> for MetadataTable
where
  C: Into<Token>,
  I: IntoIterator<Item = D>,
  D: Into<Token>,
{
  fn from_iter<T: IntoIterator<Item = (C, I)>>(iter: T) -> Self {
    let mut table = MetadataTable::new();
    for (class, deps) in iter {
      table.insert(class, deps);
    }
    table
  }
}
