//! Canonical dependency tokens.

use crate::error::{Error, Result};

use std::fmt;
use std::sync::Arc;

/// The canonical identifier used to bind and request a dependency.
///
/// A token is derived deterministically from a name: the plain string
/// `"Logger"`, a class whose name is `"Logger"` and an existing `Token`
/// for `"Logger"` all normalize to the same key. Tokens compare by name;
/// cloning one shares its name.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Token(Arc<str>);

impl Token {
  pub fn new(name: &str) -> Self {
    Token(Arc::from(name))
  }

  /// The token a class is bound to by `bind_self`: its own name.
  pub fn of<T: crate::Injectable>() -> Self {
    Token::new(T::NAME)
  }

  pub fn name(&self) -> &str {
    &self.0
  }
}

impl fmt::Debug for Token {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Token({})", self.0)
  }
}

impl fmt::Display for Token {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

// --- Normalization ---

impl From<&str> for Token {
  fn from(name: &str) -> Self {
    Token::new(name)
  }
}

impl From<String> for Token {
  fn from(name: String) -> Self {
    Token::new(&name)
  }
}

impl From<&String> for Token {
  fn from(name: &String) -> Self {
    Token::new(name)
  }
}

impl From<&Token> for Token {
  fn from(token: &Token) -> Self {
    token.clone()
  }
}

impl From<&crate::ClassDescriptor> for Token {
  fn from(class: &crate::ClassDescriptor) -> Self {
    class.name().clone()
  }
}

/// Normalizes a token read from a configuration or metadata document.
///
/// Only strings name a dependency; every other kind is rejected.
impl TryFrom<&serde_json::Value> for Token {
  type Error = Error;

  fn try_from(value: &serde_json::Value) -> Result<Self> {
    use serde_json::Value;

    match value {
      Value::String(name) => Ok(Token::new(name)),
      Value::Null => Err(Error::UnsupportedTokenKind("null".to_string())),
      Value::Bool(b) => Err(Error::UnsupportedTokenKind(format!("boolean `{}`", b))),
      Value::Number(n) => Err(Error::UnsupportedTokenKind(format!("number `{}`", n))),
      Value::Array(_) => Err(Error::UnsupportedTokenKind("array".to_string())),
      Value::Object(_) => Err(Error::UnsupportedTokenKind("object".to_string())),
    }
  }
}
