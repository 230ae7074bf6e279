use thiserror::Error;

use crate::token::Token;

/// The main error type for the `tangle_ioc` library.
///
/// Every failure is fail-fast: a resolution that returns an error leaves
/// nothing from its call chain behind in the instance cache.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  #[error("Unsupported token provided: expected a name, found {0}")]
  UnsupportedTokenKind(String),

  #[error("No binding was found for {0}")]
  UnboundToken(Token),

  #[error("Instance bound to {token} is not a `{expected}`")]
  TypeMismatch { token: Token, expected: &'static str },

  #[error("Constructor of {class} asked for dependency #{index} but only {declared} are declared")]
  MissingDependency {
    class: Token,
    index: usize,
    declared: usize,
  },

  #[error("No constructor metadata was supplied for class {0}")]
  MissingMetadata(Token),

  #[error("Deferred reference to {0} was accessed before its construction completed")]
  DeferredNotReady(Token),

  #[error("Deferred reference to {0} outlived the container that owned it")]
  DeferredReleased(Token),

  #[error("Failed to construct {class}: {reason}")]
  Construction { class: Token, reason: String },

  #[error("Failed to read configuration file: {0}")]
  ConfigRead(String),

  #[error("Failed to parse configuration: {0}")]
  ConfigParse(String),
}

impl Error {
  /// Builds a [`Error::Construction`] for constructors that fail on their own terms.
  pub fn construction(class: impl Into<Token>, reason: impl ToString) -> Self {
    Error::Construction {
      class: class.into(),
      reason: reason.to_string(),
    }
  }
}

impl From<std::io::Error> for Error {
  fn from(err: std::io::Error) -> Self {
    Error::ConfigRead(err.to_string())
  }
}

/// A specialized `Result` type for `tangle_ioc` operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
