//! # Tangle IoC
//!
//! A lazily wired Inversion of Control (IoC) container for Rust.
//!
//! Classes and constants are bound to tokens up front. A separately supplied
//! [`MetadataTable`] lists, for each class name, the tokens its constructor
//! takes. The first [`Container::get`] for a token builds the whole graph
//! below it depth-first and memoizes every object as a singleton.
//!
//! ## Core Concepts
//!
//! - **Token**: the canonical name a dependency is bound and requested by.
//! - **Binding**: a class ([`ClassDescriptor`]) or a constant value.
//! - **Metadata**: class name → ordered dependency tokens, supplied by the caller.
//! - **Deferred references**: when two classes depend on each other, one of
//!   them receives a [`Ref`] that resolves to the other on first access
//!   instead of recursing forever.
//!
//! ## Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use tangle_ioc::{ClassDescriptor, Container, Dependencies, Injectable, MetadataTable, Result};
//!
//! struct Logger;
//!
//! impl Injectable for Logger {
//!   const NAME: &'static str = "Logger";
//!   fn construct(_: &mut Dependencies) -> Result<Self> {
//!     Ok(Logger)
//!   }
//! }
//!
//! struct Service {
//!   logger: Arc<Logger>,
//! }
//!
//! impl Injectable for Service {
//!   const NAME: &'static str = "Service";
//!   fn construct(deps: &mut Dependencies) -> Result<Self> {
//!     Ok(Service { logger: deps.next()? })
//!   }
//! }
//!
//! let metadata = MetadataTable::new().with("Service", ["Logger"]);
//! let container = Container::new(metadata);
//! container.bind_self(ClassDescriptor::of::<Logger>());
//! container.bind_self(ClassDescriptor::of::<Service>());
//!
//! let service = container.get_as::<Service>("Service").unwrap();
//! let logger = container.get_as::<Logger>("Logger").unwrap();
//! assert!(Arc::ptr_eq(&service.logger, &logger));
//! ```

mod binding;
mod cache;
mod config;
mod container;
mod deferred;
mod error;
mod macros;
mod metadata;
mod resolver;
mod token;

use std::any::Any;
use std::sync::Arc;

/// A realized object as the container stores it.
pub type Instance = Arc<dyn Any + Send + Sync>;

pub use binding::{Binding, ClassDescriptor, Dependencies, Injectable};
pub use config::{ContainerConfig, ContainerOptions, MissingMetadata};
pub use container::{Container, ContainerBuilder};
pub use deferred::{Deferred, Ref};
pub use error::{Error, Result};
pub use metadata::MetadataTable;
pub use token::Token;
