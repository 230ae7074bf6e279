//! The main `Container` struct and its associated methods.

use crate::binding::{Binding, BindingRegistry, ClassDescriptor};
use crate::cache::InstanceCache;
use crate::config::{ContainerConfig, ContainerOptions, MissingMetadata};
use crate::error::{Error, Result};
use crate::metadata::MetadataTable;
use crate::resolver::Resolver;
use crate::token::Token;
use crate::Instance;

use parking_lot::ReentrantMutex;
use std::any::Any;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// The Inversion of Control (IoC) container.
///
/// Bindings are registered first; instances are built lazily on the first
/// [`Container::get`] for their token and kept as singletons until the
/// container is disposed. Constructor dependencies come from the
/// [`MetadataTable`] supplied at construction.
#[derive(Default)]
pub struct Container {
  registry: BindingRegistry,
  cache: InstanceCache,
  metadata: MetadataTable,
  options: ContainerOptions,
  session_lock: ReentrantMutex<()>,
}

impl Container {
  /// Creates an empty container that reads constructor dependencies from `metadata`.
  pub fn new(metadata: MetadataTable) -> Self {
    Self::builder().metadata(metadata).build()
  }

  pub fn builder() -> ContainerBuilder {
    ContainerBuilder::default()
  }

  /// Creates a container from a YAML or JSON configuration file.
  pub fn from_config_file(path: &Path) -> Result<Self> {
    let config = ContainerConfig::from_file(path)?;
    Ok(ContainerBuilder::from_config(config).build())
  }

  // --- PRIVATE HELPERS ---

  fn resolver(&self) -> Resolver<'_> {
    Resolver {
      registry: &self.registry,
      cache: &self.cache,
      metadata: &self.metadata,
      missing_metadata: self.options.missing_metadata,
      session_lock: &self.session_lock,
    }
  }

  fn note_rebinding(&self, token: &Token, replaced: Option<Binding>) {
    if replaced.is_some() && self.cache.contains(token) {
      tracing::warn!(
        token = %token,
        "rebinding a token that already has an instance; the cached instance stays in effect"
      );
    }
  }

  // --- PUBLIC API ---

  // --- Registration ---

  /// Binds `token` to a class. Replaces any earlier binding for `token`.
  pub fn bind(&self, token: impl Into<Token>, class: ClassDescriptor) {
    let token = token.into();
    let replaced = self.registry.register(token.clone(), class);
    self.note_rebinding(&token, replaced);
  }

  /// Binds `token` to a constant. The value is handed out as-is; no
  /// constructor runs for it.
  pub fn bind_value<T: Any + Send + Sync>(&self, token: impl Into<Token>, value: T) {
    let token = token.into();
    let replaced = self.registry.register_value(token.clone(), Arc::new(value));
    self.note_rebinding(&token, replaced);
  }

  /// Binds a class to the token of its own name.
  pub fn bind_self(&self, class: ClassDescriptor) {
    let token = class.name().clone();
    let replaced = self.registry.register_self(class);
    self.note_rebinding(&token, replaced);
  }

  // --- Resolution ---

  /// Resolves the singleton for `token`, building its dependency graph on
  /// first use.
  ///
  /// Repeated calls return the same instance. If any part of the graph
  /// fails, nothing built during this call is cached. Calls from several
  /// threads are safe: cached tokens are served concurrently, and graphs
  /// that need constructing are built one at a time.
  pub fn get(&self, token: impl Into<Token>) -> Result<Instance> {
    self.resolver().resolve(&token.into())
  }

  /// Resolves `token` and downcasts the instance to `T`.
  pub fn get_as<T: Any + Send + Sync>(&self, token: impl Into<Token>) -> Result<Arc<T>> {
    let token = token.into();
    self
      .get(&token)?
      .downcast::<T>()
      .map_err(|_| Error::TypeMismatch {
        token,
        expected: std::any::type_name::<T>(),
      })
  }

  // --- Introspection ---

  pub fn is_bound(&self, token: impl Into<Token>) -> bool {
    self.registry.contains(&token.into())
  }

  /// Whether an instance for `token` has already been built and cached.
  pub fn is_resolved(&self, token: impl Into<Token>) -> bool {
    self.cache.contains(&token.into())
  }

  /// Number of instances currently held.
  pub fn len(&self) -> usize {
    self.cache.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn metadata(&self) -> &MetadataTable {
    &self.metadata
  }

  pub fn options(&self) -> ContainerOptions {
    self.options
  }

  /// Checks every class binding without constructing anything.
  ///
  /// Reports the first problem found, visiting bindings in token-name order:
  /// a missing metadata entry when the container rejects those, or a
  /// declared dependency with no binding.
  pub fn validate(&self) -> Result<()> {
    for (_, binding) in self.registry.snapshot() {
      let class = match binding {
        Binding::Class(class) => class,
        Binding::Value(_) => continue,
      };
      let deps = match self.metadata.dependencies_of(class.name()) {
        Some(deps) => deps,
        None if self.options.missing_metadata == MissingMetadata::Reject => {
          return Err(Error::MissingMetadata(class.name().clone()));
        }
        None => continue,
      };
      if let Some(unbound) = deps.iter().find(|dep| !self.registry.contains(dep)) {
        return Err(Error::UnboundToken(unbound.clone()));
      }
    }
    Ok(())
  }

  // --- Disposal ---

  /// Releases every instance held by the container, most recently built
  /// first, and returns how many were released.
  ///
  /// Instances still referenced elsewhere live on through those references;
  /// deferred references into this container stop resolving.
  pub fn dispose(self) -> usize {
    let released = self.cache.release_all();
    tracing::debug!(released, "container disposed");
    released
  }
}

impl Drop for Container {
  fn drop(&mut self) {
    self.cache.release_all();
  }
}

impl fmt::Debug for Container {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Container")
      .field("instances", &self.cache.len())
      .field("options", &self.options)
      .finish_non_exhaustive()
  }
}

// --- Builder ---

/// A builder for creating `Container` instances.
#[derive(Debug, Default)]
pub struct ContainerBuilder {
  metadata: MetadataTable,
  options: ContainerOptions,
}

impl ContainerBuilder {
  pub fn from_config(config: ContainerConfig) -> Self {
    Self {
      metadata: config.metadata,
      options: config.options,
    }
  }

  /// Sets the constructor metadata table.
  pub fn metadata(mut self, metadata: MetadataTable) -> Self {
    self.metadata = metadata;
    self
  }

  /// Sets how classes without a metadata entry are treated.
  pub fn missing_metadata(mut self, policy: MissingMetadata) -> Self {
    self.options.missing_metadata = policy;
    self
  }

  pub fn options(mut self, options: ContainerOptions) -> Self {
    self.options = options;
    self
  }

  pub fn build(self) -> Container {
    Container {
      registry: BindingRegistry::default(),
      cache: InstanceCache::default(),
      metadata: self.metadata,
      options: self.options,
      session_lock: ReentrantMutex::new(()),
    }
  }
}
