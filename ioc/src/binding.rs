//! Bindings: the recipes the container follows to produce an instance.

use crate::deferred::{Deferred, Ref};
use crate::error::{Error, Result};
use crate::token::Token;
use crate::Instance;

use dashmap::DashMap;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

type Constructor = Arc<dyn Fn(&mut Dependencies) -> Result<Instance> + Send + Sync>;

/// A type the container knows how to construct.
///
/// `NAME` is the class name: it is the key looked up in the
/// [`MetadataTable`](crate::MetadataTable) and the token `bind_self` binds to.
pub trait Injectable: Any + Send + Sync + Sized {
  const NAME: &'static str;

  fn construct(deps: &mut Dependencies) -> Result<Self>;
}

/// A class reference: a name plus a type-erased constructor.
#[derive(Clone)]
pub struct ClassDescriptor {
  name: Token,
  ctor: Constructor,
}

impl ClassDescriptor {
  pub fn new<T, F>(name: impl Into<Token>, ctor: F) -> Self
  where
    T: Any + Send + Sync,
    F: Fn(&mut Dependencies) -> Result<T> + Send + Sync + 'static,
  {
    Self {
      name: name.into(),
      ctor: Arc::new(move |deps: &mut Dependencies| -> Result<Instance> {
        let instance: Instance = Arc::new(ctor(deps)?);
        Ok(instance)
      }),
    }
  }

  /// The descriptor of an [`Injectable`] type.
  pub fn of<T: Injectable>() -> Self {
    Self::new(T::NAME, T::construct)
  }

  pub fn name(&self) -> &Token {
    &self.name
  }

  pub(crate) fn construct(&self, args: Vec<Dependency>) -> Result<Instance> {
    let mut deps = Dependencies::new(self.name.clone(), args);
    (self.ctor)(&mut deps)
  }
}

impl fmt::Debug for ClassDescriptor {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ClassDescriptor")
      .field("name", &self.name)
      .finish_non_exhaustive()
  }
}

/// What a token is bound to.
#[derive(Clone)]
pub enum Binding {
  Class(ClassDescriptor),
  Value(Instance),
}

impl fmt::Debug for Binding {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Binding::Class(class) => f.debug_tuple("Class").field(class.name()).finish(),
      Binding::Value(_) => f.write_str("Value(..)"),
    }
  }
}

// --- Constructor arguments ---

/// One resolved constructor argument.
#[derive(Clone, Debug)]
pub(crate) enum Dependency {
  Ready(Token, Instance),
  Deferred(Deferred),
}

/// The ordered arguments handed to a constructor.
///
/// Arguments are taken front to back in the order the metadata declares
/// them.
pub struct Dependencies {
  class: Token,
  args: std::vec::IntoIter<Dependency>,
  declared: usize,
  taken: usize,
}

impl Dependencies {
  pub(crate) fn new(class: Token, args: Vec<Dependency>) -> Self {
    Self {
      class,
      declared: args.len(),
      args: args.into_iter(),
      taken: 0,
    }
  }

  /// The name of the class being constructed.
  pub fn class(&self) -> &Token {
    &self.class
  }

  /// Number of arguments not yet taken.
  pub fn remaining(&self) -> usize {
    self.args.len()
  }

  fn take(&mut self) -> Result<Dependency> {
    let next = self.args.next().ok_or_else(|| Error::MissingDependency {
      class: self.class.clone(),
      index: self.taken,
      declared: self.declared,
    })?;
    self.taken += 1;
    Ok(next)
  }

  /// Takes the next argument as a fully constructed instance.
  ///
  /// A dependency that is still under construction (a cycle back-edge)
  /// cannot be handed out this way; take it with [`Dependencies::next_ref`].
  pub fn next<T: Any + Send + Sync>(&mut self) -> Result<Arc<T>> {
    match self.take()? {
      Dependency::Ready(token, instance) => {
        instance.downcast::<T>().map_err(|_| Error::TypeMismatch {
          token,
          expected: std::any::type_name::<T>(),
        })
      }
      Dependency::Deferred(deferred) => Err(Error::DeferredNotReady(deferred.token().clone())),
    }
  }

  /// Takes the next argument as a [`Ref`], which may be deferred.
  pub fn next_ref<T: Any + Send + Sync>(&mut self) -> Result<Ref<T>> {
    match self.take()? {
      Dependency::Ready(token, instance) => Ref::ready(token, instance),
      Dependency::Deferred(deferred) => Ok(Ref::deferred(deferred)),
    }
  }
}

impl fmt::Debug for Dependencies {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Dependencies")
      .field("class", &self.class)
      .field("declared", &self.declared)
      .field("remaining", &self.remaining())
      .finish()
  }
}

// --- Registry ---

/// Token → binding. The last registration for a token wins.
#[derive(Default)]
pub(crate) struct BindingRegistry {
  bindings: DashMap<Token, Binding>,
}

impl BindingRegistry {
  /// Stores `binding` under `token`, returning whatever it replaced.
  fn insert(&self, token: Token, binding: Binding) -> Option<Binding> {
    self.bindings.insert(token, binding)
  }

  pub(crate) fn register(&self, token: Token, class: ClassDescriptor) -> Option<Binding> {
    self.insert(token, Binding::Class(class))
  }

  pub(crate) fn register_value(&self, token: Token, value: Instance) -> Option<Binding> {
    self.insert(token, Binding::Value(value))
  }

  pub(crate) fn register_self(&self, class: ClassDescriptor) -> Option<Binding> {
    let token = class.name().clone();
    self.register(token, class)
  }

  /// Clones the binding out so no map guard is held while it is used.
  pub(crate) fn lookup(&self, token: &Token) -> Option<Binding> {
    self.bindings.get(token).map(|entry| entry.value().clone())
  }

  pub(crate) fn contains(&self, token: &Token) -> bool {
    self.bindings.contains_key(token)
  }

  /// All current bindings, sorted by token name.
  pub(crate) fn snapshot(&self) -> Vec<(Token, Binding)> {
    let mut all: Vec<_> = self
      .bindings
      .iter()
      .map(|entry| (entry.key().clone(), entry.value().clone()))
      .collect();
    all.sort_by(|a, b| a.0.cmp(&b.0));
    all
  }
}
