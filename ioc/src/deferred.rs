//! Deferred references: placeholders for dependencies that are still being
//! constructed further up the current call chain.

use crate::error::{Error, Result};
use crate::token::Token;
use crate::Instance;

use once_cell::sync::OnceCell;
use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, Weak};

/// A placeholder slot allocated for every node entered during a resolution.
///
/// The slot is filled with a weak reference once the node's constructor has
/// returned. It never holds the instance strongly: ownership stays with the
/// container, so cyclic graphs do not keep themselves alive.
pub(crate) type Slot = Arc<OnceCell<Weak<dyn Any + Send + Sync>>>;

/// "The eventual instance for token T."
///
/// Handed to a constructor in place of a dependency that is an ancestor of
/// that constructor on the resolution path. Nothing is looked up when the
/// handle is created; every [`Deferred::get`] reads the slot at access time.
#[derive(Clone)]
pub struct Deferred {
  token: Token,
  slot: Slot,
}

impl Deferred {
  pub(crate) fn new(token: Token, slot: Slot) -> Self {
    Self { token, slot }
  }

  pub fn token(&self) -> &Token {
    &self.token
  }

  /// Whether the target's constructor has returned yet.
  pub fn is_ready(&self) -> bool {
    self.slot.get().is_some()
  }

  /// Returns the real instance behind this reference.
  ///
  /// Fails with [`Error::DeferredNotReady`] when called from inside a
  /// constructor that runs before the target has been built, and with
  /// [`Error::DeferredReleased`] once the owning container is gone.
  pub fn get(&self) -> Result<Instance> {
    let weak = self
      .slot
      .get()
      .ok_or_else(|| Error::DeferredNotReady(self.token.clone()))?;
    weak
      .upgrade()
      .ok_or_else(|| Error::DeferredReleased(self.token.clone()))
  }
}

impl fmt::Debug for Deferred {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Deferred")
      .field("token", &self.token)
      .field("ready", &self.is_ready())
      .finish()
  }
}

/// A typed dependency held by a constructed object.
///
/// Classes that take part in a cycle keep their dependency as a `Ref<T>`
/// rather than an `Arc<T>`. Depending on the order in which the graph was
/// built, it is either already resolved or a [`Deferred`] that resolves on
/// first access.
pub struct Ref<T: Any + Send + Sync> {
  inner: RefInner,
  _marker: PhantomData<fn() -> T>,
}

enum RefInner {
  Ready(Token, Instance),
  Deferred(Deferred),
}

impl<T: Any + Send + Sync> Ref<T> {
  pub(crate) fn ready(token: Token, instance: Instance) -> Result<Self> {
    if !instance.is::<T>() {
      return Err(Error::TypeMismatch {
        token,
        expected: std::any::type_name::<T>(),
      });
    }
    Ok(Self {
      inner: RefInner::Ready(token, instance),
      _marker: PhantomData,
    })
  }

  pub(crate) fn deferred(deferred: Deferred) -> Self {
    Self {
      inner: RefInner::Deferred(deferred),
      _marker: PhantomData,
    }
  }

  pub fn token(&self) -> &Token {
    match &self.inner {
      RefInner::Ready(token, _) => token,
      RefInner::Deferred(deferred) => deferred.token(),
    }
  }

  /// True when this reference was injected as a placeholder to break a cycle.
  pub fn is_deferred(&self) -> bool {
    matches!(self.inner, RefInner::Deferred(_))
  }

  /// Returns the referenced instance, resolving a deferred reference on the spot.
  pub fn get(&self) -> Result<Arc<T>> {
    let instance = match &self.inner {
      RefInner::Ready(_, instance) => instance.clone(),
      RefInner::Deferred(deferred) => deferred.get()?,
    };
    instance.downcast::<T>().map_err(|_| Error::TypeMismatch {
      token: self.token().clone(),
      expected: std::any::type_name::<T>(),
    })
  }
}

impl<T: Any + Send + Sync> Clone for Ref<T> {
  fn clone(&self) -> Self {
    let inner = match &self.inner {
      RefInner::Ready(token, instance) => RefInner::Ready(token.clone(), instance.clone()),
      RefInner::Deferred(deferred) => RefInner::Deferred(deferred.clone()),
    };
    Self {
      inner,
      _marker: PhantomData,
    }
  }
}

impl<T: Any + Send + Sync> fmt::Debug for Ref<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Ref")
      .field("token", self.token())
      .field("deferred", &self.is_deferred())
      .finish()
  }
}
