//! The append-only store of realized singletons.

use crate::token::Token;
use crate::Instance;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;

/// Token → realized instance, at most one per token.
///
/// Entries are never evicted while the container lives. The construction
/// order is recorded so that [`InstanceCache::release_all`] can drop
/// dependents before the things they depend on.
#[derive(Default)]
pub(crate) struct InstanceCache {
  instances: DashMap<Token, Instance>,
  order: Mutex<Vec<Token>>,
}

impl InstanceCache {
  pub(crate) fn get(&self, token: &Token) -> Option<Instance> {
    self.instances.get(token).map(|entry| entry.value().clone())
  }

  pub(crate) fn contains(&self, token: &Token) -> bool {
    self.instances.contains_key(token)
  }

  /// Stores `instance` under `token` unless an instance is already there.
  ///
  /// Returns the instance that ends up cached, which is the existing one if
  /// another caller committed first. A rejected candidate is dropped only
  /// after every lock here has been released.
  pub(crate) fn commit(&self, token: Token, instance: Instance) -> Instance {
    let (cached, rejected) = {
      let mut order = self.order.lock();
      match self.instances.entry(token.clone()) {
        Entry::Occupied(entry) => (entry.get().clone(), Some(instance)),
        Entry::Vacant(entry) => {
          order.push(token);
          (entry.insert(instance).value().clone(), None)
        }
      }
    };
    drop(rejected);
    cached
  }

  pub(crate) fn len(&self) -> usize {
    self.instances.len()
  }

  /// Drops the container's reference to every instance, most recently
  /// constructed first. Returns how many were released.
  pub(crate) fn release_all(&self) -> usize {
    let order = std::mem::take(&mut *self.order.lock());
    let mut released = 0;
    for token in order.into_iter().rev() {
      if let Some((token, instance)) = self.instances.remove(&token) {
        tracing::trace!(token = %token, "releasing instance");
        drop(instance);
        released += 1;
      }
    }
    released
  }
}
