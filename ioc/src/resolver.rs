//! The recursive graph builder behind `Container::get`.

use crate::binding::{Binding, BindingRegistry, ClassDescriptor, Dependency};
use crate::cache::InstanceCache;
use crate::config::MissingMetadata;
use crate::deferred::{Deferred, Slot};
use crate::error::{Error, Result};
use crate::metadata::MetadataTable;
use crate::token::Token;
use crate::Instance;

use parking_lot::ReentrantMutex;
use std::sync::Arc;
use tracing::{debug, trace};

/// State that lives for exactly one top-level `get()` call.
///
/// Construction is two-phase. A node entering the path gets a placeholder
/// slot in `slots` before any of its dependencies are resolved; back-edges
/// are wired to that slot. Once the node's constructor returns, the slot is
/// filled and the instance is staged. Staged instances reach the shared
/// cache only after the whole graph has been built.
#[derive(Default)]
struct Session {
  /// Tokens under construction, outermost first, with their slot index.
  path: Vec<(Token, usize)>,
  slots: Vec<Slot>,
  staged: Vec<(Token, Instance)>,
}

impl Session {
  fn enter(&mut self, token: Token) -> usize {
    debug_assert!(self.in_progress(&token).is_none());
    let index = self.slots.len();
    self.slots.push(Slot::default());
    self.path.push((token, index));
    index
  }

  fn leave(&mut self) {
    self.path.pop();
  }

  fn in_progress(&self, token: &Token) -> Option<Slot> {
    self
      .path
      .iter()
      .find(|(t, _)| t == token)
      .map(|(_, index)| self.slots[*index].clone())
  }

  fn staged(&self, token: &Token) -> Option<Instance> {
    self
      .staged
      .iter()
      .find(|(t, _)| t == token)
      .map(|(_, instance)| instance.clone())
  }

  fn stage(&mut self, token: Token, instance: Instance) {
    self.staged.push((token, instance));
  }

  fn describe_path(&self) -> String {
    self
      .path
      .iter()
      .map(|(t, _)| t.name())
      .collect::<Vec<_>>()
      .join(" -> ")
  }
}

pub(crate) struct Resolver<'c> {
  pub(crate) registry: &'c BindingRegistry,
  pub(crate) cache: &'c InstanceCache,
  pub(crate) metadata: &'c MetadataTable,
  pub(crate) missing_metadata: MissingMetadata,
  /// Held for the whole of a constructing session, commit included.
  pub(crate) session_lock: &'c ReentrantMutex<()>,
}

impl Resolver<'_> {
  /// Resolves `token` and commits everything built along the way.
  ///
  /// Cache hits never wait. Sessions that construct run one at a time, so
  /// a graph is always committed against the singletons already cached.
  pub(crate) fn resolve(&self, token: &Token) -> Result<Instance> {
    if let Some(instance) = self.cache.get(token) {
      trace!(token = %token, "cache hit");
      return Ok(instance);
    }

    let _guard = self.session_lock.lock();
    if let Some(instance) = self.cache.get(token) {
      trace!(token = %token, "cache hit after waiting for another session");
      return Ok(instance);
    }

    let mut session = Session::default();
    let instance = self.resolve_internal(token, &mut session)?;

    let mut root = instance;
    for (staged_token, staged) in session.staged {
      let is_root = staged_token == *token;
      let committed = self.cache.commit(staged_token, staged);
      if is_root {
        root = committed;
      }
    }
    Ok(root)
  }

  fn resolve_internal(&self, token: &Token, session: &mut Session) -> Result<Instance> {
    if let Some(instance) = self.cache.get(token) {
      trace!(token = %token, "cache hit");
      return Ok(instance);
    }
    if let Some(instance) = session.staged(token) {
      trace!(token = %token, "reusing instance built earlier in this resolution");
      return Ok(instance);
    }

    let class = match self.registry.lookup(token) {
      None => {
        debug!(token = %token, path = %session.describe_path(), "no binding");
        return Err(Error::UnboundToken(token.clone()));
      }
      Some(Binding::Value(value)) => {
        session.stage(token.clone(), value.clone());
        return Ok(value);
      }
      Some(Binding::Class(class)) => class,
    };

    let dependencies = self.dependencies_of(&class)?;

    let slot = session.enter(token.clone());
    let mut args = Vec::with_capacity(dependencies.len());
    for dep in dependencies.iter() {
      if let Some(target) = session.in_progress(dep) {
        debug!(
          class = %class.name(),
          dependency = %dep,
          path = %session.describe_path(),
          "cycle detected, injecting deferred reference"
        );
        args.push(Dependency::Deferred(Deferred::new(dep.clone(), target)));
        continue;
      }
      let instance = self.resolve_internal(dep, session)?;
      args.push(Dependency::Ready(dep.clone(), instance));
    }
    session.leave();

    debug!(token = %token, class = %class.name(), args = args.len(), "constructing");
    let instance = class.construct(args)?;

    // Deferred references handed out for this token can now be satisfied.
    let filled = session.slots[slot].set(Arc::downgrade(&instance));
    debug_assert!(filled.is_ok(), "slot for {} filled twice", token);
    session.stage(token.clone(), instance.clone());
    Ok(instance)
  }

  fn dependencies_of(&self, class: &ClassDescriptor) -> Result<Arc<[Token]>> {
    if let Some(deps) = self.metadata.dependencies_of(class.name()) {
      return Ok(deps);
    }
    match self.missing_metadata {
      MissingMetadata::Empty => {
        debug!(class = %class.name(), "no constructor metadata, constructing without dependencies");
        Ok(Arc::from(Vec::new()))
      }
      MissingMetadata::Reject => Err(Error::MissingMetadata(class.name().clone())),
    }
  }
}
