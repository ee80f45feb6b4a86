//! Repository registry
//!
//! `RepositoriesHandler` is the composition root for repositories: it owns
//! the persistence context and hands out one shared instance per repository
//! type. Repositories depending on other repositories resolve them through
//! the handler while being constructed.

use crate::context::PersistenceContext;
use crate::errors::{OrmError, Result};
use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock, PoisonError, RwLock};

/// A repository constructible by the handler
pub trait Injectable: Send + Sync + Sized + 'static {
    /// # Errors
    ///
    /// Returns an error when a dependency cannot be resolved.
    fn inject(handler: &RepositoriesHandler) -> Result<Self>;
}

type Instance = Arc<dyn Any + Send + Sync>;

#[derive(Default)]
struct Slot {
    construction: Mutex<()>,
    instance: OnceLock<Instance>,
}

pub struct RepositoriesHandler {
    context: Arc<dyn PersistenceContext>,
    slots: RwLock<HashMap<TypeId, Arc<Slot>>>,
}

impl RepositoriesHandler {
    pub fn new(context: Arc<dyn PersistenceContext>) -> Self {
        Self {
            context,
            slots: RwLock::new(HashMap::new()),
        }
    }

    pub fn context(&self) -> Arc<dyn PersistenceContext> {
        Arc::clone(&self.context)
    }

    /// The shared instance of repository `R`, constructed on first request.
    ///
    /// Concurrent first requests for the same type construct it once. A
    /// dependency cycle between repositories deadlocks.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::RepositoryUnavailable`] when `R` cannot be
    /// constructed.
    pub fn repository<R: Injectable>(&self) -> Result<Arc<R>> {
        let slot = self.slot::<R>();
        let instance = match slot.instance.get() {
            Some(instance) => Arc::clone(instance),
            None => self.construct::<R>(&slot)?,
        };
        instance
            .downcast::<R>()
            .map_err(|_| OrmError::RepositoryUnavailable {
                repository: type_name::<R>(),
                message: "registered instance has another type".to_string(),
            })
    }

    /// Number of repositories constructed so far.
    pub fn len(&self) -> usize {
        self.slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|slot| slot.instance.get().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot<R: 'static>(&self) -> Arc<Slot> {
        let id = TypeId::of::<R>();
        if let Some(slot) = self
            .slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
        {
            return Arc::clone(slot);
        }
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slots.entry(id).or_default())
    }

    fn construct<R: Injectable>(&self, slot: &Slot) -> Result<Instance> {
        let _guard = slot
            .construction
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(instance) = slot.instance.get() {
            return Ok(Arc::clone(instance));
        }
        tracing::debug!(repository = type_name::<R>(), "constructing repository");
        let repository = R::inject(self).map_err(|err| match err {
            err @ OrmError::RepositoryUnavailable { .. } => err,
            other => OrmError::RepositoryUnavailable {
                repository: type_name::<R>(),
                message: other.to_string(),
            },
        })?;
        let instance: Instance = Arc::new(repository);
        Ok(Arc::clone(slot.instance.get_or_init(|| instance)))
    }
}

impl fmt::Debug for RepositoriesHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepositoriesHandler")
            .field("repositories", &self.len())
            .finish()
    }
}
