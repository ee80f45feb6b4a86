//! Lazily fetched relations
//!
//! A `LazyLoader` holds the key of a related value and fetches the value on
//! first access. It remembers what was fetched so that, when the owner is
//! persisted, it can tell whether the relation changed and produce the
//! actions that write the change back.
//!
//! A loader never opens a unit of work on its own while the owner is being
//! persisted; [`LazyLoader::value`] is for use outside of one.

use crate::action::Actions;
use crate::context::PersistenceContext;
use crate::errors::Result;
use rusqlite::Connection;
use std::fmt;
use std::sync::Arc;

pub type Fetcher<K, V> = Arc<dyn Fn(&Connection, &K) -> Result<V> + Send + Sync>;
pub type ActionsCreator<K, V> = Arc<dyn Fn(&Connection, &K, &V) -> Result<Actions> + Send + Sync>;

/// Exactly one related model
pub type ModelLoader<K, M> = LazyLoader<K, M>;
/// Zero or one related model
pub type OptionalModelLoader<K, M> = LazyLoader<K, Option<M>>;
/// Any number of related models
pub type ManyModelsLoader<K, M> = LazyLoader<K, Vec<M>>;
/// A plain value derived from a record, such as a marker row's presence
pub type RecordLoader<K, V> = LazyLoader<K, V>;

enum LoaderState<V> {
    Unfetched,
    /// `baseline` is the stored value observed at fetch time; a value
    /// installed through `set_value` has none.
    Fetched { value: V, baseline: Option<V> },
}

pub struct LazyLoader<K, V> {
    context: Arc<dyn PersistenceContext>,
    key: Option<K>,
    state: LoaderState<V>,
    fetcher: Fetcher<K, V>,
    actions_creator: ActionsCreator<K, V>,
}

impl<K, V> LazyLoader<K, V>
where
    K: PartialEq,
    V: Clone + PartialEq,
{
    pub fn new<F, A>(
        context: Arc<dyn PersistenceContext>,
        key: Option<K>,
        fetcher: F,
        actions_creator: A,
    ) -> Self
    where
        F: Fn(&Connection, &K) -> Result<V> + Send + Sync + 'static,
        A: Fn(&Connection, &K, &V) -> Result<Actions> + Send + Sync + 'static,
    {
        Self {
            context,
            key,
            state: LoaderState::Unfetched,
            fetcher: Arc::new(fetcher),
            actions_creator: Arc::new(actions_creator),
        }
    }

    pub fn key(&self) -> Option<&K> {
        self.key.as_ref()
    }

    pub fn is_fetched(&self) -> bool {
        matches!(self.state, LoaderState::Fetched { .. })
    }

    /// Point the loader at another key.
    ///
    /// Any fetched or assigned value is discarded unless the key is unchanged.
    pub fn set_key(&mut self, key: Option<K>) {
        if self.key.is_none() || self.key != key {
            self.state = LoaderState::Unfetched;
            self.key = key;
        }
    }

    /// Bind the key generated for a newly written owner.
    ///
    /// Unlike [`set_key`](Self::set_key), a value assigned while the loader
    /// had no key is kept, so it can be written once the owner exists.
    pub fn adopt_key(&mut self, key: K) {
        match &self.key {
            None => self.key = Some(key),
            Some(current) if *current == key => {}
            Some(_) => self.set_key(Some(key)),
        }
    }

    /// The related value, fetched through the context on first access.
    ///
    /// An unkeyed loader has no relation and always yields `None`, even
    /// after [`set_value`](Self::set_value); see [`peek`](Self::peek).
    ///
    /// # Errors
    ///
    /// Returns the fetcher's error; the loader stays unfetched.
    pub fn value(&mut self) -> Result<Option<&V>> {
        if self.key.is_none() {
            return Ok(None);
        }
        if !self.is_fetched() {
            let context = Arc::clone(&self.context);
            context.consume_in_connection(&mut |conn: &Connection| {
                self.value_in(conn).map(|_| ())
            })?;
        }
        Ok(self.peek())
    }

    /// Like [`value`](Self::value), on a connection the caller already holds.
    ///
    /// # Errors
    ///
    /// Returns the fetcher's error; the loader stays unfetched.
    pub fn value_in(&mut self, conn: &Connection) -> Result<Option<&V>> {
        let Some(key) = self.key.as_ref() else {
            return Ok(None);
        };
        if !self.is_fetched() {
            let value = (self.fetcher)(conn, key)?;
            self.state = LoaderState::Fetched {
                baseline: Some(value.clone()),
                value,
            };
        }
        Ok(self.peek())
    }

    /// Mutable access to the related value, fetching it first if needed.
    ///
    /// # Errors
    ///
    /// Returns the fetcher's error.
    pub fn value_mut_in(&mut self, conn: &Connection) -> Result<Option<&mut V>> {
        if self.value_in(conn)?.is_none() {
            return Ok(None);
        }
        match &mut self.state {
            LoaderState::Fetched { value, .. } => Ok(Some(value)),
            LoaderState::Unfetched => Ok(None),
        }
    }

    /// Replace the related value without fetching it.
    pub fn set_value(&mut self, value: V) {
        self.state = match std::mem::replace(&mut self.state, LoaderState::Unfetched) {
            LoaderState::Fetched { baseline, .. } => LoaderState::Fetched { value, baseline },
            LoaderState::Unfetched => LoaderState::Fetched {
                value,
                baseline: None,
            },
        };
    }

    /// Whether the value differs from the stored one.
    ///
    /// Always `false` for an unfetched loader. A value assigned before any
    /// fetch is compared against one read of the stored value.
    ///
    /// # Errors
    ///
    /// Returns the fetcher's error.
    pub fn has_changed(&self, conn: &Connection) -> Result<bool> {
        match (&self.state, self.key.as_ref()) {
            (LoaderState::Unfetched, _) => Ok(false),
            (
                LoaderState::Fetched {
                    value,
                    baseline: Some(baseline),
                },
                _,
            ) => Ok(value != baseline),
            (
                LoaderState::Fetched {
                    value,
                    baseline: None,
                },
                Some(key),
            ) => Ok(*value != (self.fetcher)(conn, key)?),
            (LoaderState::Fetched { baseline: None, .. }, None) => Ok(true),
        }
    }

    /// Actions writing the current value back, empty when nothing changed.
    ///
    /// # Errors
    ///
    /// Returns the fetcher's or the actions creator's error.
    pub fn create_actions(&self, conn: &Connection) -> Result<Actions> {
        let (LoaderState::Fetched { value, .. }, Some(key)) = (&self.state, self.key.as_ref())
        else {
            return Ok(Vec::new());
        };
        if !self.has_changed(conn)? {
            return Ok(Vec::new());
        }
        (self.actions_creator)(conn, key, value)
    }

    /// Take the current value as the stored one once it has been written back.
    ///
    /// Later changes are detected against this value instead of the one
    /// observed at fetch time. A loader without key or value is untouched.
    pub fn mark_persisted(&mut self) {
        if self.key.is_none() {
            return;
        }
        if let LoaderState::Fetched { value, baseline } = &mut self.state {
            *baseline = Some(value.clone());
        }
    }

    /// The value if already fetched or assigned, never fetching.
    pub fn peek(&self) -> Option<&V> {
        match &self.state {
            LoaderState::Fetched { value, .. } => Some(value),
            LoaderState::Unfetched => None,
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for LazyLoader<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("LazyLoader");
        debug.field("key", &self.key);
        match &self.state {
            LoaderState::Unfetched => debug.field("state", &"unfetched"),
            LoaderState::Fetched { value, .. } => debug.field("value", value),
        };
        debug.finish()
    }
}
