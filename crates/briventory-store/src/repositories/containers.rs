use super::LockersRepository;
use crate::models::{Container, Locker, PrivateContainer, SharedContainer};
use crate::records::{PrivateContainerRecord, SharedContainerRecord};
use briventory_core::{
    DeletableModel, Injectable, ManyModelsLoader, OrmError, PersistableModel, Query,
    RepositoriesHandler, Repository, Result, SubQuery, ValidatableModel,
};
use rusqlite::{Connection, Row};
use std::sync::Arc;

const PRIVATE_SELECT: &str = "SELECT c.id, c.id_container_type, p.id_account FROM container c \
                              JOIN private_container p ON p.id_container = c.id";
const SHARED_SELECT: &str = "SELECT c.id, c.id_container_type FROM container c \
                             JOIN shared_container s ON s.id_container = c.id";

/// Private and shared containers with their lockers
///
/// A container changes kind through [`share`](Self::share) and
/// [`make_private`](Self::make_private), which keep its key and lockers.
#[derive(Debug)]
pub struct ContainersRepository {
    containers: Repository<Container>,
    private: Repository<PrivateContainer>,
    shared: Repository<SharedContainer>,
    lockers: Arc<LockersRepository>,
}

impl Injectable for ContainersRepository {
    fn inject(handler: &RepositoriesHandler) -> Result<Self> {
        let context = handler.context();
        Ok(Self {
            containers: Repository::new(Arc::clone(&context)),
            private: Repository::new(Arc::clone(&context)),
            shared: Repository::new(context),
            lockers: handler.repository()?,
        })
    }
}

impl ContainersRepository {
    pub fn base(&self) -> &Repository<Container> {
        &self.containers
    }

    pub fn new_private(&self, id_container_type: i64, id_account: i64) -> PrivateContainer {
        PrivateContainer {
            id: None,
            id_container_type,
            id_account,
            lockers: self.lockers.lockers_loader(None),
        }
    }

    pub fn new_shared(&self, id_container_type: i64) -> SharedContainer {
        SharedContainer {
            id: None,
            id_container_type,
            lockers: self.lockers.lockers_loader(None),
        }
    }

    fn private_from_row(&self, row: &Row<'_>) -> rusqlite::Result<PrivateContainer> {
        let id: i64 = row.get(0)?;
        Ok(PrivateContainer {
            id: Some(id),
            id_container_type: row.get(1)?,
            id_account: row.get(2)?,
            lockers: self.lockers.lockers_loader(Some(id)),
        })
    }

    fn shared_from_row(&self, row: &Row<'_>) -> rusqlite::Result<SharedContainer> {
        let id: i64 = row.get(0)?;
        Ok(SharedContainer {
            id: Some(id),
            id_container_type: row.get(1)?,
            lockers: self.lockers.lockers_loader(Some(id)),
        })
    }

    /// Every container, private ones first.
    pub fn all(&self) -> Result<Vec<Container>> {
        self.containers.union_all(vec![
            SubQuery::new(
                Query::new(format!("{PRIVATE_SELECT} ORDER BY c.id")),
                |row| self.private_from_row(row),
            ),
            SubQuery::new(
                Query::new(format!("{SHARED_SELECT} ORDER BY c.id")),
                |row| self.shared_from_row(row),
            ),
        ])
    }

    /// The container with key `id`, whichever its kind.
    pub fn find_by_id(&self, id: i64) -> Result<Option<Container>> {
        let mut found = self.containers.union_all(vec![
            SubQuery::new(
                Query::new(format!("{PRIVATE_SELECT} WHERE c.id = ?1")).bind(id),
                |row| self.private_from_row(row),
            ),
            SubQuery::new(
                Query::new(format!("{SHARED_SELECT} WHERE c.id = ?1")).bind(id),
                |row| self.shared_from_row(row),
            ),
        ])?;
        if found.len() > 1 {
            return Err(OrmError::TooManyRows);
        }
        Ok(found.pop())
    }

    pub fn private_for_account(&self, id_account: i64) -> Result<Vec<PrivateContainer>> {
        self.private.fetch(
            &Query::new(format!("{PRIVATE_SELECT} WHERE p.id_account = ?1 ORDER BY c.id"))
                .bind(id_account),
            |row| self.private_from_row(row),
        )
    }

    pub fn shared(&self) -> Result<Vec<SharedContainer>> {
        self.shared.fetch(
            &Query::new(format!("{SHARED_SELECT} ORDER BY c.id")),
            |row| self.shared_from_row(row),
        )
    }

    pub fn persist<P>(&self, container: &mut P) -> Result<()>
    where
        P: PersistableModel + ValidatableModel,
    {
        self.containers.persist(container)
    }

    pub fn delete<D: DeletableModel>(&self, container: &D) -> Result<()> {
        self.containers.delete(container)
    }

    /// Turn a stored private container into a shared one.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::MissingKey`] for an unsaved container, or the
    /// migration's error; the container stays private in that case.
    pub fn share(&self, container: &PrivateContainer) -> Result<SharedContainer> {
        let id = container.id.ok_or(OrmError::MissingKey { record: "container" })?;
        let mut shared = SharedContainer {
            id: Some(id),
            id_container_type: container.id_container_type,
            lockers: self.carry_lockers(id, &container.lockers),
        };
        let old = PrivateContainerRecord {
            id_container: id,
            id_account: container.id_account,
        };
        self.shared.migrate(move |_: &Connection| Ok(old), &mut shared)?;
        Ok(shared)
    }

    /// Hand a stored shared container over to one account.
    ///
    /// # Errors
    ///
    /// Same as [`share`](Self::share); an unknown account fails validation.
    pub fn make_private(
        &self,
        container: &SharedContainer,
        id_account: i64,
    ) -> Result<PrivateContainer> {
        let id = container.id.ok_or(OrmError::MissingKey { record: "container" })?;
        let mut private = PrivateContainer {
            id: Some(id),
            id_container_type: container.id_container_type,
            id_account,
            lockers: self.carry_lockers(id, &container.lockers),
        };
        let old = SharedContainerRecord { id_container: id };
        self.private.migrate(move |_: &Connection| Ok(old), &mut private)?;
        Ok(private)
    }

    /// A loader for the migrated container keeping lockers assigned to the old one.
    fn carry_lockers(
        &self,
        id: i64,
        lockers: &ManyModelsLoader<i64, Locker>,
    ) -> ManyModelsLoader<i64, Locker> {
        let mut carried = self.lockers.lockers_loader(Some(id));
        if let Some(assigned) = lockers.peek() {
            carried.set_value(assigned.clone());
        }
        carried
    }
}
