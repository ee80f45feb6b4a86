use crate::models::Locker;
use briventory_core::query::{self, Query};
use briventory_core::{
    Actions, DeleteAction, Injectable, ManyModelsLoader, PersistAction, RepositoriesHandler,
    Repository, Result,
};
use rusqlite::{Connection, Row};

const SELECT: &str = "SELECT id, id_container, locker_order, color_mixed FROM locker";

fn map_row(row: &Row<'_>) -> rusqlite::Result<Locker> {
    Ok(Locker {
        id: row.get(0)?,
        id_container: Some(row.get(1)?),
        order: row.get(2)?,
        color_mixed: row.get(3)?,
    })
}

#[derive(Debug, Clone)]
pub struct LockersRepository {
    base: Repository<Locker>,
}

impl Injectable for LockersRepository {
    fn inject(handler: &RepositoriesHandler) -> Result<Self> {
        Ok(Self {
            base: Repository::new(handler.context()),
        })
    }
}

impl LockersRepository {
    pub fn base(&self) -> &Repository<Locker> {
        &self.base
    }

    /// Lockers of a container, by order.
    pub fn find_for_container(&self, id_container: i64) -> Result<Vec<Locker>> {
        self.base.fetch(
            &Query::new(format!("{SELECT} WHERE id_container = ?1 ORDER BY locker_order"))
                .bind(id_container),
            map_row,
        )
    }

    pub fn find_for_container_in(conn: &Connection, id_container: i64) -> Result<Vec<Locker>> {
        query::fetch(
            conn,
            &Query::new(format!("{SELECT} WHERE id_container = ?1 ORDER BY locker_order"))
                .bind(id_container),
            map_row,
        )
    }

    /// Loader of a container's lockers.
    ///
    /// Writing back deletes the stored lockers missing from the assigned
    /// list before persisting the assigned ones under the container.
    pub fn lockers_loader(&self, key: Option<i64>) -> ManyModelsLoader<i64, Locker> {
        let base = self.base.clone();
        self.base.create_many_models_loader(
            key,
            |conn: &Connection, id_container: &i64| {
                Self::find_for_container_in(conn, *id_container)
            },
            move |conn: &Connection, id_container: &i64, lockers: &Vec<Locker>| -> Result<Actions> {
                let removed: Vec<Locker> = Self::find_for_container_in(conn, *id_container)?
                    .into_iter()
                    .filter(|stored| {
                        !lockers
                            .iter()
                            .any(|locker| locker.id.is_some() && locker.id == stored.id)
                    })
                    .collect();
                let kept: Vec<Locker> = lockers
                    .iter()
                    .cloned()
                    .map(|mut locker| {
                        locker.id_container = Some(*id_container);
                        locker
                    })
                    .collect();

                let mut actions: Actions = Vec::new();
                if !removed.is_empty() {
                    actions.push(Box::new(DeleteAction::new(base.clone(), removed)));
                }
                if !kept.is_empty() {
                    actions.push(Box::new(PersistAction::new(base.clone(), kept)));
                }
                Ok(actions)
            },
        )
    }
}
