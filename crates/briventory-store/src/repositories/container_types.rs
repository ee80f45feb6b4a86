use crate::models::ContainerType;
use briventory_core::query::Query;
use briventory_core::{Injectable, RepositoriesHandler, Repository, Result};
use rusqlite::Row;

const SELECT: &str =
    "SELECT id, name, min_lockers, max_lockers, numbering_format FROM container_type";

fn map_row(row: &Row<'_>) -> rusqlite::Result<ContainerType> {
    Ok(ContainerType {
        id: row.get(0)?,
        name: row.get(1)?,
        min_lockers: row.get(2)?,
        max_lockers: row.get(3)?,
        numbering_format: row.get(4)?,
    })
}

#[derive(Debug, Clone)]
pub struct ContainerTypesRepository {
    base: Repository<ContainerType>,
}

impl Injectable for ContainerTypesRepository {
    fn inject(handler: &RepositoriesHandler) -> Result<Self> {
        Ok(Self {
            base: Repository::new(handler.context()),
        })
    }
}

impl ContainerTypesRepository {
    pub fn base(&self) -> &Repository<ContainerType> {
        &self.base
    }

    pub fn all(&self) -> Result<Vec<ContainerType>> {
        self.base
            .fetch(&Query::new(format!("{SELECT} ORDER BY name")), map_row)
    }

    pub fn find_by_id(&self, id: i64) -> Result<Option<ContainerType>> {
        self.base
            .fetch_optional(&Query::new(format!("{SELECT} WHERE id = ?1")).bind(id), map_row)
    }

    pub fn persist(&self, container_type: &mut ContainerType) -> Result<()> {
        self.base.persist(container_type)
    }

    pub fn delete(&self, container_type: &ContainerType) -> Result<()> {
        self.base.delete(container_type)
    }
}
