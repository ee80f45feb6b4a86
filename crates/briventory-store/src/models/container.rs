use super::Locker;
use crate::records::{ContainerRecord, PrivateContainerRecord, SharedContainerRecord};
use briventory_core::query::{self, Query};
use briventory_core::{
    Actions, Cascade, DeletableModel, ManyModelsLoader, Model, OrmError, PersistableModel, Result,
    ValidatableModel, ValidationError,
};
use rusqlite::{Connection, Row};

/// Container owned by a single account
///
/// Written as a `container` row followed by a `private_container` row that
/// reuses the container's generated key.
#[derive(Debug)]
pub struct PrivateContainer {
    pub(crate) id: Option<i64>,
    pub(crate) id_container_type: i64,
    pub(crate) id_account: i64,
    pub(crate) lockers: ManyModelsLoader<i64, Locker>,
}

/// Container available to every account
#[derive(Debug)]
pub struct SharedContainer {
    pub(crate) id: Option<i64>,
    pub(crate) id_container_type: i64,
    pub(crate) lockers: ManyModelsLoader<i64, Locker>,
}

/// Either kind of container, as read by queries spanning both
#[derive(Debug)]
pub enum Container {
    Private(PrivateContainer),
    Shared(SharedContainer),
}

impl Container {
    pub fn id(&self) -> Option<i64> {
        match self {
            Container::Private(container) => container.id,
            Container::Shared(container) => container.id,
        }
    }

    pub fn id_container_type(&self) -> i64 {
        match self {
            Container::Private(container) => container.id_container_type,
            Container::Shared(container) => container.id_container_type,
        }
    }

    pub fn is_private(&self) -> bool {
        matches!(self, Container::Private(_))
    }
}

impl From<PrivateContainer> for Container {
    fn from(container: PrivateContainer) -> Self {
        Container::Private(container)
    }
}

impl From<SharedContainer> for Container {
    fn from(container: SharedContainer) -> Self {
        Container::Shared(container)
    }
}

impl Model for Container {}

macro_rules! container_accessors {
    ($container:ty) => {
        impl $container {
            pub fn id(&self) -> Option<i64> {
                self.id
            }

            pub fn id_container_type(&self) -> i64 {
                self.id_container_type
            }

            /// The lockers, fetched on first access.
            ///
            /// # Errors
            ///
            /// Returns the driver error of the fetch.
            pub fn lockers(&mut self) -> Result<&[Locker]> {
                Ok(self.lockers.value()?.map(Vec::as_slice).unwrap_or_default())
            }

            /// Replace the lockers; they are written with the container.
            pub fn set_lockers(&mut self, lockers: Vec<Locker>) {
                self.lockers.set_value(lockers);
            }

            fn assign_id(&mut self, id: Option<i64>) {
                self.id = id;
                if let Some(id) = id {
                    self.lockers.adopt_key(id);
                }
            }

            fn container_record(&self) -> ContainerRecord {
                ContainerRecord {
                    id: self.id,
                    id_container_type: self.id_container_type,
                }
            }
        }
    };
}

container_accessors!(PrivateContainer);
container_accessors!(SharedContainer);

impl PrivateContainer {
    pub fn id_account(&self) -> i64 {
        self.id_account
    }
}

fn merged_key(record: &ContainerRecord) -> Result<i64> {
    record.id.ok_or(OrmError::MissingKey { record: "container" })
}

/// Container type must exist and, when lockers are loaded, bound their count.
fn validate_container(
    conn: &Connection,
    id_container_type: i64,
    lockers: Option<&Vec<Locker>>,
) -> Result<Vec<ValidationError>> {
    let bounds = query::fetch_optional(
        conn,
        &Query::new("SELECT min_lockers, max_lockers FROM container_type WHERE id = ?1")
            .bind(id_container_type),
        |row: &Row<'_>| Ok((row.get::<_, u16>(0)?, row.get::<_, u16>(1)?)),
    )?;
    let Some((min, max)) = bounds else {
        return Ok(vec![ValidationError::field(
            "id_container_type",
            "container.error.container_type.unknown",
        )]);
    };
    let mut errors = Vec::new();
    if let Some(lockers) = lockers {
        let count = lockers.len();
        if count < usize::from(min) || count > usize::from(max) {
            errors.push(
                ValidationError::field("lockers", "container.error.lockers.range")
                    .with_argument(min)
                    .with_argument(max),
            );
        }
    }
    Ok(errors)
}

impl Model for PrivateContainer {}

impl ValidatableModel for PrivateContainer {
    fn validate(&self, conn: &Connection) -> Result<Vec<ValidationError>> {
        let mut errors = validate_container(conn, self.id_container_type, self.lockers.peek())?;
        let owner_exists = query::exists(
            conn,
            &Query::new("SELECT 1 FROM account WHERE id = ?1").bind(self.id_account),
        )?;
        if !owner_exists {
            errors.push(ValidationError::field(
                "id_account",
                "container.error.account.unknown",
            ));
        }
        Ok(errors)
    }
}

impl PersistableModel for PrivateContainer {
    type FinalRecord = PrivateContainerRecord;

    fn cascade() -> Cascade<Self, PrivateContainerRecord> {
        Cascade::first(|container: &PrivateContainer, _: &Connection| {
            Ok(container.container_record())
        })
        .refresh_with(|container, record| container.assign_id(record.id))
        .then(|container, base, _| {
            Ok(PrivateContainerRecord {
                id_container: merged_key(base)?,
                id_account: container.id_account,
            })
        })
    }

    fn refresh(&mut self, record: &PrivateContainerRecord) {
        self.assign_id(Some(record.id_container));
        self.id_account = record.id_account;
    }

    fn post_persistence_actions(&self, conn: &Connection) -> Result<Actions> {
        self.lockers.create_actions(conn)
    }

    fn mark_persisted(&mut self) {
        self.lockers.mark_persisted();
    }
}

impl DeletableModel for PrivateContainer {
    type DeletionRecord = ContainerRecord;

    fn deletion_record(&self) -> ContainerRecord {
        self.container_record()
    }
}

impl Model for SharedContainer {}

impl ValidatableModel for SharedContainer {
    fn validate(&self, conn: &Connection) -> Result<Vec<ValidationError>> {
        validate_container(conn, self.id_container_type, self.lockers.peek())
    }
}

impl PersistableModel for SharedContainer {
    type FinalRecord = SharedContainerRecord;

    fn cascade() -> Cascade<Self, SharedContainerRecord> {
        Cascade::first(|container: &SharedContainer, _: &Connection| {
            Ok(container.container_record())
        })
        .refresh_with(|container, record| container.assign_id(record.id))
        .then(|_, base, _| {
            Ok(SharedContainerRecord {
                id_container: merged_key(base)?,
            })
        })
    }

    fn refresh(&mut self, record: &SharedContainerRecord) {
        self.assign_id(Some(record.id_container));
    }

    fn post_persistence_actions(&self, conn: &Connection) -> Result<Actions> {
        self.lockers.create_actions(conn)
    }

    fn mark_persisted(&mut self) {
        self.lockers.mark_persisted();
    }
}

impl DeletableModel for SharedContainer {
    type DeletionRecord = ContainerRecord;

    fn deletion_record(&self) -> ContainerRecord {
        self.container_record()
    }
}
