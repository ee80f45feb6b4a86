use super::{is_blank, BrickLinkTokens, ColorSource};
use crate::errors::password_error;
use crate::records::AccountRecord;
use crate::repositories::accounts::{
    email_taken, is_last_active_administrator, private_containers_of,
};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use briventory_core::{
    Actions, Cascade, DeletableModel, DeleteRecordAction, Model, OptionalModelLoader,
    PersistableModel, RecordLoader, Result, ValidatableModel, ValidationError,
};
use briventory_core_types::Sensitive;
use rusqlite::Connection;

/// A user of the inventory
///
/// Administrator rights, the locked flag and the BrickLink credentials live
/// in their own tables and are loaded on demand. Changing them marks the
/// relation dirty; the change is written after the account itself.
///
/// Built through `AccountsRepository::build_instance`, which wires the
/// lazy relations.
#[derive(Debug)]
pub struct Account {
    id: Option<i64>,
    firstname: String,
    lastname: String,
    email: String,
    password: Sensitive<String>,
    color_source: OptionalModelLoader<i64, ColorSource>,
    administrator: RecordLoader<i64, bool>,
    locked: RecordLoader<i64, bool>,
    bricklink_tokens: OptionalModelLoader<i64, BrickLinkTokens>,
}

impl Account {
    pub(crate) fn with_loaders(
        color_source: OptionalModelLoader<i64, ColorSource>,
        administrator: RecordLoader<i64, bool>,
        locked: RecordLoader<i64, bool>,
        bricklink_tokens: OptionalModelLoader<i64, BrickLinkTokens>,
    ) -> Self {
        Self {
            id: None,
            firstname: String::new(),
            lastname: String::new(),
            email: String::new(),
            password: Sensitive::default(),
            color_source,
            administrator,
            locked,
            bricklink_tokens,
        }
    }

    pub(crate) fn load(&mut self, record: AccountRecord) {
        self.set_id(record.id);
        self.color_source.set_key(record.id_color_source);
        self.firstname = record.firstname;
        self.lastname = record.lastname;
        self.email = record.email;
        self.password = record.password;
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    /// Point the account at another stored row, dropping loaded relations.
    pub fn set_id(&mut self, id: Option<i64>) {
        self.id = id;
        self.administrator.set_key(id);
        self.locked.set_key(id);
        self.bricklink_tokens.set_key(id);
    }

    pub fn firstname(&self) -> &str {
        &self.firstname
    }

    pub fn set_firstname(&mut self, firstname: impl Into<String>) -> &mut Self {
        self.firstname = firstname.into();
        self
    }

    pub fn lastname(&self) -> &str {
        &self.lastname
    }

    pub fn set_lastname(&mut self, lastname: impl Into<String>) -> &mut Self {
        self.lastname = lastname.into();
        self
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn set_email(&mut self, email: impl Into<String>) -> &mut Self {
        self.email = email.into();
        self
    }

    /// The stored password hash.
    pub fn password_hash(&self) -> &Sensitive<String> {
        &self.password
    }

    /// Hash and store a clear text password.
    ///
    /// # Errors
    ///
    /// Returns a store error when hashing fails.
    pub fn set_clear_password(&mut self, clear: &str) -> Result<&mut Self> {
        if clear.is_empty() {
            self.password = Sensitive::default();
            return Ok(self);
        }
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(clear.as_bytes(), &salt)
            .map_err(password_error)?
            .to_string();
        self.password = Sensitive::new(hash);
        Ok(self)
    }

    /// Whether `clear` matches the stored hash.
    pub fn verify_password(&self, clear: &str) -> bool {
        PasswordHash::new(self.password.expose())
            .map(|hash| {
                Argon2::default()
                    .verify_password(clear.as_bytes(), &hash)
                    .is_ok()
            })
            .unwrap_or(false)
    }

    pub fn id_color_source(&self) -> Option<i64> {
        self.color_source.key().copied()
    }

    pub fn set_id_color_source(&mut self, id: Option<i64>) -> &mut Self {
        self.color_source.set_key(id);
        self
    }

    /// The preferred color source, fetched on first access.
    ///
    /// # Errors
    ///
    /// Returns the driver error of the fetch.
    pub fn color_source(&mut self) -> Result<Option<&ColorSource>> {
        Ok(self.color_source.value()?.and_then(Option::as_ref))
    }

    pub fn set_color_source(&mut self, source: Option<ColorSource>) -> &mut Self {
        self.color_source
            .set_key(source.as_ref().and_then(|source| source.id));
        self.color_source.set_value(source);
        self
    }

    /// # Errors
    ///
    /// Returns the driver error of the fetch.
    pub fn is_administrator(&mut self) -> Result<bool> {
        Ok(self.administrator.value()?.copied().unwrap_or(false))
    }

    pub fn set_administrator(&mut self, administrator: bool) -> &mut Self {
        self.administrator.set_value(administrator);
        self
    }

    /// # Errors
    ///
    /// Returns the driver error of the fetch.
    pub fn is_locked(&mut self) -> Result<bool> {
        Ok(self.locked.value()?.copied().unwrap_or(false))
    }

    pub fn set_locked(&mut self, locked: bool) -> &mut Self {
        self.locked.set_value(locked);
        self
    }

    /// # Errors
    ///
    /// Returns the driver error of the fetch.
    pub fn bricklink_tokens(&mut self) -> Result<Option<&BrickLinkTokens>> {
        Ok(self.bricklink_tokens.value()?.and_then(Option::as_ref))
    }

    pub fn set_bricklink_tokens(&mut self, tokens: Option<BrickLinkTokens>) -> &mut Self {
        self.bricklink_tokens.set_value(tokens);
        self
    }

    fn record(&self) -> AccountRecord {
        AccountRecord {
            id: self.id,
            id_color_source: self.id_color_source(),
            firstname: self.firstname.clone(),
            lastname: self.lastname.clone(),
            email: self.email.clone(),
            password: self.password.clone(),
        }
    }
}

/// Local part, `@`, and a dotted domain, without whitespace.
fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !email.chars().any(char::is_whitespace)
        && !domain.contains('@')
        && domain
            .split('.')
            .filter(|label| !label.is_empty())
            .count()
            >= 2
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

impl Model for Account {}

impl ValidatableModel for Account {
    fn validate(&self, conn: &Connection) -> Result<Vec<ValidationError>> {
        let mut errors = Vec::new();
        if is_blank(&self.firstname) {
            errors.push(ValidationError::field("firstname", "account.error.firstname.empty"));
        }
        if is_blank(&self.lastname) {
            errors.push(ValidationError::field("lastname", "account.error.lastname.empty"));
        }
        if is_blank(self.password.expose()) {
            errors.push(ValidationError::field("password", "account.error.password.empty"));
        }
        if is_blank(&self.email) {
            errors.push(ValidationError::field("email", "account.error.email.empty"));
        } else if !is_valid_email(&self.email) {
            errors.push(ValidationError::field("email", "account.error.email.invalid"));
        } else if email_taken(conn, &self.email, self.id)? {
            errors.push(
                ValidationError::field("email", "account.error.email.exists")
                    .with_argument(&self.email),
            );
        }
        if let Some(id) = self.id {
            let demoted = self.administrator.peek() == Some(&false);
            let locked = self.locked.peek() == Some(&true);
            if (demoted || locked) && is_last_active_administrator(conn, id)? {
                errors.push(ValidationError::model(if demoted {
                    "account.error.demote.last_administrator"
                } else {
                    "account.error.lock.last_administrator"
                }));
            }
        }
        Ok(errors)
    }
}

impl PersistableModel for Account {
    type FinalRecord = AccountRecord;

    fn cascade() -> Cascade<Self, AccountRecord> {
        Cascade::first(|account: &Account, _: &Connection| Ok(account.record()))
    }

    fn refresh(&mut self, record: &AccountRecord) {
        self.id = record.id;
        if let Some(id) = record.id {
            self.administrator.adopt_key(id);
            self.locked.adopt_key(id);
            self.bricklink_tokens.adopt_key(id);
        }
    }

    fn post_persistence_actions(&self, conn: &Connection) -> Result<Actions> {
        let mut actions = self.administrator.create_actions(conn)?;
        actions.extend(self.locked.create_actions(conn)?);
        actions.extend(self.bricklink_tokens.create_actions(conn)?);
        Ok(actions)
    }

    fn mark_persisted(&mut self) {
        self.administrator.mark_persisted();
        self.locked.mark_persisted();
        self.bricklink_tokens.mark_persisted();
    }
}

impl DeletableModel for Account {
    type DeletionRecord = AccountRecord;

    fn validate_for_deletion(&self, conn: &Connection) -> Result<Vec<ValidationError>> {
        let Some(id) = self.id else {
            return Ok(Vec::new());
        };
        if is_last_active_administrator(conn, id)? {
            return Ok(vec![ValidationError::model(
                "account.error.delete.last_administrator",
            )]);
        }
        Ok(Vec::new())
    }

    /// Private containers go first; their lockers follow by cascade.
    fn pre_deletion_actions(&self, conn: &Connection) -> Result<Actions> {
        let Some(id) = self.id else {
            return Ok(Vec::new());
        };
        let mut actions: Actions = Vec::new();
        for record in private_containers_of(conn, id)? {
            actions.push(Box::new(DeleteRecordAction::new(record)));
        }
        Ok(actions)
    }

    fn deletion_record(&self) -> AccountRecord {
        AccountRecord::key(self.id)
    }
}
