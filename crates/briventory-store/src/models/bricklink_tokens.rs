use super::is_blank;
use crate::records::BrickLinkTokensRecord;
use briventory_core::{
    Cascade, DeletableModel, Model, OrmError, PersistableModel, Result, ValidatableModel,
    ValidationError,
};
use briventory_core_types::Sensitive;
use chrono::NaiveDate;
use rusqlite::Connection;

/// Credentials for the BrickLink API, owned by one account
#[derive(Debug, Clone, PartialEq)]
pub struct BrickLinkTokens {
    /// The owning account; set when the tokens are attached to it.
    pub id_account: Option<i64>,
    pub consumer_key: String,
    pub consumer_secret: Sensitive<String>,
    pub token_value: String,
    pub token_secret: Sensitive<String>,
    pub valid_until: Option<NaiveDate>,
}

impl BrickLinkTokens {
    pub fn new(
        consumer_key: impl Into<String>,
        consumer_secret: impl Into<String>,
        token_value: impl Into<String>,
        token_secret: impl Into<String>,
    ) -> Self {
        Self {
            id_account: None,
            consumer_key: consumer_key.into(),
            consumer_secret: Sensitive::new(consumer_secret.into()),
            token_value: token_value.into(),
            token_secret: Sensitive::new(token_secret.into()),
            valid_until: None,
        }
    }

    pub fn valid_until(mut self, date: NaiveDate) -> Self {
        self.valid_until = Some(date);
        self
    }

    fn record(&self) -> Result<BrickLinkTokensRecord> {
        let id_account = self.id_account.ok_or(OrmError::MissingKey {
            record: "bricklink_tokens.id_account",
        })?;
        Ok(BrickLinkTokensRecord {
            id_account,
            consumer_key: self.consumer_key.clone(),
            consumer_secret: self.consumer_secret.clone(),
            token_value: self.token_value.clone(),
            token_secret: self.token_secret.clone(),
            valid_until: self.valid_until,
        })
    }
}

impl From<BrickLinkTokensRecord> for BrickLinkTokens {
    fn from(record: BrickLinkTokensRecord) -> Self {
        Self {
            id_account: Some(record.id_account),
            consumer_key: record.consumer_key,
            consumer_secret: record.consumer_secret,
            token_value: record.token_value,
            token_secret: record.token_secret,
            valid_until: record.valid_until,
        }
    }
}

impl Model for BrickLinkTokens {}

impl ValidatableModel for BrickLinkTokens {
    fn validate(&self, _conn: &Connection) -> Result<Vec<ValidationError>> {
        let required = [
            ("consumer_key", self.consumer_key.as_str()),
            ("consumer_secret", self.consumer_secret.expose().as_str()),
            ("token_value", self.token_value.as_str()),
            ("token_secret", self.token_secret.expose().as_str()),
        ];
        Ok(required
            .into_iter()
            .filter(|(_, value)| is_blank(value))
            .map(|(field, _)| {
                ValidationError::field(field, format!("bricklink_tokens.error.{field}.empty"))
            })
            .collect())
    }
}

impl PersistableModel for BrickLinkTokens {
    type FinalRecord = BrickLinkTokensRecord;

    fn cascade() -> Cascade<Self, BrickLinkTokensRecord> {
        Cascade::first(|tokens: &BrickLinkTokens, _: &Connection| tokens.record())
    }

    fn refresh(&mut self, record: &BrickLinkTokensRecord) {
        self.id_account = Some(record.id_account);
    }
}

impl DeletableModel for BrickLinkTokens {
    type DeletionRecord = BrickLinkTokensRecord;

    fn shall_delete(&self, _conn: &Connection) -> Result<bool> {
        Ok(self.id_account.is_some())
    }

    fn deletion_record(&self) -> BrickLinkTokensRecord {
        BrickLinkTokensRecord {
            id_account: self.id_account.unwrap_or_default(),
            consumer_key: String::new(),
            consumer_secret: Sensitive::default(),
            token_value: String::new(),
            token_secret: Sensitive::default(),
            valid_until: None,
        }
    }
}
