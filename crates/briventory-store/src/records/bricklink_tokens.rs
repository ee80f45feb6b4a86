use super::delete_by_key;
use briventory_core::{Result, UpdatableRecord};
use briventory_core_types::Sensitive;
use chrono::NaiveDate;
use rusqlite::{params, Connection};

/// Row of `bricklink_tokens`, keyed by the owning account
#[derive(Debug, Clone, PartialEq)]
pub struct BrickLinkTokensRecord {
    pub id_account: i64,
    pub consumer_key: String,
    pub consumer_secret: Sensitive<String>,
    pub token_value: String,
    pub token_secret: Sensitive<String>,
    pub valid_until: Option<NaiveDate>,
}

impl UpdatableRecord for BrickLinkTokensRecord {
    fn merge(&mut self, conn: &Connection) -> Result<()> {
        conn.execute(
            "INSERT INTO bricklink_tokens
                 (id_account, consumer_key, consumer_secret, token_value, token_secret, valid_until)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(id_account) DO UPDATE SET
                 consumer_key = excluded.consumer_key,
                 consumer_secret = excluded.consumer_secret,
                 token_value = excluded.token_value,
                 token_secret = excluded.token_secret,
                 valid_until = excluded.valid_until",
            params![
                self.id_account,
                self.consumer_key,
                self.consumer_secret.expose(),
                self.token_value,
                self.token_secret.expose(),
                self.valid_until
            ],
        )?;
        Ok(())
    }

    fn delete(&self, conn: &Connection) -> Result<()> {
        delete_by_key(
            conn,
            "DELETE FROM bricklink_tokens WHERE id_account = ?1",
            Some(self.id_account),
        )
    }
}
