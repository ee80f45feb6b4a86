use crate::models::BrickLinkTokens;
use briventory_core::action::single;
use briventory_core::query::{self, Query};
use briventory_core::{
    Actions, DeleteAction, Injectable, OptionalModelLoader, PersistAction, RepositoriesHandler,
    Repository, Result,
};
use rusqlite::{Connection, Row};

const SELECT: &str = "SELECT id_account, consumer_key, consumer_secret, token_value, \
                      token_secret, valid_until FROM bricklink_tokens";

fn map_row(row: &Row<'_>) -> rusqlite::Result<BrickLinkTokens> {
    let consumer_secret: String = row.get(2)?;
    let token_secret: String = row.get(4)?;
    Ok(BrickLinkTokens {
        id_account: Some(row.get(0)?),
        consumer_key: row.get(1)?,
        consumer_secret: consumer_secret.into(),
        token_value: row.get(3)?,
        token_secret: token_secret.into(),
        valid_until: row.get(5)?,
    })
}

/// BrickLink API credentials, at most one set per account
#[derive(Debug, Clone)]
pub struct BrickLinkTokensRepository {
    base: Repository<BrickLinkTokens>,
}

impl Injectable for BrickLinkTokensRepository {
    fn inject(handler: &RepositoriesHandler) -> Result<Self> {
        Ok(Self {
            base: Repository::new(handler.context()),
        })
    }
}

impl BrickLinkTokensRepository {
    pub fn base(&self) -> &Repository<BrickLinkTokens> {
        &self.base
    }

    pub fn find_for_account(&self, id_account: i64) -> Result<Option<BrickLinkTokens>> {
        self.base.fetch_optional(
            &Query::new(format!("{SELECT} WHERE id_account = ?1")).bind(id_account),
            map_row,
        )
    }

    pub fn find_for_account_in(
        conn: &Connection,
        id_account: i64,
    ) -> Result<Option<BrickLinkTokens>> {
        query::fetch_optional(
            conn,
            &Query::new(format!("{SELECT} WHERE id_account = ?1")).bind(id_account),
            map_row,
        )
    }

    pub fn persist(&self, tokens: &mut BrickLinkTokens) -> Result<()> {
        self.base.persist(tokens)
    }

    pub fn delete(&self, tokens: &BrickLinkTokens) -> Result<()> {
        self.base.delete(tokens)
    }

    /// Loader of an account's tokens.
    ///
    /// Assigned tokens are attached to the account and written through this
    /// repository; assigning `None` deletes the stored ones.
    pub fn tokens_loader(&self, key: Option<i64>) -> OptionalModelLoader<i64, BrickLinkTokens> {
        let base = self.base.clone();
        self.base.create_optional_model_loader(
            key,
            |conn: &Connection, id_account: &i64| Self::find_for_account_in(conn, *id_account),
            move |conn: &Connection,
                  id_account: &i64,
                  tokens: &Option<BrickLinkTokens>|
                  -> Result<Actions> {
                match tokens {
                    Some(tokens) => {
                        let mut tokens = tokens.clone();
                        tokens.id_account = Some(*id_account);
                        Ok(single(PersistAction::one(base.clone(), tokens)))
                    }
                    None => Ok(Self::find_for_account_in(conn, *id_account)?
                        .map(|stored| single(DeleteAction::one(base.clone(), stored)))
                        .unwrap_or_default()),
                }
            },
        )
    }
}
