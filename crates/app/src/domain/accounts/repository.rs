//! Accounts Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, PgPool, Postgres, Row, postgres::PgRow, query_as};

use crate::domain::accounts::{
    data::NewAccount,
    records::{AccountRecord, AccountRole, AccountUuid},
};

const CREATE_ACCOUNT_SQL: &str = include_str!("sql/create_account.sql");
const FIND_ACCOUNT_BY_API_TOKEN_HASH_SQL: &str =
    include_str!("sql/find_account_by_api_token_hash.sql");

/// PostgreSQL-backed accounts repository.
#[derive(Debug, Clone)]
pub(crate) struct PgAccountsRepository {
    pool: PgPool,
}

impl PgAccountsRepository {
    #[must_use]
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub(crate) async fn create_account(
        &self,
        account: NewAccount,
        api_token_hash: &str,
    ) -> Result<AccountRecord, sqlx::Error> {
        query_as::<Postgres, AccountRecord>(CREATE_ACCOUNT_SQL)
            .bind(account.uuid.into_uuid())
            .bind(account.name)
            .bind(account.role.as_str())
            .bind(api_token_hash)
            .fetch_one(&self.pool)
            .await
    }

    pub(crate) async fn find_by_api_token_hash(
        &self,
        hash: &str,
    ) -> Result<Option<AccountRecord>, sqlx::Error> {
        query_as::<Postgres, AccountRecord>(FIND_ACCOUNT_BY_API_TOKEN_HASH_SQL)
            .bind(hash)
            .fetch_optional(&self.pool)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for AccountRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let role: String = row.try_get("role")?;

        Ok(Self {
            uuid: AccountUuid::from_uuid(row.try_get("uuid")?),
            name: row.try_get("name")?,
            role: role
                .parse::<AccountRole>()
                .map_err(|source| sqlx::Error::ColumnDecode {
                    index: "role".to_string(),
                    source: Box::new(source),
                })?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}
