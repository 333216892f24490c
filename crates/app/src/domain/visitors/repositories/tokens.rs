//! Visitor Tokens Repository

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};

use crate::domain::{
    accounts::records::{AccountSummary, AccountUuid},
    visitors::{
        data::NewVisitorToken,
        records::{TokenUsage, VisitType, VisitorTokenRecord, VisitorTokenUuid},
        repositories::{to_i32, try_get_u32},
        secret::VisitorSecret,
    },
};

const INSERT_TOKEN_IF_HASH_UNIQUE_SQL: &str = include_str!("../sql/insert_token_if_hash_unique.sql");
const FIND_TOKEN_BY_HASH_SQL: &str = include_str!("../sql/find_token_by_hash.sql");
const FIND_TOKEN_BY_HASH_FOR_UPDATE_SQL: &str =
    include_str!("../sql/find_token_by_hash_for_update.sql");
const MARK_TOKEN_USED_IF_UNUSED_SQL: &str = include_str!("../sql/mark_token_used_if_unused.sql");
const LIST_TOKENS_FOR_RESIDENT_SQL: &str = include_str!("../sql/list_tokens_for_resident.sql");
const GET_TOKEN_FOR_RESIDENT_SQL: &str = include_str!("../sql/get_token_for_resident.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgVisitorTokensRepository;

impl PgVisitorTokensRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Insert a token unless another token already uses the same secret hash, in which case
    /// nothing is written and `None` is returned.
    pub(crate) async fn insert_if_hash_unique(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        uuid: VisitorTokenUuid,
        token: &NewVisitorToken,
        secret: &VisitorSecret,
        expires_at: Timestamp,
        created_at: Timestamp,
    ) -> Result<Option<VisitorTokenRecord>, sqlx::Error> {
        query_as::<Postgres, VisitorTokenRecord>(INSERT_TOKEN_IF_HASH_UNIQUE_SQL)
            .bind(uuid.into_uuid())
            .bind(token.resident.into_uuid())
            .bind(secret.hash())
            .bind(secret.expose())
            .bind(&token.visitor_name)
            .bind(token.visitor_phone.as_deref())
            .bind(token.visit_type.as_str())
            .bind(to_i32(token.duration)?)
            .bind(token.note.as_deref())
            .bind(SqlxTimestamp::from(expires_at))
            .bind(SqlxTimestamp::from(created_at))
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn find_by_hash(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        token_hash: &str,
    ) -> Result<Option<VisitorTokenRecord>, sqlx::Error> {
        query_as::<Postgres, VisitorTokenRecord>(FIND_TOKEN_BY_HASH_SQL)
            .bind(token_hash)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Like [`Self::find_by_hash`], holding a row lock until the transaction ends.
    pub(crate) async fn find_by_hash_for_update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        token_hash: &str,
    ) -> Result<Option<VisitorTokenRecord>, sqlx::Error> {
        query_as::<Postgres, VisitorTokenRecord>(FIND_TOKEN_BY_HASH_FOR_UPDATE_SQL)
            .bind(token_hash)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Consume the token and discard its plaintext. Returns `false` when it was already used.
    pub(crate) async fn mark_used_if_unused(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        token: VisitorTokenUuid,
        used_at: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let rows_affected = query(MARK_TOKEN_USED_IF_UNUSED_SQL)
            .bind(token.into_uuid())
            .bind(SqlxTimestamp::from(used_at))
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected == 1)
    }

    pub(crate) async fn list_for_resident(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        resident: AccountUuid,
    ) -> Result<Vec<VisitorTokenRecord>, sqlx::Error> {
        query_as::<Postgres, VisitorTokenRecord>(LIST_TOKENS_FOR_RESIDENT_SQL)
            .bind(resident.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn get_for_resident(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        resident: AccountUuid,
        token: VisitorTokenUuid,
    ) -> Result<Option<VisitorTokenRecord>, sqlx::Error> {
        query_as::<Postgres, VisitorTokenRecord>(GET_TOKEN_FOR_RESIDENT_SQL)
            .bind(token.into_uuid())
            .bind(resident.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for VisitorTokenRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let visit_type: String = row.try_get("visit_type")?;

        let usage = TokenUsage::from_columns(
            row.try_get::<Option<SqlxTimestamp>, _>("used_at")?
                .map(SqlxTimestamp::to_jiff),
            row.try_get("temp_token")?,
        );

        Ok(Self {
            uuid: VisitorTokenUuid::from_uuid(row.try_get("uuid")?),
            resident: AccountSummary {
                uuid: AccountUuid::from_uuid(row.try_get("resident_uuid")?),
                name: row.try_get("resident_name")?,
            },
            token_hash: row.try_get("token_hash")?,
            issued_for_name: row.try_get("issued_for_name")?,
            issued_for_phone: row.try_get("issued_for_phone")?,
            visit_type: visit_type
                .parse::<VisitType>()
                .map_err(|source| sqlx::Error::ColumnDecode {
                    index: "visit_type".to_string(),
                    source: Box::new(source),
                })?,
            duration: try_get_u32(row, "duration")?,
            note: row.try_get("note")?,
            expires_at: row.try_get::<SqlxTimestamp, _>("expires_at")?.to_jiff(),
            usage,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}
