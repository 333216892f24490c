//! Visitor Entries Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};

use crate::domain::{
    accounts::records::{AccountSummary, AccountUuid},
    visitors::{
        data::NewVisitorEntry,
        records::{EntryExit, VisitorEntryRecord, VisitorEntryUuid, VisitorTokenUuid},
        repositories::{to_i32, try_get_u32},
    },
};

const CREATE_ENTRY_SQL: &str = include_str!("../sql/create_entry.sql");
const CLOSE_ACTIVE_ENTRY_SQL: &str = include_str!("../sql/close_active_entry.sql");
const FIND_ENTRY_FOR_UPDATE_SQL: &str = include_str!("../sql/find_entry_for_update.sql");
const FIND_ACTIVE_ENTRY_FOR_TOKEN_FOR_UPDATE_SQL: &str =
    include_str!("../sql/find_active_entry_for_token_for_update.sql");
const LATEST_ENTRY_FOR_TOKEN_SQL: &str = include_str!("../sql/latest_entry_for_token.sql");
const LIST_ACTIVE_ENTRIES_SQL: &str = include_str!("../sql/list_active_entries.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgVisitorEntriesRepository;

impl PgVisitorEntriesRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Open an entry. Fails with a unique violation when the token already has an open entry.
    pub(crate) async fn create_entry(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        entry: NewVisitorEntry,
    ) -> Result<VisitorEntryRecord, sqlx::Error> {
        query_as::<Postgres, VisitorEntryRecord>(CREATE_ENTRY_SQL)
            .bind(entry.uuid.into_uuid())
            .bind(entry.token_uuid.into_uuid())
            .bind(entry.visitor_name)
            .bind(entry.visitor_phone)
            .bind(SqlxTimestamp::from(entry.entered_at))
            .bind(entry.guard_uuid.into_uuid())
            .bind(entry.gate_id)
            .bind(entry.note)
            .fetch_one(&mut **tx)
            .await
    }

    /// Write the exit of a still-open entry. Returns `None` if the entry is already closed.
    pub(crate) async fn close_active_entry(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        entry: VisitorEntryUuid,
        exit: EntryExit,
        note: Option<&str>,
    ) -> Result<Option<VisitorEntryRecord>, sqlx::Error> {
        query_as::<Postgres, VisitorEntryRecord>(CLOSE_ACTIVE_ENTRY_SQL)
            .bind(entry.into_uuid())
            .bind(SqlxTimestamp::from(exit.exited_at))
            .bind(to_i32(exit.duration_minutes)?)
            .bind(note)
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn find_entry_for_update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        entry: VisitorEntryUuid,
    ) -> Result<Option<VisitorEntryRecord>, sqlx::Error> {
        query_as::<Postgres, VisitorEntryRecord>(FIND_ENTRY_FOR_UPDATE_SQL)
            .bind(entry.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn find_active_entry_for_token_for_update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        token: VisitorTokenUuid,
    ) -> Result<Option<VisitorEntryRecord>, sqlx::Error> {
        query_as::<Postgres, VisitorEntryRecord>(FIND_ACTIVE_ENTRY_FOR_TOKEN_FOR_UPDATE_SQL)
            .bind(token.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn latest_entry_for_token(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        token: VisitorTokenUuid,
    ) -> Result<Option<VisitorEntryRecord>, sqlx::Error> {
        query_as::<Postgres, VisitorEntryRecord>(LATEST_ENTRY_FOR_TOKEN_SQL)
            .bind(token.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn list_active_entries(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Vec<VisitorEntryRecord>, sqlx::Error> {
        query_as::<Postgres, VisitorEntryRecord>(LIST_ACTIVE_ENTRIES_SQL)
            .fetch_all(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for VisitorEntryRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let exited_at = row
            .try_get::<Option<SqlxTimestamp>, _>("exited_at")?
            .map(SqlxTimestamp::to_jiff);

        let exit = match exited_at {
            Some(exited_at) => Some(EntryExit {
                exited_at,
                duration_minutes: try_get_u32(row, "duration_minutes")?,
            }),
            None => None,
        };

        Ok(Self {
            uuid: VisitorEntryUuid::from_uuid(row.try_get("uuid")?),
            token_uuid: VisitorTokenUuid::from_uuid(row.try_get("token_uuid")?),
            visitor_name: row.try_get("visitor_name")?,
            visitor_phone: row.try_get("visitor_phone")?,
            entered_at: row.try_get::<SqlxTimestamp, _>("entered_at")?.to_jiff(),
            exit,
            guard: AccountSummary {
                uuid: AccountUuid::from_uuid(row.try_get("guard_uuid")?),
                name: row.try_get("guard_name")?,
            },
            gate_id: row.try_get("gate_id")?,
            note: row.try_get("note")?,
        })
    }
}
