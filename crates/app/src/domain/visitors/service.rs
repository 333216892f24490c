//! Visitors service.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use tracing::{info, warn};

use crate::{
    database::Db,
    domain::{
        accounts::records::AccountUuid,
        visitors::{
            data::{EntryGrant, NewVisitorEntry, NewVisitorToken, append_note, exit_note},
            errors::{ValidationError, VisitorsServiceError},
            records::{
                EntryExit, VisitorEntryRecord, VisitorEntryUuid, VisitorTokenRecord,
                VisitorTokenUuid,
            },
            repositories::{PgVisitorEntriesRepository, PgVisitorTokensRepository},
            secret::VisitorSecret,
            state::TokenState,
        },
    },
};

/// Fresh secrets drawn before issuance gives up on hash collisions.
pub const MAX_SECRET_ATTEMPTS: u32 = 5;

/// Issuance result. The secret is only ever handed out here.
#[derive(Debug, Clone)]
pub struct IssuedVisitorToken {
    pub secret: VisitorSecret,
    pub token: VisitorTokenRecord,
}

/// A consumed token and the entry it opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantedEntry {
    pub token: VisitorTokenRecord,
    pub entry: VisitorEntryRecord,
}

#[derive(Debug, Clone)]
pub struct PgVisitorsService {
    db: Db,
    tokens_repository: PgVisitorTokensRepository,
    entries_repository: PgVisitorEntriesRepository,
    generate_secret: fn() -> VisitorSecret,
}

impl PgVisitorsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            tokens_repository: PgVisitorTokensRepository::new(),
            entries_repository: PgVisitorEntriesRepository::new(),
            generate_secret: VisitorSecret::generate,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_secret_generator(mut self, generate_secret: fn() -> VisitorSecret) -> Self {
        self.generate_secret = generate_secret;
        self
    }
}

fn presented_secret(raw: &str) -> Result<VisitorSecret, ValidationError> {
    let secret = VisitorSecret::from_presented(raw);

    if secret.is_empty() {
        return Err(ValidationError::SecretMissing);
    }

    Ok(secret)
}

#[async_trait]
impl VisitorsService for PgVisitorsService {
    async fn issue_token(
        &self,
        token: NewVisitorToken,
        now: Timestamp,
    ) -> Result<IssuedVisitorToken, VisitorsServiceError> {
        let token = token.validated()?;

        let expires_at = token
            .visit_type
            .expires_at(now, token.duration)
            .map_err(|_ignored| VisitorsServiceError::InvalidData)?;

        let mut tx = self.db.begin().await?;

        for attempt in 1..=MAX_SECRET_ATTEMPTS {
            let secret = (self.generate_secret)();

            let inserted = self
                .tokens_repository
                .insert_if_hash_unique(
                    &mut tx,
                    VisitorTokenUuid::new(),
                    &token,
                    &secret,
                    expires_at,
                    now,
                )
                .await?;

            if let Some(record) = inserted {
                tx.commit().await?;

                info!(
                    token = %record.uuid,
                    resident = %record.resident.uuid,
                    visit_type = %record.visit_type,
                    expires_at = %record.expires_at,
                    "visitor token issued"
                );

                return Ok(IssuedVisitorToken {
                    secret,
                    token: record,
                });
            }

            warn!(attempt, "visitor token hash collision, drawing a new secret");
        }

        Err(VisitorsServiceError::Generation {
            attempts: MAX_SECRET_ATTEMPTS,
        })
    }

    async fn verify_token(
        &self,
        secret: &str,
        now: Timestamp,
    ) -> Result<TokenState, VisitorsServiceError> {
        let secret = presented_secret(secret)?;

        let mut tx = self.db.begin().await?;

        let token = self
            .tokens_repository
            .find_by_hash(&mut tx, &secret.hash())
            .await?;

        let latest_entry = match &token {
            Some(token) if token.usage.is_used() => {
                self.entries_repository
                    .latest_entry_for_token(&mut tx, token.uuid)
                    .await?
            }
            Some(_) | None => None,
        };

        tx.commit().await?;

        Ok(TokenState::classify(token, latest_entry, now))
    }

    async fn grant_entry(
        &self,
        secret: &str,
        grant: EntryGrant,
        now: Timestamp,
    ) -> Result<GrantedEntry, VisitorsServiceError> {
        let secret = presented_secret(secret)?;
        let grant = grant.validated()?;

        let mut tx = self.db.begin().await?;

        let Some(mut token) = self
            .tokens_repository
            .find_by_hash_for_update(&mut tx, &secret.hash())
            .await?
        else {
            return Err(VisitorsServiceError::NotFound);
        };

        if token.is_expired(now) {
            return Err(VisitorsServiceError::Expired {
                expired_at: token.expires_at,
            });
        }

        if token.usage.is_used() {
            return Err(VisitorsServiceError::AlreadyUsed);
        }

        if !self
            .tokens_repository
            .mark_used_if_unused(&mut tx, token.uuid, now)
            .await?
        {
            return Err(VisitorsServiceError::AlreadyUsed);
        }

        let entry = self
            .entries_repository
            .create_entry(
                &mut tx,
                NewVisitorEntry {
                    uuid: VisitorEntryUuid::new(),
                    token_uuid: token.uuid,
                    visitor_name: grant
                        .visitor_name
                        .unwrap_or_else(|| token.issued_for_name.clone()),
                    visitor_phone: grant
                        .visitor_phone
                        .or_else(|| token.issued_for_phone.clone()),
                    entered_at: now,
                    guard_uuid: grant.guard,
                    gate_id: grant.gate_id,
                    note: grant.note,
                },
            )
            .await?;

        tx.commit().await?;

        token.mark_used(now);

        info!(
            token = %token.uuid,
            entry = %entry.uuid,
            guard = %entry.guard.uuid,
            "visitor entry granted"
        );

        Ok(GrantedEntry { token, entry })
    }

    async fn record_exit(
        &self,
        entry: VisitorEntryUuid,
        note: Option<String>,
        now: Timestamp,
    ) -> Result<VisitorEntryRecord, VisitorsServiceError> {
        let note = exit_note(note)?;

        let mut tx = self.db.begin().await?;

        let Some(entry) = self
            .entries_repository
            .find_entry_for_update(&mut tx, entry)
            .await?
        else {
            return Err(VisitorsServiceError::NotFound);
        };

        let closed = self.close_entry(&mut tx, entry, note, now).await?;

        tx.commit().await?;

        Ok(closed)
    }

    async fn checkout_by_token(
        &self,
        secret: &str,
        note: Option<String>,
        now: Timestamp,
    ) -> Result<VisitorEntryRecord, VisitorsServiceError> {
        let secret = presented_secret(secret)?;
        let note = exit_note(note)?;

        let mut tx = self.db.begin().await?;

        let Some(token) = self
            .tokens_repository
            .find_by_hash(&mut tx, &secret.hash())
            .await?
        else {
            return Err(VisitorsServiceError::NotFound);
        };

        let Some(entry) = self
            .entries_repository
            .find_active_entry_for_token_for_update(&mut tx, token.uuid)
            .await?
        else {
            return Err(VisitorsServiceError::NoActiveEntry);
        };

        let closed = self.close_entry(&mut tx, entry, note, now).await?;

        tx.commit().await?;

        Ok(closed)
    }

    async fn list_tokens(
        &self,
        resident: AccountUuid,
    ) -> Result<Vec<VisitorTokenRecord>, VisitorsServiceError> {
        let mut tx = self.db.begin().await?;

        let tokens = self
            .tokens_repository
            .list_for_resident(&mut tx, resident)
            .await?;

        tx.commit().await?;

        Ok(tokens)
    }

    async fn get_token(
        &self,
        resident: AccountUuid,
        token: VisitorTokenUuid,
    ) -> Result<VisitorTokenRecord, VisitorsServiceError> {
        let mut tx = self.db.begin().await?;

        let token = self
            .tokens_repository
            .get_for_resident(&mut tx, resident, token)
            .await?
            .ok_or(VisitorsServiceError::NotFound)?;

        tx.commit().await?;

        Ok(token)
    }

    async fn list_active_entries(&self) -> Result<Vec<VisitorEntryRecord>, VisitorsServiceError> {
        let mut tx = self.db.begin().await?;

        let entries = self.entries_repository.list_active_entries(&mut tx).await?;

        tx.commit().await?;

        Ok(entries)
    }
}

impl PgVisitorsService {
    /// Close a locked entry, appending `note` to whatever was recorded at entry.
    async fn close_entry(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        entry: VisitorEntryRecord,
        note: Option<String>,
        now: Timestamp,
    ) -> Result<VisitorEntryRecord, VisitorsServiceError> {
        if let Some(exit) = entry.exit {
            return Err(VisitorsServiceError::AlreadyExited {
                exited_at: exit.exited_at,
            });
        }

        let exit = EntryExit::closing(entry.entered_at, now);
        let note = append_note(entry.note.as_deref(), note.as_deref());

        let Some(closed) = self
            .entries_repository
            .close_active_entry(tx, entry.uuid, exit, note.as_deref())
            .await?
        else {
            let stored = self
                .entries_repository
                .find_entry_for_update(tx, entry.uuid)
                .await?
                .and_then(|stored| stored.exit);

            return Err(match stored {
                Some(stored) => VisitorsServiceError::AlreadyExited {
                    exited_at: stored.exited_at,
                },
                None => VisitorsServiceError::NotFound,
            });
        };

        info!(
            entry = %closed.uuid,
            token = %closed.token_uuid,
            duration_minutes = exit.duration_minutes,
            "visitor exit recorded"
        );

        Ok(closed)
    }
}

#[automock]
#[async_trait]
pub trait VisitorsService: Send + Sync {
    /// Issue a single-use token for a resident's visitor. The plaintext secret is returned once.
    async fn issue_token(
        &self,
        token: NewVisitorToken,
        now: Timestamp,
    ) -> Result<IssuedVisitorToken, VisitorsServiceError>;

    /// Report the state of a presented secret without changing anything.
    async fn verify_token(
        &self,
        secret: &str,
        now: Timestamp,
    ) -> Result<TokenState, VisitorsServiceError>;

    /// Consume a token and open an entry. At most one caller succeeds per token.
    async fn grant_entry(
        &self,
        secret: &str,
        grant: EntryGrant,
        now: Timestamp,
    ) -> Result<GrantedEntry, VisitorsServiceError>;

    /// Close an open entry by its identifier.
    async fn record_exit(
        &self,
        entry: VisitorEntryUuid,
        note: Option<String>,
        now: Timestamp,
    ) -> Result<VisitorEntryRecord, VisitorsServiceError>;

    /// Close the open entry of the token matching a presented secret. Works after expiry.
    async fn checkout_by_token(
        &self,
        secret: &str,
        note: Option<String>,
        now: Timestamp,
    ) -> Result<VisitorEntryRecord, VisitorsServiceError>;

    /// Tokens issued by a resident, newest first.
    async fn list_tokens(
        &self,
        resident: AccountUuid,
    ) -> Result<Vec<VisitorTokenRecord>, VisitorsServiceError>;

    /// A single token issued by a resident.
    async fn get_token(
        &self,
        resident: AccountUuid,
        token: VisitorTokenUuid,
    ) -> Result<VisitorTokenRecord, VisitorsServiceError>;

    /// Visitors currently inside, oldest entry first.
    async fn list_active_entries(&self) -> Result<Vec<VisitorEntryRecord>, VisitorsServiceError>;
}

#[cfg(test)]
mod tests {
    use jiff::SignedDuration;
    use sqlx::query_scalar;
    use testresult::TestResult;
    use tokio::task::JoinSet;

    use super::*;
    use crate::{
        domain::visitors::records::VisitType,
        test::{
            TestContext,
            helpers::{at, grant_for, issue_short, new_token},
        },
    };

    #[tokio::test]
    async fn issue_short_token_expires_in_hours() -> TestResult {
        let ctx = TestContext::new().await;
        let t0 = at("2026-03-01T09:00:00Z")?;

        let issued = issue_short(&ctx, 2, t0).await?;

        assert_eq!(issued.token.expires_at, t0 + SignedDuration::from_hours(2));
        assert_eq!(issued.token.created_at, t0);
        assert_eq!(issued.token.resident.uuid, ctx.resident.uuid);
        assert_eq!(issued.token.token_hash, issued.secret.hash());
        assert_eq!(issued.token.usage.temp_token(), Some(&issued.secret));

        Ok(())
    }

    #[tokio::test]
    async fn issue_long_token_expires_in_days() -> TestResult {
        let ctx = TestContext::new().await;
        let t0 = at("2026-03-01T09:00:00Z")?;

        let issued = ctx
            .visitors
            .issue_token(
                NewVisitorToken {
                    visit_type: VisitType::Contractor,
                    duration: 3,
                    ..new_token(&ctx)
                },
                t0,
            )
            .await?;

        assert_eq!(issued.token.expires_at, t0 + SignedDuration::from_hours(72));

        Ok(())
    }

    #[tokio::test]
    async fn issue_token_rejects_invalid_input_before_storage() -> TestResult {
        let ctx = TestContext::new().await;

        let result = ctx
            .visitors
            .issue_token(
                NewVisitorToken {
                    duration: 0,
                    ..new_token(&ctx)
                },
                at("2026-03-01T09:00:00Z")?,
            )
            .await;

        assert!(
            matches!(
                result,
                Err(VisitorsServiceError::Validation(
                    ValidationError::DurationOutOfRange { .. }
                ))
            ),
            "expected DurationOutOfRange, got {result:?}"
        );

        let count: i64 = query_scalar("SELECT COUNT(*) FROM visitor_tokens")
            .fetch_one(ctx.db.pool())
            .await?;

        assert_eq!(count, 0);

        Ok(())
    }

    #[tokio::test]
    async fn issue_token_for_unknown_resident_returns_invalid_reference() -> TestResult {
        let ctx = TestContext::new().await;

        let result = ctx
            .visitors
            .issue_token(
                NewVisitorToken {
                    resident: AccountUuid::new(),
                    ..new_token(&ctx)
                },
                at("2026-03-01T09:00:00Z")?,
            )
            .await;

        assert!(
            matches!(result, Err(VisitorsServiceError::InvalidReference)),
            "expected InvalidReference, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn issue_token_gives_up_after_repeated_collisions() -> TestResult {
        let ctx = TestContext::new().await;
        let visitors = ctx
            .visitors
            .clone()
            .with_secret_generator(|| VisitorSecret::from_presented("VT-AAAAAAAAAA"));
        let t0 = at("2026-03-01T09:00:00Z")?;

        visitors.issue_token(new_token(&ctx), t0).await?;

        let result = visitors.issue_token(new_token(&ctx), t0).await;

        assert!(
            matches!(
                result,
                Err(VisitorsServiceError::Generation {
                    attempts: MAX_SECRET_ATTEMPTS
                })
            ),
            "expected Generation, got {result:?}"
        );

        let count: i64 = query_scalar("SELECT COUNT(*) FROM visitor_tokens")
            .fetch_one(ctx.db.pool())
            .await?;

        assert_eq!(count, 1);

        Ok(())
    }

    #[tokio::test]
    async fn verify_fresh_token_is_valid_unused() -> TestResult {
        let ctx = TestContext::new().await;
        let t0 = at("2026-03-01T09:00:00Z")?;
        let issued = issue_short(&ctx, 2, t0).await?;

        let state = ctx
            .visitors
            .verify_token(issued.secret.expose(), t0 + SignedDuration::from_mins(5))
            .await?;

        assert_eq!(state.status(), "valid_unused");

        Ok(())
    }

    #[tokio::test]
    async fn verify_normalises_presented_secret() -> TestResult {
        let ctx = TestContext::new().await;
        let t0 = at("2026-03-01T09:00:00Z")?;
        let issued = issue_short(&ctx, 2, t0).await?;

        let presented = format!("  {}\n", issued.secret.expose().to_lowercase());

        let state = ctx.visitors.verify_token(&presented, t0).await?;

        assert_eq!(state.status(), "valid_unused");

        Ok(())
    }

    #[tokio::test]
    async fn verify_unknown_secret_is_not_found() -> TestResult {
        let ctx = TestContext::new().await;

        let state = ctx
            .visitors
            .verify_token("VT-ZZZZZZZZZZ", at("2026-03-01T09:00:00Z")?)
            .await?;

        assert_eq!(state, TokenState::NotFound);

        Ok(())
    }

    #[tokio::test]
    async fn verify_blank_secret_is_a_validation_error() -> TestResult {
        let ctx = TestContext::new().await;

        let result = ctx
            .visitors
            .verify_token("   ", at("2026-03-01T09:00:00Z")?)
            .await;

        assert!(
            matches!(
                result,
                Err(VisitorsServiceError::Validation(ValidationError::SecretMissing))
            ),
            "expected SecretMissing, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn verify_unused_token_past_expiry_is_expired() -> TestResult {
        let ctx = TestContext::new().await;
        let t0 = at("2026-03-01T09:00:00Z")?;
        let issued = issue_short(&ctx, 1, t0).await?;

        let state = ctx
            .visitors
            .verify_token(issued.secret.expose(), t0 + SignedDuration::from_hours(3))
            .await?;

        let TokenState::Expired { expired_for, .. } = state else {
            panic!("expected Expired, got {state:?}");
        };

        assert_eq!(expired_for, SignedDuration::from_hours(2));

        Ok(())
    }

    #[tokio::test]
    async fn grant_entry_consumes_token_and_opens_entry() -> TestResult {
        let ctx = TestContext::new().await;
        let t0 = at("2026-03-01T09:00:00Z")?;
        let issued = issue_short(&ctx, 2, t0).await?;
        let now = t0 + SignedDuration::from_hours(1);

        let granted = ctx
            .visitors
            .grant_entry(
                issued.secret.expose(),
                EntryGrant {
                    gate_id: Some("north".to_string()),
                    ..grant_for(&ctx)
                },
                now,
            )
            .await?;

        assert_eq!(granted.token.used_at(), Some(now));
        assert_eq!(granted.token.usage.temp_token(), None);
        assert_eq!(granted.entry.entered_at, now);
        assert_eq!(granted.entry.visitor_name, issued.token.issued_for_name);
        assert_eq!(granted.entry.guard.uuid, ctx.guard.uuid);
        assert_eq!(granted.entry.gate_id.as_deref(), Some("north"));
        assert!(granted.entry.is_active());

        let stored_plaintext: Option<String> =
            query_scalar("SELECT temp_token FROM visitor_tokens WHERE uuid = $1")
                .bind(issued.token.uuid.into_uuid())
                .fetch_one(ctx.db.pool())
                .await?;

        assert_eq!(stored_plaintext, None);

        Ok(())
    }

    #[tokio::test]
    async fn grant_entry_prefers_gate_supplied_visitor_details() -> TestResult {
        let ctx = TestContext::new().await;
        let t0 = at("2026-03-01T09:00:00Z")?;
        let issued = issue_short(&ctx, 2, t0).await?;

        let granted = ctx
            .visitors
            .grant_entry(
                issued.secret.expose(),
                EntryGrant {
                    visitor_name: Some("Ada N. Obi".to_string()),
                    visitor_phone: Some("+2348000000000".to_string()),
                    ..grant_for(&ctx)
                },
                t0,
            )
            .await?;

        assert_eq!(granted.entry.visitor_name, "Ada N. Obi");
        assert_eq!(
            granted.entry.visitor_phone.as_deref(),
            Some("+2348000000000")
        );

        Ok(())
    }

    #[tokio::test]
    async fn grant_entry_on_used_token_returns_already_used() -> TestResult {
        let ctx = TestContext::new().await;
        let t0 = at("2026-03-01T09:00:00Z")?;
        let issued = issue_short(&ctx, 2, t0).await?;

        ctx.visitors
            .grant_entry(issued.secret.expose(), grant_for(&ctx), t0)
            .await?;

        let result = ctx
            .visitors
            .grant_entry(
                issued.secret.expose(),
                grant_for(&ctx),
                t0 + SignedDuration::from_mins(1),
            )
            .await;

        assert!(
            matches!(result, Err(VisitorsServiceError::AlreadyUsed)),
            "expected AlreadyUsed, got {result:?}"
        );

        let entries: i64 = query_scalar("SELECT COUNT(*) FROM visitor_entries")
            .fetch_one(ctx.db.pool())
            .await?;

        assert_eq!(entries, 1);

        Ok(())
    }

    #[tokio::test]
    async fn used_token_past_expiry_refuses_grant_but_verifies_as_granted() -> TestResult {
        let ctx = TestContext::new().await;
        let t0 = at("2026-03-01T09:00:00Z")?;
        let later = t0 + SignedDuration::from_hours(2);
        let issued = issue_short(&ctx, 1, t0).await?;

        ctx.visitors
            .grant_entry(issued.secret.expose(), grant_for(&ctx), t0)
            .await?;

        let result = ctx
            .visitors
            .grant_entry(issued.secret.expose(), grant_for(&ctx), later)
            .await;

        assert!(
            matches!(result, Err(VisitorsServiceError::Expired { .. })),
            "expected Expired, got {result:?}"
        );

        let state = ctx
            .visitors
            .verify_token(issued.secret.expose(), later)
            .await?;

        assert_eq!(state.status(), "granted_active");

        Ok(())
    }

    #[tokio::test]
    async fn grant_entry_on_expired_token_returns_expired() -> TestResult {
        let ctx = TestContext::new().await;
        let t0 = at("2026-03-01T09:00:00Z")?;
        let issued = issue_short(&ctx, 1, t0).await?;

        let result = ctx
            .visitors
            .grant_entry(
                issued.secret.expose(),
                grant_for(&ctx),
                t0 + SignedDuration::from_hours(1),
            )
            .await;

        assert!(
            matches!(
                result,
                Err(VisitorsServiceError::Expired { expired_at }) if expired_at == issued.token.expires_at
            ),
            "expected Expired, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn grant_entry_unknown_secret_returns_not_found() -> TestResult {
        let ctx = TestContext::new().await;

        let result = ctx
            .visitors
            .grant_entry("VT-ZZZZZZZZZZ", grant_for(&ctx), at("2026-03-01T09:00:00Z")?)
            .await;

        assert!(
            matches!(result, Err(VisitorsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_grants_admit_exactly_one_visitor() -> TestResult {
        const ATTEMPTS: usize = 8;

        let ctx = TestContext::new().await;
        let t0 = at("2026-03-01T09:00:00Z")?;
        let issued = issue_short(&ctx, 2, t0).await?;

        let mut grants = JoinSet::new();

        for _ in 0..ATTEMPTS {
            let visitors = ctx.visitors.clone();
            let secret = issued.secret.expose().to_string();
            let grant = grant_for(&ctx);

            grants.spawn(async move { visitors.grant_entry(&secret, grant, t0).await });
        }

        let mut granted = 0;
        let mut already_used = 0;

        while let Some(result) = grants.join_next().await {
            match result? {
                Ok(_) => granted += 1,
                Err(VisitorsServiceError::AlreadyUsed) => already_used += 1,
                Err(error) => panic!("unexpected grant failure: {error:?}"),
            }
        }

        assert_eq!(granted, 1);
        assert_eq!(already_used, ATTEMPTS - 1);

        let entries: i64 =
            query_scalar("SELECT COUNT(*) FROM visitor_entries WHERE token_uuid = $1")
                .bind(issued.token.uuid.into_uuid())
                .fetch_one(ctx.db.pool())
                .await?;

        assert_eq!(entries, 1);

        Ok(())
    }

    #[tokio::test]
    async fn record_exit_sets_duration_and_cannot_repeat() -> TestResult {
        let ctx = TestContext::new().await;
        let t0 = at("2026-03-01T09:00:00Z")?;
        let issued = issue_short(&ctx, 2, t0).await?;

        let granted = ctx
            .visitors
            .grant_entry(
                issued.secret.expose(),
                EntryGrant {
                    note: Some("with van".to_string()),
                    ..grant_for(&ctx)
                },
                t0,
            )
            .await?;

        let exited_at = t0 + SignedDuration::from_mins(20);

        let closed = ctx
            .visitors
            .record_exit(granted.entry.uuid, Some("left north".to_string()), exited_at)
            .await?;

        let exit = closed.exit.ok_or("entry should be closed")?;

        assert_eq!(exit.exited_at, exited_at);
        assert_eq!(exit.duration_minutes, 20);
        assert_eq!(closed.note.as_deref(), Some("with van | left north"));

        let result = ctx
            .visitors
            .record_exit(granted.entry.uuid, None, exited_at + SignedDuration::from_mins(5))
            .await;

        assert!(
            matches!(
                result,
                Err(VisitorsServiceError::AlreadyExited { exited_at: previous }) if previous == exited_at
            ),
            "expected AlreadyExited, got {result:?}"
        );

        let state = ctx
            .visitors
            .verify_token(issued.secret.expose(), exited_at + SignedDuration::from_hours(1))
            .await?;

        assert_eq!(
            state.entry().and_then(|entry| entry.exit).map(|exit| exit.exited_at),
            Some(exited_at)
        );

        Ok(())
    }

    #[tokio::test]
    async fn closing_a_stale_entry_reports_the_stored_exit_time() -> TestResult {
        let ctx = TestContext::new().await;
        let t0 = at("2026-03-01T09:00:00Z")?;
        let first_exit = t0 + SignedDuration::from_mins(15);
        let issued = issue_short(&ctx, 2, t0).await?;

        let granted = ctx
            .visitors
            .grant_entry(issued.secret.expose(), grant_for(&ctx), t0)
            .await?;

        ctx.visitors
            .record_exit(granted.entry.uuid, None, first_exit)
            .await?;

        let mut tx = ctx.visitors.db.begin().await?;

        let result = ctx
            .visitors
            .close_entry(
                &mut tx,
                granted.entry,
                None,
                first_exit + SignedDuration::from_mins(30),
            )
            .await;

        tx.rollback().await?;

        assert!(
            matches!(
                result,
                Err(VisitorsServiceError::AlreadyExited { exited_at }) if exited_at == first_exit
            ),
            "expected AlreadyExited at {first_exit}, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn record_exit_unknown_entry_returns_not_found() -> TestResult {
        let ctx = TestContext::new().await;

        let result = ctx
            .visitors
            .record_exit(VisitorEntryUuid::new(), None, at("2026-03-01T09:00:00Z")?)
            .await;

        assert!(
            matches!(result, Err(VisitorsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn checkout_after_expiry_closes_active_entry() -> TestResult {
        let ctx = TestContext::new().await;
        let t0 = at("2026-03-01T09:00:00Z")?;
        let issued = issue_short(&ctx, 1, t0).await?;

        ctx.visitors
            .grant_entry(issued.secret.expose(), grant_for(&ctx), t0)
            .await?;

        let closed = ctx
            .visitors
            .checkout_by_token(
                issued.secret.expose(),
                None,
                t0 + SignedDuration::from_hours(3),
            )
            .await?;

        assert_eq!(closed.exit.map(|exit| exit.duration_minutes), Some(180));

        Ok(())
    }

    #[tokio::test]
    async fn checkout_without_active_entry_returns_no_active_entry() -> TestResult {
        let ctx = TestContext::new().await;
        let t0 = at("2026-03-01T09:00:00Z")?;
        let issued = issue_short(&ctx, 2, t0).await?;

        let result = ctx
            .visitors
            .checkout_by_token(issued.secret.expose(), None, t0)
            .await;

        assert!(
            matches!(result, Err(VisitorsServiceError::NoActiveEntry)),
            "expected NoActiveEntry, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn short_visit_lifecycle() -> TestResult {
        let ctx = TestContext::new().await;
        let t0 = at("2026-03-01T09:00:00Z")?;

        let issued = issue_short(&ctx, 2, t0).await?;
        assert_eq!(issued.token.expires_at, t0 + SignedDuration::from_hours(2));

        let t1 = t0 + SignedDuration::from_hours(1);
        let state = ctx.visitors.verify_token(issued.secret.expose(), t1).await?;
        assert_eq!(state.status(), "valid_unused");

        let granted = ctx
            .visitors
            .grant_entry(issued.secret.expose(), grant_for(&ctx), t1)
            .await?;
        assert_eq!(granted.token.used_at(), Some(t1));
        assert_eq!(granted.entry.entered_at, t1);

        let state = ctx
            .visitors
            .verify_token(issued.secret.expose(), t1 + SignedDuration::from_mins(30))
            .await?;
        assert!(
            matches!(&state, TokenState::GrantedActive { entry, .. } if entry.uuid == granted.entry.uuid),
            "expected GrantedActive, got {state:?}"
        );

        let closed = ctx
            .visitors
            .checkout_by_token(
                issued.secret.expose(),
                None,
                t1 + SignedDuration::from_mins(45),
            )
            .await?;
        assert_eq!(closed.exit.map(|exit| exit.duration_minutes), Some(45));

        let state = ctx
            .visitors
            .verify_token(issued.secret.expose(), t0 + SignedDuration::from_hours(5))
            .await?;
        assert_eq!(state.status(), "used_and_exited");

        Ok(())
    }

    #[tokio::test]
    async fn list_tokens_is_scoped_to_resident_and_newest_first() -> TestResult {
        let ctx = TestContext::new().await;
        let t0 = at("2026-03-01T09:00:00Z")?;

        let first = issue_short(&ctx, 2, t0).await?;
        let second = issue_short(&ctx, 2, t0 + SignedDuration::from_mins(10)).await?;

        let tokens = ctx.visitors.list_tokens(ctx.resident.uuid).await?;
        let uuids: Vec<_> = tokens.iter().map(|token| token.uuid).collect();

        assert_eq!(uuids, vec![second.token.uuid, first.token.uuid]);

        let others = ctx.visitors.list_tokens(ctx.guard.uuid).await?;

        assert!(others.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn get_token_hides_other_residents_tokens() -> TestResult {
        let ctx = TestContext::new().await;
        let issued = issue_short(&ctx, 2, at("2026-03-01T09:00:00Z")?).await?;

        let token = ctx
            .visitors
            .get_token(ctx.resident.uuid, issued.token.uuid)
            .await?;

        assert_eq!(token, issued.token);

        let result = ctx
            .visitors
            .get_token(ctx.guard.uuid, issued.token.uuid)
            .await;

        assert!(
            matches!(result, Err(VisitorsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn list_active_entries_excludes_exited_visitors() -> TestResult {
        let ctx = TestContext::new().await;
        let t0 = at("2026-03-01T09:00:00Z")?;

        let staying = issue_short(&ctx, 2, t0).await?;
        let leaving = issue_short(&ctx, 2, t0).await?;

        let staying = ctx
            .visitors
            .grant_entry(staying.secret.expose(), grant_for(&ctx), t0)
            .await?;
        ctx.visitors
            .grant_entry(leaving.secret.expose(), grant_for(&ctx), t0)
            .await?;
        ctx.visitors
            .checkout_by_token(
                leaving.secret.expose(),
                None,
                t0 + SignedDuration::from_mins(5),
            )
            .await?;

        let active = ctx.visitors.list_active_entries().await?;

        assert_eq!(active, vec![staying.entry]);

        Ok(())
    }
}
