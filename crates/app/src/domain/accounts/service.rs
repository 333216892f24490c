//! Accounts service.

use async_trait::async_trait;
use mockall::automock;
use sqlx::PgPool;
use tracing::info;

use crate::domain::accounts::{
    credentials::{ApiToken, hash_api_token},
    data::NewAccount,
    errors::AccountsServiceError,
    records::AccountRecord,
    repository::PgAccountsRepository,
};

/// Account creation result with the one-time bearer token.
#[derive(Debug)]
pub struct IssuedAccount {
    pub account: AccountRecord,
    pub api_token: ApiToken,
}

#[derive(Debug, Clone)]
pub struct PgAccountsService {
    repository: PgAccountsRepository,
}

impl PgAccountsService {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: PgAccountsRepository::new(pool),
        }
    }

    /// Create an account and issue its API token.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is blank, the UUID is taken or the insert fails.
    pub async fn create_account(
        &self,
        account: NewAccount,
    ) -> Result<IssuedAccount, AccountsServiceError> {
        if account.name.trim().is_empty() {
            return Err(AccountsServiceError::InvalidData);
        }

        let api_token = ApiToken::generate();

        let account = self
            .repository
            .create_account(account, &api_token.hash())
            .await?;

        info!(account = %account.uuid, role = %account.role, "account created");

        Ok(IssuedAccount { account, api_token })
    }
}

#[async_trait]
impl AccountsService for PgAccountsService {
    async fn authenticate_bearer(
        &self,
        bearer_token: &str,
    ) -> Result<AccountRecord, AccountsServiceError> {
        self.repository
            .find_by_api_token_hash(&hash_api_token(bearer_token))
            .await?
            .ok_or(AccountsServiceError::NotFound)
    }
}

#[automock]
#[async_trait]
/// Caller identity resolution.
pub trait AccountsService: Send + Sync {
    /// Resolve a bearer token to the account it was issued for.
    async fn authenticate_bearer(
        &self,
        bearer_token: &str,
    ) -> Result<AccountRecord, AccountsServiceError>;
}
