//! Authenticated caller stored in the depot by the auth middleware.

use salvo::prelude::{Depot, StatusError};

use gatehouse_app::domain::accounts::records::{AccountRecord, AccountRole};

pub(crate) trait AccountDepotExt {
    fn insert_account(&mut self, account: AccountRecord);

    fn account_or_401(&self) -> Result<&AccountRecord, StatusError>;

    fn resident_or_403(&self) -> Result<&AccountRecord, StatusError>;

    fn guard_or_403(&self) -> Result<&AccountRecord, StatusError>;
}

impl AccountDepotExt for Depot {
    fn insert_account(&mut self, account: AccountRecord) {
        self.inject(account);
    }

    fn account_or_401(&self) -> Result<&AccountRecord, StatusError> {
        self.obtain::<AccountRecord>()
            .map_err(|_ignored| StatusError::unauthorized())
    }

    fn resident_or_403(&self) -> Result<&AccountRecord, StatusError> {
        account_with_role(self, AccountRole::Resident)
    }

    fn guard_or_403(&self) -> Result<&AccountRecord, StatusError> {
        account_with_role(self, AccountRole::Guard)
    }
}

fn account_with_role(depot: &Depot, role: AccountRole) -> Result<&AccountRecord, StatusError> {
    let account = depot.account_or_401()?;

    if account.role != role {
        return Err(StatusError::forbidden().brief(format!("Requires a {role} account")));
    }

    Ok(account)
}
