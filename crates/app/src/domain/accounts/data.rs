//! Account Data

use crate::domain::accounts::records::{AccountRole, AccountUuid};

/// New Account Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    /// UUID to assign to the account row.
    pub uuid: AccountUuid,

    /// Display name shown to gate staff and residents.
    pub name: String,

    pub role: AccountRole,
}
