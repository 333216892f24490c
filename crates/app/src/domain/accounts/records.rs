//! Account Records

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use thiserror::Error;

use crate::uuids::TypedUuid;

/// Account UUID
pub type AccountUuid = TypedUuid<AccountRecord>;

/// What an account is allowed to do at the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum AccountRole {
    /// Issues visitor tokens for their own guests.
    Resident,

    /// Verifies tokens, grants entry and records exits.
    Guard,
}

impl AccountRole {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Resident => "resident",
            Self::Guard => "guard",
        }
    }
}

impl fmt::Display for AccountRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown account role: {0}")]
pub struct UnknownAccountRole(String);

impl FromStr for AccountRole {
    type Err = UnknownAccountRole;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "resident" => Ok(Self::Resident),
            "guard" => Ok(Self::Guard),
            other => Err(UnknownAccountRole(other.to_string())),
        }
    }
}

/// Account Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRecord {
    pub uuid: AccountUuid,
    pub name: String,
    pub role: AccountRole,
    pub created_at: Timestamp,
}

impl AccountRecord {
    #[must_use]
    pub fn summary(&self) -> AccountSummary {
        AccountSummary {
            uuid: self.uuid,
            name: self.name.clone(),
        }
    }
}

/// Identity of an account as embedded in token and entry records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSummary {
    pub uuid: AccountUuid,
    pub name: String,
}
