//! Visitor Records

use std::{fmt, str::FromStr};

use jiff::{SignedDuration, Timestamp};
use thiserror::Error;

use crate::{
    domain::{accounts::records::AccountSummary, visitors::secret::VisitorSecret},
    uuids::TypedUuid,
};

/// Visitor Token UUID
pub type VisitorTokenUuid = TypedUuid<VisitorTokenRecord>;

/// Visitor Entry UUID
pub type VisitorEntryUuid = TypedUuid<VisitorEntryRecord>;

/// Kind of visit a token is issued for. Short visits count their duration in hours, every other
/// kind counts in days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisitType {
    Short,
    Long,
    Delivery,
    Contractor,
    Other,
}

impl VisitType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Short => "short",
            Self::Long => "long",
            Self::Delivery => "delivery",
            Self::Contractor => "contractor",
            Self::Other => "other",
        }
    }

    #[must_use]
    pub const fn counts_in_hours(self) -> bool {
        matches!(self, Self::Short)
    }

    /// Length of a visit of `duration` units of this type.
    #[must_use]
    pub fn visit_length(self, duration: u32) -> SignedDuration {
        let hours = i64::from(duration);

        if self.counts_in_hours() {
            SignedDuration::from_hours(hours)
        } else {
            SignedDuration::from_hours(hours * 24)
        }
    }

    /// Expiry of a token issued at `issued_at` for `duration` units.
    ///
    /// # Errors
    ///
    /// Returns an error when the result falls outside the representable time range.
    pub fn expires_at(self, issued_at: Timestamp, duration: u32) -> Result<Timestamp, jiff::Error> {
        issued_at.checked_add(self.visit_length(duration))
    }
}

impl fmt::Display for VisitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown visit type: {0}")]
pub struct UnknownVisitType(String);

impl FromStr for VisitType {
    type Err = UnknownVisitType;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "short" => Ok(Self::Short),
            "long" => Ok(Self::Long),
            "delivery" => Ok(Self::Delivery),
            "contractor" => Ok(Self::Contractor),
            "other" => Ok(Self::Other),
            other => Err(UnknownVisitType(other.to_string())),
        }
    }
}

/// Whether a token has been consumed. The plaintext copy of the secret only exists while the
/// token is unused; consuming it discards the plaintext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenUsage {
    Unused { temp_token: Option<VisitorSecret> },
    Used { used_at: Timestamp },
}

impl TokenUsage {
    /// Rebuild usage from stored columns. A stored plaintext next to a usage timestamp is dropped.
    #[must_use]
    pub fn from_columns(used_at: Option<Timestamp>, temp_token: Option<String>) -> Self {
        match used_at {
            Some(used_at) => Self::Used { used_at },
            None => Self::Unused {
                temp_token: temp_token.map(VisitorSecret::from_stored),
            },
        }
    }

    /// Mark as consumed at `at`. Has no effect on an already used token.
    pub fn mark_used(&mut self, at: Timestamp) {
        if let Self::Unused { .. } = self {
            *self = Self::Used { used_at: at };
        }
    }

    #[must_use]
    pub const fn is_used(&self) -> bool {
        matches!(self, Self::Used { .. })
    }

    #[must_use]
    pub const fn used_at(&self) -> Option<Timestamp> {
        match self {
            Self::Used { used_at } => Some(*used_at),
            Self::Unused { .. } => None,
        }
    }

    #[must_use]
    pub const fn temp_token(&self) -> Option<&VisitorSecret> {
        match self {
            Self::Unused { temp_token } => temp_token.as_ref(),
            Self::Used { .. } => None,
        }
    }
}

/// Visitor Token Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitorTokenRecord {
    pub uuid: VisitorTokenUuid,

    /// Resident who issued the token.
    pub resident: AccountSummary,

    /// SHA-256 of the normalised secret.
    pub token_hash: String,

    pub issued_for_name: String,
    pub issued_for_phone: Option<String>,
    pub visit_type: VisitType,

    /// Visit length in hours (short visits) or days.
    pub duration: u32,

    pub note: Option<String>,
    pub expires_at: Timestamp,
    pub usage: TokenUsage,
    pub created_at: Timestamp,
}

impl VisitorTokenRecord {
    #[must_use]
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.expires_at <= now
    }

    #[must_use]
    pub const fn used_at(&self) -> Option<Timestamp> {
        self.usage.used_at()
    }

    /// Record consumption of the token, discarding the plaintext secret.
    pub fn mark_used(&mut self, at: Timestamp) {
        self.usage.mark_used(at);
    }
}

/// Exit half of an entry; both fields are always written together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryExit {
    pub exited_at: Timestamp,
    pub duration_minutes: u32,
}

impl EntryExit {
    /// Close an entry that started at `entered_at`, at `now`. The stay is rounded to the nearest
    /// minute and an exit can never precede the entry.
    #[must_use]
    pub fn closing(entered_at: Timestamp, now: Timestamp) -> Self {
        let exited_at = now.max(entered_at);
        let seconds = exited_at.duration_since(entered_at).as_secs().max(0);
        let minutes = (seconds + 30) / 60;

        Self {
            exited_at,
            duration_minutes: u32::try_from(minutes).unwrap_or(u32::MAX),
        }
    }
}

/// Visitor Entry Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitorEntryRecord {
    pub uuid: VisitorEntryUuid,
    pub token_uuid: VisitorTokenUuid,

    /// Visitor details as recorded at the gate.
    pub visitor_name: String,
    pub visitor_phone: Option<String>,

    pub entered_at: Timestamp,

    /// Set once, when the visitor leaves.
    pub exit: Option<EntryExit>,

    /// Guard who granted entry.
    pub guard: AccountSummary,

    pub gate_id: Option<String>,
    pub note: Option<String>,
}

impl VisitorEntryRecord {
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.exit.is_none()
    }
}
