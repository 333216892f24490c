//! Gate-side view of a presented visitor token.

use jiff::{SignedDuration, Timestamp};

use crate::domain::visitors::records::{VisitorEntryRecord, VisitorTokenRecord};

/// What a guard learns from verifying a token. Verification never changes state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenState {
    /// No token matches the presented secret.
    NotFound,

    /// Unused and past its expiry.
    Expired {
        token: VisitorTokenRecord,

        /// How long ago the token expired.
        expired_for: SignedDuration,
    },

    /// Unused and within its validity window.
    ValidUnused { token: VisitorTokenRecord },

    /// Consumed, and the visitor is still inside.
    GrantedActive {
        token: VisitorTokenRecord,
        entry: VisitorEntryRecord,
    },

    /// Consumed, and the visitor has left.
    UsedAndExited {
        token: VisitorTokenRecord,
        last_entry: Option<VisitorEntryRecord>,
    },
}

impl TokenState {
    /// Classify a token from its stored state and most recent entry.
    ///
    /// Usage takes precedence over expiry: a consumed token reports where its visitor is even
    /// after the validity window has closed.
    #[must_use]
    pub fn classify(
        token: Option<VisitorTokenRecord>,
        latest_entry: Option<VisitorEntryRecord>,
        now: Timestamp,
    ) -> Self {
        let Some(token) = token else {
            return Self::NotFound;
        };

        if token.usage.is_used() {
            return match latest_entry {
                Some(entry) if entry.is_active() => Self::GrantedActive { token, entry },
                last_entry => Self::UsedAndExited { token, last_entry },
            };
        }

        if token.is_expired(now) {
            let expired_for = now.duration_since(token.expires_at);

            return Self::Expired { token, expired_for };
        }

        Self::ValidUnused { token }
    }

    /// Stable machine-readable name of the state.
    #[must_use]
    pub const fn status(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Expired { .. } => "expired",
            Self::ValidUnused { .. } => "valid_unused",
            Self::GrantedActive { .. } => "granted_active",
            Self::UsedAndExited { .. } => "used_and_exited",
        }
    }

    #[must_use]
    pub const fn token(&self) -> Option<&VisitorTokenRecord> {
        match self {
            Self::NotFound => None,
            Self::Expired { token, .. }
            | Self::ValidUnused { token }
            | Self::GrantedActive { token, .. }
            | Self::UsedAndExited { token, .. } => Some(token),
        }
    }

    #[must_use]
    pub const fn entry(&self) -> Option<&VisitorEntryRecord> {
        match self {
            Self::GrantedActive { entry, .. } => Some(entry),
            Self::UsedAndExited { last_entry, .. } => last_entry.as_ref(),
            Self::NotFound | Self::Expired { .. } | Self::ValidUnused { .. } => None,
        }
    }
}
