//! Visitor response bodies shared across handlers.

use std::string::ToString;

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use gatehouse_app::domain::{
    accounts::records::AccountSummary,
    visitors::records::{VisitType, VisitorEntryRecord, VisitorTokenRecord},
};

/// Kind of visit; `short` durations are hours, every other kind is days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub(crate) enum VisitTypeParam {
    Short,
    Long,
    Delivery,
    Contractor,
    Other,
}

impl From<VisitTypeParam> for VisitType {
    fn from(param: VisitTypeParam) -> Self {
        match param {
            VisitTypeParam::Short => Self::Short,
            VisitTypeParam::Long => Self::Long,
            VisitTypeParam::Delivery => Self::Delivery,
            VisitTypeParam::Contractor => Self::Contractor,
            VisitTypeParam::Other => Self::Other,
        }
    }
}

impl From<VisitType> for VisitTypeParam {
    fn from(visit_type: VisitType) -> Self {
        match visit_type {
            VisitType::Short => Self::Short,
            VisitType::Long => Self::Long,
            VisitType::Delivery => Self::Delivery,
            VisitType::Contractor => Self::Contractor,
            VisitType::Other => Self::Other,
        }
    }
}

/// Resident or guard identity.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub(crate) struct AccountSummaryResponse {
    pub uuid: Uuid,
    pub name: String,
}

impl From<AccountSummary> for AccountSummaryResponse {
    fn from(account: AccountSummary) -> Self {
        Self {
            uuid: account.uuid.into(),
            name: account.name,
        }
    }
}

/// Visitor identification.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub(crate) struct VisitorResponse {
    pub name: String,
    pub phone: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct VisitorTokenResponse {
    pub token_id: Uuid,

    /// Plaintext code; only present on a resident's own token while it is unused.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    pub visitor: VisitorResponse,
    pub visit_type: VisitTypeParam,

    /// Hours for short visits, days otherwise
    pub duration: u32,

    pub note: Option<String>,
    pub issuer: AccountSummaryResponse,
    pub expires_at: String,
    pub used_at: Option<String>,
    pub created_at: String,
}

impl From<VisitorTokenRecord> for VisitorTokenResponse {
    fn from(token: VisitorTokenRecord) -> Self {
        Self {
            token_id: token.uuid.into(),
            token: None,
            used_at: token.used_at().as_ref().map(ToString::to_string),
            visitor: VisitorResponse {
                name: token.issued_for_name,
                phone: token.issued_for_phone,
            },
            visit_type: token.visit_type.into(),
            duration: token.duration,
            note: token.note,
            issuer: token.resident.into(),
            expires_at: token.expires_at.to_string(),
            created_at: token.created_at.to_string(),
        }
    }
}

impl VisitorTokenResponse {
    /// Include the plaintext code while the token is still unused.
    pub(crate) fn with_secret(token: VisitorTokenRecord) -> Self {
        let secret = token
            .usage
            .temp_token()
            .map(|secret| secret.expose().to_string());

        Self {
            token: secret,
            ..token.into()
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct VisitorEntryResponse {
    pub entry_id: Uuid,
    pub token_id: Uuid,
    pub visitor: VisitorResponse,
    pub entered_at: String,
    pub exited_at: Option<String>,
    pub duration_minutes: Option<u32>,

    /// Guard who granted entry
    pub guard: AccountSummaryResponse,

    pub gate_id: Option<String>,
    pub note: Option<String>,
}

impl From<VisitorEntryRecord> for VisitorEntryResponse {
    fn from(entry: VisitorEntryRecord) -> Self {
        Self {
            entry_id: entry.uuid.into(),
            token_id: entry.token_uuid.into(),
            visitor: VisitorResponse {
                name: entry.visitor_name,
                phone: entry.visitor_phone,
            },
            entered_at: entry.entered_at.to_string(),
            exited_at: entry.exit.map(|exit| exit.exited_at.to_string()),
            duration_minutes: entry.exit.map(|exit| exit.duration_minutes),
            guard: entry.guard.into(),
            gate_id: entry.gate_id,
            note: entry.note,
        }
    }
}
