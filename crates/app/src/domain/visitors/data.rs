//! Visitor Data

use jiff::Timestamp;

use crate::domain::{
    accounts::records::AccountUuid,
    visitors::{
        errors::ValidationError,
        records::{VisitType, VisitorEntryUuid, VisitorTokenUuid},
    },
};

pub const MAX_VISITOR_NAME_CHARS: usize = 255;
pub const MAX_VISITOR_PHONE_CHARS: usize = 32;
pub const MAX_NOTE_CHARS: usize = 1_000;
pub const MAX_GATE_ID_CHARS: usize = 64;

/// Longest visit, in the unit of the visit type.
pub const MAX_VISIT_DURATION: u32 = 365;

/// New Visitor Token Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVisitorToken {
    /// Resident issuing the token.
    pub resident: AccountUuid,

    pub visitor_name: String,
    pub visitor_phone: Option<String>,
    pub visit_type: VisitType,

    /// Hours for short visits, days otherwise.
    pub duration: u32,

    pub note: Option<String>,
}

impl NewVisitorToken {
    /// Trim free-text fields and check bounds.
    pub(crate) fn validated(self) -> Result<Self, ValidationError> {
        if !(1..=MAX_VISIT_DURATION).contains(&self.duration) {
            return Err(ValidationError::DurationOutOfRange {
                max: MAX_VISIT_DURATION,
            });
        }

        Ok(Self {
            resident: self.resident,
            visitor_name: visitor_name(self.visitor_name)?,
            visitor_phone: visitor_phone(self.visitor_phone)?,
            visit_type: self.visit_type,
            duration: self.duration,
            note: note(self.note)?,
        })
    }
}

/// Gate-side details supplied when granting entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryGrant {
    /// Guard granting entry.
    pub guard: AccountUuid,

    /// Replaces the visitor name captured at issuance.
    pub visitor_name: Option<String>,

    /// Replaces the visitor phone captured at issuance.
    pub visitor_phone: Option<String>,

    pub gate_id: Option<String>,
    pub note: Option<String>,
}

impl EntryGrant {
    pub(crate) fn validated(self) -> Result<Self, ValidationError> {
        let visitor_name = match self.visitor_name {
            Some(name) if !name.trim().is_empty() => Some(visitor_name(name)?),
            Some(_) | None => None,
        };

        let gate_id = optional_text(
            self.gate_id,
            MAX_GATE_ID_CHARS,
            ValidationError::GateIdTooLong {
                max: MAX_GATE_ID_CHARS,
            },
        )?;

        Ok(Self {
            guard: self.guard,
            visitor_name,
            visitor_phone: visitor_phone(self.visitor_phone)?,
            gate_id,
            note: note(self.note)?,
        })
    }
}

/// Visitor entry persistence payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NewVisitorEntry {
    pub uuid: VisitorEntryUuid,
    pub token_uuid: VisitorTokenUuid,
    pub visitor_name: String,
    pub visitor_phone: Option<String>,
    pub entered_at: Timestamp,
    pub guard_uuid: AccountUuid,
    pub gate_id: Option<String>,
    pub note: Option<String>,
}

/// Trim and bound-check an optional exit note.
pub(crate) fn exit_note(value: Option<String>) -> Result<Option<String>, ValidationError> {
    note(value)
}

/// Append `addition` to an existing note, separated by a pipe. Blank additions leave the note
/// unchanged.
pub(crate) fn append_note(existing: Option<&str>, addition: Option<&str>) -> Option<String> {
    let addition = addition.map(str::trim).filter(|value| !value.is_empty());
    let existing = existing.filter(|value| !value.trim().is_empty());

    match (existing, addition) {
        (Some(existing), Some(addition)) => Some(format!("{existing} | {addition}")),
        (Some(existing), None) => Some(existing.to_string()),
        (None, Some(addition)) => Some(addition.to_string()),
        (None, None) => None,
    }
}

fn visitor_name(value: String) -> Result<String, ValidationError> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::VisitorNameMissing);
    }

    if value.chars().count() > MAX_VISITOR_NAME_CHARS {
        return Err(ValidationError::VisitorNameTooLong {
            max: MAX_VISITOR_NAME_CHARS,
        });
    }

    Ok(value.to_string())
}

fn visitor_phone(value: Option<String>) -> Result<Option<String>, ValidationError> {
    optional_text(
        value,
        MAX_VISITOR_PHONE_CHARS,
        ValidationError::VisitorPhoneTooLong {
            max: MAX_VISITOR_PHONE_CHARS,
        },
    )
}

fn note(value: Option<String>) -> Result<Option<String>, ValidationError> {
    optional_text(
        value,
        MAX_NOTE_CHARS,
        ValidationError::NoteTooLong {
            max: MAX_NOTE_CHARS,
        },
    )
}

fn optional_text(
    value: Option<String>,
    max: usize,
    too_long: ValidationError,
) -> Result<Option<String>, ValidationError> {
    let Some(value) = value else {
        return Ok(None);
    };

    let value = value.trim();

    if value.is_empty() {
        return Ok(None);
    }

    if value.chars().count() > max {
        return Err(too_long);
    }

    Ok(Some(value.to_string()))
}
