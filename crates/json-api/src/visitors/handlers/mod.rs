//! Visitor Handlers

pub(crate) mod active;
pub(crate) mod checkout;
pub(crate) mod exit;
pub(crate) mod grant;
pub(crate) mod index;
pub(crate) mod issue;
pub(crate) mod show;
pub(crate) mod verify;
