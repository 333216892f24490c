//! Gatehouse Domain Concerns

pub mod accounts;
pub mod visitors;
