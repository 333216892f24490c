//! Gatehouse domain and persistence: accounts, visitor tokens and gate entries.

pub mod context;
pub mod database;
pub mod domain;

#[cfg(test)]
mod test;

mod digest;
mod uuids;

pub use uuids::TypedUuid;
