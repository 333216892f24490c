//! Accounts

pub mod credentials;
pub mod data;
pub mod errors;
pub mod records;
mod repository;
pub mod service;

pub use errors::AccountsServiceError;
pub use service::*;
