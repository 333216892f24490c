//! Visitor tokens and gate entries.
//!
//! A resident issues a single-use token for a guest; a guard verifies it at the gate, grants
//! entry (consuming the token) and later records the exit.

pub mod data;
pub mod errors;
pub mod records;
mod repositories;
pub mod secret;
pub mod service;
pub mod state;

pub use errors::{ValidationError, VisitorsServiceError};
pub use service::*;
pub use state::TokenState;
