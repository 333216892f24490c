//! Visitor token and gate entry endpoints.

mod errors;
pub(crate) mod handlers;
mod responses;
