//! Visitor Errors

use salvo::http::StatusError;
use tracing::error;

use gatehouse_app::domain::visitors::VisitorsServiceError;

pub(crate) fn into_status_error(error: VisitorsServiceError) -> StatusError {
    match error {
        VisitorsServiceError::Validation(source) => {
            StatusError::bad_request().brief(source.to_string())
        }
        VisitorsServiceError::InvalidReference | VisitorsServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid visitor payload")
        }
        VisitorsServiceError::NotFound => {
            StatusError::not_found().brief("Visitor token or entry not found")
        }
        VisitorsServiceError::Expired { expired_at } => {
            StatusError::gone().brief(format!("Visitor token expired at {expired_at}"))
        }
        VisitorsServiceError::AlreadyUsed => {
            StatusError::conflict().brief("Visitor token has already been used")
        }
        VisitorsServiceError::AlreadyExited { exited_at } => {
            StatusError::conflict().brief(format!("Visitor already exited at {exited_at}"))
        }
        VisitorsServiceError::NoActiveEntry => {
            StatusError::conflict().brief("Visitor token has no active entry")
        }
        VisitorsServiceError::Generation { attempts } => {
            error!(attempts, "could not generate a unique visitor token");

            StatusError::internal_server_error()
        }
        VisitorsServiceError::Sql(source) => {
            error!("visitor storage error: {source}");

            StatusError::internal_server_error()
        }
    }
}

/// Metric label for a failed gate operation.
pub(crate) const fn outcome(error: &VisitorsServiceError) -> &'static str {
    match error {
        VisitorsServiceError::Validation(_)
        | VisitorsServiceError::InvalidReference
        | VisitorsServiceError::InvalidData => "invalid",
        VisitorsServiceError::NotFound => "not_found",
        VisitorsServiceError::Expired { .. } => "expired",
        VisitorsServiceError::AlreadyUsed => "already_used",
        VisitorsServiceError::AlreadyExited { .. } => "already_exited",
        VisitorsServiceError::NoActiveEntry => "no_active_entry",
        VisitorsServiceError::Generation { .. } | VisitorsServiceError::Sql(_) => "error",
    }
}
