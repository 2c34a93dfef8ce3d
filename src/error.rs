use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::engine::{DistributionError, EnrollmentError, PlacementError, UplineError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Internal server error: {0}")]
    Internal(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Conflict: {0}")]
    Conflict(String),
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<PlacementError> for AppError {
    fn from(err: PlacementError) -> Self {
        match err {
            PlacementError::ReferrerNotFound(_) => AppError::NotFound(err.to_string()),
            PlacementError::ReferrerInactive(_) | PlacementError::MemberExists(_) => {
                AppError::BadRequest(err.to_string())
            }
            PlacementError::PlacementConflict(_) => AppError::Conflict(err.to_string()),
            PlacementError::Db(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl From<DistributionError> for AppError {
    fn from(err: DistributionError) -> Self {
        match err {
            DistributionError::PackageNotFound(_) => AppError::NotFound(err.to_string()),
            DistributionError::LedgerOverflow(_) => AppError::BadRequest(err.to_string()),
            DistributionError::RecipientNotFound(_)
            | DistributionError::Upline(UplineError::ReferralCycle(_)) => {
                AppError::Internal(err.to_string())
            }
            DistributionError::Upline(UplineError::Db(e)) | DistributionError::Db(e) => {
                AppError::Internal(e.to_string())
            }
        }
    }
}

impl From<EnrollmentError> for AppError {
    fn from(err: EnrollmentError) -> Self {
        match err {
            EnrollmentError::MemberNotFound(_) | EnrollmentError::PackageNotFound(_) => {
                AppError::NotFound(err.to_string())
            }
            EnrollmentError::Placement(e) => e.into(),
            EnrollmentError::Distribution(e) => e.into(),
            EnrollmentError::Db(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Config(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MemberId;

    #[test]
    fn test_placement_error_mapping() {
        let err: AppError = PlacementError::ReferrerNotFound(MemberId::new("x")).into();
        assert!(matches!(err, AppError::NotFound(_)));

        let err: AppError = PlacementError::PlacementConflict(3).into();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn test_distribution_error_mapping() {
        let err: AppError = DistributionError::RecipientNotFound(MemberId::new("x")).into();
        assert!(matches!(err, AppError::Internal(_)));
    }
}
