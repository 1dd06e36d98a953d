//! HTTP-facing error type
//!
//! Every failure leaves the server as an [`ErrorResponse`] envelope. Contract
//! failures are logged together with the operation that triggered them.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use thiserror::Error;
use tracing::{error, warn};

use crate::bridge::ContractError;
use crate::dto::ErrorResponse;

/// Errors returned by API handlers
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request failed validation
    #[error("{0}")]
    BadRequest(String),

    /// Bridge transfer requested but no signer is loaded
    #[error("Admin wallet not configured")]
    WalletNotConfigured,

    /// Admin route requested but no signer is loaded
    #[error("Admin access not configured")]
    AdminNotConfigured,

    /// The contract call failed
    #[error("error during {operation}: {source}")]
    Contract {
        operation: &'static str,
        #[source]
        source: ContractError,
    },

    /// Metrics encoding or other local failure
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    /// Adapter for `map_err` on contract calls
    pub fn contract(operation: &'static str) -> impl Fn(ContractError) -> ApiError {
        move |source| ApiError::Contract { operation, source }
    }

    /// HTTP status, client-facing message and optional details
    pub fn parts(&self) -> (StatusCode, String, Option<String>) {
        match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message.clone(), None),
            ApiError::WalletNotConfigured => (StatusCode::BAD_REQUEST, self.to_string(), None),
            ApiError::AdminNotConfigured => (StatusCode::UNAUTHORIZED, self.to_string(), None),
            ApiError::Contract { source, .. } => {
                let details = Some(source.details());
                match source {
                    ContractError::Reverted { reason, .. } => (
                        StatusCode::BAD_REQUEST,
                        format!("Contract call failed: {}", reason),
                        details,
                    ),
                    ContractError::InsufficientFunds(_) => (
                        StatusCode::BAD_REQUEST,
                        "Insufficient funds for transaction".to_string(),
                        details,
                    ),
                    ContractError::GasEstimation(_) => (
                        StatusCode::BAD_REQUEST,
                        "Transaction would fail - check parameters".to_string(),
                        details,
                    ),
                    ContractError::SignerUnavailable => (
                        StatusCode::BAD_REQUEST,
                        "Admin wallet not configured".to_string(),
                        None,
                    ),
                    ContractError::Rpc(_) => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal server error".to_string(),
                        details,
                    ),
                }
            }
            ApiError::Internal(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
                Some(message.clone()),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Contract { operation, source } => {
                error!(operation = *operation, error = %source, "Contract call failed");
            }
            ApiError::Internal(message) => {
                error!(error = %message, "Internal error");
            }
            _ => {
                warn!(error = %self, "Rejected request");
            }
        }

        let (status, message, details) = self.parts();
        let body = ErrorResponse {
            success: false,
            error: message,
            details,
        };
        (status, Json(body)).into_response()
    }
}
