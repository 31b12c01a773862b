//! Binary-boundary error type.
//!
//! Library modules return their own `thiserror` enums; everything that reaches
//! `main` is folded into an `AppError` carrying the process exit code:
//!
//! - `2` usage / bad input
//! - `3` quota exhausted or failed authentication
//! - `4` storage or terminal failure

use crate::app::pipeline::AuthError;
use crate::domain::RejectReason;
use crate::store::StoreError;

pub const EXIT_USAGE: u8 = 2;
pub const EXIT_REJECTED: u8 = 3;
pub const EXIT_RUNTIME: u8 = 4;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, message)
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        Self::new(EXIT_RUNTIME, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::runtime(err.to_string())
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Store(inner) => inner.into(),
            other => AppError::new(EXIT_REJECTED, other.to_string()),
        }
    }
}

impl From<RejectReason> for AppError {
    fn from(reason: RejectReason) -> Self {
        match reason {
            RejectReason::QuotaExceeded => AppError::new(EXIT_REJECTED, reason.to_string()),
            RejectReason::UnknownCategory { .. }
            | RejectReason::UnknownDirection { .. }
            | RejectReason::InvalidValue => AppError::usage(reason.to_string()),
            RejectReason::PersistenceFailure(_) => AppError::runtime(reason.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_rejection_maps_to_rejected_exit_code() {
        let err: AppError = RejectReason::QuotaExceeded.into();
        assert_eq!(err.exit_code(), EXIT_REJECTED);
        assert!(err.to_string().contains("sign up or log in"));
    }

    #[test]
    fn bad_input_rejections_are_usage_errors() {
        let unknown: AppError = RejectReason::UnknownCategory {
            category: "Bogus".to_string(),
        }
        .into();
        assert_eq!(unknown.exit_code(), EXIT_USAGE);
        assert!(unknown.to_string().contains("Bogus"));

        let nan: AppError = RejectReason::InvalidValue.into();
        assert_eq!(nan.exit_code(), EXIT_USAGE);
    }

    #[test]
    fn persistence_failure_is_a_runtime_error() {
        let err: AppError = RejectReason::PersistenceFailure("disk full".to_string()).into();
        assert_eq!(err.exit_code(), EXIT_RUNTIME);
        assert!(err.to_string().contains("disk full"));
    }
}
