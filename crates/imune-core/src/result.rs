//! Convenience result type alias for IMUNE+.

use crate::error::AppError;

/// A specialized `Result` type for IMUNE+ operations.
pub type AppResult<T> = Result<T, AppError>;
