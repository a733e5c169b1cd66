//! Request and response types shared by handlers

mod error;
mod json;

pub use error::{ApiError, ApiErrorDetail, ApiErrorResponse, ApiErrorType};
pub use json::{Json, JsonRejection};
