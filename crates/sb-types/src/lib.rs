//! Shared types and error types for SalesBridge

pub mod access_token;
pub mod errors;

pub use access_token::AccessToken;
pub use errors::{AppError, AppResult};
