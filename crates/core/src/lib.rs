//! Error type, validated text and caller identity used by every Frequencia crate.

#![forbid(unsafe_code)]

/// Caller identity handed over by the session layer.
pub mod auth;
mod error;
mod text;

pub use auth::{Actor, UserId};
pub use error::{AppError, AppResult};
pub use text::NonEmptyString;
