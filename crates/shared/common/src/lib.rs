//! Common utilities shared by the booking service and the gateway.
//!
//! This crate provides:
//! - Unified error handling and the HTTP status mapping
//! - Configuration structures

pub mod config;
pub mod error;

pub use config::*;
pub use error::{AppError, AppResult, ErrorKind, OptionExt};
