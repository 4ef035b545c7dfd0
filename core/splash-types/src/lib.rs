//! Core type definitions for the Splash bridge.
//!
//! This crate defines the small set of types every other crate agrees on:
//! - [`ObjectId`] and [`IdCodec`], the composite identifiers exchanged with
//!   the sync engine (`user-42`, `user-billing-42`, ...)
//! - [`Settings`], the configuration values shared with the sync engine
//!
//! Field schemas live in `splash-model`, storage in `splash-storage`.

mod config;
mod ids;

pub use config::{FeatureFlags, Settings};
pub use ids::{IdCodec, IdError, ObjectId};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid identifier: {0}")]
    InvalidIdentifier(#[from] IdError),

    #[error("settings file error: {0}")]
    Io(#[from] std::io::Error),
}
