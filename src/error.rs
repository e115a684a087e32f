//! Error types for portfolio validation and input loading
//!
//! The projection and amortization core never fails; these errors only come from
//! the layers that build portfolios and registries from user or file input.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid asset {id}: {reason}")]
    InvalidAsset { id: String, reason: String },

    #[error("Invalid liability {id}: {reason}")]
    InvalidLiability { id: String, reason: String },

    #[error("Duplicate id in portfolio: {0}")]
    DuplicateId(String),

    #[error("No asset or liability with id {0}")]
    NotFound(String),

    #[error("Unknown asset type: {0}")]
    UnknownAssetType(String),

    #[error("Unknown liability type: {0}")]
    UnknownLiabilityType(String),

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("Malformed row {row}: {reason}")]
    MalformedRow { row: usize, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
