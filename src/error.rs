use std::path::PathBuf;
use thiserror::Error;
use crate::rules::Field;

/// A rejected configuration change; the configuration is left untouched
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("unknown configuration field '{0}'")]
    UnknownField(String),

    #[error("cannot set '{field}' to '{raw}' because it is not an integer")]
    NotAnInteger { field: Field, raw: String },

    #[error("cannot set '{field}' to a negative number")]
    Negative { field: Field, value: i64 },

    #[error("cannot set '{field}' to '{value}' because it's not a legitimate party size")]
    NotAPartySize { field: Field, value: i64 },

    #[error("cannot allow fewer swap-ins while swap-ins are not randomized")]
    FewerSwapInsWithoutSwapIns,

    #[error("cannot set 'min' to {min}, which is greater than 'max' ({max})")]
    MinAboveMax { min: u8, max: u8 },

    #[error("cannot set 'max' to {max}, which is lower than 'min' ({min})")]
    MaxBelowMin { min: u8, max: u8 },

    #[error("{what} {value} is outside 1..={limit}")]
    SlotOutOfRange { what: &'static str, value: u32, limit: u32 },
}

/// Swap picking could not run at all
#[derive(Error, Debug)]
pub enum PickError {
    #[error("randomness source unavailable: {0}")]
    Entropy(#[from] rand::Error),
}

/// Saved configurations could not be read or written
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("saved configurations are corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("saved configuration '{name}' is invalid: {source}")]
    InvalidRecord {
        name: String,
        #[source]
        source: ValidationError,
    },
}
