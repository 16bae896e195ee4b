// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

/// Failures surfaced by the ledger core.
///
/// `Validation` and `Reference` are rejected before any balance mutation, so
/// callers may correct the input and retry the whole call. `Persistence`
/// means the storage commit failed; the atomicity guarantee ensures nothing
/// was mutated, so retrying the call is safe.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("unresolved reference: {0}")]
    Reference(String),
    #[error("persistence failure: {0}")]
    Persistence(#[from] rusqlite::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
