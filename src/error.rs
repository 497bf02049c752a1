// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::ErrorCode;
use thiserror::Error;

pub type LedgerResult<T> = std::result::Result<T, LedgerError>;

#[derive(Debug, Error)]
pub enum LedgerError {
    /// Rejected input. Always raised before anything is written.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// The store was unreachable (busy, locked or could not be opened).
    #[error("storage temporarily unavailable: {0}")]
    TransientStorage(#[source] rusqlite::Error),

    #[error("storage error: {0}")]
    Storage(#[source] rusqlite::Error),
}

impl LedgerError {
    pub fn validation(msg: impl Into<String>) -> Self {
        LedgerError::Validation(msg.into())
    }

    pub fn not_found(entity: &'static str, id: i64) -> Self {
        LedgerError::NotFound { entity, id }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, LedgerError::TransientStorage(_))
    }

    /// Status an HTTP front end should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            LedgerError::Validation(_) => 400,
            LedgerError::NotFound { .. } => 404,
            LedgerError::TransientStorage(_) => 503,
            LedgerError::Storage(_) => 500,
        }
    }
}

impl From<rusqlite::Error> for LedgerError {
    fn from(err: rusqlite::Error) -> Self {
        if is_disconnect(&err) {
            LedgerError::TransientStorage(err)
        } else {
            LedgerError::Storage(err)
        }
    }
}

fn is_disconnect(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(e, _) => matches!(
            e.code,
            ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked | ErrorCode::CannotOpen
        ),
        _ => false,
    }
}
