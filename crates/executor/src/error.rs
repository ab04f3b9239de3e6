//! Handler errors.
//!
//! Two tiers matter here. `BadInput` means the client's data was unusable
//! (unparseable record, missing key field, missing required field): it rolls
//! the transaction back like any other error, but dispatch folds it into a
//! normal `fail` envelope rather than a server error. Everything else
//! aborts the transaction and surfaces as a transaction-level failure.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Problem with the input data, not the database. Rolled back, but
    /// reported to the client as a normal `fail` response.
    #[error("bad input: {msg}")]
    BadInput { msg: String },

    /// Substrate failure; the transaction is rolled back.
    #[error(transparent)]
    Store(#[from] cask_engine::Error),
}

impl Error {
    pub fn bad_input(msg: impl Into<String>) -> Self {
        Error::BadInput { msg: msg.into() }
    }
}
