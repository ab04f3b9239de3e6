//! Single entry point for request execution.
//!
//! Acquires the right transaction kind, runs the handler, and folds
//! `BadInput` into a normal `fail` envelope: the update closure returned an
//! error to force rollback, but the client sees a 200-class response, not a
//! server error.

use cask_core::trace::trace;
use cask_core::Response;
use cask_engine::Store;
use tracing::warn;

use crate::config::RuntimeConfig;
use crate::error::Error;
use crate::request::Request;

/// Execute one request against the store.
///
/// `Err` here means a transaction-level failure that rolled back (HTTP 500
/// territory); every data-level outcome, including `BadInput`, comes back
/// as `Ok` with the envelope status set.
pub fn execute(store: &Store, cfg: &RuntimeConfig, req: &Request) -> Result<Response, Error> {
    trace(&format!("{} == request started ==", req.name()));

    let result = if req.is_write() {
        store.update(|tx| req.execute_write(tx, cfg))
    } else {
        store.view(|tx| req.execute_read(tx, cfg))
    };

    let out = match result {
        Ok(resp) => Ok(resp),
        Err(Error::BadInput { msg }) => {
            warn!(target: "cask::dispatch", op = req.name(), %msg, "bad input, transaction rolled back");
            Ok(Response::fail(msg))
        }
        Err(e) => {
            warn!(target: "cask::dispatch", op = req.name(), error = %e, "transaction rolled back");
            Err(e)
        }
    };

    trace(&format!("{} == request complete ==", req.name()));
    out
}
