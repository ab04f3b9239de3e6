//! Request handlers, grouped the way the routes are.

pub mod experimental;
pub mod get;
pub mod misc;
pub mod put;
pub mod qry;

use cask_core::Response;
use tracing::warn;

/// Failed-to-open-bucket response shared by every handler.
pub(crate) fn bkt_not_found(name: &str) -> Response {
    warn!(target: "cask::handlers", bkt = name, "open bkt failed");
    Response::fail(format!("open bkt failed - {name}"))
}
