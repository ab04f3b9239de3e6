//! HTTP server shell for the cask record store.
//!
//! The binary in `main.rs` wires settings, logging, and the store together;
//! everything testable lives here.

pub mod compress;
pub mod routes;
pub mod settings;
pub mod state;
