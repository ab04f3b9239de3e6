//! Soft per-record errors.
//!
//! A `RecErr` describes a problem with one record encountered during a scan:
//! an unparseable document, a dangling index reference, a field access that
//! violated its default policy, or a failed join. Soft errors are collected
//! into the response envelope and counted against the request's error
//! budget; they never roll back a transaction.

use serde::{Deserialize, Serialize};

use crate::codes::ErrCode;

/// One soft error, attached to the record that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecErr {
    /// Frozen error code.
    pub code: ErrCode,
    /// Human-readable detail.
    pub msg: String,
    /// Record key, when known. Lossily decoded for the envelope.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub key: String,
    /// Record value, when known. Lossily decoded for the envelope.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub val: String,
}

impl RecErr {
    pub fn new(code: ErrCode, msg: impl Into<String>) -> Self {
        RecErr {
            code,
            msg: msg.into(),
            key: String::new(),
            val: String::new(),
        }
    }

    /// Attach the offending record's key/value bytes.
    pub fn at(mut self, key: &[u8], val: &[u8]) -> Self {
        self.key = String::from_utf8_lossy(key).into_owned();
        self.val = String::from_utf8_lossy(val).into_owned();
        self
    }
}

impl std::fmt::Display for RecErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.msg)
    }
}
