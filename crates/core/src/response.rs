//! The response envelope returned by every request.
//!
//! Record values travel as [`RawValue`] so that stored document bytes reach
//! the wire unmodified. Values that are not themselves JSON (index bucket
//! entries, for example) are wrapped as JSON strings.

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use crate::codes::Status;
use crate::error::RecErr;

/// Envelope for all request responses.
///
/// `recs` carries multi-record results, `rec` single-record results.
/// `next_key` is set when a scan stopped on a limit or range end with more
/// records remaining; chaining a follow-up request with
/// `start_key = next_key` resumes the scan.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub status: Status,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub msg: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recs: Vec<Box<RawValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rec: Option<Box<RawValue>>,
    /// Records added or replaced by a put; key count for `bkt count`.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub put_cnt: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub next_seq: Vec<u64>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub next_key: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errs: Vec<RecErr>,
}

fn is_zero(n: &u64) -> bool {
    *n == 0
}

impl Response {
    pub fn ok() -> Self {
        Response {
            status: Status::Ok,
            ..Response::default()
        }
    }

    pub fn fail(msg: impl Into<String>) -> Self {
        Response {
            status: Status::Fail,
            msg: msg.into(),
            ..Response::default()
        }
    }

    pub fn warning(msg: impl Into<String>) -> Self {
        Response {
            status: Status::Warning,
            msg: msg.into(),
            ..Response::default()
        }
    }

    /// Append one stored value to `recs`.
    ///
    /// Valid JSON passes through byte-identical; anything else (index bucket
    /// values, raw keys) is wrapped as a JSON string.
    pub fn push_value(&mut self, val: Vec<u8>) {
        self.recs.push(to_raw(val));
    }

    /// Append one key to `recs`, encoded as a JSON string.
    pub fn push_key(&mut self, key: &[u8]) {
        let s = String::from_utf8_lossy(key);
        // to_string on a str cannot fail
        let json = serde_json::to_string(s.as_ref()).unwrap_or_default();
        self.recs.push(RawValue::from_string(json).unwrap_or_default());
    }

    /// Set the single-record slot from stored bytes.
    pub fn set_rec(&mut self, val: Vec<u8>) {
        self.rec = Some(to_raw(val));
    }

    /// Final status for scan requests: soft errors demote `ok` to `warning`.
    pub fn finish_scan(&mut self) {
        if self.errs.is_empty() {
            self.status = Status::Ok;
        } else {
            self.status = Status::Warning;
            self.msg = "see resp.errs for details".into();
        }
    }
}

fn to_raw(val: Vec<u8>) -> Box<RawValue> {
    let text = match String::from_utf8(val) {
        Ok(s) => s,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    };
    if serde_json::from_str::<&RawValue>(&text).is_ok() {
        if let Ok(raw) = RawValue::from_string(text) {
            return raw;
        }
        return Box::<RawValue>::default();
    }
    // Not JSON: encode the text as a JSON string so the envelope stays
    // well-formed.
    let json = serde_json::to_string(&text).unwrap_or_else(|_| "\"\"".into());
    RawValue::from_string(json).unwrap_or_default()
}
