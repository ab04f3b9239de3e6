//! Request types, one per operation, plus the tagged [`Request`] enum the
//! server dispatches on.
//!
//! Each variant is self-contained: all parameters needed for execution are
//! in the request struct, which deserializes directly from the HTTP body.
//! `is_write` decides which transaction kind dispatch acquires;
//! `execute_read` / `execute_write` route to the handler.

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use cask_core::{FindCondition, IndexKeyVal, Join, Response, SortKey};
use cask_engine::{ReadTx, WriteTx};

use crate::config::RuntimeConfig;
use crate::error::Error;
use crate::handlers;

/// Get specific records by key, in the requested order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GetRequest {
    pub bkt_name: String,
    pub keys: Vec<String>,
}

/// Get a single record by key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GetOneRequest {
    pub bkt_name: String,
    pub key: String,
}

/// Range scan. With `index_bkt` set, start/end refer to index keys and each
/// index value is dereferenced into the data bucket.
///
/// If `start_key == end_key` (non-empty), record keys must begin with
/// `start_key`. `next_key` is set in the response when the scan stopped on
/// the limit or range end with records remaining.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GetAllRequest {
    pub bkt_name: String,
    pub index_bkt: String,
    pub start_key: String,
    pub end_key: String,
    pub limit: usize,
    /// Soft error budget; -1 selects the server-wide maximum.
    pub err_limit: i64,
}

/// Same range semantics as [`GetAllRequest`] but only keys are returned.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GetAllKeysRequest {
    pub bkt_name: String,
    pub start_key: String,
    pub end_key: String,
    pub limit: usize,
}

/// Filter and sort records.
///
/// A record is kept iff it meets every condition in `find_conditions`, or
/// (when that fails) every condition in a non-empty `find_or_conditions`.
/// `limit` bounds the matched set before the sort; `top` truncates after.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QryRequest {
    pub bkt_name: String,
    /// Optional index; start/end keys then refer to index keys.
    pub index_bkt: String,
    pub find_conditions: Vec<FindCondition>,
    pub find_or_conditions: Vec<FindCondition>,
    /// Omitted: results come back in key (or index key) order.
    pub sort_keys: Vec<SortKey>,
    pub start_key: String,
    pub end_key: String,
    pub limit: usize,
    pub top: usize,
    /// Soft error budget; -1 selects the server-wide maximum.
    pub err_limit: i64,
    /// Joined values usable in find conditions (costs work per scanned
    /// record).
    pub joins_before_find: Vec<Join>,
    /// Joined values usable in sort keys only.
    pub joins_after_find: Vec<Join>,
}

/// Add or replace records. The value of `key_field` in each record becomes
/// the bucket key and must be a string.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PutRequest {
    pub bkt_name: String,
    pub key_field: String,
    pub recs: Vec<Box<RawValue>>,
    #[serde(default)]
    pub required_flds: Vec<String>,
}

/// Add or replace a single record, optionally audit-logged to
/// `<bkt_name>_log` under `<key>|<yyyy-mm-dd hh:mm:ss>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PutOneRequest {
    pub bkt_name: String,
    pub key_field: String,
    pub rec: Box<RawValue>,
    #[serde(default)]
    pub required_flds: Vec<String>,
    #[serde(default)]
    pub log_put: bool,
}

/// Add or replace records in two buckets inside one transaction; a failure
/// in either batch rolls back both.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PutBktsRequest {
    pub bkt_name: String,
    pub key_field: String,
    pub recs: Vec<Box<RawValue>>,
    #[serde(default)]
    pub required_flds: Vec<String>,
    pub bkt2_name: String,
    #[serde(default)]
    pub recs2: Vec<Box<RawValue>>,
    #[serde(default)]
    pub required_flds2: Vec<String>,
}

/// Add or replace index bucket entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PutIndexRequest {
    pub bkt_name: String,
    pub indexes: Vec<IndexKeyVal>,
}

/// Delete records by key. Missing keys are silent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeleteRequest {
    pub bkt_name: String,
    pub keys: Vec<String>,
}

/// Bucket maintenance: "create", "delete", "nextseq", "list", "count".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BktRequest {
    pub bkt_name: String,
    pub operation: String,
    /// For "nextseq": how many numbers to issue (clamped to 1..=100).
    pub next_seq_count: usize,
}

/// Write a key range as a pretty-printed JSON array to a server-side file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportRequest {
    pub bkt_name: String,
    pub start_key: String,
    pub end_key: String,
    pub limit: usize,
    pub file_path: String,
}

/// Copy the whole database to another file. Readers and writers are not
/// blocked.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CopyDbRequest {
    pub file_path: String,
}

/// Extract specific field values instead of whole records. Each field spec
/// is `name` or `name|type` with type in {string, int, float, bool}.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GetValuesRequest {
    pub bkt_name: String,
    pub keys: Vec<String>,
    pub fields: Vec<String>,
}

/// Scan a key range returning values whose key contains `search_value`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchKeysRequest {
    pub bkt_name: String,
    pub search_value: String,
    pub start_key: String,
    pub end_key: String,
    pub limit: usize,
}

/// Every operation the server executes, one variant per route.
#[derive(Debug, Clone)]
pub enum Request {
    Get(GetRequest),
    GetOne(GetOneRequest),
    GetAll(GetAllRequest),
    GetAllKeys(GetAllKeysRequest),
    Qry(QryRequest),
    Put(PutRequest),
    PutOne(PutOneRequest),
    PutBkts(PutBktsRequest),
    PutIndex(PutIndexRequest),
    Delete(DeleteRequest),
    Bkt(BktRequest),
    Export(ExportRequest),
    CopyDb(CopyDbRequest),
    GetValues(GetValuesRequest),
    SearchKeys(SearchKeysRequest),
}

impl Request {
    /// Operation name, as it appears in the URL path and trace output.
    pub fn name(&self) -> &'static str {
        match self {
            Request::Get(_) => "get",
            Request::GetOne(_) => "getone",
            Request::GetAll(_) => "getall",
            Request::GetAllKeys(_) => "getallkeys",
            Request::Qry(_) => "qry",
            Request::Put(_) => "put",
            Request::PutOne(_) => "putone",
            Request::PutBkts(_) => "putbkts",
            Request::PutIndex(_) => "putindex",
            Request::Delete(_) => "delete",
            Request::Bkt(_) => "bkt",
            Request::Export(_) => "export",
            Request::CopyDb(_) => "copydb",
            Request::GetValues(_) => "getvalues",
            Request::SearchKeys(_) => "searchkeys",
        }
    }

    /// True for operations that need the write transaction.
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            Request::Put(_)
                | Request::PutOne(_)
                | Request::PutBkts(_)
                | Request::PutIndex(_)
                | Request::Delete(_)
                | Request::Bkt(_)
        )
    }

    /// Execute a read operation. Calling this with a write variant is a
    /// dispatch bug and reported as a failed response.
    pub fn execute_read(&self, tx: &ReadTx, cfg: &RuntimeConfig) -> Result<Response, Error> {
        match self {
            Request::Get(req) => handlers::get::get(tx, req),
            Request::GetOne(req) => handlers::get::get_one(tx, req),
            Request::GetAll(req) => handlers::get::get_all(tx, cfg, req),
            Request::GetAllKeys(req) => handlers::get::get_all_keys(tx, req),
            Request::Qry(req) => handlers::qry::qry(tx, cfg, req),
            Request::Export(req) => handlers::misc::export(tx, req),
            Request::CopyDb(req) => handlers::misc::copy_db(tx, req),
            Request::GetValues(req) => handlers::experimental::get_values(tx, req),
            Request::SearchKeys(req) => handlers::experimental::search_keys(tx, req),
            _ => Ok(Response::fail("write request routed to read transaction")),
        }
    }

    /// Execute a write operation. Calling this with a read variant is a
    /// dispatch bug and reported as a failed response.
    pub fn execute_write(&self, tx: &WriteTx, _cfg: &RuntimeConfig) -> Result<Response, Error> {
        match self {
            Request::Put(req) => handlers::put::put(tx, req),
            Request::PutOne(req) => handlers::put::put_one(tx, req),
            Request::PutBkts(req) => handlers::put::put_bkts(tx, req),
            Request::PutIndex(req) => handlers::put::put_index(tx, req),
            Request::Delete(req) => handlers::misc::delete(tx, req),
            Request::Bkt(req) => handlers::misc::bkt(tx, req),
            _ => Ok(Response::fail("read request routed to write transaction")),
        }
    }
}
