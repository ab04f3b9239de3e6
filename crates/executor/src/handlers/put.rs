//! Write handlers: Put, PutOne, PutBkts, PutIndex.
//!
//! The key-field contract is enforced here, at put time: every record must
//! carry the designated key field as a string, and the bucket key is exactly
//! that string's UTF-8 bytes. Violations return `BadInput`, which rolls the
//! transaction back but reaches the client as a normal `fail` response.

use serde_json::value::RawValue;
use serde_json::Value;
use tracing::warn;

use cask_core::Response;
use cask_engine::{WriteBucket, WriteTx};

use crate::error::Error;
use crate::request::{PutBktsRequest, PutIndexRequest, PutOneRequest, PutRequest};

/// Add or replace one record. The value of `key_field` becomes the bucket
/// key; declared required fields must be present (null counts as present).
fn put_rec(
    bkt: &mut WriteBucket<'_>,
    rec: &RawValue,
    key_field: &str,
    required_flds: &[String],
) -> Result<(), Error> {
    let parsed: Value = serde_json::from_str(rec.get()).map_err(|e| {
        warn!(target: "cask::handlers", error = %e, "put rec is not valid json");
        Error::bad_input("rec is not valid json")
    })?;
    let Some(key) = parsed.get(key_field).and_then(Value::as_str) else {
        warn!(target: "cask::handlers", key_field, "put key value not found or not a string");
        return Err(Error::bad_input(format!(
            "key fld value missing or not a string - {key_field}"
        )));
    };
    for fld in required_flds {
        if parsed.get(fld).is_none() {
            warn!(target: "cask::handlers", %fld, "put required fld not in rec");
            return Err(Error::bad_input(format!("required fld not in rec - {fld}")));
        }
    }
    bkt.put(key.as_bytes(), rec.get().as_bytes())?;
    Ok(())
}

/// Add or replace records. The bucket is created if absent.
pub fn put(tx: &WriteTx, req: &PutRequest) -> Result<Response, Error> {
    if req.key_field.is_empty() {
        return Ok(Response::fail("keyField cannot be blank"));
    }
    let mut resp = Response::ok();
    let Some(mut bkt) = tx.bucket(&req.bkt_name, true)? else {
        return Ok(Response::fail(format!("open bkt failed - {}", req.bkt_name)));
    };
    for rec in &req.recs {
        put_rec(&mut bkt, rec, &req.key_field, &req.required_flds)?;
        resp.put_cnt += 1;
    }
    Ok(resp)
}

/// Add or replace a single record; with `log_put` an audit copy lands in
/// `<bkt>_log` keyed `<data-key>|<yyyy-mm-dd hh:mm:ss>` (UTC wall clock).
pub fn put_one(tx: &WriteTx, req: &PutOneRequest) -> Result<Response, Error> {
    if req.key_field.is_empty() {
        return Ok(Response::fail("keyField cannot be blank"));
    }
    let mut resp = Response::ok();
    {
        let Some(mut bkt) = tx.bucket(&req.bkt_name, true)? else {
            return Ok(Response::fail(format!("open bkt failed - {}", req.bkt_name)));
        };
        put_rec(&mut bkt, &req.rec, &req.key_field, &req.required_flds)?;
    }
    if req.log_put {
        let log_name = format!("{}_log", req.bkt_name);
        let Some(mut log_bkt) = tx.bucket(&log_name, true)? else {
            return Ok(Response::fail(format!("open bkt failed - {log_name}")));
        };
        let parsed: Value = serde_json::from_str(req.rec.get())
            .map_err(|_| Error::bad_input("rec is not valid json"))?;
        let key = parsed
            .get(&req.key_field)
            .and_then(Value::as_str)
            .unwrap_or_default();
        let stamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S");
        let log_key = format!("{key}|{stamp}");
        log_bkt.put(log_key.as_bytes(), req.rec.get().as_bytes())?;
    }
    resp.put_cnt = 1;
    Ok(resp)
}

/// Add or replace records in two buckets within one transaction. Any
/// failure rolls back both batches.
pub fn put_bkts(tx: &WriteTx, req: &PutBktsRequest) -> Result<Response, Error> {
    if req.key_field.is_empty() {
        return Ok(Response::fail("keyField cannot be blank"));
    }
    let mut resp = Response::ok();
    // Bucket handles are scoped one at a time; the substrate allows a single
    // live handle per bucket within a write transaction.
    {
        let Some(mut bkt) = tx.bucket(&req.bkt_name, true)? else {
            return Ok(Response::fail(format!("open bkt failed - {}", req.bkt_name)));
        };
        for rec in &req.recs {
            put_rec(&mut bkt, rec, &req.key_field, &req.required_flds)?;
            resp.put_cnt += 1;
        }
    }
    {
        let Some(mut bkt2) = tx.bucket(&req.bkt2_name, true)? else {
            return Ok(Response::fail(format!("open bkt failed - {}", req.bkt2_name)));
        };
        for rec in &req.recs2 {
            put_rec(&mut bkt2, rec, &req.key_field, &req.required_flds2)?;
            resp.put_cnt += 1;
        }
    }
    Ok(resp)
}

/// Add or replace index entries. A non-empty `old_key` is deleted first
/// (missing is fine); duplicate keys overwrite.
pub fn put_index(tx: &WriteTx, req: &PutIndexRequest) -> Result<Response, Error> {
    let mut resp = Response::ok();
    let Some(mut bkt) = tx.bucket(&req.bkt_name, true)? else {
        return Ok(Response::fail(format!("open bkt failed - {}", req.bkt_name)));
    };
    for index in &req.indexes {
        if !index.old_key.is_empty() {
            bkt.delete(index.old_key.as_bytes())?;
        }
        bkt.put(index.key.as_bytes(), index.val.as_bytes())?;
        resp.put_cnt += 1;
    }
    Ok(resp)
}
