//! Experimental handlers: GetValues, SearchKeys.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use cask_core::{DefaultPolicy, Rec, Response, Status, StrOption};
use cask_engine::{ReadLoop, ReadTx, Step};

use crate::error::Error;
use crate::handlers::bkt_not_found;
use crate::request::{GetValuesRequest, SearchKeysRequest};

/// One GetValues result row.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecValues {
    key: String,
    fld_vals: BTreeMap<String, String>,
}

/// Extract specific field values instead of whole records.
///
/// Field specs are `name` or `name|type` with type in
/// {string, int, float, bool}; every value is rendered as a string. A
/// missing field yields the sentinel `fld not in rec-<name>`.
pub fn get_values(tx: &ReadTx, req: &GetValuesRequest) -> Result<Response, Error> {
    let mut resp = Response::ok();
    let Some(bkt) = tx.bucket(&req.bkt_name)? else {
        return Ok(bkt_not_found(&req.bkt_name));
    };

    for key in &req.keys {
        let Some(v) = bkt.get(key.as_bytes())? else {
            debug!(target: "cask::handlers", bkt = %req.bkt_name, %key, "getvalues key not found");
            resp.status = Status::Warning;
            resp.msg = "not found".into();
            continue;
        };
        let parsed: Value = serde_json::from_slice(&v).unwrap_or(Value::Null);
        let rec = Rec::new(&parsed);

        let mut fld_vals = BTreeMap::new();
        for fld in &req.fields {
            let (fld_name, fld_type) = match fld.split_once('|') {
                Some((name, ty)) => (name, ty),
                None => (fld.as_str(), "string"),
            };
            if !rec.exists(fld_name) {
                fld_vals.insert(fld_name.to_string(), format!("fld not in rec-{fld_name}"));
                continue;
            }
            let fld_val = match fld_type {
                "string" => rec
                    .get_str(fld_name, DefaultPolicy::Always, StrOption::AsIs)
                    .unwrap_or_default(),
                "int" => rec
                    .get_int(fld_name, DefaultPolicy::Always)
                    .unwrap_or_default()
                    .to_string(),
                "float" => parsed
                    .get(fld_name)
                    .and_then(Value::as_f64)
                    .unwrap_or_default()
                    .to_string(),
                "bool" => parsed
                    .get(fld_name)
                    .and_then(Value::as_bool)
                    .unwrap_or_default()
                    .to_string(),
                other => {
                    warn!(target: "cask::handlers", fld_type = other, "getvalues invalid field type");
                    String::new()
                }
            };
            fld_vals.insert(fld_name.to_string(), fld_val);
        }
        let row = RecValues {
            key: key.clone(),
            fld_vals,
        };
        match serde_json::to_vec(&row) {
            Ok(bytes) => resp.push_value(bytes),
            Err(e) => {
                warn!(target: "cask::handlers", error = %e, "getvalues marshal failed");
                return Ok(Response::fail("marshal of result row failed"));
            }
        }
    }
    Ok(resp)
}

/// Scan a key range returning values whose key contains `search_value`.
/// Against an index bucket the returned values are the indexed data keys.
pub fn search_keys(tx: &ReadTx, req: &SearchKeysRequest) -> Result<Response, Error> {
    let mut resp = Response::ok();
    let Some(bkt) = tx.bucket(&req.bkt_name)? else {
        return Ok(bkt_not_found(&req.bkt_name));
    };
    let mut rl = ReadLoop::new(&bkt, None);
    let mut step = rl.start(&req.start_key, &req.end_key, req.limit)?;
    loop {
        match step {
            Step::Done => break,
            Step::Soft(e) => resp.errs.push(e),
            Step::Entry(k, v) => {
                if String::from_utf8_lossy(&k).contains(&req.search_value) {
                    resp.push_value(v);
                    rl.count += 1;
                }
            }
        }
        step = rl.next()?;
    }
    Ok(resp)
}
