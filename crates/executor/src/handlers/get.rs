//! Read handlers: Get, GetOne, GetAll, GetAllKeys.

use cask_core::{Response, Status};
use cask_engine::{ReadLoop, ReadTx, Step};
use tracing::debug;

use crate::config::RuntimeConfig;
use crate::error::Error;
use crate::handlers::bkt_not_found;
use crate::request::{GetAllKeysRequest, GetAllRequest, GetOneRequest, GetRequest};

/// Get specific records by key, in the requested order. Missing keys demote
/// the status to warning; found records are still returned.
pub fn get(tx: &ReadTx, req: &GetRequest) -> Result<Response, Error> {
    let mut resp = Response::ok();
    let Some(bkt) = tx.bucket(&req.bkt_name)? else {
        return Ok(bkt_not_found(&req.bkt_name));
    };
    for key in &req.keys {
        match bkt.get(key.as_bytes())? {
            Some(v) => resp.push_value(v),
            None => {
                debug!(target: "cask::handlers", %key, "get key not found");
                resp.status = Status::Warning;
                resp.msg = format!("not found, key: {key}");
            }
        }
    }
    Ok(resp)
}

/// Get one record by key. Missing is a `fail` with "not found".
pub fn get_one(tx: &ReadTx, req: &GetOneRequest) -> Result<Response, Error> {
    let Some(bkt) = tx.bucket(&req.bkt_name)? else {
        return Ok(bkt_not_found(&req.bkt_name));
    };
    match bkt.get(req.key.as_bytes())? {
        Some(v) => {
            let mut resp = Response::ok();
            resp.set_rec(v);
            Ok(resp)
        }
        None => {
            debug!(target: "cask::handlers", key = %req.key, "getone key not found");
            Ok(Response::fail("not found"))
        }
    }
}

/// Range scan, optionally driven by an index bucket. Soft errors (dangling
/// index references) accumulate against the request's error budget.
pub fn get_all(tx: &ReadTx, cfg: &RuntimeConfig, req: &GetAllRequest) -> Result<Response, Error> {
    let mut resp = Response::default();
    let Some(data) = tx.bucket(&req.bkt_name)? else {
        return Ok(bkt_not_found(&req.bkt_name));
    };
    let index = match req.index_bkt.as_str() {
        "" => None,
        name => match tx.bucket(name)? {
            Some(b) => Some(b),
            None => return Ok(bkt_not_found(name)),
        },
    };
    let err_limit = cfg.err_limit(req.err_limit);

    let mut rl = ReadLoop::new(&data, index.as_ref());
    let mut step = rl.start(&req.start_key, &req.end_key, req.limit)?;
    loop {
        if resp.errs.len() > err_limit {
            resp.status = Status::Fail;
            resp.msg = "too many errors, see resp.errs for details".into();
            return Ok(resp);
        }
        match step {
            Step::Done => break,
            Step::Soft(e) => resp.errs.push(e),
            Step::Entry(_, v) => {
                resp.push_value(v);
                rl.count += 1;
            }
        }
        step = rl.next()?;
    }
    if let Some(k) = rl.next_key() {
        resp.next_key = k.to_string();
    }
    resp.finish_scan();
    Ok(resp)
}

/// Range scan returning keys only, as JSON strings.
pub fn get_all_keys(tx: &ReadTx, req: &GetAllKeysRequest) -> Result<Response, Error> {
    let mut resp = Response::default();
    let Some(bkt) = tx.bucket(&req.bkt_name)? else {
        return Ok(bkt_not_found(&req.bkt_name));
    };
    let mut rl = ReadLoop::new(&bkt, None);
    let mut step = rl.start(&req.start_key, &req.end_key, req.limit)?;
    loop {
        match step {
            Step::Done => break,
            Step::Soft(e) => resp.errs.push(e),
            Step::Entry(k, _) => {
                resp.push_key(&k);
                rl.count += 1;
            }
        }
        step = rl.next()?;
    }
    if let Some(k) = rl.next_key() {
        resp.next_key = k.to_string();
    }
    resp.finish_scan();
    Ok(resp)
}
