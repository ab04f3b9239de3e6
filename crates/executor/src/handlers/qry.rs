//! The Qry handler: predicate-and-sort queries over a range scan.
//!
//! Composition: open data (+ index) bucket → validate conditions and sort
//! keys → ReadLoop → parse each record once → joins-before-find → predicate
//! → joins-after-find → extract sort values → collect. After the loop:
//! stable sort, truncate to `top`, set `next_key`.
//!
//! Soft errors (parse failures, dangling index refs, field access
//! violations, join problems) collect into the envelope and count against
//! the error budget; exceeding it fails the request.

use serde_json::Value;

use cask_core::trace::trace;
use cask_core::{ErrCode, RecErr, Response, Status};
use cask_engine::{ReadLoop, ReadTx, Step};

use crate::config::RuntimeConfig;
use crate::error::Error;
use crate::handlers::bkt_not_found;
use crate::query::join::JoinError;
use crate::query::{
    extract_sort_vals, rec_find, sort_recs, validate_conditions, validate_sort_keys, JoinResolver,
    SortRec,
};
use crate::request::QryRequest;

pub fn qry(tx: &ReadTx, cfg: &RuntimeConfig, req: &QryRequest) -> Result<Response, Error> {
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

    let Some(conditions) = validate_conditions(&req.find_conditions) else {
        return Ok(Response::fail("invalid findConditions"));
    };
    let Some(or_conditions) = validate_conditions(&req.find_or_conditions) else {
        return Ok(Response::fail("invalid findOrConditions"));
    };
    let Some(sort_keys) = validate_sort_keys(&req.sort_keys) else {
        return Ok(Response::fail("invalid sortKeys"));
    };

    let err_limit = cfg.err_limit(req.err_limit);
    let has_joins = !req.joins_before_find.is_empty() || !req.joins_after_find.is_empty();
    let mut resolver = JoinResolver::new(tx);

    let mut sort_recs_buf: Vec<SortRec> = Vec::new();

    trace("__ qry find start __");

    let mut rl = ReadLoop::new(&data, index.as_ref());
    let mut step = rl.start(&req.start_key, &req.end_key, req.limit)?;

    'scan: loop {
        if resp.errs.len() > err_limit {
            resp.status = Status::Fail;
            resp.msg = "too many errors, see resp.errs for details".into();
            return Ok(resp);
        }
        let (k, v) = match step {
            Step::Done => break 'scan,
            Step::Soft(e) => {
                resp.errs.push(e);
                step = rl.next()?;
                continue;
            }
            Step::Entry(k, v) => (k, v),
        };

        let mut parsed: Value = match serde_json::from_slice(&v) {
            Ok(p) => p,
            Err(e) => {
                resp.errs
                    .push(RecErr::new(ErrCode::ParseRec, e.to_string()).at(&k, &v));
                step = rl.next()?;
                continue;
            }
        };

        if !req.joins_before_find.is_empty() {
            match resolver.apply(&mut parsed, &req.joins_before_find) {
                Ok(()) => {}
                Err(JoinError::Soft(e)) => {
                    resp.errs.push(e.at(&k, &v));
                    step = rl.next()?;
                    continue;
                }
                Err(JoinError::Hard(e)) => return Err(e.into()),
            }
        }

        let rec = cask_core::Rec::new(&parsed);
        let mut keep = if conditions.is_empty() {
            true
        } else {
            match rec_find(&rec, &conditions) {
                Ok(keep) => keep,
                Err(e) => {
                    resp.errs.push(e.at(&k, &v));
                    step = rl.next()?;
                    continue;
                }
            }
        };
        if !keep && !or_conditions.is_empty() {
            keep = match rec_find(&rec, &or_conditions) {
                Ok(keep) => keep,
                Err(e) => {
                    resp.errs.push(e.at(&k, &v));
                    step = rl.next()?;
                    continue;
                }
            };
        }
        if !keep {
            step = rl.next()?;
            continue;
        }
        rl.count += 1;

        if !req.joins_after_find.is_empty() {
            match resolver.apply(&mut parsed, &req.joins_after_find) {
                Ok(()) => {}
                Err(JoinError::Soft(e)) => {
                    resp.errs.push(e.at(&k, &v));
                    step = rl.next()?;
                    continue;
                }
                Err(JoinError::Hard(e)) => return Err(e.into()),
            }
        }

        // joins mutate the parsed record, so joined records are re-marshaled;
        // untouched records pass through byte-identical
        let out = if has_joins {
            serde_json::to_vec(&parsed).unwrap_or(v)
        } else {
            v
        };

        if sort_keys.is_empty() {
            resp.push_value(out);
        } else {
            let rec = cask_core::Rec::new(&parsed);
            match extract_sort_vals(&rec, &sort_keys) {
                Ok(sort_on) => sort_recs_buf.push(SortRec { sort_on, value: out }),
                Err(e) => {
                    resp.errs.push(e.at(&k, &out));
                    step = rl.next()?;
                    continue;
                }
            }
        }

        step = rl.next()?;
    }

    if let Some(k) = rl.next_key() {
        resp.next_key = k.to_string();
    }
    trace("__ qry find done __");

    if !sort_keys.is_empty() {
        sort_recs(&sort_keys, &mut sort_recs_buf);
        let count = if req.top == 0 {
            sort_recs_buf.len()
        } else {
            req.top.min(sort_recs_buf.len())
        };
        for rec in sort_recs_buf.into_iter().take(count) {
            resp.push_value(rec.value);
        }
        trace("~ qry sort done ~");
    }

    resp.finish_scan();
    Ok(resp)
}
