//! Delete, bucket maintenance, Export, CopyDB.

use std::fs::File;
use std::io::{BufWriter, Write};

use serde_json::Value;
use tracing::warn;

use cask_core::{Response, Status};
use cask_engine::{ReadLoop, ReadTx, Step, WriteTx};

use crate::error::Error;
use crate::handlers::bkt_not_found;
use crate::request::{BktRequest, CopyDbRequest, DeleteRequest, ExportRequest};

/// Delete records by key. Missing keys are silent; a substrate failure
/// rolls the transaction back.
pub fn delete(tx: &WriteTx, req: &DeleteRequest) -> Result<Response, Error> {
    let Some(mut bkt) = tx.bucket(&req.bkt_name, false)? else {
        return Ok(bkt_not_found(&req.bkt_name));
    };
    for key in &req.keys {
        bkt.delete(key.as_bytes())?;
    }
    Ok(Response::ok())
}

const NEXT_SEQ_MAX: usize = 100;

/// Bucket maintenance: create / delete / nextseq / list / count.
pub fn bkt(tx: &WriteTx, req: &BktRequest) -> Result<Response, Error> {
    let mut resp = Response::ok();
    let op = req.operation.to_lowercase();
    match op.as_str() {
        "create" => {
            if tx.bucket_exists(&req.bkt_name)? {
                return Ok(Response::fail(format!(
                    "bucket already exists - {}",
                    req.bkt_name
                )));
            }
            tx.create_bucket(&req.bkt_name)?;
        }
        "delete" => {
            tx.delete_bucket(&req.bkt_name)?;
        }
        "nextseq" => {
            if !tx.bucket_exists(&req.bkt_name)? {
                return Ok(bkt_not_found(&req.bkt_name));
            }
            let count = match req.next_seq_count {
                0 => 1,
                n if n > NEXT_SEQ_MAX => {
                    warn!(
                        target: "cask::handlers",
                        requested = n,
                        "nextseq request clamped to {NEXT_SEQ_MAX}"
                    );
                    NEXT_SEQ_MAX
                }
                n => n,
            };
            resp.next_seq = tx.next_sequence(&req.bkt_name, count)?;
        }
        "list" => {
            for name in tx.bucket_names()? {
                resp.push_key(name.as_bytes());
            }
        }
        "count" => match tx.key_count(&req.bkt_name)? {
            Some(n) => resp.put_cnt = n,
            None => {
                return Ok(Response::fail(format!("bucket {} not found", req.bkt_name)));
            }
        },
        _ => {
            return Ok(Response::fail(format!("invalid bkt operation - {op}")));
        }
    }
    Ok(resp)
}

/// Write a key range to a server-side file as a pretty-printed JSON array.
/// File problems are reported in the envelope; nothing is rolled back (the
/// transaction is read-only).
pub fn export(tx: &ReadTx, req: &ExportRequest) -> Result<Response, Error> {
    let mut resp = Response::default();
    let Some(bkt) = tx.bucket(&req.bkt_name)? else {
        return Ok(bkt_not_found(&req.bkt_name));
    };
    let file = match File::create(&req.file_path) {
        Ok(f) => f,
        Err(e) => {
            warn!(target: "cask::handlers", path = %req.file_path, error = %e, "export file create failed");
            return Ok(Response::fail(format!("error creating export file: {e}")));
        }
    };
    let mut out = BufWriter::new(file);

    let mut rl = ReadLoop::new(&bkt, None);
    let mut step = rl.start(&req.start_key, &req.end_key, req.limit)?;
    let mut count = 0usize;
    if let Err(e) = out.write_all(b"[\n") {
        return Ok(write_failed(e));
    }
    loop {
        match step {
            Step::Done => break,
            Step::Soft(e) => resp.errs.push(e),
            Step::Entry(_, v) => {
                let mut element = Vec::new();
                if count > 0 {
                    element.extend_from_slice(b",\n");
                }
                match serde_json::from_slice::<Value>(&v) {
                    Ok(parsed) => {
                        let pretty =
                            serde_json::to_vec_pretty(&parsed).unwrap_or_else(|_| v.clone());
                        element.extend_from_slice(&pretty);
                    }
                    Err(_) => element.extend_from_slice(&v),
                }
                if let Err(e) = out.write_all(&element) {
                    return Ok(write_failed(e));
                }
                count += 1;
                rl.count += 1;
            }
        }
        step = rl.next()?;
    }
    if let Err(e) = out.write_all(b"\n]").and_then(|_| out.flush()) {
        return Ok(write_failed(e));
    }
    resp.status = Status::Ok;
    Ok(resp)
}

fn write_failed(e: std::io::Error) -> Response {
    warn!(target: "cask::handlers", error = %e, "export write failed");
    Response::fail(format!("error writing export file: {e}"))
}

/// Copy the open database to another file from this transaction's snapshot.
/// Concurrent readers and writers are not blocked.
pub fn copy_db(tx: &ReadTx, req: &CopyDbRequest) -> Result<Response, Error> {
    match tx.copy_to(&req.file_path) {
        Ok(()) => Ok(Response::ok()),
        Err(e) => {
            warn!(target: "cask::handlers", path = %req.file_path, error = %e, "copydb failed");
            Ok(Response::fail(e.to_string()))
        }
    }
}
