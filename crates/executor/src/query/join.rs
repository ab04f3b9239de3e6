//! Join resolution: enrich the current record from other buckets.
//!
//! Joins are ordered. The resolver caches the last loaded join bucket and,
//! within it, the last parsed join record keyed by `(join_bkt, join_fld)`;
//! consecutive joins pulling different fields from the same foreign record
//! parse it once. The cache is only advanced on success so a failed lookup
//! with `use_default` retries on the next join.

use serde_json::Value;

use cask_core::{ErrCode, Join, RecErr};
use cask_engine::{Error as StoreError, ReadBucket, ReadTx};

/// Resolver scoped to one transaction; reused across all records of a scan.
pub struct JoinResolver<'tx> {
    tx: &'tx ReadTx,
    bkt_name: String,
    bkt: Option<ReadBucket>,
    fld_name: String,
    join_rec: Option<Value>,
}

/// A join step either fails softly (collected into the error budget) or
/// hits the substrate (hard, aborts the request).
pub enum JoinError {
    Soft(RecErr),
    Hard(StoreError),
}

impl From<StoreError> for JoinError {
    fn from(e: StoreError) -> Self {
        JoinError::Hard(e)
    }
}

impl<'tx> JoinResolver<'tx> {
    pub fn new(tx: &'tx ReadTx) -> Self {
        JoinResolver {
            tx,
            bkt_name: String::new(),
            bkt: None,
            fld_name: String::new(),
            join_rec: None,
        }
    }

    /// Apply each join to `rec` in order.
    ///
    /// On a join problem with `use_default` set, the error is swallowed and
    /// the target field left unset (the client sees a zero value after
    /// deserialization). Without `use_default` the record fails softly with
    /// the join's error code.
    pub fn apply(&mut self, rec: &mut Value, joins: &[Join]) -> Result<(), JoinError> {
        for join in joins {
            if join.join_bkt != self.bkt_name {
                let Some(bkt) = self.tx.bucket(&join.join_bkt)? else {
                    if join.use_default {
                        continue;
                    }
                    return Err(soft(
                        ErrCode::JoinBkt,
                        format!("invalid join bkt, {}", join.join_bkt),
                    ));
                };
                self.bkt = Some(bkt);
                self.bkt_name = join.join_bkt.clone();
                self.fld_name.clear();
                self.join_rec = None;
            }
            if join.join_fld != self.fld_name {
                let Some(join_key) = rec.get(&join.join_fld).and_then(Value::as_str) else {
                    if join.use_default {
                        continue;
                    }
                    return Err(soft(
                        ErrCode::JoinFld,
                        format!("invalid join fld, {}", join.join_fld),
                    ));
                };
                let Some(bkt) = self.bkt.as_ref() else {
                    if join.use_default {
                        continue;
                    }
                    return Err(soft(
                        ErrCode::JoinBkt,
                        format!("invalid join bkt, {}", join.join_bkt),
                    ));
                };
                let Some(raw) = bkt.get(join_key.as_bytes())? else {
                    if join.use_default {
                        continue;
                    }
                    return Err(soft(
                        ErrCode::JoinKey,
                        format!("join key {join_key} not in join bkt {}", join.join_bkt),
                    ));
                };
                let parsed: Value = match serde_json::from_slice(&raw) {
                    Ok(v) => v,
                    Err(_) => {
                        if join.use_default {
                            continue;
                        }
                        return Err(soft(
                            ErrCode::JoinParse,
                            format!("error parsing join rec, key {join_key}"),
                        ));
                    }
                };
                self.join_rec = Some(parsed);
                self.fld_name = join.join_fld.clone();
            }
            let Some(join_rec) = self.join_rec.as_ref() else {
                if join.use_default {
                    continue;
                }
                return Err(soft(
                    ErrCode::JoinFld,
                    format!("invalid join fld, {}", join.join_fld),
                ));
            };
            let Some(join_val) = join_rec.get(&join.from_fld) else {
                if join.use_default {
                    continue;
                }
                return Err(soft(
                    ErrCode::JoinFromFld,
                    format!("join from fld not found, FromFld {}", join.from_fld),
                ));
            };
            if let Value::Object(map) = rec {
                map.insert(join.to_fld.clone(), join_val.clone());
            }
        }
        Ok(())
    }
}

fn soft(code: ErrCode, msg: String) -> JoinError {
    JoinError::Soft(RecErr::new(code, msg))
}
