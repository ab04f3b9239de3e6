//! Find condition validation and evaluation.
//!
//! Wire conditions are validated once per request: op membership, string
//! option, default policy (empty strings select the defaults), with compare
//! values normalized up front so the per-record work is a lookup and a
//! comparison. An invalid spec rejects the whole request before any record
//! is scanned.

use cask_core::rec::normalize;
use cask_core::{DefaultPolicy, ErrCode, FindCondition, FindOp, Rec, RecErr, StrOption};

/// A validated condition with typed codes and pre-normalized operands.
#[derive(Debug, Clone)]
pub struct CheckedCondition {
    pub fld: String,
    pub op: FindOp,
    pub not: bool,
    pub use_default: DefaultPolicy,
    pub str_option: StrOption,
    pub val_str: String,
    pub val_int: i64,
    pub str_list: Vec<String>,
    pub int_list: Vec<i64>,
}

/// Validate wire conditions. `None` means at least one condition is
/// malformed (unknown op, string option, or default policy).
pub fn validate_conditions(conditions: &[FindCondition]) -> Option<Vec<CheckedCondition>> {
    let mut out = Vec::with_capacity(conditions.len());
    for c in conditions {
        let op = FindOp::parse(&c.op)?;
        let str_option = StrOption::parse(&c.str_option)?;
        let use_default = DefaultPolicy::parse(&c.use_default)?;
        let val_str = if op.is_str_op() {
            normalize(&c.val_str, str_option)
        } else {
            c.val_str.clone()
        };
        let str_list = if op == FindOp::InStrList {
            c.str_list.iter().map(|s| normalize(s, str_option)).collect()
        } else {
            c.str_list.clone()
        };
        out.push(CheckedCondition {
            fld: c.fld.clone(),
            op,
            not: c.not,
            use_default,
            str_option,
            val_str,
            val_int: c.val_int,
            str_list,
            int_list: c.int_list.clone(),
        });
    }
    Some(out)
}

/// True iff the record meets every condition.
///
/// `not` inverts a condition; a record matching a `not` condition is
/// rejected immediately. Accessor failures surface as soft errors (the
/// caller attaches the record's key/value).
pub fn rec_find(rec: &Rec<'_>, conditions: &[CheckedCondition]) -> Result<bool, RecErr> {
    for c in conditions {
        let met = eval(rec, c)?;
        if c.not {
            if met {
                return Ok(false);
            }
            continue;
        }
        if !met {
            return Ok(false);
        }
    }
    Ok(true)
}

fn eval(rec: &Rec<'_>, c: &CheckedCondition) -> Result<bool, RecErr> {
    let met = match c.op {
        FindOp::Matches
        | FindOp::Before
        | FindOp::After
        | FindOp::StartsWith
        | FindOp::Contains
        | FindOp::InStrList => {
            let val = rec
                .get_str(&c.fld, c.use_default, c.str_option)
                .map_err(|code| fld_err(code, &c.fld))?;
            match c.op {
                FindOp::Matches => val == c.val_str,
                FindOp::Before => val < c.val_str,
                FindOp::After => val > c.val_str,
                FindOp::StartsWith => val.starts_with(&c.val_str),
                FindOp::Contains => val.contains(&c.val_str),
                FindOp::InStrList => c.str_list.contains(&val),
                _ => unreachable!(),
            }
        }
        FindOp::Equals | FindOp::LessThan | FindOp::GreaterThan | FindOp::InIntList => {
            let val = rec
                .get_int(&c.fld, c.use_default)
                .map_err(|code| fld_err(code, &c.fld))?;
            match c.op {
                FindOp::Equals => val == c.val_int,
                FindOp::LessThan => val < c.val_int,
                FindOp::GreaterThan => val > c.val_int,
                FindOp::InIntList => c.int_list.contains(&val),
                _ => unreachable!(),
            }
        }
        FindOp::Exists => rec.exists(&c.fld),
        FindOp::IsNull => rec.is_null(&c.fld),
    };
    Ok(met)
}

fn fld_err(code: ErrCode, fld: &str) -> RecErr {
    RecErr::new(code, format!("find condition fld {fld}"))
}
