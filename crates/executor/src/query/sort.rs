//! Sort value extraction and the stable multi-key sorter.
//!
//! Sort values are materialized as strings so one comparator covers both
//! types: strings are plain-normalized, ints rendered as 15-wide zero-padded
//! decimals so byte comparison yields numeric order. Negative integers
//! mis-order under this encoding; the supported domain is non-negative, as
//! in the system this replaces.

use cask_core::{DefaultPolicy, Rec, RecErr, SortDir, SortKey, StrOption};

/// A validated sort key.
#[derive(Debug, Clone)]
pub struct CheckedSortKey {
    pub fld: String,
    pub dir: SortDir,
    pub use_default: DefaultPolicy,
}

/// Validate wire sort keys. `None` means a malformed dir or default policy.
pub fn validate_sort_keys(keys: &[SortKey]) -> Option<Vec<CheckedSortKey>> {
    let mut out = Vec::with_capacity(keys.len());
    for k in keys {
        out.push(CheckedSortKey {
            fld: k.fld.clone(),
            dir: SortDir::parse(&k.dir)?,
            use_default: DefaultPolicy::parse(&k.use_default)?,
        });
    }
    Some(out)
}

/// One surviving record plus its materialized sort values.
#[derive(Debug)]
pub struct SortRec {
    pub sort_on: Vec<String>,
    pub value: Vec<u8>,
}

/// Extract the comparison string for each sort key.
pub fn extract_sort_vals(rec: &Rec<'_>, keys: &[CheckedSortKey]) -> Result<Vec<String>, RecErr> {
    let mut vals = Vec::with_capacity(keys.len());
    for k in keys {
        let val = if k.dir.is_int() {
            let n = rec
                .get_int(&k.fld, k.use_default)
                .map_err(|code| RecErr::new(code, format!("sort key fld {}", k.fld)))?;
            format!("{n:015}")
        } else {
            rec.get_str(&k.fld, k.use_default, StrOption::Plain)
                .map_err(|code| RecErr::new(code, format!("sort key fld {}", k.fld)))?
        };
        vals.push(val);
    }
    Ok(vals)
}

/// Stable multi-key sort. The comparator runs left to right through the
/// sort keys; descending keys negate the comparison. Records with equal
/// sort values keep their scan order.
pub fn sort_recs(keys: &[CheckedSortKey], recs: &mut [SortRec]) {
    let desc: Vec<bool> = keys.iter().map(|k| k.dir.is_desc()).collect();
    recs.sort_by(|a, b| {
        for i in 0..keys.len() {
            let n = a.sort_on[i].cmp(&b.sort_on[i]);
            if n != std::cmp::Ordering::Equal {
                return if desc[i] { n.reverse() } else { n };
            }
        }
        std::cmp::Ordering::Equal
    });
}
