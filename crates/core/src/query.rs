//! Wire types for query requests: find conditions, sort keys, joins, and
//! the formatted-field spec used to compose index keys.
//!
//! Code fields (`op`, `dir`, `str_option`, `use_default`) are carried as
//! plain strings exactly as the client sent them; the executor validates
//! them against the frozen sets in [`crate::codes`] before running a scan.

use serde::{Deserialize, Serialize};

/// One predicate over one record field.
///
/// A record matches a request iff it satisfies every condition in the
/// conjunction list (or any non-empty disjunction list). `not` inverts the
/// condition. String ops normalize both the record value and `val_str`
/// according to `str_option`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FindCondition {
    /// Field containing the compare value.
    pub fld: String,
    /// Match operation; also fixes the operand type. See [`crate::FindOp`].
    pub op: String,
    /// Compare value for string ops.
    pub val_str: String,
    /// Compare value for int ops.
    pub val_int: i64,
    /// Membership list for op `instrlist`.
    pub str_list: Vec<String>,
    /// Membership list for op `inintlist`.
    pub int_list: Vec<i64>,
    /// Exclude records that meet the condition.
    pub not: bool,
    /// Default policy when the field is missing or null. Empty selects
    /// `always`.
    pub use_default: String,
    /// String conversion. Empty selects `lowercase`.
    pub str_option: String,
}

/// One sort key. `dir` encodes both direction and field type
/// (`ascstr` / `descstr` / `ascint` / `descint`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SortKey {
    pub fld: String,
    pub dir: String,
    /// Default policy when the field is missing or null. Empty selects
    /// `always`.
    pub use_default: String,
}

/// Deterministic enrichment of the current record from another bucket.
///
/// The record whose key is the current record's `join_fld` value is loaded
/// from `join_bkt`; its `from_fld` value is set on the current record at
/// `to_fld`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Join {
    /// Bucket the joined value is pulled from.
    pub join_bkt: String,
    /// Field in the current record holding the foreign key.
    pub join_fld: String,
    /// Field in the join record the value comes from.
    pub from_fld: String,
    /// Field in the current record the value lands in.
    pub to_fld: String,
    /// On any join problem, leave `to_fld` unset instead of erroring.
    pub use_default: bool,
}

/// One index bucket entry. `key` is the composite index key, `val` the data
/// bucket key it points at. A non-empty `old_key` is deleted first (used
/// when a data record's index key changed; missing is fine).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IndexKeyVal {
    pub key: String,
    pub val: String,
    pub old_key: String,
}

/// Formatted-field spec for [`crate::rec::merge_fields`], typically used to
/// build index keys. Strings are plain-converted then truncated or
/// space-padded to `length`; ints are zero-padded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FldFormat {
    pub fld_name: String,
    /// "string" or "int".
    pub fld_type: String,
    /// Output length of the value.
    pub length: usize,
}

/// Field type code for [`FldFormat`].
pub const FLD_TYPE_STR: &str = "string";
/// Field type code for [`FldFormat`].
pub const FLD_TYPE_INT: &str = "int";
