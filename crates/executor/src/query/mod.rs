//! The predicate / join / sort pipeline behind Qry.

pub mod find;
pub mod join;
pub mod sort;

pub use find::{rec_find, validate_conditions, CheckedCondition};
pub use join::JoinResolver;
pub use sort::{extract_sort_vals, sort_recs, validate_sort_keys, CheckedSortKey, SortRec};
