//! Index entry composition.
//!
//! Index keys are built by merging declared record fields into a fixed
//! layout and appending the record id as a uniqueness suffix:
//! `<merged>|<id>`. The entries feed `/putindex`.
//!
//! Destroy-and-rebuild tooling must refuse to touch buckets whose name does
//! not contain `index`; that guard is what keeps a mistyped name from
//! destroying a data bucket.

use serde_json::Value;

use cask_core::rec::merge_fields;
use cask_core::{DefaultPolicy, ErrCode, FldFormat, IndexKeyVal, Rec, RecErr, StrOption};

/// True if `name` is eligible for destroy-and-rebuild index operations.
pub fn is_index_bucket(name: &str) -> bool {
    name.contains("index")
}

/// Compose one index entry per record.
///
/// `id_fld` names the record's key field; its value becomes both the
/// uniqueness suffix and the entry's data key.
pub fn build_entries(
    recs: &[&[u8]],
    id_fld: &str,
    formats: &[FldFormat],
    sep: &str,
) -> Result<Vec<IndexKeyVal>, RecErr> {
    let mut entries = Vec::with_capacity(recs.len());
    for raw in recs {
        let parsed: Value = serde_json::from_slice(raw)
            .map_err(|e| RecErr::new(ErrCode::ParseRec, e.to_string()))?;
        let rec = Rec::new(&parsed);
        let id = rec
            .get_str(id_fld, DefaultPolicy::Never, StrOption::AsIs)
            .map_err(|code| RecErr::new(code, format!("index id fld {id_fld}")))?;
        let merged = merge_fields(&rec, formats, sep)
            .map_err(|code| RecErr::new(code, "merge flds failed"))?;
        entries.push(IndexKeyVal {
            key: format!("{merged}{sep}{id}"),
            val: id,
            old_key: String::new(),
        });
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn guard_requires_index_in_name() {
        assert!(is_index_bucket("location_zip_index"));
        assert!(!is_index_bucket("location"));
    }

    #[test]
    fn builds_merged_keys_with_id_suffix() {
        let r1 = json!({"id": "100", "zip": "11111", "locationType": 1}).to_string();
        let r2 = json!({"id": "104", "zip": "54633", "locationType": 3}).to_string();
        let formats = vec![
            FldFormat { fld_name: "zip".into(), fld_type: "string".into(), length: 5 },
            FldFormat { fld_name: "locationType".into(), fld_type: "int".into(), length: 2 },
        ];
        let entries =
            build_entries(&[r1.as_bytes(), r2.as_bytes()], "id", &formats, "|").unwrap();
        assert_eq!(entries[0].key, "11111|01|100");
        assert_eq!(entries[0].val, "100");
        assert_eq!(entries[1].key, "54633|03|104");
        assert_eq!(entries[1].val, "104");
    }

    #[test]
    fn missing_id_fld_is_an_error() {
        let r = json!({"zip": "11111"}).to_string();
        let err = build_entries(&[r.as_bytes()], "id", &[], "|").unwrap_err();
        assert_eq!(err.code, ErrCode::FldNotFound);
    }
}
