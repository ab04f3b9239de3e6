//! Record accessor over a parsed JSON document.
//!
//! Every record is parsed once per scan; all field access during predicate
//! evaluation, sort extraction, and joins goes through [`Rec`]. Missing and
//! null fields resolve according to the request's [`DefaultPolicy`]; a
//! present field of the wrong type is always an error.

use serde_json::Value;

use crate::codes::{DefaultPolicy, ErrCode, StrOption};
use crate::query::{FldFormat, FLD_TYPE_INT, FLD_TYPE_STR};

/// Accessor over one parsed record.
#[derive(Debug, Clone, Copy)]
pub struct Rec<'a> {
    val: &'a Value,
}

impl<'a> Rec<'a> {
    pub fn new(val: &'a Value) -> Self {
        Rec { val }
    }

    fn field(&self, fld: &str) -> Option<&'a Value> {
        self.val.get(fld)
    }

    /// True if the field is present at the top level (null counts).
    pub fn exists(&self, fld: &str) -> bool {
        self.field(fld).is_some()
    }

    /// True if the field is present and explicitly null.
    pub fn is_null(&self, fld: &str) -> bool {
        matches!(self.field(fld), Some(Value::Null))
    }

    /// String value of `fld`, normalized per `opt`.
    ///
    /// Missing/null resolution follows `policy`; the zero value is the
    /// empty string. A present non-string field is `fld-type`.
    pub fn get_str(
        &self,
        fld: &str,
        policy: DefaultPolicy,
        opt: StrOption,
    ) -> Result<String, ErrCode> {
        match self.field(fld) {
            None => match policy {
                DefaultPolicy::Always | DefaultPolicy::NotFound => Ok(String::new()),
                DefaultPolicy::Never | DefaultPolicy::IsNull => Err(ErrCode::FldNotFound),
            },
            Some(Value::Null) => match policy {
                DefaultPolicy::Always | DefaultPolicy::IsNull => Ok(String::new()),
                DefaultPolicy::Never | DefaultPolicy::NotFound => Err(ErrCode::FldIsNull),
            },
            Some(Value::String(s)) => Ok(normalize(s, opt)),
            Some(_) => Err(ErrCode::FldType),
        }
    }

    /// Integer value of `fld`.
    ///
    /// Missing/null resolution follows `policy`; the zero value is 0. A
    /// present field that is not an integer (including JSON floats) is
    /// `fld-type`.
    pub fn get_int(&self, fld: &str, policy: DefaultPolicy) -> Result<i64, ErrCode> {
        match self.field(fld) {
            None => match policy {
                DefaultPolicy::Always | DefaultPolicy::NotFound => Ok(0),
                DefaultPolicy::Never | DefaultPolicy::IsNull => Err(ErrCode::FldNotFound),
            },
            Some(Value::Null) => match policy {
                DefaultPolicy::Always | DefaultPolicy::IsNull => Ok(0),
                DefaultPolicy::Never | DefaultPolicy::NotFound => Err(ErrCode::FldIsNull),
            },
            Some(Value::Number(n)) => n.as_i64().ok_or(ErrCode::FldType),
            Some(_) => Err(ErrCode::FldType),
        }
    }
}

/// Apply a string option.
pub fn normalize(s: &str, opt: StrOption) -> String {
    match opt {
        StrOption::Lowercase => s.to_lowercase(),
        StrOption::Plain => plain(s),
        StrOption::AsIs => s.to_owned(),
    }
}

/// The `plain` conversion: keep Unicode alphanumerics only, ASCII-lowercased.
///
/// Used for string compares with the `plain` option, sort value extraction,
/// and merged index key fields.
pub fn plain(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Compose a fixed-layout string from record fields, joined by `sep`.
///
/// Ints are zero-padded to the declared length; strings are plain-converted
/// then truncated or right-padded with spaces. Output is deterministic and
/// preserves the declared field order. The usual use is building index keys
/// (with a uniqueness suffix appended by the caller).
pub fn merge_fields(rec: &Rec<'_>, flds: &[FldFormat], sep: &str) -> Result<String, ErrCode> {
    let mut parts = Vec::with_capacity(flds.len());
    for f in flds {
        let part = match f.fld_type.as_str() {
            FLD_TYPE_INT => {
                let n = rec.get_int(&f.fld_name, DefaultPolicy::Always)?;
                format!("{:0width$}", n, width = f.length)
            }
            FLD_TYPE_STR => {
                let s = rec.get_str(&f.fld_name, DefaultPolicy::Always, StrOption::Plain)?;
                let mut s: String = s.chars().take(f.length).collect();
                let have = s.chars().count();
                if have < f.length {
                    s.extend(std::iter::repeat(' ').take(f.length - have));
                }
                s
            }
            _ => return Err(ErrCode::FldType),
        };
        parts.push(part);
    }
    Ok(parts.join(sep))
}
