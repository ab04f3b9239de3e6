//! Frozen code sets used on the wire.
//!
//! Requests carry these values as plain strings (matching the JSON clients
//! send); validation parses them into the enums here before any record is
//! scanned. An unknown string fails the request with a `fail` envelope, not
//! a transport error.

use serde::{Deserialize, Serialize};

/// Response status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Request completed without soft errors.
    #[default]
    Ok,
    /// Request completed but something is off; see `msg` / `errs`.
    Warning,
    /// Request did not complete normally.
    Fail,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Ok => "ok",
            Status::Warning => "warning",
            Status::Fail => "fail",
        }
    }
}

/// Find condition operation.
///
/// The op encodes both the comparison and the operand type: string ops
/// compare normalized strings, int ops require an integer field. `Exists`
/// and `IsNull` test field presence only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindOp {
    // string ops
    Matches,
    Before,
    After,
    StartsWith,
    Contains,
    InStrList,
    // int ops
    Equals,
    LessThan,
    GreaterThan,
    InIntList,
    // presence ops
    Exists,
    IsNull,
}

impl FindOp {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "matches" => Some(FindOp::Matches),
            "before" => Some(FindOp::Before),
            "after" => Some(FindOp::After),
            "startswith" => Some(FindOp::StartsWith),
            "contains" => Some(FindOp::Contains),
            "instrlist" => Some(FindOp::InStrList),
            "equals" => Some(FindOp::Equals),
            "lessthan" => Some(FindOp::LessThan),
            "greaterthan" => Some(FindOp::GreaterThan),
            "inintlist" => Some(FindOp::InIntList),
            "exists" => Some(FindOp::Exists),
            "isnull" => Some(FindOp::IsNull),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FindOp::Matches => "matches",
            FindOp::Before => "before",
            FindOp::After => "after",
            FindOp::StartsWith => "startswith",
            FindOp::Contains => "contains",
            FindOp::InStrList => "instrlist",
            FindOp::Equals => "equals",
            FindOp::LessThan => "lessthan",
            FindOp::GreaterThan => "greaterthan",
            FindOp::InIntList => "inintlist",
            FindOp::Exists => "exists",
            FindOp::IsNull => "isnull",
        }
    }

    /// Ops whose operand is a (normalized) string.
    pub fn is_str_op(&self) -> bool {
        matches!(
            self,
            FindOp::Matches
                | FindOp::Before
                | FindOp::After
                | FindOp::StartsWith
                | FindOp::Contains
                | FindOp::InStrList
        )
    }

    /// Ops whose operand is an integer.
    pub fn is_int_op(&self) -> bool {
        matches!(
            self,
            FindOp::Equals | FindOp::LessThan | FindOp::GreaterThan | FindOp::InIntList
        )
    }
}

/// Sort key direction. Encodes both direction (asc/desc) and value type
/// (str/int), mirroring the wire codes `ascstr`, `descstr`, `ascint`,
/// `descint`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDir {
    AscStr,
    DescStr,
    AscInt,
    DescInt,
}

impl SortDir {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ascstr" => Some(SortDir::AscStr),
            "descstr" => Some(SortDir::DescStr),
            "ascint" => Some(SortDir::AscInt),
            "descint" => Some(SortDir::DescInt),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDir::AscStr => "ascstr",
            SortDir::DescStr => "descstr",
            SortDir::AscInt => "ascint",
            SortDir::DescInt => "descint",
        }
    }

    pub fn is_int(&self) -> bool {
        matches!(self, SortDir::AscInt | SortDir::DescInt)
    }

    pub fn is_desc(&self) -> bool {
        matches!(self, SortDir::DescStr | SortDir::DescInt)
    }
}

/// String conversion applied to record values (and compare values) before
/// string comparison.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StrOption {
    /// Lowercase the value. The default when the request omits the option.
    #[default]
    Lowercase,
    /// Keep Unicode alphanumerics only, ASCII-lowercased.
    Plain,
    /// No conversion.
    AsIs,
}

impl StrOption {
    /// Parse a wire value. The empty string selects the default.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "" | "lowercase" => Some(StrOption::Lowercase),
            "plain" => Some(StrOption::Plain),
            "asis" => Some(StrOption::AsIs),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StrOption::Lowercase => "lowercase",
            StrOption::Plain => "plain",
            StrOption::AsIs => "asis",
        }
    }
}

/// What value a field access yields when the field is missing or null.
///
/// | field state \ policy | Always | Never          | IsNull         | NotFound       |
/// |----------------------|--------|----------------|----------------|----------------|
/// | missing              | zero   | `fld-not-found`| `fld-not-found`| zero           |
/// | present, null        | zero   | `fld-is-null`  | zero           | `fld-is-null`  |
/// | present, wrong type  | `fld-type` in every case                                  |
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DefaultPolicy {
    /// Zero value for both missing and null. The default when omitted.
    #[default]
    Always,
    /// Missing and null are both errors.
    Never,
    /// Zero value only when the field is present and null.
    IsNull,
    /// Zero value only when the field is missing.
    NotFound,
}

impl DefaultPolicy {
    /// Parse a wire value. The empty string selects the default.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "" | "always" => Some(DefaultPolicy::Always),
            "never" => Some(DefaultPolicy::Never),
            "isnull" => Some(DefaultPolicy::IsNull),
            "notfound" => Some(DefaultPolicy::NotFound),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DefaultPolicy::Always => "always",
            DefaultPolicy::Never => "never",
            DefaultPolicy::IsNull => "isnull",
            DefaultPolicy::NotFound => "notfound",
        }
    }
}

/// Soft error codes collected into `Response.errs` during a scan.
///
/// These never abort a transaction on their own; they count against the
/// request's error budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrCode {
    NotFound,
    IndexRef,
    ParseRec,
    FldNotFound,
    FldIsNull,
    FldType,
    JoinBkt,
    JoinFld,
    JoinKey,
    JoinParse,
    JoinFromFld,
}

impl ErrCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrCode::NotFound => "not-found",
            ErrCode::IndexRef => "index-ref",
            ErrCode::ParseRec => "parse-rec",
            ErrCode::FldNotFound => "fld-not-found",
            ErrCode::FldIsNull => "fld-is-null",
            ErrCode::FldType => "fld-type",
            ErrCode::JoinBkt => "join-bkt",
            ErrCode::JoinFld => "join-fld",
            ErrCode::JoinKey => "join-key",
            ErrCode::JoinParse => "join-parse",
            ErrCode::JoinFromFld => "join-from-fld",
        }
    }
}

impl std::fmt::Display for ErrCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
