//! ReadLoop: uniform range iteration over a data bucket, or over an index
//! bucket dereferenced into the data bucket.
//!
//! Semantics:
//! - empty start key begins at the first key; otherwise seek to `start`;
//! - a non-empty `start` equal to `end` switches to prefix matching: the
//!   loop ends at the first key that does not begin with `start`;
//! - otherwise a non-empty `end` ends the loop at the first key greater
//!   than `end`;
//! - when iterating via an index, each index value is looked up in the data
//!   bucket; a dangling reference yields an `index-ref` soft step and the
//!   scan continues;
//! - `count` is advanced by the caller for each record it keeps; once
//!   `count` reaches a non-zero `limit` the loop ends and `next_key` holds
//!   the first unserved key.
//!
//! `next_key` is set exactly when the scan stopped before exhausting the
//! range, which is what lets clients chain requests to completion.

use cask_core::{ErrCode, RecErr};

use crate::bucket::{Cursor, ReadBucket};
use crate::error::Error;

/// One step of the loop.
#[derive(Debug)]
pub enum Step {
    /// Next key/value pair. Via an index, the key is the index key and the
    /// value is the dereferenced data record.
    Entry(Vec<u8>, Vec<u8>),
    /// Soft error for this position (dangling index reference); the scan
    /// continues with the following key.
    Soft(RecErr),
    /// Range, prefix, or limit boundary reached.
    Done,
}

pub struct ReadLoop<'a> {
    data: &'a ReadBucket,
    index: Option<&'a ReadBucket>,
    csr: Option<Cursor<'a>>,
    start: String,
    end: String,
    match_prefix: bool,
    limit: usize,
    /// Records kept so far; advanced by the caller.
    pub count: usize,
    next_key: Option<String>,
}

impl<'a> ReadLoop<'a> {
    /// `index` of `None` walks the data bucket directly.
    pub fn new(data: &'a ReadBucket, index: Option<&'a ReadBucket>) -> Self {
        ReadLoop {
            data,
            index,
            csr: None,
            start: String::new(),
            end: String::new(),
            match_prefix: false,
            limit: 0,
            count: 0,
            next_key: None,
        }
    }

    /// Position the cursor and return the first step.
    pub fn start(&mut self, start: &str, end: &str, limit: usize) -> Result<Step, Error> {
        let bkt = self.index.unwrap_or(self.data);
        let mut csr = bkt.cursor(start.as_bytes())?;
        self.start = start.to_string();
        self.end = end.to_string();
        self.limit = limit;
        self.match_prefix = !start.is_empty() && start == end;

        let first = csr.next()?;
        self.csr = Some(csr);
        let Some((k, v)) = first else {
            return Ok(Step::Done);
        };
        if self.out_of_range(&k) {
            return Ok(Step::Done);
        }
        self.emit(k, v)
    }

    /// Advance to the next step.
    pub fn next(&mut self) -> Result<Step, Error> {
        let Some(csr) = self.csr.as_mut() else {
            return Ok(Step::Done);
        };
        let Some((k, v)) = csr.next()? else {
            return Ok(Step::Done);
        };
        if self.limit != 0 && self.count >= self.limit {
            self.next_key = Some(String::from_utf8_lossy(&k).into_owned());
            return Ok(Step::Done);
        }
        if self.out_of_range(&k) {
            self.next_key = Some(String::from_utf8_lossy(&k).into_owned());
            return Ok(Step::Done);
        }
        self.emit(k, v)
    }

    /// First unserved key, when the scan ended on a limit or range boundary.
    pub fn next_key(&self) -> Option<&str> {
        self.next_key.as_deref()
    }

    fn out_of_range(&self, k: &[u8]) -> bool {
        if self.match_prefix {
            !k.starts_with(self.start.as_bytes())
        } else {
            !self.end.is_empty() && k > self.end.as_bytes()
        }
    }

    fn emit(&self, k: Vec<u8>, v: Vec<u8>) -> Result<Step, Error> {
        if self.index.is_none() {
            return Ok(Step::Entry(k, v));
        }
        // v is the index value, i.e. the key of the data record
        match self.data.get(&v)? {
            Some(data_val) => Ok(Step::Entry(k, data_val)),
            None => {
                let msg = format!(
                    "index val {} not key in data bkt",
                    String::from_utf8_lossy(&v)
                );
                Ok(Step::Soft(RecErr::new(ErrCode::IndexRef, msg).at(&k, &v)))
            }
        }
    }
}
