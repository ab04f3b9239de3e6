//! Bucket handles and cursors.
//!
//! Keys and values are raw bytes; keys compare lexicographically. Cursor
//! entries are copied into owned vectors, which is what lets responses be
//! assembled without holding references into the transaction's pages.

use redb::{ReadOnlyTable, ReadableTable, ReadableTableMetadata, Table};

use crate::error::Error;

/// Read handle to one bucket.
pub struct ReadBucket {
    table: ReadOnlyTable<&'static [u8], &'static [u8]>,
}

impl ReadBucket {
    pub(crate) fn new(table: ReadOnlyTable<&'static [u8], &'static [u8]>) -> Self {
        ReadBucket { table }
    }

    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, Error> {
        Ok(self.table.get(key)?.map(|g| g.value().to_vec()))
    }

    pub fn key_count(&self) -> Result<u64, Error> {
        Ok(self.table.len()?)
    }

    /// Ordered cursor over `[start, end-of-bucket]`. An empty `start` begins
    /// at the first key.
    pub fn cursor(&self, start: &[u8]) -> Result<Cursor<'_>, Error> {
        let range = if start.is_empty() {
            self.table.range::<&[u8]>(..)?
        } else {
            self.table.range::<&[u8]>(start..)?
        };
        Ok(Cursor { range })
    }
}

/// Forward-only cursor yielding owned `(key, value)` pairs in ascending
/// byte order.
pub struct Cursor<'a> {
    range: redb::Range<'a, &'static [u8], &'static [u8]>,
}

impl Cursor<'_> {
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<Option<(Vec<u8>, Vec<u8>)>, Error> {
        match self.range.next() {
            None => Ok(None),
            Some(Ok((k, v))) => Ok(Some((k.value().to_vec(), v.value().to_vec()))),
            Some(Err(e)) => Err(e.into()),
        }
    }
}

/// Write handle to one bucket.
pub struct WriteBucket<'txn> {
    table: Table<'txn, &'static [u8], &'static [u8]>,
}

impl<'txn> WriteBucket<'txn> {
    pub(crate) fn new(table: Table<'txn, &'static [u8], &'static [u8]>) -> Self {
        WriteBucket { table }
    }

    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, Error> {
        Ok(self.table.get(key)?.map(|g| g.value().to_vec()))
    }

    /// Add or replace the record at `key`.
    pub fn put(&mut self, key: &[u8], val: &[u8]) -> Result<(), Error> {
        self.table.insert(key, val)?;
        Ok(())
    }

    /// Delete the record at `key`. Missing keys are not an error.
    pub fn delete(&mut self, key: &[u8]) -> Result<(), Error> {
        self.table.remove(key)?;
        Ok(())
    }

    pub fn key_count(&self) -> Result<u64, Error> {
        Ok(self.table.len()?)
    }
}
