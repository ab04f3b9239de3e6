//! Transaction handles.
//!
//! Buckets map 1:1 onto redb tables keyed and valued by raw bytes. The
//! per-bucket sequence counters live in a hidden `__cask_seq` table that is
//! excluded from bucket listings; redb has no native bucket sequence.

use redb::{
    ReadTransaction, ReadableTable, ReadableTableMetadata, TableDefinition, TableHandle,
    WriteTransaction,
};

use crate::bucket::{ReadBucket, WriteBucket};
use crate::error::Error;

/// Hidden table holding `bucket name -> last issued sequence number`.
const SEQ_BUCKET: &str = "__cask_seq";

pub(crate) fn table_def(name: &str) -> TableDefinition<'_, &'static [u8], &'static [u8]> {
    TableDefinition::new(name)
}

/// Read transaction: a consistent snapshot of the whole store.
pub struct ReadTx {
    inner: ReadTransaction,
}

impl ReadTx {
    pub(crate) fn new(inner: ReadTransaction) -> Self {
        ReadTx { inner }
    }

    /// Open a bucket, or `None` if it does not exist.
    pub fn bucket(&self, name: &str) -> Result<Option<ReadBucket>, Error> {
        match self.inner.open_table(table_def(name)) {
            Ok(table) => Ok(Some(ReadBucket::new(table))),
            Err(redb::TableError::TableDoesNotExist(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Names of all buckets, sorted, internal tables excluded.
    pub fn bucket_names(&self) -> Result<Vec<String>, Error> {
        let mut names: Vec<String> = self
            .inner
            .list_tables()?
            .map(|h| h.name().to_string())
            .filter(|n| n != SEQ_BUCKET)
            .collect();
        names.sort();
        Ok(names)
    }

    /// Clone this snapshot into a fresh store file at `path`.
    ///
    /// Concurrent readers and writers of the source are unaffected; the copy
    /// sees exactly this transaction's view. The hidden sequence table is
    /// carried so the copy is a full-fidelity replacement.
    pub fn copy_to(&self, path: &str) -> Result<(), Error> {
        let target = redb::Database::create(path)?;
        let out = target.begin_write()?;
        let handles: Vec<String> = self
            .inner
            .list_tables()?
            .map(|h| h.name().to_string())
            .collect();
        for name in &handles {
            let src = self.inner.open_table(table_def(name))?;
            let mut dst = out.open_table(table_def(name))?;
            for entry in src.range::<&[u8]>(..)? {
                let (k, v) = entry?;
                dst.insert(k.value(), v.value())?;
            }
        }
        out.commit()?;
        Ok(())
    }
}

/// The write transaction. All writes commit together or not at all.
pub struct WriteTx {
    inner: WriteTransaction,
}

impl WriteTx {
    pub(crate) fn new(inner: WriteTransaction) -> Self {
        WriteTx { inner }
    }

    pub(crate) fn into_inner(self) -> WriteTransaction {
        self.inner
    }

    /// True if a bucket with this name exists.
    pub fn bucket_exists(&self, name: &str) -> Result<bool, Error> {
        Ok(self.inner.list_tables()?.any(|h| h.name() == name))
    }

    /// Open a bucket for writing.
    ///
    /// With `create` set the bucket is created if absent (never for the
    /// reserved internal name); otherwise a missing bucket yields `None`.
    pub fn bucket(&self, name: &str, create: bool) -> Result<Option<WriteBucket<'_>>, Error> {
        if name == SEQ_BUCKET {
            return Ok(None);
        }
        if !create && !self.bucket_exists(name)? {
            return Ok(None);
        }
        let table = self.inner.open_table(table_def(name))?;
        Ok(Some(WriteBucket::new(table)))
    }

    /// Create a bucket. Errors if it already exists; callers wanting
    /// create-if-missing use [`WriteTx::bucket`] with `create`.
    pub fn create_bucket(&self, name: &str) -> Result<(), Error> {
        if self.bucket_exists(name)? {
            return Err(Error::Storage(format!("bucket already exists - {name}")));
        }
        self.inner.open_table(table_def(name))?;
        Ok(())
    }

    /// Delete a bucket. Missing buckets are ignored.
    pub fn delete_bucket(&self, name: &str) -> Result<(), Error> {
        if name == SEQ_BUCKET {
            return Ok(());
        }
        self.inner.delete_table(table_def(name))?;
        Ok(())
    }

    /// Names of all buckets, sorted, internal tables excluded.
    pub fn bucket_names(&self) -> Result<Vec<String>, Error> {
        let mut names: Vec<String> = self
            .inner
            .list_tables()?
            .map(|h| h.name().to_string())
            .filter(|n| n != SEQ_BUCKET)
            .collect();
        names.sort();
        Ok(names)
    }

    /// Key count of a bucket, or `None` if it does not exist.
    pub fn key_count(&self, name: &str) -> Result<Option<u64>, Error> {
        if !self.bucket_exists(name)? {
            return Ok(None);
        }
        let table = self.inner.open_table(table_def(name))?;
        Ok(Some(table.len()?))
    }

    /// Issue the next `count` sequence numbers for `bucket`.
    ///
    /// The counter starts at 1 and is monotonic across transactions (it is
    /// persisted with the same commit as the caller's writes).
    pub fn next_sequence(&self, bucket: &str, count: usize) -> Result<Vec<u64>, Error> {
        let mut table = self.inner.open_table(table_def(SEQ_BUCKET))?;
        let last = match table.get(bucket.as_bytes())? {
            Some(guard) => decode_u64(guard.value()),
            None => 0,
        };
        let seqs: Vec<u64> = (1..=count as u64).map(|i| last + i).collect();
        let new_last = last + count as u64;
        table.insert(bucket.as_bytes(), new_last.to_be_bytes().as_slice())?;
        Ok(seqs)
    }
}

fn decode_u64(raw: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    let n = raw.len().min(8);
    buf[8 - n..].copy_from_slice(&raw[raw.len() - n..]);
    u64::from_be_bytes(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;

    fn open() -> (tempfile::TempDir, Store) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path().join("t.cask")).unwrap();
        (dir, store)
    }

    #[test]
    fn sequence_is_monotonic_across_transactions() {
        let (_dir, store) = open();
        let first: Vec<u64> = store
            .update(|tx| -> Result<_, Error> { tx.next_sequence("orders", 3) })
            .unwrap();
        assert_eq!(first, vec![1, 2, 3]);
        let second: Vec<u64> = store
            .update(|tx| -> Result<_, Error> { tx.next_sequence("orders", 2) })
            .unwrap();
        assert_eq!(second, vec![4, 5]);
    }

    #[test]
    fn seq_bucket_is_hidden() {
        let (_dir, store) = open();
        store
            .update(|tx| -> Result<_, Error> {
                tx.next_sequence("orders", 1)?;
                tx.bucket("data", true)?.unwrap().put(b"k", b"v")?;
                Ok(())
            })
            .unwrap();
        let names: Vec<String> = store
            .view(|tx| -> Result<_, Error> { tx.bucket_names() })
            .unwrap();
        assert_eq!(names, vec!["data".to_string()]);
    }

    #[test]
    fn create_bucket_rejects_duplicates() {
        let (_dir, store) = open();
        store
            .update(|tx| -> Result<_, Error> { tx.create_bucket("b") })
            .unwrap();
        let err: Result<(), Error> = store.update(|tx| tx.create_bucket("b"));
        assert!(err.is_err());
        // delete is silent for missing buckets
        store
            .update(|tx| -> Result<_, Error> {
                tx.delete_bucket("b")?;
                tx.delete_bucket("never-existed")
            })
            .unwrap();
    }

    #[test]
    fn copy_to_clones_snapshot() {
        let (dir, store) = open();
        store
            .update(|tx| -> Result<_, Error> {
                let mut b = tx.bucket("data", true)?.unwrap();
                b.put(b"a", b"1")?;
                b.put(b"b", b"2")?;
                Ok(())
            })
            .unwrap();
        let copy_path = dir.path().join("copy.cask");
        store
            .view(|tx| -> Result<_, Error> { tx.copy_to(copy_path.to_str().unwrap()) })
            .unwrap();

        let copy = Store::open(&copy_path).unwrap();
        copy.view(|tx| -> Result<(), Error> {
            let b = tx.bucket("data")?.unwrap();
            assert_eq!(b.get(b"a")?.as_deref(), Some(b"1".as_slice()));
            assert_eq!(b.get(b"b")?.as_deref(), Some(b"2".as_slice()));
            Ok(())
        })
        .unwrap();
    }
}
