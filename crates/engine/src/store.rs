//! The store: one redb database file plus the view/update entry points.

use std::path::{Path, PathBuf};

use redb::Database;
use tracing::{debug, warn};

use crate::error::Error;
use crate::tx::{ReadTx, WriteTx};

/// Handle to one open database file.
///
/// `Store` is `Send + Sync`; the substrate serializes writers and lets
/// readers run against a consistent snapshot for the life of their
/// transaction.
pub struct Store {
    db: Database,
    path: PathBuf,
}

impl Store {
    /// Open the database file at `path`, creating it if absent.
    pub fn open(path: impl AsRef<Path>) -> Result<Store, Error> {
        let path = path.as_ref().to_path_buf();
        let db = Database::create(&path)?;
        debug!(target: "cask::engine", path = %path.display(), "store opened");
        Ok(Store { db, path })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `f` inside a read transaction. The closure sees a consistent
    /// snapshot; concurrent writers are not blocked.
    pub fn view<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&ReadTx) -> Result<T, E>,
        E: From<Error>,
    {
        let txn = self.db.begin_read().map_err(|e| E::from(e.into()))?;
        f(&ReadTx::new(txn))
    }

    /// Run `f` inside the write transaction. Commits iff `f` returns `Ok`;
    /// on `Err` every write made by the closure is rolled back and the error
    /// is returned unchanged.
    pub fn update<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&WriteTx) -> Result<T, E>,
        E: From<Error>,
    {
        let txn = self.db.begin_write().map_err(|e| E::from(e.into()))?;
        let tx = WriteTx::new(txn);
        match f(&tx) {
            Ok(out) => {
                tx.into_inner().commit().map_err(|e| E::from(e.into()))?;
                Ok(out)
            }
            Err(e) => {
                if let Err(abort_err) = tx.into_inner().abort() {
                    warn!(target: "cask::engine", error = %abort_err, "abort failed");
                }
                Err(e)
            }
        }
    }
}
