use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use redb::Database;
use tracing::{debug, info, warn};

use super::transaction::{REGISTRY, ReadTxn, WriteTxn};
use crate::error::{Error, IoResultExt, Result};

/// Handle to an opened venndex store
///
/// There is no global store; every operation takes the handle explicitly.
pub struct Store {
    db: Database,
    path: PathBuf,
}

impl Store {
    /// Create a brand-new, empty store at `path`
    ///
    /// Fails with [`Error::AlreadyInitialized`] if anything already exists there.
    pub fn initialize(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let file = match OpenOptions::new().read(true).write(true).create_new(true).open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(Error::AlreadyInitialized(path.to_path_buf()));
            }
            Err(e) => return Err(Error::io(path, e)),
        };

        let db = match Database::builder().create_file(file) {
            Ok(db) => db,
            Err(e) => {
                // Don't leave a zero-length file that would make the next init fail
                if let Err(remove_err) = fs::remove_file(path) {
                    warn!(path = %path.display(), error = %remove_err, "failed to remove partial store");
                }
                return Err(e.into());
            }
        };

        let txn = db.begin_write()?;
        {
            txn.open_table(REGISTRY)?;
        }
        txn.commit()?;

        info!(path = %path.display(), "store created");
        Ok(Self { db, path: path.to_path_buf() })
    }

    /// Open an existing store, failing with [`Error::NotInitialized`] if there is none
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.try_exists().at_path(path)? {
            return Err(Error::NotInitialized(path.to_path_buf()));
        }

        let db = Database::open(path)?;
        debug!(path = %path.display(), "store opened");
        Ok(Self { db, path: path.to_path_buf() })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `body` against a consistent read-only snapshot
    pub fn read<T>(&self, body: impl FnOnce(&ReadTxn) -> Result<T>) -> Result<T> {
        let txn = ReadTxn::new(self.db.begin_read()?);
        body(&txn)
    }

    /// Run `body` with exclusive write access
    ///
    /// Everything written inside `body` is committed together when it returns `Ok` and
    /// discarded when it returns `Err`.
    pub fn write<T>(&self, body: impl FnOnce(&WriteTxn) -> Result<T>) -> Result<T> {
        let txn = WriteTxn::new(self.db.begin_write()?);
        match body(&txn) {
            Ok(value) => {
                txn.into_inner().commit()?;
                Ok(value)
            }
            Err(err) => {
                if let Err(abort_err) = txn.into_inner().abort() {
                    warn!(error = %abort_err, "failed to abort write transaction");
                }
                Err(err)
            }
        }
    }

    /// Non-failing-on-absence existence check for an index
    pub fn exists(&self, index: &str) -> Result<bool> {
        self.read(|tx| tx.exists(index))
    }

    /// Remove an index and all of its entries
    pub fn delete(&self, index: &str) -> Result<()> {
        self.write(|tx| tx.delete(index))?;
        info!(index, "index deleted");
        Ok(())
    }
}
