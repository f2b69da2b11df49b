use redb::{
    ReadOnlyTable, ReadTransaction, ReadableTable, TableDefinition, TableError, TableHandle,
    WriteTransaction,
};
use tracing::debug;

use super::namespace::{HashTable, Namespace, ReadOnlyHashTable};
use crate::error::{Error, Result, require_non_empty};

/// Registry of every index: index name -> name of its hashes table
pub(crate) const REGISTRY: TableDefinition<&str, &str> = TableDefinition::new("indexes");

fn hashes_table_name(index: &str) -> String {
    format!("index/{index}/hashes")
}

fn hashes_definition(table_name: &str) -> TableDefinition<'_, &'static [u8], &'static [u8]> {
    TableDefinition::new(table_name)
}

fn missing_hashes(index: &str, table_name: &str) -> Error {
    Error::IndexMalformed {
        name: index.to_string(),
        reason: format!("missing hashes namespace {table_name:?}"),
    }
}

/// Read-only snapshot of the store
pub struct ReadTxn {
    txn: ReadTransaction,
}

impl ReadTxn {
    pub(crate) fn new(txn: ReadTransaction) -> Self {
        Self { txn }
    }

    /// The registry table, or `None` for a store that has never had it created
    fn registry(&self) -> Result<Option<ReadOnlyTable<&'static str, &'static str>>> {
        match self.txn.open_table(REGISTRY) {
            Ok(table) => Ok(Some(table)),
            Err(TableError::TableDoesNotExist(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn exists(&self, index: &str) -> Result<bool> {
        match self.registry()? {
            Some(registry) => Ok(registry.get(index)?.is_some()),
            None => Ok(false),
        }
    }

    /// All index names in ascending order
    pub fn index_names(&self) -> Result<Vec<String>> {
        let Some(registry) = self.registry()? else {
            return Ok(Vec::new());
        };

        let mut names = Vec::new();
        for item in registry.iter()? {
            let (name, _) = item?;
            names.push(name.value().to_string());
        }
        Ok(names)
    }

    /// Open an index's hashes namespace
    ///
    /// Fails with [`Error::IndexNotFound`] if the index is not registered and with
    /// [`Error::IndexMalformed`] if it is registered but its hashes table is gone.
    pub fn namespace(&self, index: &str) -> Result<Namespace<ReadOnlyHashTable>> {
        require_non_empty(index, "index name")?;

        let table_name = self
            .registry()?
            .map(|registry| -> Result<Option<String>> {
                Ok(registry.get(index)?.map(|guard| guard.value().to_string()))
            })
            .transpose()?
            .flatten()
            .ok_or_else(|| Error::IndexNotFound(index.to_string()))?;

        match self.txn.open_table(hashes_definition(&table_name)) {
            Ok(table) => Ok(Namespace::new(index, table)),
            Err(TableError::TableDoesNotExist(_)) => Err(missing_hashes(index, &table_name)),
            Err(e) => Err(e.into()),
        }
    }
}

/// Exclusive read-write transaction
pub struct WriteTxn {
    txn: WriteTransaction,
}

impl WriteTxn {
    pub(crate) fn new(txn: WriteTransaction) -> Self {
        Self { txn }
    }

    pub(crate) fn into_inner(self) -> WriteTransaction {
        self.txn
    }

    fn registered_table(&self, index: &str) -> Result<Option<String>> {
        let registry = self.txn.open_table(REGISTRY)?;
        let table_name = registry.get(index)?.map(|guard| guard.value().to_string());
        Ok(table_name)
    }

    pub fn exists(&self, index: &str) -> Result<bool> {
        Ok(self.registered_table(index)?.is_some())
    }

    pub fn index_names(&self) -> Result<Vec<String>> {
        let registry = self.txn.open_table(REGISTRY)?;
        let mut names = Vec::new();
        for item in registry.iter()? {
            let (name, _) = item?;
            names.push(name.value().to_string());
        }
        Ok(names)
    }

    /// Open an index's hashes namespace, creating the index if it doesn't exist yet
    pub fn namespace(&self, index: &str) -> Result<Namespace<HashTable<'_>>> {
        require_non_empty(index, "index name")?;

        let table_name = match self.registered_table(index)? {
            Some(name) => name,
            None => {
                let name = hashes_table_name(index);
                let mut registry = self.txn.open_table(REGISTRY)?;
                registry.insert(index, name.as_str())?;
                debug!(index, "index created");
                name
            }
        };

        let table = self.txn.open_table(hashes_definition(&table_name))?;
        Ok(Namespace::new(index, table))
    }

    /// Open an index that must already exist, with the same failure rules as a read
    ///
    /// Used for inputs that a write must never create as a side effect.
    pub fn existing_namespace(&self, index: &str) -> Result<Namespace<HashTable<'_>>> {
        require_non_empty(index, "index name")?;

        let table_name =
            self.registered_table(index)?.ok_or_else(|| Error::IndexNotFound(index.to_string()))?;

        let present = self.txn.list_tables()?.any(|handle| handle.name() == table_name);
        if !present {
            return Err(missing_hashes(index, &table_name));
        }

        let table = self.txn.open_table(hashes_definition(&table_name))?;
        Ok(Namespace::new(index, table))
    }

    /// Remove an index wholesale
    pub fn delete(&self, index: &str) -> Result<()> {
        require_non_empty(index, "index name")?;

        let table_name = {
            let mut registry = self.txn.open_table(REGISTRY)?;
            let removed = registry.remove(index)?.map(|guard| guard.value().to_string());
            removed
        }
        .ok_or_else(|| Error::IndexNotFound(index.to_string()))?;

        self.txn.delete_table(hashes_definition(&table_name))?;
        debug!(index, "index removed from store");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use tempfile::TempDir;

    use super::*;
    use crate::models::{ContentHash, Entry};
    use crate::store::Store;

    fn store() -> (TempDir, Store) {
        let dir = TempDir::new().unwrap();
        let store = Store::initialize(dir.path().join("venndex.db")).unwrap();
        (dir, store)
    }

    #[test]
    fn test_read_namespace_missing_index() {
        let (_dir, store) = store();
        let err = store.read(|tx| tx.namespace("ghost").map(|_| ())).unwrap_err();
        assert!(matches!(err, Error::IndexNotFound(name) if name == "ghost"));
    }

    #[test]
    fn test_read_namespace_malformed_index() {
        let (_dir, store) = store();

        // Registered without a hashes table
        store
            .write(|tx| {
                let mut registry = tx.txn.open_table(REGISTRY)?;
                registry.insert("broken", "index/broken/hashes")?;
                Ok(())
            })
            .unwrap();

        assert!(store.exists("broken").unwrap());
        let err = store.read(|tx| tx.namespace("broken").map(|_| ())).unwrap_err();
        assert!(matches!(err, Error::IndexMalformed { ref name, .. } if name == "broken"));

        let err = store.write(|tx| tx.existing_namespace("broken").map(|_| ())).unwrap_err();
        assert!(matches!(err, Error::IndexMalformed { .. }));
    }

    #[test]
    fn test_existing_namespace_does_not_create() {
        let (_dir, store) = store();
        let err = store.write(|tx| tx.existing_namespace("ghost").map(|_| ())).unwrap_err();
        assert!(matches!(err, Error::IndexNotFound(_)));
        assert!(!store.exists("ghost").unwrap());
    }

    #[test]
    fn test_empty_index_name_rejected() {
        let (_dir, store) = store();
        let err = store.write(|tx| tx.namespace("").map(|_| ())).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        let err = store.read(|tx| tx.namespace("").map(|_| ())).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_index_names_sorted() {
        let (_dir, store) = store();
        let entry = Entry::new(1, Utc::now(), "text/plain").with_path("/x");
        store
            .write(|tx| {
                for name in ["zeta", "alpha", "mid"] {
                    tx.namespace(name)?.put(&ContentHash::from_bytes([1; 32]), &entry)?;
                }
                Ok(())
            })
            .unwrap();

        let names = store.read(|tx| tx.index_names()).unwrap();
        assert_eq!(names, vec!["alpha", "mid", "zeta"]);
        let names = store.write(|tx| tx.index_names()).unwrap();
        assert_eq!(names, vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn test_namespace_created_empty_in_write() {
        let (_dir, store) = store();
        store.write(|tx| tx.namespace("empty").map(|_| ())).unwrap();

        assert!(store.exists("empty").unwrap());
        let len = store.read(|tx| tx.namespace("empty")?.len()).unwrap();
        assert_eq!(len, 0);
    }
}
