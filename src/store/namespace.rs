use redb::{ReadOnlyTable, ReadableTable, ReadableTableMetadata, Table};

use crate::error::{Error, Result};
use crate::models::{ContentHash, Entry};

/// Hashes table opened inside a write transaction
pub type HashTable<'txn> = Table<'txn, &'static [u8], &'static [u8]>;

/// Hashes table opened inside a read transaction
pub type ReadOnlyHashTable = ReadOnlyTable<&'static [u8], &'static [u8]>;

/// One index's `hash -> Entry` keyspace
pub struct Namespace<T> {
    index: String,
    table: T,
}

impl<T> Namespace<T> {
    pub(crate) fn new(index: &str, table: T) -> Self {
        Self { index: index.to_string(), table }
    }

    /// Name of the index this namespace belongs to
    pub fn index(&self) -> &str {
        &self.index
    }
}

impl<T> Namespace<T>
where
    T: ReadableTable<&'static [u8], &'static [u8]> + ReadableTableMetadata,
{
    /// Encoded entry bytes, without decoding them
    pub fn get_raw(&self, hash: &ContentHash) -> Result<Option<Vec<u8>>> {
        Ok(self.table.get(&hash.as_bytes()[..])?.map(|guard| guard.value().to_vec()))
    }

    pub fn get(&self, hash: &ContentHash) -> Result<Option<Entry>> {
        match self.table.get(&hash.as_bytes()[..])? {
            Some(guard) => Entry::decode(guard.value()).map(Some),
            None => Ok(None),
        }
    }

    pub fn contains(&self, hash: &ContentHash) -> Result<bool> {
        Ok(self.table.get(&hash.as_bytes()[..])?.is_some())
    }

    pub fn len(&self) -> Result<u64> {
        Ok(self.table.len()?)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Encoded entries in ascending hash order
    pub fn raw_entries(&self) -> Result<impl Iterator<Item = Result<(ContentHash, Vec<u8>)>> + '_> {
        let range = self.table.iter()?;
        Ok(range.map(|item| {
            let (key, value) = item?;
            Ok((ContentHash::from_slice(key.value())?, value.value().to_vec()))
        }))
    }

    /// Decoded entries in ascending hash order
    pub fn entries(&self) -> Result<impl Iterator<Item = Result<(ContentHash, Entry)>> + '_> {
        let range = self.table.iter()?;
        Ok(range.map(|item| {
            let (key, value) = item?;
            Ok((ContentHash::from_slice(key.value())?, Entry::decode(value.value())?))
        }))
    }
}

impl Namespace<HashTable<'_>> {
    /// Encode and store an entry, replacing whatever was stored under `hash`
    pub fn put(&mut self, hash: &ContentHash, entry: &Entry) -> Result<()> {
        let bytes = entry.encode()?;
        self.put_raw(hash, &bytes)
    }

    /// Store already-encoded entry bytes, e.g. when copying between indexes verbatim
    pub fn put_raw(&mut self, hash: &ContentHash, bytes: &[u8]) -> Result<()> {
        if bytes.is_empty() {
            return Err(Error::InvalidEntry(format!("empty entry bytes for {hash}")));
        }
        self.table.insert(&hash.as_bytes()[..], bytes)?;
        Ok(())
    }
}
