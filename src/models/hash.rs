use std::fmt;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

const HASH_LEN: usize = 32;

/// SHA-256 digest of a file's full byte stream, used as the key of every index
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContentHash([u8; HASH_LEN]);

impl ContentHash {
    pub const LEN: usize = HASH_LEN;

    pub const fn from_bytes(bytes: [u8; Self::LEN]) -> Self {
        Self(bytes)
    }

    /// Build a hash from a stored key, rejecting keys of the wrong length
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let array: [u8; Self::LEN] = bytes.try_into().map_err(|_| {
            Error::Decode(format!("hash key must be {} bytes, got {}", Self::LEN, bytes.len()))
        })?;
        Ok(Self(array))
    }

    /// Hash everything the reader yields
    pub fn of_reader(mut reader: impl Read) -> io::Result<Self> {
        let mut hasher = Sha256::new();
        io::copy(&mut reader, &mut hasher)?;
        Ok(Self(hasher.finalize().into()))
    }

    pub fn as_bytes(&self) -> &[u8; Self::LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Two-level shard directory under `root`: `<root>/<hex(b0)>/<hex(b1)>`
    pub fn shard_dir(&self, root: &Path) -> PathBuf {
        root.join(format!("{:02x}", self.0[0])).join(format!("{:02x}", self.0[1]))
    }

    /// File name of the materialized content: full hex hash plus `ext` (with its dot)
    pub fn file_name(&self, ext: &str) -> String {
        format!("{}{}", self.to_hex(), ext)
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", self.to_hex())
    }
}

impl FromStr for ContentHash {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut bytes = [0u8; Self::LEN];
        hex::decode_to_slice(s, &mut bytes)
            .map_err(|e| Error::InvalidArgument(format!("invalid content hash {s:?}: {e}")))?;
        Ok(Self(bytes))
    }
}

/// Reader adapter that hashes every byte passing through it
pub struct HashingReader<R> {
    inner: R,
    hasher: Sha256,
}

impl<R: Read> HashingReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, hasher: Sha256::new() }
    }

    /// Digest of the bytes read so far
    pub fn finish(self) -> ContentHash {
        ContentHash(self.hasher.finalize().into())
    }
}

impl<R: Read> Read for HashingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.hasher.update(&buf[..n]);
        Ok(n)
    }
}
