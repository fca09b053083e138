//! On-disk format of a sealed vocabulary store.
//!
//! Layout: `[magic: 8][version: u16 LE][body_len: u64 LE][blake3(body): 32][body]`.
//! The body is the bincode encoding of every field with its terms sorted, so the
//! same statistics always produce the same bytes.

use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use std::path::Path;

use atomic_write_file::AtomicWriteFile;
use bincode::config::{self, Config};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::constants::{MAX_STORE_BODY_BYTES, STORE_FORMAT_VERSION, STORE_HEADER_SIZE, STORE_MAGIC};
use crate::store::{FieldStats, TermStats, VocabularyStore};
use crate::{GramstatError, Result};

#[derive(Debug, Serialize, Deserialize)]
struct StoreBody {
    fields: Vec<FieldRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct FieldRecord {
    name: String,
    signature: Option<String>,
    terms: Vec<(String, TermStats)>,
}

fn store_config() -> impl Config {
    config::standard()
        .with_fixed_int_encoding()
        .with_little_endian()
}

fn invalid(reason: impl Into<std::borrow::Cow<'static, str>>) -> GramstatError {
    GramstatError::InvalidStoreFile {
        reason: reason.into(),
    }
}

/// Serializes a sealed store into its file representation.
pub(crate) fn encode_store(store: &VocabularyStore) -> Result<Vec<u8>> {
    if !store.is_sealed() {
        return Err(GramstatError::StoreNotSealed);
    }
    let fields = store
        .field_stats()
        .iter()
        .map(|(name, stats)| {
            let mut terms: Vec<(String, TermStats)> = stats
                .terms
                .iter()
                .map(|(term, entry)| (term.clone(), *entry))
                .collect();
            terms.sort_unstable_by(|a, b| a.0.cmp(&b.0));
            FieldRecord {
                name: name.clone(),
                signature: stats.signature.clone(),
                terms,
            }
        })
        .collect();
    let body = bincode::serde::encode_to_vec(&StoreBody { fields }, store_config())?;
    let checksum: [u8; 32] = blake3::hash(&body).into();

    let mut bytes = Vec::with_capacity(STORE_HEADER_SIZE + body.len());
    bytes.extend_from_slice(&STORE_MAGIC);
    bytes.extend_from_slice(&STORE_FORMAT_VERSION.to_le_bytes());
    bytes.extend_from_slice(&(body.len() as u64).to_le_bytes());
    bytes.extend_from_slice(&checksum);
    bytes.extend_from_slice(&body);
    Ok(bytes)
}

/// Parses and verifies a store file. The returned store is sealed.
pub(crate) fn decode_store(bytes: &[u8]) -> Result<VocabularyStore> {
    if bytes.len() < STORE_HEADER_SIZE {
        return Err(invalid("file too small to contain a header"));
    }
    let (magic, rest) = bytes.split_at(STORE_MAGIC.len());
    if magic != STORE_MAGIC {
        return Err(invalid("bad magic"));
    }
    let (version, rest) = rest.split_at(2);
    let version = u16::from_le_bytes([version[0], version[1]]);
    if version != STORE_FORMAT_VERSION {
        return Err(invalid(format!(
            "unsupported format version {version} (expected {STORE_FORMAT_VERSION})"
        )));
    }
    let (length, rest) = rest.split_at(8);
    let mut length_bytes = [0u8; 8];
    length_bytes.copy_from_slice(length);
    let body_len = u64::from_le_bytes(length_bytes);
    if body_len > MAX_STORE_BODY_BYTES {
        return Err(invalid("body exceeds safety limit"));
    }
    let (checksum, body) = rest.split_at(32);
    if body.len() as u64 != body_len {
        return Err(invalid(format!(
            "body length mismatch: header says {body_len}, found {}",
            body.len()
        )));
    }
    let actual: [u8; 32] = blake3::hash(body).into();
    if actual.as_slice() != checksum {
        return Err(invalid("body checksum mismatch"));
    }

    let (decoded, consumed): (StoreBody, usize) =
        bincode::serde::decode_from_slice(body, store_config())?;
    if consumed != body.len() {
        return Err(invalid("trailing bytes after body"));
    }

    let mut fields = BTreeMap::new();
    for record in decoded.fields {
        let terms: HashMap<String, TermStats> = record.terms.into_iter().collect();
        let stats = FieldStats {
            signature: record.signature,
            terms,
        };
        if fields.insert(record.name.clone(), stats).is_some() {
            return Err(invalid(format!("field `{}` appears twice", record.name)));
        }
    }
    Ok(VocabularyStore::from_fields(fields))
}

impl VocabularyStore {
    /// Writes the sealed store to `path` through an atomic rename.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let bytes = encode_store(self)?;
        let mut atomic = AtomicWriteFile::options().open(path)?;
        {
            let file = atomic.as_file_mut();
            file.write_all(&bytes)?;
            file.flush()?;
            file.sync_all()?;
        }
        atomic.commit()?;
        info!(
            store.path = %path.display(),
            store.bytes = bytes.len(),
            store.fields = self.field_stats().len(),
            "vocabulary store saved"
        );
        Ok(())
    }

    /// Loads a store written by [`save`](Self::save).
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs_err::read(path)?;
        let store = decode_store(&bytes)?;
        info!(
            store.path = %path.display(),
            store.fields = store.field_stats().len(),
            "vocabulary store opened"
        );
        Ok(store)
    }
}
