// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Binary vector index file.
//!
//! Layout (all integers little-endian):
//!
//! ```text
//! magic     4 bytes  "MNIX"
//! version   u32      1
//! dimension u32
//! count     u64
//! rows      count * dimension * f32
//! ```
//!
//! Row `i` is the embedding of fact `i`.

use std::path::{Path, PathBuf};

use mnemos_core::MnemosError;

use crate::atomic::atomic_write;

const MAGIC: &[u8; 4] = b"MNIX";
const VERSION: u32 = 1;
const HEADER_LEN: usize = 4 + 4 + 4 + 8;

/// Decoded contents of an index file.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredIndex {
    pub dimension: usize,
    /// Row-major vectors, `count() * dimension` values.
    pub data: Vec<f32>,
}

impl StoredIndex {
    /// Number of rows.
    pub fn count(&self) -> usize {
        if self.dimension == 0 {
            0
        } else {
            self.data.len() / self.dimension
        }
    }

    /// Row `i`, if present.
    pub fn row(&self, i: usize) -> Option<&[f32]> {
        let start = i.checked_mul(self.dimension)?;
        self.data.get(start..start + self.dimension)
    }
}

/// Serialize rows into the on-disk layout.
pub fn encode_index(dimension: usize, data: &[f32]) -> Vec<u8> {
    let count = if dimension == 0 { 0 } else { data.len() / dimension };
    let mut out = Vec::with_capacity(HEADER_LEN + data.len() * 4);
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&VERSION.to_le_bytes());
    out.extend_from_slice(&(dimension as u32).to_le_bytes());
    out.extend_from_slice(&(count as u64).to_le_bytes());
    out.extend(data.iter().flat_map(|f| f.to_le_bytes()));
    out
}

/// Parse the on-disk layout, rejecting truncated or trailing bytes.
pub fn decode_index(bytes: &[u8]) -> Result<StoredIndex, String> {
    if bytes.len() < HEADER_LEN {
        return Err(format!("file is {} bytes, shorter than the header", bytes.len()));
    }
    if &bytes[0..4] != MAGIC {
        return Err("bad magic".to_string());
    }
    let version = read_u32(&bytes[4..8]);
    if version != VERSION {
        return Err(format!("unsupported version {version}"));
    }
    let dimension = read_u32(&bytes[8..12]) as usize;
    let count = u64::from_le_bytes(
        bytes[12..20]
            .try_into()
            .map_err(|_| "truncated header".to_string())?,
    ) as usize;

    let expected = count
        .checked_mul(dimension)
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(|| "row count overflows".to_string())?;
    let body = &bytes[HEADER_LEN..];
    if body.len() != expected {
        return Err(format!(
            "expected {expected} bytes for {count} rows of dimension {dimension}, found {}",
            body.len()
        ));
    }

    let data = body
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect();
    Ok(StoredIndex { dimension, data })
}

fn read_u32(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

/// Handle to the index file on disk.
#[derive(Debug, Clone)]
pub struct IndexFile {
    path: PathBuf,
}

impl IndexFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    pub fn load_blocking(&self) -> Result<Option<StoredIndex>, MnemosError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(MnemosError::storage(e)),
        };
        decode_index(&bytes)
            .map(Some)
            .map_err(|message| MnemosError::StorageCorruption {
                path: self.path.clone(),
                message,
            })
    }

    pub async fn load(&self) -> Result<Option<StoredIndex>, MnemosError> {
        let file = self.clone();
        tokio::task::spawn_blocking(move || file.load_blocking())
            .await
            .map_err(|e| MnemosError::Internal(format!("index load task failed: {e}")))?
    }

    /// Encodes on the calling task, writes on the blocking pool.
    pub async fn save(&self, dimension: usize, data: &[f32]) -> Result<(), MnemosError> {
        let bytes = encode_index(dimension, data);
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || atomic_write(&path, &bytes))
            .await
            .map_err(|e| MnemosError::Internal(format!("index save task failed: {e}")))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_records_dimension_and_count() {
        let bytes = encode_index(3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(&bytes[0..4], b"MNIX");
        assert_eq!(bytes.len(), HEADER_LEN + 6 * 4);
        let decoded = decode_index(&bytes).unwrap();
        assert_eq!(decoded.dimension, 3);
        assert_eq!(decoded.count(), 2);
        assert_eq!(decoded.row(1), Some(&[4.0, 5.0, 6.0][..]));
        assert_eq!(decoded.row(2), None);
    }

    #[test]
    fn empty_index_is_valid() {
        let decoded = decode_index(&encode_index(384, &[])).unwrap();
        assert_eq!(decoded.dimension, 384);
        assert_eq!(decoded.count(), 0);
    }

    #[test]
    fn truncated_body_is_rejected() {
        let mut bytes = encode_index(2, &[1.0, 2.0]);
        bytes.pop();
        assert!(decode_index(&bytes).unwrap_err().contains("expected"));
    }

    #[test]
    fn wrong_magic_is_rejected() {
        let mut bytes = encode_index(2, &[1.0, 2.0]);
        bytes[0] = b'X';
        assert_eq!(decode_index(&bytes).unwrap_err(), "bad magic");
    }

    #[test]
    fn missing_file_loads_as_none_and_garbage_as_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let file = IndexFile::new(dir.path().join("knowledge.index"));
        assert!(file.load_blocking().unwrap().is_none());

        std::fs::write(file.path(), b"garbage").unwrap();
        assert!(matches!(
            file.load_blocking(),
            Err(MnemosError::StorageCorruption { .. })
        ));
    }
}
