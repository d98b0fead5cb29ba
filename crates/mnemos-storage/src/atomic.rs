// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Crash-safe whole-file replacement.
//!
//! Every persisted file is rewritten in full: the bytes go to a temporary
//! file in the same directory, are synced, and the temporary file is renamed
//! over the target. Readers see either the old or the new contents.

use std::io::Write;
use std::path::Path;

use mnemos_core::MnemosError;
use tempfile::NamedTempFile;

/// Atomically replace `path` with `bytes`, creating parent directories as needed.
pub fn atomic_write(path: &Path, bytes: &[u8]) -> Result<(), MnemosError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(MnemosError::storage)?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(MnemosError::storage)?;
    tmp.write_all(bytes).map_err(MnemosError::storage)?;
    tmp.as_file().sync_all().map_err(MnemosError::storage)?;
    tmp.persist(path)
        .map_err(|e| MnemosError::storage(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_existing_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        atomic_write(&path, b"first").unwrap();
        atomic_write(&path, b"second").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"second");
    }

    #[test]
    fn creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/file.bin");
        atomic_write(&path, &[1, 2, 3]).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn leaves_no_temporary_files_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("only.json");
        atomic_write(&path, b"[]").unwrap();
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }
}
