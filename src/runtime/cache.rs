//! Optional on-disk cache for acquisition payloads, keyed by URN.
//!
//! Writes are idempotent single-file overwrites; a stale entry is simply
//! replaced on the next import.

use crate::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn entry_path(&self, urn: &str, extension: &str) -> PathBuf {
        self.dir.join(format!("{}.{extension}", sanitize_key(urn)))
    }

    pub fn read(&self, urn: &str, extension: &str) -> Option<String> {
        let path = self.entry_path(urn, extension);
        fs::read_to_string(&path).ok()
    }

    pub fn write(&self, urn: &str, extension: &str, payload: &str) -> Result<()> {
        let path = self.entry_path(urn, extension);
        fs::write(&path, payload)?;
        Ok(())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// URNs contain `:` and `;`, which are not filename-safe everywhere.
fn sanitize_key(urn: &str) -> String {
    urn.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
