//! Storage container access.
//!
//! An HWP file is an OLE compound file: a small file system of storages
//! (directories) and streams (files). The decoder only needs to list a
//! storage and read a stream, so it goes through the [`Container`] trait.
//! [`CfbContainer`] backs it with a real compound file and
//! [`MemoryContainer`] with an in-memory map.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use cfb::CompoundFile;
use log::{debug, trace};

use crate::hwp::types::error::{HwpError, Result};
use crate::hwp::types::models::Entry;

/// Read access to the named entries of a document container.
pub trait Container {
    /// Lists the direct children of the storage at `parent` (`"/"` for the
    /// root), in container order.
    fn list_entries(&self, parent: &str) -> Result<Vec<Entry>>;

    /// Reads the whole stream at `path`.
    fn read_entry(&mut self, path: &str) -> Result<Vec<u8>>;

    fn exists(&self, path: &str) -> bool;
}

fn join(parent: &str, name: &str) -> String {
    format!("{}/{}", parent.trim_end_matches('/'), name)
}

fn unavailable(entry: &str, reason: impl ToString) -> HwpError {
    HwpError::Container {
        entry: entry.to_string(),
        reason: reason.to_string(),
    }
}

/// Compound file backed container.
pub struct CfbContainer<F> {
    inner: CompoundFile<F>,
}

impl<F: Read + Seek> CfbContainer<F> {
    /// Opens a compound file from any seekable reader.
    pub fn from_reader(reader: F) -> Result<Self> {
        let inner = CompoundFile::open(reader).map_err(|e| unavailable("/", e))?;
        Ok(Self { inner })
    }
}

impl<F: Read + Seek> Container for CfbContainer<F> {
    fn list_entries(&self, parent: &str) -> Result<Vec<Entry>> {
        let storage = self.inner.read_storage(parent).map_err(|e| unavailable(parent, e))?;
        let entries: Vec<Entry> = storage
            .map(|entry| Entry {
                name: entry.name().to_string(),
                path: join(parent, entry.name()),
                is_storage: entry.is_storage(),
            })
            .collect();
        trace!("{} holds {} entries", parent, entries.len());
        Ok(entries)
    }

    fn read_entry(&mut self, path: &str) -> Result<Vec<u8>> {
        let mut stream = self.inner.open_stream(path).map_err(|e| unavailable(path, e))?;
        let mut data = Vec::new();
        stream.read_to_end(&mut data)?;
        trace!("Read {} bytes from {}", data.len(), path);
        Ok(data)
    }

    fn exists(&self, path: &str) -> bool {
        self.inner.exists(path)
    }
}

/// Opens the compound file at `path`.
pub fn open_container(path: impl AsRef<Path>) -> Result<CfbContainer<File>> {
    let path = path.as_ref();
    debug!("Opening container {}", path.display());
    let file = File::open(path)?;
    CfbContainer::from_reader(file)
}

/// Container holding its streams in memory, keyed by absolute path.
///
/// Storages exist implicitly as prefixes of stream paths.
#[derive(Debug, Clone, Default)]
pub struct MemoryContainer {
    streams: BTreeMap<String, Vec<u8>>,
}

impl MemoryContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) the stream at `path`; a leading `/` is optional.
    pub fn insert(&mut self, path: &str, data: impl Into<Vec<u8>>) {
        self.streams.insert(Self::normalize(path), data.into());
    }

    pub fn with_stream(mut self, path: &str, data: impl Into<Vec<u8>>) -> Self {
        self.insert(path, data);
        self
    }

    fn normalize(path: &str) -> String {
        format!("/{}", path.trim_matches('/'))
    }

    fn storage_prefix(parent: &str) -> String {
        let parent = Self::normalize(parent);
        if parent == "/" {
            parent
        } else {
            format!("{}/", parent)
        }
    }
}

impl Container for MemoryContainer {
    fn list_entries(&self, parent: &str) -> Result<Vec<Entry>> {
        let prefix = Self::storage_prefix(parent);
        let mut entries: Vec<Entry> = Vec::new();
        for path in self.streams.keys() {
            let Some(rest) = path.strip_prefix(&prefix) else {
                continue;
            };
            let (name, is_storage) = match rest.split_once('/') {
                Some((storage, _)) => (storage, true),
                None => (rest, false),
            };
            if entries.last().map(|last| last.name.as_str()) != Some(name) {
                entries.push(Entry {
                    name: name.to_string(),
                    path: join(&prefix, name),
                    is_storage,
                });
            }
        }

        if entries.is_empty() && prefix != "/" {
            return Err(unavailable(parent, "no such storage"));
        }
        Ok(entries)
    }

    fn read_entry(&mut self, path: &str) -> Result<Vec<u8>> {
        self.streams
            .get(&Self::normalize(path))
            .cloned()
            .ok_or_else(|| unavailable(path, "no such stream"))
    }

    fn exists(&self, path: &str) -> bool {
        let path = Self::normalize(path);
        let prefix = Self::storage_prefix(&path);
        path == "/" || self.streams.contains_key(&path) || self.streams.keys().any(|key| key.starts_with(&prefix))
    }
}
