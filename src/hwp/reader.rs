use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use std::thread;

use log::{debug, info, warn};

use super::codec::canonicalize;
use super::container::{open_container, CfbContainer, Container};
use super::format::file_header;
use super::format::tree::{build_tree, SectionTree};
use super::iter::SectionIter;
use super::types::error::{HwpError, Result};
use super::types::models::*;
use super::utils;

const BODY_STORAGE: &str = "/BodyText";
const VIEW_STORAGE: &str = "/ViewText";
const BIN_DATA_STORAGE: &str = "/BinData";

/// The main reader for HWP 5 documents.
///
/// Opening a reader parses only the `FileHeader`; every other stream is
/// fetched, decrypted, inflated and decoded on demand. The container sits
/// behind a mutex so that all accessors take `&self`.
pub struct HwpReader<C: Container> {
    container: Mutex<C>,
    header: FileHeader,
    options: ReaderOptions,
}

impl HwpReader<CfbContainer<File>> {
    /// Opens the HWP file at `path`.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The file cannot be opened or is not a compound file
    /// - The `FileHeader` stream is missing, too short or badly signed
    /// - The document is password protected or not format version 5
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening HWP file: {}", path.display());
        Self::from_container(open_container(path)?)
    }

    /// Reads only the file header, without rejecting password-protected
    /// documents. Useful to inspect flags before deciding to decode.
    pub fn detect(path: impl AsRef<Path>) -> Result<FileHeader> {
        let mut container = open_container(path)?;
        read_file_header(&mut container)
    }
}

impl<C: Container> HwpReader<C> {
    /// Wraps an already opened container.
    ///
    /// # Errors
    /// `HwpError::UnsupportedFormat` for password-protected documents; no
    /// stream other than `FileHeader` is read in that case.
    pub fn from_container(mut container: C) -> Result<Self> {
        let header = read_file_header(&mut container)?;
        if header.is_password_protected() {
            return Err(HwpError::UnsupportedFormat(
                "Password-protected documents are not supported".to_string(),
            ));
        }
        Ok(Self {
            container: Mutex::new(container),
            header,
            options: ReaderOptions::default(),
        })
    }

    pub fn with_options(mut self, options: ReaderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    pub fn options(&self) -> &ReaderOptions {
        &self.options
    }

    fn read_raw(&self, path: &str) -> Result<Vec<u8>> {
        let mut container = self.container.lock().map_err(|_| HwpError::LockPoisoned)?;
        container.read_entry(path)
    }

    fn list(&self, parent: &str) -> Result<Vec<Entry>> {
        let container = self.container.lock().map_err(|_| HwpError::LockPoisoned)?;
        container.list_entries(parent)
    }

    fn exists(&self, path: &str) -> Result<bool> {
        let container = self.container.lock().map_err(|_| HwpError::LockPoisoned)?;
        Ok(container.exists(path))
    }

    /// Reads a stream and applies the transforms its role requires.
    ///
    /// Errors carry the stream path.
    pub fn read_stream(&self, role: &StreamRole) -> Result<Vec<u8>> {
        let path = role.path();
        let raw = self.read_raw(&path).map_err(|e| e.in_stream(&path))?;
        canonicalize(&raw, role.transform_flags(&self.header)).map_err(|e| e.in_stream(&path))
    }

    /// Decodes the DocInfo stream.
    pub fn doc_info(&self) -> Result<SectionTree> {
        let role = StreamRole::DocInfo;
        let data = self.read_stream(&role)?;
        build_tree(&data, self.header.version).map_err(|e| e.in_stream(role.path()))
    }

    /// Section streams in numeric order: ViewText sections for
    /// distributable documents, BodyText sections otherwise.
    pub fn section_roles(&self) -> Result<Vec<StreamRole>> {
        let distributable = self.header.is_distributable();
        let storage = if distributable { VIEW_STORAGE } else { BODY_STORAGE };
        if !self.exists(storage)? {
            debug!("{} is missing; document has no sections", storage);
            return Ok(Vec::new());
        }

        let mut indices: Vec<usize> = Vec::new();
        for entry in self.list(storage)? {
            if entry.is_storage {
                continue;
            }
            match utils::section_index(&entry.name) {
                Some(index) => indices.push(index),
                None => warn!("Ignoring unexpected entry {} in {}", entry.name, storage),
            }
        }
        indices.sort_unstable();
        debug!("{} holds {} sections", storage, indices.len());

        Ok(indices
            .into_iter()
            .map(|index| {
                if distributable {
                    StreamRole::ViewSection(index)
                } else {
                    StreamRole::BodySection(index)
                }
            })
            .collect())
    }

    /// Section stream names, e.g. `["Section0", "Section1"]`.
    pub fn section_names(&self) -> Result<Vec<String>> {
        Ok(self
            .section_roles()?
            .iter()
            .filter_map(StreamRole::section_index)
            .map(section_name)
            .collect())
    }

    /// Reads and decodes one section stream.
    pub fn read_section(&self, role: &StreamRole) -> Result<Section> {
        let index = role.section_index().ok_or_else(|| {
            HwpError::InvalidFormat(format!("{} is not a section stream", role))
        })?;
        let data = self.read_stream(role)?;
        let tree = build_tree(&data, self.header.version).map_err(|e| e.in_stream(role.path()))?;
        Ok(Section {
            index,
            name: section_name(index),
            tree,
        })
    }

    /// Pull iterator decoding one section per step.
    pub fn iter_sections(&self) -> Result<SectionIter<'_, C>> {
        Ok(SectionIter::new(self, self.section_roles()?))
    }

    /// Decodes the whole document.
    ///
    /// Raw section bytes are read one after another through the container;
    /// decoding then runs on at most `available_parallelism()` scoped
    /// threads when `parallel_sections` is set, each taking a contiguous
    /// run of sections.
    ///
    /// # Errors
    /// Fails if DocInfo cannot be decoded or a worker thread cannot be
    /// started. A missing section storage yields a document without sections.
    /// A failing section is recorded in `failed_sections` unless
    /// `tolerate_section_errors` is off, in which case it aborts the call.
    pub fn read_document(&self) -> Result<Document> {
        let doc_info = self.doc_info()?;
        let roles = self.section_roles()?;
        let header = &self.header;
        let version = header.version;

        let raw_sections: Vec<(StreamRole, Result<Vec<u8>>)> = roles
            .into_iter()
            .map(|role| {
                let raw = self.read_raw(&role.path());
                (role, raw)
            })
            .collect();

        let decode = |role: &StreamRole, raw: Result<Vec<u8>>| -> Result<SectionTree> {
            let data = canonicalize(&raw?, role.transform_flags(header))?;
            build_tree(&data, version)
        };

        let decoded: Vec<(StreamRole, Result<SectionTree>)> = if self.options.parallel_sections && raw_sections.len() > 1 {
            decode_on_workers(raw_sections, &decode)?
        } else {
            raw_sections
                .into_iter()
                .map(|(role, raw)| {
                    let result = decode(&role, raw);
                    (role, result)
                })
                .collect()
        };

        let mut sections = Vec::new();
        let mut failed_sections = Vec::new();
        for (role, result) in decoded {
            let index = role.section_index().unwrap_or_default();
            match result {
                Ok(tree) => sections.push(Section {
                    index,
                    name: section_name(index),
                    tree,
                }),
                Err(error) => {
                    let error = error.in_stream(role.path());
                    if !self.options.tolerate_section_errors {
                        return Err(error);
                    }
                    warn!("Skipping {}: {}", role, error);
                    failed_sections.push(SectionFailure {
                        index,
                        name: section_name(index),
                        error,
                    });
                }
            }
        }

        info!(
            "Decoded {} sections ({} failed), DocInfo has {} records",
            sections.len(),
            failed_sections.len(),
            doc_info.len()
        );
        Ok(Document {
            header: self.header.clone(),
            doc_info,
            sections,
            failed_sections,
        })
    }

    /// Every entry of the container in depth-first pre-order.
    pub fn walk_entries(&self) -> Result<Vec<Entry>> {
        let mut entries = Vec::new();
        self.walk_storage("/", &mut entries)?;
        Ok(entries)
    }

    fn walk_storage(&self, storage: &str, out: &mut Vec<Entry>) -> Result<()> {
        for child in self.list(storage)? {
            let nested = child.is_storage.then(|| child.path.clone());
            out.push(child);
            if let Some(path) = nested {
                self.walk_storage(&path, out)?;
            }
        }
        Ok(())
    }

    /// Names of the streams under `BinData` (empty when there is none).
    pub fn bin_data_names(&self) -> Result<Vec<String>> {
        if !self.exists(BIN_DATA_STORAGE)? {
            return Ok(Vec::new());
        }
        Ok(self
            .list(BIN_DATA_STORAGE)?
            .into_iter()
            .filter(|entry| !entry.is_storage)
            .map(|entry| entry.name)
            .collect())
    }

    /// Reads an embedded binary item, inflated when the document is compressed.
    pub fn read_bin_data(&self, name: &str) -> Result<Vec<u8>> {
        self.read_stream(&StreamRole::BinData(name.to_string()))
    }
}

type DecodedSection = (StreamRole, Result<SectionTree>);

/// Decodes sections on a bounded set of scoped workers, preserving order.
fn decode_on_workers<F>(raw_sections: Vec<(StreamRole, Result<Vec<u8>>)>, decode: &F) -> Result<Vec<DecodedSection>>
where
    F: Fn(&StreamRole, Result<Vec<u8>>) -> Result<SectionTree> + Sync,
{
    let workers = thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(raw_sections.len())
        .max(1);
    let chunk_len = raw_sections.len().div_ceil(workers);
    debug!(
        "Decoding {} sections on {} worker threads",
        raw_sections.len(),
        workers
    );

    let mut chunks: Vec<Vec<(StreamRole, Result<Vec<u8>>)>> = Vec::with_capacity(workers);
    let mut pending = raw_sections.into_iter().peekable();
    while pending.peek().is_some() {
        chunks.push(pending.by_ref().take(chunk_len).collect());
    }

    thread::scope(|scope| -> Result<Vec<DecodedSection>> {
        let mut handles = Vec::with_capacity(chunks.len());
        for (worker, chunk) in chunks.into_iter().enumerate() {
            let roles: Vec<StreamRole> = chunk.iter().map(|(role, _)| role.clone()).collect();
            let handle = thread::Builder::new()
                .name(format!("hwp-sections-{}", worker))
                .spawn_scoped(scope, move || {
                    chunk
                        .into_iter()
                        .map(|(role, raw)| {
                            let result = decode(&role, raw);
                            (role, result)
                        })
                        .collect::<Vec<DecodedSection>>()
                })?;
            handles.push((roles, handle));
        }

        let mut decoded = Vec::new();
        for (roles, handle) in handles {
            match handle.join() {
                Ok(results) => decoded.extend(results),
                Err(_) => decoded.extend(roles.into_iter().map(|role| {
                    let error = HwpError::InvalidFormat(format!("Worker decoding {} panicked", role));
                    (role, Err(error))
                })),
            }
        }
        Ok(decoded)
    })
}

fn read_file_header<C: Container>(container: &mut C) -> Result<FileHeader> {
    let path = StreamRole::FileHeader.path();
    let bytes = container.read_entry(&path).map_err(|e| e.in_stream(&path))?;
    file_header::parse(&bytes).map_err(|e| e.in_stream(&path))
}

fn section_name(index: usize) -> String {
    format!("Section{}", index)
}
