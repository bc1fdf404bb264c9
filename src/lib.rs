//! # hwp-reader
//!
//! A reader for HWP 5.x binary word-processor documents (`.hwp`).
//! Handles compressed documents and distributable (view-only) documents,
//! and rebuilds each stream's record hierarchy into a tree.
//!
//! Password-protected documents are rejected.
pub mod hwp;

// Re-export the main types for convenience
pub use hwp::{
    container::{open_container, CfbContainer, Container, MemoryContainer},
    error::{HwpError, Result},
    format::payload::{ListHeader, Payload, VerticalAlign},
    format::tree::{Node, NodeId, SectionTree},
    iter::SectionIter,
    models::{Document, Entry, FileHeader, FileProperties, ReaderOptions, Section, SectionFailure, StreamRole, Version},
    HwpReader,
};
