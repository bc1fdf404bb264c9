//! Core data structures for HWP document components.
//!
//! This module defines the fundamental types used throughout the library:
//! - File header flags and format version
//! - Stream roles and the transforms they require
//! - Decoded sections and the document that owns them

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;

use super::error::{HwpError, Result};
use crate::hwp::format::tree::SectionTree;

/// Four-part HWP format version (`major.minor.build.revision`).
///
/// Ordered field by field, so it can gate version-dependent fields:
/// `version >= Version::new(5, 0, 3, 2)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
    pub build: u8,
    pub revision: u8,
}

impl Version {
    pub const fn new(major: u8, minor: u8, build: u8, revision: u8) -> Self {
        Self { major, minor, build, revision }
    }

    /// Decodes the packed `0xMMnnPPrr` file header word.
    pub fn from_packed(word: u32) -> Self {
        let [revision, build, minor, major] = word.to_le_bytes();
        Self { major, minor, build, revision }
    }

    pub fn packed(&self) -> u32 {
        u32::from_le_bytes([self.revision, self.build, self.minor, self.major])
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}.{}", self.major, self.minor, self.build, self.revision)
    }
}

impl FromStr for Version {
    type Err = HwpError;

    /// Parses a dotted version. Missing trailing parts default to zero
    /// (`"5.0"` is `5.0.0.0`); more than four parts is an error.
    fn from_str(s: &str) -> Result<Self> {
        let mut parts = [0u8; 4];
        let mut count = 0;
        for piece in s.trim().split('.') {
            if count == 4 {
                return Err(HwpError::InvalidFormat(format!("Version '{}' has more than four parts", s)));
            }
            parts[count] = piece
                .parse()
                .map_err(|e| HwpError::InvalidFormat(format!("Invalid version part '{}' in '{}': {}", piece, s, e)))?;
            count += 1;
        }
        let [major, minor, build, revision] = parts;
        Ok(Self { major, minor, build, revision })
    }
}

bitflags! {
    /// Document property bits from the file header (offset 36).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct FileProperties: u32 {
        const COMPRESSED          = 1 << 0;
        const PASSWORD            = 1 << 1;
        const DISTRIBUTABLE       = 1 << 2;
        const SCRIPT_SAVED        = 1 << 3;
        const DRM                 = 1 << 4;
        const XML_TEMPLATE        = 1 << 5;
        const HISTORY             = 1 << 6;
        const CERT_SIGNED         = 1 << 7;
        const CERT_ENCRYPTED      = 1 << 8;
        const CERT_SIGNATURE_SPARE = 1 << 9;
        const CERT_DRM            = 1 << 10;
        const CCL                 = 1 << 11;
        const MOBILE_OPTIMIZED    = 1 << 12;
        const PRIVACY_SECURITY    = 1 << 13;
        const TRACK_CHANGE        = 1 << 14;
        const KOGL                = 1 << 15;
        const VIDEO_CONTROL       = 1 << 16;
        const TOC_FIELD           = 1 << 17;
    }
}

/// Parsed `FileHeader` entry.
///
/// Read once, before any other stream is touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHeader {
    pub signature: String,
    pub version: Version,
    pub properties: FileProperties,
    /// License bits at offset 40, when the header is long enough to carry them.
    pub license: u32,
}

impl FileHeader {
    pub fn is_compressed(&self) -> bool {
        self.properties.contains(FileProperties::COMPRESSED)
    }

    pub fn is_distributable(&self) -> bool {
        self.properties.contains(FileProperties::DISTRIBUTABLE)
    }

    pub fn is_password_protected(&self) -> bool {
        self.properties.contains(FileProperties::PASSWORD)
    }
}

/// Which transforms a stream needs before its records can be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransformFlags {
    pub compressed: bool,
    pub distributable: bool,
}

/// Logical role of a container stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamRole {
    FileHeader,
    DocInfo,
    BodySection(usize),
    ViewSection(usize),
    BinData(String),
}

impl StreamRole {
    /// Container path of this stream.
    pub fn path(&self) -> String {
        match self {
            StreamRole::FileHeader => "/FileHeader".to_string(),
            StreamRole::DocInfo => "/DocInfo".to_string(),
            StreamRole::BodySection(n) => format!("/BodyText/Section{}", n),
            StreamRole::ViewSection(n) => format!("/ViewText/Section{}", n),
            StreamRole::BinData(name) => format!("/BinData/{}", name),
        }
    }

    /// Section number for body and view sections.
    pub fn section_index(&self) -> Option<usize> {
        match self {
            StreamRole::BodySection(n) | StreamRole::ViewSection(n) => Some(*n),
            _ => None,
        }
    }

    /// Transforms the producing application applied to this stream.
    ///
    /// Only ViewText sections are obfuscated; every other stream except the
    /// file header follows the document's compression flag.
    pub fn transform_flags(&self, header: &FileHeader) -> TransformFlags {
        match self {
            StreamRole::FileHeader => TransformFlags::default(),
            StreamRole::DocInfo | StreamRole::BodySection(_) | StreamRole::BinData(_) => TransformFlags {
                compressed: header.is_compressed(),
                distributable: false,
            },
            StreamRole::ViewSection(_) => TransformFlags {
                compressed: header.is_compressed(),
                distributable: true,
            },
        }
    }
}

impl fmt::Display for StreamRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// A named entry of the storage container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    /// Absolute path inside the container, e.g. `/BodyText/Section0`.
    pub path: String,
    pub is_storage: bool,
}

/// Reader configuration.
#[derive(Debug, Clone)]
pub struct ReaderOptions {
    /// Decode sections on scoped worker threads in `read_document`.
    pub parallel_sections: bool,
    /// Keep going after a section fails, recording it as a [`SectionFailure`].
    /// When `false` the first failing section aborts `read_document`.
    pub tolerate_section_errors: bool,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            parallel_sections: true,
            tolerate_section_errors: true,
        }
    }
}

/// One decoded body (or view) section.
#[derive(Debug, Clone)]
pub struct Section {
    pub index: usize,
    pub name: String,
    pub tree: SectionTree,
}

/// A section that could not be decoded.
#[derive(Debug)]
pub struct SectionFailure {
    pub index: usize,
    pub name: String,
    pub error: HwpError,
}

/// A fully decoded document. Immutable once built.
#[derive(Debug)]
pub struct Document {
    pub header: FileHeader,
    pub doc_info: SectionTree,
    /// BodyText sections, or ViewText sections for distributable documents.
    pub sections: Vec<Section>,
    pub failed_sections: Vec<SectionFailure>,
}
