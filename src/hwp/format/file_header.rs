//! `FileHeader` stream parsing.
//!
//! The file header is the only stream that is never compressed or
//! encrypted. Its flags decide how every other stream is read, so it is
//! parsed before anything else is touched.

use byteorder::{ByteOrder, LittleEndian};
use log::{debug, info};

use crate::hwp::types::error::{HwpError, Result};
use crate::hwp::types::models::{FileHeader, FileProperties, Version};

pub const SIGNATURE: &str = "HWP Document File";

const SIGNATURE_LEN: usize = 32;
const VERSION_OFFSET: usize = 32;
const PROPERTIES_OFFSET: usize = 36;
const LICENSE_OFFSET: usize = 40;
/// Bytes that must be present; the rest of the 256-byte entry is reserved.
pub const MIN_LEN: usize = 40;

const SUPPORTED_MAJOR: u8 = 5;

/// Parses the `FileHeader` stream.
///
/// # Header Structure
/// ```text
/// [32 bytes] signature "HWP Document File", NUL padded
/// [4 bytes]  version 0xMMnnPPrr (LE u32)
/// [4 bytes]  property flags (LE u32)
/// [4 bytes]  license flags (LE u32, optional)
/// [..]       reserved up to 256 bytes
/// ```
///
/// # Errors
/// - `HwpError::InvalidFormat` if the stream is shorter than 40 bytes or the
///   signature does not match.
/// - `HwpError::UnsupportedFormat` if the major version is not 5.
///
/// Password protection is reported through the returned flags; rejecting
/// it is up to the caller.
pub fn parse(bytes: &[u8]) -> Result<FileHeader> {
    if bytes.len() < MIN_LEN {
        return Err(HwpError::InvalidFormat(format!(
            "FileHeader is {} bytes, need at least {}",
            bytes.len(),
            MIN_LEN
        )));
    }

    let signature_bytes = &bytes[..SIGNATURE_LEN];
    let signature_end = signature_bytes.iter().position(|&b| b == 0).unwrap_or(SIGNATURE_LEN);
    let signature = String::from_utf8_lossy(&signature_bytes[..signature_end]).into_owned();
    if signature != SIGNATURE {
        return Err(HwpError::InvalidFormat(format!("Bad signature '{}'", signature)));
    }

    let version = Version::from_packed(LittleEndian::read_u32(&bytes[VERSION_OFFSET..PROPERTIES_OFFSET]));
    if version.major != SUPPORTED_MAJOR {
        return Err(HwpError::UnsupportedFormat(format!(
            "Format version {} (only {}.x is supported)",
            version, SUPPORTED_MAJOR
        )));
    }

    let raw_properties = LittleEndian::read_u32(&bytes[PROPERTIES_OFFSET..LICENSE_OFFSET]);
    let properties = FileProperties::from_bits_retain(raw_properties);
    let license = bytes
        .get(LICENSE_OFFSET..LICENSE_OFFSET + 4)
        .map(LittleEndian::read_u32)
        .unwrap_or(0);

    info!("HWP {} (properties {:#010x})", version, raw_properties);
    debug!(
        "compressed={}, password={}, distributable={}",
        properties.contains(FileProperties::COMPRESSED),
        properties.contains(FileProperties::PASSWORD),
        properties.contains(FileProperties::DISTRIBUTABLE)
    );

    Ok(FileHeader {
        signature,
        version,
        properties,
        license,
    })
}

/// Builds a 256-byte `FileHeader` stream. Used to assemble test documents.
pub fn encode(version: Version, properties: FileProperties) -> Vec<u8> {
    let mut out = vec![0u8; 256];
    out[..SIGNATURE.len()].copy_from_slice(SIGNATURE.as_bytes());
    LittleEndian::write_u32(&mut out[VERSION_OFFSET..PROPERTIES_OFFSET], version.packed());
    LittleEndian::write_u32(&mut out[PROPERTIES_OFFSET..LICENSE_OFFSET], properties.bits());
    out
}
