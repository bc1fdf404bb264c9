//! Core HWP reader module.
//!
//! # Architecture
//!
//! - [`reader`][]: [`HwpReader`], the entry point
//! - [`container`][]: the storage container abstraction
//! - [`codec`][]: decryption and decompression of raw streams
//! - [`format`][]: file header, record and payload decoding, tree assembly
//! - [`iter`][]: pull iteration over sections
//! - [`types`][]: errors, tags and data models

pub mod codec;
pub mod container;
pub mod format;
pub mod iter;
pub mod reader;
pub mod types;
mod utils;

pub use reader::HwpReader;
pub use types::{error, models, tags};
