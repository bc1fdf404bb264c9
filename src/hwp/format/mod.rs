//! Binary format parsing.
//!
//! # Submodules
//!
//! - [`file_header`][]: the `FileHeader` stream (signature, version, flags)
//! - [`record`][]: record header decoding and the record iterator
//! - [`payload`][]: tag dispatch to payload decoders
//! - [`tree`][]: assembling records into a tree by nesting level

pub mod file_header;
pub mod payload;
pub mod record;
pub mod tree;
