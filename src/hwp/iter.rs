//! Pull iteration over document sections.
//!
//! # Example
//! ```no_run
//! # use hwp_reader::HwpReader;
//! let reader = HwpReader::open("report.hwp").unwrap();
//! for section in reader.iter_sections().unwrap() {
//!     let section = section.unwrap();
//!     println!("{}: {} records", section.name, section.tree.len());
//! }
//! ```

use std::vec::IntoIter;

use super::container::Container;
use super::reader::HwpReader;
use super::types::error::Result;
use super::types::models::{Section, StreamRole};

/// Iterator decoding one section stream per call to `next`.
///
/// A failing section yields its error and iteration continues with the
/// next one, since section streams are independent.
///
/// Created by [`HwpReader::iter_sections()`](crate::HwpReader::iter_sections).
pub struct SectionIter<'a, C: Container> {
    reader: &'a HwpReader<C>,
    roles: IntoIter<StreamRole>,
}

impl<'a, C: Container> SectionIter<'a, C> {
    pub(super) fn new(reader: &'a HwpReader<C>, roles: Vec<StreamRole>) -> Self {
        Self {
            reader,
            roles: roles.into_iter(),
        }
    }
}

impl<'a, C: Container> Iterator for SectionIter<'a, C> {
    type Item = Result<Section>;

    fn next(&mut self) -> Option<Self::Item> {
        let role = self.roles.next()?;
        Some(self.reader.read_section(&role))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.roles.size_hint()
    }
}

impl<'a, C: Container> ExactSizeIterator for SectionIter<'a, C> {}
