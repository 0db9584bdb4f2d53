//! Page-sequence model
//!
//! The ordered list of logical pages the user is editing. Every operation
//! here takes a sequence by reference and returns a new one, so a snapshot
//! handed to the undo stack or to an export can never change underneath it.
//! Out-of-range input is clamped or ignored; none of the edits can fail.

mod descriptor;
mod history;
mod range;
mod source;

pub use descriptor::{PageContent, PageDescriptor, PageId, PageKind, SourceId};
pub use history::History;
pub use range::parse_range_spec;
pub use source::SourceSet;

use crate::types::LoadError;
use lopdf::Document;
use std::collections::BTreeSet;

/// Where [`insert_blanks`] puts the new block relative to its anchor page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertPosition {
    Before,
    After,
}

/// Ordered logical pages; position 0 is the first page of the output
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSequence {
    pages: Vec<PageDescriptor>,
}

impl PageSequence {
    /// Empty sequence (what the editor holds after a failed load)
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PageDescriptor> {
        self.pages.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PageDescriptor> {
        self.pages.iter()
    }

    pub fn as_slice(&self) -> &[PageDescriptor] {
        &self.pages
    }

    pub fn position(&self, id: PageId) -> Option<usize> {
        self.pages.iter().position(|page| page.id() == id)
    }

    pub fn ids(&self) -> Vec<PageId> {
        self.pages.iter().map(PageDescriptor::id).collect()
    }

    pub fn blank_count(&self) -> usize {
        self.pages.iter().filter(|page| page.is_blank()).count()
    }
}

impl FromIterator<PageDescriptor> for PageSequence {
    fn from_iter<I: IntoIterator<Item = PageDescriptor>>(iter: I) -> Self {
        Self {
            pages: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a PageSequence {
    type Item = &'a PageDescriptor;
    type IntoIter = std::slice::Iter<'a, PageDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.pages.iter()
    }
}

// =============================================================================
// Loading
// =============================================================================

/// One ORIGINAL descriptor per page of the primary document, in source order.
pub fn load_from_source(page_count: usize) -> Result<PageSequence, LoadError> {
    if page_count == 0 {
        return Err(LoadError::NoPages);
    }

    Ok((0..page_count)
        .map(|index| PageDescriptor::original(SourceId::PRIMARY, index))
        .collect())
}

/// Build the initial sequence for a freshly loaded primary document.
pub fn load_from_document(doc: &Document) -> Result<PageSequence, LoadError> {
    if doc.trailer.get(b"Encrypt").is_ok() {
        return Err(LoadError::Encrypted);
    }

    let page_count = doc.get_pages().len();
    log::info!("Loaded source document with {page_count} pages");
    load_from_source(page_count)
}

// =============================================================================
// Edits
// =============================================================================

/// Move one page. `to` is a position in the sequence *after* the page has been
/// taken out, so this is a true move rather than a swap.
pub fn move_page(sequence: &PageSequence, from: usize, to: usize) -> PageSequence {
    let len = sequence.len();
    if from == to || from >= len || to >= len {
        return sequence.clone();
    }

    let mut pages = sequence.pages.clone();
    let page = pages.remove(from);
    pages.insert(to, page);
    log::debug!("Moved page from {from} to {to}");
    PageSequence { pages }
}

/// Remove the pages at the given positions, keeping the rest in order.
pub fn delete_by_indices(sequence: &PageSequence, indices: &BTreeSet<usize>) -> PageSequence {
    sequence
        .pages
        .iter()
        .enumerate()
        .filter(|(index, _)| !indices.contains(index))
        .map(|(_, page)| page.clone())
        .collect()
}

/// Insert `count` blank pages as one block before or after the 1-based `anchor` page.
///
/// `count == 0` inserts a single blank. The anchor is clamped to the pages
/// that exist, and on an empty sequence the block becomes the whole sequence.
pub fn insert_blanks(
    sequence: &PageSequence,
    count: usize,
    anchor: usize,
    position: InsertPosition,
) -> PageSequence {
    let count = count.max(1);
    let len = sequence.len();

    let at = if len == 0 {
        0
    } else {
        let anchor = anchor.clamp(1, len);
        match position {
            InsertPosition::Before => anchor - 1,
            InsertPosition::After => anchor,
        }
    };

    let mut pages = Vec::with_capacity(len + count);
    pages.extend_from_slice(&sequence.pages[..at]);
    pages.extend((0..count).map(|_| PageDescriptor::blank()));
    pages.extend_from_slice(&sequence.pages[at..]);
    log::debug!("Inserted {count} blank page(s) at position {at}");
    PageSequence { pages }
}

/// Remove the page with this id, if present.
pub fn delete_by_id(sequence: &PageSequence, id: PageId) -> PageSequence {
    match sequence.position(id) {
        Some(index) => {
            let mut pages = sequence.pages.clone();
            pages.remove(index);
            PageSequence { pages }
        }
        None => sequence.clone(),
    }
}
