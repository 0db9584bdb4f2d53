//! Logical page descriptors
//!
//! A descriptor says *what* goes on one logical page of the output, never
//! *where* it lands physically. Identity is carried by [`PageId`] so the same
//! descriptor can be tracked across moves and snapshots.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_PAGE_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque, process-unique page identifier. Used for equality only, never ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageId(u64);

impl PageId {
    fn next() -> Self {
        Self(NEXT_PAGE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Index of a document inside a [`SourceSet`](super::SourceSet)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(pub usize);

impl SourceId {
    /// The document the sequence was loaded from
    pub const PRIMARY: SourceId = SourceId(0);
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "doc{}", self.0)
    }
}

/// What a logical page shows.
///
/// Every variant except `Blank` must name a source document and page, so the
/// invariant lives in the type rather than in optional fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageContent {
    /// A page of the primary loaded document
    Original { source: SourceId, page_index: usize },
    /// An inserted page with no content
    Blank,
    /// A page borrowed from another document (not created by any edit yet)
    External { source: SourceId, page_index: usize },
    /// A repeated page (not created by any edit yet)
    Duplicate { source: SourceId, page_index: usize },
}

/// Fieldless tag for [`PageContent`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageKind {
    Original,
    Blank,
    External,
    Duplicate,
}

/// One logical page in the user's intended output
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageDescriptor {
    id: PageId,
    content: PageContent,
}

impl PageDescriptor {
    fn with_content(content: PageContent) -> Self {
        Self {
            id: PageId::next(),
            content,
        }
    }

    pub fn original(source: SourceId, page_index: usize) -> Self {
        Self::with_content(PageContent::Original { source, page_index })
    }

    pub fn blank() -> Self {
        Self::with_content(PageContent::Blank)
    }

    pub fn external(source: SourceId, page_index: usize) -> Self {
        Self::with_content(PageContent::External { source, page_index })
    }

    pub fn duplicate(source: SourceId, page_index: usize) -> Self {
        Self::with_content(PageContent::Duplicate { source, page_index })
    }

    pub fn id(&self) -> PageId {
        self.id
    }

    pub fn content(&self) -> PageContent {
        self.content
    }

    pub fn kind(&self) -> PageKind {
        match self.content {
            PageContent::Original { .. } => PageKind::Original,
            PageContent::Blank => PageKind::Blank,
            PageContent::External { .. } => PageKind::External,
            PageContent::Duplicate { .. } => PageKind::Duplicate,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.content == PageContent::Blank
    }

    /// Source document and zero-based page index, `None` for blanks
    pub fn source_page(&self) -> Option<(SourceId, usize)> {
        match self.content {
            PageContent::Original { source, page_index }
            | PageContent::External { source, page_index }
            | PageContent::Duplicate { source, page_index } => Some((source, page_index)),
            PageContent::Blank => None,
        }
    }

    pub fn source(&self) -> Option<SourceId> {
        self.source_page().map(|(source, _)| source)
    }

    pub fn source_page_index(&self) -> Option<usize> {
        self.source_page().map(|(_, index)| index)
    }

    /// Human-readable label for thumbnails and logs. Derived, not authoritative.
    pub fn display_label(&self) -> String {
        match self.content {
            PageContent::Original { page_index, .. } => format!("Page {}", page_index + 1),
            PageContent::Blank => "Blank".to_string(),
            PageContent::External { source, page_index } => {
                format!("{} p.{}", source, page_index + 1)
            }
            PageContent::Duplicate { page_index, .. } => {
                format!("Copy of page {}", page_index + 1)
            }
        }
    }
}

impl fmt::Display for PageDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let a = PageDescriptor::blank();
        let b = PageDescriptor::blank();
        assert_ne!(a.id(), b.id());
        assert_ne!(a, b);
        assert_eq!(a.clone(), a);
    }

    #[test]
    fn test_source_fields_follow_variant() {
        let original = PageDescriptor::original(SourceId::PRIMARY, 4);
        assert_eq!(original.kind(), PageKind::Original);
        assert_eq!(original.source(), Some(SourceId::PRIMARY));
        assert_eq!(original.source_page_index(), Some(4));

        let blank = PageDescriptor::blank();
        assert_eq!(blank.kind(), PageKind::Blank);
        assert_eq!(blank.source(), None);
        assert_eq!(blank.source_page_index(), None);

        let external = PageDescriptor::external(SourceId(2), 0);
        assert_eq!(external.source_page(), Some((SourceId(2), 0)));
    }

    #[test]
    fn test_display_labels() {
        assert_eq!(PageDescriptor::original(SourceId::PRIMARY, 0).display_label(), "Page 1");
        assert_eq!(PageDescriptor::blank().display_label(), "Blank");
        assert_eq!(PageDescriptor::external(SourceId(1), 2).display_label(), "doc1 p.3");
        assert_eq!(
            PageDescriptor::duplicate(SourceId::PRIMARY, 9).display_label(),
            "Copy of page 10"
        );
    }
}
