use lopdf::{Document, ObjectId};

use super::SourceId;

/// The documents a sequence may draw page content from.
///
/// The primary document always sits at [`SourceId::PRIMARY`]; further
/// documents get the next free id when added. An empty set holds no
/// documents at all, so every page lookup against it fails.
#[derive(Debug, Clone, Default)]
pub struct SourceSet {
    documents: Vec<Document>,
}

impl SourceSet {
    pub fn new(primary: Document) -> Self {
        Self {
            documents: vec![primary],
        }
    }

    pub fn add(&mut self, document: Document) -> SourceId {
        self.documents.push(document);
        SourceId(self.documents.len() - 1)
    }

    pub fn get(&self, id: SourceId) -> Option<&Document> {
        self.documents.get(id.0)
    }

    pub fn primary(&self) -> Option<&Document> {
        self.get(SourceId::PRIMARY)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Page object ids of one document, in reading order
    pub fn page_ids(&self, id: SourceId) -> Option<Vec<ObjectId>> {
        self.get(id)
            .map(|doc| doc.get_pages().values().copied().collect())
    }
}
