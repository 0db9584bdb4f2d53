use crate::export::{ExportTask, export};
use crate::layout::{SheetLayout, plan_imposition};
use crate::options::ExportOptions;
use crate::sequence::{self, History, InsertPosition, PageId, PageSequence, SourceSet};
use crate::stats::calculate_statistics;
use crate::types::*;
use std::cell::OnceCell;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Owns the editing session for one loaded document: the current page
/// sequence, its undo history, the source documents, and a cached sheet plan.
///
/// Every edit goes through [`Editor::apply`], which snapshots the previous
/// sequence only when the edit actually changed something.
#[derive(Debug)]
pub struct Editor {
    sources: Arc<SourceSet>,
    sequence: PageSequence,
    history: History,
    revision: u64,
    sheets: OnceCell<Vec<SheetLayout>>,
}

impl Editor {
    /// Start a session on a freshly loaded document set
    pub fn new(sources: SourceSet) -> Result<Self, LoadError> {
        let mut editor = Self::empty();
        editor.replace_sources(sources)?;
        Ok(editor)
    }

    /// Start a session for a primary document known only by its page count.
    ///
    /// No source documents are attached, so exports of original pages fail
    /// with [`RenderError::MissingSource`] until [`Editor::replace_sources`]
    /// is called.
    pub fn from_page_count(page_count: usize) -> Result<Self, LoadError> {
        let mut editor = Self::empty();
        editor.sequence = sequence::load_from_source(page_count)?;
        Ok(editor)
    }

    fn empty() -> Self {
        Self {
            sources: Arc::new(SourceSet::default()),
            sequence: PageSequence::new(),
            history: History::new(),
            revision: 0,
            sheets: OnceCell::new(),
        }
    }

    /// Swap in a newly loaded document set. History is always cleared; if the
    /// new primary document can't be used the session is left with no
    /// sources and an empty sequence.
    pub fn replace_sources(&mut self, sources: SourceSet) -> Result<(), LoadError> {
        self.history.clear();
        self.sources = Arc::new(SourceSet::default());
        self.set_sequence(PageSequence::new());

        let primary = sources.primary().ok_or(LoadError::NoPages)?;
        let loaded = sequence::load_from_document(primary)?;
        self.sources = Arc::new(sources);
        self.set_sequence(loaded);
        Ok(())
    }

    pub fn sources(&self) -> &Arc<SourceSet> {
        &self.sources
    }

    pub fn sequence(&self) -> &PageSequence {
        &self.sequence
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    /// Bumped on every change to the sequence, including undo
    pub fn revision(&self) -> u64 {
        self.revision
    }

    // =========================================================================
    // Undoable edits
    // =========================================================================

    pub fn move_page(&mut self, from: usize, to: usize) -> bool {
        let next = sequence::move_page(&self.sequence, from, to);
        self.apply("move", next)
    }

    pub fn delete_indices(&mut self, indices: &BTreeSet<usize>) -> bool {
        let next = sequence::delete_by_indices(&self.sequence, indices);
        self.apply("delete", next)
    }

    /// Delete the pages named by a range like `"1,3,10-15"`. Returns how many
    /// pages were removed.
    pub fn delete_range(&mut self, text: &str) -> usize {
        let indices = sequence::parse_range_spec(text, self.sequence.len());
        let before = self.sequence.len();
        if self.delete_indices(&indices) {
            before - self.sequence.len()
        } else {
            0
        }
    }

    pub fn insert_blanks(&mut self, count: usize, anchor: usize, position: InsertPosition) -> bool {
        let next = sequence::insert_blanks(&self.sequence, count, anchor, position);
        self.apply("insert blanks", next)
    }

    pub fn delete_page(&mut self, id: PageId) -> bool {
        let next = sequence::delete_by_id(&self.sequence, id);
        self.apply("delete page", next)
    }

    /// Restore the sequence as it was before the most recent edit
    pub fn undo(&mut self) -> bool {
        match self.history.pop() {
            Some(previous) => {
                log::debug!("Undo: restoring {} pages", previous.len());
                self.set_sequence(previous);
                true
            }
            None => false,
        }
    }

    fn apply(&mut self, operation: &str, next: PageSequence) -> bool {
        if next == self.sequence {
            log::debug!("{operation}: no change");
            return false;
        }

        log::debug!(
            "{operation}: {} -> {} pages",
            self.sequence.len(),
            next.len()
        );
        let previous = std::mem::replace(&mut self.sequence, next);
        self.history.push(previous);
        self.invalidate();
        true
    }

    fn set_sequence(&mut self, sequence: PageSequence) {
        self.sequence = sequence;
        self.invalidate();
    }

    fn invalidate(&mut self) {
        self.revision += 1;
        self.sheets = OnceCell::new();
    }

    // =========================================================================
    // Derived views
    // =========================================================================

    /// Sheet plan for the current sequence, computed on first use after a change
    pub fn sheets(&self) -> &[SheetLayout] {
        self.sheets.get_or_init(|| {
            log::debug!("Planning sheets for revision {}", self.revision);
            plan_imposition(&self.sequence)
        })
    }

    pub fn statistics(&self, mode: ExportMode) -> ImpositionStatistics {
        calculate_statistics(&self.sequence, mode)
    }

    /// Export the current sequence. Later edits don't affect a running export.
    pub fn export(&self, options: ExportOptions) -> ExportTask {
        export(Arc::clone(&self.sources), self.sequence.clone(), options)
    }
}
