//! Export - turning a page sequence into output PDF bytes
//!
//! [`render_output`] does the work synchronously. [`export`] runs it on the
//! blocking pool and hands back an [`ExportTask`] that streams progress and
//! can be cancelled.

mod io;

pub use io::{load_pdf, load_pdf_bytes, save_pdf_bytes};

use crate::constants::PLACEMENT_PROGRESS_SHARE;
use crate::layout::{SheetLayout, SheetSide, plan_imposition};
use crate::options::ExportOptions;
use crate::render::OutputBuilder;
use crate::sequence::{PageSequence, SourceSet};
use crate::types::*;
use std::borrow::Cow;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Shared flag asking a running export to stop at the next page boundary
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Turns "steps done" into non-decreasing percentages
struct ProgressTracker<F: FnMut(u8)> {
    total_steps: usize,
    done: usize,
    last: Option<u8>,
    on_progress: F,
}

impl<F: FnMut(u8)> ProgressTracker<F> {
    fn new(total_steps: usize, on_progress: F) -> Self {
        let mut tracker = Self {
            total_steps: total_steps.max(1),
            done: 0,
            last: None,
            on_progress,
        };
        tracker.emit(0);
        tracker
    }

    fn step(&mut self) {
        self.done += 1;
        let percent = self.done * PLACEMENT_PROGRESS_SHARE / self.total_steps;
        self.emit(percent.min(PLACEMENT_PROGRESS_SHARE) as u8);
    }

    fn complete(&mut self) {
        self.emit(100);
    }

    fn emit(&mut self, percent: u8) {
        if self.last.is_some_and(|last| percent <= last) {
            return;
        }
        self.last = Some(percent);
        (self.on_progress)(percent);
    }
}

fn check_cancelled(cancel: &CancelFlag) -> Result<(), RenderError> {
    if cancel.is_cancelled() {
        log::info!("Export cancelled");
        return Err(RenderError::Cancelled);
    }
    Ok(())
}

/// Render `sequence` into a complete PDF.
///
/// In imposed mode `sheets` is used when given, otherwise the sequence is
/// planned here. It is ignored for sequential exports. Any failure aborts the
/// whole export.
pub fn render_output(
    sources: &SourceSet,
    sequence: &PageSequence,
    sheets: Option<&[SheetLayout]>,
    options: &ExportOptions,
    on_progress: impl FnMut(u8),
    cancel: &CancelFlag,
) -> Result<Vec<u8>, RenderError> {
    options.validate()?;

    if sequence.is_empty() {
        return Err(RenderError::NoPages);
    }

    let mut builder = OutputBuilder::new(sources);

    match options.mode {
        ExportMode::Sequential => {
            log::info!("Exporting {} pages sequentially", sequence.len());
            let mut progress = ProgressTracker::new(sequence.len(), on_progress);
            let blank_size = builder.reference_dimensions();

            for page in sequence.iter() {
                check_cancelled(cancel)?;
                builder.add_sequential_page(page, blank_size)?;
                progress.step();
            }

            check_cancelled(cancel)?;
            let bytes = builder.finish()?;
            progress.complete();
            Ok(bytes)
        }
        ExportMode::Imposed => {
            let sheets: Cow<'_, [SheetLayout]> = match sheets {
                Some(sheets) => Cow::Borrowed(sheets),
                None => Cow::Owned(plan_imposition(sequence)),
            };
            log::info!(
                "Imposing {} pages onto {} sheets",
                sequence.len(),
                sheets.len()
            );

            let mut progress = ProgressTracker::new(sheets.len() * 2, on_progress);
            for sheet in sheets.iter() {
                for side in [SheetSide::Front, SheetSide::Back] {
                    check_cancelled(cancel)?;
                    builder.add_sheet_side(sheet.side(side), side, options)?;
                    progress.step();
                }
            }

            check_cancelled(cancel)?;
            log::debug!("Serializing {} output pages", builder.page_count());
            let bytes = builder.finish()?;
            progress.complete();
            Ok(bytes)
        }
    }
}

/// What a running export reports
#[derive(Debug)]
pub enum ExportEvent {
    Progress { percent: u8 },
    Finished { bytes: Vec<u8> },
    Failed { message: String },
    Cancelled,
}

/// Handle to an export running on the blocking pool
pub struct ExportTask {
    progress_rx: mpsc::UnboundedReceiver<u8>,
    cancel: CancelFlag,
    handle: Option<JoinHandle<Result<Vec<u8>, RenderError>>>,
}

impl ExportTask {
    /// Next progress report, then a single terminal event, then `None`.
    ///
    /// Cancel safe: dropping the future before it resolves loses no event.
    pub async fn next_event(&mut self) -> Option<ExportEvent> {
        if let Some(percent) = self.progress_rx.recv().await {
            return Some(ExportEvent::Progress { percent });
        }

        let handle = self.handle.as_mut()?;
        let result = handle.await;
        self.handle = None;

        let event = match result.map_err(RenderError::from).and_then(|r| r) {
            Ok(bytes) => ExportEvent::Finished { bytes },
            Err(RenderError::Cancelled) => ExportEvent::Cancelled,
            Err(e) => ExportEvent::Failed {
                message: e.to_string(),
            },
        };
        Some(event)
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(|h| h.is_finished())
    }

    /// Wait for the export and take its result, skipping progress reports.
    pub async fn finish(mut self) -> Result<Vec<u8>, RenderError> {
        let handle = self.handle.take().ok_or(RenderError::ResultTaken)?;
        handle.await?
    }
}

// Nobody is left to read the result
impl Drop for ExportTask {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.cancel.cancel();
        }
    }
}

/// Start exporting a snapshot of `sequence`. Must be called within a tokio runtime.
pub fn export(sources: Arc<SourceSet>, sequence: PageSequence, options: ExportOptions) -> ExportTask {
    let (progress_tx, progress_rx) = mpsc::unbounded_channel();
    let cancel = CancelFlag::new();
    let task_cancel = cancel.clone();

    let handle = tokio::task::spawn_blocking(move || {
        render_output(
            &sources,
            &sequence,
            None,
            &options,
            |percent| {
                let _ = progress_tx.send(percent);
            },
            &task_cancel,
        )
    });

    ExportTask {
        progress_rx,
        cancel,
        handle: Some(handle),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_is_monotonic_and_capped() {
        let mut seen = Vec::new();
        {
            let mut tracker = ProgressTracker::new(3, |p| seen.push(p));
            tracker.step();
            tracker.step();
            tracker.step();
            tracker.complete();
        }
        assert_eq!(seen, vec![0, 31, 63, 95, 100]);
    }

    #[test]
    fn test_progress_skips_repeated_values() {
        let mut seen = Vec::new();
        {
            let mut tracker = ProgressTracker::new(1000, |p| seen.push(p));
            for _ in 0..1000 {
                tracker.step();
            }
            tracker.complete();
        }
        assert!(seen.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(seen.first(), Some(&0));
        assert_eq!(seen.last(), Some(&100));
    }

    #[test]
    fn test_cancel_flag_is_shared() {
        let flag = CancelFlag::new();
        let other = flag.clone();
        assert!(!other.is_cancelled());
        flag.cancel();
        assert!(other.is_cancelled());
        assert!(matches!(check_cancelled(&other), Err(RenderError::Cancelled)));
    }

    #[tokio::test]
    async fn test_dropping_task_cancels_export() {
        let task = export(
            Arc::new(SourceSet::default()),
            PageSequence::new(),
            ExportOptions::default(),
        );
        let flag = task.cancel_flag();
        drop(task);
        assert!(flag.is_cancelled());
    }

    #[tokio::test]
    async fn test_finished_task_is_not_cancelled_on_drop() {
        let mut task = export(
            Arc::new(SourceSet::default()),
            PageSequence::new(),
            ExportOptions::default(),
        );
        let flag = task.cancel_flag();
        while task.next_event().await.is_some() {}
        drop(task);
        assert!(!flag.is_cancelled());
    }
}
