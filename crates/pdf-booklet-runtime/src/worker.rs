use pdf_booklet::{
    ExportEvent, ExportOptions, ExportTask, PageSequence, SourceSet, export, load_from_document,
    load_pdf, save_pdf_bytes,
};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::{BookletCommand, BookletUpdate};

const EXPORT_OPERATION: &str = "Exporting";

struct RunningExport {
    task: ExportTask,
    output_path: PathBuf,
}

#[derive(Default)]
struct WorkerState {
    sources: Option<Arc<SourceSet>>,
    running: Option<RunningExport>,
    /// Loads that arrived while an export was running
    deferred_loads: VecDeque<PathBuf>,
}

/// Async worker task that processes booklet commands and sends updates.
///
/// At most one export runs at a time. Commands are always handled before
/// export events so that a `Cancel` is seen as early as possible.
pub async fn worker_task(
    mut command_rx: mpsc::UnboundedReceiver<BookletCommand>,
    update_tx: mpsc::UnboundedSender<BookletUpdate>,
) {
    let mut state = WorkerState::default();

    loop {
        tokio::select! {
            biased;

            cmd = command_rx.recv() => match cmd {
                Some(cmd) => process_command(cmd, &mut state, &update_tx).await,
                None => break,
            },
            event = next_export_event(&mut state.running) => {
                handle_export_event(event, &mut state, &update_tx).await;
            }
        }
    }

    if let Some(running) = state.running.take() {
        log::info!("Command channel closed, cancelling export");
        running.task.cancel();
        let _ = running.task.finish().await;
    }
}

async fn next_export_event(running: &mut Option<RunningExport>) -> Option<ExportEvent> {
    match running {
        Some(running) => running.task.next_event().await,
        None => std::future::pending().await,
    }
}

async fn process_command(
    cmd: BookletCommand,
    state: &mut WorkerState,
    update_tx: &mpsc::UnboundedSender<BookletUpdate>,
) {
    match cmd {
        BookletCommand::Load { path } => {
            if state.running.is_some() {
                log::debug!("Deferring load of {} until export finishes", path.display());
                state.deferred_loads.push_back(path);
            } else {
                handle_load(path, state, update_tx).await;
            }
        }
        BookletCommand::Export {
            sequence,
            options,
            output_path,
        } => handle_export(sequence, options, output_path, state, update_tx),
        BookletCommand::Cancel => match &state.running {
            Some(running) => {
                log::info!("Cancelling export to {}", running.output_path.display());
                running.task.cancel();
            }
            None => log::debug!("Cancel requested with no export running"),
        },
    }
}

async fn handle_load(
    path: PathBuf,
    state: &mut WorkerState,
    update_tx: &mpsc::UnboundedSender<BookletUpdate>,
) {
    let loaded = load_pdf(&path).await.and_then(|doc| {
        let page_count = load_from_document(&doc)?.len();
        Ok((SourceSet::new(doc), page_count))
    });

    match loaded {
        Ok((sources, page_count)) => {
            state.sources = Some(Arc::new(sources));
            let _ = update_tx.send(BookletUpdate::Loaded { path, page_count });
        }
        Err(e) => {
            let _ = update_tx.send(BookletUpdate::Error {
                message: format!("Failed to load PDF: {e}"),
            });
        }
    }
}

fn handle_export(
    sequence: PageSequence,
    options: ExportOptions,
    output_path: PathBuf,
    state: &mut WorkerState,
    update_tx: &mpsc::UnboundedSender<BookletUpdate>,
) {
    if state.running.is_some() {
        let _ = update_tx.send(BookletUpdate::Error {
            message: "An export is already running".to_string(),
        });
        return;
    }

    let Some(sources) = &state.sources else {
        let _ = update_tx.send(BookletUpdate::Error {
            message: "No document loaded".to_string(),
        });
        return;
    };

    log::info!("Starting export to {}", output_path.display());
    state.running = Some(RunningExport {
        task: export(Arc::clone(sources), sequence, options),
        output_path,
    });
}

async fn handle_export_event(
    event: Option<ExportEvent>,
    state: &mut WorkerState,
    update_tx: &mpsc::UnboundedSender<BookletUpdate>,
) {
    let event = match event {
        Some(ExportEvent::Progress { percent }) => {
            let _ = update_tx.send(BookletUpdate::Progress {
                operation: EXPORT_OPERATION.to_string(),
                percent,
            });
            return;
        }
        Some(event) => event,
        None => {
            log::warn!("Export ended without a result");
            state.running = None;
            return;
        }
    };

    let Some(running) = state.running.take() else {
        return;
    };

    match event {
        ExportEvent::Finished { bytes } => match save_pdf_bytes(&bytes, &running.output_path).await {
            Ok(()) => {
                let _ = update_tx.send(BookletUpdate::ExportComplete {
                    path: running.output_path,
                    bytes: bytes.len(),
                });
            }
            Err(e) => {
                let _ = update_tx.send(BookletUpdate::Error {
                    message: format!("Failed to write {}: {e}", running.output_path.display()),
                });
            }
        },
        ExportEvent::Cancelled => {
            let _ = update_tx.send(BookletUpdate::ExportCancelled);
        }
        ExportEvent::Failed { message } => {
            let _ = update_tx.send(BookletUpdate::Error {
                message: format!("Export failed: {message}"),
            });
        }
        ExportEvent::Progress { .. } => {}
    }

    while let Some(path) = state.deferred_loads.pop_front() {
        handle_load(path, state, update_tx).await;
    }
}
