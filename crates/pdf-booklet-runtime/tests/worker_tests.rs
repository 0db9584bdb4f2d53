use lopdf::{Dictionary, Document, Object, Stream};
use pdf_booklet::{load_from_source, ExportOptions};
use pdf_booklet_runtime::*;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::mpsc;

fn create_test_pdf(num_pages: usize) -> Document {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let mut kids = Vec::new();
    for _ in 0..num_pages {
        let content_id = doc.add_object(Stream::new(Dictionary::new(), b"q Q".to_vec()));
        let page_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(420),
                    Object::Integer(595),
                ]),
            ),
            ("Resources", Object::Dictionary(Dictionary::new())),
            ("Contents", Object::Reference(content_id)),
        ]));
        kids.push(Object::Reference(page_id));
    }

    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(kids)),
        ("Count", Object::Integer(num_pages as i64)),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", catalog_id);

    doc
}

fn write_test_pdf(dir: &Path, name: &str, num_pages: usize) -> PathBuf {
    let path = dir.join(name);
    let mut writer = Vec::new();
    create_test_pdf(num_pages).save_to(&mut writer).unwrap();
    std::fs::write(&path, writer).unwrap();
    path
}

struct Harness {
    command_tx: mpsc::UnboundedSender<BookletCommand>,
    update_rx: mpsc::UnboundedReceiver<BookletUpdate>,
}

impl Harness {
    fn start() -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        tokio::spawn(worker_task(command_rx, update_tx));
        Self {
            command_tx,
            update_rx,
        }
    }

    fn send(&self, cmd: BookletCommand) {
        self.command_tx.send(cmd).unwrap();
    }

    /// Next update that isn't a progress report
    async fn next_outcome(&mut self) -> BookletUpdate {
        loop {
            let update = tokio::time::timeout(Duration::from_secs(30), self.update_rx.recv())
                .await
                .expect("worker timed out")
                .expect("worker stopped");
            if !matches!(update, BookletUpdate::Progress { .. }) {
                return update;
            }
        }
    }

    async fn load(&mut self, path: &Path) -> usize {
        self.send(BookletCommand::Load {
            path: path.to_path_buf(),
        });
        match self.next_outcome().await {
            BookletUpdate::Loaded { page_count, .. } => page_count,
            other => panic!("Expected Loaded, got {other:?}"),
        }
    }
}

fn export_command(page_count: usize, output_path: PathBuf) -> BookletCommand {
    BookletCommand::Export {
        sequence: load_from_source(page_count).unwrap(),
        options: ExportOptions::imposed(),
        output_path,
    }
}

#[tokio::test]
async fn test_load_then_export() {
    let dir = TempDir::new().unwrap();
    let input = write_test_pdf(dir.path(), "in.pdf", 6);
    let output = dir.path().join("out.pdf");

    let mut harness = Harness::start();
    assert_eq!(harness.load(&input).await, 6);

    harness.send(export_command(6, output.clone()));

    let mut percents = Vec::new();
    let complete = loop {
        match harness.update_rx.recv().await.unwrap() {
            BookletUpdate::Progress { percent, .. } => percents.push(percent),
            other => break other,
        }
    };

    match complete {
        BookletUpdate::ExportComplete { path, bytes } => {
            assert_eq!(path, output);
            assert_eq!(std::fs::metadata(&output).unwrap().len() as usize, bytes);
        }
        other => panic!("Expected ExportComplete, got {other:?}"),
    }
    assert_eq!(percents.last(), Some(&100));

    let written = Document::load(&output).unwrap();
    assert_eq!(written.get_pages().len(), 4);
}

#[tokio::test]
async fn test_export_without_document_is_an_error() {
    let dir = TempDir::new().unwrap();
    let mut harness = Harness::start();

    harness.send(export_command(2, dir.path().join("out.pdf")));
    match harness.next_outcome().await {
        BookletUpdate::Error { message } => assert!(message.contains("No document")),
        other => panic!("Expected Error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_load_failure_is_reported() {
    let mut harness = Harness::start();
    harness.send(BookletCommand::Load {
        path: PathBuf::from("/nonexistent/input.pdf"),
    });
    assert!(matches!(
        harness.next_outcome().await,
        BookletUpdate::Error { .. }
    ));
}

#[tokio::test]
async fn test_second_export_is_rejected_while_busy() {
    let dir = TempDir::new().unwrap();
    let input = write_test_pdf(dir.path(), "in.pdf", 8);

    let mut harness = Harness::start();
    harness.load(&input).await;

    // Queued together: the worker handles both commands before any export event
    harness.send(export_command(8, dir.path().join("a.pdf")));
    harness.send(export_command(8, dir.path().join("b.pdf")));

    match harness.next_outcome().await {
        BookletUpdate::Error { message } => assert!(message.contains("already running")),
        other => panic!("Expected Error, got {other:?}"),
    }
    assert!(matches!(
        harness.next_outcome().await,
        BookletUpdate::ExportComplete { .. }
    ));
    assert!(!dir.path().join("b.pdf").exists());
}

#[tokio::test]
async fn test_load_is_deferred_until_export_finishes() {
    let dir = TempDir::new().unwrap();
    let first = write_test_pdf(dir.path(), "first.pdf", 4);
    let second = write_test_pdf(dir.path(), "second.pdf", 9);

    let mut harness = Harness::start();
    harness.load(&first).await;

    harness.send(export_command(4, dir.path().join("out.pdf")));
    harness.send(BookletCommand::Load {
        path: second.clone(),
    });

    assert!(matches!(
        harness.next_outcome().await,
        BookletUpdate::ExportComplete { .. }
    ));
    match harness.next_outcome().await {
        BookletUpdate::Loaded { path, page_count } => {
            assert_eq!(path, second);
            assert_eq!(page_count, 9);
        }
        other => panic!("Expected Loaded, got {other:?}"),
    }
}

#[tokio::test]
async fn test_cancel_ends_export() {
    let dir = TempDir::new().unwrap();
    let input = write_test_pdf(dir.path(), "in.pdf", 400);

    let mut harness = Harness::start();
    harness.load(&input).await;

    harness.send(export_command(400, dir.path().join("out.pdf")));
    harness.send(BookletCommand::Cancel);

    // A tiny export may already be done when the flag is read
    let outcome = harness.next_outcome().await;
    assert!(
        matches!(
            outcome,
            BookletUpdate::ExportCancelled | BookletUpdate::ExportComplete { .. }
        ),
        "unexpected {outcome:?}"
    );

    // The worker is free again afterwards
    assert_eq!(harness.load(&input).await, 400);
}

#[tokio::test]
async fn test_cancel_without_export_is_ignored() {
    let dir = TempDir::new().unwrap();
    let input = write_test_pdf(dir.path(), "in.pdf", 2);

    let mut harness = Harness::start();
    harness.send(BookletCommand::Cancel);
    assert_eq!(harness.load(&input).await, 2);
}
