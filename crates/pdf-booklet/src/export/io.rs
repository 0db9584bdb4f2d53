//! Document I/O for loading sources and writing exports

use crate::types::LoadError;
use lopdf::Document;
use std::path::Path;

/// Load a single PDF document
pub async fn load_pdf(path: impl AsRef<Path>) -> Result<Document, LoadError> {
    let path = path.as_ref().to_owned();
    let bytes = tokio::fs::read(&path).await?;
    log::info!("Read {} bytes from {}", bytes.len(), path.display());
    load_pdf_bytes(bytes).await
}

/// Parse a PDF already held in memory
pub async fn load_pdf_bytes(bytes: Vec<u8>) -> Result<Document, LoadError> {
    let doc = tokio::task::spawn_blocking(move || Document::load_mem(&bytes)).await??;
    Ok(doc)
}

/// Write exported bytes to disk
pub async fn save_pdf_bytes(bytes: &[u8], path: impl AsRef<Path>) -> std::io::Result<()> {
    let path = path.as_ref();
    tokio::fs::write(path, bytes).await?;
    log::info!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}
