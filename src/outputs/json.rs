//! JSON snapshot of the store.
//!
//! The snapshot is a single document that the viewer reads:
//! ```text
//! {
//!     "AI_Tech": [ { "title", "points", "link", "category", "published" }, ... ],
//!     "Economy": [ ... ]
//! }
//! ```
//!
//! Each write replaces the whole file in place. Non-ASCII text is written
//! literally and the document is indented with four spaces.

use crate::error::PipelineError;
use crate::models::Store;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

/// Serialize `store` as an indented, UTF-8 JSON document.
pub fn store_to_json(store: &Store) -> Result<Vec<u8>, PipelineError> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = Serializer::with_formatter(&mut buf, formatter);
    store.serialize(&mut ser)?;
    Ok(buf)
}

/// Write `store` to `path`, creating the parent directory if needed.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_store(store: &Store, path: &Path) -> Result<(), PipelineError> {
    let json = store_to_json(store)?;

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(dir).await {
            error!(dir = %dir.display(), error = %e, "Failed to create store directory");
            return Err(e.into());
        }
    }

    fs::write(path, json).await?;
    info!(categories = store.len(), "Wrote store snapshot");
    Ok(())
}

/// Read the snapshot back. `Ok(None)` means no snapshot has been published yet.
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub async fn read_store(path: &Path) -> Result<Option<Store>, PipelineError> {
    match fs::read(path).await {
        Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}
