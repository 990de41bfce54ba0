use std::path::PathBuf;

use bytes::Bytes;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// A rendered preview handed to a `PreviewSurface`.
#[derive(Debug, Clone, PartialEq)]
pub struct Preview {
    pub id: Uuid,
    pub bytes: Bytes,
    pub filename: &'static str,
}

impl Preview {
    pub fn new(bytes: Bytes, filename: &'static str) -> Self {
        Self {
            id: Uuid::new_v4(),
            bytes,
            filename,
        }
    }
}

/// Where previews are displayed.
///
/// Every presented preview is released exactly once: when a newer preview
/// supersedes it, or when the edit session is torn down.
pub trait PreviewSurface: Send {
    fn present(&mut self, preview: &Preview) -> anyhow::Result<()>;
    fn release(&mut self, id: Uuid);
}

/// Writes each preview to `<dir>/<id>.pdf` and deletes the file on release.
#[derive(Debug)]
pub struct FileSurface {
    dir: PathBuf,
}

impl FileSurface {
    pub fn new(dir: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn path_for(&self, id: Uuid) -> PathBuf {
        self.dir.join(format!("{id}.pdf"))
    }
}

impl PreviewSurface for FileSurface {
    fn present(&mut self, preview: &Preview) -> anyhow::Result<()> {
        let path = self.path_for(preview.id);
        std::fs::write(&path, &preview.bytes)?;
        info!("Preview updated: {}", path.display());
        Ok(())
    }

    fn release(&mut self, id: Uuid) {
        let path = self.path_for(id);
        match std::fs::remove_file(&path) {
            Ok(()) => debug!("Released preview {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to release preview {}: {e}", path.display()),
        }
    }
}
