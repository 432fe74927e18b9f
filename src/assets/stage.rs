use std::path::{Path, PathBuf};

use anyhow::Context as _;
use uuid::Uuid;

use crate::assets::resolver::ResolvedAsset;
use crate::foundation::core::sanitize_file_stem;
use crate::foundation::error::MontageResult;
use crate::timeline::model::Asset;

/// Per-invocation scratch directory.
///
/// Removed by [`ScratchDir::close`] on normal exit paths; dropping it (panic, cancellation,
/// early return) removes it as well.
#[derive(Debug)]
pub struct ScratchDir {
    dir: tempfile::TempDir,
}

impl ScratchDir {
    /// Create `<root>/montage-<compile_id>-XXXXXX`, creating `root` if needed.
    pub async fn create(root: &Path, compile_id: Uuid) -> MontageResult<Self> {
        tokio::fs::create_dir_all(root)
            .await
            .with_context(|| format!("failed to create scratch root '{}'", root.display()))?;
        let root = root.to_path_buf();
        let dir = tokio::task::spawn_blocking(move || {
            tempfile::Builder::new()
                .prefix(&format!("montage-{compile_id}-"))
                .tempdir_in(&root)
                .with_context(|| format!("failed to create scratch dir in '{}'", root.display()))
        })
        .await
        .context("scratch dir creation task failed")??;
        tracing::debug!(path = %dir.path().display(), "created scratch dir");
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Make a resolved asset readable by path. Local paths are used in place; fetched bytes are
    /// written into the scratch dir.
    pub async fn stage(
        &self,
        index: usize,
        id: &str,
        asset: &Asset,
        resolved: ResolvedAsset,
    ) -> MontageResult<PathBuf> {
        match resolved {
            ResolvedAsset::Path(p) => Ok(p),
            ResolvedAsset::Bytes(bytes) => {
                let path = self.path().join(staged_file_name(index, id, asset));
                tokio::fs::write(&path, &bytes)
                    .await
                    .with_context(|| format!("failed to stage asset '{id}' to '{}'", path.display()))?;
                tracing::debug!(asset = id, bytes = bytes.len(), path = %path.display(), "staged asset");
                Ok(path)
            }
        }
    }

    /// Remove the directory now. Failures are logged, never returned.
    pub fn close(self) {
        let path = self.dir.path().to_path_buf();
        if let Err(e) = self.dir.close() {
            tracing::warn!(path = %path.display(), error = %e, "scratch cleanup failed");
        }
    }
}

/// `NNN_<id>.<ext>`, with the extension taken from the asset name when it has one.
pub(crate) fn staged_file_name(index: usize, id: &str, asset: &Asset) -> String {
    let ext = asset
        .name
        .as_deref()
        .and_then(|n| Path::new(n).extension())
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| asset.kind.default_extension());
    format!("{index:03}_{}.{ext}", sanitize_file_stem(id))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/stage.rs"]
mod tests;
