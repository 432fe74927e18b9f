use std::collections::BTreeMap;
use std::future::Future;
use std::path::{Path, PathBuf};

use crate::timeline::model::Asset;

/// A concrete readable location for one asset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolvedAsset {
    /// A file the engine can read in place.
    Path(PathBuf),
    /// Fetched content that must be staged to disk before rendering.
    Bytes(Vec<u8>),
}

/// Why a single asset could not be resolved. Never fatal to an invocation on its own.
#[derive(thiserror::Error, Debug)]
pub enum ResolveError {
    #[error("asset '{id}' not found at '{location}'")]
    NotFound { id: String, location: String },

    #[error("asset '{id}' has unusable location '{location}': {reason}")]
    InvalidLocation {
        id: String,
        location: String,
        reason: String,
    },

    #[error("asset '{id}' could not be read: {source}")]
    Io {
        id: String,
        #[source]
        source: std::io::Error,
    },
}

impl ResolveError {
    pub fn not_found(id: &str, location: impl Into<String>) -> Self {
        Self::NotFound {
            id: id.to_string(),
            location: location.into(),
        }
    }

    pub fn invalid_location(id: &str, location: &str, reason: impl Into<String>) -> Self {
        Self::InvalidLocation {
            id: id.to_string(),
            location: location.to_string(),
            reason: reason.into(),
        }
    }
}

/// Maps a logical asset reference to something the engine can read.
///
/// Implementations must be safe to call concurrently for distinct ids.
pub trait AssetResolver: Send + Sync {
    fn resolve(
        &self,
        id: &str,
        asset: &Asset,
    ) -> impl Future<Output = Result<ResolvedAsset, ResolveError>> + Send;
}

/// Resolves asset locations as relative paths under a local root directory.
///
/// A leading `/` is treated as root-relative (`/uploads/a.mp4` → `<root>/uploads/a.mp4`);
/// `..` segments and remote URLs are rejected.
#[derive(Clone, Debug)]
pub struct LocalAssetResolver {
    root: PathBuf,
}

impl LocalAssetResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path the asset would resolve to, without touching the filesystem.
    pub fn candidate_path(&self, id: &str, asset: &Asset) -> Result<PathBuf, ResolveError> {
        let rel = normalize_location(&asset.location)
            .map_err(|reason| ResolveError::invalid_location(id, &asset.location, reason))?;
        Ok(self.root.join(rel))
    }
}

impl AssetResolver for LocalAssetResolver {
    async fn resolve(&self, id: &str, asset: &Asset) -> Result<ResolvedAsset, ResolveError> {
        let path = self.candidate_path(id, asset)?;
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => {
                tracing::debug!(asset = id, path = %path.display(), "resolved local asset");
                Ok(ResolvedAsset::Path(path))
            }
            Ok(_) => Err(ResolveError::not_found(id, path.display().to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ResolveError::not_found(id, path.display().to_string()))
            }
            Err(source) => Err(ResolveError::Io {
                id: id.to_string(),
                source,
            }),
        }
    }
}

/// Normalize a location into a clean relative path (forward slashes, no `.`/empty segments).
pub(crate) fn normalize_location(location: &str) -> Result<String, &'static str> {
    if location.contains("://") {
        return Err("remote locations are not readable locally");
    }
    let s = location.replace('\\', "/");

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err("paths must not contain '..'");
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err("path must contain a file name");
    }
    Ok(out.join("/"))
}

/// In-memory id → location table; useful when assets were materialized elsewhere.
#[derive(Clone, Debug, Default)]
pub struct StaticResolver {
    entries: BTreeMap<String, ResolvedAsset>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_path(mut self, id: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.entries
            .insert(id.into(), ResolvedAsset::Path(path.into()));
        self
    }

    pub fn with_bytes(mut self, id: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.entries
            .insert(id.into(), ResolvedAsset::Bytes(bytes.into()));
        self
    }

    pub fn insert(&mut self, id: impl Into<String>, resolved: ResolvedAsset) {
        self.entries.insert(id.into(), resolved);
    }
}

impl AssetResolver for StaticResolver {
    async fn resolve(&self, id: &str, asset: &Asset) -> Result<ResolvedAsset, ResolveError> {
        self.entries
            .get(id)
            .cloned()
            .ok_or_else(|| ResolveError::not_found(id, asset.location.clone()))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/resolver.rs"]
mod tests;
