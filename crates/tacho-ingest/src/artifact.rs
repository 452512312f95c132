//! Raw file artifact storage.
//!
//! The engine only needs "store bytes, get back a stable reference". Paths
//! are scoped by organization/vehicle/download-timestamp so two uploads can
//! never share a path, and an existing path is never overwritten.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{IngestError, Result};
use crate::upload::TachographUpload;

/// A stored artifact: its stable reference plus the payload digest.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StoredArtifact {
    /// Stable reference the surrounding application hands back to us.
    pub reference: String,
    /// SHA-256 of the payload, lowercase hex.
    pub sha256_hex: String,
}

/// Storage for raw upload payloads.
pub trait ArtifactStore {
    /// Store `bytes` under `key`. Must refuse to overwrite an existing key.
    fn store(&self, key: &str, bytes: &[u8]) -> Result<StoredArtifact>;
}

/// Build the storage key for an upload:
/// `<organization>/<vehicle>/<download-timestamp>_<file-name>`.
pub fn artifact_key(upload: &TachographUpload) -> String {
    format!(
        "{}/{}/{}_{}",
        upload.organization_id,
        upload.vehicle_id,
        upload.download_date.format("%Y%m%dT%H%M%S"),
        sanitize_file_name(&upload.file_name),
    )
}

fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "upload.bin".to_string()
    } else {
        cleaned
    }
}

/// Filesystem-backed artifact store rooted at a directory.
#[derive(Debug, Clone)]
pub struct FsArtifactStore {
    root: PathBuf,
}

impl FsArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ArtifactStore for FsArtifactStore {
    fn store(&self, key: &str, bytes: &[u8]) -> Result<StoredArtifact> {
        let path = self.root.join(key);
        if path.exists() {
            return Err(IngestError::ArtifactCollision { path });
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| IngestError::ArtifactWrite {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(&path, bytes).map_err(|source| IngestError::ArtifactWrite {
            path: path.clone(),
            source,
        })?;

        let sha256_hex = {
            use sha2::{Digest, Sha256};
            hex::encode(Sha256::digest(bytes))
        };
        debug!(path = %path.display(), bytes = bytes.len(), "stored artifact");

        Ok(StoredArtifact {
            reference: path.to_string_lossy().into_owned(),
            sha256_hex,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_writes_and_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsArtifactStore::new(dir.path());

        let artifact = store.store("org/V-1/20250304T080000_a.ddd", b"payload").unwrap();
        assert!(Path::new(&artifact.reference).exists());
        assert_eq!(artifact.sha256_hex.len(), 64);

        let err = store
            .store("org/V-1/20250304T080000_a.ddd", b"other")
            .unwrap_err();
        assert!(matches!(err, IngestError::ArtifactCollision { .. }));

        // First payload untouched
        let kept = std::fs::read(&artifact.reference).unwrap();
        assert_eq!(kept, b"payload");
    }

    #[test]
    fn sanitize_keeps_safe_characters() {
        assert_eq!(sanitize_file_name("a b/c.ddd"), "a_b_c.ddd");
        assert_eq!(sanitize_file_name(""), "upload.bin");
    }
}
