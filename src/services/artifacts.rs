//! Snapshot artifact resolution
//!
//! Maps a snapshot identifier to its image bytes and content type. Bytes
//! either live inline in the snapshot row or in a file under the snapshot
//! root; callers never see which.

use crate::error::AppError;
use crate::store::Store;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncReadExt;
use tracing::debug;

const OCTET_STREAM: &str = "application/octet-stream";

/// Where a resolved artifact's bytes come from
#[derive(Debug)]
pub enum ArtifactBody {
    /// Bytes loaded from the snapshot row
    Inline(Vec<u8>),
    /// Open file handle, streamed to the client
    File {
        /// Handle positioned at the start of the file
        file: fs::File,
        /// File size in bytes
        len: u64,
    },
}

/// A single snapshot image ready to be sent
#[derive(Debug)]
pub struct Artifact {
    /// MIME type of the image
    pub content_type: String,
    /// Suggested download file name
    pub filename: String,
    /// Image bytes
    pub body: ArtifactBody,
}

impl Artifact {
    /// Size of the image in bytes
    pub fn content_length(&self) -> u64 {
        match &self.body {
            ArtifactBody::Inline(bytes) => bytes.len() as u64,
            ArtifactBody::File { len, .. } => *len,
        }
    }

    /// Read the whole image into memory
    pub async fn into_bytes(self) -> Result<Vec<u8>, AppError> {
        match self.body {
            ArtifactBody::Inline(bytes) => Ok(bytes),
            ArtifactBody::File { mut file, len } => {
                let mut bytes = Vec::with_capacity(len as usize);
                file.read_to_end(&mut bytes).await.map_err(|e| {
                    AppError::Internal(anyhow::anyhow!("Failed to read artifact: {}", e))
                })?;
                Ok(bytes)
            }
        }
    }
}

/// Resolves snapshot identifiers to image bytes
pub struct ArtifactResolver {
    store: Arc<Store>,
    snapshot_root: PathBuf,
}

impl ArtifactResolver {
    /// Create a resolver serving files only from under `snapshot_root`
    pub fn new(store: Arc<Store>, snapshot_root: impl Into<PathBuf>) -> Self {
        Self {
            store,
            snapshot_root: snapshot_root.into(),
        }
    }

    /// Resolve a snapshot identifier to its image
    ///
    /// # Returns
    /// * `Ok(Artifact)` - Inline bytes, or an open handle on the backing file
    /// * `Err(AppError::SnapshotNotFound)` - No snapshot has this identifier
    /// * `Err(AppError::ArtifactMissing)` - Snapshot exists but has no readable image
    /// * `Err(AppError::InvalidPath)` - Stored path escapes the snapshot root
    /// * `Err(AppError::StoreUnavailable)` - Store unreachable or timed out
    pub async fn resolve_snapshot(&self, snapshot_id: i64) -> Result<Artifact, AppError> {
        let record = self
            .store
            .find_artifact(snapshot_id)
            .await?
            .ok_or(AppError::SnapshotNotFound(snapshot_id))?;

        if let Some(bytes) = record.image_blob.filter(|b| !b.is_empty()) {
            let content_type = record
                .mime_type
                .or_else(|| sniff_image_type(&bytes).map(str::to_string))
                .unwrap_or_else(|| OCTET_STREAM.to_string());
            let filename = format!("snapshot-{}.{}", snapshot_id, extension_for(&content_type));
            debug!(snapshot_id, size = bytes.len(), "Resolved inline artifact");
            return Ok(Artifact {
                content_type,
                filename,
                body: ArtifactBody::Inline(bytes),
            });
        }

        match record.filepath.filter(|p| !p.trim().is_empty()) {
            Some(filepath) => {
                let artifact = self.open_file(&filepath, record.mime_type).await?;
                debug!(snapshot_id, size = artifact.content_length(), "Resolved file artifact");
                Ok(artifact)
            }
            None => Err(AppError::ArtifactMissing(format!(
                "Snapshot {} has no stored image",
                snapshot_id
            ))),
        }
    }

    /// Resolve a raw file path, which must live under the snapshot root
    pub async fn resolve_path(&self, filepath: &str) -> Result<Artifact, AppError> {
        self.open_file(filepath, None).await
    }

    async fn open_file(
        &self,
        filepath: &str,
        mime_type: Option<String>,
    ) -> Result<Artifact, AppError> {
        let path = self.contained_path(filepath).await?;

        let file = fs::File::open(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => AppError::ArtifactMissing(format!("File not found: {}", filepath)),
            _ => AppError::Internal(anyhow::anyhow!("Failed to open {}: {}", path.display(), e)),
        })?;
        let metadata = file.metadata().await.map_err(|e| {
            AppError::Internal(anyhow::anyhow!("Failed to read metadata: {}", e))
        })?;
        if !metadata.is_file() {
            return Err(AppError::ArtifactMissing(format!(
                "Not a file: {}",
                filepath
            )));
        }

        let content_type = mime_type.unwrap_or_else(|| {
            mime_guess::from_path(&path)
                .first_raw()
                .unwrap_or(OCTET_STREAM)
                .to_string()
        });
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("snapshot")
            .to_string();

        Ok(Artifact {
            content_type,
            filename,
            body: ArtifactBody::File {
                file,
                len: metadata.len(),
            },
        })
    }

    /// Canonicalize `filepath` and check it stays under the snapshot root
    ///
    /// Relative paths are taken relative to the snapshot root.
    async fn contained_path(&self, filepath: &str) -> Result<PathBuf, AppError> {
        let root = fs::canonicalize(&self.snapshot_root).await.map_err(|e| {
            AppError::ArtifactMissing(format!(
                "Snapshot root {} is not accessible: {}",
                self.snapshot_root.display(),
                e
            ))
        })?;

        let candidate = Path::new(filepath);
        let joined = if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            root.join(candidate)
        };

        let canonical = fs::canonicalize(&joined).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => AppError::ArtifactMissing(format!("File not found: {}", filepath)),
            _ => AppError::InvalidPath(format!("Invalid path: {} - {}", filepath, e)),
        })?;

        if !canonical.starts_with(&root) {
            return Err(AppError::InvalidPath(format!(
                "Requested file is outside the snapshot folder: {}",
                filepath
            )));
        }

        Ok(canonical)
    }
}

/// Identify common image formats by their magic number
pub fn sniff_image_type(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        Some("image/png")
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        Some("image/gif")
    } else if bytes.len() >= 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WEBP" {
        Some("image/webp")
    } else if bytes.starts_with(b"BM") {
        Some("image/bmp")
    } else {
        None
    }
}

fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/png" => "png",
        "image/jpeg" => "jpg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/bmp" => "bmp",
        _ => "bin",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testing::{
        seed_employee, seed_snapshot, seed_snapshot_blob, seed_snapshot_file, temp_store,
    };
    use tempfile::TempDir;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR";
    const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];

    async fn resolver_with_root() -> (ArtifactResolver, Arc<Store>, TempDir, TempDir) {
        let (store, db_dir) = temp_store().await;
        let store = Arc::new(store);
        let root = TempDir::new().unwrap();
        let resolver = ArtifactResolver::new(store.clone(), root.path());
        (resolver, store, db_dir, root)
    }

    #[test]
    fn test_sniff_image_type() {
        assert_eq!(sniff_image_type(PNG), Some("image/png"));
        assert_eq!(sniff_image_type(JPEG), Some("image/jpeg"));
        assert_eq!(sniff_image_type(b"GIF89a...."), Some("image/gif"));
        assert_eq!(sniff_image_type(b"RIFF\0\0\0\0WEBPVP8 "), Some("image/webp"));
        assert_eq!(sniff_image_type(b"hello"), None);
        assert_eq!(sniff_image_type(b""), None);
    }

    #[tokio::test]
    async fn test_inline_blob_round_trip() {
        let (resolver, store, _db, _root) = resolver_with_root().await;
        let emp = seed_employee(&store, "Ink", "ink").await;
        let id = seed_snapshot_blob(&store, emp, JPEG, None).await;

        let artifact = resolver.resolve_snapshot(id).await.unwrap();
        assert_eq!(artifact.content_type, "image/jpeg");
        assert_eq!(artifact.filename, format!("snapshot-{}.jpg", id));
        assert_eq!(artifact.content_length(), JPEG.len() as u64);
        assert_eq!(artifact.into_bytes().await.unwrap(), JPEG);
    }

    #[tokio::test]
    async fn test_stored_mime_type_wins() {
        let (resolver, store, _db, _root) = resolver_with_root().await;
        let emp = seed_employee(&store, "Mime", "mime").await;
        let id = seed_snapshot_blob(&store, emp, PNG, Some("image/x-custom")).await;

        let artifact = resolver.resolve_snapshot(id).await.unwrap();
        assert_eq!(artifact.content_type, "image/x-custom");
    }

    #[tokio::test]
    async fn test_file_backed_relative_path() {
        let (resolver, store, _db, root) = resolver_with_root().await;
        std::fs::create_dir(root.path().join("frank")).unwrap();
        std::fs::write(root.path().join("frank/20240101_120000_Editor.png"), PNG).unwrap();
        let emp = seed_employee(&store, "Frank", "frank").await;
        let id = seed_snapshot_file(&store, emp, "frank/20240101_120000_Editor.png").await;

        let artifact = resolver.resolve_snapshot(id).await.unwrap();
        assert_eq!(artifact.content_type, "image/png");
        assert_eq!(artifact.filename, "20240101_120000_Editor.png");
        assert_eq!(artifact.into_bytes().await.unwrap(), PNG);
    }

    #[tokio::test]
    async fn test_file_backed_absolute_path() {
        let (resolver, store, _db, root) = resolver_with_root().await;
        let path = root.path().join("shot.jpg");
        std::fs::write(&path, JPEG).unwrap();
        let emp = seed_employee(&store, "Abs", "abs").await;
        let id = seed_snapshot_file(&store, emp, path.to_str().unwrap()).await;

        let artifact = resolver.resolve_snapshot(id).await.unwrap();
        assert_eq!(artifact.content_type, "image/jpeg");
        assert_eq!(artifact.content_length(), JPEG.len() as u64);
    }

    #[tokio::test]
    async fn test_unknown_snapshot_is_not_found() {
        let (resolver, _store, _db, _root) = resolver_with_root().await;
        match resolver.resolve_snapshot(999).await {
            Err(AppError::SnapshotNotFound(999)) => {}
            other => panic!("Expected SnapshotNotFound, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_snapshot_without_image() {
        let (resolver, store, _db, _root) = resolver_with_root().await;
        let emp = seed_employee(&store, "Empty", "empty").await;
        let id = seed_snapshot(&store, emp, "no image", 1).await;
        match resolver.resolve_snapshot(id).await {
            Err(AppError::ArtifactMissing(_)) => {}
            other => panic!("Expected ArtifactMissing, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_file_is_artifact_missing() {
        let (resolver, store, _db, _root) = resolver_with_root().await;
        let emp = seed_employee(&store, "Gone", "gone").await;
        let id = seed_snapshot_file(&store, emp, "gone/deleted.png").await;
        match resolver.resolve_snapshot(id).await {
            Err(AppError::ArtifactMissing(_)) => {}
            other => panic!("Expected ArtifactMissing, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_path_outside_root_rejected() {
        let (resolver, store, _db, _root) = resolver_with_root().await;
        let outside = TempDir::new().unwrap();
        let secret = outside.path().join("secret.png");
        std::fs::write(&secret, PNG).unwrap();
        let emp = seed_employee(&store, "Sneaky", "sneaky").await;
        let id = seed_snapshot_file(&store, emp, secret.to_str().unwrap()).await;

        match resolver.resolve_snapshot(id).await {
            Err(AppError::InvalidPath(_)) => {}
            other => panic!("Expected InvalidPath, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_resolve_path_traversal_rejected() {
        let (resolver, _store, _db, root) = resolver_with_root().await;
        let sibling = root.path().parent().unwrap().join(format!(
            "enyard-traversal-{}.png",
            uuid::Uuid::new_v4()
        ));
        std::fs::write(&sibling, PNG).unwrap();
        let relative = format!("../{}", sibling.file_name().unwrap().to_str().unwrap());

        let result = resolver.resolve_path(&relative).await;
        std::fs::remove_file(&sibling).unwrap();
        match result {
            Err(AppError::InvalidPath(_)) => {}
            other => panic!("Expected InvalidPath, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_directory_is_not_an_artifact() {
        let (resolver, _store, _db, root) = resolver_with_root().await;
        std::fs::create_dir(root.path().join("folder")).unwrap();
        match resolver.resolve_path("folder").await {
            Err(AppError::ArtifactMissing(_)) => {}
            other => panic!("Expected ArtifactMissing, got: {:?}", other),
        }
    }
}
