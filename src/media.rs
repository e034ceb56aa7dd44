//! Temporary media files for in-flight messages.

use std::path::PathBuf;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::formats::ContentKind;

/// Working directory for downloaded and converted media.
///
/// Scoped per process so two deployments on the same host never share
/// paths; the files inside are keyed by a fresh UUID per message, so
/// concurrent pipeline runs never touch each other's files either.
pub struct MediaStore {
    dir: PathBuf,
}

impl MediaStore {
    /// Create the working directory under the system temp dir.
    pub fn new() -> Result<Self, String> {
        let dir = std::env::temp_dir().join(format!("golosok-{}", std::process::id()));
        Self::at(dir)
    }

    pub fn at(dir: PathBuf) -> Result<Self, String> {
        std::fs::create_dir_all(&dir)
            .map_err(|e| format!("failed to create media dir {}: {e}", dir.display()))?;
        Ok(Self { dir })
    }

    /// Persist a downloaded payload under a fresh identifier.
    pub async fn save(&self, kind: ContentKind, bytes: &[u8]) -> Result<TempMedia, String> {
        let media = TempMedia {
            id: Uuid::new_v4().to_string(),
            dir: self.dir.clone(),
            kind,
        };
        let path = media.source_path();
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| format!("failed to write {}: {e}", path.display()))?;
        debug!("saved {} payload to {}", kind.as_str(), path.display());
        Ok(media)
    }
}

/// The pair of temp files belonging to one message: the downloaded source
/// and the normalized wav next to it, both named by the same identifier.
pub struct TempMedia {
    id: String,
    dir: PathBuf,
    kind: ContentKind,
}

impl TempMedia {
    pub fn source_path(&self) -> PathBuf {
        self.dir.join(format!("{}{}", self.id, self.kind.source_ext()))
    }

    pub fn wav_path(&self) -> PathBuf {
        self.dir.join(format!("{}{}", self.id, self.kind.target_ext()))
    }

    /// Remove both files, best effort.
    ///
    /// A missing file is fine: the normalizer may have failed before
    /// producing the wav. Calling this twice is equally harmless.
    pub async fn cleanup(&self) {
        for path in [self.source_path(), self.wav_path()] {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    debug!("nothing to clean at {}", path.display());
                }
                Err(e) => warn!("failed to remove {}: {e}", path.display()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store(dir: &tempfile::TempDir) -> MediaStore {
        MediaStore::at(dir.path().to_path_buf()).expect("store should create its dir")
    }

    #[tokio::test]
    async fn save_writes_source_with_registered_extension() {
        let dir = tempdir().unwrap();
        let media = store(&dir)
            .save(ContentKind::Voice, b"fake ogg bytes")
            .await
            .expect("save should succeed");

        let source = media.source_path();
        assert!(source.exists());
        assert!(source.to_string_lossy().ends_with(".ogg"));
        assert_eq!(std::fs::read(&source).unwrap(), b"fake ogg bytes");
        assert!(!media.wav_path().exists());
    }

    #[tokio::test]
    async fn distinct_saves_get_distinct_identifiers() {
        let dir = tempdir().unwrap();
        let store = store(&dir);
        let first = store.save(ContentKind::Audio, b"a").await.unwrap();
        let second = store.save(ContentKind::Audio, b"b").await.unwrap();
        assert_ne!(first.source_path(), second.source_path());
    }

    #[tokio::test]
    async fn cleanup_removes_both_files() {
        let dir = tempdir().unwrap();
        let media = store(&dir).save(ContentKind::Voice, b"ogg").await.unwrap();
        std::fs::write(media.wav_path(), b"wav").unwrap();

        media.cleanup().await;

        assert!(!media.source_path().exists());
        assert!(!media.wav_path().exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn cleanup_tolerates_missing_wav() {
        // Normalization failed: only the source exists.
        let dir = tempdir().unwrap();
        let media = store(&dir).save(ContentKind::Video, b"mp4").await.unwrap();

        media.cleanup().await;

        assert!(!media.source_path().exists());
    }

    #[tokio::test]
    async fn double_cleanup_is_a_no_op() {
        let dir = tempdir().unwrap();
        let media = store(&dir).save(ContentKind::Voice, b"ogg").await.unwrap();

        media.cleanup().await;
        media.cleanup().await;

        assert!(!media.source_path().exists());
    }
}
