//! Blob store for article bodies and uploaded images.
//!
//! Paths are relative, `/`-separated keys such as `blog/hello-world.md`.
//! `AppState` holds an `Arc<dyn BlobStore>`; production uses `FsBlobStore`
//! rooted at the configured resources directory.

use std::io;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use uuid::Uuid;

/// Key of the markdown body for the article with `alias`.
pub fn article_path(alias: &str) -> String {
    format!("blog/{alias}.md")
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn read(&self, path: &str) -> io::Result<Bytes>;

    /// Replaces the blob at `path`, creating parent directories as needed.
    async fn write(&self, path: &str, bytes: Bytes) -> io::Result<()>;

    /// Removing a missing blob succeeds.
    async fn delete(&self, path: &str) -> io::Result<()>;
}

pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FsBlobStore { root: root.into() }
    }

    fn resolve(&self, path: &str) -> io::Result<PathBuf> {
        let relative = Path::new(path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if path.is_empty() || escapes {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("blob path '{path}' must be relative and stay inside the store"),
            ));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn read(&self, path: &str) -> io::Result<Bytes> {
        let full = self.resolve(path)?;
        Ok(Bytes::from(tokio::fs::read(full).await?))
    }

    /// Writes to a sibling temp file and renames it over the target, so a
    /// failed write never leaves a truncated blob behind.
    async fn write(&self, path: &str, bytes: Bytes) -> io::Result<()> {
        let full = self.resolve(path)?;
        let parent = full.parent().unwrap_or(&self.root).to_path_buf();
        tokio::fs::create_dir_all(&parent).await?;

        let file_name = full
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let tmp = parent.join(format!(".{file_name}.{}.tmp", Uuid::new_v4().simple()));

        let written = match tokio::fs::write(&tmp, bytes).await {
            Ok(()) => tokio::fs::rename(&tmp, &full).await,
            Err(e) => Err(e),
        };
        if written.is_err() {
            let _ = tokio::fs::remove_file(&tmp).await;
        }
        written
    }

    async fn delete(&self, path: &str) -> io::Result<()> {
        let full = self.resolve(path)?;
        match tokio::fs::metadata(&full).await {
            Ok(meta) if meta.is_dir() => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("blob path '{path}' is a directory"),
            )),
            Ok(_) => tokio::fs::remove_file(full).await,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
pub mod memory {
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    use super::*;

    /// In-memory `BlobStore` with switchable write/delete failures.
    #[derive(Default)]
    pub struct MemoryBlobStore {
        blobs: Mutex<BTreeMap<String, Bytes>>,
        pub fail_writes: AtomicBool,
        pub fail_deletes: AtomicBool,
    }

    impl MemoryBlobStore {
        pub fn get(&self, path: &str) -> Option<String> {
            self.blobs
                .lock()
                .unwrap()
                .get(path)
                .map(|b| String::from_utf8_lossy(b).into_owned())
        }

        pub fn paths(&self) -> Vec<String> {
            self.blobs.lock().unwrap().keys().cloned().collect()
        }

        pub fn insert(&self, path: &str, content: &str) {
            self.blobs
                .lock()
                .unwrap()
                .insert(path.to_string(), Bytes::from(content.to_string()));
        }
    }

    #[async_trait]
    impl BlobStore for MemoryBlobStore {
        async fn read(&self, path: &str) -> io::Result<Bytes> {
            self.blobs
                .lock()
                .unwrap()
                .get(path)
                .cloned()
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, path.to_string()))
        }

        async fn write(&self, path: &str, bytes: Bytes) -> io::Result<()> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(io::Error::new(io::ErrorKind::Other, "disk full"));
            }
            self.blobs.lock().unwrap().insert(path.to_string(), bytes);
            Ok(())
        }

        async fn delete(&self, path: &str) -> io::Result<()> {
            if self.fail_deletes.load(Ordering::SeqCst) {
                return Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"));
            }
            self.blobs.lock().unwrap().remove(path);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_path_uses_alias() {
        assert_eq!(article_path("hello-world"), "blog/hello-world.md");
    }

    #[tokio::test]
    async fn test_fs_write_creates_parent_and_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path());

        store
            .write("blog/first.md", Bytes::from_static(b"# First"))
            .await
            .unwrap();

        assert!(dir.path().join("blog/first.md").is_file());
        let body = store.read("blog/first.md").await.unwrap();
        assert_eq!(&body[..], b"# First");
    }

    #[tokio::test]
    async fn test_fs_overwrite_replaces_body_without_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path());
        store
            .write("blog/post.md", Bytes::from_static(b"first draft, rather long"))
            .await
            .unwrap();
        store
            .write("blog/post.md", Bytes::from_static(b"final"))
            .await
            .unwrap();

        assert_eq!(&store.read("blog/post.md").await.unwrap()[..], b"final");
        let entries: Vec<_> = std::fs::read_dir(dir.path().join("blog"))
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(entries, vec!["post.md".to_string()]);
    }

    #[tokio::test]
    async fn test_fs_failed_write_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path());
        store
            .write("blog/post.md", Bytes::from_static(b"original"))
            .await
            .unwrap();
        // A directory in the way makes the rename fail after the temp file is written.
        std::fs::create_dir_all(dir.path().join("blog/locked.md/inner")).unwrap();

        assert!(store
            .write("blog/locked.md", Bytes::from_static(b"new"))
            .await
            .is_err());
        assert!(dir.path().join("blog/locked.md/inner").is_dir());
        assert_eq!(&store.read("blog/post.md").await.unwrap()[..], b"original");
        let leftovers = std::fs::read_dir(dir.path().join("blog"))
            .unwrap()
            .filter(|e| {
                e.as_ref()
                    .unwrap()
                    .file_name()
                    .to_string_lossy()
                    .ends_with(".tmp")
            })
            .count();
        assert_eq!(leftovers, 0);
    }

    #[tokio::test]
    async fn test_fs_delete_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path());
        store
            .write("blog/gone.md", Bytes::from_static(b"bye"))
            .await
            .unwrap();

        store.delete("blog/gone.md").await.unwrap();
        store.delete("blog/gone.md").await.unwrap();
        assert!(!dir.path().join("blog/gone.md").exists());
    }

    #[tokio::test]
    async fn test_fs_delete_refuses_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("blog/nested.md")).unwrap();
        let store = FsBlobStore::new(dir.path());

        assert!(store.delete("blog/nested.md").await.is_err());
        assert!(dir.path().join("blog/nested.md").is_dir());
    }

    #[tokio::test]
    async fn test_fs_rejects_paths_outside_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path().join("resources"));

        let err = store
            .write("../escape.md", Bytes::from_static(b"x"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert!(store.read("/etc/passwd").await.is_err());
    }

    #[tokio::test]
    async fn test_fs_read_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path());
        let err = store.read("blog/nothing.md").await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
