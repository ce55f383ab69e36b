use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use dashmap::DashSet;
use tempfile::TempDir;

use crate::error::Result;

/// Upload and extraction roots. Every request works in its own pair of
/// subdirectories so concurrent submissions never see each other's files.
pub struct Workspace {
    upload_dir: PathBuf,
    extract_dir: PathBuf,
    active: Arc<DashSet<PathBuf>>,
    /// Held while a scope is created and for a whole purge pass, so a purge
    /// never sees a scope directory before it is registered.
    creating: Mutex<()>,
}

/// Request-scoped directories; both are deleted when the scope drops.
pub struct RequestScope {
    upload: TempDir,
    extract: TempDir,
    active: Arc<DashSet<PathBuf>>,
}

impl Workspace {
    pub fn open(upload_dir: &Path, extract_dir: &Path) -> Result<Self> {
        fs::create_dir_all(upload_dir)?;
        fs::create_dir_all(extract_dir)?;
        Ok(Self {
            upload_dir: upload_dir.to_path_buf(),
            extract_dir: extract_dir.to_path_buf(),
            active: Arc::new(DashSet::new()),
            creating: Mutex::new(()),
        })
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn extract_dir(&self) -> &Path {
        &self.extract_dir
    }

    fn lock_creation(&self) -> MutexGuard<'_, ()> {
        self.creating.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn begin(&self) -> Result<RequestScope> {
        let _guard = self.lock_creation();
        let upload = tempfile::Builder::new()
            .prefix("upload-")
            .tempdir_in(&self.upload_dir)?;
        self.active.insert(upload.path().to_path_buf());
        let extract = match tempfile::Builder::new()
            .prefix("extract-")
            .tempdir_in(&self.extract_dir)
        {
            Ok(dir) => dir,
            Err(e) => {
                self.active.remove(upload.path());
                return Err(e.into());
            }
        };
        self.active.insert(extract.path().to_path_buf());
        Ok(RequestScope {
            upload,
            extract,
            active: Arc::clone(&self.active),
        })
    }

    pub fn active_scopes(&self) -> usize {
        self.active.len() / 2
    }

    /// Remove everything under both roots that no live request owns.
    /// Returns the number of entries removed; failures are logged and skipped.
    pub fn purge_stale(&self) -> usize {
        let _guard = self.lock_creation();
        let mut removed = 0;
        for root in [&self.upload_dir, &self.extract_dir] {
            let entries = match fs::read_dir(root) {
                Ok(e) => e,
                Err(e) => {
                    tracing::warn!("cannot read {}: {e}", root.display());
                    continue;
                }
            };
            for entry in entries.flatten() {
                let path = entry.path();
                if self.active.contains(&path) {
                    continue;
                }
                let res = match entry.file_type() {
                    Ok(ft) if ft.is_dir() => fs::remove_dir_all(&path),
                    _ => fs::remove_file(&path),
                };
                match res {
                    Ok(()) => removed += 1,
                    Err(e) => tracing::warn!("failed to delete {}. Reason: {e}", path.display()),
                }
            }
        }
        if removed > 0 {
            tracing::info!(removed, "purged stale temp entries");
        }
        removed
    }
}

impl RequestScope {
    pub fn upload_dir(&self) -> &Path {
        self.upload.path()
    }

    pub fn extract_dir(&self) -> &Path {
        self.extract.path()
    }
}

impl Drop for RequestScope {
    fn drop(&mut self) {
        self.active.remove(self.upload.path());
        self.active.remove(self.extract.path());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workspace(root: &Path) -> Workspace {
        Workspace::open(&root.join("uploads"), &root.join("extracted_files")).unwrap()
    }

    #[test]
    fn open_creates_roots() {
        let root = tempfile::tempdir().unwrap();
        let ws = workspace(root.path());
        assert!(ws.upload_dir().is_dir());
        assert!(ws.extract_dir().is_dir());
    }

    #[test]
    fn scopes_are_distinct_and_cleaned_up() {
        let root = tempfile::tempdir().unwrap();
        let ws = workspace(root.path());
        let a = ws.begin().unwrap();
        let b = ws.begin().unwrap();
        assert_ne!(a.extract_dir(), b.extract_dir());
        assert!(a.extract_dir().starts_with(ws.extract_dir()));
        assert_eq!(ws.active_scopes(), 2);

        let a_dir = a.extract_dir().to_path_buf();
        fs::write(a_dir.join("srs.pdf"), b"x").unwrap();
        drop(a);
        assert!(!a_dir.exists());
        assert_eq!(ws.active_scopes(), 1);
        drop(b);
        assert_eq!(ws.active_scopes(), 0);
    }

    #[test]
    fn purge_keeps_active_scopes() {
        let root = tempfile::tempdir().unwrap();
        let ws = workspace(root.path());
        fs::write(ws.upload_dir().join("old.zip"), b"stale").unwrap();
        fs::create_dir(ws.extract_dir().join("leftover")).unwrap();
        fs::write(ws.extract_dir().join("leftover").join("wbs.docx"), b"x").unwrap();

        let live = ws.begin().unwrap();
        assert_eq!(ws.purge_stale(), 2);
        assert!(!ws.upload_dir().join("old.zip").exists());
        assert!(!ws.extract_dir().join("leftover").exists());
        assert!(live.upload_dir().is_dir());
        assert!(live.extract_dir().is_dir());
    }

    #[test]
    fn concurrent_purge_never_removes_a_new_scope() {
        use std::sync::atomic::{AtomicBool, Ordering};

        let root = tempfile::tempdir().unwrap();
        let ws = workspace(root.path());
        let stop = AtomicBool::new(false);

        std::thread::scope(|s| {
            s.spawn(|| {
                while !stop.load(Ordering::Relaxed) {
                    ws.purge_stale();
                }
            });
            let survived = (0..200).all(|_| {
                let scope = ws.begin().unwrap();
                fs::write(scope.upload_dir().join("submission.zip"), b"PK").is_ok()
                    && scope.extract_dir().is_dir()
            });
            stop.store(true, Ordering::Relaxed);
            assert!(survived);
        });
        assert_eq!(ws.active_scopes(), 0);
    }
}
