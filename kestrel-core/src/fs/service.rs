//! `src/fs/service.rs`
//! ============================================================
//! # File-System Service Boundary
//!
//! Everything the interaction core needs from the outside world, behind one
//! trait: directory listings, path resolution, the staged-paste transfers,
//! trash, and the platform "open" handler. The engine only ever holds an
//! `Arc<dyn FileSystemService>`, so tests substitute a scripted double and
//! drive response ordering deterministically.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use clipstage::PastePlan;
use tokio::fs as TokioFs;
use tracing::{debug, warn};

use crate::error::AppError;
use crate::fs::entry_info::EntryInfo;

#[async_trait]
pub trait FileSystemService: Send + Sync {
    /// Enumerate a directory. The returned entries are a complete snapshot in
    /// presentation order; hidden entries are omitted unless requested.
    async fn list_directory(
        &self,
        path: &Path,
        include_hidden: bool,
    ) -> Result<Vec<EntryInfo>, AppError>;

    /// Parent of `path`, if it has one.
    fn parent(&self, path: &Path) -> Option<PathBuf>;

    /// The user's home directory.
    fn home(&self) -> PathBuf;

    /// Copy every source into `dest_dir`, keeping file names.
    async fn copy(&self, sources: &[Arc<PathBuf>], dest_dir: &Path) -> Result<(), AppError>;

    /// Move every source into `dest_dir`, keeping file names.
    async fn rename(&self, sources: &[Arc<PathBuf>], dest_dir: &Path) -> Result<(), AppError>;

    /// Send paths to the platform trash. Never a permanent erase.
    async fn trash(&self, paths: &[Arc<PathBuf>]) -> Result<(), AppError>;

    /// Open a path with the platform default handler, without blocking on it.
    async fn open_detached(&self, path: &Path) -> Result<(), AppError>;

    /// Report a picked path to the invoking process (picker mode). Ending the
    /// session afterwards is the engine's decision, not the service's.
    async fn report_picked(&self, path: &Path) -> Result<(), AppError>;
}

/// Local-disk implementation backed by `tokio::fs`, the `trash` crate, and
/// the `open` crate.
#[derive(Debug, Clone)]
pub struct LocalFileSystem {
    sort_directories_first: bool,
}

impl LocalFileSystem {
    #[must_use]
    pub const fn new(sort_directories_first: bool) -> Self {
        Self {
            sort_directories_first,
        }
    }

    fn sort_entries(&self, entries: &mut [EntryInfo]) {
        let dirs_first = self.sort_directories_first;
        entries.sort_by(|a: &EntryInfo, b: &EntryInfo| -> std::cmp::Ordering {
            if dirs_first && a.is_dir != b.is_dir {
                b.is_dir.cmp(&a.is_dir)
            } else {
                a.sort_key().cmp(&b.sort_key())
            }
        });
    }
}

#[async_trait]
impl FileSystemService for LocalFileSystem {
    async fn list_directory(
        &self,
        path: &Path,
        include_hidden: bool,
    ) -> Result<Vec<EntryInfo>, AppError> {
        let mut reader = TokioFs::read_dir(path).await.map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => AppError::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => AppError::PermissionDenied(path.to_path_buf()),
            _ => AppError::navigation_failed(path, e.to_string()),
        })?;

        let mut entries: Vec<EntryInfo> = Vec::new();

        while let Some(dir_entry) = reader
            .next_entry()
            .await
            .map_err(|e| AppError::navigation_failed(path, e.to_string()))?
        {
            // Entries whose metadata cannot be read are skipped, not fatal.
            let metadata = match dir_entry.metadata().await {
                Ok(m) => m,
                Err(e) => {
                    warn!(path = %dir_entry.path().display(), error = %e, "Skipping unreadable entry");
                    continue;
                }
            };

            let info = EntryInfo::from_metadata(dir_entry.path(), &metadata);
            if info.is_hidden && !include_hidden {
                continue;
            }

            entries.push(info);
        }

        self.sort_entries(&mut entries);
        debug!(path = %path.display(), count = entries.len(), "Directory listed");

        Ok(entries)
    }

    fn parent(&self, path: &Path) -> Option<PathBuf> {
        path.parent().map(Path::to_path_buf)
    }

    fn home(&self) -> PathBuf {
        directories::BaseDirs::new()
            .map_or_else(|| PathBuf::from("/"), |dirs| dirs.home_dir().to_path_buf())
    }

    async fn copy(&self, sources: &[Arc<PathBuf>], dest_dir: &Path) -> Result<(), AppError> {
        ensure_dest_dir(dest_dir)?;
        let plan = PastePlan::new(sources, dest_dir)?;

        tokio::task::spawn_blocking(move || -> Result<(), AppError> {
            for transfer in &plan.transfers {
                if transfer.source.is_dir() {
                    copy_dir_recursive(&transfer.source, &transfer.dest).map_err(|e| {
                        AppError::file_operation_failed("copy", transfer.source.as_ref().clone(), e)
                    })?;
                } else {
                    fs::copy(transfer.source.as_ref(), &transfer.dest).map_err(|e| {
                        AppError::file_operation_failed(
                            "copy",
                            transfer.source.as_ref().clone(),
                            e.to_string(),
                        )
                    })?;
                }
            }
            Ok(())
        })
        .await
        .map_err(|e| AppError::Other(e.to_string()))?
    }

    async fn rename(&self, sources: &[Arc<PathBuf>], dest_dir: &Path) -> Result<(), AppError> {
        ensure_dest_dir(dest_dir)?;
        let plan = PastePlan::new(sources, dest_dir)?;

        for transfer in &plan.transfers {
            TokioFs::rename(transfer.source.as_ref(), &transfer.dest)
                .await
                .map_err(|e| {
                    AppError::file_operation_failed(
                        "move",
                        transfer.source.as_ref().clone(),
                        e.to_string(),
                    )
                })?;
        }

        Ok(())
    }

    async fn trash(&self, paths: &[Arc<PathBuf>]) -> Result<(), AppError> {
        let paths: Vec<PathBuf> = paths.iter().map(|p| p.as_ref().clone()).collect();

        tokio::task::spawn_blocking(move || -> Result<(), AppError> {
            for path in &paths {
                trash::delete(path).map_err(|e| {
                    AppError::file_operation_failed("trash", path.clone(), e.to_string())
                })?;
            }
            Ok(())
        })
        .await
        .map_err(|e| AppError::Other(e.to_string()))?
    }

    async fn open_detached(&self, path: &Path) -> Result<(), AppError> {
        open::that_detached(path)
            .map_err(|e| AppError::file_operation_failed("open", path, e.to_string()))
    }

    async fn report_picked(&self, path: &Path) -> Result<(), AppError> {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{}", path.display())
            .and_then(|()| stdout.flush())
            .map_err(AppError::Io)
    }
}

fn ensure_dest_dir(dest_dir: &Path) -> Result<(), AppError> {
    if dest_dir.is_dir() {
        Ok(())
    } else {
        Err(AppError::navigation_failed(
            dest_dir,
            "destination must be a directory",
        ))
    }
}

fn copy_dir_recursive(src: &Path, dest: &Path) -> Result<(), String> {
    fs::create_dir_all(dest).map_err(|e| e.to_string())?;

    for entry in fs::read_dir(src).map_err(|e| e.to_string())? {
        let entry = entry.map_err(|e| e.to_string())?;
        let src_path = entry.path();
        let dest_path = dest.join(entry.file_name());

        if src_path.is_dir() {
            copy_dir_recursive(&src_path, &dest_path)?;
        } else {
            fs::copy(&src_path, &dest_path).map_err(|e| e.to_string())?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        fs::write(path, b"x").unwrap();
    }

    #[tokio::test]
    async fn test_listing_sorts_dirs_first_and_filters_hidden() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        fs::create_dir(root.join("zeta")).unwrap();
        touch(&root.join("alpha.txt"));
        touch(&root.join(".hidden"));

        let svc = LocalFileSystem::new(true);
        let entries = svc.list_directory(root, false).await.unwrap();

        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha.txt"]);

        let with_hidden = svc.list_directory(root, true).await.unwrap();
        assert_eq!(with_hidden.len(), 3);
        assert!(with_hidden.iter().any(|e| e.is_hidden));
    }

    #[tokio::test]
    async fn test_listing_missing_directory_is_not_found() {
        let svc = LocalFileSystem::new(true);
        let err = svc
            .list_directory(Path::new("/no/such/dir/anywhere"), false)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_copy_keeps_file_names() {
        let tmp = tempfile::tempdir().unwrap();
        let src_dir = tmp.path().join("src");
        let dest_dir = tmp.path().join("dest");
        fs::create_dir_all(&src_dir).unwrap();
        fs::create_dir_all(&dest_dir).unwrap();

        let file = src_dir.join("a.txt");
        touch(&file);
        let nested = src_dir.join("inner");
        fs::create_dir(&nested).unwrap();
        touch(&nested.join("b.txt"));

        let svc = LocalFileSystem::new(true);
        svc.copy(
            &[Arc::new(file.clone()), Arc::new(nested.clone())],
            &dest_dir,
        )
        .await
        .unwrap();

        assert!(dest_dir.join("a.txt").is_file());
        assert!(dest_dir.join("inner/b.txt").is_file());
        assert!(file.is_file());
    }

    #[tokio::test]
    async fn test_rename_moves_sources() {
        let tmp = tempfile::tempdir().unwrap();
        let dest_dir = tmp.path().join("dest");
        fs::create_dir_all(&dest_dir).unwrap();

        let file = tmp.path().join("moved.txt");
        touch(&file);

        let svc = LocalFileSystem::new(true);
        svc.rename(&[Arc::new(file.clone())], &dest_dir).await.unwrap();

        assert!(!file.exists());
        assert!(dest_dir.join("moved.txt").is_file());
    }

    #[tokio::test]
    async fn test_copy_into_file_destination_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("not_a_dir");
        touch(&file);

        let svc = LocalFileSystem::new(true);
        let err = svc
            .copy(&[Arc::new(tmp.path().join("whatever"))], &file)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NavigationFailed { .. }));
    }
}
