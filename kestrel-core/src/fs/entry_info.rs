//! `src/fs/entry_info.rs`
//! ============================================================
//! Immutable snapshot of one file-system object as reported by the
//! file-system service. Entries are replaced wholesale on every listing
//! refresh; nothing in the core mutates them.

use std::ffi::OsStr;
use std::fs::Metadata;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Local};
use compact_str::CompactString;

/// File, directory, or symlink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Dir,
    File,
    Symlink,
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dir => write!(f, "Dir"),
            Self::File => write!(f, "File"),
            Self::Symlink => write!(f, "Symlink"),
        }
    }
}

/// One directory entry. The absolute path is the unique key; everything else
/// is display metadata captured at listing time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    /// Shared absolute path - selection and clipboard key.
    pub path: Arc<PathBuf>,

    /// Byte length as reported by the metadata call.
    pub size: u64,

    /// Last-modification timestamp.
    pub modified: SystemTime,

    /// File or directory name.
    pub name: CompactString,

    /// Lower-case extension (files only).
    pub extension: Option<CompactString>,

    pub is_dir: bool,
    pub is_symlink: bool,

    /// Dotfile by name; listed only when hidden entries are requested.
    pub is_hidden: bool,
}

impl EntryInfo {
    /// Build an entry from a path and its (non-traversing) metadata.
    #[must_use]
    pub fn from_metadata(path: PathBuf, metadata: &Metadata) -> Self {
        let name: CompactString = path
            .file_name()
            .map_or_else(|| CompactString::new("/"), os_to_compact);

        let is_hidden = name.starts_with('.');
        let is_dir = metadata.is_dir();
        let is_symlink = metadata.file_type().is_symlink();

        let extension = if is_dir {
            None
        } else {
            path.extension()
                .and_then(OsStr::to_str)
                .map(|ext| CompactString::from(ext.to_lowercase()))
        };

        Self {
            path: Arc::new(path),
            size: metadata.len(),
            modified: metadata.modified().unwrap_or(UNIX_EPOCH),
            name,
            extension,
            is_dir,
            is_symlink,
            is_hidden,
        }
    }

    #[inline]
    #[must_use]
    pub const fn kind(&self) -> EntryKind {
        if self.is_dir {
            EntryKind::Dir
        } else if self.is_symlink {
            EntryKind::Symlink
        } else {
            EntryKind::File
        }
    }

    /// Local-time modification label for status output.
    #[must_use]
    pub fn modified_label(&self) -> String {
        let datetime: DateTime<Local> = self.modified.into();
        datetime.format("%Y-%m-%d %H:%M").to_string()
    }

    /// Lower-cased name used for listing order.
    #[must_use]
    pub fn sort_key(&self) -> String {
        self.name.to_lowercase().to_string()
    }
}

fn os_to_compact(os: &OsStr) -> CompactString {
    CompactString::from(os.to_string_lossy().as_ref())
}
