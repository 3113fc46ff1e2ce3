//! Filesystem abstraction used by the locator.
//!
//! The locator only needs to know what kind of entry a path is, to walk the
//! entries under a directory, and to read a file. `DiskFileSystem` does this
//! against the real disk with walkdir; `MemoryFileSystem` holds a virtual
//! tree in memory.

use globset::GlobSet;
use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// What a path refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    /// Dangling symlinks, sockets, devices.
    Other,
}

/// One entry produced while walking a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    pub path: PathBuf,
    pub kind: EntryKind,
}

/// Controls which entries a walk descends into and reports.
#[derive(Debug, Clone)]
pub struct WalkOptions {
    pub follow_links: bool,
    /// Skip entries whose name starts with `.`.
    pub skip_hidden: bool,
    /// Matched against the path relative to the walk root and the full path.
    pub excluded: GlobSet,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            follow_links: false,
            skip_hidden: false,
            excluded: GlobSet::empty(),
        }
    }
}

impl WalkOptions {
    /// Whether `path`, found below `root`, should be visited.
    /// The root itself is always visited.
    pub fn allows(&self, root: &Path, path: &Path) -> bool {
        if path == root {
            return true;
        }
        if self.skip_hidden {
            let hidden = path
                .file_name()
                .map(|n| n.to_string_lossy().starts_with('.'))
                .unwrap_or(false);
            if hidden {
                return false;
            }
        }
        if self.excluded.is_empty() {
            return true;
        }
        let relative = path.strip_prefix(root).unwrap_or(path);
        !(self.excluded.is_match(relative) || self.excluded.is_match(path))
    }
}

/// A failure while walking, tagged with the entry that caused it.
#[derive(Debug)]
pub struct WalkError {
    pub path: PathBuf,
    pub source: io::Error,
}

/// Boxed stream of walk results.
pub type Walk<'a> = Box<dyn Iterator<Item = Result<WalkEntry, WalkError>> + 'a>;

/// Read access to a directory tree.
pub trait FileSystem {
    /// Kind of the entry at `path`, or `None` if nothing exists there.
    fn kind(&self, path: &Path) -> Option<EntryKind>;

    /// Absolute form of `path`.
    fn absolute(&self, path: &Path) -> io::Result<PathBuf>;

    /// Walk `root` depth-first, pre-order, siblings sorted by file name.
    /// The root itself is the first entry. Entries rejected by
    /// [`WalkOptions::allows`] are skipped and, for directories, not descended.
    fn walk<'a>(&'a self, root: &Path, options: &'a WalkOptions) -> Walk<'a>;

    /// Read the raw bytes of a file.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
}

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskFileSystem;

impl FileSystem for DiskFileSystem {
    fn kind(&self, path: &Path) -> Option<EntryKind> {
        let metadata = std::fs::metadata(path).ok()?;
        Some(kind_of(metadata.file_type()))
    }

    fn absolute(&self, path: &Path) -> io::Result<PathBuf> {
        std::fs::canonicalize(path)
    }

    fn walk<'a>(&'a self, root: &Path, options: &'a WalkOptions) -> Walk<'a> {
        let root = root.to_path_buf();
        let filter_root = root.clone();
        let walker = WalkDir::new(&root)
            .follow_links(options.follow_links)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |e| options.allows(&filter_root, e.path()));

        Box::new(walker.map(move |entry| -> Result<WalkEntry, WalkError> {
            let entry = entry.map_err(|e| WalkError {
                path: e.path().map_or_else(|| root.clone(), Path::to_path_buf),
                source: io::Error::from(e),
            })?;
            // Unfollowed links are classified by their target but never descended.
            let kind = if entry.path_is_symlink() && !options.follow_links {
                std::fs::metadata(entry.path())
                    .map(|m| kind_of(m.file_type()))
                    .unwrap_or(EntryKind::Other)
            } else {
                kind_of(entry.file_type())
            };
            Ok(WalkEntry {
                path: entry.into_path(),
                kind,
            })
        }))
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }
}

fn kind_of(file_type: std::fs::FileType) -> EntryKind {
    if file_type.is_dir() {
        EntryKind::Directory
    } else if file_type.is_file() {
        EntryKind::File
    } else {
        EntryKind::Other
    }
}

/// An in-memory tree of files. Directories exist implicitly as ancestors
/// of files.
#[derive(Debug, Clone, Default)]
pub struct MemoryFileSystem {
    /// `None` marks a file that exists but cannot be read.
    files: BTreeMap<PathBuf, Option<Vec<u8>>>,
    /// Directories whose contents cannot be listed.
    sealed: BTreeSet<PathBuf>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file.
    pub fn insert(&mut self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), Some(contents.into()));
    }

    /// Add a file whose reads fail with `PermissionDenied`.
    pub fn insert_unreadable(&mut self, path: impl Into<PathBuf>) {
        self.files.insert(path.into(), None);
    }

    /// Add a directory whose listing fails with `PermissionDenied`.
    /// Its contents are never walked.
    pub fn insert_unreadable_dir(&mut self, path: impl Into<PathBuf>) {
        self.sealed.insert(path.into());
    }

    /// Builder form of [`MemoryFileSystem::insert`].
    pub fn with_file(mut self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> Self {
        self.insert(path, contents);
        self
    }

    /// Every file and implied directory strictly below `root`, in walk order.
    fn entries_below(&self, root: &Path) -> BTreeSet<PathBuf> {
        let mut entries = BTreeSet::new();
        let paths = self.files.keys().chain(self.sealed.iter());
        for file in paths.filter(|p| p.starts_with(root) && *p != root) {
            entries.insert(file.clone());
            let mut parent = file.parent();
            while let Some(dir) = parent {
                if dir == root || !dir.starts_with(root) {
                    break;
                }
                entries.insert(dir.to_path_buf());
                parent = dir.parent();
            }
        }
        entries
    }
}

impl FileSystem for MemoryFileSystem {
    fn kind(&self, path: &Path) -> Option<EntryKind> {
        if self.files.contains_key(path) {
            Some(EntryKind::File)
        } else if self.files.keys().chain(self.sealed.iter()).any(|p| p.starts_with(path)) {
            Some(EntryKind::Directory)
        } else {
            None
        }
    }

    fn absolute(&self, path: &Path) -> io::Result<PathBuf> {
        if path.is_absolute() {
            Ok(path.to_path_buf())
        } else {
            Ok(Path::new("/").join(path))
        }
    }

    fn walk<'a>(&'a self, root: &Path, options: &'a WalkOptions) -> Walk<'a> {
        let Some(root_kind) = self.kind(root) else {
            let err = WalkError {
                path: root.to_path_buf(),
                source: io::Error::new(io::ErrorKind::NotFound, "no such directory"),
            };
            return Box::new(std::iter::once(Err(err)));
        };

        let mut walked = vec![Ok(WalkEntry {
            path: root.to_path_buf(),
            kind: root_kind,
        })];
        if self.sealed.contains(root) {
            walked.push(Err(sealed_error(root)));
            return Box::new(walked.into_iter());
        }
        let mut pruned: Option<PathBuf> = None;

        for path in self.entries_below(root) {
            if pruned.as_ref().is_some_and(|dir| path.starts_with(dir)) {
                continue;
            }
            let kind = if self.files.contains_key(&path) {
                EntryKind::File
            } else {
                EntryKind::Directory
            };
            if !options.allows(root, &path) {
                if kind == EntryKind::Directory {
                    pruned = Some(path);
                }
                continue;
            }
            if self.sealed.contains(&path) {
                walked.push(Ok(WalkEntry {
                    path: path.clone(),
                    kind,
                }));
                walked.push(Err(sealed_error(&path)));
                pruned = Some(path);
                continue;
            }
            walked.push(Ok(WalkEntry { path, kind }));
        }

        Box::new(walked.into_iter())
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        match self.files.get(path) {
            Some(Some(contents)) => Ok(contents.clone()),
            Some(None) => Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "permission denied",
            )),
            None => Err(io::Error::new(io::ErrorKind::NotFound, "no such file")),
        }
    }
}

fn sealed_error(path: &Path) -> WalkError {
    WalkError {
        path: path.to_path_buf(),
        source: io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
    }
}
