//! Recursive locator for PHP files that declare types.
//!
//! A [`ClassFileLocator`] is built over a [`SourceRoot`] and validated
//! eagerly. Each call to [`ClassFileLocator::iter`] starts a fresh,
//! independent walk that lazily reads and scans `.php` files and yields a
//! [`ClassFile`] for every file declaring at least one type.

mod fs;
mod types;

pub use fs::{
    DiskFileSystem, EntryKind, FileSystem, MemoryFileSystem, Walk, WalkEntry, WalkError, WalkOptions,
};
pub use types::ClassFile;

use globset::{Glob, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::LocatorError;
use crate::scanner;

/// Extension of the files the locator inspects.
pub const SOURCE_EXTENSION: &str = "php";

/// What a locator walks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceRoot {
    /// A directory walked recursively.
    Directory(PathBuf),
    /// Caller-ordered files and directories; directories are walked in place.
    Entries(Vec<PathBuf>),
}

impl From<&str> for SourceRoot {
    fn from(path: &str) -> Self {
        SourceRoot::Directory(PathBuf::from(path))
    }
}

impl From<&Path> for SourceRoot {
    fn from(path: &Path) -> Self {
        SourceRoot::Directory(path.to_path_buf())
    }
}

impl From<PathBuf> for SourceRoot {
    fn from(path: PathBuf) -> Self {
        SourceRoot::Directory(path)
    }
}

impl From<Vec<PathBuf>> for SourceRoot {
    fn from(entries: Vec<PathBuf>) -> Self {
        SourceRoot::Entries(entries)
    }
}

/// What to do when a directory cannot be walked or a file cannot be read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IoErrorPolicy {
    /// Yield the error once and end the iteration.
    #[default]
    Abort,
    /// Log a warning and continue with the next entry.
    Skip,
}

impl std::str::FromStr for IoErrorPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "abort" => Ok(IoErrorPolicy::Abort),
            "skip" => Ok(IoErrorPolicy::Skip),
            _ => Err(format!("unknown I/O error policy: {}", s)),
        }
    }
}

/// Traversal options for a locator.
#[derive(Debug, Clone, Default)]
pub struct LocatorOptions {
    pub walk: WalkOptions,
    pub on_io_error: IoErrorPolicy,
}

impl LocatorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Follow symbolic links while walking.
    pub fn follow_links(mut self, follow: bool) -> Self {
        self.walk.follow_links = follow;
        self
    }

    /// Skip hidden files and directories.
    pub fn skip_hidden(mut self, skip: bool) -> Self {
        self.walk.skip_hidden = skip;
        self
    }

    pub fn on_io_error(mut self, policy: IoErrorPolicy) -> Self {
        self.on_io_error = policy;
        self
    }

    /// Exclude paths matching any of the glob patterns.
    pub fn exclude<S: AsRef<str>>(mut self, patterns: &[S]) -> Result<Self, globset::Error> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            builder.add(Glob::new(pattern.as_ref())?);
        }
        self.walk.excluded = builder.build()?;
        Ok(self)
    }
}

/// A validated root entry.
#[derive(Debug, Clone)]
struct RootEntry {
    path: PathBuf,
    kind: EntryKind,
}

/// Locates PHP files declaring classes, interfaces, traits or enums.
#[derive(Debug, Clone)]
pub struct ClassFileLocator<F: FileSystem = DiskFileSystem> {
    roots: Vec<RootEntry>,
    fs: F,
    options: LocatorOptions,
}

impl ClassFileLocator<DiskFileSystem> {
    /// Create a locator over the real filesystem.
    pub fn new(root: impl Into<SourceRoot>) -> Result<Self, LocatorError> {
        Self::with_fs(root, DiskFileSystem)
    }
}

impl<F: FileSystem> ClassFileLocator<F> {
    /// Create a locator over any filesystem. The root is validated here,
    /// not on first iteration.
    pub fn with_fs(root: impl Into<SourceRoot>, fs: F) -> Result<Self, LocatorError> {
        let roots = match root.into() {
            SourceRoot::Directory(path) => {
                if fs.kind(&path) != Some(EntryKind::Directory) {
                    return Err(LocatorError::invalid(format!(
                        "expected a valid directory name, got {:?}",
                        path
                    )));
                }
                vec![resolve(&fs, path, EntryKind::Directory)?]
            }
            SourceRoot::Entries(entries) => {
                if entries.is_empty() {
                    return Err(LocatorError::invalid(
                        "expected a non-empty sequence of files or directories",
                    ));
                }
                entries
                    .into_iter()
                    .map(|path| match fs.kind(&path) {
                        Some(kind @ (EntryKind::File | EntryKind::Directory)) => {
                            resolve(&fs, path, kind)
                        }
                        _ => Err(LocatorError::invalid(format!(
                            "entry {:?} is not an existing file or directory",
                            path
                        ))),
                    })
                    .collect::<Result<Vec<_>, _>>()?
            }
        };

        Ok(Self {
            roots,
            fs,
            options: LocatorOptions::default(),
        })
    }

    /// Replace the traversal options.
    pub fn with_options(mut self, options: LocatorOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &LocatorOptions {
        &self.options
    }

    /// Absolute paths of the roots, in walk order.
    pub fn roots(&self) -> impl Iterator<Item = &Path> {
        self.roots.iter().map(|r| r.path.as_path())
    }

    /// Start a new walk over the roots.
    pub fn iter(&self) -> ClassFiles<'_, F> {
        ClassFiles {
            locator: self,
            next_root: 0,
            walk: None,
            done: false,
        }
    }

    /// All fully-qualified type names, in iteration order.
    pub fn collect_classes(&self) -> Result<Vec<String>, LocatorError> {
        let mut classes = Vec::new();
        for file in self.iter() {
            classes.extend(file?.classes);
        }
        Ok(classes)
    }
}

impl<'a, F: FileSystem> IntoIterator for &'a ClassFileLocator<F> {
    type Item = Result<ClassFile, LocatorError>;
    type IntoIter = ClassFiles<'a, F>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn resolve<F: FileSystem>(fs: &F, path: PathBuf, kind: EntryKind) -> Result<RootEntry, LocatorError> {
    let path = fs.absolute(&path).map_err(|e| {
        LocatorError::invalid(format!("cannot resolve {:?}: {}", path, e))
    })?;
    Ok(RootEntry { path, kind })
}

/// Whether `path` carries the source extension (exact, case-sensitive).
pub fn has_source_extension(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == SOURCE_EXTENSION)
}

/// Cursor over one walk of a locator's roots.
pub struct ClassFiles<'a, F: FileSystem> {
    locator: &'a ClassFileLocator<F>,
    next_root: usize,
    walk: Option<Walk<'a>>,
    done: bool,
}

impl<'a, F: FileSystem> ClassFiles<'a, F> {
    /// Next leaf file to consider, or an error tagged with its path.
    fn next_file(&mut self) -> Option<Result<PathBuf, LocatorError>> {
        let locator = self.locator;
        loop {
            if let Some(walk) = &mut self.walk {
                match walk.next() {
                    Some(Ok(entry)) if entry.kind == EntryKind::File => return Some(Ok(entry.path)),
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => return Some(Err(LocatorError::io(e.path, e.source))),
                    None => {}
                }
                self.walk = None;
                continue;
            }

            let root = locator.roots.get(self.next_root)?;
            self.next_root += 1;
            match root.kind {
                EntryKind::Directory => {
                    tracing::debug!("walking {}", root.path.display());
                    let walk = locator.fs.walk(&root.path, &locator.options.walk);
                    self.walk = Some(walk);
                }
                _ => return Some(Ok(root.path.clone())),
            }
        }
    }

    /// Apply the I/O error policy. Returns the error if it should be yielded.
    fn fail(&mut self, err: LocatorError) -> Option<LocatorError> {
        match self.locator.options.on_io_error {
            IoErrorPolicy::Abort => {
                self.done = true;
                Some(err)
            }
            IoErrorPolicy::Skip => {
                tracing::warn!("skipping: {}", err);
                None
            }
        }
    }
}

impl<F: FileSystem> Iterator for ClassFiles<'_, F> {
    type Item = Result<ClassFile, LocatorError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            let path = match self.next_file()? {
                Ok(path) => path,
                Err(e) => match self.fail(e) {
                    Some(e) => return Some(Err(e)),
                    None => continue,
                },
            };

            if !has_source_extension(&path) {
                continue;
            }

            let bytes = match self.locator.fs.read(&path) {
                Ok(bytes) => bytes,
                Err(e) => match self.fail(LocatorError::io(&path, e)) {
                    Some(e) => return Some(Err(e)),
                    None => continue,
                },
            };

            let text = String::from_utf8_lossy(&bytes);
            let scanned = scanner::scan(&text);
            if scanned.is_empty() {
                tracing::debug!("no type declarations in {}", path.display());
                continue;
            }

            tracing::debug!(
                "found {} declaration(s) in {}",
                scanned.declarations.len(),
                path.display()
            );
            return Some(Ok(ClassFile::new(path, scanned)));
        }
        None
    }
}
