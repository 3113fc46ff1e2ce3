//! Descriptor yielded for each file that declares at least one type.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::scanner::{Declaration, ScanResult};

/// A source file enriched with the namespaces and types it declares.
///
/// Only the locator builds descriptors, so `classes` is never empty:
///
/// ```compile_fail
/// let file = classloc::ClassFile {
///     path: "/a.php".into(),
///     file_name: "a.php".into(),
///     namespaces: vec![],
///     classes: vec![],
///     declarations: vec![],
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassFile {
    /// Absolute path to the file.
    pub(crate) path: PathBuf,
    pub(crate) file_name: String,
    /// Declared namespaces in file order.
    pub(crate) namespaces: Vec<String>,
    /// Fully-qualified type names in declaration order. Never empty.
    pub(crate) classes: Vec<String>,
    pub(crate) declarations: Vec<Declaration>,
}

impl ClassFile {
    pub(crate) fn new(path: PathBuf, scanned: ScanResult) -> Self {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let classes = scanned.classes();
        Self {
            path,
            file_name,
            namespaces: scanned.namespaces,
            classes,
            declarations: scanned.declarations,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn namespaces(&self) -> &[String] {
        &self.namespaces
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }
}
