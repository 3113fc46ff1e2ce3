//! classloc - static locator for PHP class files.
//!
//! classloc walks a directory tree (or a caller-supplied list of files and
//! directories), keeps the `.php` files, and reports every file that
//! declares at least one class, interface, trait or enum together with the
//! namespaces and fully-qualified type names it contains. Source files are
//! tokenized, never executed.
//!
//! # Architecture
//!
//! - `scanner`: tokenizer and declaration pass over raw source text
//! - `locator`: traversal, extension filter, lazy iteration
//! - `config`: YAML configuration for traversal options
//! - `report`: Output formatting (pretty, JSON, list)
//! - `cli`: command-line front end
//!
//! # Example
//!
//! ```no_run
//! use classloc::ClassFileLocator;
//!
//! let locator = ClassFileLocator::new("src")?;
//! for file in &locator {
//!     let file = file?;
//!     println!("{}: {:?}", file.file_name(), file.classes());
//! }
//! # Ok::<(), classloc::LocatorError>(())
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod locator;
pub mod report;
pub mod scanner;

pub use config::Config;
pub use error::LocatorError;
pub use locator::{
    ClassFile, ClassFileLocator, ClassFiles, DiskFileSystem, FileSystem, IoErrorPolicy,
    LocatorOptions, MemoryFileSystem, SourceRoot, SOURCE_EXTENSION,
};
pub use scanner::{scan, Declaration, DeclarationKind, ScanResult};
