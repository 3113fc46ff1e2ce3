//! Integration tests for the class file locator.
//!
//! These tests run the locator against the PHP fixtures in `testdata/php`
//! on the real filesystem.

use std::path::{Path, PathBuf};

use classloc::{ClassFile, ClassFileLocator, IoErrorPolicy, LocatorError, LocatorOptions};
use tempfile::TempDir;

fn testdata_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata").join("php")
}

/// Locate every class file under the fixtures.
fn locate_all() -> Vec<ClassFile> {
    let locator = ClassFileLocator::new(testdata_path()).expect("fixtures should be a directory");
    locator
        .iter()
        .collect::<Result<Vec<_>, _>>()
        .expect("iteration should succeed")
}

fn find<'a>(files: &'a [ClassFile], name: &str) -> Option<&'a ClassFile> {
    files.iter().find(|f| f.file_name() == name)
}

#[test]
fn test_constructor_rejects_missing_directory() {
    let err = ClassFileLocator::new("__foo__").unwrap_err();
    assert!(matches!(err, LocatorError::InvalidArgument(_)));
}

#[test]
fn test_constructor_rejects_empty_entry_sequence() {
    let err = ClassFileLocator::new(Vec::<PathBuf>::new()).unwrap_err();
    assert!(matches!(err, LocatorError::InvalidArgument(_)));
}

#[test]
fn test_constructor_rejects_file_as_directory() {
    let file = testdata_path().join("locator-should-skip-this.php");
    let err = ClassFileLocator::new(file).unwrap_err();
    assert!(err.is_invalid_argument());
}

#[test]
fn test_iteration_returns_only_php_files() {
    let files = locate_all();
    assert!(!files.is_empty());
    for file in &files {
        assert!(
            file.file_name().ends_with(".php"),
            "unexpected file {}",
            file.file_name()
        );
    }
    assert!(find(&files, "template.phtml").is_none());
    assert!(find(&files, "notes.txt").is_none());
}

#[test]
fn test_iteration_skips_files_without_classes() {
    let files = locate_all();
    assert!(
        find(&files, "locator-should-skip-this.php").is_none(),
        "Found PHP file not containing a class"
    );
    assert!(
        find(&files, "AnonymousOnly.php").is_none(),
        "Anonymous classes should not count as declarations"
    );
}

#[test]
fn test_iteration_returns_interfaces() {
    let files = locate_all();
    let file = find(&files, "LocatorShouldFindThis.php").expect("Locator skipped an interface");
    assert_eq!(file.classes(), [r"Fixtures\TestAsset\LocatorShouldFindThis"]);
}

#[test]
fn test_iteration_injects_namespace_in_found_items() {
    let files = locate_all();
    let qualified = files
        .iter()
        .flat_map(|f| f.classes())
        .any(|class| class[1..].contains('\\'));
    assert!(qualified);
}

#[test]
fn test_iteration_injects_namespaces_in_file_info() {
    for file in locate_all() {
        assert!(
            !file.namespaces().is_empty(),
            "{} has no namespaces",
            file.file_name()
        );
    }
}

#[test]
fn test_every_yielded_file_has_classes() {
    for file in locate_all() {
        assert!(!file.classes().is_empty());
        assert!(file.path().is_absolute());
    }
}

#[test]
fn test_finds_multiple_classes_in_multiple_namespaces() {
    let files = locate_all();
    let file = find(&files, "MultipleClassesInMultipleNamespaces.php").unwrap();
    assert_eq!(
        file.classes(),
        [
            r"Fixtures\TestAsset\LocatorShouldFindFirstClass",
            r"Fixtures\TestAsset\LocatorShouldFindSecondClass",
            r"Fixtures\TestAsset\SecondTestNamespace\LocatorShouldFindThirdClass",
            r"Fixtures\TestAsset\SecondTestNamespace\LocatorShouldFindFourthClass",
        ]
    );
    assert_eq!(
        file.namespaces(),
        [r"Fixtures\TestAsset", r"Fixtures\TestAsset\SecondTestNamespace"]
    );
}

#[test]
fn test_class_name_resolution_is_not_counted_as_class() {
    let locator = ClassFileLocator::new(testdata_path().join("TestAsset")).unwrap();
    let file = locator
        .iter()
        .map(|f| f.unwrap())
        .find(|f| f.file_name() == "ClassNameResolutionCompatibility.php")
        .unwrap();
    assert_eq!(file.classes().len(), 1);
}

#[test]
fn test_braced_namespaces_and_enums() {
    let files = locate_all();
    let file = find(&files, "BracedNamespaces.php").unwrap();
    assert_eq!(
        file.classes(),
        [r"Fixtures\Braced\Greets", r"Fixtures\Braced\Enums\Suit"]
    );
}

#[test]
fn test_traversal_order_is_stable() {
    let locator = ClassFileLocator::new(testdata_path()).unwrap();
    let first = locator.collect_classes().unwrap();
    let second = locator.collect_classes().unwrap();
    assert_eq!(first, second);
    assert_eq!(
        first,
        vec![
            r"Fixtures\TestAsset\ClassNameResolutionCompatibility",
            r"Fixtures\TestAsset\LocatorShouldFindThis",
            r"Fixtures\TestAsset\LocatorShouldFindFirstClass",
            r"Fixtures\TestAsset\LocatorShouldFindSecondClass",
            r"Fixtures\TestAsset\SecondTestNamespace\LocatorShouldFindThirdClass",
            r"Fixtures\TestAsset\SecondTestNamespace\LocatorShouldFindFourthClass",
            r"Fixtures\Braced\Greets",
            r"Fixtures\Braced\Enums\Suit",
        ]
    );
}

#[test]
fn test_entry_sequence_root() {
    let base = testdata_path().join("TestAsset");
    let entries = vec![
        base.join("Nested"),
        base.join("LocatorShouldFindThis.php"),
        base.join("notes.txt"),
    ];
    let locator = ClassFileLocator::new(entries).unwrap();
    let names: Vec<_> = locator
        .iter()
        .map(|f| f.unwrap().file_name().to_string())
        .collect();
    assert_eq!(names, vec!["BracedNamespaces.php", "LocatorShouldFindThis.php"]);
}

#[test]
fn test_excluded_paths_and_hidden_directories() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    for dir in ["src", "vendor/pkg", ".cache"] {
        std::fs::create_dir_all(root.join(dir)).unwrap();
    }
    std::fs::write(root.join("src/App.php"), "<?php namespace App; class Kernel {}").unwrap();
    std::fs::write(root.join("vendor/pkg/Lib.php"), "<?php class Lib {}").unwrap();
    std::fs::write(root.join(".cache/Cached.php"), "<?php class Cached {}").unwrap();

    let all = ClassFileLocator::new(root).unwrap().collect_classes().unwrap();
    assert_eq!(all, vec!["Cached", r"App\Kernel", "Lib"]);

    let options = LocatorOptions::new()
        .skip_hidden(true)
        .exclude(&["vendor"])
        .unwrap();
    let filtered = ClassFileLocator::new(root)
        .unwrap()
        .with_options(options)
        .collect_classes()
        .unwrap();
    assert_eq!(filtered, vec![r"App\Kernel"]);
}

#[test]
fn test_non_utf8_content_is_scanned() {
    let temp = TempDir::new().unwrap();
    let mut bytes = b"<?php\n// caf\xe9\nclass Latin1 {}\n".to_vec();
    bytes.extend_from_slice(b"$s = '\xff';\n");
    std::fs::write(temp.path().join("Latin1.php"), bytes).unwrap();

    let classes = ClassFileLocator::new(temp.path())
        .unwrap()
        .collect_classes()
        .unwrap();
    assert_eq!(classes, vec!["Latin1"]);
}

#[cfg(unix)]
#[test]
fn test_symlinks_followed_only_when_enabled() {
    let temp = TempDir::new().unwrap();
    let outside = TempDir::new().unwrap();
    std::fs::write(outside.path().join("Linked.php"), "<?php class Linked {}").unwrap();
    std::os::unix::fs::symlink(outside.path(), temp.path().join("link")).unwrap();

    let plain = ClassFileLocator::new(temp.path()).unwrap();
    assert!(plain.collect_classes().unwrap().is_empty());

    let following = ClassFileLocator::new(temp.path())
        .unwrap()
        .with_options(LocatorOptions::new().follow_links(true));
    assert_eq!(following.collect_classes().unwrap(), vec!["Linked"]);
}

#[cfg(unix)]
#[test]
fn test_symlinked_files_scanned_without_following_links() {
    let temp = TempDir::new().unwrap();
    let shared = TempDir::new().unwrap();
    std::fs::write(shared.path().join("Shared.php"), "<?php class Linked {}").unwrap();
    std::fs::write(temp.path().join("Plain.php"), "<?php class Plain {}").unwrap();
    std::os::unix::fs::symlink(shared.path().join("Shared.php"), temp.path().join("Linked.php")).unwrap();
    std::os::unix::fs::symlink(temp.path().join("missing.php"), temp.path().join("Broken.php")).unwrap();

    let locator = ClassFileLocator::new(temp.path()).unwrap();
    let files: Vec<_> = locator.iter().map(|f| f.unwrap()).collect();
    let names: Vec<_> = files.iter().map(|f| f.file_name()).collect();
    assert_eq!(names, vec!["Linked.php", "Plain.php"]);
    assert_eq!(files[0].classes(), ["Linked"]);
}

#[cfg(unix)]
#[test]
fn test_walk_error_reports_failing_path() {
    let temp = TempDir::new().unwrap();
    std::fs::create_dir_all(temp.path().join("a/b")).unwrap();
    std::os::unix::fs::symlink(temp.path().join("a"), temp.path().join("a/b/loop")).unwrap();
    std::fs::write(temp.path().join("zed.php"), "<?php class Zed {}").unwrap();

    let options = LocatorOptions::new().follow_links(true);
    let locator = ClassFileLocator::new(temp.path()).unwrap().with_options(options);
    let results: Vec<_> = locator.iter().collect();
    assert_eq!(results.len(), 1);
    match &results[0] {
        Err(LocatorError::Io { path, .. }) => assert!(
            path.ends_with("a/b/loop"),
            "error names {}",
            path.display()
        ),
        other => panic!("expected I/O error, got {:?}", other),
    }

    let skipping = ClassFileLocator::new(temp.path()).unwrap().with_options(
        LocatorOptions::new()
            .follow_links(true)
            .on_io_error(IoErrorPolicy::Skip),
    );
    assert_eq!(skipping.collect_classes().unwrap(), vec!["Zed"]);
}

#[test]
fn test_roots_are_absolute() {
    // Integration tests run from the crate root.
    let locator = ClassFileLocator::new(Path::new("testdata/php")).unwrap();
    let roots: Vec<_> = locator.roots().collect();
    assert_eq!(roots.len(), 1);
    assert!(roots[0].is_absolute());
    assert!(roots[0].ends_with("testdata/php"));
}
