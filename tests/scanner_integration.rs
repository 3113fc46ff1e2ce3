//! Integration tests for declaration scanning.
//!
//! These tests validate namespace and declaration extraction against the
//! PHP fixtures in `testdata/php`.

use std::path::PathBuf;

use classloc::{scan, DeclarationKind};

fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("testdata")
        .join("php")
        .join(name);
    std::fs::read_to_string(&path).expect("fixture should exist")
}

#[test]
fn test_multiple_namespaces_fixture() {
    let result = scan(&fixture("TestAsset/MultipleClassesInMultipleNamespaces.php"));

    let lines: Vec<_> = result.declarations.iter().map(|d| d.line).collect();
    assert_eq!(lines, vec![5, 9, 15, 19]);

    let third = &result.declarations[2];
    assert_eq!(third.short_name(), "LocatorShouldFindThirdClass");
    assert_eq!(
        third.namespace.as_deref(),
        Some(r"Fixtures\TestAsset\SecondTestNamespace")
    );
}

#[test]
fn test_interface_fixture() {
    let result = scan(&fixture("TestAsset/LocatorShouldFindThis.php"));
    assert_eq!(result.declarations.len(), 1);
    assert_eq!(result.declarations[0].kind, DeclarationKind::Interface);
    assert_eq!(result.declarations[0].line, 5);
}

#[test]
fn test_skip_fixture_declares_namespace_only() {
    let result = scan(&fixture("locator-should-skip-this.php"));
    assert_eq!(result.namespaces, vec!["Fixtures"]);
    assert!(result.is_empty());
}

#[test]
fn test_anonymous_class_fixture() {
    let result = scan(&fixture("TestAsset/AnonymousOnly.php"));
    assert_eq!(result.namespaces, vec![r"Fixtures\TestAsset"]);
    assert!(result.classes().is_empty());
}

#[test]
fn test_braced_fixture_kinds() {
    let result = scan(&fixture("TestAsset/Nested/BracedNamespaces.php"));
    let kinds: Vec<_> = result.declarations.iter().map(|d| d.kind).collect();
    assert_eq!(kinds, vec![DeclarationKind::Trait, DeclarationKind::Enum]);
    assert_eq!(
        result.namespaces,
        vec![r"Fixtures\Braced", r"Fixtures\Braced\Enums"]
    );
}

#[test]
fn test_class_names_are_valid_qualified_identifiers() {
    for name in [
        "TestAsset/MultipleClassesInMultipleNamespaces.php",
        "TestAsset/ClassNameResolutionCompatibility.php",
        "TestAsset/Nested/BracedNamespaces.php",
    ] {
        for class in scan(&fixture(name)).classes() {
            assert!(
                classloc::scanner::is_qualified_name(&class),
                "{} is not a qualified name",
                class
            );
        }
    }
}
