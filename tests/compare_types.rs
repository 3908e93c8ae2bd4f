//! Tests for the compatibility check and supertype closure.

mod common;

use common::{parser, parser_with};

fn compatible(wide: &str, narrow: &str) -> bool {
    parser().compare_types(Some(wide), Some(narrow))
}

#[test]
fn reflexive() {
    for ty in [
        "int",
        "array-key|int|string",
        "\\Countable&\\Traversable",
        "\\Foo",
        "static(\\Foo)",
        "int|null",
        "never",
        "mixed",
    ] {
        assert!(compatible(ty, ty), "{ty} should accept itself");
    }
}

#[test]
fn undetermined_sides() {
    let p = parser();
    assert!(p.compare_types(None, Some("int")));
    assert!(!p.compare_types(Some("int"), None));
    assert!(!p.compare_types(None, None));
}

#[test]
fn mixed_accepts_and_never_is_accepted() {
    assert!(compatible("mixed", "never"));
    assert!(compatible("mixed", "\\Foo|int"));
    assert!(compatible("int", "never"));
    assert!(!compatible("never", "int"));
}

#[test]
fn unions_on_either_side() {
    assert!(compatible("int|null", "int"));
    assert!(compatible("int|null", "null"));
    assert!(!compatible("int", "int|null"));
    assert!(compatible("array-key|int|string", "array-key"));
    assert!(compatible("array-key", "int"));
}

#[test]
fn primitive_ladder() {
    assert!(compatible("scalar", "bool"));
    assert!(compatible("scalar", "int"));
    assert!(!compatible("array-key", "float"));
    assert!(compatible("iterable", "array"));
    assert!(compatible("callable", "callable-string"));
    assert!(compatible("string", "callable-string"));
    assert!(!compatible("callable-string", "string"));
    assert!(!compatible("int", "float"));
}

#[test]
fn objects() {
    assert!(compatible("object", "\\Foo"));
    assert!(!compatible("object", "int"));
    assert!(!compatible("\\Foo", "object"));
    assert!(compatible("callable", "\\Closure"));
}

#[test]
fn builtin_hierarchy() {
    assert!(compatible("\\Traversable", "\\ArrayIterator"));
    assert!(compatible("iterable", "\\Generator"));
    assert!(compatible("\\Throwable", "\\InvalidArgumentException"));
    assert!(compatible("\\Stringable", "\\Exception"));
    assert!(compatible("\\UnitEnum", "\\BackedEnum"));
    assert!(!compatible("\\RuntimeException", "\\LogicException"));
}

#[test]
fn declared_inheritance() {
    let p = parser_with(&[("\\A", None, &[]), ("\\B", Some("\\A"), &[])]);
    assert!(p.compare_types(Some("\\A"), Some("\\B")));
    assert!(!p.compare_types(Some("\\B"), Some("\\A")));
}

#[test]
fn declared_classes_reach_builtins() {
    let p = parser_with(&[("\\App\\MyError", Some("\\RuntimeException"), &[])]);
    assert!(p.compare_types(Some("\\Throwable"), Some("\\App\\MyError")));
}

#[test]
fn intersections() {
    let p = parser_with(&[("\\C", Some("\\A"), &["\\B"])]);
    assert!(p.compare_types(Some("\\A&\\B"), Some("\\C")));
    assert!(!p.compare_types(Some("\\A&\\B"), Some("\\A")));
    assert!(p.compare_types(Some("\\A"), Some("\\A&\\B")));
}

#[test]
fn inheritance_cycles_terminate() {
    let p = parser_with(&[("\\A", Some("\\B"), &[]), ("\\B", Some("\\A"), &[])]);
    assert!(p.compare_types(Some("\\A"), Some("\\B")));
    assert!(p.compare_types(Some("\\B"), Some("\\A")));
}

#[test]
fn static_carries_the_class_chain() {
    let p = parser_with(&[("\\Foo", Some("\\Base"), &[])]);
    assert!(p.compare_types(Some("\\Foo"), Some("static(\\Foo)")));
    assert!(p.compare_types(Some("\\Base"), Some("static(\\Foo)")));
    assert!(p.compare_types(Some("self"), Some("static(\\Foo)")));
    assert!(p.compare_types(Some("static"), Some("static(\\Foo)")));
    assert!(!p.compare_types(Some("static(\\Foo)"), Some("\\Foo")));
}

#[test]
fn super_types_of_primitives() {
    let p = parser();
    assert_eq!(p.super_types("int"), vec!["array-key", "scalar"]);
    assert_eq!(p.super_types("array"), vec!["iterable"]);
    assert!(p.super_types("null").is_empty());
}

#[test]
fn super_types_of_classes() {
    let supers = parser().super_types("\\ArrayIterator");
    for expected in ["object", "\\SeekableIterator", "\\Iterator", "\\Traversable", "iterable"] {
        assert!(
            supers.iter().any(|s| s == expected),
            "{expected} missing from {supers:?}"
        );
    }
    assert!(!supers.iter().any(|s| s == "\\ArrayIterator"));
}
