#![allow(dead_code)]

use phpdoc_typecheck::{
    Artifact, ArtifactRegistry, Checker, Diagnostic, FieldsToExtract, PhpDocTypeParser, Scope,
    TypeAndName,
};

/// A type parser that knows only the built-in classes.
pub fn parser() -> PhpDocTypeParser {
    PhpDocTypeParser::new(ArtifactRegistry::new())
}

/// A type parser that also knows the given `(class, extends, implements)`
/// declarations.
pub fn parser_with(classes: &[(&str, Option<&str>, &[&str])]) -> PhpDocTypeParser {
    let registry = classes
        .iter()
        .map(|(name, extends, implements)| {
            (name.to_string(), Artifact::new(*extends, implements))
        })
        .collect();
    PhpDocTypeParser::new(registry)
}

/// Parse a doc type in the root scope.  `None` when malformed.
pub fn parse(text: &str) -> Option<String> {
    parser()
        .parse_type_and_name(None, text, FieldsToExtract::TypeOnly, false)
        .ty
}

/// Parse a doc type in `scope`.
pub fn parse_in(scope: &Scope, text: &str) -> Option<String> {
    parser()
        .parse_type_and_name(Some(scope), text, FieldsToExtract::TypeOnly, false)
        .ty
}

/// Parse with the given fields in the root scope.
pub fn parse_fields(text: &str, fields: FieldsToExtract) -> TypeAndName {
    parser().parse_type_and_name(None, text, fields, false)
}

/// Check a PHP source in strict mode.
pub fn check(source: &str) -> Vec<Diagnostic> {
    Checker::default()
        .with_strict(true)
        .check_source(source)
        .expect("check should not fail")
}

/// `(line, code)` of every diagnostic, in source order.
pub fn check_codes(source: &str) -> Vec<(usize, &'static str)> {
    check(source)
        .iter()
        .map(|d| (d.line, d.code.as_str()))
        .collect()
}
