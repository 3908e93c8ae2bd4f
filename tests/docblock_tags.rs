//! Tests for doc comment tag extraction and tag fixing.

use phpdoc_typecheck::CheckError;
use phpdoc_typecheck::docblock::{DocComment, fix_comment_tag};

const MULTI_LINE: &str = "/**\n * Summary.\n *\n * @param int $x The x.\n *     continued\n * @return void\n */";

#[test]
fn single_line_comment() {
    let doc = DocComment::parse("/** @var int $x */", 0);
    let vars = doc.tags("@var");
    assert_eq!(vars.len(), 1);
    assert_eq!(vars[0].name, "@var");
    assert_eq!(vars[0].content, "int $x");
    assert_eq!(vars[0].offset, 4);
}

#[test]
fn tags_collect_their_continuation_lines() {
    let doc = DocComment::parse(MULTI_LINE, 0);
    let params = doc.tags("@param");
    assert_eq!(params.len(), 1);
    assert_eq!(params[0].content, "int $x The x.\ncontinued");
    assert_eq!(params[0].segments.len(), 2);

    let returns = doc.tags("@return");
    assert_eq!(returns.len(), 1);
    assert_eq!(returns[0].content, "void");
}

#[test]
fn offsets_are_source_offsets() {
    let base = 100;
    let doc = DocComment::parse(MULTI_LINE, base);
    assert_eq!(doc.offset, base);
    assert_eq!(doc.end, base + MULTI_LINE.len());

    let param = &doc.tags("@param")[0];
    assert!(MULTI_LINE[param.offset - base..].starts_with("@param int $x"));
    for segment in &param.segments {
        let text = &MULTI_LINE[segment.start - base..segment.end - base];
        assert!(param.content.contains(text));
    }
}

#[test]
fn repeated_tags_keep_source_order() {
    let doc = DocComment::parse("/**\n * @param int $a\n * @param string $b\n */", 0);
    let params = doc.tags("@param");
    assert_eq!(params.len(), 2);
    assert_eq!(params[0].content, "int $a");
    assert_eq!(params[1].content, "string $b");
}

#[test]
fn missing_tags() {
    let doc = DocComment::parse("/** Just prose. */", 0);
    assert!(!doc.has_tag("@var"));
    assert!(doc.tags("@var").is_empty());
}

#[test]
fn empty_tag_content() {
    let doc = DocComment::parse("/**\n * @return\n */", 0);
    assert_eq!(doc.tags("@return")[0].content, "");
}

#[test]
fn fix_replaces_only_changed_lines() {
    let source = "/**\n * @param Integer $x The x.\n *     continued\n */";
    let doc = DocComment::parse(source, 0);
    let tag = &doc.tags("@param")[0];

    let edits = fix_comment_tag(tag, "int $x The x.\ncontinued").unwrap();
    assert_eq!(edits.len(), 1);
    assert_eq!(edits[0].offset, source.find("Integer").unwrap());
    assert_eq!(edits[0].len, "Integer $x The x.".len());
    assert_eq!(edits[0].replacement, "int $x The x.");
}

#[test]
fn fix_must_keep_the_line_count() {
    let doc = DocComment::parse(MULTI_LINE, 0);
    let tag = &doc.tags("@param")[0];
    let err = fix_comment_tag(tag, "int $x").unwrap_err();
    assert!(matches!(
        err,
        CheckError::FixLineMismatch {
            original: 2,
            replacement: 1,
            ..
        }
    ));
}

#[test]
fn fix_must_keep_empty_lines_empty() {
    let source = "/**\n * @param Integer $x\n *\n *   more\n */";
    let doc = DocComment::parse(source, 0);
    let tag = &doc.tags("@param")[0];
    assert_eq!(tag.content, "Integer $x\n\nmore");

    let err = fix_comment_tag(tag, "int $x\nx\nmore").unwrap_err();
    assert!(matches!(err, CheckError::FixLineLayout { line: 2, .. }));

    let edits = fix_comment_tag(tag, "int $x\n\nmore").unwrap();
    assert_eq!(edits.len(), 1);
}
