use phpdoc_typecheck::doctype::lexer::{Tokenizer, is_float_literal, is_int_literal};

fn tokens(text: &str) -> Vec<&str> {
    let mut lexer = Tokenizer::new(text);
    let mut out = Vec::new();
    while let Some(token) = lexer.next(0) {
        out.push(token);
        lexer.skip();
    }
    out
}

#[test]
fn splits_generic_types() {
    assert_eq!(
        tokens("array<int, string>"),
        vec!["array", "<", "int", ",", "string", ">"]
    );
}

#[test]
fn keywords_keep_their_dashes_and_backslashes() {
    assert_eq!(tokens("non-empty-array"), vec!["non-empty-array"]);
    assert_eq!(tokens("\\App\\Models\\User"), vec!["\\App\\Models\\User"]);
}

#[test]
fn variables_stop_at_dashes() {
    assert_eq!(tokens("$a-b"), vec!["$a", "-", "b"]);
}

#[test]
fn numbers() {
    assert_eq!(tokens("-12 3.5 1_000"), vec!["-12", "3.5", "1_000"]);
    assert!(is_int_literal("-12"));
    assert!(is_float_literal("3.5"));
    assert!(!is_int_literal("-"));
    assert!(!is_int_literal("3.5"));
}

#[test]
fn multi_character_punctuation() {
    assert_eq!(tokens("int ...$xs"), vec!["int", "...", "$xs"]);
    assert_eq!(tokens("Foo::BAR"), vec!["Foo", "::", "BAR"]);
}

#[test]
fn quoted_strings_with_escapes() {
    assert_eq!(tokens(r#"'a b' "c\"d""#), vec!["'a b'", r#""c\"d""#]);
}

#[test]
fn unterminated_string_reads_as_end() {
    let mut lexer = Tokenizer::new("'abc");
    assert_eq!(lexer.next(0), None);

    let mut lexer = Tokenizer::new("int 'abc");
    assert_eq!(lexer.next(0), Some("int"));
    assert_eq!(lexer.next(1), None);
}

#[test]
fn lookahead_does_not_consume() {
    let mut lexer = Tokenizer::new("int|string");
    assert_eq!(lexer.next(2), Some("string"));
    assert_eq!(lexer.next(0), Some("int"));
    assert_eq!(lexer.consume(Some("INT")).unwrap(), "int");
    assert!(lexer.consume(Some("&")).is_err());
    assert!(lexer.eat("|"));
    assert_eq!(lexer.rest_from(0), "string");
}

#[test]
fn field_end_detection() {
    let mut lexer = Tokenizer::new("int $x");
    lexer.skip();
    assert!(lexer.preceded_by_space());
    assert!(lexer.at_field_end());

    let mut glued = Tokenizer::new("int$x");
    glued.skip();
    assert!(!glued.at_field_end());

    let mut comma = Tokenizer::new("int,");
    comma.skip();
    assert!(comma.at_field_end());
}

#[test]
fn rewind_drops_later_corrections() {
    let mut lexer = Tokenizer::new("Integer|Boolean");
    lexer.correct("int");
    lexer.skip();
    let checkpoint = lexer.checkpoint();
    lexer.skip();
    lexer.correct("bool");
    lexer.skip();
    assert_eq!(lexer.fixed().as_deref(), Some("int|bool"));

    lexer.rewind(checkpoint);
    assert_eq!(lexer.replacements().len(), 1);
    assert_eq!(lexer.fixed().as_deref(), Some("int|Boolean"));
    assert_eq!(lexer.next(0), Some("|"));
}

#[test]
fn correction_to_the_same_spelling_is_not_recorded() {
    let mut lexer = Tokenizer::new("int");
    lexer.correct("int");
    assert!(lexer.fixed().is_none());
}
