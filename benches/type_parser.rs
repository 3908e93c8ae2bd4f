use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};

use phpdoc_typecheck::{ArtifactRegistry, Checker, FieldsToExtract, PhpDocTypeParser};

const TYPES: &[&str] = &[
    "int",
    "array<string, int|null>",
    "array{id: int, name?: string, tags: list<string>}",
    "callable(int, string ...$rest): ?\\Generator<int, string>",
    "\\Countable&\\Traversable|null",
    "($x is int ? non-empty-string : list<\\Exception>)",
    "Integer|Boolean|Double",
];

const SOURCE: &str = r#"<?php
namespace Bench;

use ArrayIterator;

/**
 * @template T of \Countable
 */
class Bag {
    /** @var array<int, T> */
    public array $items = [];

    /**
     * @param T $item
     * @param int<0, max> $at
     * @return static
     */
    public function put(\Countable $item, int $at = 0): self { return $this; }

    /**
     * @return ArrayIterator<int, T>
     */
    public function iter(): \Traversable { return new ArrayIterator($this->items); }
}
"#;

fn bench_parse_types(c: &mut Criterion) {
    let parser = PhpDocTypeParser::new(ArtifactRegistry::new());
    c.bench_function("parse_doc_types", |b| {
        b.iter(|| {
            for text in TYPES {
                black_box(parser.parse_type_and_name(
                    None,
                    black_box(text),
                    FieldsToExtract::TypeOnly,
                    false,
                ));
            }
        })
    });
}

fn bench_check_source(c: &mut Criterion) {
    let checker = Checker::default();
    c.bench_function("check_source", |b| {
        b.iter(|| black_box(checker.check_source(black_box(SOURCE))))
    });
}

criterion_group!(benches, bench_parse_types, bench_check_source);
criterion_main!(benches);
