//! End-to-end tests: PHP source in, diagnostics out.

mod common;

use common::{check, check_codes};
use phpdoc_typecheck::{Checker, Config, Severity};

// ─── @param ─────────────────────────────────────────────────────────

#[test]
fn matching_params_are_clean() {
    let php = r#"<?php
/**
 * @param int $a
 * @param string|null $b
 * @param array<string, int> $c
 */
function f(int $a, ?string $b, array $c): void {}
"#;
    assert!(check_codes(php).is_empty());
}

#[test]
fn param_count_mismatch() {
    let php = r#"<?php
/**
 * @param int $a
 */
function f(int $a, int $b): void {}
"#;
    assert_eq!(check_codes(php), vec![(2, "phpdoc_fun_param_count")]);
}

#[test]
fn param_name_mismatch_skips_the_type_check() {
    let php = r#"<?php
/**
 * @param string $p1
 */
function f(int $p2): void {}
"#;
    assert_eq!(check_codes(php), vec![(3, "phpdoc_fun_param_name_mismatch")]);
}

#[test]
fn param_type_mismatch() {
    let php = r#"<?php
/**
 * @param string $a
 */
function f(int $a): void {}
"#;
    let diagnostics = check(php);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code.as_str(), "phpdoc_fun_param_type_mismatch");
    assert_eq!(diagnostics[0].severity, Severity::Error);
    assert_eq!(
        diagnostics[0].message,
        "PHPDoc function parameter 1 type mismatch"
    );
    assert_eq!((diagnostics[0].line, diagnostics[0].column), (3, 4));
}

#[test]
fn splat_mismatch_is_a_warning() {
    let php = r#"<?php
/**
 * @param int $p5
 */
function f(int ...$p5): void {}
"#;
    let diagnostics = check(php);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(
        diagnostics[0].code.as_str(),
        "phpdoc_fun_param_pass_splat_mismatch"
    );
    assert_eq!(diagnostics[0].severity, Severity::Warning);
}

#[test]
fn array_key_accepts_a_native_int_string_union() {
    let php = r#"<?php
/**
 * @param array-key $x
 */
function f(int|string $x): void {}
"#;
    assert!(check_codes(php).is_empty());
}

#[test]
fn null_default_widens_the_native_type() {
    let php = r#"<?php
/**
 * @param int|null $x
 */
function f(int $x = null): void {}
"#;
    assert!(check_codes(php).is_empty());
}

#[test]
fn malformed_param_tags() {
    let php = r#"<?php
/**
 * @param
 * @param int
 */
function f(int $a, int $b): void {}
"#;
    assert_eq!(
        check_codes(php),
        vec![(3, "phpdoc_fun_param_type"), (4, "phpdoc_fun_param_name")]
    );
}

#[test]
fn untyped_params_accept_anything() {
    let php = r#"<?php
/**
 * @param \Foo[] $a
 */
function f($a) {}
"#;
    assert!(check_codes(php).is_empty());
}

// ─── @return ────────────────────────────────────────────────────────

#[test]
fn multiple_returns() {
    let php = r#"<?php
/**
 * @return int
 * @return string
 */
function f(): int {}
"#;
    assert_eq!(
        check_codes(php),
        vec![
            (4, "phpdoc_fun_ret_multiple"),
            (4, "phpdoc_fun_ret_type_mismatch")
        ]
    );
}

#[test]
fn return_type_style_and_fix() {
    let php = r#"<?php
/**
 * @param Integer $a
 * @return Boolean
 */
function f(int $a): bool {}
"#;
    let (fixed, diagnostics) = Checker::default().fix_source(php).unwrap();
    let codes: Vec<_> = diagnostics.iter().map(|d| d.code.as_str()).collect();
    assert_eq!(
        codes,
        vec!["phpdoc_fun_param_type_style", "phpdoc_fun_ret_type_style"]
    );
    assert!(diagnostics.iter().all(|d| d.fix.is_some()));
    assert_eq!(
        fixed,
        php.replace("Integer", "int").replace("Boolean", "bool")
    );
    assert!(check_codes(&fixed).is_empty());
}

#[test]
fn malformed_return() {
    let php = r#"<?php
/**
 * @return
 */
function f() {}
"#;
    assert_eq!(check_codes(php), vec![(3, "phpdoc_fun_ret_type")]);
}

#[test]
fn return_must_be_narrower_than_native() {
    let php = r#"<?php
interface Shape {}
class Circle implements Shape {}

/**
 * @param Circle $s
 * @return Shape
 */
function f(Shape $s): Circle {}
"#;
    assert_eq!(check_codes(php), vec![(7, "phpdoc_fun_ret_type_mismatch")]);
}

// ─── Classes ────────────────────────────────────────────────────────

#[test]
fn self_and_static_in_methods() {
    let php = r#"<?php
namespace App;

class Foo {
    /**
     * @return static
     */
    public function make(): static { return new static(); }

    /**
     * @return $this
     */
    public function me(): self { return $this; }
}
"#;
    assert_eq!(check_codes(php), vec![(11, "phpdoc_fun_ret_type_style")]);
}

#[test]
fn property_var_checks() {
    let php = r#"<?php
class A {
    /** @var string */
    public int $x = 0;

    /** @var array<int, string> */
    public array $names = [];

    /** @var Integer */
    public $count = 0;
}
"#;
    assert_eq!(
        check_codes(php),
        vec![(3, "phpdoc_var_type_mismatch"), (9, "phpdoc_var_type_style")]
    );
}

#[test]
fn use_aliases_resolve_in_property_types() {
    let php = r#"<?php
namespace App;

use Other\Thing as T2;

class X {
    /** @var T2 */
    public T2 $t;
}
"#;
    assert!(check_codes(php).is_empty());
}

#[test]
fn class_property_tags() {
    let php = r#"<?php
/**
 * @property int $id
 * @property-read Integer $count
 * @property string
 * @property-write
 */
class Model {}
"#;
    assert_eq!(
        check_codes(php),
        vec![
            (4, "phpdoc_class_prop_type_style"),
            (5, "phpdoc_class_prop_name"),
            (6, "phpdoc_class_prop_type")
        ]
    );
}

// ─── Templates ──────────────────────────────────────────────────────

#[test]
fn template_bounds_resolve_in_params() {
    let php = r#"<?php
/**
 * @template T of \Countable
 * @param T $items
 */
function ok(\Countable $items): void {}

/**
 * @template T of \Countable
 * @param T $items
 */
function bad(array $items): void {}
"#;
    assert_eq!(check_codes(php), vec![(10, "phpdoc_fun_param_type_mismatch")]);
}

#[test]
fn malformed_templates() {
    let php = r#"<?php
/**
 * @template 5
 * @template T of
 */
class Box {}
"#;
    assert_eq!(
        check_codes(php),
        vec![(3, "phpdoc_template_name"), (4, "phpdoc_template_type")]
    );
}

// ─── Closures and lone comments ─────────────────────────────────────

#[test]
fn closures_passed_as_arguments() {
    let php = r#"<?php
$r = array_map(
    /**
     * @param string $v
     * @return int
     */
    function (int $v): int {
        return $v;
    },
    [1]
);
"#;
    assert_eq!(check_codes(php), vec![(4, "phpdoc_fun_param_type_mismatch")]);
}

#[test]
fn closures_in_control_flow_headers() {
    let php = r#"<?php
if (array_filter($a, /** @param string $v */ function (int $v) { return true; })) {
}

foreach (array_map(/** @param string $x */ fn (int $x) => $x, $a) as $x) {
}

while ($g = (/** @return int */ fn (): string => '')()) {
}
"#;
    assert_eq!(
        check_codes(php),
        vec![
            (2, "phpdoc_fun_param_type_mismatch"),
            (5, "phpdoc_fun_param_type_mismatch"),
            (8, "phpdoc_fun_ret_type_mismatch"),
        ]
    );
}

#[test]
fn anonymous_class_members() {
    let php = r#"<?php
namespace App;

$o = new class extends Base {
    /** @param string $v */
    public function f(int $v): void {}

    /** @return self */
    public function me(): self { return $this; }

    /** @var Integer */
    public $count = 0;
};
"#;
    assert_eq!(
        check_codes(php),
        vec![(5, "phpdoc_fun_param_type_mismatch"), (11, "phpdoc_var_type_style")]
    );
}

#[test]
fn anonymous_class_constructor_arguments() {
    let php = r#"<?php
$o = new class(/** @param string $v */ fn (int $v) => $v) {
    public function __construct(public \Closure $f) {}
};
"#;
    assert_eq!(check_codes(php), vec![(2, "phpdoc_fun_param_type_mismatch")]);
}

#[test]
fn deeply_nested_doc_type_is_malformed() {
    let php = format!(
        "<?php\nfunction f() {{\n    /** @var {}int{} $x */\n    $x = g();\n}}\n",
        "(".repeat(10_000),
        ")".repeat(10_000)
    );
    assert_eq!(check_codes(&php), vec![(3, "phpdoc_var_type")]);
}

#[test]
fn inline_var_annotations() {
    let php = r#"<?php
function f() {
    /** @var Integer $x */
    $x = g();

    /** @var Foo[ */
    $y = g();

    /** @var \Foo $z */
    $z = g();
}
"#;
    assert_eq!(
        check_codes(php),
        vec![(3, "phpdoc_var_type_style"), (6, "phpdoc_var_type")]
    );
}

#[test]
fn comments_without_type_tags_are_ignored() {
    let php = r#"<?php
/**
 * Just a description.
 */
function f(): void {}

/** Inline prose. */
$x = 1;
"#;
    assert!(check_codes(php).is_empty());
}

// ─── Checker surface ────────────────────────────────────────────────

#[test]
fn non_strict_checks_never_fail() {
    let checker = Checker::new(&Config::default());
    assert!(checker.check_source("<?php function (").is_ok());
    assert!(checker.check_source("").is_ok());
}

#[test]
fn artifacts_of_a_file() {
    let php = r#"<?php
namespace N;

class A extends B implements C {}
interface I extends J, K {}
enum E: string {}
enum U {}
trait T {}
"#;
    let artifacts = Checker::default().artifacts(php).unwrap();
    let a = &artifacts["\\N\\A"];
    assert_eq!(a.extends.as_deref(), Some("\\N\\B"));
    assert_eq!(a.implements, vec!["\\N\\C".to_string()]);

    let i = &artifacts["\\N\\I"];
    assert_eq!(i.extends, None);
    assert_eq!(i.implements, vec!["\\N\\J".to_string(), "\\N\\K".to_string()]);

    assert_eq!(artifacts["\\N\\E"].implements, vec!["\\BackedEnum".to_string()]);
    assert_eq!(artifacts["\\N\\U"].implements, vec!["\\UnitEnum".to_string()]);
    assert!(artifacts["\\N\\T"].supers().next().is_none());
}

#[test]
fn artifacts_declared_inside_bodies() {
    let php = r#"<?php
namespace N;

function make() {
    class Made extends Base {}
}

class Outer {
    public function build() {
        if (true) {
            interface Built {}
        }
        return function () {
            trait InClosure {}
        };
    }
}
"#;
    let artifacts = Checker::default().artifacts(php).unwrap();
    assert_eq!(artifacts["\\N\\Made"].extends.as_deref(), Some("\\N\\Base"));
    assert!(artifacts.contains_key("\\N\\Outer"));
    assert!(artifacts.contains_key("\\N\\Built"));
    assert!(artifacts.contains_key("\\N\\InClosure"));
    assert_eq!(artifacts.len(), 4);
}

#[test]
fn diagnostics_serialize_to_json() {
    let php = r#"<?php
/**
 * @return Integer
 */
function f(): int {}
"#;
    let diagnostics = check(php);
    let json = serde_json::to_value(&diagnostics).unwrap();
    assert_eq!(json[0]["code"], "phpdoc_fun_ret_type_style");
    assert_eq!(json[0]["severity"], "warning");
    assert_eq!(json[0]["line"], 3);
    assert_eq!(json[0]["fix"][0]["replacement"], "int");
}
