//! Runs every PHP file under `tests/fixtures/` through the checker.
//!
//! A fixture lists the diagnostics it expects with comment lines of the
//! form `// expect: <line> <code>`.  A fixture without any expects must
//! check clean.  Order doesn't matter.

use std::path::Path;

use phpdoc_typecheck::Checker;

const EXPECT_MARKER: &str = "// expect:";

fn parse_expectations(source: &str) -> datatest_stable::Result<Vec<(usize, String)>> {
    let mut expected = Vec::new();
    for line in source.lines() {
        let Some(rest) = line.trim().strip_prefix(EXPECT_MARKER) else {
            continue;
        };
        let mut fields = rest.split_whitespace();
        let (Some(number), Some(code), None) = (fields.next(), fields.next(), fields.next()) else {
            return Err(format!("malformed expect line: {line:?}").into());
        };
        expected.push((number.parse()?, code.to_string()));
    }
    expected.sort();
    Ok(expected)
}

fn check_fixture(path: &Path) -> datatest_stable::Result<()> {
    let source = std::fs::read_to_string(path)?;
    let expected = parse_expectations(&source)?;

    let diagnostics = Checker::default().with_strict(true).check_source(&source)?;
    let mut actual: Vec<(usize, String)> = diagnostics
        .iter()
        .map(|d| (d.line, d.code.to_string()))
        .collect();
    actual.sort();

    if actual != expected {
        let render = |list: &[(usize, String)]| {
            list.iter()
                .map(|(line, code)| format!("  {line} {code}"))
                .collect::<Vec<_>>()
                .join("\n")
        };
        return Err(format!(
            "{}: diagnostics differ\nexpected:\n{}\nactual:\n{}",
            path.display(),
            render(&expected),
            render(&actual)
        )
        .into());
    }
    Ok(())
}

datatest_stable::harness! {
    { test = check_fixture, root = "tests/fixtures", pattern = r"^.*\.php$" },
}
