//! Supertype closure and the compatibility test.
//!
//! Built-in PHP and SPL classes come from a fixed table; user classes come
//! from the [`ArtifactRegistry`] filled by the artifact pass.

use std::collections::{HashSet, VecDeque};

use crate::types::ArtifactRegistry;

/// Immediate supertypes of predefined PHP classes and interfaces.
///
/// The odd casing of a few entries (`\Iteratoraggregate`,
/// `\Splobjectstorage`, `\Arrayaccess`) is kept as is; lookups are exact.
pub const LIBRARY: &[(&str, &[&str])] = &[
    // Predefined general.
    ("\\ArrayAccess", &[]),
    ("\\BackedEnum", &["\\UnitEnum"]),
    ("\\Closure", &["callable"]),
    ("\\Directory", &[]),
    ("\\Fiber", &[]),
    ("\\php_user_filter", &[]),
    ("\\SensitiveParameterValue", &[]),
    ("\\Serializable", &[]),
    ("\\stdClass", &[]),
    ("\\Stringable", &[]),
    ("\\UnitEnum", &[]),
    ("\\WeakReference", &[]),
    // Iterables.
    ("\\Generator", &["\\Iterator"]),
    ("\\InternalIterator", &["\\Iterator"]),
    ("\\Iterator", &["\\Traversable"]),
    ("\\IteratorAggregate", &["\\Traversable"]),
    ("\\Traversable", &["iterable"]),
    (
        "\\WeakMap",
        &["\\ArrayAccess", "\\Countable", "\\Iteratoraggregate"],
    ),
    // Throwables.
    ("\\ArithmeticError", &["\\Error"]),
    ("\\AssertionError", &["\\Error"]),
    ("\\CompileError", &["\\Error"]),
    ("\\DivisionByZeroError", &["\\ArithmeticError"]),
    ("\\Error", &["\\Throwable"]),
    ("\\ErrorException", &["\\Exception"]),
    ("\\Exception", &["\\Throwable"]),
    ("\\ParseError", &["\\CompileError"]),
    ("\\Throwable", &["\\Stringable"]),
    ("\\TypeError", &["\\Error"]),
    // SPL data structures.
    (
        "\\SplDoublyLinkedList",
        &["\\Iterator", "\\Countable", "\\ArrayAccess", "\\Serializable"],
    ),
    ("\\SplStack", &["\\SplDoublyLinkedList"]),
    ("\\SplQueue", &["\\SplDoublyLinkedList"]),
    ("\\SplHeap", &["\\Iterator", "\\Countable"]),
    ("\\SplMaxHeap", &["\\SplHeap"]),
    ("\\SplMinHeap", &["\\SplHeap"]),
    ("\\SplPriorityQueue", &["\\Iterator", "\\Countable"]),
    (
        "\\SplFixedArray",
        &[
            "\\IteratorAggregate",
            "\\ArrayAccess",
            "\\Countable",
            "\\JsonSerializable",
        ],
    ),
    (
        "\\Splobjectstorage",
        &["\\Countable", "\\Iterator", "\\Serializable", "\\Arrayaccess"],
    ),
    // SPL iterators.
    ("\\AppendIterator", &["\\IteratorIterator"]),
    (
        "\\ArrayIterator",
        &[
            "\\SeekableIterator",
            "\\ArrayAccess",
            "\\Serializable",
            "\\Countable",
        ],
    ),
    (
        "\\CachingIterator",
        &[
            "\\IteratorIterator",
            "\\ArrayAccess",
            "\\Countable",
            "\\Stringable",
        ],
    ),
    ("\\CallbackFilterIterator", &["\\FilterIterator"]),
    ("\\DirectoryIterator", &["\\SplFileInfo", "\\SeekableIterator"]),
    ("\\EmptyIterator", &["\\Iterator"]),
    ("\\FilesystemIterator", &["\\DirectoryIterator"]),
    ("\\FilterIterator", &["\\IteratorIterator"]),
    ("\\GlobalIterator", &["\\FilesystemIterator", "\\Countable"]),
    ("\\InfiniteIterator", &["\\IteratorIterator"]),
    ("\\IteratorIterator", &["\\OuterIterator"]),
    ("\\LimitIterator", &["\\IteratorIterator"]),
    ("\\MultipleIterator", &["\\Iterator"]),
    ("\\NoRewindIterator", &["\\IteratorIterator"]),
    ("\\ParentIterator", &["\\RecursiveFilterIterator"]),
    (
        "\\RecursiveArrayIterator",
        &["\\ArrayIterator", "\\RecursiveIterator"],
    ),
    (
        "\\RecursiveCachingIterator",
        &["\\CachingIterator", "\\RecursiveIterator"],
    ),
    (
        "\\RecursiveCallbackFilterIterator",
        &["\\CallbackFilterIterator", "\\RecursiveIterator"],
    ),
    (
        "\\RecursiveDirectoryIterator",
        &["\\FilesystemIterator", "\\RecursiveIterator"],
    ),
    (
        "\\RecursiveFilterIterator",
        &["\\FilterIterator", "\\RecursiveIterator"],
    ),
    ("\\RecursiveIteratorIterator", &["\\OuterIterator"]),
    (
        "\\RecursiveRegexIterator",
        &["\\RegexIterator", "\\RecursiveIterator"],
    ),
    ("\\RecursiveTreeIterator", &["\\RecursiveIteratorIterator"]),
    ("\\RegexIterator", &["\\FilterIterator"]),
    // SPL interfaces.
    ("\\Countable", &[]),
    ("\\OuterIterator", &["\\Iterator"]),
    ("\\RecursiveIterator", &["\\Iterator"]),
    ("\\SeekableIterator", &["\\Iterator"]),
    // SPL exceptions.
    ("\\BadFunctionCallException", &["\\LogicException"]),
    ("\\BadMethodCallException", &["\\BadFunctionCallException"]),
    ("\\DomainException", &["\\LogicException"]),
    ("\\InvalidArgumentException", &["\\LogicException"]),
    ("\\LengthException", &["\\LogicException"]),
    ("\\LogicException", &["\\Exception"]),
    ("\\OutOfBoundsException", &["\\RuntimeException"]),
    ("\\OutOfRangeException", &["\\LogicException"]),
    ("\\OverflowException", &["\\RuntimeException"]),
    ("\\RangeException", &["\\RuntimeException"]),
    ("\\RuntimeException", &["\\Exception"]),
    ("\\UnderflowException", &["\\RuntimeException"]),
    ("\\UnexpectedValueException", &["\\RuntimeException"]),
    // SPL file handling.
    ("\\SplFileInfo", &["\\Stringable"]),
    (
        "\\SplFileObject",
        &["\\SplFileInfo", "\\RecursiveIterator", "\\SeekableIterator"],
    ),
    ("\\SplTempFileObject", &["\\SplFileObject"]),
    // SPL misc.
    (
        "\\ArrayObject",
        &[
            "\\IteratorAggregate",
            "\\ArrayAccess",
            "\\Serializable",
            "\\Countable",
        ],
    ),
    ("\\SplObserver", &[]),
    ("\\SplSubject", &[]),
];

/// Immediate supertypes of a built-in class, if it is one.
pub fn library_supers(name: &str) -> Option<&'static [&'static str]> {
    LIBRARY
        .iter()
        .find(|(class, _)| *class == name)
        .map(|(_, supers)| *supers)
}

/// Supertype closure of one atomic type, not including the type itself.
pub fn super_types(artifacts: &ArtifactRegistry, atomic: &str) -> Vec<String> {
    let fixed: &[&str] = match atomic {
        "int" | "string" => &["array-key", "scalar"],
        "callable-string" => &["callable", "string", "array-key", "scalar"],
        "array-key" | "float" | "bool" => &["scalar"],
        "array" => &["iterable"],
        "static" => &["self", "parent", "object"],
        "self" => &["parent", "object"],
        "parent" => &["object"],
        _ => {
            if let Some(bound) = atomic
                .strip_prefix("static(")
                .and_then(|rest| rest.strip_suffix(')'))
            {
                let mut supers: Vec<String> = ["static", "self", "parent", "object"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect();
                class_closure(artifacts, bound, true, &mut supers);
                return supers;
            }
            if atomic.starts_with('\\') {
                let mut supers = vec!["object".to_string()];
                class_closure(artifacts, atomic, false, &mut supers);
                return supers;
            }
            &[]
        }
    };
    fixed.iter().map(|s| s.to_string()).collect()
}

/// Breadth-first walk from `seed` through the library table, then the
/// artifact registry, then (for names in neither) the fixed ladder.
///
/// `supers` is both the output and the visited set.
fn class_closure(
    artifacts: &ArtifactRegistry,
    seed: &str,
    include_seed: bool,
    supers: &mut Vec<String>,
) {
    let mut queue: VecDeque<(String, bool)> = VecDeque::new();
    queue.push_back((seed.to_string(), !include_seed));
    let mut visited: HashSet<String> = supers.iter().cloned().collect();

    while let Some((name, is_excluded_seed)) = queue.pop_front() {
        if name.is_empty() || (!is_excluded_seed && visited.contains(&name)) {
            continue;
        }
        if !is_excluded_seed {
            visited.insert(name.clone());
            supers.push(name.clone());
        }

        if let Some(library) = library_supers(&name) {
            queue.extend(library.iter().map(|s| (s.to_string(), false)));
        } else if let Some(artifact) = artifacts.get(&name) {
            queue.extend(artifact.supers().map(|s| (s.to_string(), false)));
        } else if !is_excluded_seed {
            for extra in super_types(artifacts, &name) {
                if visited.insert(extra.clone()) {
                    supers.push(extra);
                }
            }
        }
    }
}

/// Whether `narrow` is compatible with (assignable to) `wide`.
///
/// Both are normalized type strings.  `None` means "could not be parsed":
/// nothing is compatible with an unparsed narrow type, and anything is
/// compatible with an unparsed wide type.
pub fn compare_types(artifacts: &ArtifactRegistry, wide: Option<&str>, narrow: Option<&str>) -> bool {
    let Some(narrow) = narrow else {
        return false;
    };
    let wide = match wide {
        None | Some("mixed") => return true,
        Some(wide) => wide,
    };
    if narrow == "never" {
        return true;
    }

    let wide_groups: Vec<Vec<&str>> = wide.split('|').map(|g| g.split('&').collect()).collect();

    narrow.split('|').all(|narrow_group| {
        let mut expanded: HashSet<String> = HashSet::new();
        for single in narrow_group.split('&') {
            expanded.extend(super_types(artifacts, single));
            expanded.insert(single.to_string());
        }
        wide_groups
            .iter()
            .any(|wide_group| wide_group.iter().all(|w| expanded.contains(*w)))
    })
}
