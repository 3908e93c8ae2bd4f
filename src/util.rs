/// Text helpers for offset conversion and name handling.

/// Convert a byte offset in `content` to a 1-based `(line, column)`
/// pair.  The column counts characters, not bytes.
///
/// Offsets past the end of the content map to the end of the last line.
pub(crate) fn offset_to_position(content: &str, offset: usize) -> (usize, usize) {
    let mut line_start = 0;
    for (i, line) in content.split('\n').enumerate() {
        let line_end = line_start + line.len();
        if offset <= line_end {
            let byte_col = offset - line_start;
            let column = line
                .char_indices()
                .take_while(|(idx, _)| *idx < byte_col)
                .count();
            return (i + 1, column + 1);
        }
        // +1 for the newline character
        line_start = line_end + 1;
    }
    let lines = content.split('\n').count();
    let last = content.rsplit('\n').next().unwrap_or_default();
    (lines, last.chars().count() + 1)
}

/// The last segment of a (possibly qualified) class name.
pub(crate) fn short_name(name: &str) -> &str {
    name.rsplit('\\').next().unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_are_one_based() {
        let content = "<?php\n/** @var int */\n$x = 1;\n";
        assert_eq!(offset_to_position(content, 0), (1, 1));
        assert_eq!(offset_to_position(content, 6), (2, 1));
        assert_eq!(offset_to_position(content, 10), (2, 5));
    }

    #[test]
    fn columns_count_characters() {
        let content = "é = 'x';";
        // 'é' is two bytes.
        assert_eq!(offset_to_position(content, 2), (1, 2));
    }

    #[test]
    fn short_name_takes_last_segment() {
        assert_eq!(short_name("Foo\\Bar\\Baz"), "Baz");
        assert_eq!(short_name("Baz"), "Baz");
    }
}
