use crate::error::CheckError;
use crate::types::TextEdit;

use super::DocTag;

/// Turn a corrected tag content into source edits.
///
/// The replacement must keep the tag's line layout: the same number of
/// lines, and empty lines only where the original has empty lines.  Line
/// breaks can't be moved, so anything else is an internal error.
pub fn fix_comment_tag(tag: &DocTag, replacement: &str) -> Result<Vec<TextEdit>, CheckError> {
    let lines: Vec<&str> = replacement.split('\n').collect();
    if lines.len() != tag.segments.len() {
        return Err(CheckError::FixLineMismatch {
            tag: tag.name.clone(),
            original: tag.segments.len(),
            replacement: lines.len(),
        });
    }

    let mut edits = Vec::new();
    for (index, (segment, line)) in tag.segments.iter().zip(&lines).enumerate() {
        if segment.is_empty() != line.is_empty() {
            return Err(CheckError::FixLineLayout {
                tag: tag.name.clone(),
                line: index + 1,
            });
        }
        edits.push(TextEdit {
            offset: segment.start,
            len: segment.len(),
            replacement: line.to_string(),
        });
    }

    // Lines the fix leaves alone produce no edit.
    let original: Vec<&str> = tag.content.split('\n').collect();
    Ok(edits
        .into_iter()
        .zip(original)
        .filter(|(edit, before)| edit.replacement != *before)
        .map(|(edit, _)| edit)
        .collect())
}
