//! Doc comment tag extraction.
//!
//! A `/** … */` comment is split into lines, each stripped of its leading
//! `*` decoration.  A line starting with `@name` opens a tag; following
//! lines belong to it until the next tag line.  Every tag keeps the source
//! span of each of its content lines so a corrected type can be written
//! back over exactly those bytes (see [`fix_comment_tag`]).

mod fix;

pub use fix::fix_comment_tag;

use std::collections::HashMap;
use std::ops::Range;

/// One tag of a doc comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocTag {
    /// Tag name including `@`, e.g. `@param`.
    pub name: String,
    /// Source byte offset of the `@`.
    pub offset: usize,
    /// Text after the tag name, one line per doc line, joined with `\n`.
    pub content: String,
    /// Source byte span of each content line.
    pub segments: Vec<Range<usize>>,
}

/// A parsed doc comment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocComment {
    /// Source byte offset of `/**`.
    pub offset: usize,
    /// Source byte offset just past `*/`.
    pub end: usize,
    tags: HashMap<String, Vec<DocTag>>,
}

impl DocComment {
    /// Split the comment text `raw`, found at source offset `offset`.
    pub fn parse(raw: &str, offset: usize) -> Self {
        let body_start = if raw.starts_with("/**") { 3 } else { 0 };
        let body_end = if raw.len() >= body_start + 2 && raw.ends_with("*/") {
            raw.len() - 2
        } else {
            raw.len()
        };

        let mut tags: HashMap<String, Vec<DocTag>> = HashMap::new();
        let mut current: Option<DocTag> = None;

        for line in lines(raw, body_start, body_end) {
            let text = &raw[line.clone()];
            if text.starts_with('@') {
                if let Some(done) = current.take() {
                    push_tag(&mut tags, done);
                }
                let name_len = text
                    .find(|c: char| c.is_whitespace())
                    .unwrap_or(text.len());
                let after_name = &text[name_len..];
                let content_start =
                    line.start + name_len + (after_name.len() - after_name.trim_start().len());
                current = Some(DocTag {
                    name: text[..name_len].to_string(),
                    offset: offset + line.start,
                    content: String::new(),
                    segments: vec![offset + content_start..offset + line.end],
                });
            } else if let Some(tag) = current.as_mut() {
                tag.segments.push(offset + line.start..offset + line.end);
            }
        }
        if let Some(done) = current.take() {
            push_tag(&mut tags, done);
        }

        // Content is filled from the segments once they are final.
        for tag in tags.values_mut().flatten() {
            while tag.segments.len() > 1 && tag.segments.last().is_some_and(|s| s.is_empty()) {
                tag.segments.pop();
            }
            tag.content = tag
                .segments
                .iter()
                .map(|s| &raw[s.start - offset..s.end - offset])
                .collect::<Vec<_>>()
                .join("\n");
        }

        Self {
            offset,
            end: offset + raw.len(),
            tags,
        }
    }

    /// All tags named `name` (including `@`), in source order.
    pub fn tags(&self, name: &str) -> &[DocTag] {
        self.tags.get(name).map_or(&[], Vec::as_slice)
    }

    pub fn has_tag(&self, name: &str) -> bool {
        !self.tags(name).is_empty()
    }
}

fn push_tag(tags: &mut HashMap<String, Vec<DocTag>>, tag: DocTag) {
    tags.entry(tag.name.clone()).or_default().push(tag);
}

/// Content span of each line of the comment body, relative to `raw`, with
/// leading whitespace, one `*` and trailing whitespace removed.
fn lines(raw: &str, start: usize, end: usize) -> Vec<Range<usize>> {
    let bytes = raw.as_bytes();
    let mut spans = Vec::new();
    let mut line_start = start;
    loop {
        let line_end = memchr::memchr(b'\n', &bytes[line_start..end])
            .map_or(end, |i| line_start + i);

        let mut content_start = line_start;
        while content_start < line_end && matches!(bytes[content_start], b' ' | b'\t') {
            content_start += 1;
        }
        if content_start < line_end && bytes[content_start] == b'*' {
            content_start += 1;
            while content_start < line_end && matches!(bytes[content_start], b' ' | b'\t') {
                content_start += 1;
            }
        }
        let mut content_end = line_end;
        while content_end > content_start && bytes[content_end - 1].is_ascii_whitespace() {
            content_end -= 1;
        }
        spans.push(content_start..content_end);

        if line_end >= end {
            break;
        }
        line_start = line_end + 1;
    }
    spans
}
