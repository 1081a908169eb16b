use crate::document::Pos;

/// A location in an original source file.
/// Lines are 1-based, columns are 0-based (the lint-output convention).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn new(line: usize, column: usize) -> Self {
        Location { line, column }
    }
}

/// A start/end pair of locations in an original source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct SourceRange {
    pub start: Location,
    pub end: Location,
}

impl SourceRange {
    pub fn new(start: Location, end: Location) -> Self {
        SourceRange { start, end }
    }
}

/// Where a tagged template sits in its file: the whole expression
/// (tag included) and the tag alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceSpan {
    pub expression: SourceRange,
    pub tag: SourceRange,
}

/// Translate a location reported against reconstructed text back into the
/// original file.
///
/// Line 1 of the reconstructed text shares its physical line with the tag,
/// so it is shifted right by the tag's end column. Every later line starts
/// at column 0 of its own source line and only needs the 1-based column
/// converted. A synthetic tag is not present in the user's file and never
/// contributes a horizontal offset.
pub fn map_location(reported: Pos, span: &SourceSpan, synthetic_tag: bool) -> Location {
    if reported.line == 1 && !synthetic_tag {
        Location {
            line: span.expression.start.line,
            column: span.tag.end.column + reported.column,
        }
    } else {
        Location {
            line: span.expression.start.line + reported.line.saturating_sub(1),
            column: reported.column.saturating_sub(1),
        }
    }
}

/// UTF-16 offset of every char index, plus one past the end.
pub fn utf16_offsets(chars: &[char]) -> Vec<usize> {
    let mut offsets = Vec::with_capacity(chars.len() + 1);
    let mut units = 0;
    offsets.push(0);
    for c in chars {
        units += c.len_utf16();
        offsets.push(units);
    }
    offsets
}

/// Convert a 1-based line and 0-based char column into a byte offset in
/// `source`. Columns past the end of the line clamp to the line end.
pub fn location_to_offset(source: &str, location: Location) -> Option<usize> {
    let mut line = 1;
    let mut line_start = 0;
    if location.line == 0 {
        return None;
    }
    if location.line > 1 {
        let mut found = false;
        for (offset, ch) in source.char_indices() {
            if ch == '\n' {
                line += 1;
                if line == location.line {
                    line_start = offset + 1;
                    found = true;
                    break;
                }
            }
        }
        if !found {
            return None;
        }
    }

    let rest = &source[line_start..];
    let line_len = rest.find('\n').unwrap_or(rest.len());
    // Columns are UTF-16 code units.
    let mut units = 0;
    let offset = rest[..line_len]
        .char_indices()
        .find_map(|(i, c)| {
            let found = (units >= location.column).then_some(i);
            units += c.len_utf16();
            found
        })
        .unwrap_or(line_len);
    Some(line_start + offset)
}
