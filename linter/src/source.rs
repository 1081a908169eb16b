use tagql::position::{Location, SourceRange, SourceSpan, utf16_offsets};
use tagql::template::{Chunk, Slot, Template};
use tagql::INTERNAL_TAG;

/// One tagged template literal (or a whole GraphQL file) to lint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    /// The tag as written, with member chains joined by `.`: `gql`, `Relay.QL`.
    pub tag: String,
    pub span: SourceSpan,
    pub template: Template,
    /// The tag is not present in the user's file.
    pub synthetic_tag: bool,
}

/// Whether a configured tag name selects a call site's tag. One- and
/// two-segment names are supported; longer names never match.
pub fn tag_matches(tag_name: &str, tag: &str) -> bool {
    let segments = tag_name.split('.').count();
    segments <= 2 && tag_name == tag
}

/// Wrap a whole GraphQL file as a single call site under the internal tag.
pub fn graphql_file_call_site(source: &str) -> CallSite {
    let text = normalize_newlines(source);
    let end = end_location(&text);
    let start = Location::new(1, 0);
    CallSite {
        tag: INTERNAL_TAG.to_string(),
        span: SourceSpan {
            expression: SourceRange::new(start, end),
            tag: SourceRange::new(start, start),
        },
        template: Template::literal(text),
        synthetic_tag: true,
    }
}

/// Find every tagged template literal in JavaScript or TypeScript source,
/// nested ones included, in source order.
pub fn scan_tagged_templates(source: &str) -> Vec<CallSite> {
    let mut scanner = Scanner::new(source);
    scanner.scan_code(false);
    let mut sites = scanner.sites;
    sites.sort_by_key(|site| site.span.expression.start);
    tracing::trace!(count = sites.len(), "scanned tagged templates");
    sites
}

fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

fn end_location(text: &str) -> Location {
    let line = text.matches('\n').count() + 1;
    let column = text
        .rsplit('\n')
        .next()
        .map_or(0, |last| last.encode_utf16().count());
    Location::new(line, column)
}

// ----------------------------------------------------------------------------
// Scanner
// ----------------------------------------------------------------------------

/// Keywords after which a `/` starts a regular expression.
const REGEX_PREFIX_KEYWORDS: [&str; 14] = [
    "return", "typeof", "instanceof", "in", "of", "new", "delete", "void", "throw", "case",
    "do", "else", "yield", "await",
];

/// The last significant token, for telling regex literals from division.
enum Prev {
    Start,
    Word(String),
    Punct,
    Value,
}

/// A candidate tag: an identifier or `a.b` member chain just scanned.
struct Chain {
    start: usize,
    end: usize,
    segments: Vec<String>,
    awaiting_segment: bool,
    /// A member of a call, index or literal: `f().gql`. Never a tag.
    detached: bool,
}

struct Scanner {
    chars: Vec<char>,
    /// UTF-16 offset of each char; columns and slot widths use these.
    units: Vec<usize>,
    line_starts: Vec<usize>,
    pos: usize,
    sites: Vec<CallSite>,
}

impl Scanner {
    fn new(source: &str) -> Self {
        let chars: Vec<char> = source.chars().collect();
        let mut line_starts = vec![0];
        for (i, &c) in chars.iter().enumerate() {
            let breaks = match c {
                '\n' | '\u{2028}' | '\u{2029}' => true,
                '\r' => chars.get(i + 1) != Some(&'\n'),
                _ => false,
            };
            if breaks {
                line_starts.push(i + 1);
            }
        }
        Scanner {
            units: utf16_offsets(&chars),
            chars,
            line_starts,
            pos: 0,
            sites: Vec::new(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, n: usize) -> Option<char> {
        self.chars.get(self.pos + n).copied()
    }

    fn location(&self, index: usize) -> Location {
        let line = self.line_starts.partition_point(|&start| start <= index);
        let line_start = self.line_starts[line - 1];
        Location::new(line, self.units[index] - self.units[line_start])
    }

    /// Scan code up to the end of input or, inside a `${...}`, up to and
    /// including its closing brace. Returns false when input ran out first.
    fn scan_code(&mut self, in_substitution: bool) -> bool {
        let mut depth = 0usize;
        let mut prev = Prev::Start;
        let mut chain: Option<Chain> = None;

        while let Some(c) = self.peek() {
            match c {
                c if c.is_whitespace() => {
                    self.pos += 1;
                    continue;
                }
                '/' if self.peek_at(1) == Some('/') => {
                    self.skip_line_comment();
                    continue;
                }
                '/' if self.peek_at(1) == Some('*') => {
                    self.skip_block_comment();
                    continue;
                }
                '\'' | '"' => {
                    self.skip_string(c);
                    prev = Prev::Value;
                }
                '`' => {
                    let tag = chain.take().filter(|chain| {
                        !chain.awaiting_segment
                            && !chain.detached
                            && !(chain.segments.len() == 1
                                && REGEX_PREFIX_KEYWORDS.contains(&chain.segments[0].as_str()))
                    });
                    self.scan_template(tag);
                    prev = Prev::Value;
                }
                '/' => {
                    if regex_allowed(&prev) {
                        self.skip_regex();
                        prev = Prev::Value;
                    } else {
                        self.pos += 1;
                        prev = Prev::Punct;
                    }
                }
                '{' => {
                    depth += 1;
                    self.pos += 1;
                    prev = Prev::Punct;
                }
                '}' => {
                    self.pos += 1;
                    if depth == 0 && in_substitution {
                        return true;
                    }
                    depth = depth.saturating_sub(1);
                    prev = Prev::Punct;
                }
                c if is_ident_start(c) => {
                    let start = self.pos;
                    let word = self.read_identifier();
                    let end = self.pos;
                    chain = match chain.take() {
                        Some(mut chain) if chain.awaiting_segment => {
                            chain.segments.push(word.clone());
                            chain.end = end;
                            chain.awaiting_segment = false;
                            Some(chain)
                        }
                        _ => Some(Chain {
                            start,
                            end,
                            segments: vec![word.clone()],
                            awaiting_segment: false,
                            detached: false,
                        }),
                    };
                    prev = Prev::Word(word);
                    continue;
                }
                c if c.is_ascii_digit() => {
                    while self
                        .peek()
                        .is_some_and(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_')
                    {
                        self.pos += 1;
                    }
                    prev = Prev::Value;
                }
                '.' => {
                    self.pos += 1;
                    if self.peek() == Some('.') && self.peek_at(1) == Some('.') {
                        self.pos += 2;
                        prev = Prev::Punct;
                    } else {
                        chain = Some(match chain.take() {
                            Some(mut c) if !c.awaiting_segment => {
                                c.awaiting_segment = true;
                                c
                            }
                            _ => Chain {
                                start: self.pos,
                                end: self.pos,
                                segments: Vec::new(),
                                awaiting_segment: true,
                                detached: true,
                            },
                        });
                        prev = Prev::Punct;
                        continue;
                    }
                }
                ')' | ']' => {
                    self.pos += 1;
                    prev = Prev::Value;
                }
                _ => {
                    self.pos += 1;
                    prev = Prev::Punct;
                }
            }
            chain = None;
        }
        !in_substitution
    }

    fn read_identifier(&mut self) -> String {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_continue) {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn skip_line_comment(&mut self) {
        while let Some(c) = self.peek() {
            if matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}') {
                break;
            }
            self.pos += 1;
        }
    }

    fn skip_block_comment(&mut self) {
        self.pos += 2;
        while let Some(c) = self.peek() {
            if c == '*' && self.peek_at(1) == Some('/') {
                self.pos += 2;
                return;
            }
            self.pos += 1;
        }
    }

    fn skip_string(&mut self, quote: char) {
        self.pos += 1;
        while let Some(c) = self.peek() {
            self.pos += 1;
            match c {
                '\\' => self.pos += 1,
                '\n' => return,
                c if c == quote => return,
                _ => {}
            }
        }
    }

    fn skip_regex(&mut self) {
        self.pos += 1;
        let mut in_class = false;
        while let Some(c) = self.peek() {
            self.pos += 1;
            match c {
                '\\' => self.pos += 1,
                '[' => in_class = true,
                ']' => in_class = false,
                '/' if !in_class => break,
                '\n' => return,
                _ => {}
            }
        }
        while self.peek().is_some_and(is_ident_continue) {
            self.pos += 1;
        }
    }

    /// Scan a template literal starting at its opening backtick. Records a
    /// call site when `tag` is present; templates nested in its
    /// substitutions are recorded as they are found.
    fn scan_template(&mut self, tag: Option<Chain>) {
        self.pos += 1;
        let mut raw = String::new();
        let mut chunks = Vec::new();
        let mut slots = Vec::new();

        loop {
            match self.peek() {
                None => return,
                Some('`') => {
                    self.pos += 1;
                    break;
                }
                Some('\\') => {
                    raw.push('\\');
                    self.pos += 1;
                    if let Some(c) = self.peek() {
                        raw.push(c);
                        self.pos += 1;
                    }
                }
                Some('$') if self.peek_at(1) == Some('{') => {
                    self.pos += 2;
                    chunks.push(Chunk { text: cook(&raw) });
                    raw.clear();

                    let mut start = self.pos;
                    if !self.scan_code(true) {
                        return;
                    }
                    // `pos` is one past the closing brace.
                    let mut end = self.pos - 1;
                    while start < end && self.chars[start].is_whitespace() {
                        start += 1;
                    }
                    while end > start && self.chars[end - 1].is_whitespace() {
                        end -= 1;
                    }
                    slots.push(Slot::new(
                        self.units[start],
                        self.units[end],
                        self.location(start),
                    ));
                }
                Some(c) => {
                    raw.push(c);
                    self.pos += 1;
                }
            }
        }
        chunks.push(Chunk { text: cook(&raw) });

        let Some(tag) = tag else {
            return;
        };
        let Ok(template) = Template::new(chunks, slots) else {
            return;
        };
        self.sites.push(CallSite {
            tag: tag.segments.join("."),
            span: SourceSpan {
                expression: SourceRange::new(self.location(tag.start), self.location(self.pos)),
                tag: SourceRange::new(self.location(tag.start), self.location(tag.end)),
            },
            template,
            synthetic_tag: false,
        });
    }
}

fn regex_allowed(prev: &Prev) -> bool {
    match prev {
        Prev::Start | Prev::Punct => true,
        Prev::Word(word) => REGEX_PREFIX_KEYWORDS.contains(&word.as_str()),
        Prev::Value => false,
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

// ----------------------------------------------------------------------------
// Cooking
// ----------------------------------------------------------------------------

/// Resolve the escape sequences of raw template text. An invalid escape
/// is kept as written.
pub fn cook(raw: &str) -> String {
    let chars: Vec<char> = raw.chars().collect();
    let mut out = String::with_capacity(raw.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c == '\r' {
            out.push('\n');
            i += if chars.get(i + 1) == Some(&'\n') { 2 } else { 1 };
            continue;
        }
        if c != '\\' {
            out.push(c);
            i += 1;
            continue;
        }
        let Some(&escape) = chars.get(i + 1) else {
            out.push('\\');
            break;
        };
        let simple = match escape {
            'n' => Some('\n'),
            't' => Some('\t'),
            'r' => Some('\r'),
            'b' => Some('\u{8}'),
            'f' => Some('\u{c}'),
            'v' => Some('\u{b}'),
            '0' if !chars.get(i + 2).is_some_and(char::is_ascii_digit) => Some('\0'),
            _ => None,
        };
        if let Some(cooked) = simple {
            out.push(cooked);
            i += 2;
            continue;
        }
        match escape {
            '\r' => {
                i += if chars.get(i + 2) == Some(&'\n') { 3 } else { 2 };
            }
            '\n' | '\u{2028}' | '\u{2029}' => i += 2,
            'x' => match hex_value(&chars, i + 2, 2).and_then(char::from_u32) {
                Some(cooked) => {
                    out.push(cooked);
                    i += 4;
                }
                None => {
                    out.push('\\');
                    i += 1;
                }
            },
            'u' => match unicode_escape(&chars, i + 2) {
                Some((cooked, len)) => {
                    out.push(cooked);
                    i += 2 + len;
                }
                None => {
                    out.push('\\');
                    i += 1;
                }
            },
            '0'..='9' => {
                out.push('\\');
                i += 1;
            }
            other => {
                out.push(other);
                i += 2;
            }
        }
    }
    out
}

fn hex_value(chars: &[char], start: usize, len: usize) -> Option<u32> {
    let digits = chars.get(start..start + len)?;
    digits
        .iter()
        .try_fold(0u32, |acc, c| acc.checked_mul(16)?.checked_add(c.to_digit(16)?))
}

/// The char and consumed length of the body of a `\u` escape starting at
/// `start` (just past the `u`).
fn unicode_escape(chars: &[char], start: usize) -> Option<(char, usize)> {
    if chars.get(start) == Some(&'{') {
        let close = chars[start..].iter().position(|c| *c == '}')? + start;
        if close == start + 1 {
            return None;
        }
        let value = hex_value(chars, start + 1, close - start - 1)?;
        return char::from_u32(value).map(|c| (c, close - start + 1));
    }

    let high = hex_value(chars, start, 4)?;
    if (0xD800..0xDC00).contains(&high)
        && chars.get(start + 4) == Some(&'\\')
        && chars.get(start + 5) == Some(&'u')
    {
        if let Some(low) = hex_value(chars, start + 6, 4).filter(|v| (0xDC00..0xE000).contains(v)) {
            let combined = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
            return char::from_u32(combined).map(|c| (c, 10));
        }
    }
    char::from_u32(high).map(|c| (c, 4))
}
