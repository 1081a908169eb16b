use std::fmt;

use crate::document::Pos;
use crate::parser::error::ParseError;
use crate::position::utf16_offsets;

// ---------------------------------------------------------------------------
// Token types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    // Punctuators
    Bang,
    Dollar,
    Amp,
    LParen,
    RParen,
    Spread,
    Colon,
    Equals,
    At,
    LBracket,
    RBracket,
    LBrace,
    Pipe,
    RBrace,

    // Values
    Name(String),
    Int(String),
    Float(String),
    String(String),
    BlockString(String),

    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub pos: Pos,
}

impl TokenKind {
    pub fn punctuator(&self) -> Option<&'static str> {
        Some(match self {
            TokenKind::Bang => "!",
            TokenKind::Dollar => "$",
            TokenKind::Amp => "&",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::Spread => "...",
            TokenKind::Colon => ":",
            TokenKind::Equals => "=",
            TokenKind::At => "@",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::LBrace => "{",
            TokenKind::Pipe => "|",
            TokenKind::RBrace => "}",
            _ => return None,
        })
    }
}

/// Token description used in syntax error messages: `"{"`, `Name "id"`, `<EOF>`.
impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(p) = self.punctuator() {
            return write!(f, "\"{}\"", p);
        }
        match self {
            TokenKind::Name(v) => write!(f, "Name \"{}\"", v),
            TokenKind::Int(v) => write!(f, "Int \"{}\"", v),
            TokenKind::Float(v) => write!(f, "Float \"{}\"", v),
            TokenKind::String(v) => write!(f, "String \"{}\"", v),
            TokenKind::BlockString(v) => write!(f, "BlockString \"{}\"", v),
            TokenKind::Eof => f.write_str("<EOF>"),
            _ => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Lexer
// ---------------------------------------------------------------------------

/// Split GraphQL source into tokens, ending with a single `Eof`.
///
/// Lexing stops at the first invalid token. Its error is returned next to
/// the tokens read so far, which then end with an `Eof` at the failure, so
/// a syntax error earlier in the document still wins.
pub(crate) fn tokenize(source: &str) -> (Vec<Token>, Option<ParseError>) {
    let chars: Vec<char> = source.chars().collect();
    let units = utf16_offsets(&chars);
    let mut lexer = Lexer {
        chars,
        units,
        i: 0,
        line: 1,
        line_start: 0,
    };
    let mut tokens = Vec::new();
    loop {
        let start = lexer.pos();
        match lexer.next_token() {
            Ok(token) => {
                let done = token.kind == TokenKind::Eof;
                tokens.push(token);
                if done {
                    return (tokens, None);
                }
            }
            Err(error) => {
                let pos = error.first_location().unwrap_or(start);
                tokens.push(Token {
                    kind: TokenKind::Eof,
                    pos,
                });
                return (tokens, Some(error));
            }
        }
    }
}

struct Lexer {
    chars: Vec<char>,
    /// Columns count UTF-16 code units, as JavaScript tooling does.
    units: Vec<usize>,
    i: usize,
    line: usize,
    line_start: usize,
}

impl Lexer {
    fn pos(&self) -> Pos {
        Pos::new(self.line, self.units[self.i] - self.units[self.line_start] + 1)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.i).copied()
    }

    fn peek_at(&self, n: usize) -> Option<char> {
        self.chars.get(self.i + n).copied()
    }

    /// Consume a line terminator at the cursor, if any.
    fn newline(&mut self) -> bool {
        match self.peek() {
            Some('\n') => self.i += 1,
            Some('\r') => {
                self.i += 1;
                if self.peek() == Some('\n') {
                    self.i += 1;
                }
            }
            _ => return false,
        }
        self.line += 1;
        self.line_start = self.i;
        true
    }

    fn skip_ignored(&mut self) {
        while let Some(c) = self.peek() {
            match c {
                '\u{feff}' | ' ' | '\t' | ',' => self.i += 1,
                '\n' | '\r' => {
                    self.newline();
                }
                '#' => {
                    while let Some(c) = self.peek() {
                        if c == '\n' || c == '\r' {
                            break;
                        }
                        self.i += 1;
                    }
                }
                _ => break,
            }
        }
    }

    fn next_token(&mut self) -> Result<Token, ParseError> {
        self.skip_ignored();
        let pos = self.pos();
        let Some(c) = self.peek() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                pos,
            });
        };

        let punct = match c {
            '!' => Some(TokenKind::Bang),
            '$' => Some(TokenKind::Dollar),
            '&' => Some(TokenKind::Amp),
            '(' => Some(TokenKind::LParen),
            ')' => Some(TokenKind::RParen),
            ':' => Some(TokenKind::Colon),
            '=' => Some(TokenKind::Equals),
            '@' => Some(TokenKind::At),
            '[' => Some(TokenKind::LBracket),
            ']' => Some(TokenKind::RBracket),
            '{' => Some(TokenKind::LBrace),
            '|' => Some(TokenKind::Pipe),
            '}' => Some(TokenKind::RBrace),
            _ => None,
        };
        if let Some(kind) = punct {
            self.i += 1;
            return Ok(Token { kind, pos });
        }

        let kind = match c {
            '.' => {
                if self.peek_at(1) == Some('.') && self.peek_at(2) == Some('.') {
                    self.i += 3;
                    TokenKind::Spread
                } else {
                    return Err(ParseError::syntax("Unexpected character: \".\".", pos));
                }
            }
            c if is_name_start(c) => {
                let start = self.i;
                while self.peek().is_some_and(is_name_continue) {
                    self.i += 1;
                }
                TokenKind::Name(self.chars[start..self.i].iter().collect())
            }
            c if c == '-' || c.is_ascii_digit() => self.read_number()?,
            '"' => {
                if self.peek_at(1) == Some('"') && self.peek_at(2) == Some('"') {
                    self.read_block_string()?
                } else {
                    self.read_string()?
                }
            }
            other => {
                return Err(ParseError::syntax(
                    format!("Unexpected character: {}.", describe_char(Some(other))),
                    pos,
                ));
            }
        };
        Ok(Token { kind, pos })
    }

    fn read_digits(&mut self) -> Result<(), ParseError> {
        if !self.peek().is_some_and(|c| c.is_ascii_digit()) {
            return Err(ParseError::syntax(
                format!(
                    "Invalid number, expected digit but got: {}.",
                    describe_char(self.peek())
                ),
                self.pos(),
            ));
        }
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.i += 1;
        }
        Ok(())
    }

    fn read_number(&mut self) -> Result<TokenKind, ParseError> {
        let start = self.i;
        let mut is_float = false;

        if self.peek() == Some('-') {
            self.i += 1;
        }
        if self.peek() == Some('0') {
            self.i += 1;
            if self.peek().is_some_and(|c| c.is_ascii_digit()) {
                return Err(ParseError::syntax(
                    format!(
                        "Invalid number, unexpected digit after 0: {}.",
                        describe_char(self.peek())
                    ),
                    self.pos(),
                ));
            }
        } else {
            self.read_digits()?;
        }

        if self.peek() == Some('.') {
            is_float = true;
            self.i += 1;
            self.read_digits()?;
        }

        if matches!(self.peek(), Some('e' | 'E')) {
            is_float = true;
            self.i += 1;
            if matches!(self.peek(), Some('+' | '-')) {
                self.i += 1;
            }
            self.read_digits()?;
        }

        if self.peek().is_some_and(|c| c == '.' || is_name_start(c)) {
            return Err(ParseError::syntax(
                format!(
                    "Invalid number, expected digit but got: {}.",
                    describe_char(self.peek())
                ),
                self.pos(),
            ));
        }

        let text: String = self.chars[start..self.i].iter().collect();
        Ok(if is_float {
            TokenKind::Float(text)
        } else {
            TokenKind::Int(text)
        })
    }

    fn read_string(&mut self) -> Result<TokenKind, ParseError> {
        self.i += 1;
        let mut value = String::new();
        loop {
            let Some(c) = self.peek() else {
                return Err(ParseError::syntax("Unterminated string.", self.pos()));
            };
            match c {
                '\n' | '\r' => {
                    return Err(ParseError::syntax("Unterminated string.", self.pos()));
                }
                '"' => {
                    self.i += 1;
                    return Ok(TokenKind::String(value));
                }
                '\\' => {
                    let escape_pos = self.pos();
                    self.i += 1;
                    let escaped = match self.peek() {
                        Some('"') => '"',
                        Some('\\') => '\\',
                        Some('/') => '/',
                        Some('b') => '\u{8}',
                        Some('f') => '\u{c}',
                        Some('n') => '\n',
                        Some('r') => '\r',
                        Some('t') => '\t',
                        Some('u') => {
                            let hex: String = (1..=4).filter_map(|n| self.peek_at(n)).collect();
                            let decoded = if hex.len() == 4 {
                                u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32)
                            } else {
                                None
                            };
                            match decoded {
                                Some(ch) => {
                                    self.i += 4;
                                    ch
                                }
                                None => {
                                    return Err(ParseError::syntax(
                                        format!("Invalid Unicode escape sequence: \"\\u{}\".", hex),
                                        escape_pos,
                                    ));
                                }
                            }
                        }
                        other => {
                            return Err(ParseError::syntax(
                                format!(
                                    "Invalid character escape sequence: \"\\{}\".",
                                    other.map(String::from).unwrap_or_default()
                                ),
                                escape_pos,
                            ));
                        }
                    };
                    self.i += 1;
                    value.push(escaped);
                }
                c => {
                    self.i += 1;
                    value.push(c);
                }
            }
        }
    }

    fn read_block_string(&mut self) -> Result<TokenKind, ParseError> {
        self.i += 3;
        let mut raw = String::new();
        loop {
            let Some(c) = self.peek() else {
                return Err(ParseError::syntax("Unterminated string.", self.pos()));
            };
            if c == '"' && self.peek_at(1) == Some('"') && self.peek_at(2) == Some('"') {
                self.i += 3;
                return Ok(TokenKind::BlockString(block_string_value(&raw)));
            }
            if c == '\\'
                && self.peek_at(1) == Some('"')
                && self.peek_at(2) == Some('"')
                && self.peek_at(3) == Some('"')
            {
                self.i += 4;
                raw.push_str("\"\"\"");
                continue;
            }
            if c == '\n' || c == '\r' {
                self.newline();
                raw.push('\n');
                continue;
            }
            self.i += 1;
            raw.push(c);
        }
    }
}

fn is_name_start(c: char) -> bool {
    c == '_' || c.is_ascii_alphabetic()
}

fn is_name_continue(c: char) -> bool {
    c == '_' || c.is_ascii_alphanumeric()
}

fn describe_char(c: Option<char>) -> String {
    match c {
        Some(c) => format!("\"{}\"", c),
        None => "<EOF>".to_string(),
    }
}

/// Strip the common indentation and surrounding blank lines of a block
/// string's raw contents.
fn block_string_value(raw: &str) -> String {
    let lines: Vec<&str> = raw.split('\n').collect();

    let indent_of = |line: &str| line.len() - line.trim_start_matches([' ', '\t']).len();
    let common_indent = lines
        .iter()
        .skip(1)
        .filter(|line| !line.trim_start_matches([' ', '\t']).is_empty())
        .map(|line| indent_of(*line))
        .min();

    let mut dedented: Vec<&str> = lines
        .iter()
        .enumerate()
        .map(|(i, &line)| match common_indent {
            Some(indent) if i > 0 => line.get(indent..).unwrap_or(""),
            _ => line,
        })
        .collect();

    let is_blank = |line: &&str| line.trim_start_matches([' ', '\t']).is_empty();
    while dedented.first().is_some_and(is_blank) {
        dedented.remove(0);
    }
    while dedented.last().is_some_and(is_blank) {
        dedented.pop();
    }
    dedented.join("\n")
}
