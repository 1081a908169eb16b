pub mod error;
mod executable;
mod lexer;
mod type_system;

pub use error::ParseError;

use crate::document::type_system::TypeSystemDocument;
use crate::document::{Document, Name, Pos};
use crate::parser::lexer::{Token, TokenKind};

/// Deepest nesting of selection sets, list and object values, and list
/// types the parser accepts.
pub const MAX_NESTING_DEPTH: usize = 128;

/// Parse an executable GraphQL document (operations and fragments).
pub fn parse_document(source: &str) -> Result<Document, ParseError> {
    let mut parser = Parser::new(source);
    let document = parser.parse_document()?;
    parser.finish(document)
}

/// Parse a GraphQL SDL document.
pub fn parse_schema(source: &str) -> Result<TypeSystemDocument, ParseError> {
    let mut parser = Parser::new(source);
    let document = parser.parse_type_system_document()?;
    parser.finish(document)
}

/// Token cursor shared by the executable and SDL grammars.
pub(crate) struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    /// Why lexing stopped early; reported once the parser reaches the
    /// final token.
    lex_error: Option<ParseError>,
    depth: usize,
}

impl Parser {
    fn new(source: &str) -> Self {
        let (tokens, lex_error) = lexer::tokenize(source);
        Parser {
            tokens,
            pos: 0,
            lex_error,
            depth: 0,
        }
    }

    fn finish<T>(self, parsed: T) -> Result<T, ParseError> {
        match self.lex_error {
            Some(error) => Err(error),
            None => Ok(parsed),
        }
    }

    /// The lexer error, when the cursor sits on the token it cut short.
    fn pending_lex_error(&self) -> Option<ParseError> {
        let at_end = self.pos + 1 >= self.tokens.len();
        self.lex_error.clone().filter(|_| at_end)
    }

    /// Run `parse` one nesting level deeper.
    fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(self.pending_lex_error().unwrap_or_else(|| {
                ParseError::syntax(
                    format!("Document nesting exceeds {} levels.", MAX_NESTING_DEPTH),
                    self.peek().pos,
                )
            }));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn peek(&self) -> &Token {
        self.peek_at(0)
    }

    /// Look `n` tokens ahead. Past the end this keeps returning `Eof`.
    fn peek_at(&self, n: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.pos + n).min(last)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn at(&self, kind: &TokenKind) -> bool {
        &self.peek().kind == kind
    }

    fn at_name(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Name(_))
    }

    fn at_keyword(&self, keyword: &str) -> bool {
        matches!(&self.peek().kind, TokenKind::Name(n) if n == keyword)
    }

    /// Consume the token if it is `kind`.
    fn skip(&mut self, kind: &TokenKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Pos, ParseError> {
        if self.at(&kind) {
            Ok(self.advance().pos)
        } else {
            Err(self.expected(&kind.to_string()))
        }
    }

    fn expect_name(&mut self) -> Result<Name, ParseError> {
        match self.peek().kind.clone() {
            TokenKind::Name(value) => {
                let pos = self.advance().pos;
                Ok(Name { value, pos })
            }
            _ => Err(self.expected("Name")),
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<Pos, ParseError> {
        if self.at_keyword(keyword) {
            Ok(self.advance().pos)
        } else {
            Err(self.expected(&format!("\"{}\"", keyword)))
        }
    }

    fn expected(&self, what: &str) -> ParseError {
        if let Some(error) = self.pending_lex_error() {
            return error;
        }
        let token = self.peek();
        ParseError::syntax(format!("Expected {}, found {}.", what, token.kind), token.pos)
    }

    fn unexpected(&self) -> ParseError {
        if let Some(error) = self.pending_lex_error() {
            return error;
        }
        let token = self.peek();
        ParseError::syntax(format!("Unexpected {}.", token.kind), token.pos)
    }

    /// `open item+ close`: at least one item.
    fn many<T>(
        &mut self,
        open: TokenKind,
        close: TokenKind,
        mut item: impl FnMut(&mut Self) -> Result<T, ParseError>,
    ) -> Result<Vec<T>, ParseError> {
        self.expect(open)?;
        let mut items = vec![item(self)?];
        while !self.skip(&close) {
            items.push(item(self)?);
        }
        Ok(items)
    }

    /// `open item* close`.
    fn any<T>(
        &mut self,
        open: TokenKind,
        close: TokenKind,
        mut item: impl FnMut(&mut Self) -> Result<T, ParseError>,
    ) -> Result<Vec<T>, ParseError> {
        self.expect(open)?;
        let mut items = Vec::new();
        while !self.skip(&close) {
            items.push(item(self)?);
        }
        Ok(items)
    }

    /// Like `many`, but yields nothing when the opening token is absent.
    fn optional_many<T>(
        &mut self,
        open: TokenKind,
        close: TokenKind,
        item: impl FnMut(&mut Self) -> Result<T, ParseError>,
    ) -> Result<Vec<T>, ParseError> {
        if self.at(&open) {
            self.many(open, close, item)
        } else {
            Ok(Vec::new())
        }
    }
}
