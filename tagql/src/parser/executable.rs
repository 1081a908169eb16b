use crate::document::{
    Argument, Definition, Directive, Document, Field, FragmentDefinition, FragmentSpread,
    InlineFragment, Name, ObjectField, OperationDefinition, OperationType, Selection, SelectionSet,
    TypeRef, Value, ValueKind, VariableDefinition,
};
use crate::parser::error::ParseError;
use crate::parser::lexer::TokenKind;
use crate::parser::Parser;

impl Parser {
    pub(crate) fn parse_document(&mut self) -> Result<Document, ParseError> {
        let mut definitions = vec![self.parse_definition()?];
        while !self.at(&TokenKind::Eof) {
            definitions.push(self.parse_definition()?);
        }
        Ok(Document { definitions })
    }

    fn parse_definition(&mut self) -> Result<Definition, ParseError> {
        if self.at(&TokenKind::LBrace) {
            return self.parse_operation().map(Definition::Operation);
        }
        let keyword = match &self.peek().kind {
            TokenKind::Name(n) => Some(n.clone()),
            _ => None,
        };
        match keyword.as_deref() {
            Some(k) if OperationType::from_keyword(k).is_some() => {
                self.parse_operation().map(Definition::Operation)
            }
            Some("fragment") => self.parse_fragment_definition().map(Definition::Fragment),
            _ => Err(self.unexpected()),
        }
    }

    // ------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------

    fn parse_operation(&mut self) -> Result<OperationDefinition, ParseError> {
        let pos = self.peek().pos;

        // Shorthand `{ ... }` is an anonymous query.
        if self.at(&TokenKind::LBrace) {
            return Ok(OperationDefinition {
                operation: OperationType::Query,
                name: None,
                variable_definitions: Vec::new(),
                directives: Vec::new(),
                selection_set: self.parse_selection_set()?,
                pos,
            });
        }

        let keyword = self.expect_name()?;
        let operation = OperationType::from_keyword(&keyword.value)
            .ok_or_else(|| ParseError::syntax(format!("Unexpected Name \"{}\".", keyword.value), keyword.pos))?;
        let name = if self.at_name() {
            Some(self.expect_name()?)
        } else {
            None
        };
        let variable_definitions =
            self.optional_many(TokenKind::LParen, TokenKind::RParen, Self::parse_variable_definition)?;
        let directives = self.parse_directives(false)?;
        let selection_set = self.parse_selection_set()?;

        Ok(OperationDefinition {
            operation,
            name,
            variable_definitions,
            directives,
            selection_set,
            pos,
        })
    }

    fn parse_variable_definition(&mut self) -> Result<VariableDefinition, ParseError> {
        let pos = self.expect(TokenKind::Dollar)?;
        let variable = self.expect_name()?;
        self.expect(TokenKind::Colon)?;
        let var_type = self.parse_type_ref()?;
        let default_value = if self.skip(&TokenKind::Equals) {
            Some(self.parse_value(true)?)
        } else {
            None
        };
        let directives = self.parse_directives(true)?;
        Ok(VariableDefinition {
            variable,
            var_type,
            default_value,
            directives,
            pos,
        })
    }

    pub(crate) fn parse_type_ref(&mut self) -> Result<TypeRef, ParseError> {
        self.nested(Self::parse_type_ref_inner)
    }

    fn parse_type_ref_inner(&mut self) -> Result<TypeRef, ParseError> {
        let pos = self.peek().pos;
        let inner = if self.skip(&TokenKind::LBracket) {
            let item = self.parse_type_ref()?;
            self.expect(TokenKind::RBracket)?;
            TypeRef::List(Box::new(item), pos)
        } else {
            TypeRef::Named(self.expect_name()?)
        };
        if self.skip(&TokenKind::Bang) {
            Ok(TypeRef::NonNull(Box::new(inner), pos))
        } else {
            Ok(inner)
        }
    }

    // ------------------------------------------------------------------
    // Selections
    // ------------------------------------------------------------------

    fn parse_selection_set(&mut self) -> Result<SelectionSet, ParseError> {
        self.nested(|p| {
            let pos = p.peek().pos;
            let selections = p.many(TokenKind::LBrace, TokenKind::RBrace, Self::parse_selection)?;
            Ok(SelectionSet { selections, pos })
        })
    }

    fn parse_selection(&mut self) -> Result<Selection, ParseError> {
        if self.at(&TokenKind::Spread) {
            self.parse_fragment()
        } else {
            self.parse_field().map(Selection::Field)
        }
    }

    fn parse_field(&mut self) -> Result<Field, ParseError> {
        let pos = self.peek().pos;
        let name_or_alias = self.expect_name()?;
        let (alias, name) = if self.skip(&TokenKind::Colon) {
            (Some(name_or_alias), self.expect_name()?)
        } else {
            (None, name_or_alias)
        };
        let arguments = self.parse_arguments(false)?;
        let directives = self.parse_directives(false)?;
        let selection_set = if self.at(&TokenKind::LBrace) {
            Some(self.parse_selection_set()?)
        } else {
            None
        };
        Ok(Field {
            alias,
            name,
            arguments,
            directives,
            selection_set,
            pos,
        })
    }

    fn parse_arguments(&mut self, is_const: bool) -> Result<Vec<Argument>, ParseError> {
        self.optional_many(TokenKind::LParen, TokenKind::RParen, |p| {
            let pos = p.peek().pos;
            let name = p.expect_name()?;
            p.expect(TokenKind::Colon)?;
            let value = p.parse_value(is_const)?;
            Ok(Argument { name, value, pos })
        })
    }

    /// `...Name` or `... on Type { }` / `... { }`.
    fn parse_fragment(&mut self) -> Result<Selection, ParseError> {
        let pos = self.expect(TokenKind::Spread)?;

        if self.at_name() && !self.at_keyword("on") {
            let name = self.expect_name()?;
            let directives = self.parse_directives(false)?;
            return Ok(Selection::FragmentSpread(FragmentSpread {
                name,
                directives,
                pos,
            }));
        }

        let type_condition = if self.at_keyword("on") {
            self.advance();
            Some(self.expect_name()?)
        } else {
            None
        };
        let directives = self.parse_directives(false)?;
        let selection_set = self.parse_selection_set()?;
        Ok(Selection::InlineFragment(InlineFragment {
            type_condition,
            directives,
            selection_set,
            pos,
        }))
    }

    fn parse_fragment_definition(&mut self) -> Result<FragmentDefinition, ParseError> {
        let pos = self.expect_keyword("fragment")?;
        if self.at_keyword("on") {
            return Err(self.unexpected());
        }
        let name = self.expect_name()?;
        self.expect_keyword("on")?;
        let type_condition = self.expect_name()?;
        let directives = self.parse_directives(false)?;
        let selection_set = self.parse_selection_set()?;
        Ok(FragmentDefinition {
            name,
            type_condition,
            directives,
            selection_set,
            pos,
        })
    }

    pub(crate) fn parse_directives(&mut self, is_const: bool) -> Result<Vec<Directive>, ParseError> {
        let mut directives = Vec::new();
        while self.at(&TokenKind::At) {
            let pos = self.advance().pos;
            let name = self.expect_name()?;
            let arguments = self.parse_arguments(is_const)?;
            directives.push(Directive {
                name,
                arguments,
                pos,
            });
        }
        Ok(directives)
    }

    // ------------------------------------------------------------------
    // Values
    // ------------------------------------------------------------------

    pub(crate) fn parse_value(&mut self, is_const: bool) -> Result<Value, ParseError> {
        self.nested(|p| p.parse_value_inner(is_const))
    }

    fn parse_value_inner(&mut self, is_const: bool) -> Result<Value, ParseError> {
        let pos = self.peek().pos;
        let kind = match self.peek().kind.clone() {
            TokenKind::LBracket => {
                let items = self.any(TokenKind::LBracket, TokenKind::RBracket, |p| {
                    p.parse_value(is_const)
                })?;
                ValueKind::List(items)
            }
            TokenKind::LBrace => {
                let fields = self.any(TokenKind::LBrace, TokenKind::RBrace, |p| {
                    let name = p.expect_name()?;
                    p.expect(TokenKind::Colon)?;
                    let value = p.parse_value(is_const)?;
                    Ok(ObjectField { name, value })
                })?;
                ValueKind::Object(fields)
            }
            TokenKind::Int(v) => {
                self.advance();
                ValueKind::Int(v)
            }
            TokenKind::Float(v) => {
                self.advance();
                ValueKind::Float(v)
            }
            TokenKind::String(v) | TokenKind::BlockString(v) => {
                self.advance();
                ValueKind::String(v)
            }
            TokenKind::Name(n) => {
                self.advance();
                match n.as_str() {
                    "true" => ValueKind::Boolean(true),
                    "false" => ValueKind::Boolean(false),
                    "null" => ValueKind::Null,
                    _ => ValueKind::Enum(n),
                }
            }
            TokenKind::Dollar if !is_const => {
                self.advance();
                let name: Name = self.expect_name()?;
                ValueKind::Variable(name.value)
            }
            _ => return Err(self.unexpected()),
        };
        Ok(Value { kind, pos })
    }
}
