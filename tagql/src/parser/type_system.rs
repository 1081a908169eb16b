use crate::document::type_system::{
    DirectiveDefinition, EnumValueDefinition, FieldDefinition, InputValueDefinition,
    SchemaDefinition, TypeDefinition, TypeDefinitionKind, TypeSystemDefinition, TypeSystemDocument,
};
use crate::document::{Name, OperationType};
use crate::parser::error::ParseError;
use crate::parser::lexer::TokenKind;
use crate::parser::Parser;

const TYPE_KEYWORDS: [&str; 6] = ["scalar", "type", "interface", "union", "enum", "input"];

impl Parser {
    pub(crate) fn parse_type_system_document(&mut self) -> Result<TypeSystemDocument, ParseError> {
        let mut definitions = vec![self.parse_type_system_definition()?];
        while !self.at(&TokenKind::Eof) {
            definitions.push(self.parse_type_system_definition()?);
        }
        Ok(TypeSystemDocument { definitions })
    }

    fn parse_type_system_definition(&mut self) -> Result<TypeSystemDefinition, ParseError> {
        let description = self.parse_description();
        let pos = self.peek().pos;
        let keyword = match &self.peek().kind {
            TokenKind::Name(n) => n.clone(),
            _ => return Err(self.unexpected()),
        };

        match keyword.as_str() {
            "schema" if description.is_none() => {
                self.advance();
                let directives = self.parse_directives(true)?;
                let root_operations = self.many(TokenKind::LBrace, TokenKind::RBrace, |p| {
                    let operation = p.expect_name()?;
                    let operation = OperationType::from_keyword(&operation.value).ok_or_else(|| {
                        ParseError::syntax(
                            format!("Unexpected Name \"{}\".", operation.value),
                            operation.pos,
                        )
                    })?;
                    p.expect(TokenKind::Colon)?;
                    Ok((operation, p.expect_name()?))
                })?;
                Ok(TypeSystemDefinition::Schema(SchemaDefinition {
                    directives,
                    root_operations,
                    pos,
                }))
            }
            "directive" => {
                self.advance();
                self.expect(TokenKind::At)?;
                let name = self.expect_name()?;
                let arguments = self.parse_argument_definitions()?;
                let repeatable = if self.at_keyword("repeatable") {
                    self.advance();
                    true
                } else {
                    false
                };
                self.expect_keyword("on")?;
                let locations = self.parse_name_list(TokenKind::Pipe)?;
                Ok(TypeSystemDefinition::Directive(DirectiveDefinition {
                    description,
                    name,
                    arguments,
                    repeatable,
                    locations,
                    pos,
                }))
            }
            "extend" if description.is_none() => {
                self.advance();
                let extension = self.parse_type_definition(None)?;
                Ok(TypeSystemDefinition::TypeExtension(extension))
            }
            _ => self
                .parse_type_definition(description)
                .map(TypeSystemDefinition::Type),
        }
    }

    fn parse_type_definition(
        &mut self,
        description: Option<String>,
    ) -> Result<TypeDefinition, ParseError> {
        let pos = self.peek().pos;
        let keyword = match &self.peek().kind {
            TokenKind::Name(n) if TYPE_KEYWORDS.contains(&n.as_str()) => n.clone(),
            _ => return Err(self.unexpected()),
        };
        self.advance();

        let name = self.expect_name()?;
        let interfaces = if keyword == "type" || keyword == "interface" {
            self.parse_implements()?
        } else {
            Vec::new()
        };
        let directives = self.parse_directives(true)?;

        let kind = match keyword.as_str() {
            "type" => TypeDefinitionKind::Object {
                interfaces,
                fields: self.parse_field_definitions()?,
            },
            "interface" => TypeDefinitionKind::Interface {
                interfaces,
                fields: self.parse_field_definitions()?,
            },
            "union" => TypeDefinitionKind::Union {
                members: if self.skip(&TokenKind::Equals) {
                    self.parse_name_list(TokenKind::Pipe)?
                } else {
                    Vec::new()
                },
            },
            "enum" => TypeDefinitionKind::Enum {
                values: self.optional_many(TokenKind::LBrace, TokenKind::RBrace, |p| {
                    let description = p.parse_description();
                    let name = p.expect_name()?;
                    let directives = p.parse_directives(true)?;
                    Ok(EnumValueDefinition {
                        description,
                        name,
                        directives,
                    })
                })?,
            },
            "input" => TypeDefinitionKind::InputObject {
                fields: self.optional_many(
                    TokenKind::LBrace,
                    TokenKind::RBrace,
                    Self::parse_input_value_definition,
                )?,
            },
            _ => TypeDefinitionKind::Scalar,
        };

        Ok(TypeDefinition {
            description,
            name,
            directives,
            kind,
            pos,
        })
    }

    fn parse_description(&mut self) -> Option<String> {
        match self.peek().kind.clone() {
            TokenKind::String(v) | TokenKind::BlockString(v) => {
                self.advance();
                Some(v)
            }
            _ => None,
        }
    }

    /// `implements A & B`, with an optional leading `&`.
    fn parse_implements(&mut self) -> Result<Vec<Name>, ParseError> {
        if !self.at_keyword("implements") {
            return Ok(Vec::new());
        }
        self.advance();
        self.parse_name_list(TokenKind::Amp)
    }

    /// `sep? Name (sep Name)*`
    fn parse_name_list(&mut self, separator: TokenKind) -> Result<Vec<Name>, ParseError> {
        self.skip(&separator);
        let mut names = vec![self.expect_name()?];
        while self.skip(&separator) {
            names.push(self.expect_name()?);
        }
        Ok(names)
    }

    fn parse_field_definitions(&mut self) -> Result<Vec<FieldDefinition>, ParseError> {
        self.optional_many(TokenKind::LBrace, TokenKind::RBrace, |p| {
            let description = p.parse_description();
            let name = p.expect_name()?;
            let arguments = p.parse_argument_definitions()?;
            p.expect(TokenKind::Colon)?;
            let field_type = p.parse_type_ref()?;
            let directives = p.parse_directives(true)?;
            Ok(FieldDefinition {
                description,
                name,
                arguments,
                field_type,
                directives,
            })
        })
    }

    fn parse_argument_definitions(&mut self) -> Result<Vec<InputValueDefinition>, ParseError> {
        self.optional_many(
            TokenKind::LParen,
            TokenKind::RParen,
            Self::parse_input_value_definition,
        )
    }

    fn parse_input_value_definition(&mut self) -> Result<InputValueDefinition, ParseError> {
        let description = self.parse_description();
        let name = self.expect_name()?;
        self.expect(TokenKind::Colon)?;
        let value_type = self.parse_type_ref()?;
        let default_value = if self.skip(&TokenKind::Equals) {
            Some(self.parse_value(true)?)
        } else {
            None
        };
        let directives = self.parse_directives(true)?;
        Ok(InputValueDefinition {
            description,
            name,
            value_type,
            default_value,
            directives,
        })
    }
}
