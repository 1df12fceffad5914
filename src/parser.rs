//! Recursive descent parser for mapping scripts.
//!
//! Unknown tokens at file or class-body level are skipped,
//! but a missing token in a required position aborts the whole parse.
use failure_derive::Fail;

use crate::ast::*;
use crate::token::{Token, TokenKind};

pub struct Parser<'a> {
    tokens: &'a [Token],
    current: usize
}
impl<'a> Parser<'a> {
    #[inline]
    pub fn new(tokens: &'a [Token]) -> Parser<'a> {
        Parser { tokens, current: 0 }
    }
    pub fn parse(mut self) -> Result<MappingFile, ParseError> {
        self.skip_comments();
        let package = self.package_declaration()?;
        let mut file = MappingFile { package, ..MappingFile::default() };
        while !self.is_at_end() {
            match self.peek_kind() {
                TokenKind::Import => file.imports.push(self.import_declaration()?),
                TokenKind::Class => file.classes.push(self.class_declaration()?),
                _ => { self.advance(); }
            }
        }
        Ok(file)
    }
    fn package_declaration(&mut self) -> Result<Option<PackageDeclaration>, ParseError> {
        if !self.match_kind(TokenKind::Pkg) { return Ok(None) }
        let name = self.qualified_name("package name")?;
        self.expect(TokenKind::Semicolon, "';' after package declaration")?;
        Ok(Some(PackageDeclaration { name }))
    }
    fn import_declaration(&mut self) -> Result<ImportDeclaration, ParseError> {
        self.advance(); // 'import'
        let path = self.qualified_name("import path")?;
        let alias = if self.match_kind(TokenKind::As) {
            Some(self.expect(TokenKind::Identifier, "alias name after 'as'")?.lexeme.clone())
        } else {
            None
        };
        self.expect(TokenKind::Semicolon, "';' after import declaration")?;
        Ok(ImportDeclaration { path, alias })
    }
    fn class_declaration(&mut self) -> Result<ClassDeclaration, ParseError> {
        self.advance(); // 'class'
        let name = self.expect(TokenKind::Identifier, "class name")?.lexeme.clone();
        let obfuscated_name = if self.match_kind(TokenKind::LeftArrow) {
            Some(self.qualified_name("obfuscated class name")?)
        } else {
            None
        };
        let metadata = self.metadata()?;
        self.expect(TokenKind::LeftBrace, "'{' after class declaration")?;
        let mut class = ClassDeclaration { name, obfuscated_name, metadata, ..ClassDeclaration::default() };
        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            match self.class_member()? {
                Some(member) => class.add_member(member),
                None => { self.advance(); }
            }
        }
        self.expect(TokenKind::RightBrace, "'}' after class body")?;
        Ok(class)
    }
    fn class_member(&mut self) -> Result<Option<ClassMember>, ParseError> {
        Ok(Some(match self.peek_kind() {
            TokenKind::Md => ClassMember::Method(self.method_declaration()?),
            TokenKind::Fd => ClassMember::Field(self.field_declaration()?),
            TokenKind::Class => ClassMember::Class(self.class_declaration()?),
            TokenKind::Aliases => ClassMember::Aliases(self.aliases_block()?),
            _ => return Ok(None)
        }))
    }
    fn method_declaration(&mut self) -> Result<MethodDeclaration, ParseError> {
        let javadoc = self.previous()
            .filter(|token| token.kind == TokenKind::Javadoc)
            .map(|token| token.lexeme.clone());
        self.advance(); // 'md'
        let name = self.expect(TokenKind::Identifier, "method name")?.lexeme.clone();
        let parameters = self.parameters()?;
        let obfuscated_name = if self.match_kind(TokenKind::LeftArrow) {
            Some(self.expect(TokenKind::Identifier, "obfuscated method name")?.lexeme.clone())
        } else {
            None
        };
        let metadata = self.metadata()?;
        let aliases = self.member_body("method")?;
        Ok(MethodDeclaration { name, parameters, obfuscated_name, javadoc, aliases, metadata })
    }
    fn field_declaration(&mut self) -> Result<FieldDeclaration, ParseError> {
        self.advance(); // 'fd'
        let name = self.expect(TokenKind::Identifier, "field name")?.lexeme.clone();
        let obfuscated_name = if self.match_kind(TokenKind::LeftArrow) {
            Some(self.expect(TokenKind::Identifier, "obfuscated field name")?.lexeme.clone())
        } else {
            None
        };
        let metadata = self.metadata()?;
        let aliases = self.member_body("field")?;
        Ok(FieldDeclaration { name, obfuscated_name, aliases, metadata })
    }
    /// Either `;` or a braced body that may only hold `aliases` blocks
    fn member_body(&mut self, member: &str) -> Result<Vec<AliasEntry>, ParseError> {
        let mut aliases = Vec::new();
        if self.match_kind(TokenKind::LeftBrace) {
            while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
                if self.check(TokenKind::Aliases) {
                    aliases.extend(self.aliases_block()?);
                } else {
                    self.advance();
                }
            }
            self.expect(TokenKind::RightBrace, &format!("'}}' after {} body", member))?;
        } else {
            self.expect(TokenKind::Semicolon, &format!("';' after {} declaration", member))?;
        }
        Ok(aliases)
    }
    fn parameters(&mut self) -> Result<Vec<Parameter>, ParseError> {
        let mut parameters = Vec::new();
        if !self.match_kind(TokenKind::LeftParen) { return Ok(parameters) }
        if !self.check(TokenKind::RightParen) {
            loop {
                let type_name = self.qualified_name("parameter type")?;
                let varargs = self.match_kind(TokenKind::Varargs);
                parameters.push(Parameter { type_name, varargs });
                if !self.match_kind(TokenKind::Comma) { break }
            }
        }
        self.expect(TokenKind::RightParen, "')' after parameters")?;
        Ok(parameters)
    }
    fn aliases_block(&mut self) -> Result<Vec<AliasEntry>, ParseError> {
        self.advance(); // 'aliases'
        self.expect(TokenKind::LeftBrace, "'{' after 'aliases'")?;
        let mut aliases = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            if self.at_removed_marker() {
                self.advance();
                let version = self.expect(TokenKind::Identifier, "version after 'removed'")?.lexeme.clone();
                self.expect(TokenKind::Semicolon, "';' after removed declaration")?;
                aliases.push(AliasEntry::removed(version));
            } else if self.check(TokenKind::Identifier) {
                let version = self.advance().map(|token| token.lexeme.clone()).unwrap_or_default();
                let obfuscated_name = self.expect(TokenKind::Identifier, "obfuscated name")?.lexeme.clone();
                let metadata = self.metadata()?;
                self.expect(TokenKind::Semicolon, "';' after alias entry")?;
                aliases.push(AliasEntry::new(version, obfuscated_name).with_metadata(metadata));
            } else {
                self.advance();
            }
        }
        self.expect(TokenKind::RightBrace, "'}' after aliases block")?;
        Ok(aliases)
    }
    /// Inside an aliases block the lexer hands `removed` over as a plain identifier
    fn at_removed_marker(&self) -> bool {
        match self.peek() {
            Some(token) => token.kind == TokenKind::Removed ||
                (token.kind == TokenKind::Identifier && token.lexeme == "removed"),
            None => false
        }
    }
    fn metadata(&mut self) -> Result<Metadata, ParseError> {
        let mut metadata = Metadata::new();
        if !self.match_kind(TokenKind::LeftBracket) { return Ok(metadata) }
        if !self.check(TokenKind::RightBracket) {
            loop {
                let key = self.expect(TokenKind::Identifier, "metadata key")?.lexeme.clone();
                self.expect(TokenKind::Equals, "'=' after metadata key")?;
                let value = self.expect(TokenKind::String, "string value for metadata")?.lexeme.clone();
                metadata.insert(key, value);
                if !self.match_kind(TokenKind::Comma) { break }
            }
        }
        self.expect(TokenKind::RightBracket, "']' after metadata")?;
        Ok(metadata)
    }
    fn qualified_name(&mut self, what: &str) -> Result<String, ParseError> {
        let mut name = self.expect(TokenKind::Identifier, what)?.lexeme.clone();
        while self.match_kind(TokenKind::Dot) {
            let part = self.expect(TokenKind::Identifier, "identifier after '.'")?;
            name.push('.');
            name.push_str(&part.lexeme);
        }
        Ok(name)
    }
    fn skip_comments(&mut self) {
        while self.peek().map_or(false, |token| token.kind.is_comment()) {
            self.advance();
        }
    }
    fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<&'a Token, ParseError> {
        if self.check(kind) {
            if let Some(token) = self.advance() {
                return Ok(token)
            }
        }
        Err(self.error(expected))
    }
    fn error(&self, expected: &str) -> ParseError {
        let (found, line, column) = match self.tokens.get(self.current) {
            Some(token) => (token.describe(), token.line, token.column),
            None => match self.tokens.last() {
                Some(token) => ("end of input".to_owned(), token.line, token.column),
                None => ("end of input".to_owned(), 1, 1)
            }
        };
        ParseError { expected: expected.into(), found, line, column }
    }
    #[inline]
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.current)
            .filter(|token| token.kind != TokenKind::Eof)
    }
    #[inline]
    fn peek_kind(&self) -> TokenKind {
        self.peek().map_or(TokenKind::Eof, |token| token.kind)
    }
    #[inline]
    fn previous(&self) -> Option<&'a Token> {
        self.current.checked_sub(1).and_then(|index| self.tokens.get(index))
    }
    #[inline]
    fn is_at_end(&self) -> bool {
        self.peek().is_none()
    }
    #[inline]
    fn check(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind && kind != TokenKind::Eof
    }
    fn match_kind(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }
    fn advance(&mut self) -> Option<&'a Token> {
        let token = self.peek()?;
        self.current += 1;
        Some(token)
    }
}

#[inline]
pub fn parse(tokens: &[Token]) -> Result<MappingFile, ParseError> {
    Parser::new(tokens).parse()
}

#[derive(Clone, Debug, Eq, PartialEq, Fail)]
#[fail(display = "Expected {} at line {}, column {}, found {}", expected, line, column, found)]
pub struct ParseError {
    pub expected: String,
    pub found: String,
    pub line: u32,
    pub column: u32
}
