//! Context-sensitive lexer for mapping scripts.
//!
//! Whether a word is a keyword depends on where it appears.
//! Declaration headers (the name after `pkg`, `import`, `class`, `md` or `fd`)
//! and `aliases` blocks treat every word as an identifier,
//! so entries may legitimately be named `class`, `fd`, and so on.
//! The lexer tracks this with an explicit stack of [LexContext]s.
use std::fmt::{self, Display, Formatter};

use failure_derive::Fail;

use crate::token::{Token, TokenKind};

/// The number of most recently emitted tokens, the `{` itself included,
/// inspected when a brace opens a scope that no declaration header accounts for.
pub const BRACE_CONTEXT_WINDOW: usize = 3;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum LexContext {
    Global,
    PackageName,
    ImportPath,
    ClassName,
    MethodName,
    FieldName,
    AliasContext,
    ClassBody,
    MemberBody,
    Block
}
impl LexContext {
    /// Headers last until the `{` or `;` that ends their declaration
    #[inline]
    pub fn is_header(self) -> bool {
        match self {
            LexContext::PackageName | LexContext::ImportPath |
            LexContext::ClassName | LexContext::MethodName |
            LexContext::FieldName => true,
            _ => false
        }
    }
    fn body(self) -> LexContext {
        match self {
            LexContext::ClassName => LexContext::ClassBody,
            LexContext::MethodName | LexContext::FieldName => LexContext::MemberBody,
            _ => LexContext::Block
        }
    }
    pub fn classify(self, word: &str) -> TokenKind {
        match self {
            LexContext::Global | LexContext::ClassBody |
            LexContext::MemberBody | LexContext::Block => {
                match TokenKind::keyword(word) {
                    Some(TokenKind::As) | None => TokenKind::Identifier,
                    Some(keyword) => keyword
                }
            },
            LexContext::ImportPath if word == "as" => TokenKind::As,
            LexContext::ImportPath | LexContext::PackageName |
            LexContext::ClassName | LexContext::MethodName |
            LexContext::FieldName | LexContext::AliasContext => TokenKind::Identifier,
        }
    }
}

pub struct Lexer {
    source: Vec<char>,
    current: usize,
    line: u32,
    column: u32,
    tokens: Vec<Token>,
    contexts: Vec<LexContext>
}
impl Lexer {
    pub fn new(source: &str) -> Lexer {
        Lexer {
            source: source.chars().collect(),
            current: 0,
            line: 1,
            column: 1,
            tokens: Vec::new(),
            contexts: vec![LexContext::Global]
        }
    }
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        self.scan_all()?;
        Ok(self.tokens)
    }
    fn scan_all(&mut self) -> Result<(), LexError> {
        while !self.is_at_end() {
            self.scan_token()?;
        }
        let (line, column) = (self.line, self.column);
        self.add_token(TokenKind::Eof, "", line, column);
        Ok(())
    }
    #[inline]
    fn context(&self) -> LexContext {
        self.contexts.last().cloned().unwrap_or(LexContext::Global)
    }
    fn scan_token(&mut self) -> Result<(), LexError> {
        let (line, column) = (self.line, self.column);
        let start = self.current;
        let c = self.advance();
        match c {
            ' ' | '\t' | '\r' | '\n' => {},
            '{' => {
                self.add_token(TokenKind::LeftBrace, "{", line, column);
                self.enter_block();
            },
            '}' => {
                self.add_token(TokenKind::RightBrace, "}", line, column);
                self.leave_block();
            },
            '(' => self.add_token(TokenKind::LeftParen, "(", line, column),
            ')' => self.add_token(TokenKind::RightParen, ")", line, column),
            '[' => self.add_token(TokenKind::LeftBracket, "[", line, column),
            ']' => self.add_token(TokenKind::RightBracket, "]", line, column),
            ';' => {
                self.add_token(TokenKind::Semicolon, ";", line, column);
                self.close_headers();
            },
            ',' => self.add_token(TokenKind::Comma, ",", line, column),
            '=' => self.add_token(TokenKind::Equals, "=", line, column),
            '.' => {
                if self.peek() == Some('.') && self.peek_next() == Some('.') {
                    self.advance();
                    self.advance();
                    self.add_token(TokenKind::Varargs, "...", line, column);
                } else {
                    self.add_token(TokenKind::Dot, ".", line, column);
                }
            },
            '<' => {
                if !self.match_char('-') {
                    return Err(LexError::new(line, column, LexErrorReason::UnexpectedCharacter('<')))
                }
                self.add_token(TokenKind::LeftArrow, "<-", line, column);
            },
            '/' => self.comment(line, column)?,
            '"' => self.string(line, column)?,
            c if c.is_ascii_digit() => {
                self.advance_while(|c| c.is_ascii_digit());
                let text = self.text(start, self.current);
                self.add_token(TokenKind::Number, text, line, column);
            },
            c if is_identifier_start(c) => {
                self.advance_while(is_identifier_part);
                let text = self.text(start, self.current);
                let kind = self.context().classify(&text);
                self.add_token(kind, text, line, column);
                self.enter_header(kind);
            },
            c => return Err(LexError::new(line, column, LexErrorReason::UnexpectedCharacter(c)))
        }
        Ok(())
    }
    fn comment(&mut self, line: u32, column: u32) -> Result<(), LexError> {
        if self.match_char('/') {
            let start = self.current;
            self.advance_while(|c| c != '\n');
            let text = self.text(start, self.current);
            self.add_token(TokenKind::Comment, text, line, column);
            Ok(())
        } else if self.match_char('*') {
            // NOTE: `/**/` is an empty block comment, not javadoc
            let javadoc = self.peek() == Some('*') && self.peek_next() != Some('/');
            if javadoc {
                self.advance();
            }
            let start = self.current;
            loop {
                match self.peek() {
                    None => return Err(LexError::new(line, column, LexErrorReason::UnterminatedComment)),
                    Some('*') if self.peek_next() == Some('/') => break,
                    Some(_) => { self.advance(); }
                }
            }
            let text = self.text(start, self.current);
            self.advance(); // '*'
            self.advance(); // '/'
            let kind = if javadoc { TokenKind::Javadoc } else { TokenKind::Comment };
            self.add_token(kind, text, line, column);
            Ok(())
        } else {
            Err(LexError::new(line, column, LexErrorReason::UnexpectedCharacter('/')))
        }
    }
    fn string(&mut self, line: u32, column: u32) -> Result<(), LexError> {
        let start = self.current;
        loop {
            match self.peek() {
                None => return Err(LexError::new(line, column, LexErrorReason::UnterminatedString)),
                Some('"') => break,
                Some(_) => { self.advance(); }
            }
        }
        let text = self.text(start, self.current);
        self.advance(); // closing '"'
        self.add_token(TokenKind::String, text, line, column);
        Ok(())
    }
    fn enter_header(&mut self, kind: TokenKind) {
        let header = match kind {
            TokenKind::Pkg => LexContext::PackageName,
            TokenKind::Import => LexContext::ImportPath,
            TokenKind::Class => LexContext::ClassName,
            TokenKind::Md => LexContext::MethodName,
            TokenKind::Fd => LexContext::FieldName,
            _ => return
        };
        self.contexts.push(header);
    }
    fn enter_block(&mut self) {
        let current = self.context();
        if current.is_header() {
            self.contexts.pop();
            self.contexts.push(current.body());
        } else {
            let inferred = self.infer_block_context();
            self.contexts.push(inferred);
        }
    }
    /// Guess the scope a brace opens from the tokens ending with it.
    fn infer_block_context(&self) -> LexContext {
        let start = self.tokens.len().saturating_sub(BRACE_CONTEXT_WINDOW);
        let recent = &self.tokens[start..];
        let has = |kind: TokenKind| recent.iter().any(|token| token.kind == kind);
        if has(TokenKind::Aliases) {
            LexContext::AliasContext
        } else if has(TokenKind::Class) {
            LexContext::ClassBody
        } else if has(TokenKind::Md) || has(TokenKind::Fd) {
            LexContext::MemberBody
        } else {
            LexContext::Block
        }
    }
    fn leave_block(&mut self) {
        self.close_headers();
        if self.contexts.len() > 1 {
            self.contexts.pop();
        }
    }
    fn close_headers(&mut self) {
        while self.context().is_header() {
            self.contexts.pop();
        }
    }
    fn add_token(&mut self, kind: TokenKind, lexeme: impl Into<String>, line: u32, column: u32) {
        self.tokens.push(Token::new(kind, lexeme, line, column));
    }
    #[inline]
    fn text(&self, start: usize, end: usize) -> String {
        self.source[start..end].iter().collect()
    }
    fn advance(&mut self) -> char {
        let c = self.source[self.current];
        self.current += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        c
    }
    fn advance_while(&mut self, predicate: impl Fn(char) -> bool) {
        while self.peek().map_or(false, &predicate) {
            self.advance();
        }
    }
    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }
    #[inline]
    fn peek(&self) -> Option<char> {
        self.source.get(self.current).cloned()
    }
    #[inline]
    fn peek_next(&self) -> Option<char> {
        self.source.get(self.current + 1).cloned()
    }
    #[inline]
    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }
}

#[inline]
fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}
#[inline]
fn is_identifier_part(c: char) -> bool {
    is_identifier_start(c) || c.is_ascii_digit()
}

#[inline]
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(source).tokenize()
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum LexErrorReason {
    UnterminatedString,
    UnterminatedComment,
    UnexpectedCharacter(char)
}
impl Display for LexErrorReason {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match *self {
            LexErrorReason::UnterminatedString => f.write_str("Unterminated string"),
            LexErrorReason::UnterminatedComment => f.write_str("Unterminated comment"),
            LexErrorReason::UnexpectedCharacter(c) => write!(f, "Unexpected character {:?}", c),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Fail)]
#[fail(display = "{} at line {}, column {}", reason, line, column)]
pub struct LexError {
    pub line: u32,
    pub column: u32,
    pub reason: LexErrorReason
}
impl LexError {
    #[inline]
    fn new(line: u32, column: u32, reason: LexErrorReason) -> LexError {
        LexError { line, column, reason }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::token::TokenKind::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).unwrap().iter().map(|token| token.kind).collect()
    }
    fn contexts_after(source: &str) -> Vec<LexContext> {
        let mut lexer = Lexer::new(source);
        lexer.scan_all().unwrap();
        lexer.contexts
    }

    #[test]
    fn empty_input() {
        let tokens = tokenize("").unwrap();
        assert_eq!(tokens, vec![Token::new(Eof, "", 1, 1)]);
    }
    #[test]
    fn punctuation() {
        assert_eq!(kinds("{ } ( ) [ ] ; , = ... <- ."), vec![
            LeftBrace, RightBrace, LeftParen, RightParen,
            LeftBracket, RightBracket, Semicolon, Comma,
            Equals, Varargs, LeftArrow, Dot, Eof
        ]);
    }
    #[test]
    fn only_three_dots_are_varargs() {
        assert_eq!(kinds("a..b"), vec![Identifier, Dot, Dot, Identifier, Eof]);
        assert_eq!(kinds("String..."), vec![Identifier, Varargs, Eof]);
    }
    #[test]
    fn literals() {
        let tokens = tokenize("\"hello world\" 123456").unwrap();
        assert_eq!(tokens[0], Token::new(String, "hello world", 1, 1));
        assert_eq!(tokens[1], Token::new(Number, "123456", 1, 15));
        assert_eq!(tokens[2].kind, Eof);
    }
    #[test]
    fn strings_span_lines() {
        let tokens = tokenize("\"a\nb\" x").unwrap();
        assert_eq!(tokens[0], Token::new(String, "a\nb", 1, 1));
        assert_eq!(tokens[1], Token::new(Identifier, "x", 2, 4));
    }
    #[test]
    fn comments_are_tokens() {
        let tokens = tokenize("// this is comment\npkg").unwrap();
        assert_eq!(tokens[0], Token::new(Comment, " this is comment", 1, 1));
        assert_eq!(tokens[1], Token::new(Pkg, "pkg", 2, 1));
        let tokens = tokenize("/* block */ /** javadoc */ /**/").unwrap();
        assert_eq!(tokens[0], Token::new(Comment, " block ", 1, 1));
        assert_eq!(tokens[1], Token::new(Javadoc, " javadoc ", 1, 13));
        assert_eq!(tokens[2], Token::new(Comment, "", 1, 28));
    }
    #[test]
    fn identifiers_allow_jvm_characters() {
        let tokens = tokenize("Outer$Inner _x1").unwrap();
        assert_eq!(tokens[0].lexeme, "Outer$Inner");
        assert_eq!(tokens[1].lexeme, "_x1");
    }
    #[test]
    fn unterminated_string() {
        let error = tokenize("pkg a;\n  \"abc").unwrap_err();
        assert_eq!(error, LexError::new(2, 3, LexErrorReason::UnterminatedString));
        assert_eq!(format!("{}", error), "Unterminated string at line 2, column 3");
    }
    #[test]
    fn unterminated_comment() {
        let error = tokenize("class A {\n /* never\n closed").unwrap_err();
        assert_eq!(error, LexError::new(2, 2, LexErrorReason::UnterminatedComment));
    }
    #[test]
    fn unexpected_character() {
        let error = tokenize("pkg a;\nclass @").unwrap_err();
        assert_eq!(error, LexError::new(2, 7, LexErrorReason::UnexpectedCharacter('@')));
        let error = tokenize("a < b").unwrap_err();
        assert_eq!(error.reason, LexErrorReason::UnexpectedCharacter('<'));
        let error = tokenize("a / b").unwrap_err();
        assert_eq!(error.reason, LexErrorReason::UnexpectedCharacter('/'));
    }
    #[test]
    fn keywords_are_identifiers_in_headers() {
        assert_eq!(kinds("pkg class"), vec![Pkg, Identifier, Eof]);
        assert_eq!(
            kinds("class class <- fd {"),
            vec![Class, Identifier, LeftArrow, Identifier, LeftBrace, Eof]
        );
        assert_eq!(
            kinds("class A { md fd(class) <- removed; fd md; }"),
            vec![
                Class, Identifier, LeftBrace,
                Md, Identifier, LeftParen, Identifier, RightParen, LeftArrow, Identifier, Semicolon,
                Fd, Identifier, Semicolon,
                RightBrace, Eof
            ]
        );
    }
    #[test]
    fn class_body_recognizes_member_keywords() {
        assert_eq!(
            kinds("class MyClass <- a [type=\"class\"] { md foo(List) <- b; fd bar <- c; }"),
            vec![
                Class, Identifier, LeftArrow, Identifier,
                LeftBracket, Identifier, Equals, String, RightBracket, LeftBrace,
                Md, Identifier, LeftParen, Identifier, RightParen, LeftArrow, Identifier, Semicolon,
                Fd, Identifier, LeftArrow, Identifier, Semicolon,
                RightBrace, Eof
            ]
        );
    }
    #[test]
    fn as_is_only_a_keyword_in_imports() {
        assert_eq!(
            kinds("import a.class as c;"),
            vec![Import, Identifier, Dot, Identifier, As, Identifier, Semicolon, Eof]
        );
        assert_eq!(kinds("as"), vec![Identifier, Eof]);
        assert_eq!(kinds("class as {"), vec![Class, Identifier, LeftBrace, Eof]);
    }
    #[test]
    fn alias_blocks_are_all_identifiers() {
        assert_eq!(
            kinds("fd x { aliases { class md; removed v2; pkg import; } }"),
            vec![
                Fd, Identifier, LeftBrace, Aliases, LeftBrace,
                Identifier, Identifier, Semicolon,
                Identifier, Identifier, Semicolon,
                Identifier, Identifier, Semicolon,
                RightBrace, RightBrace, Eof
            ]
        );
    }
    #[test]
    fn braces_replace_headers_with_bodies() {
        assert_eq!(contexts_after("class A {"), vec![LexContext::Global, LexContext::ClassBody]);
        assert_eq!(
            contexts_after("class A { fd b <- c {"),
            vec![LexContext::Global, LexContext::ClassBody, LexContext::MemberBody]
        );
        assert_eq!(
            contexts_after("class A { md b() { aliases {"),
            vec![
                LexContext::Global, LexContext::ClassBody,
                LexContext::MemberBody, LexContext::AliasContext
            ]
        );
        assert_eq!(contexts_after("class A { class B { } }"), vec![LexContext::Global]);
    }
    #[test]
    fn brace_context_inferred_from_recent_tokens() {
        assert_eq!(contexts_after("class; {"), vec![LexContext::Global, LexContext::ClassBody]);
        assert_eq!(contexts_after("md; {"), vec![LexContext::Global, LexContext::MemberBody]);
        assert_eq!(contexts_after("fd; {"), vec![LexContext::Global, LexContext::MemberBody]);
        assert_eq!(contexts_after("aliases {"), vec![LexContext::Global, LexContext::AliasContext]);
        assert_eq!(contexts_after("aliases x {"), vec![LexContext::Global, LexContext::AliasContext]);
        // The window is `A ; {`, so `class` has already fallen out of it
        assert_eq!(contexts_after("class A; {"), vec![LexContext::Global, LexContext::Block]);
        assert_eq!(contexts_after("md a; {"), vec![LexContext::Global, LexContext::Block]);
    }
    #[test]
    fn closing_brace_never_pops_global() {
        assert_eq!(contexts_after("} } }"), vec![LexContext::Global]);
    }
    #[test]
    fn semicolon_closes_headers() {
        assert_eq!(contexts_after("pkg com.example;"), vec![LexContext::Global]);
        assert_eq!(contexts_after("import a.b as c;"), vec![LexContext::Global]);
        assert_eq!(
            contexts_after("class A { aliases { v1 a;"),
            vec![LexContext::Global, LexContext::ClassBody, LexContext::AliasContext]
        );
    }
    #[test]
    fn positions() {
        let tokens = tokenize("pkg a;\n\nclass B {\n\tmd c();\n}").unwrap();
        let positions: Vec<(u32, u32)> = tokens.iter()
            .map(|token| (token.line, token.column))
            .collect();
        assert_eq!(positions, vec![
            (1, 1), (1, 5), (1, 6),
            (3, 1), (3, 7), (3, 9),
            (4, 2), (4, 5), (4, 6), (4, 7), (4, 8),
            (5, 1), (5, 2)
        ]);
    }
}
