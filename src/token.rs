use std::fmt::{self, Display, Formatter};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum TokenKind {
    // Literals
    Identifier,
    String,
    Number,
    // Keywords
    Pkg,
    Import,
    Class,
    Md,
    Fd,
    Aliases,
    As,
    Removed,
    // Punctuation
    LeftBrace,
    RightBrace,
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    Semicolon,
    Comma,
    Equals,
    Dot,
    LeftArrow,
    Varargs,
    // Trivia the parser still needs to see
    Comment,
    Javadoc,
    Eof
}
impl TokenKind {
    pub fn keyword(word: &str) -> Option<TokenKind> {
        Some(match word {
            "pkg" => TokenKind::Pkg,
            "import" => TokenKind::Import,
            "class" => TokenKind::Class,
            "md" => TokenKind::Md,
            "fd" => TokenKind::Fd,
            "aliases" => TokenKind::Aliases,
            "as" => TokenKind::As,
            "removed" => TokenKind::Removed,
            _ => return None
        })
    }
    #[inline]
    pub fn is_keyword(self) -> bool {
        match self {
            TokenKind::Pkg | TokenKind::Import | TokenKind::Class |
            TokenKind::Md | TokenKind::Fd | TokenKind::Aliases |
            TokenKind::As | TokenKind::Removed => true,
            _ => false
        }
    }
    #[inline]
    pub fn is_comment(self) -> bool {
        match self {
            TokenKind::Comment | TokenKind::Javadoc => true,
            _ => false
        }
    }
    fn id(self) -> &'static str {
        match self {
            TokenKind::Identifier => "identifier",
            TokenKind::String => "string",
            TokenKind::Number => "number",
            TokenKind::Pkg => "'pkg'",
            TokenKind::Import => "'import'",
            TokenKind::Class => "'class'",
            TokenKind::Md => "'md'",
            TokenKind::Fd => "'fd'",
            TokenKind::Aliases => "'aliases'",
            TokenKind::As => "'as'",
            TokenKind::Removed => "'removed'",
            TokenKind::LeftBrace => "'{'",
            TokenKind::RightBrace => "'}'",
            TokenKind::LeftParen => "'('",
            TokenKind::RightParen => "')'",
            TokenKind::LeftBracket => "'['",
            TokenKind::RightBracket => "']'",
            TokenKind::Semicolon => "';'",
            TokenKind::Comma => "','",
            TokenKind::Equals => "'='",
            TokenKind::Dot => "'.'",
            TokenKind::LeftArrow => "'<-'",
            TokenKind::Varargs => "'...'",
            TokenKind::Comment => "comment",
            TokenKind::Javadoc => "javadoc",
            TokenKind::Eof => "end of input",
        }
    }
}
impl Display for TokenKind {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// A single lexeme, positioned where it starts in the source (1-based).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub line: u32,
    pub column: u32
}
impl Token {
    #[inline]
    pub fn new<S: Into<String>>(kind: TokenKind, lexeme: S, line: u32, column: u32) -> Token {
        Token { kind, lexeme: lexeme.into(), line, column }
    }
    /// Describe this token for diagnostics
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Eof => "end of input".into(),
            TokenKind::Comment | TokenKind::Javadoc => format!("{}", self.kind),
            TokenKind::String => format!("\"{}\"", self.lexeme),
            _ => format!("'{}'", self.lexeme)
        }
    }
}
