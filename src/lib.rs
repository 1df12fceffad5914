//! Compiler and versioned lookup for reguard mapping scripts.
//!
//! A mapping script records how the original names of classes, methods and fields
//! correspond to their obfuscated names, across every released version:
//!
//! ```text
//! pkg com.example;
//! import java.util.List;
//! class MyClass <- a [type="class"] {
//!     md foo(List) <- b {
//!         aliases { v1 b_v1; removed v2; }
//!     }
//!     fd bar <- c;
//! }
//! ```
//!
//! Source text goes through the [lexer], the [parser] and the [interpreter]
//! to produce a [MappingTree]. [compile] runs all three at once.
//! Trees can then be checked with [validate()](validate::validate)
//! and queried through a [MappingLookup].
extern crate indexmap;
extern crate failure;
extern crate failure_derive;
extern crate serde;
extern crate serde_derive;
extern crate itertools;
extern crate log;

use failure_derive::Fail;

pub mod token;
pub mod lexer;
pub mod ast;
pub mod parser;
pub mod interpreter;
pub mod tree;
pub mod validate;
pub mod lookup;

pub use self::token::{Token, TokenKind};
pub use self::lexer::{tokenize, LexError, LexErrorReason};
pub use self::parser::{parse, ParseError};
pub use self::interpreter::interpret;
pub use self::tree::*;
pub use self::validate::{ValidationError, ValidationErrorKind};
pub use self::lookup::{MappingIndex, MappingLookup, SourcedClass};

/// Compile mapping script source into its resolved tree
pub fn compile(source: &str) -> Result<MappingTree, CompileError> {
    let tokens = tokenize(source)?;
    let file = parse(&tokens)?;
    Ok(interpret(file))
}

#[derive(Debug, Fail)]
pub enum CompileError {
    #[fail(display = "{}", _0)]
    Lex(#[cause] LexError),
    #[fail(display = "{}", _0)]
    Parse(#[cause] ParseError)
}
impl From<LexError> for CompileError {
    #[inline]
    fn from(e: LexError) -> Self {
        CompileError::Lex(e)
    }
}
impl From<ParseError> for CompileError {
    #[inline]
    fn from(e: ParseError) -> Self {
        CompileError::Parse(e)
    }
}
