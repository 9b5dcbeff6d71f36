//! Lexer and parser for the toy language.
//!
//! Turns source text into a [`Tokens`] stream (`lexer`), then into a flat
//! post-order [`tree::ParseTree`] (`parser`). Both passes run on an explicit
//! work stack rather than host-language recursion, so parsing a pathological
//! input never overflows the call stack.

pub mod error;
pub mod lexer;
pub mod print;
pub mod token;
pub mod tree;

mod parser;

pub use error::ParseError;
pub use lexer::lex_source;
pub use parser::parse;
pub use token::{Token, TokenKind, Tokens};
pub use tree::{ParseNode, ParseNodeKind, ParseTree};
