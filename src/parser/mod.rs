//! Byte- and token-level parsing: the line cursor, the tokenizer, the
//! recursive descent object parser, and the cross-reference table
//! reader. Everything here is pure over its input source; the
//! file-bound layer lives in [`crate::document`].

pub mod cursor;
pub mod lexer;
pub mod object_parser;
pub mod xref;

pub use cursor::Cursor;
pub use lexer::{Lexer, Token, TokenKind};
pub use xref::XrefTable;
