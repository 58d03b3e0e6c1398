//! Whole-file token traversal.

use crate::document::Document;
use crate::error::Result;
use crate::parser::lexer::{Lexer, Token, TokenKind};

impl Document {
    /// Lexes the file from the beginning, invoking `visit` for every
    /// token together with the byte position just past it. Lexical
    /// errors are collected and returned rather than aborting the
    /// traversal.
    ///
    /// Stream payloads are not skipped: their raw bytes run through
    /// the lexer too, so binary streams will usually contribute error
    /// entries. Useful for structural surveys of text-only documents
    /// and for debugging.
    pub fn traverse_tokens<F>(&self, mut visit: F) -> Result<Vec<String>>
    where
        F: FnMut(&Token, u64),
    {
        let mut lexer = Lexer::at(&self.file, 0)?;
        let mut errors = Vec::new();

        loop {
            let token = lexer.next_token();
            match token.kind {
                TokenKind::Eof => break,
                TokenKind::Error => {
                    errors.push(format!(
                        "lexing error at offset {}: {}",
                        lexer.position(),
                        token.text()
                    ));
                }
                _ => visit(&token, lexer.position()),
            }
        }

        Ok(errors)
    }
}
