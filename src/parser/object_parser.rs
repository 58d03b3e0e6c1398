//! Recursive descent parser over the token stream.
//!
//! Pure over tokens: nothing here touches a file directly, so the same
//! functions parse trailer dictionaries out of a tail buffer and
//! indirect objects straight off the document handle.

use crate::error::{PdfError, Result};
use crate::parser::lexer::{Lexer, Token, TokenKind};
use crate::types::{PdfArray, PdfDictionary, PdfName, PdfReference, PdfValue};
use std::io::{Read, Seek};

const MAX_NESTING_DEPTH: usize = 100;

/// Parses a single PDF value.
///
/// An Integer token may begin an indirect reference: the next two
/// tokens are pulled, and when they are not `<int> R` both are pushed
/// back and a plain integer is produced.
pub fn parse_value<R: Read + Seek>(lexer: &mut Lexer<R>) -> Result<PdfValue> {
    parse_value_at(lexer, 0)
}

/// Parses a dictionary body. May be entered either before or after the
/// opening `<<`: a DictStart where a key is due is skipped, which also
/// tolerates the doubled-open form seen in some trailers.
pub fn parse_dictionary<R: Read + Seek>(lexer: &mut Lexer<R>) -> Result<PdfDictionary> {
    parse_dictionary_at(lexer, 0)
}

/// Parses array elements up to the closing `]`.
pub fn parse_array<R: Read + Seek>(lexer: &mut Lexer<R>) -> Result<PdfArray> {
    parse_array_at(lexer, 0)
}

fn parse_value_at<R: Read + Seek>(lexer: &mut Lexer<R>, depth: usize) -> Result<PdfValue> {
    if depth > MAX_NESTING_DEPTH {
        return Err(PdfError::Parse("object nesting too deep".into()));
    }

    let token = lexer.next_token();
    match token.kind {
        TokenKind::Integer => {
            let second = lexer.next_token();
            let third = lexer.next_token();
            if second.kind == TokenKind::Integer
                && third.kind == TokenKind::Keyword
                && third.value == b"R"
            {
                let object_number = parse_ascii(&token)?;
                let generation_number = parse_ascii(&second)?;
                return Ok(PdfValue::Reference(PdfReference::new(
                    object_number,
                    generation_number,
                )));
            }
            lexer.unread_token(third);
            lexer.unread_token(second);
            Ok(PdfValue::Integer(parse_ascii(&token)?))
        }
        TokenKind::Real => Ok(PdfValue::Real(parse_ascii(&token)?)),
        TokenKind::Boolean => Ok(PdfValue::Boolean(token.value == b"true")),
        TokenKind::String => Ok(PdfValue::String(token.value)),
        TokenKind::HexString => Ok(PdfValue::HexString(token.value)),
        TokenKind::Name => Ok(PdfValue::Name(PdfName::new(token.text()))),
        // Keywords become names, tolerating the missing slash seen in
        // some trailers.
        TokenKind::Keyword => Ok(PdfValue::Name(PdfName::new(token.text()))),
        TokenKind::DictStart => Ok(PdfValue::Dictionary(parse_dictionary_at(lexer, depth + 1)?)),
        TokenKind::ArrayStart => Ok(PdfValue::Array(parse_array_at(lexer, depth + 1)?)),
        TokenKind::Eof => Err(PdfError::Parse("unexpected end of input".into())),
        TokenKind::Error => Err(PdfError::Parse(format!("lexical error: {}", token.text()))),
        other => Err(PdfError::Parse(format!(
            "unexpected token {:?} ({})",
            other,
            token.text()
        ))),
    }
}

fn parse_dictionary_at<R: Read + Seek>(
    lexer: &mut Lexer<R>,
    depth: usize,
) -> Result<PdfDictionary> {
    if depth > MAX_NESTING_DEPTH {
        return Err(PdfError::Parse("object nesting too deep".into()));
    }

    let mut dict = PdfDictionary::new();
    loop {
        let key = lexer.next_token();
        match key.kind {
            TokenKind::DictEnd => break,
            TokenKind::Eof => {
                return Err(PdfError::Parse(
                    "unexpected end of input while parsing dictionary".into(),
                ))
            }
            TokenKind::DictStart => continue,
            TokenKind::Name => {}
            other => {
                return Err(PdfError::Parse(format!(
                    "expected dictionary key, got {:?} ({})",
                    other,
                    key.text()
                )))
            }
        }

        let value = parse_value_at(lexer, depth + 1)?;
        dict.insert(PdfName::new(key.text()), value);
    }
    Ok(dict)
}

fn parse_array_at<R: Read + Seek>(lexer: &mut Lexer<R>, depth: usize) -> Result<PdfArray> {
    if depth > MAX_NESTING_DEPTH {
        return Err(PdfError::Parse("object nesting too deep".into()));
    }

    let mut array = PdfArray::new();
    loop {
        let token = lexer.next_token();
        match token.kind {
            TokenKind::ArrayEnd => break,
            TokenKind::Eof => {
                return Err(PdfError::Parse(
                    "unexpected end of input while parsing array".into(),
                ))
            }
            _ => {
                lexer.unread_token(token);
                array.push(parse_value_at(lexer, depth + 1)?);
            }
        }
    }
    Ok(array)
}

fn parse_ascii<T: std::str::FromStr>(token: &Token) -> Result<T> {
    std::str::from_utf8(&token.value)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| PdfError::Parse(format!("invalid number: {}", token.text())))
}
