//! Indirect-reference resolution.
//!
//! Two resolvers with different guarantees:
//!
//! - [`Document::resolve_graph`] materializes the whole reachable
//!   graph with cycle protection: a placeholder is cached under the
//!   object number before recursing, so a reference seen again during
//!   its own resolution gets the cached value back.
//! - `resolve_object` (used by the path walker) resolves one layer of
//!   references per pass and carries no cycle state; each walker step
//!   re-resolves, which peels references level by level.
//!
//! Every dictionary materialized from a reference is tagged with a
//! synthetic `_ref` entry holding the original reference, so
//! downstream consumers can attribute findings to a specific indirect
//! object and so structural equality can stand in for identity.

use crate::document::Document;
use crate::error::{PdfError, Result};
use crate::parser::lexer::{Lexer, TokenKind};
use crate::parser::object_parser;
use crate::types::{PdfArray, PdfDictionary, PdfReference, PdfValue};
use std::collections::HashMap;
use std::fs::File;

impl Document {
    /// Resolves the full object graph, starting from the trailer.
    pub fn resolve_graph(&self) -> Result<PdfValue> {
        let mut visited = HashMap::new();
        self.resolve_all(&PdfValue::Dictionary(self.trailer.clone()), &mut visited)
    }

    /// Walks the object graph by path, starting from the trailer.
    /// Each segment names a dictionary key, or a decimal index when
    /// the node at hand is an array.
    pub fn resolve_graph_by_path(&self, path: &[&str]) -> Result<PdfValue> {
        if path.is_empty() {
            return Err(PdfError::EmptyPath);
        }
        self.resolve_path(PdfValue::Dictionary(self.trailer.clone()), path)
    }

    fn resolve_path(&self, node: PdfValue, path: &[&str]) -> Result<PdfValue> {
        let mut current = self.resolve_object(&node)?;

        for &segment in path {
            let resolved = self.resolve_object(&current)?;
            match resolved {
                PdfValue::Array(array) => {
                    let index: i64 = match segment.parse() {
                        Ok(i) => i,
                        Err(_) => return Ok(PdfValue::Array(array)),
                    };
                    if index < 0 || index as usize >= array.len() {
                        return Err(PdfError::Structure(format!(
                            "array index out of range: {}",
                            index
                        )));
                    }
                    current = array[index as usize].clone();
                }
                PdfValue::Dictionary(dict) => match dict.get(segment) {
                    Some(value) => current = value.clone(),
                    None => {
                        return Err(PdfError::Structure(format!(
                            "key \"{}\" not found in dictionary",
                            segment
                        )))
                    }
                },
                other => return Ok(other),
            }
        }

        self.resolve_object(&current)
    }

    /// Resolves nested references, dictionaries, and arrays one
    /// reference-layer deep. No cycle protection; the full-graph
    /// resolver is the entry point for untrusted reachability.
    pub(crate) fn resolve_object(&self, obj: &PdfValue) -> Result<PdfValue> {
        match obj {
            PdfValue::Reference(reference) => self.resolve_reference(*reference),
            PdfValue::Dictionary(dict) => {
                let mut out = PdfDictionary::new();
                for (key, value) in dict.iter() {
                    out.insert(key.clone(), self.resolve_object(value)?);
                }
                Ok(PdfValue::Dictionary(out))
            }
            PdfValue::Array(array) => {
                let mut out = PdfArray::with_capacity(array.len());
                for element in array.iter() {
                    out.push(self.resolve_object(element)?);
                }
                Ok(PdfValue::Array(out))
            }
            other => Ok(other.clone()),
        }
    }

    fn resolve_all(
        &self,
        obj: &PdfValue,
        visited: &mut HashMap<u32, PdfValue>,
    ) -> Result<PdfValue> {
        match obj {
            PdfValue::Reference(reference) => {
                let id = reference.object_number;
                if let Some(cached) = visited.get(&id) {
                    return Ok(cached.clone());
                }

                let indirect = self.resolve_reference(*reference)?;

                // Cache before the recursive resolution so cycles get
                // the placeholder back instead of recursing forever.
                visited.insert(id, indirect.clone());
                let resolved = self.resolve_all(&indirect, visited)?;
                visited.insert(id, resolved.clone());
                Ok(resolved)
            }
            PdfValue::Dictionary(dict) => {
                let mut out = PdfDictionary::new();
                for (key, value) in dict.iter() {
                    out.insert(key.clone(), self.resolve_all(value, visited)?);
                }
                Ok(PdfValue::Dictionary(out))
            }
            PdfValue::Stream(dict) => {
                let mut out = PdfDictionary::new();
                for (key, value) in dict.iter() {
                    out.insert(key.clone(), self.resolve_all(value, visited)?);
                }
                Ok(PdfValue::Stream(out))
            }
            PdfValue::Array(array) => {
                let mut out = PdfArray::with_capacity(array.len());
                for element in array.iter() {
                    out.push(self.resolve_all(element, visited)?);
                }
                Ok(PdfValue::Array(out))
            }
            other => Ok(other.clone()),
        }
    }

    /// Looks up a reference in the xref table and parses the indirect
    /// object at its offset.
    pub(crate) fn resolve_reference(&self, reference: PdfReference) -> Result<PdfValue> {
        let offset = self
            .xref
            .offset_of(reference.object_number)
            .ok_or(PdfError::MissingObject(reference.object_number))?;

        let mut lexer = Lexer::at(&self.file, offset)?;

        // Expect "<num> <num> obj".
        let first = lexer.next_token();
        let _generation = lexer.next_token();
        let keyword = lexer.next_token();
        if first.kind != TokenKind::Integer || keyword.value != b"obj" {
            return Err(PdfError::Parse(format!(
                "invalid object header for {} {}",
                reference.object_number, reference.generation_number
            )));
        }

        let token = lexer.next_token();
        match token.kind {
            TokenKind::DictStart => {
                let mut dict = object_parser::parse_dictionary(&mut lexer)?;
                dict.insert("_ref", PdfValue::Reference(reference));

                let next = lexer.next_token();
                match next.kind {
                    TokenKind::StreamStart => {
                        self.skip_stream_payload(&mut lexer, &dict)?;
                        Ok(PdfValue::Stream(dict))
                    }
                    TokenKind::ObjectEnd => Ok(PdfValue::Dictionary(dict)),
                    _ => {
                        lexer.unread_token(next);
                        Ok(PdfValue::Dictionary(dict))
                    }
                }
            }
            TokenKind::ArrayStart => Ok(PdfValue::Array(object_parser::parse_array(&mut lexer)?)),
            _ => Ok(PdfValue::String(token.value)),
        }
    }

    /// Steps over a `stream … endstream` payload. The dictionary's
    /// `Length` governs exactly how many bytes follow the EOL after
    /// the `stream` keyword; resolving `Length` may move the shared
    /// file handle, so the lexer is repositioned afterwards.
    fn skip_stream_payload(&self, lexer: &mut Lexer<&File>, dict: &PdfDictionary) -> Result<()> {
        lexer.skip_eol();

        let length_value = dict
            .get("Length")
            .ok_or_else(|| PdfError::Parse("stream missing Length".into()))?;
        let length_value = self.resolve_object(length_value)?;
        let length = match &length_value {
            PdfValue::Integer(n) => *n,
            // An indirect Length can materialize as a string-wrapped
            // primitive; parse it.
            PdfValue::String(bytes) => std::str::from_utf8(bytes)
                .ok()
                .and_then(|s| s.trim().parse().ok())
                .ok_or_else(|| {
                    PdfError::Parse("could not parse stream Length as integer".into())
                })?,
            _ => return Err(PdfError::Parse("could not parse stream Length".into())),
        };
        if length < 0 {
            return Err(PdfError::Parse(format!("negative stream Length: {}", length)));
        }

        let payload_start = lexer.position();
        lexer.seek_to(payload_start + length as u64)?;

        let token = lexer.next_token();
        if token.kind != TokenKind::StreamEnd {
            return Err(PdfError::Parse(format!(
                "expected endstream, got: {}",
                token.text()
            )));
        }
        Ok(())
    }
}
