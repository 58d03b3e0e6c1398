//! pdfa-check: PDF/A-1b (ISO 19005-1:2005, Level B) conformance
//! validation for PDF documents.
//!
//! The crate opens a PDF file, parses its object layer (tokenizer,
//! recursive descent object parser, classical cross-reference table,
//! indirect-reference resolver with cycle protection), and runs the
//! ordered PDF/A-1b checks over the resolved graph. Failures come back
//! as structured, clause-tagged records with per-page attribution
//! where one is possible, never as flattened strings.
//!
//! ```no_run
//! use pdfa_check::{ConformanceLevel, Document};
//!
//! # fn main() -> pdfa_check::Result<()> {
//! let doc = Document::open("archive.pdf")?;
//! let result = doc.verify(ConformanceLevel::PdfA1b)?;
//! if !result.valid {
//!     for issue in &result.issues {
//!         println!("{}", issue);
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Out of scope: cross-reference streams, encrypted documents,
//! incremental updates, stream-content decoding, and conformance
//! levels other than A-1b.

/// Opening documents and resolving their object graphs.
pub mod document;
/// The crate-wide error type.
pub mod error;
/// Tokenizer, object parser, and cross-reference table reader.
pub mod parser;
/// Core PDF data types (values, arrays, dictionaries, references).
pub mod types;
/// Conformance checks and the structured violation report.
pub mod validation;

pub use document::page_tree::PageIndex;
pub use document::Document;
pub use error::{PdfError, Result};
pub use parser::{Lexer, Token, TokenKind};
pub use types::{PdfArray, PdfDictionary, PdfName, PdfReference, PdfValue};
pub use validation::{ConformanceLevel, ValidationContext, VerificationResult, Violation};
