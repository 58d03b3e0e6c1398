//! Conformance validation: the report surface and the per-run
//! accumulator the checks write into.

mod pdfa1b;

use crate::document::page_tree::PageIndex;
use crate::error::Result;
use crate::types::{PdfReference, PdfValue};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Conformance levels this crate can verify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConformanceLevel {
    Undefined,
    PdfA1b,
}

/// Outcome of a verification run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationResult {
    pub level: ConformanceLevel,
    pub valid: bool,
    pub issues: Vec<Violation>,
}

impl VerificationResult {
    /// Serializes the result for report export.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// A single conformance failure, tagged with the clause and subclause
/// of ISO 19005-1:2005 it violates. Cognate failures inside one check
/// (say, one per bad byte) aggregate into the `messages` of a single
/// violation. `page` is 0 for document-level findings; `object_ref`
/// names the enclosing indirect object when one is known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub clause: String,
    pub subclause: u32,
    pub messages: Vec<String>,
    pub page: usize,
    pub object_ref: Option<PdfReference>,
}

impl Violation {
    pub fn new(clause: &str, subclause: u32, message: impl Into<String>) -> Self {
        Violation::with_messages(clause, subclause, vec![message.into()])
    }

    pub fn with_messages(clause: &str, subclause: u32, messages: Vec<String>) -> Self {
        Violation {
            clause: clause.to_string(),
            subclause,
            messages,
            page: 0,
            object_ref: None,
        }
    }

    pub fn at_page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }

    pub fn with_ref(mut self, object_ref: Option<PdfReference>) -> Self {
        self.object_ref = object_ref;
        self
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PDF/A violation")?;
        if !self.clause.is_empty() {
            write!(f, " ({}", self.clause)?;
            if self.subclause > 0 {
                write!(f, "/{}", self.subclause)?;
            }
            write!(f, ")")?;
        }

        if self.page > 0 {
            write!(f, ", page {}", self.page)?;
        } else {
            write!(f, ", document-level")?;
        }

        if let Some(reference) = &self.object_ref {
            write!(
                f,
                ", ref {} {}",
                reference.object_number, reference.generation_number
            )?;
        }

        if !self.messages.is_empty() {
            write!(f, ": \"{}\"", self.messages.join("\"; \""))?;
        }

        Ok(())
    }
}

/// Mutable state of one verification run: the page index, the
/// currently-enclosing page, and the violations accumulated so far.
pub struct ValidationContext {
    pub page_index: PageIndex,
    pub current_page: usize,
    issues: Vec<Violation>,
}

impl ValidationContext {
    pub fn new(page_index: PageIndex) -> Self {
        ValidationContext {
            page_index,
            current_page: 0,
            issues: Vec::new(),
        }
    }

    pub fn report(&mut self, violation: Violation) {
        self.issues.push(violation);
    }

    /// Records a single-message violation attributed to the current
    /// page and, when `obj` is a dictionary tagged with `_ref`, to its
    /// indirect object.
    pub fn persist_error(
        &mut self,
        obj: &PdfValue,
        clause: &str,
        subclause: u32,
        message: impl Into<String>,
    ) {
        let violation = Violation::new(clause, subclause, message)
            .at_page(self.current_page)
            .with_ref(object_ref_of(obj));
        self.report(violation);
    }

    /// Like [`persist_error`](Self::persist_error), aggregating several
    /// underlying messages into one violation.
    pub fn persist_errors(
        &mut self,
        obj: &PdfValue,
        clause: &str,
        subclause: u32,
        messages: Vec<String>,
    ) {
        let violation = Violation::with_messages(clause, subclause, messages)
            .at_page(self.current_page)
            .with_ref(object_ref_of(obj));
        self.report(violation);
    }

    pub fn into_issues(self) -> Vec<Violation> {
        self.issues
    }
}

fn object_ref_of(obj: &PdfValue) -> Option<PdfReference> {
    obj.as_dict()
        .and_then(|dict| dict.get("_ref"))
        .and_then(PdfValue::as_reference)
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PdfDictionary, PdfName};

    #[test]
    fn display_document_level() {
        let v = Violation::new("6.1.3", 1, "trailer does not contain the required ID keyword");
        assert_eq!(
            v.to_string(),
            "PDF/A violation (6.1.3/1), document-level: \
             \"trailer does not contain the required ID keyword\""
        );
    }

    #[test]
    fn display_with_page_and_ref() {
        let v = Violation::new("6.1.7", 2, "stream object contains invalid key FFilter")
            .at_page(3)
            .with_ref(Some(PdfReference::new(12, 0)));
        assert_eq!(
            v.to_string(),
            "PDF/A violation (6.1.7/2), page 3, ref 12 0: \
             \"stream object contains invalid key FFilter\""
        );
    }

    #[test]
    fn display_joins_multiple_messages() {
        let v = Violation::with_messages("6.1.6", 1, vec!["one".into(), "two".into()]);
        assert_eq!(
            v.to_string(),
            "PDF/A violation (6.1.6/1), document-level: \"one\"; \"two\""
        );
    }

    #[test]
    fn subclause_zero_is_omitted() {
        let v = Violation::new("6.1.6", 0, "resolution failed");
        assert_eq!(
            v.to_string(),
            "PDF/A violation (6.1.6), document-level: \"resolution failed\""
        );
    }

    #[test]
    fn context_picks_up_page_and_ref() {
        let mut ctx = ValidationContext::new(PageIndex::new());
        ctx.current_page = 2;
        let mut dict = PdfDictionary::new();
        dict.insert("Type", PdfValue::Name(PdfName::new("Page")));
        dict.insert("_ref", PdfValue::Reference(PdfReference::new(7, 0)));
        ctx.persist_error(&PdfValue::Dictionary(dict), "6.1.7", 1, "bad key");

        let issues = ctx.into_issues();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].page, 2);
        assert_eq!(issues[0].object_ref, Some(PdfReference::new(7, 0)));
    }
}
