//! The PDF/A-1b (ISO 19005-1:2005, Level B) checks.
//!
//! Checks run in a fixed order and accumulate violations; an
//! individual finding never aborts the run. The one short-circuit:
//! when the object graph itself cannot be resolved, the run collapses
//! into a single 6.1.6 violation, since every graph-wide check would
//! be meaningless.

use crate::document::page_tree;
use crate::document::Document;
use crate::error::{PdfError, Result};
use crate::parser::cursor::Cursor;
use crate::parser::lexer::is_whitespace;
use crate::types::{PdfDictionary, PdfValue};
use crate::validation::{ConformanceLevel, ValidationContext, VerificationResult, Violation};
use std::collections::HashSet;

/// Window read for the raw-byte structure checks (header, xref).
const STRUCT_CHECK_WINDOW: usize = 128;
/// How far back from end-of-file the `%%EOF` marker may sit.
const EOF_SCAN_WINDOW: u64 = 10;

const ALLOWED_INFO_KEYS: [&str; 9] = [
    "Title",
    "Author",
    "Subject",
    "Keywords",
    "Creator",
    "Producer",
    "CreationDate",
    "ModDate",
    "Trapped",
];

const FORBIDDEN_STREAM_KEYS: [(&str, u32); 3] = [("F", 1), ("FFilter", 2), ("FDecodeParams", 3)];

impl Document {
    /// Verifies the document against a conformance level. The result
    /// is valid exactly when no violations accumulated.
    pub fn verify(&self, level: ConformanceLevel) -> Result<VerificationResult> {
        match level {
            ConformanceLevel::Undefined => Err(PdfError::UndefinedLevel),
            ConformanceLevel::PdfA1b => {
                log::debug!("verify: running PDF/A-1b checks");
                let issues = self.verify_pdfa1b();
                Ok(VerificationResult {
                    level,
                    valid: issues.is_empty(),
                    issues,
                })
            }
        }
    }

    fn verify_pdfa1b(&self) -> Vec<Violation> {
        let mut issues = Vec::new();
        issues.extend(self.verify_file_header());
        issues.extend(self.verify_file_trailer());
        issues.extend(self.verify_cross_reference_table());
        issues.extend(self.verify_document_information());

        let graph = match self.resolve_graph() {
            Ok(graph) => graph,
            Err(err) => return vec![Violation::new("6.1.6", 0, err.to_string())],
        };
        let page_index = page_tree::build_page_index(&graph);

        let mut ctx = ValidationContext::new(page_index);
        verify_document_graph(&graph, &mut ctx);
        issues.extend(ctx.into_issues());

        issues.extend(self.verify_optional_content());
        issues.extend(self.verify_output_intent());
        issues
    }

    /// 6.1.2 File header: a `%`-led first line, followed by a comment
    /// line of at least four bytes, all of them above 127.
    fn verify_file_header(&self) -> Vec<Violation> {
        let buf = self.read_at_most(0, STRUCT_CHECK_WINDOW);
        let mut cursor = Cursor::new(&buf);
        let mut issues = Vec::new();

        let header = cursor.read_line().unwrap_or_default();
        if header.is_empty() || header[0] != b'%' {
            issues.push(
                Violation::new(
                    "6.1.2",
                    1,
                    format!("invalid PDF header: {}", String::from_utf8_lossy(header)),
                )
                .at_page(1),
            );
        }

        let comment = cursor.read_line().unwrap_or_default();
        if comment.is_empty() || comment[0] != b'%' {
            issues.push(
                Violation::new(
                    "6.1.2",
                    2,
                    format!(
                        "header must be followed by a comment, but was: {}",
                        String::from_utf8_lossy(comment)
                    ),
                )
                .at_page(1),
            );
            return issues;
        }

        if comment.len() < 5 {
            issues.push(
                Violation::new(
                    "6.1.2",
                    3,
                    format!(
                        "comment line must consist of at least 5 characters, but was: {}",
                        comment.len()
                    ),
                )
                .at_page(1),
            );
        }

        let mut binary_errors = Vec::new();
        for &byte in &comment[1..] {
            if byte <= 127 {
                binary_errors.push(format!(
                    "byte value in comment line must be > 127 but was {}",
                    byte
                ));
            }
        }
        if !binary_errors.is_empty() {
            issues.push(Violation::with_messages("6.1.2", 4, binary_errors).at_page(1));
        }

        issues
    }

    /// 6.1.3 File trailer: the ID entry is required, Encrypt is
    /// forbidden, and nothing but a single EOL may follow `%%EOF`.
    fn verify_file_trailer(&self) -> Vec<Violation> {
        let mut issues = Vec::new();

        if self.trailer.get("ID").is_none() {
            issues.push(Violation::new(
                "6.1.3",
                1,
                "trailer does not contain the required ID keyword",
            ));
        }

        if self.trailer.get("Encrypt").is_some() {
            issues.push(Violation::new(
                "6.1.3",
                2,
                "trailer contains the forbidden Encrypt keyword",
            ));
        }

        let window = self.size.min(EOF_SCAN_WINDOW);
        let tail = self.read_at_most(self.size - window, window as usize);
        let found = (0..tail.len()).any(|i| tail[i..].starts_with(b"%%EOF"));
        if !found {
            issues.push(Violation::new(
                "6.1.3",
                3,
                format!("no EOF marker found: {}", String::from_utf8_lossy(&tail)),
            ));
        }

        issues
    }

    /// 6.1.4 Cross-reference table: a lone `xref` line followed by a
    /// two-field subsection header.
    fn verify_cross_reference_table(&self) -> Vec<Violation> {
        let buf = self.read_at_most(self.xref_offset, STRUCT_CHECK_WINDOW);
        let mut cursor = Cursor::new(&buf);
        let mut issues = Vec::new();

        if cursor.read_line() != Some(b"xref".as_slice()) {
            issues.push(Violation::new("6.1.4", 1, "expected 'xref' keyword"));
        }

        let header = match cursor.read_line() {
            Some(line) if !line.is_empty() => line,
            _ => {
                issues.push(Violation::new(
                    "6.1.4",
                    2,
                    "expected cross reference subsection header after xref keyword",
                ));
                return issues;
            }
        };

        let fields = header
            .split(|byte| is_whitespace(*byte))
            .filter(|field| !field.is_empty())
            .count();
        if fields != 2 {
            issues.push(Violation::new(
                "6.1.4",
                3,
                "cross reference subsection header should consist of two parts",
            ));
        }

        issues
    }

    /// 6.1.5 Document information dictionary: only the standard keys,
    /// none of them empty.
    fn verify_document_information(&self) -> Vec<Violation> {
        if self.trailer.get("Info").is_none() {
            return Vec::new();
        }

        let metadata = match self.get_metadata() {
            Ok(metadata) => metadata,
            Err(err) => {
                return vec![Violation::new(
                    "6.1.5",
                    1,
                    format!("failed to read document information dictionary: {}", err),
                )]
            }
        };

        let mut disallowed = Vec::new();
        let mut empty = Vec::new();
        for (key, value) in &metadata {
            if !ALLOWED_INFO_KEYS.contains(&key.as_str()) {
                disallowed.push(format!("disallowed key {} in information dictionary", key));
            }
            if value.is_empty() {
                empty.push(format!(
                    "empty value for key {} in information dictionary",
                    key
                ));
            }
        }

        let mut issues = Vec::new();
        if !disallowed.is_empty() {
            issues.push(Violation::with_messages("6.1.5", 2, disallowed));
        }
        if !empty.is_empty() {
            issues.push(Violation::with_messages("6.1.5", 3, empty));
        }
        issues
    }

    /// 6.1.13 Optional content: OCProperties must not appear in the
    /// document catalog.
    fn verify_optional_content(&self) -> Vec<Violation> {
        if self.resolve_graph_by_path(&["Root", "OCProperties"]).is_ok() {
            return vec![Violation::new(
                "6.1.13",
                1,
                "OCProperties not allowed in document catalog",
            )];
        }
        Vec::new()
    }

    /// 6.2.2 Output intent: every entry must be a PDF/A-1 output
    /// intent, and all entries carrying a DestOutputProfile must share
    /// the same profile object, a stream with 1, 3, or 4 colour
    /// components.
    fn verify_output_intent(&self) -> Vec<Violation> {
        let values = match self.resolve_graph_by_path(&["Root", "OutputIntents"]) {
            Ok(values) => values,
            // OutputIntents are optional.
            Err(_) => return Vec::new(),
        };

        let intents = match values {
            PdfValue::Array(intents) => intents,
            _ => {
                return vec![Violation::new(
                    "6.2.2",
                    1,
                    "OutputIntents object is not an array",
                )]
            }
        };

        let mut issues = Vec::new();
        let mut shared_profile: Option<PdfValue> = None;

        for value in intents.iter() {
            let intent = match value.as_dict() {
                Some(intent) => intent,
                None => {
                    issues.push(Violation::new(
                        "6.2.2",
                        2,
                        "expected OutputIntent entry to be a dictionary",
                    ));
                    continue;
                }
            };

            let subtype = match intent.get("S").and_then(PdfValue::as_name) {
                Some(subtype) => subtype,
                None => {
                    issues.push(Violation::new("6.2.2", 3, "expected S to be a name"));
                    continue;
                }
            };

            if subtype.without_slash() != "GTS_PDFA1" {
                issues.push(Violation::new(
                    "6.2.2",
                    4,
                    format!("expected S to be GTS_PDFA1, but was {}", subtype),
                ));
            }

            if intent.get("OutputConditionIdentifier").is_none() {
                issues.push(Violation::new(
                    "6.2.2",
                    5,
                    "OutputConditionIdentifier is required but was missing",
                ));
                continue;
            }

            let profile = match intent.get("DestOutputProfile") {
                Some(profile) => profile,
                // DestOutputProfile is optional on any one entry.
                None => continue,
            };

            // All entries that carry a DestOutputProfile shall carry
            // the same indirect object. With `_ref` tags in place,
            // structural equality is identity.
            match &shared_profile {
                None => shared_profile = Some(profile.clone()),
                Some(first) => {
                    if first != profile {
                        issues.push(Violation::new(
                            "6.2.2",
                            6,
                            format!(
                                "expected DestOutputProfile to be {} but was {}",
                                first, profile
                            ),
                        ));
                        continue;
                    }
                }
            }

            let resolved = match self.resolve_object(profile) {
                Ok(resolved) => resolved,
                Err(err) => {
                    issues.push(Violation::new(
                        "6.2.2",
                        7,
                        format!("unable to resolve DestOutputProfile: {}", err),
                    ));
                    continue;
                }
            };

            let profile_dict = match resolved.as_stream_dict() {
                Some(dict) => dict,
                None => {
                    issues.push(Violation::new(
                        "6.2.2",
                        8,
                        "DestOutputProfile is not a stream object",
                    ));
                    continue;
                }
            };

            let components = match profile_dict.get("N").and_then(PdfValue::as_integer) {
                Some(components) => components,
                None => {
                    issues.push(Violation::new(
                        "6.2.2",
                        9,
                        "could not retrieve number of colour components N",
                    ));
                    continue;
                }
            };

            if ![1, 3, 4].contains(&components) {
                issues.push(Violation::new(
                    "6.2.2",
                    10,
                    format!(
                        "number of colour components N must be 1, 3, or 4, but was {}",
                        components
                    ),
                ));
            }
        }

        issues
    }
}

/// 6.1.6 / 6.1.7: walks the resolved graph once, keyed on the `_ref`
/// object numbers so a dictionary shared between several parents is
/// reported once. Page context follows the `Type = Page` dictionaries
/// encountered along the way.
fn verify_document_graph(graph: &PdfValue, ctx: &mut ValidationContext) {
    let mut visited = HashSet::new();
    walk(graph, ctx, &mut visited);
}

fn walk(node: &PdfValue, ctx: &mut ValidationContext, visited: &mut HashSet<u32>) {
    match node {
        PdfValue::Dictionary(dict) => {
            if let Some(PdfValue::Reference(reference)) = dict.get("_ref") {
                if !visited.insert(reference.object_number) {
                    return;
                }
            }

            if dict.get_type().map(|name| name.without_slash()) == Some("Page") {
                if let Some(PdfValue::Reference(reference)) = dict.get("_ref") {
                    ctx.current_page = ctx
                        .page_index
                        .get(&reference.object_number)
                        .copied()
                        .unwrap_or(0);
                }
            }

            check_forbidden_stream_keys(node, dict, ctx);

            for (_, value) in dict.iter() {
                walk(value, ctx, visited);
            }
        }
        PdfValue::Array(array) => {
            for element in array.iter() {
                walk(element, ctx, visited);
            }
        }
        PdfValue::HexString(raw) => check_hex_string(node, raw, ctx),
        _ => {}
    }
}

/// 6.1.7: the F, FFilter, and FDecodeParams keys are forbidden.
fn check_forbidden_stream_keys(obj: &PdfValue, dict: &PdfDictionary, ctx: &mut ValidationContext) {
    for (key, subclause) in FORBIDDEN_STREAM_KEYS {
        if dict.get(key).is_some() {
            ctx.persist_error(
                obj,
                "6.1.7",
                subclause,
                format!("stream object contains invalid key {}", key),
            );
        }
    }
}

/// 6.1.6: hexadecimal strings hold an even number of non-whitespace
/// characters, each a hex digit. Every non-whitespace character counts
/// toward the parity check, valid or not.
fn check_hex_string(obj: &PdfValue, raw: &[u8], ctx: &mut ValidationContext) {
    let mut count = 0usize;
    let mut bad = Vec::new();

    for &ch in raw {
        if is_whitespace(ch) {
            continue;
        }
        if !ch.is_ascii_hexdigit() {
            bad.push(format!("contains non-hex character: '{}'", ch as char));
        }
        count += 1;
    }

    if !bad.is_empty() {
        ctx.persist_errors(obj, "6.1.6", 1, bad);
    }
    if count % 2 != 0 {
        ctx.persist_error(
            obj,
            "6.1.6",
            2,
            format!("contains an odd number of hex characters ({})", count),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::page_tree::PageIndex;
    use crate::parser::xref::XrefTable;
    use crate::types::{PdfArray, PdfName, PdfReference};
    use std::io::Write;

    fn run_walk(graph: &PdfValue) -> Vec<Violation> {
        let mut ctx = ValidationContext::new(PageIndex::new());
        verify_document_graph(graph, &mut ctx);
        ctx.into_issues()
    }

    fn run_walk_with_pages(graph: &PdfValue, page_index: PageIndex) -> Vec<Violation> {
        let mut ctx = ValidationContext::new(page_index);
        verify_document_graph(graph, &mut ctx);
        ctx.into_issues()
    }

    fn dict_with(entries: Vec<(&str, PdfValue)>) -> PdfValue {
        let mut dict = PdfDictionary::new();
        for (key, value) in entries {
            dict.insert(key, value);
        }
        PdfValue::Dictionary(dict)
    }

    #[test]
    fn odd_hex_string_reports_parity_only() {
        let graph = dict_with(vec![("ID", PdfValue::HexString(b"AAA".to_vec()))]);
        let issues = run_walk(&graph);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].clause, "6.1.6");
        assert_eq!(issues[0].subclause, 2);
    }

    #[test]
    fn invalid_hex_characters_aggregate_into_one_violation() {
        let graph = dict_with(vec![("ID", PdfValue::HexString(b"XXXX".to_vec()))]);
        let issues = run_walk(&graph);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].clause, "6.1.6");
        assert_eq!(issues[0].subclause, 1);
        assert_eq!(issues[0].messages.len(), 4);
    }

    #[test]
    fn whitespace_in_hex_strings_is_ignored() {
        let graph = dict_with(vec![("ID", PdfValue::HexString(b"AA BB".to_vec()))]);
        assert!(run_walk(&graph).is_empty());
    }

    #[test]
    fn forbidden_keys_report_their_subclauses() {
        let graph = dict_with(vec![
            ("F", PdfValue::Integer(1)),
            ("FFilter", PdfValue::Name(PdfName::new("FlateDecode"))),
            ("FDecodeParams", PdfValue::Integer(0)),
        ]);
        let issues = run_walk(&graph);
        let subs: Vec<(String, u32)> = issues
            .iter()
            .map(|v| (v.clause.clone(), v.subclause))
            .collect();
        assert_eq!(
            subs,
            vec![
                ("6.1.7".to_string(), 1),
                ("6.1.7".to_string(), 2),
                ("6.1.7".to_string(), 3),
            ]
        );
    }

    #[test]
    fn findings_inside_a_page_carry_its_ordinal_and_ref() {
        let mut page_index = PageIndex::new();
        page_index.insert(9, 2);

        let page = dict_with(vec![
            ("Type", PdfValue::Name(PdfName::new("Page"))),
            ("_ref", PdfValue::Reference(PdfReference::new(9, 0))),
            ("Bad", PdfValue::HexString(b"ABC".to_vec())),
        ]);
        let graph = dict_with(vec![("Kids", PdfValue::Array(PdfArray::from(vec![page])))]);

        let issues = run_walk_with_pages(&graph, page_index);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].page, 2);
        // Hex strings are not dictionaries, so no ref is attached.
        assert_eq!(issues[0].object_ref, None);
    }

    #[test]
    fn forbidden_key_on_a_page_names_the_indirect_object() {
        let mut page_index = PageIndex::new();
        page_index.insert(4, 1);

        let page = dict_with(vec![
            ("Type", PdfValue::Name(PdfName::new("Page"))),
            ("_ref", PdfValue::Reference(PdfReference::new(4, 0))),
            ("F", PdfValue::Integer(1)),
        ]);
        let graph = dict_with(vec![("Kids", PdfValue::Array(PdfArray::from(vec![page])))]);

        let issues = run_walk_with_pages(&graph, page_index);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].page, 1);
        assert_eq!(issues[0].object_ref, Some(PdfReference::new(4, 0)));
    }

    #[test]
    fn shared_dictionaries_are_reported_once() {
        let shared = dict_with(vec![
            ("_ref", PdfValue::Reference(PdfReference::new(5, 0))),
            ("F", PdfValue::Integer(1)),
        ]);
        let graph = dict_with(vec![
            ("A", shared.clone()),
            ("B", shared),
        ]);
        let issues = run_walk(&graph);
        assert_eq!(issues.len(), 1);
    }

    #[test]
    fn stream_dictionaries_are_not_walked() {
        let mut stream = PdfDictionary::new();
        stream.insert("F", PdfValue::Integer(1));
        let graph = dict_with(vec![("S", PdfValue::Stream(stream))]);
        assert!(run_walk(&graph).is_empty());
    }

    // File-level checks over partially constructed documents, so the
    // byte layouts stay literal.

    fn doc_over(content: &[u8], trailer: PdfDictionary) -> Document {
        let mut file = tempfile::tempfile().expect("create temp file");
        file.write_all(content).expect("write fixture");
        file.flush().expect("flush fixture");
        Document {
            size: content.len() as u64,
            file,
            header: [0; 8],
            trailer,
            xref: XrefTable::new(),
            xref_offset: 0,
        }
    }

    fn clause_pairs(issues: &[Violation]) -> Vec<(String, u32)> {
        issues
            .iter()
            .map(|v| (v.clause.clone(), v.subclause))
            .collect()
    }

    #[test]
    fn valid_header_produces_no_findings() {
        let doc = doc_over(b"%PDF-1.7\n%\xA0\xA1\xA2\xA3\n", PdfDictionary::new());
        assert!(doc.verify_file_header().is_empty());
    }

    #[test]
    fn header_without_percent_is_subclause_1() {
        let doc = doc_over(b"1.7\n%\xA0\xA1\xA2\xA3\n", PdfDictionary::new());
        let issues = doc.verify_file_header();
        assert_eq!(clause_pairs(&issues), [("6.1.2".to_string(), 1)]);
        assert_eq!(issues[0].page, 1);
    }

    #[test]
    fn short_comment_is_subclause_3() {
        let doc = doc_over(b"%PDF-1.7\n%\xA0\xA1\xA2\n", PdfDictionary::new());
        let issues = doc.verify_file_header();
        assert_eq!(clause_pairs(&issues), [("6.1.2".to_string(), 3)]);
    }

    #[test]
    fn ascii_comment_aggregates_one_message_per_byte() {
        let doc = doc_over(b"%PDF-1.7\n%CommentWithoutBinary\n", PdfDictionary::new());
        let issues = doc.verify_file_header();
        assert_eq!(clause_pairs(&issues), [("6.1.2".to_string(), 4)]);
        assert_eq!(issues[0].messages.len(), "CommentWithoutBinary".len());
    }

    #[test]
    fn empty_trailer_is_missing_its_id() {
        let doc = doc_over(b"%%EOF", PdfDictionary::new());
        let issues = doc.verify_file_trailer();
        assert_eq!(clause_pairs(&issues), [("6.1.3".to_string(), 1)]);
    }

    #[test]
    fn encrypt_in_the_trailer_is_subclause_2() {
        let mut trailer = PdfDictionary::new();
        trailer.insert("ID", PdfValue::Array(PdfArray::new()));
        trailer.insert("Encrypt", PdfValue::Dictionary(PdfDictionary::new()));
        let doc = doc_over(b"%%EOF\n", trailer);
        let issues = doc.verify_file_trailer();
        assert_eq!(clause_pairs(&issues), [("6.1.3".to_string(), 2)]);
    }

    #[test]
    fn missing_eof_marker_is_subclause_3() {
        let mut trailer = PdfDictionary::new();
        trailer.insert("ID", PdfValue::Array(PdfArray::new()));
        let doc = doc_over(b"no marker here", trailer);
        let issues = doc.verify_file_trailer();
        assert_eq!(clause_pairs(&issues), [("6.1.3".to_string(), 3)]);
    }

    #[test]
    fn well_formed_xref_section_passes() {
        let doc = doc_over(b"xref\n0 3\n", PdfDictionary::new());
        assert!(doc.verify_cross_reference_table().is_empty());
    }

    #[test]
    fn wrong_xref_keyword_is_subclause_1() {
        let doc = doc_over(b"0 3\n0000000000 65535 f \n", PdfDictionary::new());
        let issues = doc.verify_cross_reference_table();
        assert_eq!(clause_pairs(&issues)[0], ("6.1.4".to_string(), 1));
    }

    #[test]
    fn missing_subsection_header_is_subclause_2() {
        let doc = doc_over(b"xref\n", PdfDictionary::new());
        let issues = doc.verify_cross_reference_table();
        assert_eq!(clause_pairs(&issues), [("6.1.4".to_string(), 2)]);
    }

    #[test]
    fn three_field_subsection_header_is_subclause_3() {
        let doc = doc_over(b"xref\n0 3 1\n", PdfDictionary::new());
        let issues = doc.verify_cross_reference_table();
        assert_eq!(clause_pairs(&issues), [("6.1.4".to_string(), 3)]);
    }
}
