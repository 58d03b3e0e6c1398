//! The file-bound layer: opening a document, the structural snapshot
//! (header, trailer, xref), and the convenience lookups built on the
//! resolver.

mod resolver;
mod walker;

pub mod page_tree;

use crate::error::{PdfError, Result};
use crate::parser::lexer::{is_whitespace, Lexer};
use crate::parser::object_parser;
use crate::parser::xref::{self, XrefTable};
use crate::types::{PdfDictionary, PdfValue};
use indexmap::IndexMap;
use nom::bytes::complete::{tag, take_till};
use nom::character::complete::{digit1, multispace0};
use nom::combinator::map_res;
use nom::sequence::preceded;
use nom::IResult;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

const HEADER_SNAPSHOT_SIZE: usize = 8;
const TAIL_WINDOW_SIZE: u64 = 1500;
const STARTXREF_KEYWORD: &[u8] = b"startxref";
const TRAILER_KEYWORD: &[u8] = b"trailer";

/// An open PDF file.
///
/// The trailer and xref table are populated once during
/// [`open`](Document::open) and read-only afterwards; the underlying
/// handle is released when the document is dropped. A document must
/// not be shared across threads: the resolver seeks on the one file
/// handle.
pub struct Document {
    pub(crate) file: File,
    pub(crate) size: u64,
    pub(crate) header: [u8; HEADER_SNAPSHOT_SIZE],
    pub(crate) trailer: PdfDictionary,
    pub(crate) xref: XrefTable,
    pub(crate) xref_offset: u64,
}

impl Document {
    /// Opens the PDF document at `path`: snapshots the header, locates
    /// `startxref`, loads the xref table, and parses the trailer
    /// dictionary. The file layout this expects:
    ///
    /// ```text
    /// trailer
    ///     << key1 value1 … keyn valuen >>
    /// startxref
    /// byte_offset_of_last_cross-reference_section
    /// %%EOF
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Document> {
        let file = File::open(path)?;
        let size = file.metadata()?.len();

        let mut header = [0u8; HEADER_SNAPSHOT_SIZE];
        let mut handle = &file;
        handle.seek(SeekFrom::Start(0))?;
        handle.read_exact(&mut header)?;

        let mut doc = Document {
            file,
            size,
            header,
            trailer: PdfDictionary::new(),
            xref: XrefTable::new(),
            xref_offset: 0,
        };
        doc.initialize_structure()?;
        Ok(doc)
    }

    /// Locates `startxref`, parses the xref table, then the trailer
    /// dictionary, all inside the tail window of the file.
    fn initialize_structure(&mut self) -> Result<()> {
        let tail_size = self.size.min(TAIL_WINDOW_SIZE);
        let tail_offset = self.size - tail_size;
        let mut tail = vec![0u8; tail_size as usize];
        let mut handle = &self.file;
        handle.seek(SeekFrom::Start(tail_offset))?;
        handle.read_exact(&mut tail)?;

        let startxref_idx = rfind(&tail, STARTXREF_KEYWORD)
            .ok_or_else(|| PdfError::Structure("startxref not found".into()))?;
        let after_keyword = &tail[startxref_idx + STARTXREF_KEYWORD.len()..];
        let (_, xref_offset) = startxref_offset(after_keyword)
            .map_err(|_| PdfError::Structure("could not parse startxref offset".into()))?;
        self.xref_offset = xref_offset;
        log::debug!("open: cross-reference table at offset {}", xref_offset);

        handle.seek(SeekFrom::Start(xref_offset))?;
        let mut reader = BufReader::new(handle);
        self.xref = xref::parse_xref_table(&mut reader)?;
        log::debug!("open: {} in-use xref entries", self.xref.len());

        let search_block = &tail[..startxref_idx];
        let trailer_idx = rfind(search_block, TRAILER_KEYWORD)
            .ok_or_else(|| PdfError::Structure("trailer keyword not found".into()))?;

        let mut lexer = Lexer::new(std::io::Cursor::new(&search_block[trailer_idx..]));
        let keyword = lexer.next_token();
        if keyword.value != TRAILER_KEYWORD {
            return Err(PdfError::Structure("expected 'trailer' keyword".into()));
        }
        self.trailer = object_parser::parse_dictionary(&mut lexer)?;
        log::debug!("open: trailer with {} entries", self.trailer.len());

        Ok(())
    }

    /// The trailer dictionary.
    pub fn trailer(&self) -> &PdfDictionary {
        &self.trailer
    }

    /// Size of the file in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Byte offset of the cross-reference table.
    pub fn xref_offset(&self) -> u64 {
        self.xref_offset
    }

    /// Extracts the PDF version from the document header, the part of
    /// `%PDF-<version>` up to the first whitespace.
    pub fn get_version(&self) -> Result<String> {
        let (_, version) = pdf_version(&self.header)
            .map_err(|_| PdfError::Structure("invalid file format: missing %PDF header".into()))?;
        if version.is_empty() {
            return Err(PdfError::Structure("invalid PDF header: missing version".into()));
        }
        Ok(String::from_utf8_lossy(version).into_owned())
    }

    /// Flattens the string-valued entries of the Info dictionary,
    /// preserving their order of appearance.
    pub fn get_metadata(&self) -> Result<IndexMap<String, String>> {
        let value = self.resolve_graph_by_path(&["Info"])?;
        let dict = value
            .as_dict()
            .ok_or_else(|| PdfError::Structure("information object is not a dictionary".into()))?;

        let mut metadata = IndexMap::new();
        for (key, value) in dict.iter() {
            if let PdfValue::String(bytes) = value {
                metadata.insert(
                    key.without_slash().to_string(),
                    String::from_utf8_lossy(bytes).into_owned(),
                );
            }
        }
        Ok(metadata)
    }

    /// The page count from `Root.Pages.Count`, or 0 when that entry is
    /// not an integer.
    pub fn get_page_count(&self) -> Result<i64> {
        let value = self.resolve_graph_by_path(&["Root", "Pages", "Count"])?;
        Ok(value.as_integer().unwrap_or(0))
    }

    /// Reads up to `len` bytes at `offset`, tolerating short reads.
    /// The structural conformance checks work over whatever bytes are
    /// actually there.
    pub(crate) fn read_at_most(&self, offset: u64, len: usize) -> Vec<u8> {
        let mut buf = vec![0u8; len];
        let read = (|| -> std::io::Result<usize> {
            let mut handle = &self.file;
            handle.seek(SeekFrom::Start(offset))?;
            let mut total = 0;
            while total < len {
                let n = handle.read(&mut buf[total..])?;
                if n == 0 {
                    break;
                }
                total += n;
            }
            Ok(total)
        })()
        .unwrap_or(0);
        buf.truncate(read);
        buf
    }
}

fn pdf_version(input: &[u8]) -> IResult<&[u8], &[u8]> {
    preceded(tag(b"%PDF-"), take_till(is_whitespace))(input)
}

fn startxref_offset(input: &[u8]) -> IResult<&[u8], u64> {
    preceded(
        multispace0,
        map_res(digit1, |s: &[u8]| {
            std::str::from_utf8(s).unwrap().parse::<u64>()
        }),
    )(input)
}

fn rfind(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).rposition(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_extracted_from_the_header() {
        let (_, version) = pdf_version(b"%PDF-1.7\n").unwrap();
        assert_eq!(version, b"1.7");
        let (_, version) = pdf_version(b"%PDF-2.0").unwrap();
        assert_eq!(version, b"2.0");
        assert!(pdf_version(b"1.7\n%abc").is_err());
    }

    #[test]
    fn startxref_offset_skips_the_eol() {
        let (_, offset) = startxref_offset(b"\n416\n%%EOF").unwrap();
        assert_eq!(offset, 416);
        assert!(startxref_offset(b"\n%%EOF").is_err());
    }

    #[test]
    fn rfind_returns_the_last_occurrence() {
        assert_eq!(rfind(b"xx trailer xx trailer xx", b"trailer"), Some(14));
        assert_eq!(rfind(b"short", b"trailer"), None);
    }
}
