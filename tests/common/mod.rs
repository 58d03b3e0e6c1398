//! Shared fixture builder: assembles complete PDF files in memory,
//! computing xref offsets from the actual byte layout so tests never
//! depend on hand-counted positions.

use tempfile::NamedTempFile;

pub struct PdfBuilder {
    header: Vec<u8>,
    objects: Vec<(u32, String)>,
    root: Option<u32>,
    info: Option<u32>,
    id: bool,
    encrypt: bool,
    eof: bool,
    xref_subsection_header: Option<String>,
}

impl PdfBuilder {
    pub fn new() -> Self {
        PdfBuilder {
            header: b"%PDF-1.7\n%\xA0\xA1\xA2\xA3\n".to_vec(),
            objects: Vec::new(),
            root: None,
            info: None,
            id: true,
            encrypt: false,
            eof: true,
            xref_subsection_header: None,
        }
    }

    /// A catalog, a page tree, and one page. The page's Parent link
    /// closes a reference cycle, as in real files.
    pub fn minimal() -> Self {
        PdfBuilder::new()
            .object(1, "<< /Type /Catalog /Pages 2 0 R >>")
            .object(2, "<< /Type /Pages /Kids [3 0 R] /Count 1 >>")
            .object(3, "<< /Type /Page /Parent 2 0 R >>")
            .root(1)
    }

    pub fn header(mut self, header: &[u8]) -> Self {
        self.header = header.to_vec();
        self
    }

    /// Adds object `number` with the given body (the `N 0 obj` /
    /// `endobj` wrapper is added here).
    pub fn object(mut self, number: u32, body: &str) -> Self {
        self.objects.push((number, body.to_string()));
        self
    }

    pub fn root(mut self, number: u32) -> Self {
        self.root = Some(number);
        self
    }

    pub fn info(mut self, number: u32) -> Self {
        self.info = Some(number);
        self
    }

    pub fn without_id(mut self) -> Self {
        self.id = false;
        self
    }

    pub fn with_encrypt(mut self) -> Self {
        self.encrypt = true;
        self
    }

    pub fn without_eof(mut self) -> Self {
        self.eof = false;
        self
    }

    /// Replaces the generated `start count` subsection header line.
    pub fn xref_subsection_header(mut self, header: &str) -> Self {
        self.xref_subsection_header = Some(header.to_string());
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut out = self.header.clone();

        let mut offsets = Vec::new();
        for (number, body) in &self.objects {
            offsets.push((*number, out.len() as u64));
            out.extend_from_slice(format!("{} 0 obj\n", number).as_bytes());
            out.extend_from_slice(body.as_bytes());
            out.extend_from_slice(b"\nendobj\n");
        }

        let xref_offset = out.len();
        let max_object = self.objects.iter().map(|(n, _)| *n).max().unwrap_or(0);
        let subsection_header = self
            .xref_subsection_header
            .unwrap_or_else(|| format!("0 {}", max_object + 1));
        out.extend_from_slice(format!("xref\n{}\n", subsection_header).as_bytes());
        out.extend_from_slice(b"0000000000 65535 f \n");
        for number in 1..=max_object {
            match offsets.iter().find(|(n, _)| *n == number) {
                Some((_, offset)) => {
                    out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes())
                }
                None => out.extend_from_slice(b"0000000000 65535 f \n"),
            }
        }

        out.extend_from_slice(b"trailer\n<< ");
        out.extend_from_slice(format!("/Size {} ", max_object + 1).as_bytes());
        if let Some(root) = self.root {
            out.extend_from_slice(format!("/Root {} 0 R ", root).as_bytes());
        }
        if let Some(info) = self.info {
            out.extend_from_slice(format!("/Info {} 0 R ", info).as_bytes());
        }
        if self.id {
            out.extend_from_slice(b"/ID [<4142434445464748> <4142434445464748>] ");
        }
        if self.encrypt {
            out.extend_from_slice(b"/Encrypt << /Filter /Standard >> ");
        }
        out.extend_from_slice(b">>\nstartxref\n");
        out.extend_from_slice(format!("{}\n", xref_offset).as_bytes());
        if self.eof {
            out.extend_from_slice(b"%%EOF\n");
        }
        out
    }

    /// Builds the file and writes it out for `Document::open`.
    pub fn write(self) -> NamedTempFile {
        let file = NamedTempFile::new().expect("create temp file");
        std::fs::write(file.path(), self.build()).expect("write fixture");
        file
    }
}
