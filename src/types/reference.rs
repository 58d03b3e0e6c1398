use serde::{Deserialize, Serialize};
use std::fmt;

/// An indirect object reference, the `N G R` form of the PDF grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PdfReference {
    pub object_number: u32,
    pub generation_number: u16,
}

impl PdfReference {
    pub fn new(object_number: u32, generation_number: u16) -> Self {
        PdfReference {
            object_number,
            generation_number,
        }
    }
}

impl fmt::Display for PdfReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} R", self.object_number, self.generation_number)
    }
}

impl From<(u32, u16)> for PdfReference {
    fn from((object_number, generation_number): (u32, u16)) -> Self {
        PdfReference::new(object_number, generation_number)
    }
}
