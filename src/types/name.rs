use serde::{Deserialize, Serialize};
use std::fmt;

/// A PDF name object, stored in its slash-prefixed form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PdfName(String);

impl PdfName {
    pub fn new<S: Into<String>>(name: S) -> Self {
        let mut name = name.into();
        if !name.starts_with('/') {
            name = format!("/{}", name);
        }
        PdfName(name)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn without_slash(&self) -> &str {
        self.0.strip_prefix('/').unwrap_or(&self.0)
    }
}

impl fmt::Display for PdfName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PdfName {
    fn from(s: &str) -> Self {
        PdfName::new(s)
    }
}

impl From<String> for PdfName {
    fn from(s: String) -> Self {
        PdfName::new(s)
    }
}

impl PartialEq<str> for PdfName {
    fn eq(&self, other: &str) -> bool {
        self.without_slash() == other || self.as_str() == other
    }
}

impl PartialEq<&str> for PdfName {
    fn eq(&self, other: &&str) -> bool {
        self.without_slash() == *other || self.as_str() == *other
    }
}

impl AsRef<str> for PdfName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
