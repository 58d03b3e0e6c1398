pub mod name;
pub mod object;
pub mod reference;

pub use name::PdfName;
pub use object::{PdfArray, PdfDictionary};
pub use reference::PdfReference;

use std::fmt;

/// A PDF value. The tagged sum every other layer of the crate speaks.
///
/// `HexString` keeps the raw hexadecimal characters exactly as they
/// appeared between `<` and `>` (undecoded), because the conformance
/// rules for hexadecimal strings are stated over the written form.
/// `Stream` is a dictionary that was followed by a `stream…endstream`
/// payload; it is a distinct variant so stream-only rules can tell the
/// two apart. Equality is structural and recursive.
#[derive(Debug, Clone, PartialEq)]
pub enum PdfValue {
    HexString(Vec<u8>),
    String(Vec<u8>),
    Integer(i64),
    Real(f64),
    Boolean(bool),
    Name(PdfName),
    Array(PdfArray),
    Dictionary(PdfDictionary),
    Stream(PdfDictionary),
    Reference(PdfReference),
}

impl PdfValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PdfValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            PdfValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_real(&self) -> Option<f64> {
        match self {
            PdfValue::Real(r) => Some(*r),
            PdfValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_name(&self) -> Option<&PdfName> {
        match self {
            PdfValue::Name(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&PdfArray> {
        match self {
            PdfValue::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&PdfDictionary> {
        match self {
            PdfValue::Dictionary(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_stream_dict(&self) -> Option<&PdfDictionary> {
        match self {
            PdfValue::Stream(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<&PdfReference> {
        match self {
            PdfValue::Reference(r) => Some(r),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            PdfValue::HexString(_) => "hex string",
            PdfValue::String(_) => "string",
            PdfValue::Integer(_) => "integer",
            PdfValue::Real(_) => "real",
            PdfValue::Boolean(_) => "boolean",
            PdfValue::Name(_) => "name",
            PdfValue::Array(_) => "array",
            PdfValue::Dictionary(_) => "dictionary",
            PdfValue::Stream(_) => "stream",
            PdfValue::Reference(_) => "reference",
        }
    }
}

impl fmt::Display for PdfValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PdfValue::HexString(raw) => write!(f, "<{}>", String::from_utf8_lossy(raw)),
            PdfValue::String(bytes) => write!(f, "({})", String::from_utf8_lossy(bytes)),
            PdfValue::Integer(i) => write!(f, "{}", i),
            PdfValue::Real(r) => write!(f, "{}", r),
            PdfValue::Boolean(b) => write!(f, "{}", b),
            PdfValue::Name(n) => write!(f, "{}", n),
            PdfValue::Array(a) => write!(f, "{}", a),
            PdfValue::Dictionary(d) => write!(f, "{}", d),
            PdfValue::Stream(d) => write!(f, "{} stream", d),
            PdfValue::Reference(r) => write!(f, "{}", r),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_is_structural() {
        let a = PdfValue::Array(PdfArray::from(vec![
            PdfValue::Integer(1),
            PdfValue::Name(PdfName::new("Type")),
        ]));
        let b = PdfValue::Array(PdfArray::from(vec![
            PdfValue::Integer(1),
            PdfValue::Name(PdfName::new("Type")),
        ]));
        assert_eq!(a, b);
        assert_eq!(b, a);
    }

    #[test]
    fn references_compare_by_both_components() {
        let a = PdfValue::Reference(PdfReference::new(1, 0));
        assert_eq!(a, PdfValue::Reference(PdfReference::new(1, 0)));
        assert_ne!(a, PdfValue::Reference(PdfReference::new(1, 1)));
        assert_ne!(a, PdfValue::Reference(PdfReference::new(2, 0)));
    }

    #[test]
    fn distinct_variants_never_compare_equal() {
        assert_ne!(
            PdfValue::String(b"AB".to_vec()),
            PdfValue::HexString(b"AB".to_vec())
        );
        assert_ne!(
            PdfValue::Dictionary(PdfDictionary::new()),
            PdfValue::Stream(PdfDictionary::new())
        );
        assert_ne!(PdfValue::Integer(1), PdfValue::Real(1.0));
    }

    #[test]
    fn nested_dictionary_equality() {
        let mut inner = PdfDictionary::new();
        inner.insert("N", PdfValue::Integer(3));
        let mut a = PdfDictionary::new();
        a.insert("Profile", PdfValue::Dictionary(inner.clone()));
        let mut b = PdfDictionary::new();
        b.insert("Profile", PdfValue::Dictionary(inner));
        assert_eq!(PdfValue::Dictionary(a), PdfValue::Dictionary(b));
    }
}
