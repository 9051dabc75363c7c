//! Classification of RDF property elements
//!
//! A property element can take one of six shapes in the RDF grammar. Which
//! one is decided by looking at the opening tag and at the tokens enclosed by
//! the element, without recursing.

use crate::core::namespace::ns;
use crate::core::token::{StartElement, Token};

/// The grammar production a property element belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyElementKind {
    /// Text content; attributes become qualifiers
    Literal,
    /// A single child node element (struct, array, qualified value, typed node)
    Resource,
    /// `rdf:parseType="Resource"`: the children are fields directly
    ParseTypeResource,
    /// No element content; the attributes carry the value
    Empty,
    /// `rdf:parseType="Literal"` (not part of XMP)
    ParseTypeLiteral,
    /// `rdf:parseType="Collection"` (not part of XMP)
    ParseTypeCollection,
    /// Any other `rdf:parseType` (not part of XMP)
    ParseTypeOther,
}

impl PropertyElementKind {
    /// True for the forms XMP does not represent
    pub fn is_disallowed(&self) -> bool {
        matches!(
            self,
            PropertyElementKind::ParseTypeLiteral
                | PropertyElementKind::ParseTypeCollection
                | PropertyElementKind::ParseTypeOther
        )
    }
}

/// Elements with more attributes than this are always treated as empty
/// property elements.
const MAX_SHORTHAND_ATTRIBUTES: usize = 3;

/// Classify a property element from its start tag and the tokens it encloses
/// (without the closing tag).
pub fn classify(start: &StartElement, body: &[Token]) -> PropertyElementKind {
    if start.attributes.len() > MAX_SHORTHAND_ATTRIBUTES {
        return PropertyElementKind::Empty;
    }

    for attr in &start.attributes {
        let name = &attr.name;
        if name.is(ns::XML, "lang") || name.is(ns::RDF, "ID") {
            continue;
        }
        if name.is(ns::RDF, "datatype") {
            return PropertyElementKind::Literal;
        }
        if name.is(ns::RDF, "parseType") {
            return match attr.value.as_str() {
                "Resource" => PropertyElementKind::ParseTypeResource,
                "Literal" => PropertyElementKind::ParseTypeLiteral,
                "Collection" => PropertyElementKind::ParseTypeCollection,
                _ => PropertyElementKind::ParseTypeOther,
            };
        }
        return PropertyElementKind::Empty;
    }

    if body.iter().any(Token::is_start) {
        PropertyElementKind::Resource
    } else if body.iter().any(Token::is_text) {
        PropertyElementKind::Literal
    } else {
        PropertyElementKind::Empty
    }
}
