//! Qualified names for XMP properties, fields and qualifiers
//!
//! Every name in the XMP data model is a pair of a namespace URI and a local
//! name. Not every pair is allowed everywhere: the XML namespace contributes
//! only `xml:lang`, and only as a qualifier, while the RDF namespace
//! contributes only `rdf:type`.

use crate::core::namespace::ns;
use oxiri::Iri;
use std::fmt;

/// A namespace-qualified XML name
///
/// Names order by namespace URI first and local name second, which is the
/// order the serializer writes properties and struct fields in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedName {
    /// The namespace URI
    pub namespace: String,
    /// The local part of the name
    pub local: String,
}

impl QualifiedName {
    /// Create a new qualified name
    pub fn new(namespace: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            local: local.into(),
        }
    }

    /// Check whether this is the name `namespace`:`local`
    pub fn is(&self, namespace: &str, local: &str) -> bool {
        self.namespace == namespace && self.local == local
    }

    /// Check whether this name is legal as a property or struct field name
    pub fn is_valid_property_name(&self) -> bool {
        is_valid_property_name(self)
    }

    /// Check whether this name is legal as a qualifier name
    pub fn is_valid_qualifier_name(&self) -> bool {
        is_valid_qualifier_name(self)
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}{}", self.namespace, self.local)
    }
}

/// Check whether `name` may be used as a property (or struct field) name.
///
/// Fails for empty parts, for anything in the XML namespace, for RDF names
/// other than `rdf:type`, and for namespaces that are not absolute IRIs.
pub fn is_valid_property_name(name: &QualifiedName) -> bool {
    if !has_valid_parts(name) {
        return false;
    }
    match name.namespace.as_str() {
        ns::XML => false,
        ns::RDF => name.local == "type",
        _ => true,
    }
}

/// Check whether `name` may be used as a qualifier name.
///
/// Same rules as [`is_valid_property_name`], except that `xml:lang` is
/// allowed.
pub fn is_valid_qualifier_name(name: &QualifiedName) -> bool {
    if !has_valid_parts(name) {
        return false;
    }
    match name.namespace.as_str() {
        ns::XML => name.local == "lang",
        ns::RDF => name.local == "type",
        _ => true,
    }
}

fn has_valid_parts(name: &QualifiedName) -> bool {
    !name.namespace.is_empty()
        && is_nc_name(&name.local)
        && Iri::parse(name.namespace.as_str()).is_ok()
}

/// Check whether `s` matches the XML `Name` production.
///
/// Non-ASCII characters are accepted when they are alphanumeric, which is a
/// slight superset of the ranges listed in the XML recommendation.
pub(crate) fn is_xml_name(s: &str) -> bool {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    is_name_start_char(first) && chars.all(is_name_char)
}

/// Check whether `s` is an XML name without colons
pub(crate) fn is_nc_name(s: &str) -> bool {
    is_xml_name(s) && !s.contains(':')
}

fn is_name_start_char(c: char) -> bool {
    c == ':' || c == '_' || c.is_alphabetic()
}

fn is_name_char(c: char) -> bool {
    is_name_start_char(c) || c == '-' || c == '.' || c == '\u{B7}' || c.is_alphanumeric()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE: &str = "http://example.com";

    #[test]
    fn test_property_names() {
        let cases = [
            (QualifiedName::new(EXAMPLE, "p"), true),
            (QualifiedName::new("", "p"), false),
            (QualifiedName::new(EXAMPLE, ""), false),
            (QualifiedName::new(ns::RDF, "type"), true),
            (QualifiedName::new(ns::RDF, "resource"), false),
            (QualifiedName::new(ns::RDF, "value"), false),
            (QualifiedName::new(ns::XML, "lang"), false),
            (QualifiedName::new(ns::XML, "p"), false),
            (QualifiedName::new("0", ":"), false),
            (QualifiedName::new("not a uri", "p"), false),
        ];
        for (name, valid) in cases {
            assert_eq!(is_valid_property_name(&name), valid, "{}", name);
        }
    }

    #[test]
    fn test_qualifier_names() {
        let cases = [
            (QualifiedName::new(EXAMPLE, "q"), true),
            (QualifiedName::new("", "q"), false),
            (QualifiedName::new(EXAMPLE, ""), false),
            (QualifiedName::new(ns::RDF, "type"), true),
            (QualifiedName::new(ns::RDF, "resource"), false),
            (QualifiedName::new(ns::RDF, "q"), false),
            (QualifiedName::new(ns::RDF, "value"), false),
            (QualifiedName::new(ns::XML, "lang"), true),
            (QualifiedName::new(ns::XML, "q"), false),
        ];
        for (name, valid) in cases {
            assert_eq!(is_valid_qualifier_name(&name), valid, "{}", name);
        }
    }

    #[test]
    fn test_urn_namespace() {
        assert!(QualifiedName::new("adobe:ns:meta/", "xmptk").is_valid_property_name());
        assert!(QualifiedName::new("http://ns.seehuhn.de/test/#", "prop").is_valid_property_name());
    }

    #[test]
    fn test_xml_name() {
        assert!(is_xml_name("dc"));
        assert!(is_xml_name("_"));
        assert!(is_xml_name("a:b"));
        assert!(is_xml_name("Iptc4xmpCore"));
        assert!(!is_xml_name(""));
        assert!(!is_xml_name("1abc"));
        assert!(!is_xml_name("a b"));
        assert!(!is_nc_name("a:b"));
    }

    #[test]
    fn test_ordering() {
        let a = QualifiedName::new("http://a/", "z");
        let b = QualifiedName::new("http://b/", "a");
        let c = QualifiedName::new("http://b/", "b");
        assert!(a < b);
        assert!(b < c);
    }
}
