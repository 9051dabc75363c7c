//! Namespace management for XMP
//!
//! XMP uses namespaces to organize properties into schemas. When a packet is
//! written, every namespace in use needs an XML prefix. [`PrefixMap`] hands
//! out those prefixes: well-known namespaces get their customary prefix, all
//! others get one derived from the namespace URI.
//!
//! The table of default prefixes is static and read-only; there is no global
//! registry to mutate. Callers wanting other prefixes pass them in through
//! [`SerializeOptions`](crate::SerializeOptions).

use crate::core::error::{XmpError, XmpResult};
use crate::types::name::{is_nc_name, QualifiedName};
use std::collections::{BTreeMap, HashMap};

/// Built-in XMP namespaces
pub mod ns {
    /// XMP Basic namespace
    pub const XMP: &str = "http://ns.adobe.com/xap/1.0/";
    /// Dublin Core namespace
    pub const DC: &str = "http://purl.org/dc/elements/1.1/";
    /// EXIF namespace
    pub const EXIF: &str = "http://ns.adobe.com/exif/1.0/";
    /// EXIF Aux namespace
    pub const EXIF_AUX: &str = "http://ns.adobe.com/exif/1.0/aux/";
    /// IPTC Core namespace
    pub const IPTC_CORE: &str = "http://iptc.org/std/Iptc4xmpCore/1.0/xmlns/";
    /// IPTC Extension namespace
    pub const IPTC_EXT: &str = "http://iptc.org/std/Iptc4xmpExt/2008-02-29/";
    /// Photoshop namespace
    pub const PHOTOSHOP: &str = "http://ns.adobe.com/photoshop/1.0/";
    /// Camera Raw namespace
    pub const CAMERA_RAW: &str = "http://ns.adobe.com/camera-raw-settings/1.0/";
    /// XMP Rights namespace
    pub const XMP_RIGHTS: &str = "http://ns.adobe.com/xap/1.0/rights/";
    /// XMP Media Management namespace
    pub const XMP_MM: &str = "http://ns.adobe.com/xap/1.0/mm/";
    /// XMP Basic Job Ticket namespace
    pub const XMP_BJ: &str = "http://ns.adobe.com/xap/1.0/bj/";
    /// ResourceRef struct namespace
    pub const ST_REF: &str = "http://ns.adobe.com/xap/1.0/sType/ResourceRef#";
    /// XMP Identifier qualifier namespace
    pub const XMP_IDQ: &str = "http://ns.adobe.com/xmp/Identifier/qual/1.0/";
    /// TIFF namespace
    pub const TIFF: &str = "http://ns.adobe.com/tiff/1.0/";
    /// PDF namespace
    pub const PDF: &str = "http://ns.adobe.com/pdf/1.3/";
    /// PDF/X namespace
    pub const PDFX: &str = "http://ns.adobe.com/pdfx/1.3/";
    /// PDF/A namespace
    pub const PDFA: &str = "http://www.aiim.org/pdfa/ns/id/";
    /// XMP Dynamic Media namespace
    pub const XMP_DM: &str = "http://ns.adobe.com/xmp/1.0/DynamicMedia/";
    /// XMP PagedText namespace
    pub const XMP_PAGED: &str = "http://ns.adobe.com/xap/1.0/t/pg/";
    /// XMP Graphics namespace
    pub const XMP_GRAPHICS: &str = "http://ns.adobe.com/xap/1.0/g/";
    /// XMP Image namespace
    pub const XMP_IMAGE: &str = "http://ns.adobe.com/xap/1.0/g/img/";
    /// RDF namespace
    pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
    /// XML namespace (for xml:lang)
    pub const XML: &str = "http://www.w3.org/XML/1998/namespace";
    /// Namespace of `xmlns` declarations
    pub const XMLNS: &str = "http://www.w3.org/2000/xmlns/";
}

/// Well-known namespaces and their customary prefixes
static DEFAULT_PREFIXES: &[(&str, &str)] = &[
    (ns::XML, "xml"),
    (ns::RDF, "rdf"),
    (ns::XMP, "xmp"),
    (ns::DC, "dc"),
    (ns::EXIF, "exif"),
    (ns::EXIF_AUX, "aux"),
    (ns::IPTC_CORE, "Iptc4xmpCore"),
    (ns::IPTC_EXT, "Iptc4xmpExt"),
    (ns::PHOTOSHOP, "photoshop"),
    (ns::CAMERA_RAW, "crs"),
    (ns::XMP_RIGHTS, "xmpRights"),
    (ns::XMP_MM, "xmpMM"),
    (ns::XMP_BJ, "xmpBJ"),
    (ns::ST_REF, "stRef"),
    (ns::XMP_IDQ, "xmpidq"),
    (ns::TIFF, "tiff"),
    (ns::PDF, "pdf"),
    (ns::PDFX, "pdfx"),
    (ns::PDFA, "pdfaid"),
    (ns::XMP_DM, "xmpDM"),
    (ns::XMP_PAGED, "xmpTPg"),
    (ns::XMP_GRAPHICS, "xmpG"),
    (ns::XMP_IMAGE, "xmpGImg"),
];

/// Look up the customary prefix of a well-known namespace
pub fn default_prefix(uri: &str) -> Option<&'static str> {
    DEFAULT_PREFIXES
        .iter()
        .find(|(u, _)| *u == uri)
        .map(|(_, p)| *p)
}

/// Get all built-in namespace URIs
pub fn builtin_namespace_uris() -> impl Iterator<Item = &'static str> {
    DEFAULT_PREFIXES.iter().map(|(u, _)| *u)
}

/// Bidirectional map between namespace URIs and prefixes
///
/// Both directions are one-to-one. `xml` and `rdf` are always bound to the
/// XML and RDF namespaces.
#[derive(Debug, Clone)]
pub struct PrefixMap {
    uri_to_prefix: BTreeMap<String, String>,
    prefix_to_uri: HashMap<String, String>,
}

impl PrefixMap {
    /// Create a map holding only the `xml` and `rdf` bindings
    pub fn new() -> Self {
        let mut map = Self {
            uri_to_prefix: BTreeMap::new(),
            prefix_to_uri: HashMap::new(),
        };
        map.insert(ns::XML, "xml");
        map.insert(ns::RDF, "rdf");
        map
    }

    /// Assign prefixes to a set of namespaces
    ///
    /// Default prefixes are applied first, then `preferred` (namespace URI to
    /// prefix), and the remaining namespaces get a prefix derived from their
    /// URI. A preferred prefix that is not an NCName, starts with `xml`, or
    /// is already taken is ignored. The result depends only on the set of
    /// namespaces, not on the order they are given in.
    pub fn for_namespaces<'a, I>(namespaces: I, preferred: &BTreeMap<String, String>) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut map = Self::new();
        let mut pending: Vec<&str> = namespaces.into_iter().collect();
        pending.sort_unstable();
        pending.dedup();

        // default namespaces first, ...
        pending.retain(|uri| {
            if map.has_uri(uri) {
                return false;
            }
            match default_prefix(uri) {
                Some(prefix) if !map.has_prefix(prefix) => {
                    map.insert(uri, prefix);
                    false
                }
                _ => true,
            }
        });

        // ... then caller preferences, ...
        pending.retain(|uri| match preferred.get(*uri) {
            Some(prefix) if is_usable_prefix(prefix) && !map.has_prefix(prefix) => {
                map.insert(uri, prefix);
                false
            }
            _ => true,
        });

        // ... and then the others
        for uri in pending {
            let prefix = map.derive_prefix(uri);
            map.insert(uri, &prefix);
        }

        map
    }

    /// Register a namespace URI with a prefix
    ///
    /// Returns an error if the prefix is unusable, or if either side is
    /// already bound to something else.
    pub fn register(&mut self, uri: &str, prefix: &str) -> XmpResult<()> {
        if uri.is_empty() {
            return Err(XmpError::BadParam("URI cannot be empty".to_string()));
        }
        if !is_usable_prefix(prefix) {
            return Err(XmpError::BadParam(format!(
                "'{}' cannot be used as a namespace prefix",
                prefix
            )));
        }
        if let Some(existing_uri) = self.prefix_to_uri.get(prefix) {
            if existing_uri != uri {
                return Err(XmpError::BadParam(format!(
                    "Prefix '{}' is already registered to '{}'",
                    prefix, existing_uri
                )));
            }
            return Ok(());
        }
        if let Some(existing_prefix) = self.uri_to_prefix.get(uri) {
            return Err(XmpError::BadParam(format!(
                "Namespace '{}' is already registered with prefix '{}'",
                uri, existing_prefix
            )));
        }
        self.insert(uri, prefix);
        Ok(())
    }

    fn insert(&mut self, uri: &str, prefix: &str) {
        self.uri_to_prefix
            .insert(uri.to_string(), prefix.to_string());
        self.prefix_to_uri
            .insert(prefix.to_string(), uri.to_string());
    }

    /// Get the prefix for a namespace URI
    pub fn get_prefix(&self, uri: &str) -> Option<&str> {
        self.uri_to_prefix.get(uri).map(|s| s.as_str())
    }

    /// Get the URI for a namespace prefix
    pub fn get_uri(&self, prefix: &str) -> Option<&str> {
        self.prefix_to_uri.get(prefix).map(|s| s.as_str())
    }

    /// Check if a namespace URI is registered
    pub fn has_uri(&self, uri: &str) -> bool {
        self.uri_to_prefix.contains_key(uri)
    }

    /// Check if a namespace prefix is registered
    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.prefix_to_uri.contains_key(prefix)
    }

    /// Number of bindings, including `xml` and `rdf`
    pub fn len(&self) -> usize {
        self.uri_to_prefix.len()
    }

    /// Check if the map has no bindings
    pub fn is_empty(&self) -> bool {
        self.uri_to_prefix.is_empty()
    }

    /// Iterate over `(uri, prefix)` pairs, sorted by URI
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.uri_to_prefix
            .iter()
            .map(|(u, p)| (u.as_str(), p.as_str()))
    }

    /// Render a name as `prefix:local`
    ///
    /// Names in the XML namespace use the reserved `xml` prefix and names
    /// without a namespace are written bare. A namespace that was never
    /// assigned a prefix is an internal error.
    pub fn qualify(&self, name: &QualifiedName) -> XmpResult<String> {
        if name.namespace.is_empty() {
            return Ok(name.local.clone());
        }
        match self.get_prefix(&name.namespace) {
            Some(prefix) => Ok(format!("{}:{}", prefix, name.local)),
            None => Err(XmpError::InternalError(format!(
                "namespace not registered: {}",
                name.namespace
            ))),
        }
    }

    /// Choose an unused prefix for `uri`, based on its last path segment
    fn derive_prefix(&self, uri: &str) -> String {
        let trimmed = uri.trim_end_matches(['/', '#']);
        let segment = match trimmed.rfind('/') {
            Some(i) => &trimmed[i + 1..],
            None => trimmed,
        };
        let mut prefix = if is_nc_name(segment) {
            segment.to_string()
        } else {
            "_".to_string()
        };
        if starts_with_xml(&prefix) {
            prefix.insert(0, '_');
        }

        if !self.has_prefix(&prefix) {
            return prefix;
        }
        let mut idx = 1;
        loop {
            let candidate = format!("{}_{}", prefix, idx);
            if !self.has_prefix(&candidate) {
                return candidate;
            }
            idx += 1;
        }
    }
}

impl Default for PrefixMap {
    fn default() -> Self {
        Self::new()
    }
}

/// A prefix must be an NCName and must not start with `xml`, which is
/// reserved, unless it is one of the two fixed bindings.
fn is_usable_prefix(prefix: &str) -> bool {
    is_nc_name(prefix) && !starts_with_xml(prefix)
}

fn starts_with_xml(prefix: &str) -> bool {
    prefix
        .get(..3)
        .is_some_and(|p| p.eq_ignore_ascii_case("xml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn map_for(namespaces: &[&str]) -> PrefixMap {
        PrefixMap::for_namespaces(namespaces.iter().copied(), &BTreeMap::new())
    }

    #[test]
    fn test_prefix_map_new() {
        let map = PrefixMap::new();
        assert_eq!(map.get_prefix(ns::XML), Some("xml"));
        assert_eq!(map.get_prefix(ns::RDF), Some("rdf"));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_default_prefixes_unique() {
        let prefixes: HashSet<_> = DEFAULT_PREFIXES.iter().map(|(_, p)| *p).collect();
        let uris: HashSet<_> = builtin_namespace_uris().collect();
        assert_eq!(prefixes.len(), DEFAULT_PREFIXES.len());
        assert_eq!(uris.len(), DEFAULT_PREFIXES.len());
        for (_, p) in DEFAULT_PREFIXES {
            assert!(is_nc_name(p), "{}", p);
        }
    }

    #[test]
    fn test_register() {
        let mut map = PrefixMap::new();
        assert!(map.register("http://example.com/ns", "ex").is_ok());
        assert_eq!(map.get_prefix("http://example.com/ns"), Some("ex"));
        assert_eq!(map.get_uri("ex"), Some("http://example.com/ns"));
        // registering the same pair again is a no-op
        assert!(map.register("http://example.com/ns", "ex").is_ok());
        assert!(map.register("http://example.com/ns2", "ex").is_err());
        assert!(map.register("http://example.com/ns", "ex2").is_err());
        assert!(map.register("http://example.com/ns3", "xmlfoo").is_err());
        assert!(map.register("http://example.com/ns3", "a:b").is_err());
        assert!(map.register("", "e").is_err());
    }

    #[test]
    fn test_default_prefixes_applied() {
        let map = map_for(&[ns::DC, ns::XMP_MM, "http://example.com/dc/"]);
        assert_eq!(map.get_prefix(ns::DC), Some("dc"));
        assert_eq!(map.get_prefix(ns::XMP_MM), Some("xmpMM"));
        assert_eq!(map.get_prefix("http://example.com/dc/"), Some("dc_1"));
    }

    #[test]
    fn test_derived_prefixes() {
        let cases = [
            ("http://ns.example.com/test/", "test"),
            ("http://ns.example.com/test#", "test"),
            ("http://ns.example.com/a/b//", "b"),
            ("urn:example", "_"),
            ("http://ns.example.com/1.0/", "_"),
            ("http://ns.example.com/xmlStuff/", "_xmlStuff"),
            ("http://ns.example.com/XMLfoo#", "_XMLfoo"),
        ];
        for (uri, expected) in cases {
            let map = map_for(&[uri]);
            assert_eq!(map.get_prefix(uri), Some(expected), "{}", uri);
        }
    }

    #[test]
    fn test_collisions_get_suffixes() {
        let uris = [
            "http://a.example.com/ns/",
            "http://b.example.com/ns/",
            "http://c.example.com/ns#",
            "http://example.com/ns_1/",
        ];
        let map = map_for(&uris);
        let prefixes: HashSet<_> = uris.iter().map(|u| map.get_prefix(u).unwrap()).collect();
        assert_eq!(prefixes.len(), uris.len());
        assert_eq!(map.get_prefix(uris[0]), Some("ns"));
    }

    #[test]
    fn test_deterministic() {
        let a = map_for(&["http://b.example.com/ns/", "http://a.example.com/ns/"]);
        let b = map_for(&["http://a.example.com/ns/", "http://b.example.com/ns/"]);
        let a: Vec<_> = a.iter().collect();
        let b: Vec<_> = b.iter().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_preferred_prefixes() {
        let mut preferred = BTreeMap::new();
        preferred.insert("http://example.com/a/".to_string(), "mine".to_string());
        preferred.insert("http://example.com/b/".to_string(), "dc".to_string());
        preferred.insert(ns::DC.to_string(), "other".to_string());
        let map = PrefixMap::for_namespaces(
            ["http://example.com/a/", "http://example.com/b/", ns::DC],
            &preferred,
        );
        assert_eq!(map.get_prefix("http://example.com/a/"), Some("mine"));
        // taken by the default table
        assert_eq!(map.get_prefix("http://example.com/b/"), Some("b"));
        assert_eq!(map.get_prefix(ns::DC), Some("dc"));
    }

    #[test]
    fn test_xml_and_rdf_fixed() {
        let map = map_for(&[
            "http://example.com/rdf/",
            "http://example.com/xml/",
            ns::RDF,
        ]);
        assert_eq!(map.get_prefix(ns::RDF), Some("rdf"));
        assert_eq!(map.get_prefix(ns::XML), Some("xml"));
        assert_eq!(map.get_prefix("http://example.com/rdf/"), Some("rdf_1"));
        assert_eq!(map.get_prefix("http://example.com/xml/"), Some("_xml"));
    }

    #[test]
    fn test_qualify() {
        let map = map_for(&[ns::DC]);
        assert_eq!(map.qualify(&QualifiedName::new(ns::DC, "title")).unwrap(), "dc:title");
        assert_eq!(map.qualify(&QualifiedName::new(ns::XML, "lang")).unwrap(), "xml:lang");
        assert_eq!(map.qualify(&QualifiedName::new("", "about")).unwrap(), "about");
        assert!(matches!(
            map.qualify(&QualifiedName::new("http://unknown/", "x")),
            Err(XmpError::InternalError(_))
        ));
    }

    fn namespace_uri() -> impl Strategy<Value = String> {
        prop_oneof![
            prop::sample::select(builtin_namespace_uris().collect::<Vec<_>>())
                .prop_map(str::to_string),
            (
                "[a-c]",
                prop::sample::select(vec!["ns", "ns_1", "dc", "rdf", "xml", "XMLfoo", "1.0", "_", "a-b"]),
                prop::sample::select(vec!["/", "#", ""]),
            )
                .prop_map(|(host, segment, end)| {
                    format!("http://{}.example.com/{}{}", host, segment, end)
                }),
        ]
    }

    fn preferred_prefix() -> impl Strategy<Value = String> {
        prop::sample::select(vec!["ns", "dc", "rdf", "xml", "mine", "a:b", ""]).prop_map(str::to_string)
    }

    proptest! {
        #[test]
        fn test_prefixes_distinct_for_any_namespaces(
            uris in prop::collection::vec(namespace_uri(), 0..12),
            preferred in prop::collection::btree_map(namespace_uri(), preferred_prefix(), 0..4),
        ) {
            let map = PrefixMap::for_namespaces(uris.iter().map(String::as_str), &preferred);
            prop_assert_eq!(map.get_prefix(ns::RDF), Some("rdf"));
            prop_assert_eq!(map.get_prefix(ns::XML), Some("xml"));

            let prefixes: HashSet<_> = map.iter().map(|(_, p)| p).collect();
            prop_assert_eq!(prefixes.len(), map.len());
            for uri in &uris {
                let Some(prefix) = map.get_prefix(uri) else {
                    return Err(TestCaseError::fail(format!("no prefix for {}", uri)));
                };
                prop_assert_eq!(map.get_uri(prefix), Some(uri.as_str()));
                prop_assert!(is_nc_name(prefix), "{}", prefix);
            }

            let reversed = PrefixMap::for_namespaces(uris.iter().rev().map(String::as_str), &preferred);
            prop_assert_eq!(map.iter().collect::<Vec<_>>(), reversed.iter().collect::<Vec<_>>());
        }
    }
}
