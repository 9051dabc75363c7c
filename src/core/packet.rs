//! XMP Packet
//!
//! This module provides the [`Packet`] struct: the top-level properties of
//! one XMP Packet together with the subject URI they describe.

use crate::core::error::{XmpError, XmpResult};
use crate::core::node::{Uri, Value};
use crate::core::options::{ParseOptions, SerializeOptions};
use crate::core::parser::XmpParser;
use crate::core::serializer::XmpSerializer;
use crate::types::name::QualifiedName;
use std::collections::BTreeMap;
use std::str::FromStr;

/// Main structure for working with an XMP Packet
///
/// Properties are keyed by their qualified name and kept sorted, so
/// iteration and serialization order do not depend on insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Packet {
    /// Value of `rdf:about`; `None` when absent or empty
    about: Option<Uri>,
    properties: BTreeMap<QualifiedName, Value>,
}

impl Packet {
    /// Create a new empty packet
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a packet with default options
    ///
    /// The string may be a bare `rdf:RDF` document or a complete packet with
    /// `x:xmpmeta` and `<?xpacket?>` wrappers.
    pub fn parse(xml: &str) -> XmpResult<Self> {
        XmpParser::new().parse(xml)
    }

    /// Parse a packet with the given options
    pub fn parse_with(xml: &str, options: ParseOptions) -> XmpResult<Self> {
        XmpParser::with_options(options).parse(xml)
    }

    /// The subject URI the properties describe
    pub fn about(&self) -> Option<&Uri> {
        self.about.as_ref()
    }

    /// Set or clear the subject URI
    pub fn set_about(&mut self, about: Option<Uri>) {
        self.about = about;
    }

    /// Get a property value
    pub fn get_property(&self, name: &QualifiedName) -> Option<&Value> {
        self.properties.get(name)
    }

    /// Get a mutable reference to a property value
    pub fn get_property_mut(&mut self, name: &QualifiedName) -> Option<&mut Value> {
        self.properties.get_mut(name)
    }

    /// Check if a property exists
    pub fn has_property(&self, name: &QualifiedName) -> bool {
        self.properties.contains_key(name)
    }

    /// Set a property value, replacing any previous value
    ///
    /// # Errors
    ///
    /// Returns [`XmpError::BadParam`] if `name` cannot name a property: its
    /// namespace must be non-empty and not the XML namespace, the only RDF
    /// name allowed is `rdf:type`, and the local part must be an XML name.
    pub fn set_property(&mut self, name: QualifiedName, value: Value) -> XmpResult<()> {
        if !name.is_valid_property_name() {
            return Err(XmpError::BadParam(format!(
                "Invalid property name '{}'",
                name
            )));
        }
        self.properties.insert(name, value);
        Ok(())
    }

    /// Insert without validation; the parser only produces valid names
    pub(crate) fn insert_property(&mut self, name: QualifiedName, value: Value) {
        self.properties.insert(name, value);
    }

    /// Delete a property, returning its value
    pub fn delete_property(&mut self, name: &QualifiedName) -> Option<Value> {
        self.properties.remove(name)
    }

    /// Iterate over all properties, sorted by name
    pub fn properties(&self) -> impl Iterator<Item = (&QualifiedName, &Value)> {
        self.properties.iter()
    }

    /// Number of top-level properties
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Whether the packet has no properties
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Serialize to an XMP Packet with default options
    pub fn serialize(&self) -> XmpResult<String> {
        XmpSerializer::new().serialize(self)
    }

    /// Serialize with the given options
    pub fn serialize_with(&self, options: SerializeOptions) -> XmpResult<String> {
        XmpSerializer::with_options(options).serialize(self)
    }
}

impl FromStr for Packet {
    type Err = XmpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
