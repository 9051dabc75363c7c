//! XMP value types
//!
//! This module defines the value tree of the XMP data model:
//! - TextValue: simple (non-URI) text
//! - UriValue: a URI reference
//! - StructValue: a structure containing named fields
//! - ArrayValue: an array of values (ordered, unordered, or alternative)
//!
//! Every variant carries its own list of [`Qualifiers`].

use crate::core::error::{XmpError, XmpResult};
use crate::types::name::QualifiedName;
use crate::types::qualifier::Qualifiers;
use oxiri::IriRef;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A URI reference, as found in `rdf:resource` attributes
pub type Uri = IriRef<String>;

/// Parse a URI reference
pub fn parse_uri(s: impl Into<String>) -> XmpResult<Uri> {
    let s = s.into();
    IriRef::parse(s).map_err(|e| XmpError::BadValue(format!("invalid URI: {}", e)))
}

/// Type of array value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArrayKind {
    /// Unordered array (rdf:Bag)
    Unordered,
    /// Ordered array (rdf:Seq)
    Ordered,
    /// Alternative array (rdf:Alt)
    Alternative,
}

impl ArrayKind {
    /// Get the local name of the RDF container element for this kind
    pub fn rdf_type(&self) -> &'static str {
        match self {
            ArrayKind::Unordered => "Bag",
            ArrayKind::Ordered => "Seq",
            ArrayKind::Alternative => "Alt",
        }
    }

    /// Map an RDF container local name back to an array kind
    pub fn from_rdf_type(local: &str) -> Option<Self> {
        match local {
            "Bag" => Some(ArrayKind::Unordered),
            "Seq" => Some(ArrayKind::Ordered),
            "Alt" => Some(ArrayKind::Alternative),
            _ => None,
        }
    }
}

/// A simple text value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextValue {
    /// The text
    pub value: String,
    /// Qualifiers attached to this value
    pub qualifiers: Qualifiers,
}

/// A URI value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriValue {
    /// The URI reference
    pub value: Uri,
    /// Qualifiers attached to this value
    pub qualifiers: Qualifiers,
}

/// A structure value containing named fields
///
/// Field names are unique and always valid property names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructValue {
    fields: BTreeMap<QualifiedName, Value>,
    /// Qualifiers attached to this value
    pub qualifiers: Qualifiers,
}

impl StructValue {
    /// Create a new, empty structure
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a field by name
    pub fn get_field(&self, name: &QualifiedName) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Get a mutable reference to a field by name
    pub fn get_field_mut(&mut self, name: &QualifiedName) -> Option<&mut Value> {
        self.fields.get_mut(name)
    }

    /// Set a field, replacing any previous value
    ///
    /// Returns an error if `name` is not a valid property name.
    pub fn set_field(&mut self, name: QualifiedName, value: Value) -> XmpResult<()> {
        if !name.is_valid_property_name() {
            return Err(XmpError::BadParam(format!(
                "'{}' is not a valid field name",
                name
            )));
        }
        self.fields.insert(name, value);
        Ok(())
    }

    pub(crate) fn insert_field(&mut self, name: QualifiedName, value: Value) {
        debug_assert!(name.is_valid_property_name());
        self.fields.insert(name, value);
    }

    /// Remove a field
    pub fn remove_field(&mut self, name: &QualifiedName) -> Option<Value> {
        self.fields.remove(name)
    }

    /// Check if a field exists
    pub fn has_field(&self, name: &QualifiedName) -> bool {
        self.fields.contains_key(name)
    }

    /// Iterate over the fields, sorted by namespace and local name
    pub fn fields(&self) -> impl Iterator<Item = (&QualifiedName, &Value)> {
        self.fields.iter()
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the structure has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// True if every field is plain text without qualifiers
    pub(crate) fn all_simple(&self) -> bool {
        self.fields
            .values()
            .all(|v| v.as_text().is_some_and(|t| t.qualifiers.is_empty()))
    }
}

/// An array value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayValue {
    /// The items in the array
    pub items: Vec<Value>,
    kind: ArrayKind,
    /// Qualifiers attached to this value
    pub qualifiers: Qualifiers,
}

impl ArrayValue {
    /// Create a new, empty array
    pub fn new(kind: ArrayKind) -> Self {
        Self {
            items: Vec::new(),
            kind,
            qualifiers: Qualifiers::new(),
        }
    }

    /// The kind of array, fixed at construction
    pub fn kind(&self) -> ArrayKind {
        self.kind
    }

    /// Get the number of items in the array
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the array is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get an item by index
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.items.get(index)
    }

    /// Append an item to the array
    pub fn append(&mut self, value: Value) {
        self.items.push(value);
    }

    /// Insert an item at a specific index
    pub fn insert(&mut self, index: usize, value: Value) -> XmpResult<()> {
        if index > self.items.len() {
            return Err(XmpError::BadParam(format!(
                "Index {} out of bounds for array of length {}",
                index,
                self.items.len()
            )));
        }
        self.items.insert(index, value);
        Ok(())
    }

    /// Remove an item at a specific index
    pub fn remove(&mut self, index: usize) -> XmpResult<Value> {
        if index >= self.items.len() {
            return Err(XmpError::BadParam(format!(
                "Index {} out of bounds for array of length {}",
                index,
                self.items.len()
            )));
        }
        Ok(self.items.remove(index))
    }
}

/// A value in the XMP data model
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Simple text
    Text(TextValue),
    /// A URI reference
    Uri(UriValue),
    /// A structure
    Struct(StructValue),
    /// An array
    Array(ArrayValue),
}

impl Value {
    /// Create an unqualified text value
    pub fn text(value: impl Into<String>) -> Self {
        Value::Text(TextValue {
            value: value.into(),
            qualifiers: Qualifiers::new(),
        })
    }

    /// Create an unqualified URI value
    ///
    /// Returns an error if `value` is not a URI reference.
    pub fn uri(value: impl Into<String>) -> XmpResult<Self> {
        Ok(Value::Uri(UriValue {
            value: parse_uri(value)?,
            qualifiers: Qualifiers::new(),
        }))
    }

    /// Create an unqualified structure from `(name, value)` pairs
    ///
    /// Returns an error if any name is not a valid property name.
    pub fn structure(
        fields: impl IntoIterator<Item = (QualifiedName, Value)>,
    ) -> XmpResult<Self> {
        let mut s = StructValue::new();
        for (name, value) in fields {
            s.set_field(name, value)?;
        }
        Ok(Value::Struct(s))
    }

    /// Create an unqualified array
    pub fn array(kind: ArrayKind, items: impl IntoIterator<Item = Value>) -> Self {
        let mut a = ArrayValue::new(kind);
        a.items.extend(items);
        Value::Array(a)
    }

    /// Add a qualifier, builder style
    ///
    /// Returns an error if `name` is not a valid qualifier name, or for an
    /// `xml:lang` qualifier that [`Qualifiers::add`] refuses.
    pub fn with_qualifier(mut self, name: QualifiedName, value: Value) -> XmpResult<Self> {
        self.qualifiers_mut().add(name, value)?;
        Ok(self)
    }

    /// Set the language, builder style
    pub fn with_language(mut self, tag: impl Into<String>) -> Self {
        let q = self.qualifiers().with_language(tag);
        *self.qualifiers_mut() = q;
        self
    }

    /// The qualifiers of this value
    pub fn qualifiers(&self) -> &Qualifiers {
        match self {
            Value::Text(v) => &v.qualifiers,
            Value::Uri(v) => &v.qualifiers,
            Value::Struct(v) => &v.qualifiers,
            Value::Array(v) => &v.qualifiers,
        }
    }

    /// Mutable access to the qualifiers of this value
    pub fn qualifiers_mut(&mut self) -> &mut Qualifiers {
        match self {
            Value::Text(v) => &mut v.qualifiers,
            Value::Uri(v) => &mut v.qualifiers,
            Value::Struct(v) => &mut v.qualifiers,
            Value::Array(v) => &mut v.qualifiers,
        }
    }

    /// Get the text value, if this is a text value
    pub fn as_text(&self) -> Option<&TextValue> {
        match self {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Get the URI value, if this is a URI value
    pub fn as_uri(&self) -> Option<&UriValue> {
        match self {
            Value::Uri(v) => Some(v),
            _ => None,
        }
    }

    /// Get the structure, if this is a structure
    pub fn as_struct(&self) -> Option<&StructValue> {
        match self {
            Value::Struct(v) => Some(v),
            _ => None,
        }
    }

    /// Get the array, if this is an array
    pub fn as_array(&self) -> Option<&ArrayValue> {
        match self {
            Value::Array(v) => Some(v),
            _ => None,
        }
    }

    /// Get a mutable reference to the structure, if this is a structure
    pub fn as_struct_mut(&mut self) -> Option<&mut StructValue> {
        match self {
            Value::Struct(v) => Some(v),
            _ => None,
        }
    }

    /// Get a mutable reference to the array, if this is an array
    pub fn as_array_mut(&mut self) -> Option<&mut ArrayValue> {
        match self {
            Value::Array(v) => Some(v),
            _ => None,
        }
    }

    /// Record every namespace used by names inside this value
    pub(crate) fn collect_namespaces(&self, out: &mut BTreeSet<String>) {
        for q in self.qualifiers() {
            out.insert(q.name.namespace.clone());
            q.value.collect_namespaces(out);
        }
        match self {
            Value::Text(_) | Value::Uri(_) => {}
            Value::Struct(s) => {
                for (name, field) in s.fields() {
                    out.insert(name.namespace.clone());
                    field.collect_namespaces(out);
                }
            }
            Value::Array(a) => {
                for item in &a.items {
                    item.collect_namespaces(out);
                }
            }
        }
    }
}

impl From<TextValue> for Value {
    fn from(v: TextValue) -> Self {
        Value::Text(v)
    }
}

impl From<UriValue> for Value {
    fn from(v: UriValue) -> Self {
        Value::Uri(v)
    }
}

impl From<StructValue> for Value {
    fn from(v: StructValue) -> Self {
        Value::Struct(v)
    }
}

impl From<ArrayValue> for Value {
    fn from(v: ArrayValue) -> Self {
        Value::Array(v)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::text(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::text(s)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(t) => write!(f, "{:?}", t.value),
            Value::Uri(u) => write!(f, "<{}>", u.value.as_str()),
            Value::Struct(s) => write!(f, "[Struct; {} fields]", s.len()),
            Value::Array(a) => write!(f, "[{:?}; {} items]", a.kind, a.len()),
        }
    }
}

#[cfg(feature = "serde")]
impl serde::ser::Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        use serde::ser::{Serialize, SerializeMap};

        match self {
            Value::Text(t) => serializer.serialize_str(&t.value),
            Value::Uri(u) => serializer.serialize_str(u.value.as_str()),
            Value::Struct(s) => {
                let mut map = serializer.serialize_map(Some(s.len()))?;
                for (name, field) in s.fields() {
                    map.serialize_entry(&format!("{}{}", name.namespace, name.local), field)?;
                }
                map.end()
            }
            Value::Array(a) => a.items.serialize(serializer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::namespace::ns;
    use crate::types::qualifier::Qualifier;

    fn test_name(local: &str) -> QualifiedName {
        QualifiedName::new("http://ns.example.com/test/", local)
    }

    #[test]
    fn test_text_value() {
        let v = Value::text("test").with_language("en-US");
        let t = v.as_text().unwrap();
        assert_eq!(t.value, "test");
        assert_eq!(t.qualifiers.language(), Some("en-US"));
        assert!(v.as_uri().is_none());
    }

    #[test]
    fn test_uri_value() {
        let v = Value::uri("http://example.com/").unwrap();
        assert_eq!(v.as_uri().unwrap().value.as_str(), "http://example.com/");
        assert!(Value::uri("").is_ok());
        assert!(Value::uri("not a uri").is_err());
    }

    #[test]
    fn test_array_value() {
        let mut array = ArrayValue::new(ArrayKind::Ordered);
        assert!(array.is_empty());

        array.append(Value::text("item1"));
        array.append(Value::text("item2"));
        assert_eq!(array.len(), 2);
        assert_eq!(array.kind(), ArrayKind::Ordered);

        let removed = array.remove(0).unwrap();
        assert_eq!(removed, Value::text("item1"));
        assert!(array.remove(5).is_err());
        assert!(array.insert(2, Value::text("x")).is_err());
    }

    #[test]
    fn test_struct_value() {
        let mut s = StructValue::new();
        assert!(!s.has_field(&test_name("a")));

        s.set_field(test_name("b"), Value::text("2")).unwrap();
        s.set_field(test_name("a"), Value::text("1")).unwrap();
        let names: Vec<_> = s.fields().map(|(n, _)| n.local.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
        assert!(s.all_simple());

        assert!(s
            .set_field(QualifiedName::new(ns::XML, "lang"), Value::text("de"))
            .is_err());
        assert!(s
            .set_field(QualifiedName::new(ns::RDF, "type"), Value::text("t"))
            .is_ok());

        s.remove_field(&test_name("a"));
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn test_array_kind_rdf() {
        assert_eq!(ArrayKind::Ordered.rdf_type(), "Seq");
        assert_eq!(ArrayKind::Unordered.rdf_type(), "Bag");
        assert_eq!(ArrayKind::Alternative.rdf_type(), "Alt");
        assert_eq!(ArrayKind::from_rdf_type("Alt"), Some(ArrayKind::Alternative));
        assert_eq!(ArrayKind::from_rdf_type("List"), None);
    }

    #[test]
    fn test_collect_namespaces() {
        let inner = Value::text("1")
            .with_qualifier(QualifiedName::new("http://q/", "q"), Value::text("x"))
            .unwrap();
        let v = Value::array(
            ArrayKind::Unordered,
            [Value::structure([(test_name("a"), inner)]).unwrap()],
        );
        let mut set = BTreeSet::new();
        v.collect_namespaces(&mut set);
        assert!(set.contains("http://q/"));
        assert!(set.contains("http://ns.example.com/test/"));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_qualifier_value_nesting() {
        let lang = Qualifier::language("de");
        let mut v = Value::text("Hallo");
        v.qualifiers_mut().push(lang.clone());
        assert_eq!(v.qualifiers().get(&lang.name), Some(&lang));
    }

    #[test]
    fn test_with_qualifier_language() {
        let lang = QualifiedName::new(ns::XML, "lang");
        let uri = Value::uri("urn:x").unwrap();
        assert!(matches!(
            Value::text("v").with_qualifier(lang.clone(), uri),
            Err(XmpError::BadParam(_))
        ));
        assert!(Value::text("v")
            .with_language("de")
            .with_qualifier(lang, Value::text("en"))
            .is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serialize_json() {
        let v = Value::structure([
            (test_name("a"), Value::text("1")),
            (
                test_name("b"),
                Value::array(ArrayKind::Ordered, [Value::uri("urn:x").unwrap()]),
            ),
        ])
        .unwrap();
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(
            json,
            r#"{"http://ns.example.com/test/a":"1","http://ns.example.com/test/b":["urn:x"]}"#
        );
    }
}
