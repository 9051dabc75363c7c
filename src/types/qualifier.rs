//! Qualifier types for XMP
//!
//! Qualifiers provide additional information about XMP values. They can be
//! used to add language information, type information, etc. A qualifier
//! value is itself a full [`Value`] and may carry qualifiers of its own.

use crate::core::error::{XmpError, XmpResult};
use crate::core::namespace::ns;
use crate::core::node::Value;
use crate::types::name::QualifiedName;
use std::fmt;
use std::ops::Deref;

/// A qualifier for an XMP value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Qualifier {
    /// The name of the qualifier
    pub name: QualifiedName,
    /// The value of the qualifier
    pub value: Value,
}

impl Qualifier {
    /// Create a new qualifier
    pub fn new(name: QualifiedName, value: Value) -> Self {
        Self { name, value }
    }

    /// Create an `xml:lang` qualifier
    pub fn language(tag: impl Into<String>) -> Self {
        Self::new(lang_name(), Value::text(tag))
    }

    /// Check whether this is the `xml:lang` qualifier
    pub fn is_language(&self) -> bool {
        self.name.is(ns::XML, "lang")
    }

    /// Check whether the value is plain text without qualifiers of its own
    pub fn is_simple(&self) -> bool {
        self.value.as_text().is_some_and(|t| t.qualifiers.is_empty())
    }
}

impl fmt::Display for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

/// An ordered list of qualifiers
///
/// Order is kept so that re-encoding is deterministic. Only qualifiers with
/// valid qualifier names can be stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Qualifiers(Vec<Qualifier>);

impl Qualifiers {
    /// Create an empty qualifier list
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append a qualifier
    ///
    /// Returns an error if the name is not a valid qualifier name. An
    /// `xml:lang` qualifier must be plain text without qualifiers, and
    /// there can be only one. Use [`Qualifiers::with_language`] to replace
    /// the language.
    pub fn add(&mut self, name: QualifiedName, value: Value) -> XmpResult<()> {
        self.check(&name, &value)?;
        self.0.push(Qualifier::new(name, value));
        Ok(())
    }

    fn check(&self, name: &QualifiedName, value: &Value) -> XmpResult<()> {
        if !name.is_valid_qualifier_name() {
            return Err(XmpError::BadParam(format!(
                "'{}' is not a valid qualifier name",
                name
            )));
        }
        if name.is(ns::XML, "lang") {
            if !value.as_text().is_some_and(|t| t.qualifiers.is_empty()) {
                return Err(XmpError::BadParam(format!(
                    "xml:lang must be plain text, got '{}'",
                    value
                )));
            }
            if self.language().is_some() {
                return Err(XmpError::BadParam(
                    "value already has an xml:lang qualifier".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Append a qualifier whose name the caller has already validated
    pub(crate) fn push(&mut self, qualifier: Qualifier) {
        debug_assert!(qualifier.name.is_valid_qualifier_name());
        self.0.push(qualifier);
    }

    /// Get the first qualifier with the given name
    pub fn get(&self, name: &QualifiedName) -> Option<&Qualifier> {
        self.0.iter().find(|q| &q.name == name)
    }

    /// Remove all qualifiers with the given name
    pub fn remove(&mut self, name: &QualifiedName) -> bool {
        let initial_len = self.0.len();
        self.0.retain(|q| &q.name != name);
        self.0.len() < initial_len
    }

    /// The language tag from the `xml:lang` qualifier, if any
    pub fn language(&self) -> Option<&str> {
        self.0
            .iter()
            .find(|q| q.is_language())
            .and_then(|q| q.value.as_text())
            .map(|t| t.value.as_str())
    }

    /// Split off the language: returns the language tag and the remaining
    /// qualifiers.
    pub fn strip_language(&self) -> (Option<String>, Qualifiers) {
        let lang = self.language().map(str::to_string);
        let rest = self.0.iter().filter(|q| !q.is_language()).cloned().collect();
        (lang, Qualifiers(rest))
    }

    /// Return a copy with the given language as first qualifier, replacing
    /// any previous language qualifier.
    pub fn with_language(&self, tag: impl Into<String>) -> Qualifiers {
        let mut res = Vec::with_capacity(self.0.len() + 1);
        res.push(Qualifier::language(tag));
        res.extend(self.0.iter().filter(|q| !q.is_language()).cloned());
        Qualifiers(res)
    }

    /// True if there are qualifiers other than `xml:lang`
    pub fn has_general(&self) -> bool {
        self.0.iter().any(|q| !q.is_language())
    }

    /// True if every qualifier is plain, unqualified text
    pub fn all_simple(&self) -> bool {
        self.0.iter().all(Qualifier::is_simple)
    }
}

impl Deref for Qualifiers {
    type Target = [Qualifier];

    fn deref(&self) -> &[Qualifier] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a Qualifiers {
    type Item = &'a Qualifier;
    type IntoIter = std::slice::Iter<'a, Qualifier>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<Qualifier> for Qualifiers {
    /// Collects qualifiers, silently dropping those [`Qualifiers::add`]
    /// would refuse
    fn from_iter<I: IntoIterator<Item = Qualifier>>(iter: I) -> Self {
        let mut res = Qualifiers::new();
        for q in iter {
            if res.check(&q.name, &q.value).is_ok() {
                res.0.push(q);
            }
        }
        res
    }
}

pub(crate) fn lang_name() -> QualifiedName {
    QualifiedName::new(ns::XML, "lang")
}
