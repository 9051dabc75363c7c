//! XMP name and qualifier types
//!
//! This module defines the names properties are keyed by and the qualifiers
//! attached to values.

pub mod name;
pub mod qualifier;

pub use name::{is_valid_property_name, is_valid_qualifier_name, QualifiedName};
pub use qualifier::{Qualifier, Qualifiers};
