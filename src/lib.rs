//! # xmprdf
//!
//! A pure Rust codec for XMP Packets in their RDF/XML serialization.
//!
//! A packet is decoded into a tree of typed values ([`Value`]): text, URIs,
//! structs and arrays, each of which may carry qualifiers such as
//! `xml:lang`. Encoding writes the tree back as RDF/XML, choosing the most
//! compact form for every value; decoding that output gives the same tree.
//!
//! ## Example
//!
//! ```
//! use xmprdf::{ns, ArrayKind, Packet, QualifiedName, Value};
//!
//! let xml = r#"<x:xmpmeta xmlns:x="adobe:ns:meta/">
//!   <rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
//!            xmlns:dc="http://purl.org/dc/elements/1.1/">
//!     <rdf:Description rdf:about="">
//!       <dc:title>
//!         <rdf:Alt>
//!           <rdf:li xml:lang="x-default">Sunset</rdf:li>
//!         </rdf:Alt>
//!       </dc:title>
//!     </rdf:Description>
//!   </rdf:RDF>
//! </x:xmpmeta>"#;
//!
//! let mut packet = Packet::parse(xml)?;
//! let title = QualifiedName::new(ns::DC, "title");
//! let expected = Value::array(
//!     ArrayKind::Alternative,
//!     [Value::text("Sunset").with_language("x-default")],
//! );
//! assert_eq!(packet.get_property(&title), Some(&expected));
//!
//! packet.set_property(QualifiedName::new(ns::XMP, "CreatorTool"), Value::text("xmprdf"))?;
//! let serialized = packet.serialize()?;
//! assert_eq!(Packet::parse(&serialized)?, packet);
//! # Ok::<(), xmprdf::XmpError>(())
//! ```

pub mod core;
pub mod types;

pub use crate::core::classify::{classify, PropertyElementKind};
pub use crate::core::error::{XmpError, XmpResult};
pub use crate::core::namespace::{ns, PrefixMap};
pub use crate::core::node::{
    parse_uri, ArrayKind, ArrayValue, StructValue, TextValue, Uri, UriValue, Value,
};
pub use crate::core::options::{ParseOptions, SerializeOptions};
pub use crate::core::packet::Packet;
pub use crate::core::parser::XmpParser;
pub use crate::core::serializer::{encode_value, XmpSerializer};
pub use crate::core::token::{Attribute, StartElement, Token};
pub use crate::types::name::QualifiedName;
pub use crate::types::qualifier::{Qualifier, Qualifiers};
