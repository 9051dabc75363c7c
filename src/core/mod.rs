//! XMP Core module
//!
//! This module contains the core functionality for XMP packet processing:
//! the value tree, namespace handling, the XML token layer, and the RDF
//! decoder and encoder built on top of it.

pub mod classify;
pub mod error;
pub mod namespace;
pub mod node;
pub mod options;
pub mod packet;
pub mod parser;
pub mod serializer;
pub mod token;

pub use classify::{classify, PropertyElementKind};
pub use error::{XmpError, XmpResult};
pub use namespace::{builtin_namespace_uris, default_prefix, ns, PrefixMap};
pub use node::{parse_uri, ArrayKind, ArrayValue, StructValue, TextValue, Uri, UriValue, Value};
pub use options::{ParseOptions, SerializeOptions, DEFAULT_MAX_DEPTH};
pub use packet::Packet;
pub use parser::XmpParser;
pub use serializer::{encode_value, XmpSerializer};
pub use token::{read_tokens, Attribute, StartElement, Token, TokenReader, TokenWriter};
