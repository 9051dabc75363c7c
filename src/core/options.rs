//! Options for parsing and serializing packets
//!
//! Both option sets are plain values built with chained setters and passed
//! explicitly to [`XmpParser`](crate::XmpParser) and
//! [`XmpSerializer`](crate::XmpSerializer).

use std::collections::BTreeMap;

/// Default limit on the nesting of property elements
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Options for decoding a packet
///
/// # Example
///
/// ```
/// use xmprdf::ParseOptions;
///
/// let options = ParseOptions::new().max_depth(32);
/// assert_eq!(options.max_depth, 32);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Maximum nesting depth of property elements (struct fields, array
    /// items, qualifiers); deeper input fails to parse
    pub max_depth: usize,
}

impl ParseOptions {
    /// Create the default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum nesting depth.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Options for encoding a packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializeOptions {
    /// Spaces per nesting level, or `None` for single-line output
    pub indent: Option<usize>,
    /// Wrap the output in `<?xpacket?>` processing instructions
    pub packet_wrapper: bool,
    /// Namespace URI to prefix; used for namespaces without a built-in
    /// default prefix
    pub preferred_prefixes: BTreeMap<String, String>,
}

impl SerializeOptions {
    /// Create the default options: indented by two spaces, with the packet
    /// wrapper.
    pub fn new() -> Self {
        Self::default()
    }

    /// Indent nested elements by `width` spaces.
    pub fn indent(mut self, width: usize) -> Self {
        self.indent = Some(width);
        self
    }

    /// Write everything on one line.
    pub fn compact(mut self) -> Self {
        self.indent = None;
        self
    }

    /// Omit the `<?xpacket?>` processing instructions.
    ///
    /// Useful when the output is embedded into a larger document that
    /// provides its own wrapper.
    pub fn omit_packet_wrapper(mut self) -> Self {
        self.packet_wrapper = false;
        self
    }

    /// Ask for `prefix` to be used for namespace `uri`.
    ///
    /// The request is ignored if the namespace has a built-in prefix, or if
    /// the prefix is not usable or already taken.
    pub fn prefer_prefix(mut self, uri: impl Into<String>, prefix: impl Into<String>) -> Self {
        self.preferred_prefixes.insert(uri.into(), prefix.into());
        self
    }
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            indent: Some(2),
            packet_wrapper: true,
            preferred_prefixes: BTreeMap::new(),
        }
    }
}
