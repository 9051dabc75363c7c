//! Namespace-resolved XML token stream
//!
//! The codec never looks at raw XML. [`TokenReader`] turns a document into a
//! flat sequence of [`Token`]s with every element and attribute name resolved
//! to a [`QualifiedName`]; [`TokenWriter`] turns such a sequence back into
//! text, picking prefixes from a [`PrefixMap`]. Both are thin adapters over
//! `quick-xml`.

use crate::core::error::{XmpError, XmpResult};
use crate::core::namespace::{ns, PrefixMap};
use crate::types::name::QualifiedName;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesEnd, BytesPI, BytesStart, BytesText, Event};
use quick_xml::name::{QName, ResolveResult};
use quick_xml::{NsReader, Writer};

/// An attribute of a start element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// The attribute name
    pub name: QualifiedName,
    /// The attribute value, unescaped
    pub value: String,
}

impl Attribute {
    /// Create a new attribute
    pub fn new(name: QualifiedName, value: impl Into<String>) -> Self {
        Self {
            name,
            value: value.into(),
        }
    }

    /// Create an `xmlns:<prefix>="<uri>"` declaration
    pub fn namespace_declaration(prefix: &str, uri: &str) -> Self {
        Self::new(QualifiedName::new(ns::XMLNS, prefix), uri)
    }

    /// Check whether this is a namespace declaration
    pub fn is_namespace_declaration(&self) -> bool {
        self.name.namespace == ns::XMLNS
    }
}

/// The opening tag of an element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartElement {
    /// The element name
    pub name: QualifiedName,
    /// Attributes in document order
    pub attributes: Vec<Attribute>,
}

impl StartElement {
    /// Create a start element without attributes
    pub fn new(name: QualifiedName) -> Self {
        Self {
            name,
            attributes: Vec::new(),
        }
    }

    /// Add an attribute, builder style
    pub fn with_attribute(mut self, name: QualifiedName, value: impl Into<String>) -> Self {
        self.attributes.push(Attribute::new(name, value));
        self
    }

    /// Get the value of the attribute `namespace`:`local`
    pub fn attribute(&self, namespace: &str, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.is(namespace, local))
            .map(|a| a.value.as_str())
    }
}

/// One event of the token stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Start of an element
    Start(StartElement),
    /// End of an element
    End(QualifiedName),
    /// Character data
    Text(String),
    /// A processing instruction such as `<?xpacket ...?>`
    ProcessingInstruction {
        /// The PI target, e.g. `xpacket`
        target: String,
        /// Everything after the target
        body: String,
    },
}

impl Token {
    /// Check whether this is a start tag
    pub fn is_start(&self) -> bool {
        matches!(self, Token::Start(_))
    }

    /// Check whether this is character data
    pub fn is_text(&self) -> bool {
        matches!(self, Token::Text(_))
    }
}

/// Reads namespace-resolved tokens from an XML document
///
/// Self-closing elements are reported as a start followed by an end token.
/// Adjacent character data (text, CDATA sections, entity references) is
/// merged into one [`Token::Text`]. Comments, the XML declaration and
/// doctype are skipped.
pub struct TokenReader<'a> {
    reader: NsReader<&'a [u8]>,
    text: String,
    queued: Option<Token>,
    done: bool,
}

impl<'a> TokenReader<'a> {
    /// Create a reader over `xml`
    pub fn new(xml: &'a str) -> Self {
        let mut reader = NsReader::from_str(xml);
        reader.config_mut().expand_empty_elements = true;
        Self {
            reader,
            text: String::new(),
            queued: None,
            done: false,
        }
    }

    fn resolve_element(&self, name: QName<'_>) -> XmpResult<QualifiedName> {
        let (namespace, local) = self.reader.resolve_element(name);
        let local = String::from_utf8_lossy(local.as_ref()).to_string();
        match namespace {
            ResolveResult::Bound(ns) => Ok(QualifiedName::new(
                String::from_utf8_lossy(ns.as_ref()).to_string(),
                local,
            )),
            ResolveResult::Unbound => Ok(QualifiedName::new("", local)),
            ResolveResult::Unknown(prefix) => Err(XmpError::ParseError(format!(
                "Unknown prefix {}:",
                String::from_utf8_lossy(&prefix)
            ))),
        }
    }

    /// Resolve an attribute name. Returns `None` for namespace declarations.
    fn resolve_attribute(&self, key: QName<'_>) -> XmpResult<Option<QualifiedName>> {
        let raw = key.as_ref();
        if raw == b"xmlns" || raw.starts_with(b"xmlns:") {
            return Ok(None);
        }
        if let Some(local) = raw.strip_prefix(b"xml:") {
            return Ok(Some(QualifiedName::new(
                ns::XML,
                String::from_utf8_lossy(local).to_string(),
            )));
        }
        let (namespace, local) = self.reader.resolve_attribute(key);
        let local = String::from_utf8_lossy(local.as_ref()).to_string();
        match namespace {
            ResolveResult::Bound(ns) => Ok(Some(QualifiedName::new(
                String::from_utf8_lossy(ns.as_ref()).to_string(),
                local,
            ))),
            ResolveResult::Unbound => Ok(Some(QualifiedName::new("", local))),
            ResolveResult::Unknown(prefix) => Err(XmpError::ParseError(format!(
                "Unknown prefix {}:",
                String::from_utf8_lossy(&prefix)
            ))),
        }
    }

    fn start_element(&self, e: &BytesStart<'_>) -> XmpResult<StartElement> {
        let mut start = StartElement::new(self.resolve_element(e.name())?);
        for attr in e.attributes() {
            let attr = attr
                .map_err(|e| XmpError::ParseError(format!("Invalid attribute: {}", e)))?;
            let Some(name) = self.resolve_attribute(attr.key)? else {
                continue;
            };
            // Decode XML entities in attribute values (e.g., &quot; -> ")
            let raw_value = String::from_utf8_lossy(attr.value.as_ref());
            let value = unescape(&raw_value)
                .map_err(|e| XmpError::ParseError(format!("Invalid attribute value: {}", e)))?;
            start.attributes.push(Attribute::new(name, value));
        }
        Ok(start)
    }

    /// Read the next non-text token, accumulating character data on the way
    fn read_token(&mut self) -> XmpResult<Option<Token>> {
        loop {
            match self.reader.read_event() {
                Ok(Event::Start(e)) => return Ok(Some(Token::Start(self.start_element(&e)?))),
                Ok(Event::End(e)) => {
                    return Ok(Some(Token::End(self.resolve_element(e.name())?)));
                }
                Ok(Event::Empty(_)) => {
                    return Err(XmpError::InternalError(
                        "The expand_empty_elements option must be enabled".to_string(),
                    ));
                }
                Ok(Event::Text(e)) => {
                    let raw_text = String::from_utf8_lossy(e.as_ref());
                    let text = unescape(&raw_text)
                        .map_err(|e| XmpError::ParseError(format!("Invalid text: {}", e)))?;
                    self.text.push_str(&text);
                }
                Ok(Event::CData(e)) => {
                    self.text.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
                Ok(Event::GeneralRef(e)) => {
                    let entity = format!("&{};", String::from_utf8_lossy(e.as_ref()));
                    let text = unescape(&entity)
                        .map_err(|e| XmpError::ParseError(format!("Invalid reference: {}", e)))?;
                    self.text.push_str(&text);
                }
                Ok(Event::PI(e)) => {
                    return Ok(Some(Token::ProcessingInstruction {
                        target: String::from_utf8_lossy(e.target()).to_string(),
                        body: String::from_utf8_lossy(e.content()).trim_start().to_string(),
                    }));
                }
                Ok(Event::Eof) => return Ok(None),
                Ok(Event::Comment(_)) | Ok(Event::Decl(_)) | Ok(Event::DocType(_)) => {}
                Err(e) => {
                    return Err(XmpError::ParseError(format!("XML parsing error: {}", e)));
                }
            }
        }
    }
}

impl Iterator for TokenReader<'_> {
    type Item = XmpResult<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(token) = self.queued.take() {
            return Some(Ok(token));
        }
        if self.done {
            return None;
        }
        match self.read_token() {
            Ok(Some(token)) => {
                if self.text.is_empty() {
                    return Some(Ok(token));
                }
                // text ends where the next markup starts
                self.queued = Some(token);
                Some(Ok(Token::Text(std::mem::take(&mut self.text))))
            }
            Ok(None) => {
                self.done = true;
                if self.text.is_empty() {
                    None
                } else {
                    Some(Ok(Token::Text(std::mem::take(&mut self.text))))
                }
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Read every token of `xml`
pub fn read_tokens(xml: &str) -> XmpResult<Vec<Token>> {
    TokenReader::new(xml).collect()
}

/// Writes tokens as XML text
///
/// A start token immediately followed by its end token is written as a
/// self-closing element; empty text tokens are dropped. Attribute and sibling
/// order are kept as given.
pub struct TokenWriter<'m> {
    writer: Writer<Vec<u8>>,
    prefixes: &'m PrefixMap,
    pending: Option<BytesStart<'static>>,
}

impl<'m> TokenWriter<'m> {
    /// Create a writer; `indent` is the number of spaces per level, `None`
    /// writes everything on one line.
    pub fn new(prefixes: &'m PrefixMap, indent: Option<usize>) -> Self {
        let writer = match indent {
            Some(n) => Writer::new_with_indent(Vec::new(), b' ', n),
            None => Writer::new(Vec::new()),
        };
        Self {
            writer,
            prefixes,
            pending: None,
        }
    }

    /// Write one token
    pub fn write(&mut self, token: &Token) -> XmpResult<()> {
        match token {
            Token::Start(start) => {
                self.flush()?;
                let mut elem = BytesStart::new(self.prefixes.qualify(&start.name)?);
                for attr in &start.attributes {
                    let key = if attr.is_namespace_declaration() {
                        format!("xmlns:{}", attr.name.local)
                    } else {
                        self.prefixes.qualify(&attr.name)?
                    };
                    elem.push_attribute((key.as_str(), attr.value.as_str()));
                }
                self.pending = Some(elem);
            }
            Token::End(name) => match self.pending.take() {
                Some(elem) => self.writer.write_event(Event::Empty(elem))?,
                None => {
                    let name = self.prefixes.qualify(name)?;
                    self.writer.write_event(Event::End(BytesEnd::new(name)))?;
                }
            },
            Token::Text(text) => {
                if text.is_empty() {
                    return Ok(());
                }
                self.flush()?;
                self.writer.write_event(Event::Text(BytesText::new(text)))?;
            }
            Token::ProcessingInstruction { target, body } => {
                self.flush()?;
                let content = if body.is_empty() {
                    target.clone()
                } else {
                    format!("{} {}", target, body)
                };
                self.writer.write_event(Event::PI(BytesPI::new(content)))?;
            }
        }
        Ok(())
    }

    /// Write every token of a sequence
    pub fn write_all<'t>(&mut self, tokens: impl IntoIterator<Item = &'t Token>) -> XmpResult<()> {
        for token in tokens {
            self.write(token)?;
        }
        Ok(())
    }

    fn flush(&mut self) -> XmpResult<()> {
        if let Some(elem) = self.pending.take() {
            self.writer.write_event(Event::Start(elem))?;
        }
        Ok(())
    }

    /// Finish writing and return the document
    pub fn finish(mut self) -> XmpResult<String> {
        self.flush()?;
        String::from_utf8(self.writer.into_inner())
            .map_err(|e| XmpError::SerializationError(format!("UTF-8 encoding error: {}", e)))
    }
}
