//! XMP XML/RDF parser
//!
//! This module turns an RDF/XML document into a [`Packet`]. The whole token
//! stream is read first; each property element is then decoded from the
//! slice of tokens it encloses, using the [`classify`] step to pick the
//! grammar production.
//!
//! Invalid names and RDF forms that XMP does not use are dropped with a
//! debug log message. Structural errors abort decoding.

use crate::core::classify::{classify, PropertyElementKind};
use crate::core::error::{XmpError, XmpResult};
use crate::core::namespace::ns;
use crate::core::node::{parse_uri, ArrayKind, ArrayValue, StructValue, TextValue, UriValue, Value};
use crate::core::options::ParseOptions;
use crate::core::packet::Packet;
use crate::core::token::{read_tokens, Attribute, StartElement, Token};
use crate::types::name::QualifiedName;
use crate::types::qualifier::{Qualifier, Qualifiers};

/// A child element: its start tag and the tokens up to (not including) its
/// end tag
type Element<'t> = (&'t StartElement, &'t [Token]);

/// Parser for XMP Packets
#[derive(Debug, Clone, Default)]
pub struct XmpParser {
    options: ParseOptions,
}

impl XmpParser {
    /// Create a new XMP parser with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser with the given options
    pub fn with_options(options: ParseOptions) -> Self {
        Self { options }
    }

    /// The options of this parser
    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Parse an XMP Packet from a string
    ///
    /// Everything outside `rdf:RDF` elements (an `x:xmpmeta` wrapper,
    /// `<?xpacket?>` instructions, padding) is ignored.
    pub fn parse(&self, xml: &str) -> XmpResult<Packet> {
        let tokens = read_tokens(xml)?;
        self.parse_tokens(&tokens)
    }

    /// Parse an XMP Packet from a token stream
    pub fn parse_tokens(&self, tokens: &[Token]) -> XmpResult<Packet> {
        let mut packet = Packet::new();
        let mut i = 0;
        while i < tokens.len() {
            let Token::Start(start) = &tokens[i] else {
                i += 1;
                continue;
            };
            if !start.name.is(ns::RDF, "RDF") {
                // descend into wrapper elements
                i += 1;
                continue;
            }
            let end = matching_end(tokens, i)?;
            self.decode_rdf(&tokens[i + 1..end], &mut packet)?;
            i = end + 1;
        }
        Ok(packet)
    }

    /// Decode one property element
    ///
    /// `start` is the opening tag and `body` the enclosed tokens, without the
    /// closing tag. Returns `None` if the element carries no value XMP can
    /// represent.
    pub fn decode_property(&self, start: &StartElement, body: &[Token]) -> XmpResult<Option<Value>> {
        self.decode(start, body, Qualifiers::new(), 0)
    }

    fn decode_rdf(&self, body: &[Token], packet: &mut Packet) -> XmpResult<()> {
        for (start, content) in child_elements(body)? {
            if start.name.is(ns::RDF, "Description") {
                self.decode_description(start, content, packet)?;
            } else {
                log::warn!("ignoring top-level node element {}", start.name);
            }
        }
        Ok(())
    }

    fn decode_description(
        &self,
        start: &StartElement,
        body: &[Token],
        packet: &mut Packet,
    ) -> XmpResult<()> {
        for attr in &start.attributes {
            let name = &attr.name;
            if name.is(ns::RDF, "about") {
                merge_about(packet, &attr.value)?;
            } else if is_ignored_description_attribute(name) {
                continue;
            } else if name.is_valid_property_name() {
                // Simple unqualified properties may be written as attributes
                // of rdf:Description.
                packet.insert_property(name.clone(), Value::text(attr.value.as_str()));
            } else {
                log::debug!("dropping attribute property with invalid name {}", name);
            }
        }

        for (prop, content) in child_elements(body)? {
            if !prop.name.is_valid_property_name() {
                log::debug!("dropping property with invalid name {}", prop.name);
                continue;
            }
            if let Some(value) = self.decode(prop, content, Qualifiers::new(), 0)? {
                packet.insert_property(prop.name.clone(), value);
            }
        }
        Ok(())
    }

    /// Decode a property element, adding `inherited` to the qualifiers of
    /// the result. A language on the element itself overrides an inherited
    /// one.
    fn decode(
        &self,
        start: &StartElement,
        body: &[Token],
        inherited: Qualifiers,
        depth: usize,
    ) -> XmpResult<Option<Value>> {
        if depth > self.options.max_depth {
            return Err(XmpError::ParseError(format!(
                "property elements nested deeper than {}",
                self.options.max_depth
            )));
        }

        let kind = classify(start, body);
        log::trace!("{} classified as {:?}", start.name, kind);
        let value = match kind {
            PropertyElementKind::Literal => Some(self.decode_literal(start, body, inherited)),
            PropertyElementKind::Resource => self.decode_resource(start, body, inherited, depth)?,
            PropertyElementKind::ParseTypeResource => {
                let qualifiers = with_inherited(lang_qualifier(start), inherited);
                let children = child_elements(body)?;
                self.decode_node(&[], &children, qualifiers, depth)?
            }
            PropertyElementKind::Empty => self.decode_empty(start, inherited),
            PropertyElementKind::ParseTypeLiteral
            | PropertyElementKind::ParseTypeCollection
            | PropertyElementKind::ParseTypeOther => {
                log::debug!("dropping {}: {:?} is not allowed in XMP", start.name, kind);
                None
            }
        };

        Ok(value)
    }

    fn decode_literal(&self, start: &StartElement, body: &[Token], inherited: Qualifiers) -> Value {
        let mut qualifiers = Qualifiers::new();
        for attr in &start.attributes {
            if attr.name.is(ns::RDF, "ID") || attr.name.is(ns::RDF, "datatype") {
                continue;
            }
            push_attribute_qualifier(&mut qualifiers, &attr.name, &attr.value);
        }

        let value: String = body
            .iter()
            .filter_map(|t| match t {
                Token::Text(s) => Some(s.as_str()),
                _ => None,
            })
            .collect();

        Value::Text(TextValue {
            value,
            qualifiers: with_inherited(qualifiers, inherited),
        })
    }

    fn decode_resource(
        &self,
        start: &StartElement,
        body: &[Token],
        inherited: Qualifiers,
        depth: usize,
    ) -> XmpResult<Option<Value>> {
        let children = child_elements(body)?;
        let Some(&(node, content)) = children.first() else {
            return Ok(None);
        };
        if children.len() > 1 {
            log::warn!(
                "{}: ignoring {} surplus node elements",
                start.name,
                children.len() - 1
            );
        }

        let mut qualifiers = with_inherited(lang_qualifier(start), inherited);
        let name = &node.name;

        if name.namespace == ns::RDF {
            if let Some(kind) = ArrayKind::from_rdf_type(&name.local) {
                let mut array = ArrayValue::new(kind);
                for (item, item_content) in child_elements(content)? {
                    if !item.name.is(ns::RDF, "li") {
                        log::debug!("{}: ignoring array child {}", start.name, item.name);
                        continue;
                    }
                    if let Some(v) = self.decode(item, item_content, Qualifiers::new(), depth + 1)? {
                        array.append(v);
                    }
                }
                array.qualifiers = qualifiers;
                return Ok(Some(Value::Array(array)));
            }
        }

        if !name.is(ns::RDF, "Description") {
            // typed node: the element name is the type of the value
            match parse_uri(format!("{}{}", name.namespace, name.local)) {
                Ok(uri) => qualifiers.push(Qualifier::new(
                    QualifiedName::new(ns::RDF, "type"),
                    Value::Uri(UriValue {
                        value: uri,
                        qualifiers: Qualifiers::new(),
                    }),
                )),
                Err(e) => log::debug!("dropping type of typed node {}: {}", name, e),
            }
        }

        let fields = child_elements(content)?;
        self.decode_node(&node.attributes, &fields, qualifiers, depth)
    }

    /// Decode the content of a node element (or of a `parseType="Resource"`
    /// property element): either a qualified value, if there is an
    /// `rdf:value`, or a struct.
    fn decode_node(
        &self,
        attributes: &[Attribute],
        children: &[Element<'_>],
        qualifiers: Qualifiers,
        depth: usize,
    ) -> XmpResult<Option<Value>> {
        let value_attr = attributes.iter().find(|a| a.name.is(ns::RDF, "value"));
        let value_child = children
            .iter()
            .find(|(start, _)| start.name.is(ns::RDF, "value"));

        if value_attr.is_none() && value_child.is_none() {
            let mut qualifiers = qualifiers;
            let mut s = StructValue::new();
            for attr in attributes {
                if attr.name.is(ns::XML, "lang") {
                    qualifiers = qualifiers.with_language(attr.value.as_str());
                } else if is_node_syntax_attribute(&attr.name) {
                    continue;
                } else if attr.name.is_valid_property_name() {
                    s.insert_field(attr.name.clone(), Value::text(attr.value.as_str()));
                } else {
                    log::debug!("dropping field with invalid name {}", attr.name);
                }
            }
            for (field, content) in children {
                if !field.name.is_valid_property_name() {
                    log::debug!("dropping field with invalid name {}", field.name);
                    continue;
                }
                if let Some(v) = self.decode(field, content, Qualifiers::new(), depth + 1)? {
                    s.insert_field(field.name.clone(), v);
                }
            }
            s.qualifiers = qualifiers;
            return Ok(Some(Value::Struct(s)));
        }

        // qualified value
        let mut own = Qualifiers::new();
        for attr in attributes {
            if attr.name.is(ns::RDF, "value") || is_node_syntax_attribute(&attr.name) {
                continue;
            }
            push_attribute_qualifier(&mut own, &attr.name, &attr.value);
        }
        let mut qualifiers = with_inherited(own, qualifiers);
        let mut seen_value = false;
        for (child, content) in children {
            if child.name.is(ns::RDF, "value") {
                if seen_value || value_attr.is_some() {
                    log::warn!("ignoring surplus rdf:value");
                }
                seen_value = true;
                continue;
            }
            if !child.name.is_valid_qualifier_name() {
                log::debug!("dropping qualifier with invalid name {}", child.name);
                continue;
            }
            let Some(v) = self.decode(child, content, Qualifiers::new(), depth + 1)? else {
                continue;
            };
            if !child.name.is(ns::XML, "lang") {
                qualifiers.push(Qualifier::new(child.name.clone(), v));
                continue;
            }
            match v {
                Value::Text(TextValue { value, qualifiers: q }) if q.is_empty() => {
                    qualifiers = qualifiers.with_language(value);
                }
                other => log::debug!("dropping xml:lang qualifier with value {}", other),
            }
        }

        match (value_attr, value_child) {
            (Some(attr), _) => Ok(Some(Value::Text(TextValue {
                value: attr.value.clone(),
                qualifiers,
            }))),
            (None, Some((start, content))) => self.decode(start, content, qualifiers, depth + 1),
            (None, None) => Ok(None),
        }
    }

    fn decode_empty(&self, start: &StartElement, inherited: Qualifiers) -> Option<Value> {
        // 1. rdf:value: a simple value with qualifiers
        if let Some(value) = start.attribute(ns::RDF, "value") {
            let mut qualifiers = Qualifiers::new();
            for attr in &start.attributes {
                push_attribute_qualifier(&mut qualifiers, &attr.name, &attr.value);
            }
            return Some(Value::Text(TextValue {
                value: value.to_string(),
                qualifiers: with_inherited(qualifiers, inherited),
            }));
        }

        // 2. rdf:resource: a URI value
        if let Some(resource) = start.attribute(ns::RDF, "resource") {
            let uri = match parse_uri(resource) {
                Ok(uri) => uri,
                Err(e) => {
                    log::debug!("dropping {}: {}", start.name, e);
                    return None;
                }
            };
            let mut qualifiers = Qualifiers::new();
            for attr in &start.attributes {
                push_attribute_qualifier(&mut qualifiers, &attr.name, &attr.value);
            }
            return Some(Value::Uri(UriValue {
                value: uri,
                qualifiers: with_inherited(qualifiers, inherited),
            }));
        }

        let qualifiers = with_inherited(lang_qualifier(start), inherited);

        // 3. no property attributes: an empty simple value
        let only_syntax = start.attributes.iter().all(|a| {
            a.name.is(ns::XML, "lang") || a.name.is(ns::RDF, "ID") || a.name.is(ns::RDF, "nodeID")
        });
        if only_syntax {
            return Some(Value::Text(TextValue {
                value: String::new(),
                qualifiers,
            }));
        }

        // 4. a struct with simple fields
        let mut s = StructValue::new();
        for attr in &start.attributes {
            if attr.name.is(ns::XML, "lang") {
                continue;
            }
            if attr.name.is_valid_property_name() {
                s.insert_field(attr.name.clone(), Value::text(attr.value.as_str()));
            } else {
                log::debug!("dropping field with invalid name {}", attr.name);
            }
        }
        s.qualifiers = qualifiers;
        Some(Value::Struct(s))
    }
}

/// Record the subject of an rdf:Description. An empty or unparseable value
/// names no subject and never conflicts.
fn merge_about(packet: &mut Packet, about: &str) -> XmpResult<()> {
    if about.is_empty() {
        return Ok(());
    }
    let uri = match parse_uri(about) {
        Ok(uri) => uri,
        Err(e) => {
            log::debug!("ignoring rdf:about '{}': {}", about, e);
            return Ok(());
        }
    };
    match packet.about() {
        Some(existing) if existing != &uri => Err(XmpError::InconsistentAbout(
            existing.as_str().to_string(),
            uri.as_str().to_string(),
        )),
        Some(_) => Ok(()),
        None => {
            packet.set_about(Some(uri));
            Ok(())
        }
    }
}

/// Attributes of rdf:Description that are neither properties nor the
/// subject URI
fn is_ignored_description_attribute(name: &QualifiedName) -> bool {
    name.is(ns::RDF, "ID")
        || name.is(ns::RDF, "nodeID")
        || name.is(ns::RDF, "datatype")
        || name.is(ns::XML, "lang")
}

/// RDF attributes of node elements that carry no XMP data
fn is_node_syntax_attribute(name: &QualifiedName) -> bool {
    name.namespace == ns::RDF
        && matches!(
            name.local.as_str(),
            "about" | "ID" | "nodeID" | "parseType" | "datatype" | "resource"
        )
}

/// The `xml:lang` attribute of an element, as a qualifier list
fn lang_qualifier(start: &StartElement) -> Qualifiers {
    let mut q = Qualifiers::new();
    if let Some(lang) = start.attribute(ns::XML, "lang") {
        q.push(Qualifier::language(lang));
    }
    q
}

/// Turn an attribute into a simple text qualifier, if its name allows
fn push_attribute_qualifier(qualifiers: &mut Qualifiers, name: &QualifiedName, value: &str) {
    if name.is_valid_qualifier_name() {
        qualifiers.push(Qualifier::new(name.clone(), Value::text(value)));
    } else if name.namespace != ns::RDF {
        log::debug!("dropping qualifier with invalid name {}", name);
    }
}

/// Qualifiers of an element followed by those inherited from its parent.
/// The element's own language wins and is always placed first.
fn with_inherited(own: Qualifiers, inherited: Qualifiers) -> Qualifiers {
    let lang = own
        .language()
        .or_else(|| inherited.language())
        .map(str::to_string);
    let rest: Qualifiers = own
        .iter()
        .chain(inherited.iter())
        .filter(|q| !q.is_language())
        .cloned()
        .collect();
    match lang {
        Some(tag) => rest.with_language(tag),
        None => rest,
    }
}

/// Index of the end token matching the start token at `start`
fn matching_end(tokens: &[Token], start: usize) -> XmpResult<usize> {
    let mut level = 0usize;
    for (i, token) in tokens.iter().enumerate().skip(start) {
        match token {
            Token::Start(_) => level += 1,
            Token::End(_) => {
                level -= 1;
                if level == 0 {
                    return Ok(i);
                }
            }
            _ => {}
        }
    }
    Err(XmpError::ParseError("unterminated element".to_string()))
}

/// Split a token slice into its top-level elements
///
/// Whitespace between elements is skipped; any other character data is a
/// structural error. Processing instructions are ignored.
fn child_elements(tokens: &[Token]) -> XmpResult<Vec<Element<'_>>> {
    let mut children = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        match &tokens[i] {
            Token::Start(start) => {
                let end = matching_end(tokens, i)?;
                children.push((start, &tokens[i + 1..end]));
                i = end + 1;
            }
            Token::Text(text) => {
                if !text.chars().all(char::is_whitespace) {
                    return Err(XmpError::ParseError(format!(
                        "unexpected character data '{}'",
                        text.trim()
                    )));
                }
                i += 1;
            }
            Token::End(name) => {
                return Err(XmpError::ParseError(format!("unexpected end of {}", name)));
            }
            Token::ProcessingInstruction { .. } => i += 1,
        }
    }
    Ok(children)
}
