//! XMP XML/RDF serializer
//!
//! This module turns a [`Packet`] into RDF/XML. Every value is written in
//! the most compact of the RDF forms that decodes back to the same value.

use crate::core::error::XmpResult;
use crate::core::namespace::{ns, PrefixMap};
use crate::core::node::{ArrayValue, StructValue, TextValue, UriValue, Value};
use crate::core::options::SerializeOptions;
use crate::core::packet::Packet;
use crate::core::token::{Attribute, StartElement, Token, TokenWriter};
use crate::types::name::QualifiedName;
use crate::types::qualifier::Qualifiers;
use std::collections::{BTreeSet, HashSet};

/// `id` of the `<?xpacket begin?>` instruction, fixed by ISO 16684-1
const XPACKET_ID: &str = "W5M0MpCehiHzreSzNTczkc9d";

/// Serializer for XMP Packets
#[derive(Debug, Clone, Default)]
pub struct XmpSerializer {
    options: SerializeOptions,
}

impl XmpSerializer {
    /// Create a new XMP serializer with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a serializer with the given options
    pub fn with_options(options: SerializeOptions) -> Self {
        Self { options }
    }

    /// The options of this serializer
    pub fn options(&self) -> &SerializeOptions {
        &self.options
    }

    /// Serialize a packet to an XML string
    pub fn serialize(&self, packet: &Packet) -> XmpResult<String> {
        let prefixes = self.prefix_map(packet);
        let tokens = self.packet_tokens(packet, &prefixes);

        let mut writer = TokenWriter::new(&prefixes, self.options.indent);
        writer.write_all(&tokens)?;
        writer.finish()
    }

    /// Assign a prefix to every namespace used in `packet`
    pub fn prefix_map(&self, packet: &Packet) -> PrefixMap {
        let mut namespaces = BTreeSet::new();
        for (name, value) in packet.properties() {
            namespaces.insert(name.namespace.clone());
            value.collect_namespaces(&mut namespaces);
        }
        PrefixMap::for_namespaces(
            namespaces.iter().map(String::as_str),
            &self.options.preferred_prefixes,
        )
    }

    /// The complete token stream of a packet
    ///
    /// `prefixes` must cover every namespace in the packet, see
    /// [`prefix_map`](Self::prefix_map).
    pub fn packet_tokens(&self, packet: &Packet, prefixes: &PrefixMap) -> Vec<Token> {
        let rdf = QualifiedName::new(ns::RDF, "RDF");
        let description = QualifiedName::new(ns::RDF, "Description");
        let mut tokens = Vec::new();

        if self.options.packet_wrapper {
            tokens.push(Token::ProcessingInstruction {
                target: "xpacket".to_string(),
                body: format!("begin=\"\u{FEFF}\" id=\"{}\"", XPACKET_ID),
            });
            tokens.push(Token::Text("\n".to_string()));
        }

        let declarations = prefixes
            .iter()
            .filter(|(uri, _)| *uri != ns::XML)
            .map(|(uri, prefix)| Attribute::namespace_declaration(prefix, uri))
            .collect();
        tokens.push(Token::Start(StartElement {
            name: rdf.clone(),
            attributes: declarations,
        }));

        let about = packet.about().map(|u| u.as_str()).unwrap_or_default();
        tokens.push(Token::Start(
            StartElement::new(description.clone())
                .with_attribute(QualifiedName::new(ns::RDF, "about"), about),
        ));

        // properties come out sorted by namespace and local name
        for (name, value) in packet.properties() {
            append_value(&mut tokens, name, value);
        }

        tokens.push(Token::End(description));
        tokens.push(Token::End(rdf));

        if self.options.packet_wrapper {
            tokens.push(Token::Text("\n".to_string()));
            tokens.push(Token::ProcessingInstruction {
                target: "xpacket".to_string(),
                body: "end=\"w\"".to_string(),
            });
        }
        tokens
    }
}

/// Encode a single value as a property element named `name`
pub fn encode_value(name: &QualifiedName, value: &Value) -> Vec<Token> {
    let mut tokens = Vec::new();
    append_value(&mut tokens, name, value);
    tokens
}

fn append_value(tokens: &mut Vec<Token>, name: &QualifiedName, value: &Value) {
    match value {
        Value::Text(v) => append_text(tokens, name, v),
        Value::Uri(v) => append_uri(tokens, name, v),
        Value::Struct(v) => append_struct(tokens, name, v),
        Value::Array(v) => append_array(tokens, name, v),
    }
}

fn rdf_value() -> QualifiedName {
    QualifiedName::new(ns::RDF, "value")
}

/// Start tag of a property element, with the `xml:lang` attribute if the
/// value has a language
fn property_start(name: &QualifiedName, qualifiers: &Qualifiers) -> StartElement {
    let start = StartElement::new(name.clone());
    match qualifiers.language() {
        Some(lang) => start.with_attribute(QualifiedName::new(ns::XML, "lang"), lang),
        None => start,
    }
}

fn with_parse_type_resource(start: StartElement) -> StartElement {
    start.with_attribute(QualifiedName::new(ns::RDF, "parseType"), "Resource")
}

/// Qualifiers can be written as attributes if they are all simple and no
/// name repeats.
fn qualifiers_fit_attributes(qualifiers: &Qualifiers) -> bool {
    let mut seen = HashSet::new();
    qualifiers.all_simple() && qualifiers.iter().all(|q| seen.insert(&q.name))
}

/// Add every qualifier as an attribute; all qualifiers must be simple
fn push_qualifier_attributes(start: &mut StartElement, qualifiers: &Qualifiers) {
    for q in qualifiers {
        if let Some(text) = q.value.as_text() {
            start
                .attributes
                .push(Attribute::new(q.name.clone(), text.value.as_str()));
        }
    }
}

/// Write the non-language qualifiers as sibling properties
fn append_general_qualifiers(tokens: &mut Vec<Token>, qualifiers: &Qualifiers) {
    for q in qualifiers.iter().filter(|q| !q.is_language()) {
        append_value(tokens, &q.name, &q.value);
    }
}

fn append_text(tokens: &mut Vec<Token>, name: &QualifiedName, v: &TextValue) {
    if !v.qualifiers.has_general() {
        // <test:prop xml:lang="de">value</test:prop>
        tokens.push(Token::Start(property_start(name, &v.qualifiers)));
        tokens.push(Token::Text(v.value.clone()));
        tokens.push(Token::End(name.clone()));
    } else if qualifiers_fit_attributes(&v.qualifiers) {
        // <test:prop xml:lang="de" test:q="q" rdf:value="value"/>
        let mut start = StartElement::new(name.clone());
        push_qualifier_attributes(&mut start, &v.qualifiers);
        start
            .attributes
            .push(Attribute::new(rdf_value(), v.value.as_str()));
        tokens.push(Token::Start(start));
        tokens.push(Token::End(name.clone()));
    } else {
        // <test:prop xml:lang="de" rdf:parseType="Resource">
        //   <rdf:value>value</rdf:value>
        //   <test:q>...</test:q>
        // </test:prop>
        let start = with_parse_type_resource(property_start(name, &v.qualifiers));
        tokens.push(Token::Start(start));
        tokens.push(Token::Start(StartElement::new(rdf_value())));
        tokens.push(Token::Text(v.value.clone()));
        tokens.push(Token::End(rdf_value()));
        append_general_qualifiers(tokens, &v.qualifiers);
        tokens.push(Token::End(name.clone()));
    }
}

fn append_uri(tokens: &mut Vec<Token>, name: &QualifiedName, v: &UriValue) {
    let resource = QualifiedName::new(ns::RDF, "resource");
    if !v.qualifiers.has_general() {
        // <test:prop xml:lang="de" rdf:resource="http://example.com"/>
        let start = property_start(name, &v.qualifiers).with_attribute(resource, v.value.as_str());
        tokens.push(Token::Start(start));
        tokens.push(Token::End(name.clone()));
    } else if qualifiers_fit_attributes(&v.qualifiers) {
        // <test:prop test:q="q" rdf:resource="http://example.com"/>
        let mut start = StartElement::new(name.clone());
        push_qualifier_attributes(&mut start, &v.qualifiers);
        start
            .attributes
            .push(Attribute::new(resource, v.value.as_str()));
        tokens.push(Token::Start(start));
        tokens.push(Token::End(name.clone()));
    } else {
        // <test:prop rdf:parseType="Resource">
        //   <rdf:value rdf:resource="http://example.com"/>
        //   <test:q>...</test:q>
        // </test:prop>
        let start = with_parse_type_resource(property_start(name, &v.qualifiers));
        tokens.push(Token::Start(start));
        tokens.push(Token::Start(
            StartElement::new(rdf_value()).with_attribute(resource, v.value.as_str()),
        ));
        tokens.push(Token::End(rdf_value()));
        append_general_qualifiers(tokens, &v.qualifiers);
        tokens.push(Token::End(name.clone()));
    }
}

fn append_struct(tokens: &mut Vec<Token>, name: &QualifiedName, v: &StructValue) {
    if v.qualifiers.has_general() {
        // <test:prop rdf:parseType="Resource">
        //   <rdf:value rdf:parseType="Resource">fields</rdf:value>
        //   <test:q>...</test:q>
        // </test:prop>
        let start = with_parse_type_resource(property_start(name, &v.qualifiers));
        tokens.push(Token::Start(start));
        tokens.push(Token::Start(with_parse_type_resource(StartElement::new(
            rdf_value(),
        ))));
        for (field, value) in v.fields() {
            append_value(tokens, field, value);
        }
        tokens.push(Token::End(rdf_value()));
        append_general_qualifiers(tokens, &v.qualifiers);
        tokens.push(Token::End(name.clone()));
    } else if !v.is_empty() && v.all_simple() {
        // <test:prop xml:lang="de" test:a="1" test:b="2"/>
        let mut start = property_start(name, &v.qualifiers);
        for (field, value) in v.fields() {
            if let Some(text) = value.as_text() {
                start
                    .attributes
                    .push(Attribute::new(field.clone(), text.value.as_str()));
            }
        }
        tokens.push(Token::Start(start));
        tokens.push(Token::End(name.clone()));
    } else {
        // <test:prop rdf:parseType="Resource">fields</test:prop>
        let start = with_parse_type_resource(property_start(name, &v.qualifiers));
        tokens.push(Token::Start(start));
        for (field, value) in v.fields() {
            append_value(tokens, field, value);
        }
        tokens.push(Token::End(name.clone()));
    }
}

fn append_array(tokens: &mut Vec<Token>, name: &QualifiedName, v: &ArrayValue) {
    let envelope = QualifiedName::new(ns::RDF, v.kind().rdf_type());
    let li = QualifiedName::new(ns::RDF, "li");

    if v.qualifiers.has_general() {
        // <test:prop rdf:parseType="Resource">
        //   <rdf:value><rdf:Seq>items</rdf:Seq></rdf:value>
        //   <test:q>...</test:q>
        // </test:prop>
        let start = with_parse_type_resource(property_start(name, &v.qualifiers));
        tokens.push(Token::Start(start));
        tokens.push(Token::Start(StartElement::new(rdf_value())));
        tokens.push(Token::Start(StartElement::new(envelope.clone())));
        for item in &v.items {
            append_value(tokens, &li, item);
        }
        tokens.push(Token::End(envelope));
        tokens.push(Token::End(rdf_value()));
        append_general_qualifiers(tokens, &v.qualifiers);
        tokens.push(Token::End(name.clone()));
    } else {
        // <test:prop><rdf:Seq>items</rdf:Seq></test:prop>
        tokens.push(Token::Start(property_start(name, &v.qualifiers)));
        tokens.push(Token::Start(StartElement::new(envelope.clone())));
        for item in &v.items {
            append_value(tokens, &li, item);
        }
        tokens.push(Token::End(envelope));
        tokens.push(Token::End(name.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::node::ArrayKind;
    use pretty_assertions::assert_eq;

    const TEST_NS: &str = "http://ns.example.com/test/";

    fn test_name(local: &str) -> QualifiedName {
        QualifiedName::new(TEST_NS, local)
    }

    /// Encode one property and render it without indentation
    fn render(value: Value) -> String {
        let name = test_name("prop");
        let mut prefixes = PrefixMap::new();
        prefixes.register(TEST_NS, "test").unwrap();
        let mut writer = TokenWriter::new(&prefixes, None);
        writer.write_all(&encode_value(&name, &value)).unwrap();
        writer.finish().unwrap()
    }

    #[test]
    fn test_text_forms() {
        assert_eq!(render(Value::text("v")), "<test:prop>v</test:prop>");
        assert_eq!(
            render(Value::text("Hallo").with_language("de")),
            r#"<test:prop xml:lang="de">Hallo</test:prop>"#
        );
        assert_eq!(render(Value::text("")), "<test:prop/>");

        let v = Value::text("v")
            .with_qualifier(test_name("q"), Value::text("x"))
            .unwrap()
            .with_language("de");
        assert_eq!(
            render(v),
            r#"<test:prop xml:lang="de" test:q="x" rdf:value="v"/>"#
        );

        let v = Value::text("v")
            .with_qualifier(test_name("q"), Value::uri("urn:x").unwrap())
            .unwrap();
        assert_eq!(
            render(v),
            r#"<test:prop rdf:parseType="Resource"><rdf:value>v</rdf:value><test:q rdf:resource="urn:x"/></test:prop>"#
        );
    }

    #[test]
    fn test_repeated_qualifier_names_use_elements() {
        let v = Value::text("v")
            .with_qualifier(test_name("q"), Value::text("1"))
            .unwrap()
            .with_qualifier(test_name("q"), Value::text("2"))
            .unwrap();
        assert_eq!(
            render(v),
            r#"<test:prop rdf:parseType="Resource"><rdf:value>v</rdf:value><test:q>1</test:q><test:q>2</test:q></test:prop>"#
        );
    }

    #[test]
    fn test_uri_forms() {
        assert_eq!(
            render(Value::uri("http://example.com").unwrap()),
            r#"<test:prop rdf:resource="http://example.com"/>"#
        );
        let v = Value::uri("http://example.com")
            .unwrap()
            .with_qualifier(test_name("q"), Value::text("x"))
            .unwrap();
        assert_eq!(
            render(v),
            r#"<test:prop test:q="x" rdf:resource="http://example.com"/>"#
        );
        let v = Value::uri("http://example.com")
            .unwrap()
            .with_qualifier(test_name("q"), Value::text("x").with_language("en"))
            .unwrap();
        assert_eq!(
            render(v),
            r#"<test:prop rdf:parseType="Resource"><rdf:value rdf:resource="http://example.com"/><test:q xml:lang="en">x</test:q></test:prop>"#
        );
    }

    #[test]
    fn test_struct_forms() {
        let simple = Value::structure([
            (test_name("b"), Value::text("2")),
            (test_name("a"), Value::text("1")),
        ])
        .unwrap();
        assert_eq!(render(simple.clone()), r#"<test:prop test:a="1" test:b="2"/>"#);

        assert_eq!(
            render(Value::structure(Vec::new()).unwrap()),
            r#"<test:prop rdf:parseType="Resource"/>"#
        );

        let nested = Value::structure([(test_name("a"), Value::text("1").with_language("en"))]).unwrap();
        assert_eq!(
            render(nested),
            r#"<test:prop rdf:parseType="Resource"><test:a xml:lang="en">1</test:a></test:prop>"#
        );

        let qualified = simple
            .with_qualifier(test_name("q"), Value::text("x"))
            .unwrap();
        assert_eq!(
            render(qualified),
            r#"<test:prop rdf:parseType="Resource"><rdf:value rdf:parseType="Resource"><test:a>1</test:a><test:b>2</test:b></rdf:value><test:q>x</test:q></test:prop>"#
        );
    }

    #[test]
    fn test_array_forms() {
        let array = Value::array(ArrayKind::Ordered, [Value::text("1"), Value::text("2")]);
        assert_eq!(
            render(array.clone()),
            "<test:prop><rdf:Seq><rdf:li>1</rdf:li><rdf:li>2</rdf:li></rdf:Seq></test:prop>"
        );

        let qualified = array
            .with_qualifier(test_name("q"), Value::text("x"))
            .unwrap();
        assert_eq!(
            render(qualified),
            r#"<test:prop rdf:parseType="Resource"><rdf:value><rdf:Seq><rdf:li>1</rdf:li><rdf:li>2</rdf:li></rdf:Seq></rdf:value><test:q>x</test:q></test:prop>"#
        );

        let alt = Value::array(
            ArrayKind::Alternative,
            [Value::text("a").with_language("x-default")],
        );
        assert_eq!(
            render(alt),
            r#"<test:prop><rdf:Alt><rdf:li xml:lang="x-default">a</rdf:li></rdf:Alt></test:prop>"#
        );
    }

    #[test]
    fn test_serialize_packet() {
        let mut packet = Packet::new();
        packet
            .set_property(QualifiedName::new(ns::XMP, "CreatorTool"), Value::text("TestApp"))
            .unwrap();
        packet
            .set_property(test_name("prop"), Value::text("v"))
            .unwrap();

        let serializer = XmpSerializer::with_options(SerializeOptions::new().compact());
        let xml = serializer.serialize(&packet).unwrap();
        assert_eq!(
            xml,
            concat!(
                "<?xpacket begin=\"\u{FEFF}\" id=\"W5M0MpCehiHzreSzNTczkc9d\"?>\n",
                "<rdf:RDF xmlns:xmp=\"http://ns.adobe.com/xap/1.0/\" ",
                "xmlns:test=\"http://ns.example.com/test/\" ",
                "xmlns:rdf=\"http://www.w3.org/1999/02/22-rdf-syntax-ns#\">",
                "<rdf:Description rdf:about=\"\">",
                "<xmp:CreatorTool>TestApp</xmp:CreatorTool>",
                "<test:prop>v</test:prop>",
                "</rdf:Description></rdf:RDF>\n",
                "<?xpacket end=\"w\"?>",
            )
        );
    }

    #[test]
    fn test_serialize_without_wrapper() {
        let mut packet = Packet::new();
        packet.set_about(Some(crate::core::node::parse_uri("urn:x").unwrap()));
        let serializer =
            XmpSerializer::with_options(SerializeOptions::new().compact().omit_packet_wrapper());
        let xml = serializer.serialize(&packet).unwrap();
        assert_eq!(
            xml,
            r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"><rdf:Description rdf:about="urn:x"/></rdf:RDF>"#
        );
    }

    #[test]
    fn test_prefix_map_covers_qualifiers() {
        let mut packet = Packet::new();
        let v = Value::text("v")
            .with_qualifier(QualifiedName::new("http://q.example.com/quals/", "q"), Value::text("x"))
            .unwrap();
        packet.set_property(test_name("prop"), v).unwrap();
        let prefixes = XmpSerializer::new().prefix_map(&packet);
        assert_eq!(prefixes.get_prefix("http://q.example.com/quals/"), Some("quals"));
        assert_eq!(prefixes.get_prefix(TEST_NS), Some("test"));
    }
}
