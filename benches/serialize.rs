use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use xmprdf::{ns, ArrayKind, Packet, QualifiedName, SerializeOptions, Value};

fn create_simple_packet() -> Packet {
    let mut packet = Packet::new();
    packet
        .set_property(QualifiedName::new(ns::XMP, "CreatorTool"), Value::text("TestApp"))
        .unwrap();
    packet
}

fn create_complex_packet() -> Packet {
    let mut packet = Packet::new();
    let props = [
        (ns::XMP, "CreatorTool", "Adobe Photoshop CS2 Windows"),
        (ns::XMP, "CreateDate", "2006-04-25T15:32:01+02:00"),
        (ns::XMP, "ModifyDate", "2006-04-27T15:38:36.655+02:00"),
        (ns::XMP_MM, "DocumentID", "uuid:FE607D9B5FD4DA118B7787757E22306B"),
        (ns::TIFF, "Orientation", "1"),
        (ns::EXIF, "PixelXDimension", "200"),
        (ns::EXIF, "PixelYDimension", "200"),
    ];
    for (namespace, local, value) in props {
        packet
            .set_property(QualifiedName::new(namespace, local), Value::text(value))
            .unwrap();
    }

    packet
        .set_property(
            QualifiedName::new(ns::DC, "creator"),
            Value::array(ArrayKind::Ordered, ["Llywelyn", "Stefan"].map(Value::text)),
        )
        .unwrap();
    packet
        .set_property(
            QualifiedName::new(ns::DC, "subject"),
            Value::array(ArrayKind::Unordered, ["purple", "square", "XMP"].map(Value::text)),
        )
        .unwrap();
    packet
        .set_property(
            QualifiedName::new(ns::DC, "title"),
            Value::array(
                ArrayKind::Alternative,
                [
                    Value::text("Purple Square").with_language("x-default"),
                    Value::text("Lila Quadrat").with_language("de"),
                ],
            ),
        )
        .unwrap();

    let derived_from = Value::structure([
        (
            QualifiedName::new(ns::ST_REF, "instanceID"),
            Value::text("uuid:BF664E7B33D5DA119129F691B53239AD"),
        ),
        (
            QualifiedName::new(ns::ST_REF, "documentID"),
            Value::text("uuid:FE607D9B5FD4DA118B7787757E22306B"),
        ),
    ])
    .unwrap();
    packet
        .set_property(QualifiedName::new(ns::XMP_MM, "DerivedFrom"), derived_from)
        .unwrap();

    let identifier = Value::text("978-3-16-148410-0")
        .with_qualifier(QualifiedName::new(ns::XMP_IDQ, "Scheme"), Value::text("ISBN"))
        .unwrap();
    packet
        .set_property(
            QualifiedName::new(ns::XMP, "Identifier"),
            Value::array(ArrayKind::Unordered, [identifier]),
        )
        .unwrap();

    packet
}

fn bench_serialize_simple(c: &mut Criterion) {
    let packet = create_simple_packet();
    c.bench_function("serialize_simple", |b| {
        b.iter(|| {
            let _result = black_box(&packet).serialize().unwrap();
        });
    });
}

fn bench_serialize_complex(c: &mut Criterion) {
    let packet = create_complex_packet();
    c.bench_function("serialize_complex", |b| {
        b.iter(|| {
            let _result = black_box(&packet).serialize().unwrap();
        });
    });
}

fn bench_serialize_compact(c: &mut Criterion) {
    let packet = create_complex_packet();
    let options = SerializeOptions::new().compact().omit_packet_wrapper();
    c.bench_function("serialize_compact", |b| {
        b.iter(|| {
            let _result = black_box(&packet).serialize_with(options.clone()).unwrap();
        });
    });
}

fn bench_round_trip(c: &mut Criterion) {
    let xml = create_complex_packet().serialize().unwrap();
    c.bench_function("round_trip", |b| {
        b.iter(|| {
            let packet = Packet::parse(black_box(&xml)).unwrap();
            let _result = packet.serialize().unwrap();
        });
    });
}

criterion_group!(
    benches,
    bench_serialize_simple,
    bench_serialize_complex,
    bench_serialize_compact,
    bench_round_trip
);
criterion_main!(benches);
