//! Round-trip tests between binary documents and YAML text.
//!
//! Property tests check that emitting a document and parsing the text back
//! yields the value the document was written from.

use byml::binary::{Document, Endian};
use byml::error::Error;
use byml::yaml::emit_document;
use byml::{from_yaml, to_yaml, to_yaml_with_config, Byml, EmitterConfig, HashMap32, HashMap64};
use indexmap::IndexMap;
use proptest::prelude::*;

// ============================================================================
// Helpers
// ============================================================================

fn emit(value: &Byml, config: EmitterConfig) -> String {
    let bytes = value.to_binary(Endian::native()).unwrap();
    let doc = Document::new(&bytes).unwrap();
    emit_document(&doc, config).unwrap()
}

fn tricky_string() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z][a-z0-9_]{0,10}",
        prop::sample::select(vec![
            "",
            "true",
            "False",
            "12",
            "-4",
            "1.5",
            "null",
            " leading",
            "trailing ",
            "a: b",
            "x #y",
            "-",
            "key:",
            "[x]",
            "{}",
            "!tag",
            "*star",
            "tab\there",
            "line\nbreak",
            "quote\"d",
            "back\\slash",
            "it's",
            "\u{1}ctl",
            "ünïcödé",
            "... x",
            "...",
            "--- y",
        ])
        .prop_map(str::to_owned),
    ]
}

fn map_key() -> impl Strategy<Value = String> {
    tricky_string().prop_filter("map keys are non-empty", |key| !key.is_empty())
}

fn scalar() -> impl Strategy<Value = Byml> {
    prop_oneof![
        Just(Byml::Null),
        any::<bool>().prop_map(Byml::Bool),
        any::<i32>().prop_map(Byml::I32),
        (-1.0e6f32..1.0e6f32).prop_map(Byml::F32),
        any::<u32>().prop_map(Byml::U32),
        any::<i64>().prop_map(Byml::I64),
        any::<u64>().prop_map(Byml::U64),
        (-1.0e12f64..1.0e12f64).prop_map(Byml::F64),
        tricky_string().prop_map(Byml::String),
        prop::collection::vec(any::<u8>(), 1..16).prop_map(Byml::Binary),
    ]
}

fn value() -> impl Strategy<Value = Byml> {
    scalar().prop_recursive(3, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Byml::Array),
            prop::collection::vec((map_key(), inner.clone()), 0..6)
                .prop_map(|entries| Byml::Map(entries.into_iter().collect::<IndexMap<_, _>>())),
            prop::collection::vec((any::<u32>(), inner.clone()), 0..6)
                .prop_map(|entries| Byml::HashMap32(entries.into_iter().collect())),
            prop::collection::vec((any::<u64>(), inner), 0..6)
                .prop_map(|entries| Byml::HashMap64(entries.into_iter().collect())),
        ]
    })
}

fn hash_map_root() -> impl Strategy<Value = Byml> {
    prop_oneof![
        prop::collection::vec((any::<u32>(), value()), 0..8)
            .prop_map(|entries| Byml::HashMap32(entries.into_iter().collect())),
        prop::collection::vec((any::<u64>(), value()), 0..8)
            .prop_map(|entries| Byml::HashMap64(entries.into_iter().collect())),
    ]
}

// ============================================================================
// Property-based tests
// ============================================================================

proptest! {
    /// Emitted text parses back to the value the document was written from
    #[test]
    fn emit_then_parse_is_identity(root in hash_map_root()) {
        let text = emit(&root, EmitterConfig::default());
        prop_assert_eq!(from_yaml(&text).unwrap(), root);
    }

    /// Block form parses back to the same value as flow form
    #[test]
    fn indented_emit_then_parse_is_identity(root in hash_map_root(), width in 1usize..5) {
        let config = EmitterConfig::default()
            .with_indented(true)
            .with_indent_width(width);
        let text = emit(&root, config);
        prop_assert_eq!(from_yaml(&text).unwrap(), root);
    }

    /// Emission does not depend on the byte order the document was stored in
    #[test]
    fn emit_is_byte_order_independent(root in hash_map_root()) {
        let big = root.to_binary(Endian::Big).unwrap();
        let little = root.to_binary(Endian::Little).unwrap();
        prop_assert_eq!(to_yaml(&big).unwrap(), to_yaml(&little).unwrap());
    }

    /// Hash keys always render with a fixed number of hex digits
    #[test]
    fn hash_keys_are_fixed_width(hash in any::<u32>(), wide in any::<u64>()) {
        let narrow = Byml::HashMap32(HashMap32::from_iter([(hash, Byml::I32(0))]));
        prop_assert_eq!(
            emit(&narrow, EmitterConfig::default()),
            format!("!h32 {{ 0x{:08x}: 0 }}\n", hash)
        );
        let wide_map = Byml::HashMap64(HashMap64::from_iter([(wide, Byml::I32(0))]));
        prop_assert_eq!(
            emit(&wide_map, EmitterConfig::default()),
            format!("!h64 {{ 0x{:016x}: 0 }}\n", wide)
        );
    }
}

// ============================================================================
// Tag dispatch
// ============================================================================

#[test]
fn test_scalar_tags() {
    let value = from_yaml(
        "!h32
0x00000001: !u 0xff
0x00000002: !u32 0x10
0x00000003: !ul 0xffffffffff
0x00000004: !u64 0x1
0x00000005: !l -9
0x00000006: !s64 9
0x00000007: !d 0.5
0x00000008: !f64 2
0x00000009: !!binary QUI=
0x0000000a: 'quoted 12'
0x0000000b: 12
0x0000000c: -1.25
0x0000000d: TRUE
0x0000000e:
",
    )
    .unwrap();
    let map = value.as_hash_map32().unwrap();
    let expected = [
        Byml::U32(0xff),
        Byml::U32(0x10),
        Byml::U64(0xff_ffff_ffff),
        Byml::U64(1),
        Byml::I64(-9),
        Byml::I64(9),
        Byml::F64(0.5),
        Byml::F64(2.0),
        Byml::Binary(b"AB".to_vec()),
        Byml::String("quoted 12".into()),
        Byml::I32(12),
        Byml::F32(-1.25),
        Byml::Bool(true),
        Byml::Null,
    ];
    assert_eq!(map.len(), expected.len());
    for (index, value) in expected.iter().enumerate() {
        assert_eq!(&map[&(index as u32 + 1)], value, "key {}", index + 1);
    }
}

#[test]
fn test_hex_prefix_is_not_checked() {
    // The first two characters are dropped whatever they are.
    assert_eq!(
        from_yaml("[!u xxff]").unwrap(),
        Byml::Array(vec![Byml::U32(0xff)])
    );
}

#[test]
fn test_hex_digits_after_prefix() {
    for text in ["[!u 0x+f]", "[!ul 0x+1]", "!h32 {0x+1: a}", "!h64 {0x-2: a}"] {
        assert!(
            matches!(from_yaml(text), Err(Error::InvalidHex { .. })),
            "{}",
            text
        );
    }
}

#[test]
fn test_unsupported_input() {
    assert_eq!(
        from_yaml("!h16 {0x1: 1}"),
        Err(Error::UnsupportedMappingTag {
            tag: "!h16".to_string()
        })
    );
    assert_eq!(
        from_yaml("[!date 2020-01-01]"),
        Err(Error::UnsupportedTag {
            tag: "!date".to_string()
        })
    );
    assert_eq!(
        from_yaml("!h32 [1]"),
        Err(Error::UnsupportedTag {
            tag: "!h32".to_string()
        })
    );
    assert!(matches!(
        from_yaml("!h32 {0x1: *anchor}"),
        Err(Error::UnsupportedNodeKind { kind: "alias" })
    ));
    assert!(matches!(from_yaml("key: |\n  text\n"), Err(Error::Syntax(_))));
}

// ============================================================================
// Snapshots
// ============================================================================

fn nested() -> Byml {
    Byml::HashMap32(HashMap32::from_iter([
        (0x10, Byml::String("name".into())),
        (
            0x20,
            Byml::Array(vec![
                Byml::I32(1),
                Byml::HashMap64(HashMap64::from_iter([(0xabc, Byml::U32(7))])),
            ]),
        ),
        (
            0x30,
            Byml::Map(IndexMap::from_iter([
                ("b".to_string(), Byml::F32(1.0)),
                ("a".to_string(), Byml::Null),
            ])),
        ),
    ]))
}

#[test]
fn test_snapshot_flow() {
    let value = Byml::HashMap32(HashMap32::from_iter([
        (0x1a, Byml::I32(1)),
        (0x2b, Byml::String("true".into())),
        (0x3c, Byml::I64(-2)),
    ]));
    insta::assert_snapshot!(
        emit(&value, EmitterConfig::default()).trim_end(),
        @r#"!h32 { 0x0000001a: 1, 0x0000002b: "true", 0x0000003c: !l -2 }"#
    );
}

#[test]
fn test_snapshot_block() {
    insta::assert_snapshot!(emit(&nested(), EmitterConfig::default()).trim_end(), @r"
!h32
0x00000010: name
0x00000020:
  - 1
  - !h64 { 0x0000000000000abc: !u 0x7 }
0x00000030: { a:, b: 1.0 }
");
}

#[test]
fn test_snapshot_indented() {
    let config = EmitterConfig::default().with_indented(true);
    insta::assert_snapshot!(emit(&nested(), config).trim_end(), @r"
!h32
0x00000010: name
0x00000020:
  - 1
  - !h64
    0x0000000000000abc: !u 0x7
0x00000030:
  a:
  b: 1.0
");
}

#[test]
fn test_big_endian_document_renders() {
    let bytes = nested().to_binary(Endian::Big).unwrap();
    assert_eq!(&bytes[..2], b"BY");
    assert_eq!(
        to_yaml_with_config(&bytes, EmitterConfig::default()).unwrap(),
        emit(&nested(), EmitterConfig::default())
    );
}
