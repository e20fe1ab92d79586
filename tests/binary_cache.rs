#![cfg(feature = "binary-cache")]

use sabnf::{DeserializeError, Grammar};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn simple_grammar() -> Grammar {
    Grammar::from_abnf("list = item *(\",\" item)\nitem = 1*%d48-57\n").unwrap()
}

fn complex_grammar() -> Grammar {
    Grammar::from_abnf(
        "\
expr    = term *((\"+\" / \"-\") term)
term    = factor *((\"*\" / \"/\") factor)
factor  = %^ number / \"(\" expr \")\" / u_call / e_hole
number  = 1*DIGIT [\".\" 1*DIGIT] !!'x' &&%x20 \\DIGIT \\%iu_call %$
DIGIT   = %x30-39
top     = expr
",
    )
    .unwrap()
}

fn assert_same(original: &Grammar, restored: &Grammar) {
    assert_eq!(original.rules(), restored.rules());
    assert_eq!(original.udts(), restored.udts());
    assert_eq!(original.source(), restored.source());

    let (a, b) = (original.analysis(), restored.analysis());
    assert_eq!(a.attrs(), b.attrs());
    assert_eq!(a.mr_groups(), b.mr_groups());
    for index in 0..a.len() {
        assert_eq!(a.rule_type(index), b.rule_type(index));
        assert_eq!(a.references(index), b.references(index));
    }
    assert_eq!(original.to_rust_source(), restored.to_rust_source());
}

// ---------------------------------------------------------------------------
// Round-trip
// ---------------------------------------------------------------------------

#[test]
fn round_trip_simple() {
    let original = simple_grammar();
    let bytes = original.to_bytes().unwrap();
    let restored = Grammar::from_bytes(&bytes).unwrap();
    assert_same(&original, &restored);
}

#[test]
fn round_trip_complex() {
    let original = complex_grammar();
    assert_eq!(original.analysis().mr_groups(), &[vec![0, 1, 2]]);
    let bytes = original.to_bytes().unwrap();
    let restored = Grammar::from_bytes(&bytes).unwrap();
    assert_same(&original, &restored);
}

// ---------------------------------------------------------------------------
// Integrity: corrupted payload
// ---------------------------------------------------------------------------

#[test]
fn corrupted_payload_fails_checksum() {
    let mut bytes = simple_grammar().to_bytes().unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xFF;
    let err = Grammar::from_bytes(&bytes).unwrap_err();
    assert!(
        matches!(err, DeserializeError::ChecksumMismatch),
        "expected ChecksumMismatch, got: {err}"
    );
}

#[test]
fn truncated_blob_fails_length_check() {
    let bytes = complex_grammar().to_bytes().unwrap();
    let err = Grammar::from_bytes(&bytes[..bytes.len() - 4]).unwrap_err();
    assert!(
        matches!(err, DeserializeError::LengthMismatch { .. }),
        "expected LengthMismatch, got: {err}"
    );
}

#[test]
fn empty_input_fails_length_check() {
    let err = Grammar::from_bytes(&[]).unwrap_err();
    assert!(
        matches!(err, DeserializeError::LengthMismatch { expected: 32, actual: 0 }),
        "expected LengthMismatch, got: {err}"
    );
}

// ---------------------------------------------------------------------------
// Format: header checks
// ---------------------------------------------------------------------------

#[test]
fn bad_magic_is_rejected() {
    let mut bytes = simple_grammar().to_bytes().unwrap();
    bytes[0..4].copy_from_slice(b"OORO");
    let err = Grammar::from_bytes(&bytes).unwrap_err();
    assert!(
        matches!(err, DeserializeError::BadMagic),
        "expected BadMagic, got: {err}"
    );
}

#[test]
fn future_format_version_is_rejected() {
    let mut bytes = simple_grammar().to_bytes().unwrap();
    bytes[4] = 99;
    let err = Grammar::from_bytes(&bytes).unwrap_err();
    assert!(
        matches!(
            err,
            DeserializeError::IncompatibleVersion {
                blob: 99,
                supported: 1
            }
        ),
        "expected IncompatibleVersion, got: {err}"
    );
}

// ---------------------------------------------------------------------------
// File I/O
// ---------------------------------------------------------------------------

#[test]
fn file_round_trip() {
    let dir = std::env::temp_dir().join("sabnf_test_binary_cache");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("expr.sabnf.bin");

    let original = complex_grammar();
    original.to_binary_file(&path).unwrap();
    let restored = Grammar::from_binary_file(&path).unwrap();
    assert_same(&original, &restored);

    std::fs::remove_file(&path).ok();
}

#[test]
fn missing_file_is_io_error() {
    let path = std::env::temp_dir()
        .join("sabnf_test_binary_cache")
        .join("does-not-exist.bin");
    let err = Grammar::from_binary_file(&path).unwrap_err();
    assert!(matches!(err, DeserializeError::Io(_)), "got: {err}");
}

// ---------------------------------------------------------------------------
// Determinism
// ---------------------------------------------------------------------------

#[test]
fn encoding_is_deterministic() {
    let a = complex_grammar().to_bytes().unwrap();
    let b = complex_grammar().to_bytes().unwrap();
    assert_eq!(a, b);
}
