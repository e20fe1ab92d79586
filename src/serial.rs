//! Binary serialization and deserialization of compiled grammars.
//!
//! A compiled [`Grammar`](crate::Grammar) can be cached on disk and loaded
//! without re-running the compiler. The format consists of a 32-byte fixed
//! header followed by a bincode-encoded payload.
//!
//! ## Wire Format
//!
//! ```text
//! Offset  Size  Field
//! 0       4     Magic bytes: b"SABN"
//! 4       2     Format version (u16, little-endian)
//! 6       2     Engine version (u16, little-endian)
//! 8       4     Flags (u32, reserved)
//! 12      4     Payload length in bytes (u32, little-endian)
//! 16      16    BLAKE3 hash of the payload (truncated to 16 bytes)
//! 32..    var   Bincode-encoded payload
//! ```
//!
//! ## Versioning
//!
//! The format version in the header must match exactly. If it does not,
//! deserialization fails immediately with [`DeserializeError::IncompatibleVersion`].
//! The engine version is informational only.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analysis::{Analysis, RuleAttr, RuleControl, RuleType};
use crate::types::{Grammar, Opcode, Rule, Udt};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const MAGIC: &[u8; 4] = b"SABN";
const FORMAT_VERSION: u16 = 1;
const ENGINE_VERSION: u16 = 1;
const HEADER_SIZE: usize = 32;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur when serializing a [`Grammar`](crate::Grammar) to bytes.
#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("failed to encode grammar: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error("I/O error during serialization: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur when deserializing a [`Grammar`](crate::Grammar) from bytes.
#[derive(Debug, Error)]
pub enum DeserializeError {
    #[error("not a sabnf binary: invalid magic bytes")]
    BadMagic,

    #[error("incompatible format version: blob is v{blob}, engine supports v{supported}")]
    IncompatibleVersion { blob: u16, supported: u16 },

    #[error("integrity check failed: BLAKE3 checksum mismatch")]
    ChecksumMismatch,

    #[error("payload length mismatch: expected {expected} bytes, got {actual}")]
    LengthMismatch { expected: u32, actual: usize },

    #[error("failed to decode payload: {0}")]
    Decode(#[from] bincode::error::DecodeError),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("I/O error during deserialization: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Serialized type hierarchy
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
struct SerializedGrammar {
    metadata: GrammarMetadata,
    rules: Vec<SerializedRule>,
    udts: Vec<SerializedUdt>,
    analysis: Vec<SerializedRuleAnalysis>,
    mr_groups: Vec<Vec<usize>>,
    source: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct GrammarMetadata {
    rule_count: usize,
    udt_count: usize,
    opcode_count: usize,
    source_digest: [u8; 32],
}

#[derive(Debug, Serialize, Deserialize)]
struct SerializedRule {
    name: String,
    opcodes: Vec<SerializedOpcode>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SerializedUdt {
    name: String,
    empty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
enum SerializedOpcode {
    Alt(Vec<usize>),
    Cat(Vec<usize>),
    Rep { min: u32, max: Option<u32> },
    Rnm(usize),
    Udt { index: usize, empty: bool },
    And,
    Not,
    Bka,
    Bkn,
    Abg,
    Aen,
    Bkr {
        index: usize,
        udt: bool,
        case_insensitive: bool,
    },
    Tls(Vec<u32>),
    Tbs(Vec<u32>),
    Trg { min: u32, max: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum SerializedRuleType {
    N,
    R,
    Mr,
    Nmr,
    Rmr,
}

#[derive(Debug, Serialize, Deserialize)]
struct SerializedRuleAnalysis {
    rule_type: SerializedRuleType,
    mr_group: Option<usize>,
    /// left, nested, right, cyclic, finite, empty, not_empty
    attr: [bool; 7],
    ref_count: Vec<u32>,
}

// ---------------------------------------------------------------------------
// Opcode conversion
// ---------------------------------------------------------------------------

fn serialize_opcode(op: &Opcode) -> SerializedOpcode {
    match op {
        Opcode::Alt { children } => SerializedOpcode::Alt(children.clone()),
        Opcode::Cat { children } => SerializedOpcode::Cat(children.clone()),
        Opcode::Rep { min, max } => SerializedOpcode::Rep {
            min: *min,
            max: *max,
        },
        Opcode::Rnm { index } => SerializedOpcode::Rnm(*index),
        Opcode::Udt { index, empty } => SerializedOpcode::Udt {
            index: *index,
            empty: *empty,
        },
        Opcode::And => SerializedOpcode::And,
        Opcode::Not => SerializedOpcode::Not,
        Opcode::Bka => SerializedOpcode::Bka,
        Opcode::Bkn => SerializedOpcode::Bkn,
        Opcode::Abg => SerializedOpcode::Abg,
        Opcode::Aen => SerializedOpcode::Aen,
        Opcode::Bkr {
            index,
            udt,
            case_insensitive,
        } => SerializedOpcode::Bkr {
            index: *index,
            udt: *udt,
            case_insensitive: *case_insensitive,
        },
        Opcode::Tls { string } => SerializedOpcode::Tls(string.clone()),
        Opcode::Tbs { string } => SerializedOpcode::Tbs(string.clone()),
        Opcode::Trg { min, max } => SerializedOpcode::Trg {
            min: *min,
            max: *max,
        },
    }
}

fn deserialize_opcode(op: SerializedOpcode) -> Opcode {
    match op {
        SerializedOpcode::Alt(children) => Opcode::Alt { children },
        SerializedOpcode::Cat(children) => Opcode::Cat { children },
        SerializedOpcode::Rep { min, max } => Opcode::Rep { min, max },
        SerializedOpcode::Rnm(index) => Opcode::Rnm { index },
        SerializedOpcode::Udt { index, empty } => Opcode::Udt { index, empty },
        SerializedOpcode::And => Opcode::And,
        SerializedOpcode::Not => Opcode::Not,
        SerializedOpcode::Bka => Opcode::Bka,
        SerializedOpcode::Bkn => Opcode::Bkn,
        SerializedOpcode::Abg => Opcode::Abg,
        SerializedOpcode::Aen => Opcode::Aen,
        SerializedOpcode::Bkr {
            index,
            udt,
            case_insensitive,
        } => Opcode::Bkr {
            index,
            udt,
            case_insensitive,
        },
        SerializedOpcode::Tls(string) => Opcode::Tls { string },
        SerializedOpcode::Tbs(string) => Opcode::Tbs { string },
        SerializedOpcode::Trg { min, max } => Opcode::Trg { min, max },
    }
}

// ---------------------------------------------------------------------------
// Analysis conversion
// ---------------------------------------------------------------------------

fn serialize_rule_type(rule_type: RuleType) -> SerializedRuleType {
    match rule_type {
        RuleType::NonRecursive => SerializedRuleType::N,
        RuleType::Recursive => SerializedRuleType::R,
        RuleType::MutuallyRecursive => SerializedRuleType::Mr,
        RuleType::RefersToMutual => SerializedRuleType::Nmr,
        RuleType::RecursiveRefersToMutual => SerializedRuleType::Rmr,
    }
}

fn deserialize_rule_type(rule_type: SerializedRuleType) -> RuleType {
    match rule_type {
        SerializedRuleType::N => RuleType::NonRecursive,
        SerializedRuleType::R => RuleType::Recursive,
        SerializedRuleType::Mr => RuleType::MutuallyRecursive,
        SerializedRuleType::Nmr => RuleType::RefersToMutual,
        SerializedRuleType::Rmr => RuleType::RecursiveRefersToMutual,
    }
}

fn serialize_attr(attr: &RuleAttr) -> [bool; 7] {
    [
        attr.left,
        attr.nested,
        attr.right,
        attr.cyclic,
        attr.finite,
        attr.empty,
        attr.not_empty,
    ]
}

fn deserialize_attr(attr: [bool; 7]) -> RuleAttr {
    let [left, nested, right, cyclic, finite, empty, not_empty] = attr;
    RuleAttr {
        left,
        nested,
        right,
        cyclic,
        finite,
        empty,
        not_empty,
    }
}

// ---------------------------------------------------------------------------
// Grammar -> SerializedGrammar
// ---------------------------------------------------------------------------

fn grammar_to_serialized(grammar: &Grammar) -> SerializedGrammar {
    let rules = grammar
        .rules
        .iter()
        .map(|r| SerializedRule {
            name: r.name.clone(),
            opcodes: r.opcodes.iter().map(serialize_opcode).collect(),
        })
        .collect();

    let udts = grammar
        .udts
        .iter()
        .map(|u| SerializedUdt {
            name: u.name.clone(),
            empty: u.empty,
        })
        .collect();

    let analysis = grammar
        .analysis
        .controls
        .iter()
        .zip(&grammar.analysis.attrs)
        .map(|(control, attr)| SerializedRuleAnalysis {
            rule_type: serialize_rule_type(control.rule_type),
            mr_group: control.mr_group,
            attr: serialize_attr(attr),
            ref_count: control.ref_count.clone(),
        })
        .collect();

    SerializedGrammar {
        metadata: GrammarMetadata {
            rule_count: grammar.rules.len(),
            udt_count: grammar.udts.len(),
            opcode_count: grammar.rules.iter().map(|r| r.opcodes.len()).sum(),
            source_digest: *blake3::hash(grammar.source.as_bytes()).as_bytes(),
        },
        rules,
        udts,
        analysis,
        mr_groups: grammar.analysis.mr_groups.clone(),
        source: grammar.source.clone(),
    }
}

// ---------------------------------------------------------------------------
// SerializedGrammar -> Grammar
// ---------------------------------------------------------------------------

fn serialized_to_grammar(ser: SerializedGrammar) -> Result<Grammar, DeserializeError> {
    validate(&ser)?;

    let rules: Vec<Rule> = ser
        .rules
        .into_iter()
        .enumerate()
        .map(|(index, r)| {
            let opcodes = r.opcodes.into_iter().map(deserialize_opcode).collect();
            Rule::new(&r.name, index, opcodes)
        })
        .collect();

    let udts: Vec<Udt> = ser
        .udts
        .into_iter()
        .enumerate()
        .map(|(index, u)| Udt::new(&u.name, index, u.empty))
        .collect();

    let mut controls = Vec::with_capacity(ser.analysis.len());
    let mut attrs = Vec::with_capacity(ser.analysis.len());
    for entry in ser.analysis {
        controls.push(RuleControl {
            is_open: false,
            is_complete: true,
            rule_type: deserialize_rule_type(entry.rule_type),
            mr_group: entry.mr_group,
            ref_count: entry.ref_count,
        });
        attrs.push(deserialize_attr(entry.attr));
    }

    Ok(Grammar {
        rules,
        udts,
        analysis: Analysis {
            controls,
            attrs,
            mr_groups: ser.mr_groups,
        },
        source: ser.source,
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(ser: &SerializedGrammar) -> Result<(), DeserializeError> {
    let rule_count = ser.rules.len();
    let udt_count = ser.udts.len();

    // Metadata consistency
    if ser.metadata.rule_count != rule_count {
        return Err(DeserializeError::Validation(format!(
            "metadata says {} rules but payload has {}",
            ser.metadata.rule_count, rule_count
        )));
    }
    if ser.metadata.udt_count != udt_count {
        return Err(DeserializeError::Validation(format!(
            "metadata says {} udts but payload has {}",
            ser.metadata.udt_count, udt_count
        )));
    }
    let opcode_count: usize = ser.rules.iter().map(|r| r.opcodes.len()).sum();
    if ser.metadata.opcode_count != opcode_count {
        return Err(DeserializeError::Validation(format!(
            "metadata says {} opcodes but payload has {}",
            ser.metadata.opcode_count, opcode_count
        )));
    }
    if blake3::hash(ser.source.as_bytes()).as_bytes() != &ser.metadata.source_digest {
        return Err(DeserializeError::Validation(
            "source text does not match its digest".to_owned(),
        ));
    }

    for rule in &ser.rules {
        validate_opcodes(rule, rule_count, udt_count)?;
    }

    // Analysis tables cover every rule
    if ser.analysis.len() != rule_count {
        return Err(DeserializeError::Validation(format!(
            "analysis has {} entries but {} rules exist",
            ser.analysis.len(),
            rule_count
        )));
    }
    for (rule, entry) in ser.rules.iter().zip(&ser.analysis) {
        if entry.ref_count.len() != rule_count {
            return Err(DeserializeError::Validation(format!(
                "rule '{}' has {} reference counts but {} rules exist",
                rule.name,
                entry.ref_count.len(),
                rule_count
            )));
        }
        let is_mutual = entry.rule_type == SerializedRuleType::Mr;
        match entry.mr_group {
            Some(group) if !is_mutual || group >= ser.mr_groups.len() => {
                return Err(DeserializeError::Validation(format!(
                    "rule '{}' has invalid mutual recursion group {group}",
                    rule.name
                )));
            }
            None if is_mutual => {
                return Err(DeserializeError::Validation(format!(
                    "mutually recursive rule '{}' has no group",
                    rule.name
                )));
            }
            _ => {}
        }
    }
    for (id, group) in ser.mr_groups.iter().enumerate() {
        for &member in group {
            if ser.analysis.get(member).and_then(|a| a.mr_group) != Some(id) {
                return Err(DeserializeError::Validation(format!(
                    "mutual recursion group {id} lists rule {member} which is not a member"
                )));
            }
        }
    }

    Ok(())
}

fn validate_opcodes(
    rule: &SerializedRule,
    rule_count: usize,
    udt_count: usize,
) -> Result<(), DeserializeError> {
    let len = rule.opcodes.len();
    if len == 0 {
        return Err(DeserializeError::Validation(format!(
            "rule '{}' has no opcodes",
            rule.name
        )));
    }
    let fail = |at: usize, what: String| {
        Err(DeserializeError::Validation(format!(
            "rule '{}' opcode {at}: {what}",
            rule.name
        )))
    };

    for (at, op) in rule.opcodes.iter().enumerate() {
        match op {
            SerializedOpcode::Alt(children) | SerializedOpcode::Cat(children) => {
                if children.is_empty() {
                    return fail(at, "ALT/CAT with no children".to_owned());
                }
                if let Some(child) = children.iter().find(|&&c| c >= len) {
                    return fail(at, format!("child {child} out of bounds (max {len})"));
                }
            }
            SerializedOpcode::Rep { min, max: Some(max) } if min > max => {
                return fail(at, format!("REP min {min} greater than max {max}"));
            }
            SerializedOpcode::Trg { min, max } if min > max => {
                return fail(at, format!("TRG min {min} greater than max {max}"));
            }
            SerializedOpcode::Rnm(index) if *index >= rule_count => {
                return fail(at, format!("rule index {index} out of bounds (max {rule_count})"));
            }
            SerializedOpcode::Udt { index, .. } if *index >= udt_count => {
                return fail(at, format!("udt index {index} out of bounds (max {udt_count})"));
            }
            SerializedOpcode::Bkr { index, udt, .. } => {
                let count = if *udt { udt_count } else { rule_count };
                if *index >= count {
                    return fail(at, format!("back reference {index} out of bounds (max {count})"));
                }
            }
            _ => {}
        }
        let governs_next = matches!(
            op,
            SerializedOpcode::Rep { .. }
                | SerializedOpcode::And
                | SerializedOpcode::Not
                | SerializedOpcode::Bka
                | SerializedOpcode::Bkn
        );
        if governs_next && at + 1 >= len {
            return fail(at, "operator has no following opcode".to_owned());
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Header I/O
// ---------------------------------------------------------------------------

fn write_header(buf: &mut Vec<u8>, payload: &[u8]) {
    let hash = blake3::hash(payload);
    let hash_bytes = hash.as_bytes();

    buf.extend_from_slice(MAGIC);
    buf.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    buf.extend_from_slice(&ENGINE_VERSION.to_le_bytes());
    buf.extend_from_slice(&0u32.to_le_bytes()); // flags (reserved)
    #[allow(clippy::cast_possible_truncation)] // payload will never exceed 4 GiB
    let payload_len = payload.len() as u32;
    buf.extend_from_slice(&payload_len.to_le_bytes());
    buf.extend_from_slice(&hash_bytes[..16]);
}

#[allow(clippy::cast_possible_truncation)] // HEADER_SIZE is 32, always fits in u32
fn read_header(bytes: &[u8]) -> Result<(u16, u32, [u8; 16]), DeserializeError> {
    if bytes.len() < HEADER_SIZE {
        return Err(DeserializeError::LengthMismatch {
            expected: HEADER_SIZE as u32,
            actual: bytes.len(),
        });
    }

    if &bytes[0..4] != MAGIC {
        return Err(DeserializeError::BadMagic);
    }

    let format_version = u16::from_le_bytes([bytes[4], bytes[5]]);
    // bytes[6..8] engine version, bytes[8..12] flags
    let payload_len = u32::from_le_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]);

    let mut hash = [0u8; 16];
    hash.copy_from_slice(&bytes[16..32]);

    Ok((format_version, payload_len, hash))
}

// ---------------------------------------------------------------------------
// Public encode/decode
// ---------------------------------------------------------------------------

pub(crate) fn encode(grammar: &Grammar) -> Result<Vec<u8>, SerializeError> {
    let serialized = grammar_to_serialized(grammar);
    let payload = bincode::serde::encode_to_vec(&serialized, bincode::config::standard())?;

    let mut buf = Vec::with_capacity(HEADER_SIZE + payload.len());
    write_header(&mut buf, &payload);
    buf.extend_from_slice(&payload);
    Ok(buf)
}

pub(crate) fn decode(bytes: &[u8]) -> Result<Grammar, DeserializeError> {
    let (format_version, payload_len, stored_hash) = read_header(bytes)?;

    if format_version != FORMAT_VERSION {
        return Err(DeserializeError::IncompatibleVersion {
            blob: format_version,
            supported: FORMAT_VERSION,
        });
    }

    let payload_start = HEADER_SIZE;
    let payload_end = payload_start + payload_len as usize;
    if bytes.len() < payload_end {
        return Err(DeserializeError::LengthMismatch {
            expected: payload_len,
            actual: bytes.len() - HEADER_SIZE,
        });
    }
    let payload = &bytes[payload_start..payload_end];

    let computed_hash = blake3::hash(payload);
    if computed_hash.as_bytes()[..16] != stored_hash {
        return Err(DeserializeError::ChecksumMismatch);
    }

    let (serialized, _): (SerializedGrammar, usize) =
        bincode::serde::decode_from_slice(payload, bincode::config::standard())?;

    serialized_to_grammar(serialized)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
