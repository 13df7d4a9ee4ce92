// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Canonical encoding of metadata graphs.
//!
//! [`CanonicalEncoder`] turns a [`Value`] graph into an [`EncodedValue`] tree,
//! then [`EncodedValue::to_bytes`] renders that tree as deterministic CBOR
//! (minimal-width heads, shortest exact float width, no indefinite lengths).
//!
//! Unlike canonical CBOR for wire payloads, record entries are **not** sorted:
//! field order is part of a module definition's identity. Stand-ins for values
//! that have no data form (cycles, callables, markers, foreign leaves) are CBOR
//! tags from a private range, so they can never collide with user data of the
//! same shape.

use half::f16;
use modtoken_value::{Callable, CallableKind, NodeId, Record, Sequence, Value};
use tracing::trace;

const TAG_BASE: u64 = 0x6d74_0000;
/// Class-like callable, by name.
const TAG_CONSTRUCTOR: u64 = TAG_BASE + 1;
/// Function, by BLAKE3 digest of its source.
const TAG_FUNCTION: u64 = TAG_BASE + 2;
/// Marker, by description.
const TAG_MARKER: u64 = TAG_BASE + 3;
/// Back-reference to a composite on the active path.
const TAG_CYCLE: u64 = TAG_BASE + 4;
/// Foreign leaf, by display text.
const TAG_FOREIGN: u64 = TAG_BASE + 5;

/// Canonical, cycle-free rendering of a metadata value.
#[derive(Clone, PartialEq, Debug)]
pub enum EncodedValue {
    /// Absent value.
    Undefined,
    /// Explicit null.
    Null,
    /// Boolean.
    Bool(bool),
    /// Integral number (including integral floats).
    Integer(i64),
    /// Non-integral or out-of-range number.
    Float(f64),
    /// Text.
    Text(String),
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// Class-like callable, identified by name.
    Constructor(String),
    /// Function, identified by the BLAKE3 digest of its source.
    Function([u8; 32]),
    /// Unique marker, identified by its description.
    Marker(Option<String>),
    /// A composite already on the active path.
    Cycle,
    /// Unrecognized leaf, identified by its display text.
    Foreign(String),
    /// Fields in construction order.
    Record(Vec<(String, EncodedValue)>),
    /// Elements in order.
    Sequence(Vec<EncodedValue>),
}

impl EncodedValue {
    /// Deterministic byte rendering, suitable as hash input.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.write_to(&mut out);
        out
    }

    /// Append the byte rendering of this value to `out`.
    pub fn write_to(&self, out: &mut Vec<u8>) {
        match self {
            Self::Undefined => out.push(0xf7),
            Self::Null => out.push(0xf6),
            Self::Bool(b) => out.push(if *b { 0xf5 } else { 0xf4 }),
            Self::Integer(n) => enc_int(*n, out),
            Self::Float(f) => enc_float(*f, out),
            Self::Text(s) => enc_text(s, out),
            Self::Bytes(b) => enc_bytes(b, out),
            Self::Constructor(name) => {
                write_major(6, TAG_CONSTRUCTOR, out);
                enc_text(name, out);
            }
            Self::Function(digest) => {
                write_major(6, TAG_FUNCTION, out);
                enc_bytes(digest, out);
            }
            Self::Marker(description) => {
                write_major(6, TAG_MARKER, out);
                match description {
                    Some(d) => enc_text(d, out),
                    None => out.push(0xf7),
                }
            }
            Self::Cycle => {
                write_major(6, TAG_CYCLE, out);
                out.push(0xf6);
            }
            Self::Foreign(text) => {
                write_major(6, TAG_FOREIGN, out);
                enc_text(text, out);
            }
            Self::Record(fields) => {
                enc_len(5, fields.len(), out);
                for (k, v) in fields {
                    enc_text(k, out);
                    v.write_to(out);
                }
            }
            Self::Sequence(items) => {
                enc_len(4, items.len(), out);
                for it in items {
                    it.write_to(out);
                }
            }
        }
    }
}

/// Encode `value` with a fresh [`CanonicalEncoder`].
pub fn encode(value: &Value) -> EncodedValue {
    CanonicalEncoder::new().encode(value)
}

/// Walks a value graph, tracking the composites on the active path.
///
/// Only the active path is tracked: a node reachable through two sibling
/// branches is encoded in full both times, and only a true back-edge becomes
/// [`EncodedValue::Cycle`]. The encoder is total; it never fails.
#[derive(Debug, Default)]
pub struct CanonicalEncoder {
    path: Vec<NodeId>,
}

impl CanonicalEncoder {
    /// Create an encoder with an empty path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode a value graph.
    pub fn encode(&mut self, value: &Value) -> EncodedValue {
        match value {
            Value::Undefined => EncodedValue::Undefined,
            Value::Null => EncodedValue::Null,
            Value::Bool(b) => EncodedValue::Bool(*b),
            Value::Integer(n) => EncodedValue::Integer(*n),
            Value::Number(f) => canonical_number(*f),
            Value::Text(s) => EncodedValue::Text(s.clone()),
            Value::Bytes(b) => EncodedValue::Bytes(b.clone()),
            Value::Callable(c) => encode_callable(c),
            Value::Marker(m) => EncodedValue::Marker(m.description().map(str::to_owned)),
            Value::Record(r) => self.encode_record(r),
            Value::Sequence(s) => self.encode_sequence(s),
            Value::Foreign(leaf) => EncodedValue::Foreign(leaf.to_string()),
        }
    }

    fn encode_record(&mut self, record: &Record) -> EncodedValue {
        let id = record.node_id();
        if !self.enter(id) {
            return EncodedValue::Cycle;
        }
        let fields = record
            .fields()
            .into_iter()
            .map(|(k, v)| {
                let v = self.encode(&v);
                (k, v)
            })
            .collect();
        self.path.pop();
        EncodedValue::Record(fields)
    }

    fn encode_sequence(&mut self, seq: &Sequence) -> EncodedValue {
        let id = seq.node_id();
        if !self.enter(id) {
            return EncodedValue::Cycle;
        }
        let items = seq.items().iter().map(|v| self.encode(v)).collect();
        self.path.pop();
        EncodedValue::Sequence(items)
    }

    /// Push `id` onto the active path; `false` if it is already there.
    fn enter(&mut self, id: NodeId) -> bool {
        if self.path.contains(&id) {
            trace!(depth = self.path.len(), "cycle placeholder");
            return false;
        }
        self.path.push(id);
        true
    }
}

fn encode_callable(callable: &Callable) -> EncodedValue {
    match callable.kind() {
        CallableKind::Constructor if !callable.name().is_empty() => {
            EncodedValue::Constructor(callable.name().to_owned())
        }
        // Anonymous class expressions have no name to go by.
        CallableKind::Constructor | CallableKind::Function => {
            EncodedValue::Function(*blake3::hash(callable.source().as_bytes()).as_bytes())
        }
    }
}

/// Collapse integral floats into the integer domain.
#[allow(clippy::cast_possible_truncation)]
fn canonical_number(f: f64) -> EncodedValue {
    // 2^63 is exactly representable; anything at or above it does not fit i64.
    const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;
    if f.is_finite() && f.fract() == 0.0 && f >= -I64_BOUND && f < I64_BOUND {
        return EncodedValue::Integer(f as i64);
    }
    EncodedValue::Float(f)
}

fn enc_len(major: u8, len: usize, out: &mut Vec<u8>) {
    write_major(major, len as u64, out);
}

fn enc_int(n: i64, out: &mut Vec<u8>) {
    if n >= 0 {
        write_major(0, n.unsigned_abs(), out);
    } else {
        write_major(1, n.unsigned_abs() - 1, out);
    }
}

#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
fn enc_float(f: f64, out: &mut Vec<u8>) {
    if f.is_nan() {
        write_half(f16::NAN, out);
        return;
    }
    if f.is_infinite() {
        let h = if f.is_sign_positive() {
            f16::INFINITY
        } else {
            f16::NEG_INFINITY
        };
        write_half(h, out);
        return;
    }
    let h = f16::from_f64(f);
    if h.to_f64() == f {
        write_half(h, out);
        return;
    }
    let f32v = f as f32;
    if f64::from(f32v) == f {
        out.push(0xfa);
        out.extend_from_slice(&f32v.to_be_bytes());
    } else {
        out.push(0xfb);
        out.extend_from_slice(&f.to_be_bytes());
    }
}

fn write_half(h: f16, out: &mut Vec<u8>) {
    out.push(0xf9);
    out.extend_from_slice(&h.to_bits().to_be_bytes());
}

fn enc_bytes(b: &[u8], out: &mut Vec<u8>) {
    enc_len(2, b.len(), out);
    out.extend_from_slice(b);
}

pub(crate) fn enc_text(s: &str, out: &mut Vec<u8>) {
    enc_len(3, s.len(), out);
    out.extend_from_slice(s.as_bytes());
}

pub(crate) fn write_major(major: u8, n: u64, out: &mut Vec<u8>) {
    debug_assert!(major <= 7);
    let head = major << 5;
    let be = n.to_be_bytes();
    match n {
        0..=23 => out.push(head | be[7]),
        24..=0xff => {
            out.push(head | 24);
            out.push(be[7]);
        }
        0x100..=0xffff => {
            out.push(head | 25);
            out.extend_from_slice(&be[6..]);
        }
        0x1_0000..=0xffff_ffff => {
            out.push(head | 26);
            out.extend_from_slice(&be[4..]);
        }
        _ => {
            out.push(head | 27);
            out.extend_from_slice(&be);
        }
    }
}
