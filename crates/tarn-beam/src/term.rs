//! External term encoding for literal constants.
//!
//! Literals referenced by instructions are serialized into a self-describing
//! tag-then-payload representation before landing in the literal table. Every
//! encoded form starts with at least one tag byte; tuples additionally carry
//! a 4-byte length prefix and a version byte so the loader can slice them out
//! without decoding.

use tarn_core::ByteWriter;

use crate::error::{u32_len, BeamError, BeamResult};

const TERM_VERSION: u8 = 131;
const NEW_FLOAT_EXT: u8 = 70;
const SMALL_INTEGER_EXT: u8 = 97;
const INTEGER_EXT: u8 = 98;
const SMALL_TUPLE_EXT: u8 = 104;
const LARGE_TUPLE_EXT: u8 = 105;
const NIL_EXT: u8 = 106;
const LIST_EXT: u8 = 108;
const BINARY_EXT: u8 = 109;
const MAP_EXT: u8 = 116;
const ATOM_UTF8_EXT: u8 = 118;
const SMALL_ATOM_UTF8_EXT: u8 = 119;

/// A literal constant value, recursively defined.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Signed integer. Must fit 32 bits when encoded; wider values are
    /// rejected rather than truncated.
    Int(i64),
    /// IEEE-754 double.
    Float(f64),
    /// Atom by name. Resolved against the loader's atom table, not ours.
    Atom(String),
    /// Raw binary blob.
    Binary(Vec<u8>),
    /// Ordered tuple of literals.
    Tuple(Vec<Literal>),
    /// Ordered (proper) list of literals.
    List(Vec<Literal>),
    /// Ordered key/value pairs.
    Map(Vec<(Literal, Literal)>),
}

/// Encode `lit` into its external term representation.
pub fn encode_literal(lit: &Literal) -> BeamResult<Vec<u8>> {
    let mut w = ByteWriter::new();
    encode_into(lit, &mut w)?;
    Ok(w.into_vec())
}

fn encode_into(lit: &Literal, w: &mut ByteWriter) -> BeamResult<()> {
    match lit {
        Literal::Int(n) => {
            if (0..=255).contains(n) {
                w.write_u8(SMALL_INTEGER_EXT);
                w.write_u8(*n as u8);
            } else {
                let v = i32::try_from(*n).map_err(|_| BeamError::LiteralOutOfRange(*n))?;
                w.write_u8(INTEGER_EXT);
                w.write_i32_be(v);
            }
        }
        Literal::Float(x) => {
            w.write_u8(NEW_FLOAT_EXT);
            w.write_f64_be(*x);
        }
        Literal::Atom(name) => {
            let bytes = name.as_bytes();
            if bytes.len() <= usize::from(u8::MAX) {
                w.write_u8(SMALL_ATOM_UTF8_EXT);
                w.write_u8(bytes.len() as u8);
            } else if bytes.len() <= usize::from(u16::MAX) {
                w.write_u8(ATOM_UTF8_EXT);
                w.write_u16_be(bytes.len() as u16);
            } else {
                return Err(BeamError::AtomTooLong(name.clone()));
            }
            w.write_bytes(bytes);
        }
        Literal::Binary(bytes) => {
            w.write_u8(BINARY_EXT);
            w.write_u32_be(u32_len(bytes.len(), "binary literal length")?);
            w.write_bytes(bytes);
        }
        Literal::Tuple(items) => {
            let mut inner = ByteWriter::new();
            inner.write_u8(TERM_VERSION);
            if items.len() <= usize::from(u8::MAX) {
                inner.write_u8(SMALL_TUPLE_EXT);
                inner.write_u8(items.len() as u8);
            } else {
                inner.write_u8(LARGE_TUPLE_EXT);
                inner.write_u32_be(u32_len(items.len(), "tuple arity")?);
            }
            for item in items {
                encode_into(item, &mut inner)?;
            }
            // Length prefix covers version byte + tag + arity + elements.
            w.write_u32_be(u32_len(inner.len(), "tuple encoding length")?);
            w.write_bytes(inner.as_slice());
        }
        Literal::List(items) => {
            if items.is_empty() {
                w.write_u8(NIL_EXT);
            } else {
                w.write_u8(LIST_EXT);
                w.write_u32_be(u32_len(items.len(), "list length")?);
                for item in items {
                    encode_into(item, w)?;
                }
                w.write_u8(NIL_EXT);
            }
        }
        Literal::Map(pairs) => {
            w.write_u8(MAP_EXT);
            w.write_u32_be(u32_len(pairs.len(), "map arity")?);
            for (k, v) in pairs {
                encode_into(k, w)?;
                encode_into(v, w)?;
            }
        }
    }
    Ok(())
}
