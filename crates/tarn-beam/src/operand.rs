//! Compact operand encoding for the instruction stream.
//!
//! Each operand is a tagged value. Small non-negative values pack into one
//! byte, medium ones into two, and anything wider carries minimal big-endian
//! continuation bytes behind a length prefix. Negative values (integer tag
//! only) use minimal two's complement, always via continuation bytes.

use tarn_core::ByteWriter;

use crate::atoms::{AtomId, AtomTable};
use crate::builder::Label;
use crate::error::{BeamError, BeamResult};

const TAG_LITERAL: u8 = 0;
const TAG_INTEGER: u8 = 1;
const TAG_ATOM: u8 = 2;
const TAG_X: u8 = 3;
const TAG_Y: u8 = 4;
const TAG_LABEL: u8 = 5;
const TAG_EXTENDED_LITERAL: u8 = 6;

/// An instruction operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    /// Untyped small literal (arity counts, flag words).
    Literal(u32),
    /// Signed immediate integer.
    Integer(i64),
    /// Reference to an interned atom.
    Atom(AtomId),
    /// X register index.
    X(u32),
    /// Y (stack slot) register index.
    Y(u32),
    /// Code label reference.
    Label(Label),
    /// Index into the literal table.
    ExtendedLiteral(u32),
}

/// Encode one operand into `w`.
///
/// Atom operands are checked against `atoms` so a stale or foreign id cannot
/// reach the output stream.
pub fn encode_operand(atoms: &AtomTable, op: Operand, w: &mut ByteWriter) -> BeamResult<()> {
    match op {
        Operand::Literal(v) => encode_tagged(TAG_LITERAL, i64::from(v), w),
        Operand::Integer(v) => encode_tagged(TAG_INTEGER, v, w),
        Operand::Atom(id) => {
            if !atoms.contains(id) {
                return Err(BeamError::UnresolvedAtom(id.get()));
            }
            encode_tagged(TAG_ATOM, i64::from(id.get()), w)
        }
        Operand::X(v) => encode_tagged(TAG_X, i64::from(v), w),
        Operand::Y(v) => encode_tagged(TAG_Y, i64::from(v), w),
        Operand::Label(l) => encode_tagged(TAG_LABEL, i64::from(l.get()), w),
        Operand::ExtendedLiteral(v) => encode_tagged(TAG_EXTENDED_LITERAL, i64::from(v), w),
    }
}

fn encode_tagged(tag: u8, value: i64, w: &mut ByteWriter) -> BeamResult<()> {
    if value < 0 {
        return encode_wide(tag, value, &negative_to_bytes(value), w);
    }
    if value < 0x10 {
        w.write_u8(((value as u8) << 4) | tag);
        return Ok(());
    }
    if value < 0x800 {
        w.write_u8((((value >> 3) as u8) & 0xE0) | 0x08 | tag);
        w.write_u8(value as u8);
        return Ok(());
    }
    encode_wide(tag, value, &unsigned_to_bytes(value as u64), w)
}

/// Continuation form: length prefix then 2..=8 minimal big-endian bytes.
fn encode_wide(tag: u8, value: i64, bytes: &[u8], w: &mut ByteWriter) -> BeamResult<()> {
    if bytes.len() > 8 {
        return Err(BeamError::OperandOutOfRange(value));
    }
    w.write_u8((((bytes.len() - 2) as u8) << 5) | 0x18 | tag);
    w.write_bytes(bytes);
    Ok(())
}

/// Minimal two's-complement encoding of a negative value, at least 2 bytes.
fn negative_to_bytes(n: i64) -> Vec<u8> {
    debug_assert!(n < 0);
    let mut len = 2usize;
    while len < 8 && n < -(1i64 << (8 * len as u32 - 1)) {
        len += 1;
    }
    n.to_be_bytes()[8 - len..].to_vec()
}

/// Minimal unsigned big-endian bytes, with a leading zero when the top bit
/// of the first byte would read as a sign.
fn unsigned_to_bytes(v: u64) -> Vec<u8> {
    let be = v.to_be_bytes();
    let start = be.iter().position(|&b| b != 0).unwrap_or(7);
    let mut out = Vec::with_capacity(9 - start);
    if be[start] & 0x80 != 0 {
        out.push(0);
    }
    out.extend_from_slice(&be[start..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn encode(atoms: &AtomTable, op: Operand) -> BeamResult<Vec<u8>> {
        let mut w = ByteWriter::new();
        encode_operand(atoms, op, &mut w)?;
        Ok(w.into_vec())
    }

    /// Reference decoder for one tagged value.
    fn decode_tagged(bytes: &[u8]) -> (u8, i64, usize) {
        let b0 = bytes[0];
        let tag = b0 & 0x07;
        if b0 & 0x08 == 0 {
            return (tag, i64::from(b0 >> 4), 1);
        }
        if b0 & 0x10 == 0 {
            let hi = i64::from(b0 & 0xE0) << 3;
            return (tag, hi | i64::from(bytes[1]), 2);
        }
        let len = usize::from(b0 >> 5) + 2;
        let raw = &bytes[1..1 + len];
        let negative = tag == TAG_INTEGER && raw[0] & 0x80 != 0;
        let mut acc: i64 = if negative { -1 } else { 0 };
        for &b in raw {
            acc = (acc << 8) | i64::from(b);
        }
        (tag, acc, 1 + len)
    }

    #[test]
    fn small_values_pack_into_one_byte() {
        let atoms = AtomTable::new();
        assert_eq!(encode(&atoms, Operand::Literal(0)).unwrap(), [0x00]);
        assert_eq!(encode(&atoms, Operand::X(2)).unwrap(), [0x23]);
        assert_eq!(encode(&atoms, Operand::Y(15)).unwrap(), [0xF4]);
        assert_eq!(encode(&atoms, Operand::Integer(5)).unwrap(), [0x51]);
    }

    #[test]
    fn medium_values_use_two_bytes() {
        let atoms = AtomTable::new();
        // 300 = 0b1_0010_1100: top bits into the prefix, low byte trails.
        assert_eq!(encode(&atoms, Operand::Integer(300)).unwrap(), [0x29, 0x2C]);
        assert_eq!(encode(&atoms, Operand::Literal(16)).unwrap(), [0x08, 0x10]);
        assert_eq!(encode(&atoms, Operand::Literal(0x7FF)).unwrap(), [0xE8, 0xFF]);
    }

    #[test]
    fn wide_values_use_continuation_bytes() {
        let atoms = AtomTable::new();
        // 0x800 is the first value past the two-byte form.
        assert_eq!(encode(&atoms, Operand::Integer(0x800)).unwrap(), [0x19, 0x08, 0x00]);
        // A value whose top byte has the sign bit set gains a zero byte.
        assert_eq!(
            encode(&atoms, Operand::Integer(0x8000)).unwrap(),
            [0x39, 0x00, 0x80, 0x00]
        );
        assert_eq!(
            encode(&atoms, Operand::Integer(i64::MAX)).unwrap(),
            [0xD9, 0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]
        );
    }

    #[test]
    fn negative_values_use_twos_complement() {
        let atoms = AtomTable::new();
        assert_eq!(encode(&atoms, Operand::Integer(-1)).unwrap(), [0x19, 0xFF, 0xFF]);
        assert_eq!(encode(&atoms, Operand::Integer(-0x8000)).unwrap(), [0x19, 0x80, 0x00]);
        assert_eq!(
            encode(&atoms, Operand::Integer(-0x8001)).unwrap(),
            [0x39, 0xFF, 0x7F, 0xFF]
        );
        assert_eq!(
            encode(&atoms, Operand::Integer(i64::MIN)).unwrap(),
            [0xD9, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn atoms_must_be_interned() {
        let mut atoms = AtomTable::new();
        let id = atoms.intern("ok");
        assert_eq!(encode(&atoms, Operand::Atom(id)).unwrap(), [0x12]);

        let stale = AtomId::from_raw(9);
        assert_eq!(
            encode(&atoms, Operand::Atom(stale)),
            Err(BeamError::UnresolvedAtom(9))
        );
    }

    proptest! {
        #[test]
        fn roundtrips_against_reference_decoder(
            tag in 0u8..=6,
            value in any::<i64>(),
        ) {
            prop_assume!(value >= 0 || tag == TAG_INTEGER);
            let mut w = ByteWriter::new();
            encode_tagged(tag, value, &mut w).unwrap();
            let enc = w.into_vec();
            let (t, v, used) = decode_tagged(&enc);
            prop_assert_eq!(t, tag);
            prop_assert_eq!(v, value);
            prop_assert_eq!(used, enc.len());
        }
    }
}
