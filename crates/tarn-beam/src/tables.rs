//! Table payload encoders.
//!
//! Every table starts with a big-endian u32 entry count followed by its
//! fixed-layout rows. The literal table is the exception: its payload is the
//! uncompressed body length followed by the deflate-compressed body.

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use tarn_core::ByteWriter;

use crate::atoms::{AtomId, AtomTable};
use crate::builder::Label;
use crate::error::{u32_len, BeamError, BeamResult};

/// A closure (lambda) descriptor row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lambda {
    /// Atom naming the enclosing function.
    pub name: AtomId,
    /// Total arity including free variables.
    pub arity: u32,
    /// Entry label of the closure body.
    pub label: Label,
    /// Position in the lambda table.
    pub index: u32,
    /// Number of captured free variables.
    pub free: u32,
}

/// An export table entry. The label stays `None` while the export is pending
/// (declared before its function body was emitted).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Export {
    /// Exported function name.
    pub name: AtomId,
    /// Exported function arity.
    pub arity: u32,
    /// Entry label, once known.
    pub label: Option<Label>,
}

/// Encode the atom table: count, then length-prefixed UTF-8 names in
/// identity order.
pub fn encode_atom_table(atoms: &AtomTable) -> BeamResult<Vec<u8>> {
    let mut w = ByteWriter::new();
    w.write_u32_be(u32_len(atoms.len(), "atom table count")?);
    for name in atoms.iter() {
        let len = u8::try_from(name.len())
            .map_err(|_| BeamError::AtomTooLong(name.to_owned()))?;
        w.write_u8(len);
        w.write_bytes(name.as_bytes());
    }
    Ok(w.into_vec())
}

/// Encode the lambda table: count, then six u32 fields per row. The last
/// field is reserved and always zero.
pub fn encode_lambda_table(lambdas: &[Lambda]) -> BeamResult<Vec<u8>> {
    let mut w = ByteWriter::new();
    w.write_u32_be(u32_len(lambdas.len(), "lambda table count")?);
    for l in lambdas {
        w.write_u32_be(l.name.get());
        w.write_u32_be(l.arity);
        w.write_u32_be(l.label.get());
        w.write_u32_be(l.index);
        w.write_u32_be(l.free);
        w.write_u32_be(0);
    }
    Ok(w.into_vec())
}

/// Encode the export table: count, then (name, arity, label) per row.
/// A pending entry is an error at this point.
pub fn encode_export_table(atoms: &AtomTable, exports: &[Export]) -> BeamResult<Vec<u8>> {
    let mut w = ByteWriter::new();
    w.write_u32_be(u32_len(exports.len(), "export table count")?);
    for e in exports {
        let label = e.label.ok_or_else(|| BeamError::UnresolvedExport {
            name: atoms.resolve(e.name).unwrap_or("?").to_owned(),
            arity: e.arity,
        })?;
        w.write_u32_be(e.name.get());
        w.write_u32_be(e.arity);
        w.write_u32_be(label.get());
    }
    Ok(w.into_vec())
}

/// Encode the literal table payload: the uncompressed body length, then the
/// deflate-compressed body (count followed by the concatenated pre-encoded
/// terms).
pub fn encode_literal_table(literals: &[Vec<u8>]) -> BeamResult<Vec<u8>> {
    let mut body = ByteWriter::new();
    body.write_u32_be(u32_len(literals.len(), "literal table count")?);
    for lit in literals {
        body.write_bytes(lit);
    }

    let mut w = ByteWriter::new();
    w.write_u32_be(u32_len(body.len(), "uncompressed literal body")?);
    w.write_bytes(&deflate(body.as_slice())?);
    Ok(w.into_vec())
}

/// Deflate-compress `data` with the default level.
pub fn deflate(data: &[u8]) -> BeamResult<Vec<u8>> {
    let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
    enc.write_all(data)
        .and_then(|_| enc.finish())
        .map_err(|e| BeamError::Compress(e.to_string()))
}

/// A well-formed table with zero entries, for chunks emitted as placeholders.
pub(crate) fn empty_counted_table() -> Vec<u8> {
    vec![0, 0, 0, 0]
}
