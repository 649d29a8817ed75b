//! The build context and final container assembly.
//!
//! A [`ModuleBuilder`] accumulates the atom table, literal pool, lambda and
//! export tables and the raw instruction stream, then serializes everything
//! into the chunked container in one pass. Output is a pure function of the
//! call sequence: identical builds produce identical bytes.

use indexmap::IndexSet;
use tracing::{debug, trace};

use tarn_core::{ByteWriter, ChunkTag, MAGIC_CONTAINER, MAGIC_FORMAT};

use crate::atoms::{AtomId, AtomTable};
use crate::chunk;
use crate::error::{u32_len, BeamError, BeamResult};
use crate::operand::{encode_operand, Operand};
use crate::tables::{self, Export, Lambda};
use crate::term::{encode_literal, Literal};

/// Highest opcode the target format version understands.
pub const MAX_OPCODE: u8 = 158;

/// Instruction set identifier in the code sub-header.
const INSTRUCTION_SET: u32 = 0;

/// Fixed byte length of the code sub-header.
const CODE_SUBHEADER_LEN: u32 = 16;

/// Terminator byte after the instruction stream.
const END_OF_CODE: u8 = 3;

/// A minted code label (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label(u32);

impl Label {
    /// Raw 1-based value, as written into table entries and operands.
    pub const fn get(self) -> u32 {
        self.0
    }

    pub(crate) const fn from_raw(v: u32) -> Self {
        Self(v)
    }
}

/// Accumulates one module and serializes it with [`ModuleBuilder::finish`].
#[derive(Debug, Clone)]
pub struct ModuleBuilder {
    atoms: AtomTable,
    literals: IndexSet<Vec<u8>>,
    lambdas: Vec<Lambda>,
    exports: Vec<Export>,
    labels: u32,
    functions: u32,
    code: ByteWriter,
}

impl ModuleBuilder {
    /// Start a module named `module_name`. The module name is always the
    /// first atom, so its identity is 1.
    pub fn new(module_name: &str) -> Self {
        let mut atoms = AtomTable::new();
        atoms.intern(module_name);
        Self {
            atoms,
            literals: IndexSet::new(),
            lambdas: Vec::new(),
            exports: Vec::new(),
            labels: 0,
            functions: 0,
            code: ByteWriter::new(),
        }
    }

    /// Intern an atom, returning its identity.
    pub fn intern(&mut self, name: &str) -> AtomId {
        self.atoms.intern(name)
    }

    /// Read access to the atom table.
    pub fn atoms(&self) -> &AtomTable {
        &self.atoms
    }

    /// Mint a fresh label. Labels are 1-based and issued sequentially.
    pub fn new_label(&mut self) -> Label {
        self.labels += 1;
        Label(self.labels)
    }

    /// Add a literal to the pool, returning its 0-based index. Structurally
    /// identical literals share one entry, keyed on their encoded bytes.
    pub fn add_literal(&mut self, lit: &Literal) -> BeamResult<u32> {
        let encoded = encode_literal(lit)?;
        let (index, fresh) = self.literals.insert_full(encoded);
        trace!(index, fresh, "literal added");
        Ok(index as u32)
    }

    /// Register a closure descriptor, returning its table index.
    pub fn add_lambda(&mut self, name: AtomId, arity: u32, label: Label, free: u32) -> u32 {
        let index = self.lambdas.len() as u32;
        self.lambdas.push(Lambda { name, arity, label, index, free });
        index
    }

    /// Export `name/arity` at `label`.
    pub fn add_export(&mut self, name: AtomId, arity: u32, label: Label) {
        self.exports.push(Export { name, arity, label: Some(label) });
    }

    /// Declare an export whose entry label is not known yet. Returns a
    /// handle for [`ModuleBuilder::resolve_export`]; every pending export
    /// must be resolved before assembly.
    pub fn add_export_pending(&mut self, name: AtomId, arity: u32) -> usize {
        self.exports.push(Export { name, arity, label: None });
        self.exports.len() - 1
    }

    /// Supply the entry label of a pending export.
    pub fn resolve_export(&mut self, index: usize, label: Label) {
        if let Some(e) = self.exports.get_mut(index) {
            e.label = Some(label);
        }
    }

    /// Mark the start of a function body in the instruction stream.
    pub fn begin_function(&mut self) {
        self.functions += 1;
    }

    /// Append one instruction: the opcode byte, then each operand in the
    /// compact encoding.
    pub fn emit(&mut self, opcode: u8, args: &[Operand]) -> BeamResult<()> {
        if opcode > MAX_OPCODE {
            return Err(BeamError::OpcodeOutOfRange(opcode));
        }
        self.code.write_u8(opcode);
        for &arg in args {
            encode_operand(&self.atoms, arg, &mut self.code)?;
        }
        Ok(())
    }

    /// Bytes of instruction stream accumulated so far.
    pub fn code_len(&self) -> usize {
        self.code.len()
    }

    /// Label count as the code sub-header reports it. The loader counts the
    /// implicit zero label, hence minted labels plus one.
    pub fn label_count(&self) -> u32 {
        self.labels + 1
    }

    /// Serialize the module container.
    ///
    /// Chunk order is fixed; loaders rely on it. Consumes the builder, so a
    /// module is assembled exactly once.
    pub fn finish(self) -> BeamResult<Vec<u8>> {
        debug!(
            atoms = self.atoms.len(),
            literals = self.literals.len(),
            lambdas = self.lambdas.len(),
            exports = self.exports.len(),
            functions = self.functions,
            code_bytes = self.code.len(),
            "assembling module container"
        );

        let literal_bytes: Vec<Vec<u8>> = self.literals.iter().cloned().collect();

        let mut chunks = ByteWriter::new();
        chunks.write_bytes(&chunk::wrap(ChunkTag::Atoms, &tables::encode_atom_table(&self.atoms)?)?);
        chunks.write_bytes(&chunk::wrap(ChunkTag::LocalNames, &tables::empty_counted_table())?);
        chunks.write_bytes(&chunk::wrap(ChunkTag::Strings, &[])?);
        chunks.write_bytes(&chunk::wrap(ChunkTag::Literals, &tables::encode_literal_table(&literal_bytes)?)?);
        chunks.write_bytes(&chunk::wrap(ChunkTag::Imports, &tables::empty_counted_table())?);
        chunks.write_bytes(&chunk::wrap(ChunkTag::Lambdas, &tables::encode_lambda_table(&self.lambdas)?)?);
        chunks.write_bytes(&chunk::wrap(ChunkTag::Exports, &tables::encode_export_table(&self.atoms, &self.exports)?)?);
        chunks.write_bytes(&chunk::wrap(ChunkTag::Code, &encode_code_chunk(&self)?)?);

        let mut out = ByteWriter::with_capacity(12 + chunks.len());
        out.write_bytes(MAGIC_CONTAINER);
        out.write_u32_be(u32_len(MAGIC_FORMAT.len() + chunks.len(), "container length")?);
        out.write_bytes(MAGIC_FORMAT);
        out.write_bytes(chunks.as_slice());

        debug!(bytes = out.len(), "module container assembled");
        Ok(out.into_vec())
    }
}

/// Code chunk payload: fixed sub-header, instruction stream, end marker.
fn encode_code_chunk(b: &ModuleBuilder) -> BeamResult<Vec<u8>> {
    let mut w = ByteWriter::with_capacity(20 + b.code.len() + 1);
    w.write_u32_be(CODE_SUBHEADER_LEN);
    w.write_u32_be(INSTRUCTION_SET);
    w.write_u32_be(u32::from(MAX_OPCODE));
    w.write_u32_be(b.label_count());
    w.write_u32_be(b.functions);
    w.write_bytes(b.code.as_slice());
    w.write_u8(END_OF_CODE);
    Ok(w.into_vec())
}
