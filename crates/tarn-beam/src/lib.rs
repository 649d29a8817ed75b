//! tarn-beam — writer for the Tarn compiled-module container
//!
//! Format:
//! ```text
//! Header: "FOR1" + u32 BE (length of everything after this field) + "BEAM"
//! [Chunk*]
//!   chunk = TAG[4] + len u32 BE (pre-padding) + payload + zero padding to 4
//! ```
//!
//! Chunks, in fixed order:
//! - "AtU8" : atom table (1-based identities, first-use order)
//! - "LocT" : local-function names (placeholder, empty count)
//! - "StrT" : string table (placeholder, empty blob)
//! - "LitT" : literal table, deflate-compressed
//! - "ImpT" : import table (placeholder, empty count)
//! - "FunT" : closure descriptors
//! - "ExpT" : exports
//! - "Code" : sub-header + raw instruction stream + end marker
//!
//! The encoder is single-pass and synchronous: a [`ModuleBuilder`] owns every
//! table plus the accumulated instruction bytes, is mutated in caller order,
//! and is consumed exactly once by [`ModuleBuilder::finish`]. Byte positions,
//! ordering and alignment follow the loader's format exactly; there is no
//! tolerance for approximate output.
//!
//! This crate is used by the Tarn compiler to serialize compiled modules.

#![deny(missing_docs)]

/// Atom interning: stable 1-based identities.
pub mod atoms;
/// The build context and final container assembly.
pub mod builder;
/// IFF-style chunk framing.
pub mod chunk;
/// Error taxonomy and result alias.
pub mod error;
/// Compact operand encoding for the instruction stream.
pub mod operand;
/// Table payload encoders (atoms, literals, closures, exports).
pub mod tables;
/// External term encoding for literal constants.
pub mod term;

pub use atoms::{AtomId, AtomTable};
pub use builder::{Label, ModuleBuilder, MAX_OPCODE};
pub use error::{BeamError, BeamResult};
pub use operand::Operand;
pub use tables::{Export, Lambda};
pub use term::{encode_literal, Literal};

/// Convenience re-exports of the types most callers need.
pub mod prelude {
    pub use super::{
        AtomId, AtomTable, BeamError, BeamResult, Label, Literal, ModuleBuilder, Operand,
    };
}
