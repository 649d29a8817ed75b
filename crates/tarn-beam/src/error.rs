//! Errors raised while encoding a module.
//!
//! Every error terminates the encoding pass that raised it; there is no
//! partial output to recover. Inputs are deterministic, so retrying with the
//! same input fails identically.

use thiserror::Error;

use crate::builder::MAX_OPCODE;

/// Result alias common to the writer.
pub type BeamResult<T> = core::result::Result<T, BeamError>;

/// Errors produced by the module writer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BeamError {
    /// A literal integer outside the fixed 32-bit term encoding.
    #[error("literal integer {0} does not fit the 32-bit term encoding")]
    LiteralOutOfRange(i64),

    /// An operand value needing more continuation bytes than the compact
    /// scheme allows.
    #[error("operand value {0} does not fit in 8 continuation bytes")]
    OperandOutOfRange(i64),

    /// An opcode above the maximum the target format version understands.
    #[error("opcode {0} is outside the supported range 0..={}", MAX_OPCODE)]
    OpcodeOutOfRange(u8),

    /// An atom id that was never issued by the interner.
    #[error("atom id {0} was never interned")]
    UnresolvedAtom(u32),

    /// An export still pending (no entry label) at assembly time.
    #[error("export {name}/{arity} has no entry label")]
    UnresolvedExport {
        /// Exported function name.
        name: String,
        /// Exported function arity.
        arity: u32,
    },

    /// An atom name too long for its length field.
    #[error("atom `{0}` is too long to encode")]
    AtomTooLong(String),

    /// A count or byte length exceeding its 32-bit field. Checked and
    /// reported rather than silently truncated.
    #[error("{what} of {len} overflows its 32-bit field")]
    FieldOverflow {
        /// Which count or length overflowed.
        what: &'static str,
        /// The offending value.
        len: usize,
    },

    /// The compression backend failed. Does not happen with in-memory
    /// buffers; surfaced instead of being swallowed.
    #[error("literal table compression failed: {0}")]
    Compress(String),
}

/// Narrow a length/count to the u32 its field requires.
pub(crate) fn u32_len(len: usize, what: &'static str) -> BeamResult<u32> {
    u32::try_from(len).map_err(|_| BeamError::FieldOverflow { what, len })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn u32_len_passes_and_reports() {
        assert_eq!(u32_len(7, "x"), Ok(7));
        assert_eq!(
            u32_len(usize::MAX, "atom table count"),
            Err(BeamError::FieldOverflow { what: "atom table count", len: usize::MAX })
        );
    }

    #[test]
    fn messages_name_the_culprit() {
        let err = BeamError::UnresolvedExport { name: "run".into(), arity: 2 };
        assert_eq!(err.to_string(), "export run/2 has no entry label");

        let err = BeamError::OpcodeOutOfRange(200);
        assert_eq!(err.to_string(), "opcode 200 is outside the supported range 0..=158");
    }
}
