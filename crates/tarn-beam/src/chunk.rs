//! IFF-style chunk framing.
//!
//! A chunk is its 4-byte ASCII tag, the payload length (pre-padding) as a
//! big-endian u32, the payload itself, then zero bytes up to the next 4-byte
//! boundary. Loaders use the stored length to slice the payload and the
//! padding to locate the next chunk.

use tarn_core::{ByteWriter, ChunkTag, CHUNK_ALIGN};

use crate::error::{u32_len, BeamResult};

/// Frame `payload` as a chunk under `tag`.
pub fn wrap(tag: ChunkTag, payload: &[u8]) -> BeamResult<Vec<u8>> {
    let mut w = ByteWriter::with_capacity(8 + payload.len() + CHUNK_ALIGN);
    w.write_tag(tag);
    w.write_u32_be(u32_len(payload.len(), "chunk payload")?);
    w.write_bytes(payload);
    w.pad_to(CHUNK_ALIGN);
    Ok(w.into_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn unaligned_payload_is_zero_padded() {
        let chunk = wrap(ChunkTag::Strings, &[1, 2, 3]).unwrap();
        assert_eq!(chunk, [b'S', b't', b'r', b'T', 0, 0, 0, 3, 1, 2, 3, 0]);
    }

    #[test]
    fn aligned_payload_gets_no_padding() {
        let chunk = wrap(ChunkTag::Code, &[9, 9, 9, 9]).unwrap();
        assert_eq!(chunk.len(), 12);
        assert_eq!(&chunk[8..], [9, 9, 9, 9]);
    }

    #[test]
    fn empty_payload_is_header_only() {
        let chunk = wrap(ChunkTag::Imports, &[]).unwrap();
        assert_eq!(chunk, [b'I', b'm', b'p', b'T', 0, 0, 0, 0]);
    }

    #[test]
    fn length_field_excludes_padding() {
        for n in 0..9usize {
            let payload = vec![0xAA; n];
            let chunk = wrap(ChunkTag::Literals, &payload).unwrap();
            let stored = u32::from_be_bytes(chunk[4..8].try_into().unwrap());
            assert_eq!(stored as usize, n);
            assert_eq!(chunk.len() % CHUNK_ALIGN, 0);
            assert_eq!(chunk.len(), 8 + n.div_ceil(CHUNK_ALIGN) * CHUNK_ALIGN);
        }
    }
}
