//! tarn-core — shared primitives for the Tarn toolchain
//!
//! Provides:
//! - Container constants (`MAGIC_CONTAINER`, `MAGIC_FORMAT`, `CHUNK_ALIGN`)
//! - `ChunkTag` (fourcc) naming the sections of a compiled module
//! - Memory IO (big-endian): `ByteWriter`
//!
//! The module container is an IFF-style file in which every multi-byte
//! field is big-endian, so the writer here is BE throughout.

#![deny(missing_docs)]

/* ─────────────────────────── Container constants ─────────────────────────── */

/// Magic of the outer container: `b"FOR1"`.
pub const MAGIC_CONTAINER: &[u8; 4] = b"FOR1";

/// Magic of the module format, written right after the container length.
pub const MAGIC_FORMAT: &[u8; 4] = b"BEAM";

/// Chunk payloads are zero-padded to this boundary.
pub const CHUNK_ALIGN: usize = 4;

/// Chunk tags (fourcc) — exactly 4 octets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ChunkTag {
    /// AtU8 : atom table (UTF-8 names in identity order)
    Atoms = u32::from_be_bytes(*b"AtU8"),
    /// LocT : local-function name table (placeholder)
    LocalNames = u32::from_be_bytes(*b"LocT"),
    /// StrT : string table (placeholder blob)
    Strings = u32::from_be_bytes(*b"StrT"),
    /// LitT : literal table (deflate-compressed)
    Literals = u32::from_be_bytes(*b"LitT"),
    /// ImpT : import table (placeholder)
    Imports = u32::from_be_bytes(*b"ImpT"),
    /// FunT : closure descriptor table
    Lambdas = u32::from_be_bytes(*b"FunT"),
    /// ExpT : export table
    Exports = u32::from_be_bytes(*b"ExpT"),
    /// Code : sub-header followed by the raw instruction stream
    Code = u32::from_be_bytes(*b"Code"),
}

impl ChunkTag {
    /// The fourcc as 4 big-endian bytes.
    pub const fn to_be_bytes(self) -> [u8; 4] {
        (self as u32).to_be_bytes()
    }

    /// Parse a tag from 4 big-endian bytes.
    pub const fn from_be_bytes(b: [u8; 4]) -> Option<Self> {
        match u32::from_be_bytes(b) {
            x if x == ChunkTag::Atoms as u32 => Some(ChunkTag::Atoms),
            x if x == ChunkTag::LocalNames as u32 => Some(ChunkTag::LocalNames),
            x if x == ChunkTag::Strings as u32 => Some(ChunkTag::Strings),
            x if x == ChunkTag::Literals as u32 => Some(ChunkTag::Literals),
            x if x == ChunkTag::Imports as u32 => Some(ChunkTag::Imports),
            x if x == ChunkTag::Lambdas as u32 => Some(ChunkTag::Lambdas),
            x if x == ChunkTag::Exports as u32 => Some(ChunkTag::Exports),
            x if x == ChunkTag::Code as u32 => Some(ChunkTag::Code),
            _ => None,
        }
    }
}

/* ─────────────────────────── Byte Writer (BE) ─────────────────────────── */

/// Growable write buffer with big-endian helpers.
#[derive(Debug, Default, Clone)]
pub struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Create an empty writer with pre-reserved capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self { buf: Vec::with_capacity(capacity) }
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// True when nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Read access to the contents.
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Take the buffer (consumes the writer).
    pub fn into_vec(self) -> Vec<u8> {
        self.buf
    }

    /// Append raw bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Write a chunk tag (fourcc, big-endian).
    pub fn write_tag(&mut self, tag: ChunkTag) {
        self.write_bytes(&tag.to_be_bytes());
    }

    /// Write a single byte.
    pub fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    /// Write a u16 big-endian.
    pub fn write_u16_be(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    /// Write a u32 big-endian.
    pub fn write_u32_be(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    /// Write an i32 big-endian.
    pub fn write_i32_be(&mut self, v: i32) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    /// Write a u64 big-endian.
    pub fn write_u64_be(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    /// Write an f64 as its IEEE-754 bits, big-endian.
    pub fn write_f64_be(&mut self, v: f64) {
        self.buf.extend_from_slice(&v.to_bits().to_be_bytes());
    }

    /// Append zero bytes until the total length is a multiple of `align`.
    pub fn pad_to(&mut self, align: usize) {
        let rem = self.buf.len() % align;
        if rem != 0 {
            self.buf.resize(self.buf.len() + (align - rem), 0);
        }
    }
}

/* ─────────────────────────── Tests ─────────────────────────── */
