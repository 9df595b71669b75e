//! Primitive wire codecs.
//!
//! Every message payload is built from a small set of primitives: one-byte
//! booleans, LEB128-style variable-length integers (7 data bits per byte,
//! high bit set on continuation), UTF-8 strings with a varint length prefix,
//! and block positions packed into a big-endian `u64`.

use thiserror::Error;

use veinminer_core::{BlockPosition, KeyError, NamespacedKey};

/// The most bytes a varint-encoded `u32` may span.
const MAX_VARINT_BYTES: usize = 5;

/// Error raised while decoding wire data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The buffer ended before the value was complete.
    #[error("unexpected end of buffer")]
    UnexpectedEof,

    /// A varint ran past its 5-byte bound.
    #[error("varint is too long")]
    VarIntTooLong,

    /// String bytes were not valid UTF-8.
    #[error("string is not valid utf-8")]
    InvalidUtf8,

    /// A namespaced key failed validation after decoding.
    #[error(transparent)]
    InvalidKey(#[from] KeyError),

    /// Bytes remained after the payload was fully decoded.
    #[error("{0} trailing bytes after message payload")]
    TrailingBytes(usize),
}

/// Serializes primitives into a message payload.
#[derive(Debug, Default)]
pub struct MessageWriter {
    buffer: Vec<u8>,
}

impl MessageWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_u8(&mut self, value: u8) -> &mut Self {
        self.buffer.push(value);
        self
    }

    pub fn write_bool(&mut self, value: bool) -> &mut Self {
        self.write_u8(u8::from(value))
    }

    /// Writes a variable-length integer, 7 bits per byte, least significant
    /// group first, high bit marking continuation.
    pub fn write_varint(&mut self, mut value: u32) -> &mut Self {
        while value & !0x7F != 0 {
            self.write_u8((value as u8 & 0x7F) | 0x80);
            value >>= 7;
        }
        self.write_u8(value as u8)
    }

    /// Writes a varint length prefix followed by the UTF-8 bytes.
    pub fn write_string(&mut self, value: &str) -> &mut Self {
        self.write_varint(value.len() as u32);
        self.buffer.extend_from_slice(value.as_bytes());
        self
    }

    /// Writes a namespaced key as its `namespace:key` string.
    pub fn write_key(&mut self, key: &NamespacedKey) -> &mut Self {
        self.write_string(&key.to_string())
    }

    /// Writes a block position as its packed big-endian `u64`.
    pub fn write_block_position(&mut self, position: BlockPosition) -> &mut Self {
        self.buffer.extend_from_slice(&position.pack().to_be_bytes());
        self
    }

    /// The accumulated payload.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }
}

/// Deserializes primitives from a message payload.
#[derive(Debug)]
pub struct MessageReader<'a> {
    buffer: &'a [u8],
    cursor: usize,
}

impl<'a> MessageReader<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, cursor: 0 }
    }

    /// The number of bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.cursor
    }

    /// Fails with [`CodecError::TrailingBytes`] unless the buffer was
    /// consumed exactly.
    pub fn finish(&self) -> Result<(), CodecError> {
        match self.remaining() {
            0 => Ok(()),
            trailing => Err(CodecError::TrailingBytes(trailing)),
        }
    }

    pub fn read_u8(&mut self) -> Result<u8, CodecError> {
        let byte = *self
            .buffer
            .get(self.cursor)
            .ok_or(CodecError::UnexpectedEof)?;
        self.cursor += 1;
        Ok(byte)
    }

    pub fn read_bool(&mut self) -> Result<bool, CodecError> {
        Ok(self.read_u8()? == 1)
    }

    pub fn read_varint(&mut self) -> Result<u32, CodecError> {
        let mut result: u32 = 0;
        for index in 0..MAX_VARINT_BYTES {
            let byte = self.read_u8()?;
            result |= u32::from(byte & 0x7F) << (index * 7);
            if byte & 0x80 == 0 {
                return Ok(result);
            }
        }
        Err(CodecError::VarIntTooLong)
    }

    pub fn read_string(&mut self) -> Result<String, CodecError> {
        let length = self.read_varint()? as usize;
        if self.remaining() < length {
            return Err(CodecError::UnexpectedEof);
        }

        let bytes = &self.buffer[self.cursor..self.cursor + length];
        self.cursor += length;
        String::from_utf8(bytes.to_vec()).map_err(|_| CodecError::InvalidUtf8)
    }

    pub fn read_key(&mut self) -> Result<NamespacedKey, CodecError> {
        let raw = self.read_string()?;
        Ok(raw.parse()?)
    }

    pub fn read_block_position(&mut self) -> Result<BlockPosition, CodecError> {
        if self.remaining() < 8 {
            return Err(CodecError::UnexpectedEof);
        }

        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&self.buffer[self.cursor..self.cursor + 8]);
        self.cursor += 8;
        Ok(BlockPosition::unpack(u64::from_be_bytes(bytes)))
    }
}
