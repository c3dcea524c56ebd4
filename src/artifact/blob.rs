//! Framed, checksummed bincode blobs.
//!
//! Layout (big-endian):
//!
//! | bytes | field |
//! | --- | --- |
//! | 4 | magic |
//! | 2 | format version |
//! | 4 | CRC32 of the payload |
//! | 8 | payload length |
//! | n | bincode payload |

use std::io::{Cursor, Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{Result, SentiscopeError};

pub const FORMAT_VERSION: u16 = 1;
pub const HEADER_LEN: usize = 4 + 2 + 4 + 8;

/// Fixed-size prefix of every blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlobHeader {
    pub magic: [u8; 4],
    pub version: u16,
    pub checksum: u32,
    pub payload_len: u64,
}

impl BlobHeader {
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.magic)?;
        writer.write_u16::<BigEndian>(self.version)?;
        writer.write_u32::<BigEndian>(self.checksum)?;
        writer.write_u64::<BigEndian>(self.payload_len)?;
        Ok(())
    }

    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        Ok(BlobHeader {
            magic,
            version: reader.read_u16::<BigEndian>()?,
            checksum: reader.read_u32::<BigEndian>()?,
            payload_len: reader.read_u64::<BigEndian>()?,
        })
    }
}

/// Serialise `value` into a framed blob tagged with `magic`.
pub fn encode<T: Serialize>(magic: [u8; 4], value: &T) -> Result<Vec<u8>> {
    let payload = bincode::serialize(value)?;
    let header = BlobHeader {
        magic,
        version: FORMAT_VERSION,
        checksum: crc32fast::hash(&payload),
        payload_len: payload.len() as u64,
    };

    let mut out = Vec::with_capacity(HEADER_LEN + payload.len());
    header.write_to(&mut out)?;
    out.extend_from_slice(&payload);
    Ok(out)
}

/// Decode a blob written by [`encode`] with the same `magic`.
///
/// `name` only labels error messages.
pub fn decode<T: DeserializeOwned>(name: &str, magic: [u8; 4], bytes: &[u8]) -> Result<T> {
    if bytes.len() < HEADER_LEN {
        return Err(SentiscopeError::artifact(format!(
            "{name} is truncated ({} bytes)",
            bytes.len()
        )));
    }

    let mut cursor = Cursor::new(bytes);
    let header = BlobHeader::read_from(&mut cursor)?;
    if header.magic != magic {
        return Err(SentiscopeError::artifact(format!(
            "{name} has unexpected magic {:?}",
            header.magic
        )));
    }
    if header.version != FORMAT_VERSION {
        return Err(SentiscopeError::artifact(format!(
            "{name} uses format version {}, expected {FORMAT_VERSION}",
            header.version
        )));
    }

    let payload = &bytes[HEADER_LEN..];
    if payload.len() as u64 != header.payload_len {
        return Err(SentiscopeError::artifact(format!(
            "{name} payload is {} bytes, header says {}",
            payload.len(),
            header.payload_len
        )));
    }
    if crc32fast::hash(payload) != header.checksum {
        return Err(SentiscopeError::artifact(format!("{name} failed checksum verification")));
    }

    bincode::deserialize(payload)
        .map_err(|e| SentiscopeError::artifact(format!("{name} could not be decoded: {e}")))
}
