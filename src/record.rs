use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{IsamError, Result};

/// Sentinel overflow pointer meaning "no successor" (`0xDEADDEAD`).
pub const OVF_NULL: u32 = 0xDEAD_DEAD;

/// Key reserved for the sentinel record installed by `init`.
pub const SENTINEL_KEY: i32 = 1;

/// A fixed-size keyed record.
///
/// On disk: `numbers[L]` (opaque payload), `key` (i32 LE), `overflow_pointer`
/// (u32 LE), packed with no padding. `numbers.len()` must equal the store's
/// configured payload length; callers that build records by hand should go
/// through [`Record::new`] to get that checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub numbers: Vec<u8>,
    pub key: i32,
    pub overflow_pointer: u32,
}

impl Record {
    pub fn new(key: i32, numbers: Vec<u8>) -> Self {
        Self {
            numbers,
            key,
            overflow_pointer: OVF_NULL,
        }
    }

    /// An empty slot: key 0, zeroed payload, no successor.
    pub fn empty(payload_len: usize) -> Self {
        Self {
            numbers: vec![0u8; payload_len],
            key: 0,
            overflow_pointer: OVF_NULL,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.key == 0
    }

    pub(crate) fn encode_into(&self, payload_len: usize, out: &mut Vec<u8>) -> Result<()> {
        if self.numbers.len() != payload_len {
            return Err(IsamError::Corrupt(format!(
                "record payload length mismatch: expected {}, got {}",
                payload_len,
                self.numbers.len()
            )));
        }
        out.extend_from_slice(&self.numbers);
        out.write_i32::<LittleEndian>(self.key)?;
        out.write_u32::<LittleEndian>(self.overflow_pointer)?;
        Ok(())
    }

    pub(crate) fn encode(&self, payload_len: usize) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(payload_len + 8);
        self.encode_into(payload_len, &mut buf)?;
        Ok(buf)
    }

    pub(crate) fn decode(buf: &[u8], payload_len: usize) -> Result<Self> {
        if buf.len() != payload_len + 8 {
            return Err(IsamError::Corrupt(format!(
                "record buffer wrong size: expected {}, got {}",
                payload_len + 8,
                buf.len()
            )));
        }
        let numbers = buf[..payload_len].to_vec();
        let mut rdr = std::io::Cursor::new(&buf[payload_len..]);
        let key = rdr.read_i32::<LittleEndian>()?;
        let overflow_pointer = rdr.read_u32::<LittleEndian>()?;
        Ok(Self {
            numbers,
            key,
            overflow_pointer,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_encode_decode() {
        let r = Record::new(42, vec![1, 2, 3, 4, 5]);
        let buf = r.encode(5).unwrap();
        assert_eq!(buf.len(), 5 + 8);
        let back = Record::decode(&buf, 5).unwrap();
        assert_eq!(back, r);
    }

    #[test]
    fn empty_slot_has_zero_key() {
        let e = Record::empty(3);
        assert!(e.is_empty());
        assert_eq!(e.overflow_pointer, OVF_NULL);
    }

    #[test]
    fn encode_rejects_wrong_payload_length() {
        let r = Record::new(2, vec![1, 2]);
        assert!(r.encode(5).is_err());
    }

    #[test]
    fn decode_is_little_endian() {
        let mut buf = vec![0u8; 0];
        buf.extend_from_slice(&[]); // no payload
        buf.extend_from_slice(&5i32.to_le_bytes());
        buf.extend_from_slice(&OVF_NULL.to_le_bytes());
        let r = Record::decode(&buf, 0).unwrap();
        assert_eq!(r.key, 5);
        assert_eq!(r.overflow_pointer, OVF_NULL);
    }
}
