use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{IsamError, Result};

/// Packed size of one sparse-index entry on disk.
pub const INDEX_ENTRY_SIZE: usize = 6;

/// One entry of the sparse index: the lowest key on a page, and that page's
/// (1-based) page number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry {
    pub key: i32,
    pub page_number: u16,
}

impl IndexEntry {
    pub(crate) fn encode(&self) -> [u8; INDEX_ENTRY_SIZE] {
        let mut buf = [0u8; INDEX_ENTRY_SIZE];
        buf[0..4].copy_from_slice(&self.key.to_le_bytes());
        buf[4..6].copy_from_slice(&self.page_number.to_le_bytes());
        buf
    }

    pub(crate) fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() != INDEX_ENTRY_SIZE {
            return Err(IsamError::Corrupt(format!(
                "index entry buffer wrong size: expected {INDEX_ENTRY_SIZE}, got {}",
                buf.len()
            )));
        }
        let mut rdr = std::io::Cursor::new(buf);
        let key = rdr.read_i32::<LittleEndian>()?;
        let page_number = rdr.read_u16::<LittleEndian>()?;
        Ok(Self { key, page_number })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        let e = IndexEntry {
            key: 17,
            page_number: 3,
        };
        let buf = e.encode();
        assert_eq!(buf.len(), INDEX_ENTRY_SIZE);
        assert_eq!(IndexEntry::decode(&buf).unwrap(), e);
    }
}
