use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::error::{IsamError, Result};
use crate::index_entry::{IndexEntry, INDEX_ENTRY_SIZE};

/// The sparse index file: one `(key, page_number)` entry per primary page,
/// in page-number order. Loaded wholesale into memory on open, matching the
/// reference's one-pass read, with individual entries patched in place on
/// disk as pages change.
#[derive(Debug)]
pub(crate) struct IndexFile {
    file: File,
    entries: Vec<IndexEntry>,
    disk_ops: u64,
}

impl IndexFile {
    pub(crate) fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new()
            .create_new(true)
            .read(true)
            .write(true)
            .open(path)?;
        Ok(Self {
            file,
            entries: Vec::new(),
            disk_ops: 0,
        })
    }

    pub(crate) fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = OpenOptions::new().read(true).write(true).open(path)?;
        let size = file.metadata()?.len() as usize;
        if size % INDEX_ENTRY_SIZE != 0 {
            return Err(IsamError::Corrupt(format!(
                "index file size {size} not a multiple of entry size {INDEX_ENTRY_SIZE}"
            )));
        }
        let mut buf = vec![0u8; size];
        file.seek(SeekFrom::Start(0))?;
        file.read_exact(&mut buf)?;
        let mut entries = Vec::with_capacity(size / INDEX_ENTRY_SIZE);
        for chunk in buf.chunks(INDEX_ENTRY_SIZE) {
            entries.push(IndexEntry::decode(chunk)?);
        }
        Ok(Self {
            file,
            entries,
            disk_ops: 0,
        })
    }

    pub(crate) fn disk_ops(&self) -> u64 {
        self.disk_ops
    }

    pub(crate) fn reset_disk_ops(&mut self) {
        self.disk_ops = 0;
    }

    pub(crate) fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub(crate) fn num_pages(&self) -> usize {
        self.entries.len()
    }

    /// Contract (4.1): return `entry[j-1].page_number` where `j` is the
    /// smallest index with `entry[j].key > key`; if no such `j` exists,
    /// return the last entry's page number. Binary search over the
    /// in-memory sorted keys, equivalent to the reference's linear scan.
    pub(crate) fn lookup_page(&self, key: i32) -> Result<u16> {
        if self.entries.is_empty() {
            return Err(IsamError::Corrupt("index file is empty".into()));
        }
        // Partition point: first index whose key is > `key`.
        let j = self.entries.partition_point(|e| e.key <= key);
        if j == 0 {
            // Only possible if key < entries[0].key, which the sentinel
            // invariant rules out for valid callers (4.1).
            return Ok(self.entries[0].page_number);
        }
        Ok(self.entries[j - 1].page_number)
    }

    /// Append a new entry at the tail (used when `init` lays down the
    /// sentinel's entry, and by reorganization's rebuild).
    pub(crate) fn append_entry(&mut self, entry: IndexEntry) -> Result<()> {
        let offset = self.entries.len() * INDEX_ENTRY_SIZE;
        self.file.seek(SeekFrom::Start(offset as u64))?;
        self.file.write_all(&entry.encode())?;
        self.file.flush()?;
        self.disk_ops += 1;
        self.entries.push(entry);
        Ok(())
    }

    /// Overwrite the key of the entry for `page_number` in place (4.6 case 2:
    /// slot-0 deletion patches the page's index entry to the new slot-0 key).
    pub(crate) fn set_key_for_page(&mut self, page_number: u16, new_key: i32) -> Result<()> {
        let idx = self
            .entries
            .iter()
            .position(|e| e.page_number == page_number)
            .ok_or_else(|| {
                IsamError::Corrupt(format!("no index entry for page {page_number}"))
            })?;
        self.entries[idx].key = new_key;
        let offset = idx * INDEX_ENTRY_SIZE;
        self.file.seek(SeekFrom::Start(offset as u64))?;
        self.file.write_all(&self.entries[idx].encode())?;
        self.file.flush()?;
        self.disk_ops += 1;
        log::debug!("patched index entry for page {page_number} to key {new_key}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn make(entries: &[(i32, u16)]) -> (tempfile::TempDir, IndexFile) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("index.bin");
        let mut f = IndexFile::create(&path).unwrap();
        for (k, p) in entries {
            f.append_entry(IndexEntry {
                key: *k,
                page_number: *p,
            })
            .unwrap();
        }
        (dir, f)
    }

    #[test]
    fn lookup_page_picks_predecessor_of_first_greater() {
        let (_dir, f) = make(&[(1, 1), (10, 2), (20, 3)]);
        assert_eq!(f.lookup_page(1).unwrap(), 1);
        assert_eq!(f.lookup_page(5).unwrap(), 1);
        assert_eq!(f.lookup_page(10).unwrap(), 2);
        assert_eq!(f.lookup_page(15).unwrap(), 2);
        assert_eq!(f.lookup_page(999).unwrap(), 3);
    }

    #[test]
    fn set_key_for_page_patches_in_place() {
        let (_dir, mut f) = make(&[(1, 1), (10, 2)]);
        f.set_key_for_page(2, 12).unwrap();
        assert_eq!(f.entries()[1].key, 12);
    }
}
