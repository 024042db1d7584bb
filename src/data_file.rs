use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::config::StoreConfig;
use crate::error::{IsamError, Result};
use crate::page::Page;
use crate::record::Record;

/// Raw page/record I/O on the data file. Every physical read or write bumps
/// a disk-op counter, reset per logical operation by the owning [`crate::Store`]
/// and summed into the count it returns.
#[derive(Debug)]
pub(crate) struct DataFile {
    file: File,
    disk_ops: u64,
}

impl DataFile {
    pub(crate) fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new()
            .create_new(true)
            .read(true)
            .write(true)
            .open(path)?;
        Ok(Self { file, disk_ops: 0 })
    }

    pub(crate) fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        Ok(Self { file, disk_ops: 0 })
    }

    pub(crate) fn len(&mut self) -> Result<u64> {
        Ok(self.file.metadata()?.len())
    }

    pub(crate) fn disk_ops(&self) -> u64 {
        self.disk_ops
    }

    pub(crate) fn reset_disk_ops(&mut self) {
        self.disk_ops = 0;
    }

    /// Read the `page_number`-th (1-based) page of `cfg.page_size()` bytes.
    pub(crate) fn read_page(&mut self, page_number: u16, cfg: &StoreConfig) -> Result<Page> {
        let offset = (page_number as u64 - 1) * cfg.page_size() as u64;
        let mut buf = vec![0u8; cfg.page_size()];
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.read_exact(&mut buf).map_err(|_| {
            IsamError::Corrupt(format!("short read for page {page_number}"))
        })?;
        self.disk_ops += 1;
        log::trace!("read_page({page_number}) at offset {offset}");
        Page::decode(&buf, cfg)
    }

    /// Write the `page_number`-th (1-based) page. Rejects writes landing at
    /// or past `primary_area_size` — pages are only ever written within the
    /// already-allocated primary area during normal operation.
    pub(crate) fn write_page(
        &mut self,
        page_number: u16,
        page: &Page,
        cfg: &StoreConfig,
        primary_area_size: u64,
    ) -> Result<()> {
        let offset = (page_number as u64 - 1) * cfg.page_size() as u64;
        if offset >= primary_area_size {
            return Err(IsamError::Corrupt(format!(
                "refusing to write page {page_number} past primary area ({primary_area_size} bytes)"
            )));
        }
        let buf = page.encode(cfg)?;
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(&buf)?;
        self.file.flush()?;
        self.disk_ops += 1;
        log::trace!("write_page({page_number}) at offset {offset}");
        Ok(())
    }

    /// Read a single record at an absolute byte offset (used for overflow
    /// records; offset must be `>= primary_area_size` and aligned to `R`).
    pub(crate) fn read_record_at(&mut self, offset: u64, cfg: &StoreConfig) -> Result<Record> {
        let mut buf = vec![0u8; cfg.record_size()];
        self.file.seek(SeekFrom::Start(offset))?;
        self.file
            .read_exact(&mut buf)
            .map_err(|_| IsamError::Corrupt(format!("short read at offset {offset}")))?;
        self.disk_ops += 1;
        log::trace!("read_record_at({offset})");
        Record::decode(&buf, cfg.payload_len)
    }

    pub(crate) fn write_record_at(
        &mut self,
        offset: u64,
        record: &Record,
        cfg: &StoreConfig,
    ) -> Result<()> {
        let buf = record.encode(cfg.payload_len)?;
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(&buf)?;
        self.file.flush()?;
        self.disk_ops += 1;
        log::trace!("write_record_at({offset})");
        Ok(())
    }

    /// Append a full page at the current end of file, with no bound check
    /// against any existing `primary_area_size`. Used only by
    /// reorganization while building a brand-new data file sequentially.
    pub(crate) fn append_page_unchecked(&mut self, page: &Page, cfg: &StoreConfig) -> Result<()> {
        let buf = page.encode(cfg)?;
        self.file.seek(SeekFrom::End(0))?;
        self.file.write_all(&buf)?;
        self.file.flush()?;
        self.disk_ops += 1;
        Ok(())
    }

    /// Scan the whole file sequentially without bumping the disk-op counter,
    /// for [`crate::Store::print_data_file`] (a diagnostic, not a counted
    /// logical operation).
    pub(crate) fn read_raw_sequential(&mut self) -> Result<Vec<u8>> {
        self.file.seek(SeekFrom::Start(0))?;
        let mut buf = Vec::new();
        self.file.read_to_end(&mut buf)?;
        Ok(buf)
    }
}
