use std::path::Path;

use crate::config::StoreConfig;
use crate::cursor;
use crate::data_file::DataFile;
use crate::error::Result;
use crate::index_entry::IndexEntry;
use crate::index_file::IndexFile;
use crate::page::Page;
use crate::record::{OVF_NULL, SENTINEL_KEY};

/// Result of a completed reorganization: freshly opened handles over the
/// rebuilt files, and the new primary area size.
pub(crate) struct Rebuilt {
    pub(crate) data: DataFile,
    pub(crate) index: IndexFile,
    pub(crate) primary_area_size: u64,
}

/// Full sequential rebuild (4.8): scan the store in logical key order,
/// packing fresh pages to `floor(alpha * P)` slots, and atomically replace
/// both files. The overflow area is empty afterwards.
pub(crate) fn reorganize(
    data_path: &Path,
    index_path: &Path,
    data: &mut DataFile,
    index: &IndexFile,
    cfg: &StoreConfig,
) -> Result<Rebuilt> {
    let fill = cfg.reorg_fill();

    let sentinel_page = data.read_page(1, cfg)?;
    let mut sentinel = sentinel_page.slots[0].clone();
    sentinel.overflow_pointer = OVF_NULL;

    let data_tmp_path = data_path.with_extension("reorg.tmp");
    let index_tmp_path = index_path.with_extension("reorg.tmp");
    let _ = std::fs::remove_file(&data_tmp_path);
    let _ = std::fs::remove_file(&index_tmp_path);

    let mut data_tmp = DataFile::create(&data_tmp_path)?;
    let mut index_tmp = IndexFile::create(&index_tmp_path)?;

    let mut builder = PageBuilder {
        buffer: Page::new_empty(cfg),
        slot_idx: 0,
        new_page_no: 1,
        pages_written: 0,
        fill,
    };

    builder.place(sentinel, &mut data_tmp, &mut index_tmp, cfg)?;

    let mut prev_key = SENTINEL_KEY;
    loop {
        let mut next = cursor::next_after(data, index, cfg, prev_key)?;
        if next.key == 0 {
            break;
        }
        next.overflow_pointer = OVF_NULL;
        prev_key = next.key;
        builder.place(next, &mut data_tmp, &mut index_tmp, cfg)?;
    }

    if builder.slot_idx > 0 {
        flush(
            &mut data_tmp,
            &mut index_tmp,
            &builder.buffer,
            cfg,
            builder.new_page_no,
        )?;
        builder.pages_written += 1;
    }
    let pages_written = builder.pages_written;

    std::fs::rename(&data_tmp_path, data_path)?;
    std::fs::rename(&index_tmp_path, index_path)?;

    let primary_area_size = pages_written * cfg.page_size() as u64;
    log::info!(
        "reorganize: rebuilt {pages_written} pages ({primary_area_size} bytes), overflow area emptied"
    );

    Ok(Rebuilt {
        data: DataFile::open(data_path)?,
        index: IndexFile::open(index_path)?,
        primary_area_size,
    })
}

/// Accumulates decoded records into fixed-fill pages during a rebuild,
/// flushing a page (and its index entry) once it reaches `fill` slots.
struct PageBuilder {
    buffer: Page,
    slot_idx: usize,
    new_page_no: u16,
    pages_written: u64,
    fill: usize,
}

impl PageBuilder {
    fn place(
        &mut self,
        rec: crate::record::Record,
        data_tmp: &mut DataFile,
        index_tmp: &mut IndexFile,
        cfg: &StoreConfig,
    ) -> Result<()> {
        self.buffer.slots[self.slot_idx] = rec;
        self.slot_idx += 1;
        if self.slot_idx == self.fill {
            flush(data_tmp, index_tmp, &self.buffer, cfg, self.new_page_no)?;
            self.buffer = Page::new_empty(cfg);
            self.slot_idx = 0;
            self.new_page_no += 1;
            self.pages_written += 1;
        }
        Ok(())
    }
}

fn flush(
    data_tmp: &mut DataFile,
    index_tmp: &mut IndexFile,
    buffer: &Page,
    cfg: &StoreConfig,
    page_no: u16,
) -> Result<()> {
    data_tmp.append_page_unchecked(buffer, cfg)?;
    index_tmp.append_entry(IndexEntry {
        key: buffer.slots[0].key,
        page_number: page_no,
    })?;
    Ok(())
}
