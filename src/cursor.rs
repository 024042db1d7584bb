use crate::config::StoreConfig;
use crate::data_file::DataFile;
use crate::error::{IsamError, Result};
use crate::index_file::IndexFile;
use crate::locate::{locate, Location};
use crate::record::{Record, OVF_NULL};

/// Logical "get next" traversal (4.7): given a key currently present in the
/// store, return the record with the immediately larger key, or an
/// end-of-file record (key 0). Internal only — the public API deliberately
/// doesn't expose a range iterator (see Non-goals); this backs
/// [`crate::Store::reorganize`]'s sequential rebuild scan.
pub(crate) fn next_after(
    data: &mut DataFile,
    index: &IndexFile,
    cfg: &StoreConfig,
    key: i32,
) -> Result<Record> {
    let page_no = index.lookup_page(key)?;
    let page = data.read_page(page_no, cfg)?;

    match locate(data, cfg, &page, key)? {
        Some(Location::Main { idx }) => {
            let slot = &page.slots[idx];
            if slot.overflow_pointer != OVF_NULL {
                return data.read_record_at(slot.overflow_pointer as u64, cfg);
            }
            if idx + 1 < page.slots.len() && !page.slots[idx + 1].is_empty() {
                return Ok(page.slots[idx + 1].clone());
            }
            next_page_first_record(data, index, cfg, page_no)
        }
        Some(Location::Overflow {
            anchor_idx,
            curr_ptr,
            ..
        }) => {
            let curr = data.read_record_at(curr_ptr, cfg)?;
            if curr.overflow_pointer != OVF_NULL {
                return data.read_record_at(curr.overflow_pointer as u64, cfg);
            }
            if anchor_idx + 1 < page.slots.len() && !page.slots[anchor_idx + 1].is_empty() {
                return Ok(page.slots[anchor_idx + 1].clone());
            }
            next_page_first_record(data, index, cfg, page_no)
        }
        None => Err(IsamError::NotFound(key)),
    }
}

fn next_page_first_record(
    data: &mut DataFile,
    index: &IndexFile,
    cfg: &StoreConfig,
    page_no: u16,
) -> Result<Record> {
    if (page_no as usize) < index.num_pages() {
        let next_page = data.read_page(page_no + 1, cfg)?;
        if let Some(first) = next_page.slots.first() {
            if !first.is_empty() {
                return Ok(first.clone());
            }
        }
    }
    Ok(Record::empty(cfg.payload_len))
}
