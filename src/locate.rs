use crate::config::StoreConfig;
use crate::data_file::DataFile;
use crate::error::Result;
use crate::page::{Page, Scan};
use crate::record::OVF_NULL;

/// Where a key lives relative to a page already fetched via the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Location {
    Main {
        idx: usize,
    },
    Overflow {
        /// Slot whose `overflow_pointer` anchors the chain.
        anchor_idx: usize,
        /// Offset of the overflow record immediately before the match, or
        /// `None` if the match is the chain head (anchored directly by the
        /// page slot).
        prev_ptr: Option<u64>,
        /// Offset of the matching overflow record.
        curr_ptr: u64,
    },
}

/// Resolve `key` against an already-loaded page, walking into its overflow
/// chain if needed (4.5/4.6 shared lookup). `None` means not found.
pub(crate) fn locate(
    data: &mut DataFile,
    cfg: &StoreConfig,
    page: &Page,
    key: i32,
) -> Result<Option<Location>> {
    let scan = page.scan(key);
    if let Scan::Found(idx) = scan {
        return Ok(Some(Location::Main { idx }));
    }

    let anchor_idx = match page.anchor_for(scan) {
        Some(a) => a,
        None => return Ok(None),
    };
    let anchor = &page.slots[anchor_idx];
    if anchor.overflow_pointer == OVF_NULL {
        return Ok(None);
    }

    let mut prev_ptr: Option<u64> = None;
    let mut curr_ptr = anchor.overflow_pointer as u64;
    loop {
        let curr = data.read_record_at(curr_ptr, cfg)?;
        if curr.key == key {
            return Ok(Some(Location::Overflow {
                anchor_idx,
                prev_ptr,
                curr_ptr,
            }));
        }
        if curr.key > key {
            return Ok(None);
        }
        if curr.overflow_pointer == OVF_NULL {
            return Ok(None);
        }
        prev_ptr = Some(curr_ptr);
        curr_ptr = curr.overflow_pointer as u64;
    }
}
