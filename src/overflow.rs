use crate::config::StoreConfig;
use crate::data_file::DataFile;
use crate::error::{IsamError, Result};
use crate::record::{Record, OVF_NULL};

/// Whether the caller's anchor pointer (a primary page slot's
/// `overflow_pointer`) must be patched to point at the newly-written record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SpliceOutcome {
    /// The anchor must be updated to point at the new record, at this offset.
    RootUpdated(u64),
    /// The anchor is unchanged; the new record was spliced further down the chain.
    RootUnchanged,
}

/// Append `r` to the tail of the overflow area and splice it into the sorted
/// chain currently rooted at `head` (4.4). `head` is `OVF_NULL` if the
/// anchor currently has no chain. Returns whether the anchor's own pointer
/// must be patched by the caller.
pub(crate) fn splice(
    data: &mut DataFile,
    cfg: &StoreConfig,
    primary_area_size: u64,
    overflow_area_size: &mut u64,
    head: u32,
    r: &mut Record,
) -> Result<SpliceOutcome> {
    let ptr = primary_area_size + *overflow_area_size;

    if head == OVF_NULL {
        r.overflow_pointer = OVF_NULL;
        data.write_record_at(ptr, r, cfg)?;
        *overflow_area_size += cfg.record_size() as u64;
        return Ok(SpliceOutcome::RootUpdated(ptr));
    }

    let mut prev_ptr: Option<u64> = None;
    let mut curr_ptr = head as u64;
    let mut curr = data.read_record_at(curr_ptr, cfg)?;

    loop {
        if curr.key == r.key {
            return Err(IsamError::DuplicateKey(r.key));
        }
        if curr.key > r.key {
            break;
        }
        if curr.overflow_pointer == OVF_NULL {
            // Append at the tail of the chain.
            curr.overflow_pointer = ptr as u32;
            data.write_record_at(curr_ptr, &curr, cfg)?;
            r.overflow_pointer = OVF_NULL;
            data.write_record_at(ptr, r, cfg)?;
            *overflow_area_size += cfg.record_size() as u64;
            return Ok(SpliceOutcome::RootUnchanged);
        }
        prev_ptr = Some(curr_ptr);
        curr_ptr = curr.overflow_pointer as u64;
        curr = data.read_record_at(curr_ptr, cfg)?;
    }

    // curr.key > r.key: splice before curr.
    match prev_ptr {
        None => {
            // We're at the chain head: the anchor's pointer must become `ptr`.
            r.overflow_pointer = curr_ptr as u32;
            data.write_record_at(ptr, r, cfg)?;
            *overflow_area_size += cfg.record_size() as u64;
            Ok(SpliceOutcome::RootUpdated(ptr))
        }
        Some(prev_ptr) => {
            let mut prev = data.read_record_at(prev_ptr, cfg)?;
            r.overflow_pointer = prev.overflow_pointer;
            prev.overflow_pointer = ptr as u32;
            // Predecessor write precedes the new-record write so no
            // persisted pointer ever targets an uninitialized slot.
            data.write_record_at(prev_ptr, &prev, cfg)?;
            data.write_record_at(ptr, r, cfg)?;
            *overflow_area_size += cfg.record_size() as u64;
            Ok(SpliceOutcome::RootUnchanged)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn cfg() -> StoreConfig {
        StoreConfig {
            records_per_page: 4,
            payload_len: 2,
            alpha: 0.5,
            beta: 0.2,
        }
    }

    fn rec(key: i32) -> Record {
        Record::new(key, vec![0, 0])
    }

    #[test]
    fn splice_into_empty_chain_updates_root() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.bin");
        let mut data = DataFile::create(&path).unwrap();
        let cfg = cfg();
        let mut overflow_area_size = 0u64;
        let mut r = rec(5);
        let outcome = splice(&mut data, &cfg, 100, &mut overflow_area_size, OVF_NULL, &mut r)
            .unwrap();
        assert_eq!(outcome, SpliceOutcome::RootUpdated(100));
        assert_eq!(overflow_area_size, cfg.record_size() as u64);
    }

    #[test]
    fn splice_appends_to_tail_of_chain() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.bin");
        let mut data = DataFile::create(&path).unwrap();
        let cfg = cfg();
        let mut overflow_area_size = 0u64;
        let primary = 100u64;

        let mut first = rec(5);
        splice(&mut data, &cfg, primary, &mut overflow_area_size, OVF_NULL, &mut first).unwrap();
        let head_ptr = primary as u32;

        let mut second = rec(9);
        let outcome = splice(
            &mut data,
            &cfg,
            primary,
            &mut overflow_area_size,
            head_ptr,
            &mut second,
        )
        .unwrap();
        assert_eq!(outcome, SpliceOutcome::RootUnchanged);

        let head_after = data.read_record_at(primary, &cfg).unwrap();
        assert_eq!(
            head_after.overflow_pointer,
            (primary + cfg.record_size() as u64) as u32
        );
    }

    #[test]
    fn splice_rejects_duplicate() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.bin");
        let mut data = DataFile::create(&path).unwrap();
        let cfg = cfg();
        let mut overflow_area_size = 0u64;
        let primary = 100u64;

        let mut first = rec(5);
        splice(&mut data, &cfg, primary, &mut overflow_area_size, OVF_NULL, &mut first).unwrap();

        let mut dup = rec(5);
        let err = splice(
            &mut data,
            &cfg,
            primary,
            &mut overflow_area_size,
            primary as u32,
            &mut dup,
        )
        .unwrap_err();
        assert!(matches!(err, IsamError::DuplicateKey(5)));
    }
}
