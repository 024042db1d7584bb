use std::path::{Path, PathBuf};

use crate::config::StoreConfig;
use crate::data_file::DataFile;
use crate::error::{IsamError, Result};
use crate::index_entry::IndexEntry;
use crate::index_file::IndexFile;
use crate::locate::{locate, Location};
use crate::overflow::{self, SpliceOutcome};
use crate::page::{Page, Scan};
use crate::record::{Record, OVF_NULL, SENTINEL_KEY};
use crate::reorganize;

/// A single open indexed-sequential store: a data file and its sparse index,
/// plus the in-memory bookkeeping (`primary_area_size`, `overflow_area_size`)
/// needed to place new records without rescanning either file.
///
/// Mirrors the teacher crate's `BlockFile` in keeping both handles open for
/// the store's lifetime rather than reopening per call (5).
pub struct Store {
    data: DataFile,
    index: IndexFile,
    cfg: StoreConfig,
    data_path: PathBuf,
    index_path: PathBuf,
    primary_area_size: u64,
    overflow_area_size: u64,
}

impl Store {
    /// Create a fresh store: both files must not already exist. Lays down
    /// the sentinel page and its index entry (3, lifecycle).
    pub fn init<P: AsRef<Path>>(data_path: P, index_path: P, cfg: StoreConfig) -> Result<Self> {
        cfg.validate()?;
        let data_path = data_path.as_ref().to_path_buf();
        let index_path = index_path.as_ref().to_path_buf();

        let mut data = DataFile::create(&data_path)?;
        let mut index = IndexFile::create(&index_path)?;

        let mut page = Page::new_empty(&cfg);
        page.slots[0] = Record::new(SENTINEL_KEY, vec![0u8; cfg.payload_len]);
        let primary_area_size = cfg.page_size() as u64;
        data.write_page(1, &page, &cfg, primary_area_size)?;
        index.append_entry(IndexEntry {
            key: SENTINEL_KEY,
            page_number: 1,
        })?;

        log::info!("init: store created at {data_path:?} / {index_path:?}");

        Ok(Self {
            data,
            index,
            cfg,
            data_path,
            index_path,
            primary_area_size,
            overflow_area_size: 0,
        })
    }

    /// Open an existing store, deriving `primary_area_size` from the number
    /// of index entries and `overflow_area_size` from the data file's tail.
    pub fn open<P: AsRef<Path>>(data_path: P, index_path: P, cfg: StoreConfig) -> Result<Self> {
        cfg.validate()?;
        let data_path = data_path.as_ref().to_path_buf();
        let index_path = index_path.as_ref().to_path_buf();

        let mut data = DataFile::open(&data_path)?;
        let index = IndexFile::open(&index_path)?;

        let primary_area_size = index.num_pages() as u64 * cfg.page_size() as u64;
        let total_len = data.len()?;
        if total_len < primary_area_size {
            return Err(IsamError::Corrupt(format!(
                "data file shorter ({total_len}) than primary area implied by index ({primary_area_size})"
            )));
        }
        let overflow_area_size = total_len - primary_area_size;

        Ok(Self {
            data,
            index,
            cfg,
            data_path,
            index_path,
            primary_area_size,
            overflow_area_size,
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.cfg
    }

    fn validate_key(key: i32) -> Result<()> {
        if key < 2 {
            return Err(IsamError::InvalidArgument(format!(
                "key must be >= 2, got {key}"
            )));
        }
        Ok(())
    }

    fn disk_ops(&self) -> u64 {
        self.data.disk_ops() + self.index.disk_ops()
    }

    fn reset_disk_ops(&mut self) {
        self.data.reset_disk_ops();
        self.index.reset_disk_ops();
    }

    /// Insert `record` (4.3). Returns the number of physical disk operations
    /// performed, triggering a reorganization first if the overflow ratio
    /// exceeds `cfg.beta`.
    pub fn add(&mut self, mut record: Record) -> Result<u64> {
        Self::validate_key(record.key)?;
        if record.numbers.len() != self.cfg.payload_len {
            return Err(IsamError::InvalidArgument(format!(
                "payload length must be {}, got {}",
                self.cfg.payload_len,
                record.numbers.len()
            )));
        }
        self.reset_disk_ops();

        let page_no = self.index.lookup_page(record.key)?;
        let mut page = self.data.read_page(page_no, &self.cfg)?;
        let scan = page.scan(record.key);
        if let Scan::Found(_) = scan {
            return Err(IsamError::DuplicateKey(record.key));
        }

        if page.has_free_slot() {
            let (successor, last) = match scan {
                Scan::NotFound { successor, last } => (successor, last),
                Scan::Found(_) => unreachable!(),
            };
            let key = record.key;
            let placed_at = successor.unwrap_or_else(|| last.map(|l| l + 1).unwrap_or(0));
            record.overflow_pointer = OVF_NULL;
            page.insert_shift(successor, last, record);
            if placed_at == 0 {
                // Page had no occupied slots (fully emptied by prior
                // deletions); heal the stale index entry so invariant 6
                // doesn't wait on the next reorganization.
                self.index.set_key_for_page(page_no, key)?;
            }
            self.data
                .write_page(page_no, &page, &self.cfg, self.primary_area_size)?;
            log::debug!("add: key {key} placed in main area of page {page_no}");
        } else {
            let anchor = page.anchor_for(scan).ok_or_else(|| {
                IsamError::Corrupt("no anchor slot available for overflow insert".into())
            })?;
            let head = page.slots[anchor].overflow_pointer;
            let outcome = overflow::splice(
                &mut self.data,
                &self.cfg,
                self.primary_area_size,
                &mut self.overflow_area_size,
                head,
                &mut record,
            )?;
            if let SpliceOutcome::RootUpdated(ptr) = outcome {
                page.slots[anchor].overflow_pointer = ptr as u32;
                self.data
                    .write_page(page_no, &page, &self.cfg, self.primary_area_size)?;
            }
            log::debug!("add: key {} placed in overflow chain anchored at page {page_no} slot {anchor}", record.key);
        }

        let denom = self.overflow_area_size + self.primary_area_size;
        let rho = if denom == 0 {
            0.0
        } else {
            self.overflow_area_size as f64 / denom as f64
        };
        // Capture before reorganize() swaps in freshly opened handles whose
        // disk-op counters start at 0 — otherwise a reorg-triggering add
        // would always report 0 physical operations.
        let ops = self.disk_ops();
        if rho > self.cfg.beta {
            log::warn!("add: overflow ratio {rho:.3} exceeds beta {}, reorganizing", self.cfg.beta);
            self.reorganize()?;
        }

        Ok(ops)
    }

    /// Look up `key` (4.5). Does not participate in the disk-op counter
    /// (only `add`/`delete` report it, per 4.2/4.3).
    pub fn get(&mut self, key: i32) -> Result<Record> {
        Self::validate_key(key)?;
        let page_no = self.index.lookup_page(key)?;
        let page = self.data.read_page(page_no, &self.cfg)?;
        match locate(&mut self.data, &self.cfg, &page, key)? {
            Some(Location::Main { idx }) => Ok(page.slots[idx].clone()),
            Some(Location::Overflow { curr_ptr, .. }) => {
                self.data.read_record_at(curr_ptr, &self.cfg)
            }
            None => Err(IsamError::NotFound(key)),
        }
    }

    /// Remove `key` (4.6), covering all four placement cases.
    pub fn delete(&mut self, key: i32) -> Result<u64> {
        Self::validate_key(key)?;
        self.reset_disk_ops();

        let page_no = self.index.lookup_page(key)?;
        let mut page = self.data.read_page(page_no, &self.cfg)?;
        let loc = locate(&mut self.data, &self.cfg, &page, key)?
            .ok_or(IsamError::NotFound(key))?;

        match loc {
            Location::Main { idx } => {
                let last = page
                    .last_used()
                    .ok_or_else(|| IsamError::Corrupt("page has no occupied slots".into()))?;
                if page.slots[idx].overflow_pointer != OVF_NULL {
                    // Case 3: promote the chain head into the deleted slot.
                    let head_ptr = page.slots[idx].overflow_pointer as u64;
                    let mut head = self.data.read_record_at(head_ptr, &self.cfg)?;
                    let head_next = head.overflow_pointer;
                    self.data.write_record_at(
                        head_ptr,
                        &Record::empty(self.cfg.payload_len),
                        &self.cfg,
                    )?;
                    head.overflow_pointer = head_next;
                    page.promote(idx, head);
                } else {
                    // Cases 1 and 2: ordinary shift-left.
                    page.delete_shift(idx, last, self.cfg.payload_len);
                }
                if idx == 0 {
                    self.index.set_key_for_page(page_no, page.slots[0].key)?;
                }
                self.data
                    .write_page(page_no, &page, &self.cfg, self.primary_area_size)?;
            }
            Location::Overflow {
                anchor_idx,
                prev_ptr,
                curr_ptr,
            } => {
                let curr = self.data.read_record_at(curr_ptr, &self.cfg)?;
                match prev_ptr {
                    None => {
                        page.slots[anchor_idx].overflow_pointer = curr.overflow_pointer;
                        self.data
                            .write_page(page_no, &page, &self.cfg, self.primary_area_size)?;
                    }
                    Some(prev_ptr) => {
                        let mut prev = self.data.read_record_at(prev_ptr, &self.cfg)?;
                        prev.overflow_pointer = curr.overflow_pointer;
                        self.data.write_record_at(prev_ptr, &prev, &self.cfg)?;
                    }
                }
                self.data.write_record_at(
                    curr_ptr,
                    &Record::empty(self.cfg.payload_len),
                    &self.cfg,
                )?;
            }
        }

        log::debug!("delete: removed key {key}");
        Ok(self.disk_ops())
    }

    /// `delete(r.key)` then `add(r)` (4.9), surfacing the first error rather
    /// than masking a failed delete behind a successful add.
    pub fn update(&mut self, record: Record) -> Result<u64> {
        let deleted = self.delete(record.key)?;
        let added = self.add(record)?;
        Ok(deleted + added)
    }

    /// Force a reorganization (4.8) regardless of the current overflow
    /// ratio. `add` calls this automatically when ρ > β.
    pub fn reorganize(&mut self) -> Result<()> {
        let rebuilt = reorganize::reorganize(
            &self.data_path,
            &self.index_path,
            &mut self.data,
            &self.index,
            &self.cfg,
        )?;
        self.data = rebuilt.data;
        self.index = rebuilt.index;
        self.primary_area_size = rebuilt.primary_area_size;
        self.overflow_area_size = 0;
        Ok(())
    }

    /// Current overflow ratio ρ, exposed for tests and the CLI's `dump`.
    pub fn overflow_ratio(&self) -> f64 {
        let denom = self.overflow_area_size + self.primary_area_size;
        if denom == 0 {
            0.0
        } else {
            self.overflow_area_size as f64 / denom as f64
        }
    }

    /// Raw sequential dump of the data file to stdout (4.10): main area
    /// page by page, a banner, then overflow records in file order. This is
    /// a deliberate stdout diagnostic, not a log event, and does not touch
    /// the disk-op counter.
    pub fn print_data_file(&mut self) -> Result<()> {
        let raw = self.data.read_raw_sequential()?;
        let rsize = self.cfg.record_size();
        let primary_bytes = self.primary_area_size as usize;

        println!("-- main area ({} pages) --", self.index.num_pages());
        let mut offset = 0usize;
        while offset < primary_bytes && offset + rsize <= raw.len() {
            let rec = Record::decode(&raw[offset..offset + rsize], self.cfg.payload_len)?;
            Self::print_record(&rec, None);
            offset += rsize;
        }

        println!("-- overflow area --");
        let mut slot = 0usize;
        while offset + rsize <= raw.len() {
            let rec = Record::decode(&raw[offset..offset + rsize], self.cfg.payload_len)?;
            Self::print_record(&rec, Some(slot));
            offset += rsize;
            slot += 1;
        }

        Ok(())
    }

    fn print_record(rec: &Record, overflow_slot: Option<usize>) {
        let ptr = if rec.overflow_pointer == OVF_NULL {
            "NULL".to_string()
        } else {
            format!("{:#x}", rec.overflow_pointer)
        };
        match overflow_slot {
            Some(slot) => println!(
                "[ovf #{slot}] key={} numbers={:?} next={ptr}",
                rec.key, rec.numbers
            ),
            None => println!("key={} numbers={:?} next={ptr}", rec.key, rec.numbers),
        }
    }
}
