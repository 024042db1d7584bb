use crate::config::StoreConfig;
use crate::error::Result;
use crate::record::Record;

/// Result of scanning a page for a key: either it is present at a slot, or
/// we learn the slot index of the first key greater than the target (for
/// insertion) together with the index of the highest occupied slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Scan {
    Found(usize),
    /// `successor` is the slot of the first key greater than the target, if
    /// any occupied slot holds one. `last` is the highest occupied slot
    /// index, or `None` if the page is entirely empty (shouldn't happen on
    /// a valid store, but kept `Option` rather than panicking).
    NotFound {
        successor: Option<usize>,
        last: Option<usize>,
    },
}

/// One page's worth of record slots, decoded into memory. Non-empty slots
/// occupy a contiguous prefix in ascending key order; the rest are empty
/// (key == 0).
#[derive(Debug, Clone)]
pub(crate) struct Page {
    pub slots: Vec<Record>,
}

impl Page {
    pub(crate) fn new_empty(cfg: &StoreConfig) -> Self {
        Self {
            slots: (0..cfg.records_per_page)
                .map(|_| Record::empty(cfg.payload_len))
                .collect(),
        }
    }

    pub(crate) fn decode(buf: &[u8], cfg: &StoreConfig) -> Result<Self> {
        let rsize = cfg.record_size();
        let mut slots = Vec::with_capacity(cfg.records_per_page);
        for chunk in buf.chunks(rsize) {
            slots.push(Record::decode(chunk, cfg.payload_len)?);
        }
        Ok(Self { slots })
    }

    pub(crate) fn encode(&self, cfg: &StoreConfig) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(cfg.page_size());
        for slot in &self.slots {
            slot.encode_into(cfg.payload_len, &mut out)?;
        }
        Ok(out)
    }

    /// Highest occupied slot index, or `None` if the page is empty.
    pub(crate) fn last_used(&self) -> Option<usize> {
        self.slots.iter().rposition(|r| !r.is_empty())
    }

    pub(crate) fn has_free_slot(&self) -> bool {
        self.slots.iter().any(|r| r.is_empty())
    }

    /// Scan for `key`, mirroring the reference's linear scan: find an exact
    /// match, or the first slot holding a strictly greater key.
    pub(crate) fn scan(&self, key: i32) -> Scan {
        for (i, rec) in self.slots.iter().enumerate() {
            if rec.is_empty() {
                break;
            }
            if rec.key == key {
                return Scan::Found(i);
            }
            if rec.key > key {
                return Scan::NotFound {
                    successor: Some(i),
                    last: self.last_used(),
                };
            }
        }
        Scan::NotFound {
            successor: None,
            last: self.last_used(),
        }
    }

    /// Anchor slot for a key that doesn't live on this page directly: the
    /// predecessor of `successor` if found, else the last occupied slot.
    pub(crate) fn anchor_for(&self, scan: Scan) -> Option<usize> {
        match scan {
            Scan::Found(i) => Some(i),
            Scan::NotFound { successor, last } => match successor {
                Some(s) if s > 0 => Some(s - 1),
                Some(_) => None, // successor is slot 0: no predecessor on this page
                None => last,
            },
        }
    }

    /// Ordered insert with shift-right, per the reference `add_record`: if a
    /// successor slot was found, shift `[idx..=last]` right by one and place
    /// `r` at `idx`; otherwise append after `last`. Caller must ensure a
    /// free slot exists.
    pub(crate) fn insert_shift(&mut self, idx: Option<usize>, last: Option<usize>, r: Record) {
        match idx {
            Some(idx) => {
                let last = last.unwrap_or(idx);
                let mut i = last + 1;
                while i > idx {
                    self.slots[i] = self.slots[i - 1].clone();
                    i -= 1;
                }
                self.slots[idx] = r;
            }
            None => {
                let at = last.map(|l| l + 1).unwrap_or(0);
                self.slots[at] = r;
            }
        }
    }

    /// Ordered delete with shift-left: shift `(idx+1..=last)` left by one and
    /// zero the freed tail slot.
    pub(crate) fn delete_shift(&mut self, idx: usize, last: usize, payload_len: usize) {
        for i in idx..last {
            self.slots[i] = self.slots[i + 1].clone();
        }
        self.slots[last] = Record::empty(payload_len);
    }

    /// Promote an overflow chain head into `idx`, preserving the head's own
    /// `overflow_pointer` (its successor in the chain). Used when deleting a
    /// record that anchors an overflow chain: no shift needed.
    pub(crate) fn promote(&mut self, idx: usize, head: Record) {
        self.slots[idx] = head;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn scan_finds_exact_and_successor() {
        let mut p = Page::new_empty(&cfg());
        p.slots[0] = rec(1);
        p.slots[1] = rec(3);
        p.slots[2] = rec(5);
        assert_eq!(p.scan(3), Scan::Found(1));
        assert_eq!(
            p.scan(4),
            Scan::NotFound {
                successor: Some(2),
                last: Some(2)
            }
        );
        assert_eq!(
            p.scan(9),
            Scan::NotFound {
                successor: None,
                last: Some(2)
            }
        );
    }

    #[test]
    fn insert_shift_into_middle() {
        let mut p = Page::new_empty(&cfg());
        p.slots[0] = rec(1);
        p.slots[1] = rec(5);
        p.insert_shift(Some(1), Some(1), rec(3));
        let keys: Vec<i32> = p.slots.iter().map(|r| r.key).collect();
        assert_eq!(keys, vec![1, 3, 5, 0]);
    }

    #[test]
    fn insert_shift_append() {
        let mut p = Page::new_empty(&cfg());
        p.slots[0] = rec(1);
        p.insert_shift(None, Some(0), rec(9));
        let keys: Vec<i32> = p.slots.iter().map(|r| r.key).collect();
        assert_eq!(keys, vec![1, 9, 0, 0]);
    }

    #[test]
    fn delete_shift_closes_gap() {
        let mut p = Page::new_empty(&cfg());
        p.slots[0] = rec(1);
        p.slots[1] = rec(3);
        p.slots[2] = rec(5);
        p.delete_shift(1, 2, 2);
        let keys: Vec<i32> = p.slots.iter().map(|r| r.key).collect();
        assert_eq!(keys, vec![1, 5, 0, 0]);
    }

    #[test]
    fn has_free_slot_and_last_used() {
        let mut p = Page::new_empty(&cfg());
        assert!(p.has_free_slot());
        assert_eq!(p.last_used(), None);
        p.slots[0] = rec(1);
        p.slots[1] = rec(2);
        assert_eq!(p.last_used(), Some(1));
        p.slots[2] = rec(3);
        p.slots[3] = rec(4);
        assert!(!p.has_free_slot());
    }
}
