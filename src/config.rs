/// Tunables for an indexed-sequential store.
///
/// The reference implementation hardcodes these at compile time; this crate
/// threads them through `init`/`open` instead so tests can exercise tiny
/// pages (e.g. P=4) without recompiling, while `Default` reproduces the
/// reference constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StoreConfig {
    /// Records per page (P).
    pub records_per_page: usize,
    /// Opaque payload length in bytes (L).
    pub payload_len: usize,
    /// Reorganization target fill factor (alpha).
    pub alpha: f64,
    /// Overflow-ratio threshold that triggers reorganization (beta).
    pub beta: f64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            records_per_page: 10,
            payload_len: 15,
            alpha: 0.5,
            beta: 0.2,
        }
    }
}

impl StoreConfig {
    /// On-disk record size `R = L + 8` (numbers + key + overflow_pointer).
    pub fn record_size(&self) -> usize {
        self.payload_len + 8
    }

    /// Bytes occupied by one full page (`P * R`).
    pub fn page_size(&self) -> usize {
        self.records_per_page * self.record_size()
    }

    /// Number of slots a reorganized page should be filled to (`floor(alpha * P)`).
    pub fn reorg_fill(&self) -> usize {
        (self.alpha * self.records_per_page as f64).floor() as usize
    }

    pub(crate) fn validate(&self) -> crate::error::Result<()> {
        if self.records_per_page == 0 {
            return Err(crate::error::IsamError::InvalidArgument(
                "records_per_page must be > 0".into(),
            ));
        }
        if self.alpha <= 0.0 || self.alpha > 1.0 {
            return Err(crate::error::IsamError::InvalidArgument(
                "alpha must be in (0, 1]".into(),
            ));
        }
        if self.beta <= 0.0 || self.beta >= 1.0 {
            return Err(crate::error::IsamError::InvalidArgument(
                "beta must be in (0, 1)".into(),
            ));
        }
        if self.reorg_fill() == 0 {
            return Err(crate::error::IsamError::InvalidArgument(
                "alpha too small for records_per_page: reorg would produce empty pages".into(),
            ));
        }
        Ok(())
    }
}
