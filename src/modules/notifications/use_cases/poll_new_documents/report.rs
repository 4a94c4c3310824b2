use crate::modules::notifications::core::watermark::Watermark;

/// Summary of one tick, logged by the runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    pub watermark_before: Watermark,
    pub watermark_after: Watermark,
    pub delivered: usize,
    pub failed: usize,
    pub skipped_without_timestamp: usize,
}

impl TickReport {
    pub fn starting_at(watermark: Watermark) -> Self {
        Self {
            watermark_before: watermark,
            watermark_after: watermark,
            delivered: 0,
            failed: 0,
            skipped_without_timestamp: 0,
        }
    }

    /// Documents that reached dispatch, whether or not the send succeeded.
    pub fn attempted(&self) -> usize {
        self.delivered + self.failed
    }

    pub fn advanced(&self) -> bool {
        self.watermark_after > self.watermark_before
    }
}
