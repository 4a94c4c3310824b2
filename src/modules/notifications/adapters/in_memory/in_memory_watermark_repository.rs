// In memory watermark repository.
//
// Purpose
// - Exercise the poller without touching the file system.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::modules::notifications::core::ports::{WatermarkError, WatermarkRepository};
use crate::modules::notifications::core::watermark::Watermark;

#[derive(Default)]
pub struct InMemoryWatermarkRepository {
    watermark: RwLock<Option<Watermark>>,
    writes: RwLock<usize>,
    is_offline: bool,
}

impl InMemoryWatermarkRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(watermark: Watermark) -> Self {
        Self {
            watermark: RwLock::new(Some(watermark)),
            ..Self::default()
        }
    }

    pub fn toggle_offline(&mut self) {
        self.is_offline = !self.is_offline;
    }

    pub async fn writes(&self) -> usize {
        *self.writes.read().await
    }
}

#[async_trait]
impl WatermarkRepository for InMemoryWatermarkRepository {
    async fn get(&self) -> Result<Option<Watermark>, WatermarkError> {
        if self.is_offline {
            return Err(WatermarkError::Backend("Watermark repository offline".into()));
        }
        Ok(*self.watermark.read().await)
    }

    async fn set(&self, watermark: Watermark) -> Result<(), WatermarkError> {
        if self.is_offline {
            return Err(WatermarkError::Backend("Watermark repository offline".into()));
        }
        *self.watermark.write().await = Some(watermark);
        *self.writes.write().await += 1;
        Ok(())
    }
}
