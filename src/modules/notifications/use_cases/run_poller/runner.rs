// Poller runner drives ticks at a fixed interval until shutdown is requested.
//
// Purpose
// - Turn every tick failure into a log line and retry on the next interval, without backoff.
// - Observe shutdown only between ticks so a tick always runs to completion.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::modules::notifications::core::ports::{
    DocumentStore, NotificationDispatcher, WatermarkRepository,
};
use crate::modules::notifications::use_cases::poll_new_documents::handler::PollNewDocumentsHandler;

pub struct PollerRunner<TStore, TDispatcher, TWatermarks>
where
    TStore: DocumentStore + 'static,
    TDispatcher: NotificationDispatcher + 'static,
    TWatermarks: WatermarkRepository + 'static,
{
    handler: Arc<PollNewDocumentsHandler<TStore, TDispatcher, TWatermarks>>,
    interval: Duration,
}

impl<TStore, TDispatcher, TWatermarks> PollerRunner<TStore, TDispatcher, TWatermarks>
where
    TStore: DocumentStore + 'static,
    TDispatcher: NotificationDispatcher + 'static,
    TWatermarks: WatermarkRepository + 'static,
{
    pub fn new(
        handler: Arc<PollNewDocumentsHandler<TStore, TDispatcher, TWatermarks>>,
        interval: Duration,
    ) -> Self {
        Self { handler, interval }
    }

    /// Returns the number of ticks run once `shutdown` resolves.
    pub async fn run<F>(&self, shutdown: F) -> u64
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut ticks = 0u64;

        loop {
            ticks += 1;
            match self.handler.handle().await {
                Ok(report) => tracing::info!(
                    tick = ticks,
                    delivered = report.delivered,
                    failed = report.failed,
                    skipped = report.skipped_without_timestamp,
                    watermark = %report.watermark_after,
                    "tick completed"
                ),
                Err(error) => tracing::error!(
                    tick = ticks,
                    error = %error,
                    "tick failed, watermark left unchanged"
                ),
            }

            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!(ticks, "shutdown requested, poller stopped");
                    return ticks;
                }
                _ = tokio::time::sleep(self.interval) => {}
            }
        }
    }
}
