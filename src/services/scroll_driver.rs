//! Loader - forces the host's lazy list to materialise more rows.

use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::domain::errors::SortResult;
use crate::domain::models::{RetryOutcome, RetryPolicy, SortConfig};
use crate::domain::ports::HostDocument;

/// Drives the scrolling container of a [`HostDocument`].
pub struct ScrollDriver<'a, H: HostDocument + ?Sized> {
    host: &'a H,
    max_settle_attempts: u32,
    max_target_attempts: u32,
}

impl<'a, H: HostDocument + ?Sized> ScrollDriver<'a, H> {
    pub const fn new(host: &'a H, config: &SortConfig) -> Self {
        Self {
            host,
            max_settle_attempts: config.retry.max_scroll_attempts,
            max_target_attempts: config.retry.max_target_scroll_attempts,
        }
    }

    /// Scroll towards the bottom (or to `target`) until the offset settles.
    ///
    /// Without a target this keeps jumping to the bottom, waiting `delay`
    /// after each jump, until a jump no longer moves the offset. With a target
    /// it re-requests that offset until it is reached. Either way the attempt
    /// budget bounds the wait; the returned value is the last observed offset.
    pub async fn scroll_to_load_more(
        &self,
        target: Option<u64>,
        delay: Duration,
    ) -> SortResult<RetryOutcome<u64>> {
        let delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        match target {
            None => self.settle_at_bottom(RetryPolicy::fixed(self.max_settle_attempts, delay_ms)).await,
            Some(target) => {
                self.reach_offset(target, RetryPolicy::fixed(self.max_target_attempts, delay_ms))
                    .await
            }
        }
    }

    async fn settle_at_bottom(&self, policy: RetryPolicy) -> SortResult<RetryOutcome<u64>> {
        let mut attempts = 0;
        loop {
            let before = self.host.scroll_offset().await?;
            let extent = self.host.scroll_extent().await?;
            self.host.set_scroll_offset(extent).await?;
            sleep(policy.delay_for(attempts)).await;
            attempts += 1;

            let after = self.host.scroll_offset().await?;
            if after == before {
                debug!(offset = after, attempts, "scroll position settled");
                return Ok(RetryOutcome::Settled(after));
            }
            if policy.is_exhausted(attempts) {
                warn!(offset = after, attempts, "scroll position still moving, giving up");
                return Ok(RetryOutcome::Exhausted(after));
            }
        }
    }

    async fn reach_offset(&self, target: u64, policy: RetryPolicy) -> SortResult<RetryOutcome<u64>> {
        let mut attempts = 0;
        loop {
            self.host.set_scroll_offset(target).await?;
            sleep(policy.delay_for(attempts)).await;
            attempts += 1;

            let offset = self.host.scroll_offset().await?;
            if offset == target {
                return Ok(RetryOutcome::Settled(offset));
            }
            if policy.is_exhausted(attempts) {
                debug!(target, offset, attempts, "requested scroll offset not reached");
                return Ok(RetryOutcome::Exhausted(offset));
            }
        }
    }

    /// Whether the host still shows its "loading more" sentinel.
    pub async fn is_loading_more(&self) -> SortResult<bool> {
        self.host.has_loading_sentinel().await
    }

    /// Whether handles and display rows both match `expected`.
    ///
    /// A mismatch means rows are still streaming in and no move should be
    /// attempted yet.
    pub async fn is_fully_loaded(&self, expected: usize) -> SortResult<bool> {
        Ok(self.host.snapshot().await?.is_fully_loaded(expected))
    }
}
