use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

use crate::error::SearchError;

/// Default gap between accepted federated requests / 默认最小间隔
pub const DEFAULT_MIN_INTERVAL_MS: u64 = 2000;

/// Node-wide minimum-interval limiter for the federated endpoint / 联邦搜索限流器
///
/// Not per caller: any combination of peers shares one slot, so one chatty
/// peer can starve the others.
pub struct RateLimiter {
    min_interval: Duration,
    last_accepted: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_accepted: Mutex::new(None),
        }
    }

    /// Accept now or reject with `RateLimited` / 尝试通过限流
    pub fn try_accept(&self) -> Result<(), SearchError> {
        self.try_accept_at(Instant::now())
    }

    /// Check and update under one lock; a rejection leaves the timestamp untouched / 检查并更新
    pub fn try_accept_at(&self, now: Instant) -> Result<(), SearchError> {
        let mut last = self.last_accepted.lock();
        if let Some(previous) = *last {
            let elapsed = now.saturating_duration_since(previous);
            if elapsed < self.min_interval {
                let retry_after = self.min_interval - elapsed;
                return Err(SearchError::RateLimited {
                    retry_after_ms: retry_after.as_millis() as u64,
                });
            }
        }
        *last = Some(now);
        Ok(())
    }
}
