use once_cell::sync::OnceCell;
use std::time::Duration;
use tokio::sync::{AcquireError, Mutex, Semaphore, SemaphorePermit};
use tokio::time::{sleep_until, Instant};

/// SEC fair-access policy: 10 requests per second per client.
const EDGAR_REQUESTS_PER_SECOND: u32 = 10;

/// Paces requests against one host: request starts are spaced at least `interval` apart
/// and no more than `max_in_flight` run at once.
#[derive(Debug)]
pub struct RateLimiter {
    in_flight: Semaphore,
    interval: Duration,
    next_start: Mutex<Instant>,
}

static EDGAR_RATE_LIMITER: OnceCell<RateLimiter> = OnceCell::new();

impl RateLimiter {
    pub fn new(max_in_flight: usize, interval: Duration) -> Self {
        RateLimiter {
            in_flight: Semaphore::new(max_in_flight),
            interval,
            next_start: Mutex::new(Instant::now()),
        }
    }

    pub fn per_second(requests: u32) -> Self {
        Self::new(requests as usize, Duration::from_secs(1) / requests.max(1))
    }

    /// Waits for an in-flight slot and then for the next start time. The permit must be
    /// held for the duration of the request.
    pub async fn acquire(&self) -> Result<SemaphorePermit<'_>, AcquireError> {
        let permit = self.in_flight.acquire().await?;

        let start = {
            let mut next_start = self.next_start.lock().await;
            let start = (*next_start).max(Instant::now());
            *next_start = start + self.interval;
            start
        };
        sleep_until(start).await;

        Ok(permit)
    }

    /// Shared limiter for sec.gov hosts.
    pub fn edgar() -> &'static RateLimiter {
        EDGAR_RATE_LIMITER.get_or_init(|| RateLimiter::per_second(EDGAR_REQUESTS_PER_SECOND))
    }
}
