use std::time::Duration;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};

/// Fixed-interval pacing between requests.
///
/// The first [`RateLimiter::wait`] returns one full period after construction, and no two
/// waits return less than a period apart. There is no burst allowance.
pub struct RateLimiter {
    ticker: Option<Interval>,
}

impl RateLimiter {
    pub fn new(period: Duration) -> Self {
        let ticker = (!period.is_zero()).then(|| {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker
        });
        Self { ticker }
    }

    pub async fn wait(&mut self) {
        if let Some(ticker) = self.ticker.as_mut() {
            ticker.tick().await;
        }
    }
}
