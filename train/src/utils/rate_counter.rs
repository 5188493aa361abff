use crate::common::*;

/// A counter that reports an amount per second over a fixed interval.
#[derive(Debug)]
pub struct RateCounter {
    interval: Duration,
    count: f64,
    begin: Instant,
}

impl RateCounter {
    pub fn with_second_interval() -> Self {
        Self::with_interval(Duration::from_secs(1))
    }

    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            count: 0.0,
            begin: Instant::now(),
        }
    }

    pub fn add(&mut self, count: f64) {
        self.count += count;
    }

    /// The rate over the elapsed interval, or `None` if the interval has
    /// not passed yet. The counter restarts after it reports.
    pub fn rate(&mut self) -> Option<f64> {
        let elapsed = self.begin.elapsed();
        if elapsed >= self.interval {
            let rate = self.count / elapsed.as_secs_f64();
            self.count = 0.0;
            self.begin = Instant::now();
            Some(rate)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_counter_reports_after_interval() {
        let mut counter = RateCounter::with_interval(Duration::from_millis(0));
        counter.add(3.0);
        thread::sleep(Duration::from_millis(10));
        let rate = counter.rate().unwrap();
        assert!(rate > 0.0);

        // the counter restarts after reporting
        thread::sleep(Duration::from_millis(1));
        assert_eq!(counter.rate(), Some(0.0));
    }

    #[test]
    fn rate_counter_waits_for_interval() {
        let mut counter = RateCounter::with_interval(Duration::from_secs(3600));
        counter.add(1.0);
        assert_eq!(counter.rate(), None);
    }
}
