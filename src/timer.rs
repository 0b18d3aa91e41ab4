use std::time::{Duration, Instant};

/// Wall-clock timer for one named kernel region. Each start/stop pair
/// records one sample; the report side aggregates them.
pub struct Timer {
    pub region: &'static str,
    samples: Vec<Duration>,
    started_at: Option<Instant>,
}

impl Timer {
    pub fn new(region: &'static str, expected_num_samples: usize) -> Self {
        Timer {
            region,
            samples: Vec::with_capacity(expected_num_samples),
            started_at: None,
        }
    }

    pub fn start(&mut self) {
        assert!(
            self.started_at.is_none(),
            "Timer for region '{}' started twice without an intervening stop().",
            self.region
        );
        self.started_at = Some(Instant::now());
    }

    pub fn stop(&mut self) {
        let started_at = self.started_at.take().unwrap_or_else(|| {
            panic!(
                "Timer for region '{}' stopped without a matching start().",
                self.region
            )
        });
        self.samples.push(started_at.elapsed());
    }

    pub fn count(&self) -> usize {
        self.samples.len()
    }

    pub fn total(&self) -> Duration {
        self.samples.iter().sum()
    }

    pub fn mean(&self) -> Option<Duration> {
        if self.samples.is_empty() {
            None
        } else {
            Some(self.total() / self.samples.len() as u32)
        }
    }
}
