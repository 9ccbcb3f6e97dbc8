// Per-batch throughput samples between two folds

use std::sync::{Mutex, PoisonError};
use tracing::debug;

/// Accumulates request speeds for the current batch.
///
/// Samples are kept sorted as they arrive, so the same sample set always sums
/// to the same bits whatever order callers raced in. Insertion is O(n) in the
/// batch size; reading or taking the average is a plain sum with no copy.
/// Memory holds one `f64` per response since the last fold.
#[derive(Debug, Default)]
pub struct SpeedSampleCollector {
    samples: Mutex<Vec<f64>>,
}

impl SpeedSampleCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one sample. Negative or non-finite speeds are dropped.
    pub fn add_sample(&self, speed: f64) {
        if !speed.is_finite() || speed < 0.0 {
            debug!(speed, "ignoring invalid speed sample");
            return;
        }
        let mut samples = self.lock();
        let at = samples.partition_point(|s| s.total_cmp(&speed).is_le());
        samples.insert(at, speed);
    }

    pub fn sample_count(&self) -> usize {
        self.lock().len()
    }

    /// Batch average, 0.0 before any sample.
    pub fn current_average(&self) -> f64 {
        mean(&self.lock())
    }

    pub fn reset(&self) {
        self.lock().clear();
    }

    /// Reads the batch average and clears the batch in one step.
    pub fn take_average(&self) -> f64 {
        let samples = std::mem::take(&mut *self.lock());
        mean(&samples)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<f64>> {
        self.samples.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Mean of an already sorted batch.
fn mean(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().sum::<f64>() / samples.len() as f64
}
