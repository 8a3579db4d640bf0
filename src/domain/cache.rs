//! Process-lifetime snapshot of the meter's reading history.

use crate::domain::models::Reading;

/// Ordered, immutable snapshot of the reading history, captured once at
/// startup. Index order equals the device-reported order; there is no
/// refresh and no mutation.
#[derive(Debug)]
pub struct ReadingCache {
    readings: Vec<Reading>,
}

impl ReadingCache {
    pub fn new(readings: Vec<Reading>) -> Self {
        Self { readings }
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Reading at `index`, or `None` when out of range.
    pub fn get(&self, index: usize) -> Option<&Reading> {
        self.readings.get(index)
    }
}
