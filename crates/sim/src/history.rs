use std::collections::VecDeque;

/// Oldest-first ethylene history with a fixed capacity.
#[derive(Clone, Debug)]
pub struct RollingHistory {
    capacity: usize,
    values: VecDeque<f64>,
}

impl RollingHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            values: VecDeque::with_capacity(capacity),
        }
    }

    /// Non-finite samples (sensor dropouts) are not recorded.
    pub fn push(&mut self, ppm: f64) -> bool {
        if !ppm.is_finite() {
            return false;
        }
        if self.values.len() == self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(ppm);
        true
    }

    pub fn as_slice(&mut self) -> &[f64] {
        self.values.make_contiguous()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn average(&self) -> Option<f64> {
        if self.values.is_empty() {
            return None;
        }
        Some(self.values.iter().sum::<f64>() / self.values.len() as f64)
    }
}

impl Default for RollingHistory {
    fn default() -> Self {
        Self::new(20)
    }
}
