use serde::{Deserialize, Serialize};

/// Uniformly sampled force trace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForceSeries {
    /// Uniform sampling frequency in Hz
    pub fs: f64,
    /// Force samples, one per tick
    pub data: Vec<f64>,
}

impl ForceSeries {
    pub fn len(&self) -> usize {
        self.data.len()
    }
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
