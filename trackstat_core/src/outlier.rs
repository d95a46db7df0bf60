//! Smoothing of spikes in a column of values, typically pace.

use crate::geo_math::{mean, z_scores};

/// Replaces values that lie far from the mean of their column with the
/// mean of their neighbours.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlierCorrector {
    /// Values whose absolute z-score is at least this are outliers.
    pub z_threshold: f64,
}

impl OutlierCorrector {
    pub fn new(z_threshold: f64) -> Self {
        Self { z_threshold }
    }

    /// Makes a single pass over `values`. Each outlier is replaced by the
    /// mean of its original left and right neighbours, where a neighbour
    /// that is missing (or beyond either end of the column) counts as the
    /// column mean. Missing values stay missing.
    pub fn correct(&self, values: &[Option<f64>]) -> Vec<Option<f64>> {
        let Some(column_mean) = mean(values.iter().copied()) else {
            return values.to_vec();
        };

        let z = z_scores(values);
        let neighbour = |idx: Option<usize>| {
            idx.and_then(|i| values.get(i).copied().flatten())
                .unwrap_or(column_mean)
        };

        values
            .iter()
            .zip(&z)
            .enumerate()
            .map(|(idx, (value, z))| match z {
                Some(z) if z.abs() >= self.z_threshold => {
                    let left = neighbour(idx.checked_sub(1));
                    let right = neighbour(Some(idx + 1));
                    Some((left + right) / 2.0)
                }
                _ => *value,
            })
            .collect()
    }
}
