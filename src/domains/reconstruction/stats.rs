use serde::{Deserialize, Serialize};

use super::camera::DepthBuffer;

pub const DEFAULT_HISTOGRAM_BINS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepthStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub count: usize,
}

impl DepthStats {
    /// Finite values only; `None` when there are none.
    pub fn from_values<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut count = 0usize;
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for v in values.into_iter().filter(|v| v.is_finite()) {
            count += 1;
            sum += v;
            min = min.min(v);
            max = max.max(v);
        }
        (count > 0).then(|| Self {
            min,
            max,
            mean: sum / count as f64,
            count,
        })
    }

    pub fn of_buffer(depth: &DepthBuffer) -> Option<Self> {
        Self::from_values(depth.values.iter().map(|&v| f64::from(v)))
    }

    /// Aggregate over several buffers.
    pub fn of_buffers<'a, I>(buffers: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a DepthBuffer>,
    {
        Self::from_values(
            buffers
                .into_iter()
                .flat_map(|b| b.values.iter().map(|&v| f64::from(v))),
        )
    }
}

/// Histogram of `ln(depth)` with evenly spaced bins between the smallest
/// and largest log value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogDepthHistogram {
    /// `counts.len() + 1` edges in log space.
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
    /// Non-positive or non-finite values left out of the histogram.
    pub skipped: usize,
}

impl LogDepthHistogram {
    pub fn from_values<I>(values: I, bins: usize) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let bins = bins.max(1);
        let mut skipped = 0usize;
        let logs: Vec<f64> = values
            .into_iter()
            .filter_map(|v| {
                if v > 0.0 && v.is_finite() {
                    Some(v.ln())
                } else {
                    skipped += 1;
                    None
                }
            })
            .collect();

        if logs.is_empty() {
            return Self {
                edges: Vec::new(),
                counts: vec![0; bins],
                skipped,
            };
        }

        let lo = logs.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = logs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        // single-valued input gets a unit-wide range
        let (lo, hi) = if hi > lo { (lo, hi) } else { (lo - 0.5, lo + 0.5) };
        let width = (hi - lo) / bins as f64;

        let mut counts = vec![0usize; bins];
        for v in logs {
            let bin = (((v - lo) / width) as usize).min(bins - 1);
            counts[bin] += 1;
        }
        let edges = (0..=bins).map(|i| lo + width * i as f64).collect();

        Self {
            edges,
            counts,
            skipped,
        }
    }

    pub fn of_buffers<'a, I>(buffers: I, bins: usize) -> Self
    where
        I: IntoIterator<Item = &'a DepthBuffer>,
    {
        Self::from_values(
            buffers
                .into_iter()
                .flat_map(|b| b.values.iter().map(|&v| f64::from(v))),
            bins,
        )
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}
