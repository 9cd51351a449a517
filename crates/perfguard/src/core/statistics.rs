// Dweve Perfguard - Benchmark Regression Detection
//
// Copyright (c) 2025 Dweve IP B.V. and individual contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Reduction of raw durations into a [`StatisticalSummary`].
//!
//! Percentiles use the nearest-rank method: the sorted samples are indexed at
//! `floor(n * p)` with no interpolation. Stored baselines depend on this exact
//! formula, so changing it makes old baselines incomparable.

use crate::error::{PerfError, Result};
use crate::report::StatisticalSummary;

/// Index of the nearest-rank percentile `pct` (0-100) in a sorted slice of `len`.
///
/// Integer arithmetic keeps `floor(len * pct / 100)` exact for every length.
#[inline]
pub fn percentile_index(len: usize, pct: usize) -> usize {
    debug_assert!(len > 0);
    ((len * pct) / 100).min(len - 1)
}

/// Summarizes a non-empty sequence of durations.
///
/// # Errors
///
/// Returns [`PerfError::InvalidInput`] if `durations` is empty or contains a
/// NaN or infinite value.
///
/// # Example
///
/// ```
/// use perfguard::core::statistics::summarize;
///
/// let stats = summarize(&[3.0, 1.0, 2.0]).unwrap();
/// assert_eq!(stats.min, 1.0);
/// assert_eq!(stats.median, 2.0);
/// assert_eq!(stats.max, 3.0);
/// ```
pub fn summarize(durations: &[f64]) -> Result<StatisticalSummary> {
    if durations.is_empty() {
        return Err(PerfError::invalid_input(
            "cannot summarize zero samples; request at least one iteration",
        ));
    }
    if let Some(bad) = durations.iter().find(|d| !d.is_finite()) {
        return Err(PerfError::invalid_input(format!(
            "sample durations must be finite, got {}",
            bad
        )));
    }

    let mut sorted = durations.to_vec();
    sorted.sort_by(f64::total_cmp);

    let n = sorted.len();
    let min = sorted[0];
    let max = sorted[n - 1];

    // Summation rounding can push the mean a few ulps outside [min, max].
    let mean = (sorted.iter().sum::<f64>() / n as f64).clamp(min, max);

    let variance = sorted
        .iter()
        .map(|d| {
            let diff = d - mean;
            diff * diff
        })
        .sum::<f64>()
        / n as f64;

    Ok(StatisticalSummary {
        mean,
        median: sorted[n / 2],
        min,
        max,
        p95: sorted[percentile_index(n, 95)],
        p99: sorted[percentile_index(n, 99)],
        std_dev: variance.sqrt(),
    })
}
