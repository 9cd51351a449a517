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

//! Baseline comparison and regression detection.
//!
//! Results are aligned by exact test name. Classification looks at the mean
//! only: a relative change strictly above the threshold is a regression,
//! strictly below its negation an improvement, anything else stable.

use crate::error::{PerfError, Result};
use crate::report::{PerformanceReport, StatisticalSummary, TestResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Default regression threshold (10%).
pub const DEFAULT_REGRESSION_THRESHOLD: f64 = 0.10;

/// Checks that a threshold is a finite, positive fraction.
pub fn validate_threshold(threshold: f64) -> Result<()> {
    if threshold.is_finite() && threshold > 0.0 {
        Ok(())
    } else {
        Err(PerfError::invalid_input(format!(
            "regression threshold must be a positive fraction, got {}",
            threshold
        )))
    }
}

/// Relative change `(current - baseline) / baseline`.
///
/// A zero baseline has no meaningful relative change and yields `0.0`.
pub fn relative_change(baseline: f64, current: f64) -> f64 {
    if baseline == 0.0 {
        return 0.0;
    }
    (current - baseline) / baseline
}

/// Classification of one aligned pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// Mean grew beyond the threshold.
    Regression,
    /// Mean shrank beyond the threshold.
    Improvement,
    /// Within the threshold either way.
    Stable,
}

impl Verdict {
    /// Returns the verdict as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Regression => "regression",
            Verdict::Improvement => "improvement",
            Verdict::Stable => "stable",
        }
    }
}

/// Comparison of one test present in both reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    /// Shared test name.
    pub test_name: String,
    /// Baseline statistics.
    pub baseline: StatisticalSummary,
    /// Current statistics.
    pub current: StatisticalSummary,
    /// Relative change of the mean.
    pub mean_change: f64,
    /// Relative change of the median.
    pub median_change: f64,
    /// Relative change of p95.
    pub p95_change: f64,
    /// Relative change of p99.
    pub p99_change: f64,
    /// `mean_change > threshold`.
    pub regression: bool,
    /// `mean_change < -threshold`.
    pub improvement: bool,
}

impl ComparisonResult {
    /// Compares two results sharing a test name.
    pub fn from_pair(baseline: &TestResult, current: &TestResult, threshold: f64) -> Self {
        let (b, c) = (&baseline.stats, &current.stats);
        let mean_change = relative_change(b.mean, c.mean);
        if b.mean == 0.0 {
            debug!(test = %current.test_name, "baseline mean is zero, treating change as 0");
        }

        Self {
            test_name: current.test_name.clone(),
            baseline: *b,
            current: *c,
            mean_change,
            median_change: relative_change(b.median, c.median),
            p95_change: relative_change(b.p95, c.p95),
            p99_change: relative_change(b.p99, c.p99),
            regression: mean_change > threshold,
            improvement: mean_change < -threshold,
        }
    }

    /// Returns the classification of this pair.
    pub fn verdict(&self) -> Verdict {
        if self.regression {
            Verdict::Regression
        } else if self.improvement {
            Verdict::Improvement
        } else {
            Verdict::Stable
        }
    }

    /// Mean change as a percentage.
    pub fn mean_change_pct(&self) -> f64 {
        self.mean_change * 100.0
    }
}

/// Outcome of comparing a current report against a baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comparison {
    /// Suite name of the baseline.
    pub baseline_suite: String,
    /// Suite name of the current report.
    pub current_suite: String,
    /// Threshold used for classification.
    pub threshold: f64,
    /// Matched tests, in current-report order.
    pub results: Vec<ComparisonResult>,
    /// Current tests without a baseline counterpart, in current-report order.
    pub unmatched: Vec<String>,
}

impl Comparison {
    /// Returns whether no test could be compared.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Iterates over regressed tests.
    pub fn regressions(&self) -> impl Iterator<Item = &ComparisonResult> {
        self.results.iter().filter(|r| r.regression)
    }

    /// Iterates over improved tests.
    pub fn improvements(&self) -> impl Iterator<Item = &ComparisonResult> {
        self.results.iter().filter(|r| r.improvement)
    }

    /// Returns whether any test regressed.
    pub fn has_regressions(&self) -> bool {
        self.results.iter().any(|r| r.regression)
    }

    /// Fails with [`PerfError::NoMatch`] if nothing was compared.
    pub fn require_matches(self) -> Result<Self> {
        if self.is_empty() {
            return Err(PerfError::NoMatch {
                baseline_suite: self.baseline_suite,
                current_suite: self.current_suite,
            });
        }
        Ok(self)
    }
}

/// Compares `current` against `baseline`.
///
/// Tests only present in `current` are logged and listed in
/// [`Comparison::unmatched`]; tests only present in `baseline` are ignored.
/// An empty result is not an error here; see [`compare_strict`].
///
/// # Errors
///
/// Returns [`PerfError::InvalidInput`] for a non-positive or non-finite
/// threshold.
pub fn compare(
    baseline: &PerformanceReport,
    current: &PerformanceReport,
    threshold: f64,
) -> Result<Comparison> {
    validate_threshold(threshold)?;

    let mut results = Vec::with_capacity(current.results.len());
    let mut unmatched = Vec::new();

    for current_result in &current.results {
        match baseline.get(&current_result.test_name) {
            Some(baseline_result) => {
                results.push(ComparisonResult::from_pair(
                    baseline_result,
                    current_result,
                    threshold,
                ));
            }
            None => {
                warn!(test = %current_result.test_name, "no baseline found for test, skipping");
                unmatched.push(current_result.test_name.clone());
            }
        }
    }

    Ok(Comparison {
        baseline_suite: baseline.test_suite.clone(),
        current_suite: current.test_suite.clone(),
        threshold,
        results,
        unmatched,
    })
}

/// Like [`compare`], but an empty comparison is a [`PerfError::NoMatch`].
pub fn compare_strict(
    baseline: &PerformanceReport,
    current: &PerformanceReport,
    threshold: f64,
) -> Result<Comparison> {
    compare(baseline, current, threshold)?.require_matches()
}
