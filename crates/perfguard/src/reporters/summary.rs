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

//! Comparison summaries.

use crate::error::{PerfError, Result};
use crate::harness::comparator::{Comparison, ComparisonResult, Verdict};
use serde::{Deserialize, Serialize};

/// A regressed test and its mean change in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegressedTest {
    /// Test name.
    pub test_name: String,
    /// Mean change in percent (`30.0` = 30% slower).
    pub mean_change_pct: f64,
}

/// Counts and regressed tests of a comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonSummary {
    /// Number of compared tests.
    pub total: usize,
    /// Number of regressions.
    pub regressions: usize,
    /// Number of improvements.
    pub improvements: usize,
    /// Number of stable tests.
    pub stable: usize,
    /// Regressed tests, in comparison order.
    pub regressed: Vec<RegressedTest>,
    /// Current tests that had no baseline.
    pub unmatched: Vec<String>,
}

impl ComparisonSummary {
    /// Returns whether any test regressed.
    pub fn has_regressions(&self) -> bool {
        self.regressions > 0
    }
}

fn check_finite(result: &ComparisonResult) -> Result<()> {
    let changes = [
        result.mean_change,
        result.median_change,
        result.p95_change,
        result.p99_change,
    ];
    if changes.iter().all(|c| c.is_finite())
        && result.baseline.is_finite()
        && result.current.is_finite()
    {
        Ok(())
    } else {
        Err(PerfError::invalid_input(format!(
            "comparison of '{}' contains non-finite values",
            result.test_name
        )))
    }
}

/// Builds the structured summary of a comparison.
///
/// # Errors
///
/// Returns [`PerfError::InvalidInput`] if any change is NaN or infinite.
pub fn summarize_comparison(comparison: &Comparison) -> Result<ComparisonSummary> {
    let mut summary = ComparisonSummary {
        total: comparison.results.len(),
        regressions: 0,
        improvements: 0,
        stable: 0,
        regressed: Vec::new(),
        unmatched: comparison.unmatched.clone(),
    };

    for result in &comparison.results {
        check_finite(result)?;
        match result.verdict() {
            Verdict::Regression => {
                summary.regressions += 1;
                summary.regressed.push(RegressedTest {
                    test_name: result.test_name.clone(),
                    mean_change_pct: result.mean_change_pct(),
                });
            }
            Verdict::Improvement => summary.improvements += 1,
            Verdict::Stable => summary.stable += 1,
        }
    }

    Ok(summary)
}

/// Formats a comparison as human-readable text.
///
/// One line per compared test with its verdict, mean change and baseline and
/// current means, followed by totals and any tests without a baseline.
///
/// # Errors
///
/// Returns [`PerfError::InvalidInput`] if any change is NaN or infinite.
pub fn format_summary(comparison: &Comparison) -> Result<String> {
    let summary = summarize_comparison(comparison)?;
    let mut out = String::new();

    out.push_str(&format!(
        "Comparison: '{}' against baseline '{}' (threshold {:.1}%)\n\n",
        comparison.current_suite,
        comparison.baseline_suite,
        comparison.threshold * 100.0
    ));

    for result in &comparison.results {
        let label = match result.verdict() {
            Verdict::Regression => "REGRESSION",
            Verdict::Improvement => "IMPROVEMENT",
            Verdict::Stable => "STABLE",
        };
        out.push_str(&format!(
            "  [{:<11}] {}: {:+.2}% mean ({:.3}ms -> {:.3}ms, p95 {:+.2}%)\n",
            label,
            result.test_name,
            result.mean_change_pct(),
            result.baseline.mean,
            result.current.mean,
            result.p95_change * 100.0
        ));
    }

    if !summary.unmatched.is_empty() {
        out.push_str(&format!(
            "\nNo baseline for: {}\n",
            summary.unmatched.join(", ")
        ));
    }

    out.push_str(&format!(
        "\nTotal: {}  Regressions: {}  Improvements: {}  Stable: {}\n",
        summary.total, summary.regressions, summary.improvements, summary.stable
    ));

    Ok(out)
}
