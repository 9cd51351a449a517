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

//! Perfguard Benchmark Regression Detection
//!
//! Times units of work, reduces the samples to robust statistics, stores the
//! results next to a reference baseline and flags later runs that regressed.
//!
//! ## Features
//!
//! - **Sampling**: Per-iteration timing of sync and async operations, with
//!   optional memory deltas
//! - **Statistics**: Mean, median, min, max, p95, p99 and standard deviation
//! - **Storage**: Timestamped JSON reports, a baseline, retention and trends
//! - **Comparison**: Threshold-based regression and improvement detection
//! - **Export**: CSV and human-readable comparison summaries
//!
//! ## Usage
//!
//! ```no_run
//! use perfguard::{compare, PerformanceReport, ResultStore, DEFAULT_REGRESSION_THRESHOLD};
//!
//! # fn main() -> perfguard::Result<()> {
//! let store = ResultStore::new("perf-results");
//! let baseline = store.load_baseline()?.expect("baseline present");
//! let latest = store.latest_report()?.expect("report present");
//! let current: PerformanceReport = store.load_report(&latest)?.expect("readable report");
//!
//! let comparison = compare(&baseline, &current, DEFAULT_REGRESSION_THRESHOLD)?;
//! for regression in comparison.regressions() {
//!     println!("{} regressed by {:.1}%", regression.test_name, regression.mean_change_pct());
//! }
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod error;
pub mod harness;
pub mod report;
pub mod reporters;

// Re-export key types for convenience
pub use crate::core::{summarize, PerfConfig, ResultStore, Sampler};
pub use error::{PerfError, Result};
pub use harness::{
    compare, compare_strict, BenchmarkSuite, Comparison, ComparisonResult, Verdict,
    DEFAULT_REGRESSION_THRESHOLD,
};
pub use report::{
    AdditionalMetrics, Environment, MemoryDelta, MetricKey, PerformanceReport, ResultMetadata,
    StatisticalSummary, TestResult,
};
pub use reporters::{format_summary, summarize_comparison, to_csv, ComparisonSummary};
