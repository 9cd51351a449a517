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

//! Benchmark suite runner.
//!
//! [`BenchmarkSuite`] ties the pieces together: it samples each registered
//! operation, summarizes the durations into a [`TestResult`], and on
//! [`finish`](BenchmarkSuite::finish) persists the report, prunes old ones,
//! optionally compares against the baseline and optionally promotes the run
//! to be the new baseline.

use crate::core::config::PerfConfig;
use crate::core::measurement::{SampleBatch, Sampler};
use crate::core::store::ResultStore;
use crate::error::{PerfError, Result};
use crate::harness::comparator::{compare, validate_threshold, Comparison};
use crate::report::{MetricKey, PerformanceReport, ResultMetadata, StatisticalSummary, TestResult};
use std::future::Future;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Failure of a fallible benchmark.
#[derive(Debug, Error)]
pub enum SuiteError<E> {
    /// The measured operation returned an error.
    #[error("benchmark '{name}' failed: {error}")]
    Operation {
        /// Benchmark name.
        name: String,
        /// Error returned by the operation.
        error: E,
    },

    /// Recording the result failed.
    #[error(transparent)]
    Perf(#[from] PerfError),
}

/// What [`BenchmarkSuite::finish`] did.
#[derive(Debug, Clone, PartialEq)]
pub struct SuiteOutcome {
    /// The report as saved.
    pub report: PerformanceReport,
    /// Where the report was written.
    pub report_path: PathBuf,
    /// Where the baseline was written, if it was replaced.
    pub baseline_path: Option<PathBuf>,
    /// Comparison against the previous baseline, if one was requested and
    /// a baseline existed.
    pub comparison: Option<Comparison>,
    /// Reports deleted by retention.
    pub pruned: Vec<PathBuf>,
}

impl SuiteOutcome {
    /// Returns whether the comparison found a regression.
    pub fn has_regressions(&self) -> bool {
        self.comparison
            .as_ref()
            .is_some_and(|c| c.has_regressions())
    }

    /// Returns whether a baseline existed but shared no test with this run.
    ///
    /// Such a run also reports no regressions, so callers gating on
    /// [`has_regressions`](Self::has_regressions) should check this too.
    pub fn is_unmatched(&self) -> bool {
        self.comparison.as_ref().is_some_and(|c| c.is_empty())
    }
}

/// Collects benchmark results for one suite.
///
/// # Example
///
/// ```no_run
/// use perfguard::core::config::PerfConfig;
/// use perfguard::core::store::ResultStore;
/// use perfguard::harness::runner::BenchmarkSuite;
/// use std::num::NonZeroUsize;
///
/// # fn main() -> perfguard::Result<()> {
/// let config = PerfConfig::from_env()?;
/// let store = ResultStore::new(&config.results_dir);
/// let mut suite = BenchmarkSuite::new("parser", config)?;
///
/// suite.bench("parse small", NonZeroUsize::new(100).unwrap(), || {
///     "1,2,3".split(',').count()
/// })?;
///
/// let outcome = suite.finish(&store)?;
/// println!("saved {}", outcome.report_path.display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct BenchmarkSuite {
    config: PerfConfig,
    sampler: Sampler,
    report: PerformanceReport,
}

impl BenchmarkSuite {
    /// Creates an empty suite.
    ///
    /// Memory is tracked with the process probe when `config.track_memory`
    /// is set.
    ///
    /// # Errors
    ///
    /// Returns [`PerfError::InvalidInput`] for an invalid threshold.
    pub fn new(test_suite: impl Into<String>, config: PerfConfig) -> Result<Self> {
        validate_threshold(config.regression_threshold)?;
        let sampler = if config.track_memory {
            Sampler::with_process_memory()
        } else {
            Sampler::new()
        };
        Ok(Self {
            config,
            sampler,
            report: PerformanceReport::new(test_suite),
        })
    }

    /// Replaces the sampler, for example to install a custom memory probe.
    pub fn with_sampler(mut self, sampler: Sampler) -> Self {
        self.sampler = sampler;
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &PerfConfig {
        &self.config
    }

    /// Returns the results collected so far.
    pub fn report(&self) -> &PerformanceReport {
        &self.report
    }

    /// Consumes the suite without persisting anything.
    pub fn into_report(self) -> PerformanceReport {
        self.report
    }

    fn total_iterations(&self, iterations: NonZeroUsize) -> NonZeroUsize {
        iterations.saturating_add(self.config.warmup)
    }

    fn ensure_unique(&self, name: &str) -> Result<()> {
        if self.report.get(name).is_some() {
            return Err(PerfError::invalid_input(format!(
                "duplicate test name '{}' in suite '{}'",
                name, self.report.test_suite
            )));
        }
        Ok(())
    }

    fn record<T>(
        &mut self,
        name: String,
        batch: SampleBatch<T>,
    ) -> Result<StatisticalSummary> {
        let batch = batch.skip(self.config.warmup);
        let stats = batch.summarize()?;
        let metadata = ResultMetadata {
            memory_delta: batch.total_memory_delta(),
            additional_metrics: None,
        };

        debug!(
            suite = %self.report.test_suite,
            test = %name,
            iterations = batch.len(),
            mean_ms = stats.mean,
            "benchmark recorded"
        );

        let result = TestResult::new(name, stats, batch.len())
            .with_provenance(self.config.commit.clone(), self.config.branch.clone())
            .with_metadata(metadata);
        self.report.push_result(result)?;
        Ok(stats)
    }

    /// Measures a synchronous operation.
    ///
    /// # Errors
    ///
    /// Returns [`PerfError::InvalidInput`] if `name` was already recorded.
    pub fn bench<T, F>(
        &mut self,
        name: impl Into<String>,
        iterations: NonZeroUsize,
        operation: F,
    ) -> Result<StatisticalSummary>
    where
        F: FnMut() -> T,
    {
        let name = name.into();
        self.ensure_unique(&name)?;
        let batch = self
            .sampler
            .run(self.total_iterations(iterations), operation);
        self.record(name, batch)
    }

    /// Measures a fallible synchronous operation.
    ///
    /// The first error aborts the benchmark; nothing is recorded for it.
    pub fn try_bench<T, E, F>(
        &mut self,
        name: impl Into<String>,
        iterations: NonZeroUsize,
        operation: F,
    ) -> std::result::Result<StatisticalSummary, SuiteError<E>>
    where
        F: FnMut() -> std::result::Result<T, E>,
    {
        let name = name.into();
        self.ensure_unique(&name)?;
        let batch = self
            .sampler
            .try_run(self.total_iterations(iterations), operation)
            .map_err(|error| SuiteError::Operation {
                name: name.clone(),
                error,
            })?;
        Ok(self.record(name, batch)?)
    }

    /// Measures an async operation, awaiting each iteration in turn.
    pub async fn bench_async<T, F, Fut>(
        &mut self,
        name: impl Into<String>,
        iterations: NonZeroUsize,
        operation: F,
    ) -> Result<StatisticalSummary>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = T>,
    {
        let name = name.into();
        self.ensure_unique(&name)?;
        let total = self.total_iterations(iterations);
        let batch = self.sampler.run_async(total, operation).await;
        self.record(name, batch)
    }

    /// Measures a fallible async operation.
    pub async fn try_bench_async<T, E, F, Fut>(
        &mut self,
        name: impl Into<String>,
        iterations: NonZeroUsize,
        operation: F,
    ) -> std::result::Result<StatisticalSummary, SuiteError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        let name = name.into();
        self.ensure_unique(&name)?;
        let total = self.total_iterations(iterations);
        let batch = self
            .sampler
            .try_run_async(total, operation)
            .await
            .map_err(|error| SuiteError::Operation {
                name: name.clone(),
                error,
            })?;
        Ok(self.record(name, batch)?)
    }

    /// Attaches an extra metric to an already recorded benchmark.
    ///
    /// # Errors
    ///
    /// Returns [`PerfError::InvalidInput`] for an unknown test name or a
    /// non-finite value.
    pub fn record_metric(&mut self, test_name: &str, key: MetricKey, value: f64) -> Result<()> {
        let suite = &self.report.test_suite;
        let result = self
            .report
            .results
            .iter_mut()
            .find(|r| r.test_name == test_name)
            .ok_or_else(|| {
                PerfError::invalid_input(format!(
                    "no benchmark named '{}' in suite '{}'",
                    test_name, suite
                ))
            })?;

        let metadata = result.metadata.get_or_insert_with(ResultMetadata::default);
        metadata
            .additional_metrics
            .get_or_insert_with(Default::default)
            .insert(key, value)
    }

    /// Persists the run.
    ///
    /// Steps, in order: compare against the existing baseline (when
    /// `compare` is set), save the report, prune to `keep_last`, then
    /// replace the baseline (when `save_baseline` is set).
    pub fn finish(self, store: &ResultStore) -> Result<SuiteOutcome> {
        let Self { config, report, .. } = self;

        if report.is_empty() {
            warn!(suite = %report.test_suite, "finishing a suite without results");
        }

        let comparison = if config.compare {
            match store.load_baseline()? {
                Some(baseline) => {
                    let comparison = compare(&baseline, &report, config.regression_threshold)?;
                    if comparison.is_empty() {
                        warn!(
                            baseline = %baseline.test_suite,
                            current = %report.test_suite,
                            "no matching tests found between baseline and current run"
                        );
                    }
                    Some(comparison)
                }
                None => {
                    warn!(
                        path = %store.baseline_path().display(),
                        "comparison requested but no baseline exists"
                    );
                    None
                }
            }
        } else {
            None
        };

        let report_path = store.save_report(&report)?;

        let pruned = match config.keep_last {
            Some(keep_last) => store.prune_reports(keep_last)?,
            None => Vec::new(),
        };

        let baseline_path = if config.save_baseline {
            let path = store.save_as_baseline(&report)?;
            info!(suite = %report.test_suite, path = %path.display(), "baseline updated");
            Some(path)
        } else {
            None
        };

        Ok(SuiteOutcome {
            report,
            report_path,
            baseline_path,
            comparison,
            pruned,
        })
    }
}
