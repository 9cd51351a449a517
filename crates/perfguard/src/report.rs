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

//! Report data model.
//!
//! These types are persisted as JSON by the result store. Field names are
//! camelCase on disk so reports stay readable by other tooling that consumes
//! the same schema.

use crate::error::{PerfError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Statistical summary of one batch of samples, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticalSummary {
    /// Arithmetic mean.
    pub mean: f64,
    /// Upper median (`sorted[n / 2]`).
    pub median: f64,
    /// Fastest sample.
    pub min: f64,
    /// Slowest sample.
    pub max: f64,
    /// 95th nearest-rank percentile.
    pub p95: f64,
    /// 99th nearest-rank percentile.
    pub p99: f64,
    /// Population standard deviation.
    pub std_dev: f64,
}

impl StatisticalSummary {
    /// Returns the statistics in CSV column order.
    pub fn values(&self) -> [f64; 7] {
        [
            self.mean,
            self.median,
            self.min,
            self.max,
            self.p95,
            self.p99,
            self.std_dev,
        ]
    }

    /// Returns whether every statistic is a finite number.
    pub fn is_finite(&self) -> bool {
        self.values().iter().all(|v| v.is_finite())
    }
}

/// Component-wise memory difference between two snapshots, in bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryDelta {
    /// Change in heap bytes in use.
    pub heap_used: i64,
    /// Change in total heap bytes reserved.
    pub heap_total: i64,
    /// Change in memory held outside the heap.
    pub external: i64,
    /// Change in resident set size.
    pub rss: i64,
}

impl MemoryDelta {
    /// Adds another delta component-wise.
    pub fn accumulate(&mut self, other: &MemoryDelta) {
        self.heap_used += other.heap_used;
        self.heap_total += other.heap_total;
        self.external += other.external;
        self.rss += other.rss;
    }
}

/// Recognized keys of [`AdditionalMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MetricKey {
    /// Completed operations per second.
    OpsPerSec,
    /// Bytes processed by one iteration.
    BytesPerIteration,
    /// Items (records, messages, nodes) handled by one iteration.
    ItemsPerIteration,
    /// Allocations performed by one iteration.
    Allocations,
}

impl MetricKey {
    /// All recognized keys.
    pub const ALL: [MetricKey; 4] = [
        MetricKey::OpsPerSec,
        MetricKey::BytesPerIteration,
        MetricKey::ItemsPerIteration,
        MetricKey::Allocations,
    ];

    /// Returns the key as it appears in persisted reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKey::OpsPerSec => "opsPerSec",
            MetricKey::BytesPerIteration => "bytesPerIteration",
            MetricKey::ItemsPerIteration => "itemsPerIteration",
            MetricKey::Allocations => "allocations",
        }
    }

    /// Parses a persisted key name.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Numeric side-channel attached to a test result.
///
/// Writes go through [`MetricKey`], so only recognized keys can be produced.
/// Reads are lenient: keys written by other tools survive a load/save cycle
/// untouched but are not reachable through [`get`](Self::get).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdditionalMetrics(BTreeMap<String, f64>);

impl AdditionalMetrics {
    /// Creates an empty metrics map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a metric. Non-finite values are rejected.
    pub fn insert(&mut self, key: MetricKey, value: f64) -> Result<()> {
        if !value.is_finite() {
            return Err(PerfError::invalid_input(format!(
                "metric '{}' must be finite, got {}",
                key, value
            )));
        }
        self.0.insert(key.as_str().to_string(), value);
        Ok(())
    }

    /// Returns the value recorded for `key`.
    pub fn get(&self, key: MetricKey) -> Option<f64> {
        self.0.get(key.as_str()).copied()
    }

    /// Returns the number of stored entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether no metric is stored.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over recognized entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (MetricKey, f64)> + '_ {
        self.0
            .iter()
            .filter_map(|(name, value)| MetricKey::parse(name).map(|key| (key, *value)))
    }
}

/// Optional metadata recorded with a test result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultMetadata {
    /// Memory delta summed over all measured iterations.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub memory_delta: Option<MemoryDelta>,
    /// Extra numeric measurements.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub additional_metrics: Option<AdditionalMetrics>,
}

impl ResultMetadata {
    /// Returns whether neither field is set.
    pub fn is_empty(&self) -> bool {
        self.memory_delta.is_none() && self.additional_metrics.is_none()
    }
}

/// One named benchmark outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    /// Benchmark name, unique within a report.
    pub test_name: String,
    /// When the benchmark finished.
    pub timestamp: DateTime<Utc>,
    /// Commit the measured code was built from.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub commit: Option<String>,
    /// Branch the measured code was built from.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub branch: Option<String>,
    /// Summary of the measured durations.
    pub stats: StatisticalSummary,
    /// Number of samples behind `stats`.
    pub iterations: usize,
    /// Optional side-channel data.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub metadata: Option<ResultMetadata>,
}

impl TestResult {
    /// Creates a result stamped with the current time.
    pub fn new(test_name: impl Into<String>, stats: StatisticalSummary, iterations: usize) -> Self {
        Self {
            test_name: test_name.into(),
            timestamp: Utc::now(),
            commit: None,
            branch: None,
            stats,
            iterations,
            metadata: None,
        }
    }

    /// Sets commit and branch provenance.
    pub fn with_provenance(mut self, commit: Option<String>, branch: Option<String>) -> Self {
        self.commit = commit;
        self.branch = branch;
        self
    }

    /// Attaches metadata; empty metadata is dropped.
    pub fn with_metadata(mut self, metadata: ResultMetadata) -> Self {
        self.metadata = if metadata.is_empty() {
            None
        } else {
            Some(metadata)
        };
        self
    }

    /// Overrides the timestamp.
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// Description of the machine that produced a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    /// Measuring runtime and its version.
    pub runtime: String,
    /// Operating system.
    pub platform: String,
    /// CPU architecture.
    pub arch: String,
}

impl Environment {
    /// Describes the current process.
    pub fn current() -> Self {
        Self {
            runtime: concat!("perfguard/", env!("CARGO_PKG_VERSION")).to_string(),
            platform: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
        }
    }
}

/// A named batch of test results captured in one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceReport {
    /// Suite name.
    pub test_suite: String,
    /// When the run started.
    pub timestamp: DateTime<Utc>,
    /// Machine description.
    pub environment: Environment,
    /// Results in the order the benchmarks ran.
    pub results: Vec<TestResult>,
}

impl PerformanceReport {
    /// Creates an empty report for the current environment.
    pub fn new(test_suite: impl Into<String>) -> Self {
        Self {
            test_suite: test_suite.into(),
            timestamp: Utc::now(),
            environment: Environment::current(),
            results: Vec::new(),
        }
    }

    /// Appends a result, rejecting a name already present in this report.
    pub fn push_result(&mut self, result: TestResult) -> Result<()> {
        if self.get(&result.test_name).is_some() {
            return Err(PerfError::invalid_input(format!(
                "duplicate test name '{}' in suite '{}'",
                result.test_name, self.test_suite
            )));
        }
        self.results.push(result);
        Ok(())
    }

    /// Looks up a result by exact test name.
    pub fn get(&self, test_name: &str) -> Option<&TestResult> {
        self.results.iter().find(|r| r.test_name == test_name)
    }

    /// Returns the number of results.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Returns whether the report holds no results.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Serializes the report as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses a report from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(mean: f64) -> StatisticalSummary {
        StatisticalSummary {
            mean,
            median: mean,
            min: mean,
            max: mean,
            p95: mean,
            p99: mean,
            std_dev: 0.0,
        }
    }

    #[test]
    fn test_push_result_rejects_duplicates() {
        let mut report = PerformanceReport::new("ipc");
        report.push_result(TestResult::new("read", stats(1.0), 10)).unwrap();
        let err = report
            .push_result(TestResult::new("read", stats(2.0), 10))
            .unwrap_err();
        assert!(matches!(err, PerfError::InvalidInput(_)));
        assert_eq!(report.len(), 1);
    }

    #[test]
    fn test_json_uses_camel_case() {
        let mut report = PerformanceReport::new("ipc");
        let mut metrics = AdditionalMetrics::new();
        metrics.insert(MetricKey::OpsPerSec, 1200.0).unwrap();
        let result = TestResult::new("read", stats(1.5), 10).with_metadata(ResultMetadata {
            memory_delta: Some(MemoryDelta {
                heap_used: 4096,
                ..MemoryDelta::default()
            }),
            additional_metrics: Some(metrics),
        });
        report.push_result(result).unwrap();

        let json = report.to_json().unwrap();
        assert!(json.contains("\"testSuite\""));
        assert!(json.contains("\"testName\""));
        assert!(json.contains("\"stdDev\""));
        assert!(json.contains("\"memoryDelta\""));
        assert!(json.contains("\"heapUsed\""));
        assert!(json.contains("\"opsPerSec\""));
        assert!(!json.contains("\"commit\""));
    }

    #[test]
    fn test_metadata_empty_is_dropped() {
        let result = TestResult::new("read", stats(1.0), 1).with_metadata(ResultMetadata::default());
        assert!(result.metadata.is_none());
    }

    #[test]
    fn test_additional_metrics_rejects_non_finite() {
        let mut metrics = AdditionalMetrics::new();
        assert!(metrics.insert(MetricKey::Allocations, f64::NAN).is_err());
        assert!(metrics.insert(MetricKey::Allocations, f64::INFINITY).is_err());
        assert!(metrics.is_empty());

        metrics.insert(MetricKey::Allocations, 3.0).unwrap();
        assert_eq!(metrics.get(MetricKey::Allocations), Some(3.0));
        assert_eq!(metrics.get(MetricKey::OpsPerSec), None);
    }

    #[test]
    fn test_unknown_metric_keys_survive_but_are_not_exposed() {
        let metrics: AdditionalMetrics =
            serde_json::from_str(r#"{"opsPerSec": 10.0, "legacyScore": 3.0}"#).unwrap();
        assert_eq!(metrics.len(), 2);
        let recognized: Vec<_> = metrics.iter().collect();
        assert_eq!(recognized, vec![(MetricKey::OpsPerSec, 10.0)]);
    }

    #[test]
    fn test_metric_key_parse() {
        for key in MetricKey::ALL {
            assert_eq!(MetricKey::parse(key.as_str()), Some(key));
        }
        assert_eq!(MetricKey::parse("nope"), None);
    }

    #[test]
    fn test_memory_delta_accumulate() {
        let mut total = MemoryDelta::default();
        total.accumulate(&MemoryDelta {
            heap_used: 10,
            heap_total: 20,
            external: -5,
            rss: 4096,
        });
        total.accumulate(&MemoryDelta {
            heap_used: -4,
            heap_total: 0,
            external: 5,
            rss: 0,
        });
        assert_eq!(
            total,
            MemoryDelta {
                heap_used: 6,
                heap_total: 20,
                external: 0,
                rss: 4096
            }
        );
    }
}
