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

//! End-to-end comparison scenarios through the result store.
//!
//! Each scenario saves reports into a temporary results directory, reloads
//! them and runs the comparator on what was read back.

use perfguard::{
    compare, compare_strict, format_summary, PerfError, PerformanceReport, ResultStore,
    StatisticalSummary, TestResult, DEFAULT_REGRESSION_THRESHOLD,
};
use std::io::Write;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

fn stats(mean: f64) -> StatisticalSummary {
    StatisticalSummary {
        mean,
        median: mean,
        min: mean * 0.9,
        max: mean * 1.2,
        p95: mean * 1.1,
        p99: mean * 1.2,
        std_dev: mean * 0.05,
    }
}

fn create_report(suite: &str, tests: &[(&str, f64)]) -> PerformanceReport {
    let mut report = PerformanceReport::new(suite);
    for (name, mean) in tests {
        report
            .push_result(TestResult::new(*name, stats(*mean), 50))
            .unwrap();
    }
    report
}

/// Collects formatted log output in memory.
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl LogBuffer {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

// ============================================================================
// Scenario A: regression detected
// ============================================================================

#[test]
fn scenario_a_regression_detected() {
    let dir = TempDir::new().unwrap();
    let store = ResultStore::new(dir.path());

    store
        .save_as_baseline(&create_report("suite", &[("X", 10.0)]))
        .unwrap();
    let current_path = store
        .save_report(&create_report("suite", &[("X", 13.0)]))
        .unwrap();

    let baseline = store.load_baseline().unwrap().unwrap();
    let current = store.load_report(&current_path).unwrap().unwrap();

    let comparison = compare(&baseline, &current, DEFAULT_REGRESSION_THRESHOLD).unwrap();
    assert_eq!(comparison.results.len(), 1);
    let result = &comparison.results[0];
    assert_eq!(result.test_name, "X");
    assert!((result.mean_change - 0.30).abs() < 1e-12);
    assert!(result.regression);
    assert!(!result.improvement);
    assert!(comparison.has_regressions());

    let text = format_summary(&comparison).unwrap();
    assert!(text.contains("REGRESSION"));
    assert!(text.contains("X: +30.00% mean"));
}

// ============================================================================
// Scenario B: unmatched tests
// ============================================================================

#[test]
fn scenario_b_unmatched_tests_are_warned_and_skipped() {
    let baseline = create_report("suite", &[("X", 10.0), ("Y", 10.0)]);
    let current = create_report("suite", &[("X", 10.0), ("Z", 10.0)]);

    let logs = LogBuffer::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .finish();

    let comparison = tracing::subscriber::with_default(subscriber, || {
        compare(&baseline, &current, DEFAULT_REGRESSION_THRESHOLD).unwrap()
    });

    assert_eq!(comparison.results.len(), 1);
    assert_eq!(comparison.results[0].test_name, "X");
    assert_eq!(comparison.unmatched, vec!["Z".to_string()]);

    let output = logs.contents();
    assert!(output.contains("WARN"), "expected a warning, got: {}", output);
    assert!(output.contains("test=Z"));
    assert!(!output.contains("test=Y"), "baseline-only test must not be reported");
}

// ============================================================================
// Scenario C: no baseline
// ============================================================================

#[test]
fn scenario_c_missing_baseline_is_absent() {
    let dir = TempDir::new().unwrap();
    let store = ResultStore::new(dir.path().join("never-created"));

    assert!(!store.has_baseline());
    assert_eq!(store.load_baseline().unwrap(), None);
    assert!(store.list_reports().unwrap().is_empty());
    assert!(!dir.path().join("never-created").exists());
}

#[test]
fn disjoint_reports_fail_strict_comparison() {
    let baseline = create_report("nightly", &[("Y", 10.0)]);
    let current = create_report("pr", &[("Z", 10.0)]);

    let err = compare_strict(&baseline, &current, DEFAULT_REGRESSION_THRESHOLD).unwrap_err();
    assert!(matches!(err, PerfError::NoMatch { .. }));
    assert!(err.to_string().contains("No matching tests found"));
    assert!(err.remediation().is_some());
}

#[test]
fn promoting_a_report_changes_the_reference() {
    let dir = TempDir::new().unwrap();
    let store = ResultStore::new(dir.path());

    store
        .save_as_baseline(&create_report("suite", &[("X", 10.0)]))
        .unwrap();
    let slower = create_report("suite", &[("X", 13.0)]);
    store.save_as_baseline(&slower).unwrap();

    let baseline = store.load_baseline().unwrap().unwrap();
    let comparison = compare(&baseline, &slower, DEFAULT_REGRESSION_THRESHOLD).unwrap();
    assert_eq!(comparison.results[0].mean_change, 0.0);
    assert!(!comparison.has_regressions());
}
