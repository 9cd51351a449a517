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

//! Result store integration tests: persistence, retention and history.

use chrono::{Duration, TimeZone, Utc};
use perfguard::core::store::BASELINE_FILE;
use perfguard::{
    summarize, MemoryDelta, MetricKey, PerformanceReport, ResultMetadata, ResultStore,
    TestResult,
};
use std::fs::{self, File};
use std::path::Path;
use std::time::{Duration as StdDuration, SystemTime};
use tempfile::TempDir;

fn set_mtime(path: &Path, time: SystemTime) {
    let file = File::options().write(true).open(path).unwrap();
    file.set_modified(time).unwrap();
}

fn rich_report() -> PerformanceReport {
    let mut report = PerformanceReport::new("Storage Engine");
    let mut metadata = ResultMetadata {
        memory_delta: Some(MemoryDelta {
            heap_used: 4096,
            heap_total: 8192,
            external: -128,
            rss: 12288,
        }),
        additional_metrics: Some(Default::default()),
    };
    if let Some(metrics) = metadata.additional_metrics.as_mut() {
        metrics.insert(MetricKey::OpsPerSec, 1234.5678).unwrap();
        metrics.insert(MetricKey::BytesPerIteration, 0.1 + 0.2).unwrap();
    }

    report
        .push_result(
            TestResult::new("write, batched", summarize(&[0.1, 0.2, 0.30000000000000004]).unwrap(), 3)
                .with_provenance(Some("9f1c2e7".into()), Some("main".into()))
                .with_metadata(metadata),
        )
        .unwrap();
    report
        .push_result(TestResult::new(
            "read \"hot\"",
            summarize(&[1.0 / 3.0, 2.0 / 3.0]).unwrap(),
            2,
        ))
        .unwrap();
    report
}

#[test]
fn test_save_then_load_round_trips_every_field() {
    let dir = TempDir::new().unwrap();
    let store = ResultStore::new(dir.path());
    let report = rich_report();

    let path = store.save_report(&report).unwrap();
    assert!(path.starts_with(dir.path()));
    assert!(path
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("storage-engine-"));

    let loaded = store.load_report(&path).unwrap().unwrap();
    assert_eq!(loaded, report);

    let baseline_path = store.save_as_baseline(&report).unwrap();
    assert_eq!(baseline_path, dir.path().join(BASELINE_FILE));
    assert_eq!(store.load_baseline().unwrap().unwrap(), report);
}

#[test]
fn test_saved_json_uses_camel_case_keys() {
    let dir = TempDir::new().unwrap();
    let store = ResultStore::new(dir.path());
    let path = store.save_report(&rich_report()).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(json["testSuite"], "Storage Engine");
    let first = &json["results"][0];
    assert_eq!(first["testName"], "write, batched");
    assert!(first["stats"]["stdDev"].is_number());
    assert_eq!(first["metadata"]["memoryDelta"]["heapUsed"], 4096);
    assert_eq!(first["metadata"]["additionalMetrics"]["opsPerSec"], 1234.5678);
    assert!(json["results"][1].get("metadata").is_none());
    assert!(json["environment"]["runtime"]
        .as_str()
        .unwrap()
        .starts_with("perfguard/"));
}

#[test]
fn test_prune_keeps_most_recently_modified() {
    let dir = TempDir::new().unwrap();
    let store = ResultStore::new(dir.path());
    let epoch = SystemTime::now() - StdDuration::from_secs(3600);

    let baseline = store.save_as_baseline(&rich_report()).unwrap();
    set_mtime(&baseline, epoch - StdDuration::from_secs(86_400));

    let mut paths = Vec::new();
    for i in 0..5 {
        let mut report = PerformanceReport::new("prune");
        report.timestamp = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(i);
        let path = store.save_report(&report).unwrap();
        // Later report timestamps get older mtimes; ordering must follow mtime.
        set_mtime(&path, epoch + StdDuration::from_secs(60 * (10 - i as u64)));
        paths.push(path);
    }

    let removed = store.prune_reports(2).unwrap();
    assert_eq!(removed.len(), 3);

    let remaining = store.list_reports().unwrap();
    assert_eq!(remaining, vec![paths[0].clone(), paths[1].clone()]);
    for path in &paths[2..] {
        assert!(!path.exists());
        assert!(removed.contains(path));
    }

    assert!(baseline.exists());
    assert!(store.load_baseline().unwrap().is_some());
}

#[test]
fn test_prune_with_fewer_reports_than_limit() {
    let dir = TempDir::new().unwrap();
    let store = ResultStore::new(dir.path());
    store.save_report(&PerformanceReport::new("few")).unwrap();

    assert!(store.prune_reports(10).unwrap().is_empty());
    assert_eq!(store.list_reports().unwrap().len(), 1);
    assert_eq!(store.prune_reports(0).unwrap().len(), 1);
    assert!(store.list_reports().unwrap().is_empty());
}

#[test]
fn test_latest_report_follows_mtime() {
    let dir = TempDir::new().unwrap();
    let store = ResultStore::new(dir.path());
    let now = SystemTime::now();

    let older = store.save_report(&PerformanceReport::new("a")).unwrap();
    let newer = store.save_report(&PerformanceReport::new("b")).unwrap();
    set_mtime(&older, now - StdDuration::from_secs(120));
    set_mtime(&newer, now - StdDuration::from_secs(60));

    assert_eq!(store.latest_report().unwrap(), Some(newer));
}

#[test]
fn test_history_is_oldest_first_and_skips_malformed() {
    let dir = TempDir::new().unwrap();
    let store = ResultStore::new(dir.path());
    let start = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();

    for (i, mean) in [3.0, 1.0, 2.0].iter().enumerate() {
        let mut report = PerformanceReport::new("trend");
        report.timestamp = start + Duration::hours(i as i64);
        report
            .push_result(
                TestResult::new("op", summarize(&[*mean]).unwrap(), 1)
                    .with_timestamp(start + Duration::hours(i as i64)),
            )
            .unwrap();
        store.save_report(&report).unwrap();
    }
    fs::write(dir.path().join("corrupt.json"), "{ not json").unwrap();
    fs::write(dir.path().join("binary.json"), [0xff, 0xfe, 0x00, 0x7b]).unwrap();

    let history = store.history("op").unwrap();
    let means: Vec<f64> = history.iter().map(|p| p.stats.mean).collect();
    assert_eq!(means, vec![3.0, 1.0, 2.0]);
    assert!(history.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));

    assert!(store.history("absent").unwrap().is_empty());
}

#[test]
fn test_write_csv_is_not_listed_as_report() {
    let dir = TempDir::new().unwrap();
    let store = ResultStore::new(dir.path());
    let report = rich_report();
    store.save_report(&report).unwrap();

    let csv_path = store.write_csv(&report).unwrap();
    assert_eq!(csv_path.extension().unwrap(), "csv");
    let csv = fs::read_to_string(&csv_path).unwrap();
    assert!(csv.contains("\"write, batched\""));
    assert!(csv.contains("\"read \"\"hot\"\"\""));
    assert_eq!(store.list_reports().unwrap().len(), 1);
}
