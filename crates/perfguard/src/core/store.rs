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

//! Durable storage for reports and the baseline.
//!
//! Layout of the results directory:
//!
//! ```text
//! <root>/
//! ├── baseline.json                      the single comparison reference
//! ├── <suite>-<timestamp>.json           one file per saved report
//! └── <suite>-<timestamp>.csv            optional CSV exports
//! ```
//!
//! Reports are never overwritten; the baseline is replaced wholesale on every
//! save. There is no locking: two processes saving a baseline at the same
//! time race and the last writer wins.

use crate::error::{PerfError, Result};
use crate::report::{PerformanceReport, StatisticalSummary};
use crate::reporters::csv::to_csv;
use chrono::{DateTime, Utc};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info, warn};

/// File name of the baseline inside the results directory.
pub const BASELINE_FILE: &str = "baseline.json";

const REPORT_EXTENSION: &str = "json";
const TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%S%.3fZ";

/// One point of a test's history across stored reports.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendPoint {
    /// Report the point was read from.
    pub report: PathBuf,
    /// Timestamp of the test result.
    pub timestamp: DateTime<Utc>,
    /// Commit recorded with the result.
    pub commit: Option<String>,
    /// Statistics recorded with the result.
    pub stats: StatisticalSummary,
}

/// File-backed store rooted at one results directory.
///
/// # Example
///
/// ```no_run
/// use perfguard::core::store::ResultStore;
/// use perfguard::report::PerformanceReport;
///
/// let store = ResultStore::new("perf-results");
/// let path = store.save_report(&PerformanceReport::new("ipc"))?;
/// let loaded = store.load_report(&path)?;
/// assert!(loaded.is_some());
/// # Ok::<(), perfguard::PerfError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ResultStore {
    root: PathBuf,
}

impl ResultStore {
    /// Creates a store; the directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the results directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the fixed baseline location.
    pub fn baseline_path(&self) -> PathBuf {
        self.root.join(BASELINE_FILE)
    }

    /// Returns whether a baseline has been established.
    pub fn has_baseline(&self) -> bool {
        self.baseline_path().is_file()
    }

    fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.root).map_err(|e| PerfError::io_error(&self.root, e))
    }

    /// Persists `report` under a new timestamp-suffixed name.
    ///
    /// An existing file is never replaced; on a name collision a numeric
    /// suffix is appended.
    pub fn save_report(&self, report: &PerformanceReport) -> Result<PathBuf> {
        self.ensure_dir()?;
        let json = report.to_json()?;
        let stem = report_stem(report);

        let mut attempt = 0usize;
        loop {
            let name = if attempt == 0 {
                format!("{}.{}", stem, REPORT_EXTENSION)
            } else {
                format!("{}-{}.{}", stem, attempt, REPORT_EXTENSION)
            };
            let path = self.root.join(name);

            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    if let Err(e) = file.write_all(json.as_bytes()) {
                        drop(file);
                        discard_partial(&path);
                        return Err(PerfError::io_error(&path, e));
                    }
                    debug!(path = %path.display(), suite = %report.test_suite, "saved report");
                    return Ok(path);
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => return Err(PerfError::io_error(&path, e)),
            }
        }
    }

    /// Replaces the baseline with `report`.
    pub fn save_as_baseline(&self, report: &PerformanceReport) -> Result<PathBuf> {
        self.ensure_dir()?;
        let json = report.to_json()?;
        let path = self.baseline_path();
        let staging = self.root.join(format!("{}.tmp", BASELINE_FILE));

        if let Err(e) = fs::write(&staging, json) {
            discard_partial(&staging);
            return Err(PerfError::io_error(&staging, e));
        }
        if let Err(e) = fs::rename(&staging, &path) {
            discard_partial(&staging);
            return Err(PerfError::io_error(&path, e));
        }

        info!(path = %path.display(), suite = %report.test_suite, results = report.len(), "baseline saved");
        Ok(path)
    }

    /// Loads the baseline, or `None` if none has been saved.
    pub fn load_baseline(&self) -> Result<Option<PerformanceReport>> {
        self.load_report(self.baseline_path())
    }

    /// Loads a report.
    ///
    /// A missing file or unparseable content (including bytes that are not
    /// UTF-8) yields `None`; the latter is logged as a warning. Other I/O
    /// failures are returned as errors.
    pub fn load_report(&self, path: impl AsRef<Path>) -> Result<Option<PerformanceReport>> {
        let path = path.as_ref();
        let contents = match fs::read(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "report not found");
                return Ok(None);
            }
            Err(e) => return Err(PerfError::io_error(path, e)),
        };

        match parse_report(path, &contents) {
            Ok(report) => Ok(Some(report)),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "ignoring malformed report");
                Ok(None)
            }
        }
    }

    /// Lists saved reports, most recently modified first.
    ///
    /// The baseline and non-report files are excluded. A missing results
    /// directory yields an empty list.
    pub fn list_reports(&self) -> Result<Vec<PathBuf>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(PerfError::io_error(&self.root, e)),
        };

        let mut reports: Vec<(SystemTime, PathBuf)> = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| PerfError::io_error(&self.root, e))?;
            let path = entry.path();
            if !is_report_file(&path) {
                continue;
            }
            let metadata = entry
                .metadata()
                .map_err(|e| PerfError::io_error(&path, e))?;
            if !metadata.is_file() {
                continue;
            }
            let modified = metadata
                .modified()
                .map_err(|e| PerfError::io_error(&path, e))?;
            reports.push((modified, path));
        }

        reports.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| b.1.cmp(&a.1)));
        Ok(reports.into_iter().map(|(_, path)| path).collect())
    }

    /// Returns the most recently modified report.
    pub fn latest_report(&self) -> Result<Option<PathBuf>> {
        Ok(self.list_reports()?.into_iter().next())
    }

    /// Deletes every report beyond the `keep_last` most recent.
    ///
    /// The baseline is never deleted. Returns the removed paths.
    pub fn prune_reports(&self, keep_last: usize) -> Result<Vec<PathBuf>> {
        let stale: Vec<PathBuf> = self.list_reports()?.into_iter().skip(keep_last).collect();

        for path in &stale {
            fs::remove_file(path).map_err(|e| PerfError::io_error(path, e))?;
        }
        if !stale.is_empty() {
            info!(removed = stale.len(), kept = keep_last, "pruned old reports");
        }
        Ok(stale)
    }

    /// Renders `report` as CSV.
    pub fn export_csv(&self, report: &PerformanceReport) -> Result<String> {
        to_csv(report)
    }

    /// Writes the CSV rendering of `report` next to the saved reports.
    pub fn write_csv(&self, report: &PerformanceReport) -> Result<PathBuf> {
        let csv = self.export_csv(report)?;
        self.ensure_dir()?;
        let path = self.root.join(format!("{}.csv", report_stem(report)));
        fs::write(&path, csv).map_err(|e| PerfError::io_error(&path, e))?;
        debug!(path = %path.display(), "wrote csv export");
        Ok(path)
    }

    /// Collects the statistics of `test_name` from every stored report,
    /// oldest first.
    pub fn history(&self, test_name: &str) -> Result<Vec<TrendPoint>> {
        let mut points = Vec::new();
        for path in self.list_reports()? {
            let Some(report) = self.load_report(&path)? else {
                continue;
            };
            if let Some(result) = report.get(test_name) {
                points.push(TrendPoint {
                    report: path,
                    timestamp: result.timestamp,
                    commit: result.commit.clone(),
                    stats: result.stats,
                });
            }
        }
        points.sort_by_key(|p| p.timestamp);
        Ok(points)
    }
}

/// Parses report JSON, tagging failures with the file they came from.
pub fn parse_report(path: &Path, contents: impl AsRef<[u8]>) -> Result<PerformanceReport> {
    serde_json::from_slice(contents.as_ref()).map_err(|e| PerfError::MalformedData {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Best-effort removal of a file left behind by a failed write.
fn discard_partial(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        if e.kind() != io::ErrorKind::NotFound {
            warn!(path = %path.display(), error = %e, "could not remove partial file");
        }
    }
}

fn is_report_file(path: &Path) -> bool {
    let is_json = path
        .extension()
        .map(|ext| ext == REPORT_EXTENSION)
        .unwrap_or(false);
    let is_baseline = path
        .file_name()
        .map(|name| name == BASELINE_FILE)
        .unwrap_or(false);
    is_json && !is_baseline
}

/// `<suite-slug>-<timestamp>`
fn report_stem(report: &PerformanceReport) -> String {
    format!(
        "{}-{}",
        slugify(&report.test_suite),
        report.timestamp.format(TIMESTAMP_FORMAT)
    )
}

fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        "report".to_string()
    } else {
        slug.to_string()
    }
}
