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

//! Centralized configuration.
//!
//! Holds the results directory, comparison threshold, report retention and
//! the toggles consumed by [`BenchmarkSuite`](crate::harness::runner::BenchmarkSuite).
//! Values come from builder methods or from `PERFGUARD_*` environment
//! variables.

use crate::error::{PerfError, Result};
use crate::harness::comparator::{validate_threshold, DEFAULT_REGRESSION_THRESHOLD};
use std::path::PathBuf;

/// Default directory for persisted reports.
pub const DEFAULT_RESULTS_DIR: &str = "perf-results";

/// Default number of reports retained after pruning.
pub const DEFAULT_KEEP_LAST: usize = 10;

/// Environment variable names.
pub mod env_vars {
    /// Results directory.
    pub const RESULTS_DIR: &str = "PERFGUARD_RESULTS_DIR";
    /// Regression threshold as a fraction (`0.10` = 10%).
    pub const THRESHOLD: &str = "PERFGUARD_THRESHOLD";
    /// Reports to keep when pruning; `0` disables pruning.
    pub const KEEP_LAST: &str = "PERFGUARD_KEEP_LAST";
    /// Leading iterations discarded by the suite runner.
    pub const WARMUP: &str = "PERFGUARD_WARMUP";
    /// Record memory deltas.
    pub const TRACK_MEMORY: &str = "PERFGUARD_TRACK_MEMORY";
    /// Also save the produced report as the new baseline.
    pub const SAVE_BASELINE: &str = "PERFGUARD_SAVE_BASELINE";
    /// Compare the produced report against the baseline.
    pub const COMPARE: &str = "PERFGUARD_COMPARE";
    /// Commit recorded on every result.
    pub const COMMIT: &str = "PERFGUARD_COMMIT";
    /// Branch recorded on every result.
    pub const BRANCH: &str = "PERFGUARD_BRANCH";
}

/// Configuration shared by the suite runner and the CLI.
///
/// # Example
///
/// ```
/// use perfguard::core::config::PerfConfig;
///
/// let config = PerfConfig::default()
///     .with_results_dir("target/perf")
///     .with_threshold(0.15)
///     .with_save_baseline(true);
/// assert_eq!(config.regression_threshold, 0.15);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PerfConfig {
    /// Directory holding reports and the baseline.
    pub results_dir: PathBuf,
    /// Symmetric regression/improvement threshold (fraction).
    pub regression_threshold: f64,
    /// Reports retained after a run; `None` keeps everything.
    pub keep_last: Option<usize>,
    /// Leading iterations discarded per benchmark.
    pub warmup: usize,
    /// Whether memory deltas are recorded.
    pub track_memory: bool,
    /// Whether a finished run becomes the new baseline.
    pub save_baseline: bool,
    /// Whether a finished run is compared against the baseline.
    pub compare: bool,
    /// Commit provenance.
    pub commit: Option<String>,
    /// Branch provenance.
    pub branch: Option<String>,
}

impl Default for PerfConfig {
    fn default() -> Self {
        Self {
            results_dir: PathBuf::from(DEFAULT_RESULTS_DIR),
            regression_threshold: DEFAULT_REGRESSION_THRESHOLD,
            keep_last: Some(DEFAULT_KEEP_LAST),
            warmup: 0,
            track_memory: false,
            save_baseline: false,
            compare: false,
            commit: None,
            branch: None,
        }
    }
}

impl PerfConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, falling back to defaults.
    ///
    /// # Errors
    ///
    /// Returns [`PerfError::Configuration`] when a variable is set to a
    /// value that cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let mut config = Self::default();

        if let Some(dir) = get(env_vars::RESULTS_DIR) {
            config.results_dir = PathBuf::from(dir);
        }
        if let Some(raw) = get(env_vars::THRESHOLD) {
            let threshold = raw
                .parse::<f64>()
                .map_err(|_| invalid_var(env_vars::THRESHOLD, &raw, "a fraction such as 0.10"))?;
            validate_threshold(threshold)
                .map_err(|_| invalid_var(env_vars::THRESHOLD, &raw, "a positive fraction"))?;
            config.regression_threshold = threshold;
        }
        if let Some(raw) = get(env_vars::KEEP_LAST) {
            let keep = parse_count(env_vars::KEEP_LAST, &raw)?;
            config.keep_last = (keep > 0).then_some(keep);
        }
        if let Some(raw) = get(env_vars::WARMUP) {
            config.warmup = parse_count(env_vars::WARMUP, &raw)?;
        }
        if let Some(raw) = get(env_vars::TRACK_MEMORY) {
            config.track_memory = parse_flag(env_vars::TRACK_MEMORY, &raw)?;
        }
        if let Some(raw) = get(env_vars::SAVE_BASELINE) {
            config.save_baseline = parse_flag(env_vars::SAVE_BASELINE, &raw)?;
        }
        if let Some(raw) = get(env_vars::COMPARE) {
            config.compare = parse_flag(env_vars::COMPARE, &raw)?;
        }
        config.commit = get(env_vars::COMMIT);
        config.branch = get(env_vars::BRANCH);

        Ok(config)
    }

    /// Sets the results directory.
    pub fn with_results_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.results_dir = dir.into();
        self
    }

    /// Sets the regression threshold.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.regression_threshold = threshold;
        self
    }

    /// Sets report retention; `None` disables pruning.
    pub fn with_keep_last(mut self, keep_last: Option<usize>) -> Self {
        self.keep_last = keep_last;
        self
    }

    /// Sets the number of discarded warm-up iterations.
    pub fn with_warmup(mut self, warmup: usize) -> Self {
        self.warmup = warmup;
        self
    }

    /// Enables or disables memory tracking.
    pub fn with_track_memory(mut self, enabled: bool) -> Self {
        self.track_memory = enabled;
        self
    }

    /// Enables or disables saving the run as the baseline.
    pub fn with_save_baseline(mut self, enabled: bool) -> Self {
        self.save_baseline = enabled;
        self
    }

    /// Enables or disables the automatic comparison.
    pub fn with_compare(mut self, enabled: bool) -> Self {
        self.compare = enabled;
        self
    }

    /// Sets commit and branch provenance.
    pub fn with_provenance(mut self, commit: Option<String>, branch: Option<String>) -> Self {
        self.commit = commit;
        self.branch = branch;
        self
    }
}

fn invalid_var(name: &str, value: &str, expected: &str) -> PerfError {
    PerfError::configuration(
        format!("{} has invalid value '{}'", name, value),
        format!("set {} to {} or unset it", name, expected),
    )
}

fn parse_count(name: &str, raw: &str) -> Result<usize> {
    raw.parse::<usize>()
        .map_err(|_| invalid_var(name, raw, "a non-negative integer"))
}

fn parse_flag(name: &str, raw: &str) -> Result<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid_var(name, raw, "true or false")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = PerfConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, PerfConfig::default());
        assert_eq!(config.results_dir, PathBuf::from(DEFAULT_RESULTS_DIR));
        assert_eq!(config.regression_threshold, 0.10);
        assert_eq!(config.keep_last, Some(DEFAULT_KEEP_LAST));
        assert!(!config.save_baseline);
        assert!(!config.compare);
    }

    #[test]
    fn test_toggles_from_environment() {
        let config = PerfConfig::from_lookup(lookup(&[
            (env_vars::RESULTS_DIR, "/tmp/perf"),
            (env_vars::THRESHOLD, "0.15"),
            (env_vars::KEEP_LAST, "3"),
            (env_vars::WARMUP, "5"),
            (env_vars::TRACK_MEMORY, "yes"),
            (env_vars::SAVE_BASELINE, "1"),
            (env_vars::COMPARE, "TRUE"),
            (env_vars::COMMIT, "abc123"),
            (env_vars::BRANCH, "main"),
        ]))
        .unwrap();

        assert_eq!(config.results_dir, PathBuf::from("/tmp/perf"));
        assert_eq!(config.regression_threshold, 0.15);
        assert_eq!(config.keep_last, Some(3));
        assert_eq!(config.warmup, 5);
        assert!(config.track_memory);
        assert!(config.save_baseline);
        assert!(config.compare);
        assert_eq!(config.commit.as_deref(), Some("abc123"));
        assert_eq!(config.branch.as_deref(), Some("main"));
    }

    #[test]
    fn test_keep_last_zero_disables_pruning() {
        let config = PerfConfig::from_lookup(lookup(&[(env_vars::KEEP_LAST, "0")])).unwrap();
        assert_eq!(config.keep_last, None);
    }

    #[test]
    fn test_blank_values_are_ignored() {
        let config = PerfConfig::from_lookup(lookup(&[
            (env_vars::COMMIT, "  "),
            (env_vars::SAVE_BASELINE, ""),
        ]))
        .unwrap();
        assert!(config.commit.is_none());
        assert!(!config.save_baseline);
    }

    #[test]
    fn test_invalid_values_are_configuration_errors() {
        for (key, value) in [
            (env_vars::THRESHOLD, "ten percent"),
            (env_vars::THRESHOLD, "-0.1"),
            (env_vars::THRESHOLD, "0"),
            (env_vars::KEEP_LAST, "-2"),
            (env_vars::COMPARE, "maybe"),
        ] {
            let err = PerfConfig::from_lookup(lookup(&[(key, value)])).unwrap_err();
            match err {
                PerfError::Configuration {
                    message,
                    remediation,
                } => {
                    assert!(message.contains(key));
                    assert!(remediation.contains(key));
                }
                other => panic!("Expected Configuration error, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_builder() {
        let config = PerfConfig::default()
            .with_results_dir("custom")
            .with_threshold(0.2)
            .with_keep_last(None)
            .with_warmup(3)
            .with_track_memory(true)
            .with_compare(true)
            .with_provenance(Some("deadbeef".into()), None);
        assert_eq!(config.results_dir, PathBuf::from("custom"));
        assert_eq!(config.regression_threshold, 0.2);
        assert_eq!(config.keep_last, None);
        assert_eq!(config.warmup, 3);
        assert!(config.track_memory);
        assert!(config.compare);
        assert_eq!(config.commit.as_deref(), Some("deadbeef"));
    }
}
