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

//! Structured error types for the perfguard CLI.
//!
//! Every failure maps to exit status 1. [`CliError::remediation`] supplies
//! the follow-up command printed under the error message.

use perfguard::PerfError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for perfguard CLI operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CliError {
    /// A library operation failed.
    #[error(transparent)]
    Perf(#[from] PerfError),

    /// The command line was well-formed for clap but not for the command.
    #[error("Usage: {0}")]
    Usage(String),

    /// No baseline has been saved yet.
    #[error("No baseline found in '{}'", dir.display())]
    MissingBaseline {
        /// Results directory that was searched
        dir: PathBuf,
    },

    /// The results directory holds no reports.
    #[error("No reports found in '{}'", dir.display())]
    MissingReport {
        /// Results directory that was searched
        dir: PathBuf,
    },

    /// A report path does not exist or does not hold a report.
    #[error("Cannot read report '{}': file is missing or malformed", path.display())]
    UnreadableReport {
        /// The offending path
        path: PathBuf,
    },

    /// The comparison found regressions.
    #[error("{count} regression(s) detected")]
    RegressionsFound {
        /// Number of regressed tests
        count: usize,
    },

    /// Writing output failed.
    #[error("I/O error for '{}': {message}", path.display())]
    Io {
        /// The file path that caused the error
        path: PathBuf,
        /// The error message
        message: String,
    },
}

impl CliError {
    /// Create an I/O error with file path context.
    pub fn io_error(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: source.to_string(),
        }
    }

    /// Create a usage error.
    pub fn usage(msg: impl Into<String>) -> Self {
        Self::Usage(msg.into())
    }

    /// Suggested next step for the user, if there is one.
    pub fn remediation(&self) -> Option<String> {
        match self {
            CliError::Perf(err) => err.remediation().map(str::to_string),
            CliError::MissingBaseline { dir } => Some(format!(
                "create one with `perfguard --dir {} promote <REPORT>` or run the suite with PERFGUARD_SAVE_BASELINE=1",
                dir.display()
            )),
            CliError::MissingReport { dir } => Some(format!(
                "run the benchmark suite with PERFGUARD_RESULTS_DIR={} first",
                dir.display()
            )),
            CliError::Usage(_) => Some("see `perfguard --help`".to_string()),
            CliError::UnreadableReport { .. } => {
                Some("list readable reports with `perfguard list`".to_string())
            }
            CliError::RegressionsFound { .. } | CliError::Io { .. } => None,
        }
    }
}
