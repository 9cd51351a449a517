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

//! Error types for benchmarking, storage and comparison operations.
//!
//! Storage reads that hit a missing or corrupt file are recovered into
//! `None` by [`ResultStore`](crate::core::store::ResultStore); everything
//! else surfaces as a [`PerfError`] variant.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for perfguard operations
pub type Result<T> = std::result::Result<T, PerfError>;

/// Errors that can occur while measuring, storing or comparing benchmarks.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PerfError {
    /// Something required to run the command is missing or unusable.
    ///
    /// Carries a remediation hint that the CLI prints alongside the message.
    #[error("{message}")]
    Configuration {
        /// What is wrong
        message: String,
        /// Suggested corrective action
        remediation: String,
    },

    /// A persisted report could not be parsed.
    #[error("Malformed report '{path}': {message}")]
    MalformedData {
        /// File that failed to parse
        path: PathBuf,
        /// Parser message
        message: String,
    },

    /// Baseline and current report share no test names.
    #[error("No matching tests found between baseline '{baseline_suite}' and current '{current_suite}'")]
    NoMatch {
        /// Suite name of the baseline report
        baseline_suite: String,
        /// Suite name of the current report
        current_suite: String,
    },

    /// A caller passed data the computation cannot work with.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O operation on the results directory failed.
    #[error("I/O error for '{path}': {message}")]
    Io {
        /// Path involved in the failed operation
        path: PathBuf,
        /// The error message
        message: String,
    },

    /// Serializing a report or CSV document failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl PerfError {
    /// Create a configuration error with a remediation hint.
    pub fn configuration(message: impl Into<String>, remediation: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            remediation: remediation.into(),
        }
    }

    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create an I/O error with path context.
    pub fn io_error(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: source.to_string(),
        }
    }

    /// Returns the remediation hint, if this error carries one.
    pub fn remediation(&self) -> Option<&str> {
        match self {
            PerfError::Configuration { remediation, .. } => Some(remediation),
            PerfError::NoMatch { .. } => Some(
                "make sure the baseline was produced by the same benchmark suite, \
                 or promote a fresh report with `perfguard promote <REPORT>`",
            ),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for PerfError {
    fn from(err: serde_json::Error) -> Self {
        PerfError::Serialization(err.to_string())
    }
}

impl From<csv::Error> for PerfError {
    fn from(err: csv::Error) -> Self {
        PerfError::Serialization(err.to_string())
    }
}
