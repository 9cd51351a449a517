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

//! CLI command definitions and argument parsing.

use crate::commands;
use crate::error::CliError;
use clap::Subcommand;
use perfguard::core::config::env_vars;
use perfguard::{ResultStore, DEFAULT_REGRESSION_THRESHOLD};
use std::path::PathBuf;

/// Top-level CLI commands enum.
///
/// # Examples
///
/// ```no_run
/// use clap::Parser;
/// use perfguard_cli::cli::Commands;
///
/// #[derive(Parser)]
/// struct Cli {
///     #[command(subcommand)]
///     command: Commands,
/// }
/// ```
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compare a report against the baseline
    ///
    /// Without paths, compares the most recent report in the results
    /// directory against its baseline. With two paths, compares CURRENT
    /// against BASELINE. Exits with status 1 if any test regressed.
    Compare {
        /// Baseline and current report paths (both or neither)
        #[arg(value_name = "BASELINE CURRENT")]
        paths: Vec<PathBuf>,

        /// Regression threshold as a fraction (0.10 = 10%)
        #[arg(short, long, env = env_vars::THRESHOLD, default_value_t = DEFAULT_REGRESSION_THRESHOLD)]
        threshold: f64,
    },

    /// Export a report as CSV
    ExportCsv {
        /// Report to export (defaults to the most recent)
        #[arg(value_name = "REPORT")]
        report: Option<PathBuf>,

        /// Output file path (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List stored reports, newest first
    List,

    /// Delete all but the most recent reports
    Prune {
        /// Number of reports to keep
        #[arg(short, long)]
        keep: usize,
    },

    /// Make a report the new baseline
    Promote {
        /// Report to promote
        #[arg(value_name = "REPORT")]
        report: PathBuf,
    },

    /// Show one test's statistics across stored reports
    History {
        /// Test name
        #[arg(value_name = "TEST")]
        test: String,
    },
}

impl Commands {
    /// Execute the command against `store`.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the command fails or, for `compare`, if a
    /// regression was found.
    pub fn execute(self, store: &ResultStore) -> Result<(), CliError> {
        match self {
            Commands::Compare { paths, threshold } => commands::compare(store, &paths, threshold),
            Commands::ExportCsv { report, output } => {
                commands::export_csv(store, report.as_deref(), output.as_deref())
            }
            Commands::List => commands::list(store),
            Commands::Prune { keep } => commands::prune(store, keep),
            Commands::Promote { report } => commands::promote(store, &report),
            Commands::History { test } => commands::history(store, &test),
        }
    }
}
