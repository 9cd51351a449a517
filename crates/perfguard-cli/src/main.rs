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

//! Perfguard Command Line Interface

use clap::Parser;
use colored::Colorize;
use perfguard::core::config::{env_vars, DEFAULT_RESULTS_DIR};
use perfguard::ResultStore;
use perfguard_cli::cli::Commands;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "perfguard=warn,perfguard_cli=warn";

/// Perfguard - benchmark regression detection
///
/// Inspects the reports and baseline written by perfguard benchmark suites.
///
/// # Examples
///
/// ```bash
/// # Compare the latest report against the baseline
/// perfguard compare
///
/// # Compare two specific reports with a 5% threshold
/// perfguard compare old.json new.json --threshold 0.05
///
/// # Promote a report to baseline
/// perfguard --dir target/perf promote target/perf/parser-20250101T000000.000Z.json
/// ```
#[derive(Parser)]
#[command(name = "perfguard")]
#[command(author, version, about = "Perfguard - benchmark regression detection", long_about = None)]
struct Cli {
    /// Results directory holding reports and the baseline
    #[arg(long, global = true, env = env_vars::RESULTS_DIR, default_value = DEFAULT_RESULTS_DIR)]
    dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> ExitCode {
    // Logs go to stderr so stdout stays clean for CSV output
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::debug!(dir = %cli.dir.display(), command = ?cli.command, "starting");
    let store = ResultStore::new(cli.dir);

    match cli.command.execute(&store) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            if let Some(hint) = e.remediation() {
                eprintln!("  {} {}", "Hint:".yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}
