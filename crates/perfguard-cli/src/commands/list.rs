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

//! List command - stored reports, newest first

use crate::error::CliError;
use colored::Colorize;
use perfguard::ResultStore;

/// List stored reports, most recently modified first.
pub fn list(store: &ResultStore) -> Result<(), CliError> {
    let reports = store.list_reports()?;

    match store.load_baseline()? {
        Some(baseline) => println!(
            "{} {} ({}, {} test(s))",
            "Baseline:".bold(),
            store.baseline_path().display(),
            baseline.test_suite,
            baseline.len()
        ),
        None => println!("{} none", "Baseline:".bold()),
    }

    if reports.is_empty() {
        println!("No reports in {}", store.root().display());
        return Ok(());
    }

    println!("{} {}", "Reports:".bold(), reports.len());
    for path in reports {
        match store.load_report(&path)? {
            Some(report) => println!(
                "  {}  {}  {} test(s)  {}",
                report.timestamp.format("%Y-%m-%d %H:%M:%S"),
                report.test_suite,
                report.len(),
                path.display()
            ),
            None => println!("  {}  {}", "unreadable".yellow(), path.display()),
        }
    }
    Ok(())
}
