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

//! Compare command - regression check against a baseline

use super::{latest_report, load_required};
use crate::error::CliError;
use colored::Colorize;
use perfguard::harness::comparator::validate_threshold;
use perfguard::{compare_strict, format_summary, ResultStore};
use std::path::PathBuf;

/// Compare a current report against a baseline.
///
/// With no paths, the most recent report in the store is compared against the
/// store's baseline. With two paths, the first is the baseline and the second
/// the current report.
///
/// # Errors
///
/// Returns `Err` if:
/// - The number of paths is neither zero nor two
/// - The baseline or a report is missing or malformed
/// - No test name appears in both reports
/// - At least one test regressed
pub fn compare(store: &ResultStore, paths: &[PathBuf], threshold: f64) -> Result<(), CliError> {
    validate_threshold(threshold)?;

    let (baseline, current) = match paths {
        [] => {
            let baseline = store.load_baseline()?.ok_or_else(|| CliError::MissingBaseline {
                dir: store.root().to_path_buf(),
            })?;
            let current_path = latest_report(store)?;
            (baseline, load_required(store, &current_path)?)
        }
        [baseline, current] => (load_required(store, baseline)?, load_required(store, current)?),
        other => {
            return Err(CliError::usage(format!(
                "compare takes either no paths or BASELINE and CURRENT, got {} path(s)",
                other.len()
            )))
        }
    };

    let comparison = compare_strict(&baseline, &current, threshold)?;
    print!("{}", format_summary(&comparison)?);

    let regressions = comparison.regressions().count();
    if regressions > 0 {
        println!(
            "{} {} regression(s) above {:.1}%",
            "✗".red().bold(),
            regressions,
            threshold * 100.0
        );
        for result in comparison.regressions() {
            println!(
                "  {} {:+.2}%",
                result.test_name.red(),
                result.mean_change_pct()
            );
        }
        return Err(CliError::RegressionsFound { count: regressions });
    }

    println!("{} No regressions", "✓".green().bold());
    Ok(())
}
