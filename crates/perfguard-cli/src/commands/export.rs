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

//! Export command - CSV rendering of a stored report

use super::{latest_report, load_required};
use crate::error::CliError;
use colored::Colorize;
use perfguard::ResultStore;
use std::fs;
use std::path::Path;

/// Export a report as CSV.
///
/// Uses the most recent report when `report` is `None`. Writes to `output`
/// when given, otherwise to stdout.
pub fn export_csv(
    store: &ResultStore,
    report: Option<&Path>,
    output: Option<&Path>,
) -> Result<(), CliError> {
    let path = match report {
        Some(path) => path.to_path_buf(),
        None => latest_report(store)?,
    };
    let report = load_required(store, &path)?;
    let csv = store.export_csv(&report)?;

    match output {
        Some(output) => {
            fs::write(output, csv).map_err(|e| CliError::io_error(output, e))?;
            eprintln!(
                "{} Exported {} result(s) to {}",
                "✓".green().bold(),
                report.len(),
                output.display()
            );
        }
        None => print!("{}", csv),
    }
    Ok(())
}
