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

//! Promote command - make a report the baseline

use super::load_required;
use crate::error::CliError;
use colored::Colorize;
use perfguard::ResultStore;
use std::path::Path;

/// Replace the baseline with the report at `report`.
pub fn promote(store: &ResultStore, report: &Path) -> Result<(), CliError> {
    let loaded = load_required(store, report)?;
    let baseline = store.save_as_baseline(&loaded)?;
    println!(
        "{} Promoted '{}' ({} test(s)) to {}",
        "✓".green().bold(),
        loaded.test_suite,
        loaded.len(),
        baseline.display()
    );
    Ok(())
}
