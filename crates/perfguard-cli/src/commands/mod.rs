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

//! CLI command implementations

mod compare;
mod export;
mod history;
mod list;
mod promote;
mod prune;

pub use compare::compare;
pub use export::export_csv;
pub use history::history;
pub use list::list;
pub use promote::promote;
pub use prune::prune;

use crate::error::CliError;
use perfguard::{PerformanceReport, ResultStore};
use std::path::{Path, PathBuf};

/// Load a report that must exist and parse.
fn load_required(store: &ResultStore, path: &Path) -> Result<PerformanceReport, CliError> {
    store
        .load_report(path)?
        .ok_or_else(|| CliError::UnreadableReport {
            path: path.to_path_buf(),
        })
}

/// Path of the most recent report, or an error naming the directory.
fn latest_report(store: &ResultStore) -> Result<PathBuf, CliError> {
    store
        .latest_report()?
        .ok_or_else(|| CliError::MissingReport {
            dir: store.root().to_path_buf(),
        })
}
