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

//! History command - trend of one test across stored reports

use crate::error::CliError;
use perfguard::ResultStore;

/// Print the mean, p95 and p99 of `test_name` in every stored report,
/// oldest first.
pub fn history(store: &ResultStore, test_name: &str) -> Result<(), CliError> {
    let points = store.history(test_name)?;
    if points.is_empty() {
        println!("No history for '{}' in {}", test_name, store.root().display());
        return Ok(());
    }

    println!(
        "{:<24} {:>12} {:>12} {:>12}  commit",
        "timestamp", "mean (ms)", "p95 (ms)", "p99 (ms)"
    );
    for point in points {
        println!(
            "{:<24} {:>12.3} {:>12.3} {:>12.3}  {}",
            point.timestamp.format("%Y-%m-%dT%H:%M:%S%.3fZ"),
            point.stats.mean,
            point.stats.p95,
            point.stats.p99,
            point.commit.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}
