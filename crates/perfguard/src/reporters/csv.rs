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

//! CSV export for performance reports.

use crate::error::{PerfError, Result};
use crate::report::PerformanceReport;
use chrono::SecondsFormat;

/// Header row of the CSV export.
pub const CSV_HEADER: [&str; 10] = [
    "Test Name",
    "Timestamp",
    "Mean (ms)",
    "Median (ms)",
    "Min (ms)",
    "Max (ms)",
    "P95 (ms)",
    "P99 (ms)",
    "Std Dev (ms)",
    "Iterations",
];

/// Decimal places used for statistics.
pub const CSV_PRECISION: usize = 2;

/// Formats `value` with `decimals` fractional digits.
///
/// Rounds half away from zero on the shortest decimal representation of the
/// value, so `1.005` becomes `1.01` even though the nearest binary double is
/// slightly below it.
///
/// # Errors
///
/// Returns [`PerfError::InvalidInput`] for NaN or infinite values.
///
/// # Example
///
/// ```
/// use perfguard::reporters::csv::format_fixed;
///
/// assert_eq!(format_fixed(1.005, 2).unwrap(), "1.01");
/// assert_eq!(format_fixed(2.5, 0).unwrap(), "3");
/// ```
pub fn format_fixed(value: f64, decimals: usize) -> Result<String> {
    if !value.is_finite() {
        return Err(PerfError::invalid_input(format!(
            "cannot format non-finite value {}",
            value
        )));
    }

    // Display for f64 is the shortest round-trip form and never uses exponents.
    let repr = format!("{}", value.abs());
    let (int_part, frac_part) = repr.split_once('.').unwrap_or((repr.as_str(), ""));

    let mut digits: Vec<u8> = int_part.bytes().map(|b| b - b'0').collect();
    let mut int_len = digits.len();
    let frac: Vec<u8> = frac_part.bytes().map(|b| b - b'0').collect();
    digits.extend((0..decimals).map(|i| frac.get(i).copied().unwrap_or(0)));

    if frac.get(decimals).is_some_and(|d| *d >= 5) {
        let mut i = digits.len();
        loop {
            if i == 0 {
                digits.insert(0, 1);
                int_len += 1;
                break;
            }
            i -= 1;
            if digits[i] == 9 {
                digits[i] = 0;
            } else {
                digits[i] += 1;
                break;
            }
        }
    }

    let mut out = String::with_capacity(digits.len() + 2);
    if value.is_sign_negative() && digits.iter().any(|d| *d != 0) {
        out.push('-');
    }
    out.extend(digits[..int_len].iter().map(|d| char::from(b'0' + d)));
    if decimals > 0 {
        out.push('.');
        out.extend(digits[int_len..].iter().map(|d| char::from(b'0' + d)));
    }
    Ok(out)
}

/// Renders a report as CSV: one header row, then one row per test result.
///
/// Fields containing commas, quotes or line breaks are quoted.
///
/// # Errors
///
/// Returns [`PerfError::InvalidInput`] when a statistic is not finite.
pub fn to_csv(report: &PerformanceReport) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADER)?;

    for result in &report.results {
        let mut record = Vec::with_capacity(CSV_HEADER.len());
        record.push(result.test_name.clone());
        record.push(result.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true));
        for value in result.stats.values() {
            let formatted = format_fixed(value, CSV_PRECISION).map_err(|_| {
                PerfError::invalid_input(format!(
                    "test '{}' has a non-finite statistic ({})",
                    result.test_name, value
                ))
            })?;
            record.push(formatted);
        }
        record.push(result.iterations.to_string());
        writer.write_record(&record)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| PerfError::Serialization(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| PerfError::Serialization(e.to_string()))
}
