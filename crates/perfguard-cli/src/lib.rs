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

//! Perfguard CLI library for command-line parsing and execution.
//!
//! # Commands
//!
//! - **compare**: Compare a report against the baseline; exit 1 on regression
//! - **export-csv**: Render a report as CSV
//! - **list**: List stored reports and the baseline
//! - **prune**: Apply report retention
//! - **promote**: Make a report the baseline
//! - **history**: Show one test's trend across reports
//!
//! # Examples
//!
//! ```no_run
//! use perfguard::ResultStore;
//! use perfguard_cli::commands::compare;
//!
//! let store = ResultStore::new("perf-results");
//! compare(&store, &[], 0.10)?;
//! # Ok::<(), perfguard_cli::error::CliError>(())
//! ```

pub mod cli;
pub mod commands;
pub mod error;

pub use error::CliError;
