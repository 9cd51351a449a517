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

//! Core measurement infrastructure.
//!
//! Provides configuration, per-iteration sampling, statistical reduction and
//! the on-disk result store.
//!
//! # Modules
//!
//! - `config`: Centralized configuration
//! - `measurement`: Sampling of sync and async operations
//! - `statistics`: Reduction of samples to a summary
//! - `store`: Report and baseline persistence

pub mod config;
pub mod measurement;
pub mod statistics;
pub mod store;

// Re-export commonly used types
pub use config::{PerfConfig, DEFAULT_KEEP_LAST, DEFAULT_RESULTS_DIR};
pub use measurement::{MemoryProbe, MemorySnapshot, ProcStatmProbe, Sample, SampleBatch, Sampler};
pub use statistics::summarize;
pub use store::{ResultStore, TrendPoint, BASELINE_FILE};
