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

//! Per-iteration sampling of an operation.
//!
//! The [`Sampler`] runs an operation a fixed number of times, strictly one
//! iteration after another, and records the wall-clock duration of each call.
//! When a [`MemoryProbe`] is installed it also records the memory delta around
//! every call. Nothing is discarded: callers that want a warm-up drop the
//! leading samples themselves (see [`SampleBatch::skip`]).
//!
//! Async operations are awaited to completion before the next iteration
//! starts. The sampler does not bring a runtime of its own.

use crate::core::statistics::summarize;
use crate::error::Result;
use crate::report::{MemoryDelta, StatisticalSummary};
use std::convert::Infallible;
use std::future::Future;
use std::num::NonZeroUsize;
use std::time::Instant;

/// One measured execution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Wall-clock duration in milliseconds.
    pub duration_ms: f64,
    /// Memory change across the call, if a probe is installed.
    pub memory_delta: Option<MemoryDelta>,
}

/// Point-in-time memory counters, in bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemorySnapshot {
    /// Heap bytes in use.
    pub heap_used: u64,
    /// Heap bytes reserved.
    pub heap_total: u64,
    /// Bytes held outside the heap.
    pub external: u64,
    /// Resident set size.
    pub rss: u64,
}

impl MemorySnapshot {
    /// Component-wise `self - before`.
    pub fn delta_since(&self, before: &MemorySnapshot) -> MemoryDelta {
        let diff = |after: u64, before: u64| after as i64 - before as i64;
        MemoryDelta {
            heap_used: diff(self.heap_used, before.heap_used),
            heap_total: diff(self.heap_total, before.heap_total),
            external: diff(self.external, before.external),
            rss: diff(self.rss, before.rss),
        }
    }
}

/// Source of memory counters supplied by the host.
pub trait MemoryProbe: Send + Sync {
    /// Reads the current counters.
    fn snapshot(&self) -> MemorySnapshot;
}

/// Reads process memory from `/proc/self/statm`.
///
/// Mapping: `data` pages as heap used, `size` as heap total, `shared` as
/// external, `resident` as rss. Pages are assumed to be 4 KiB. Platforms
/// without procfs report zeroes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcStatmProbe;

const PAGE_SIZE: u64 = 4096;

impl MemoryProbe for ProcStatmProbe {
    fn snapshot(&self) -> MemorySnapshot {
        #[cfg(target_os = "linux")]
        {
            if let Ok(contents) = std::fs::read_to_string("/proc/self/statm") {
                if let Some(snapshot) = parse_statm(&contents) {
                    return snapshot;
                }
            }
        }

        MemorySnapshot::default()
    }
}

/// Parses the seven page counts of a statm line.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_statm(contents: &str) -> Option<MemorySnapshot> {
    let pages: Vec<u64> = contents
        .split_whitespace()
        .map(|field| field.parse::<u64>().ok())
        .collect::<Option<Vec<_>>>()?;
    if pages.len() < 6 {
        return None;
    }

    Some(MemorySnapshot {
        heap_used: pages[5] * PAGE_SIZE,
        heap_total: pages[0] * PAGE_SIZE,
        external: pages[2] * PAGE_SIZE,
        rss: pages[1] * PAGE_SIZE,
    })
}

/// Outputs and samples of one sampler invocation, in iteration order.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBatch<T> {
    /// Return value of each iteration.
    pub outputs: Vec<T>,
    /// Measurement of each iteration.
    pub samples: Vec<Sample>,
}

impl<T> SampleBatch<T> {
    /// Returns the number of iterations recorded.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Durations in milliseconds, in iteration order.
    pub fn durations(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.duration_ms).collect()
    }

    /// Summarizes the recorded durations.
    pub fn summarize(&self) -> Result<StatisticalSummary> {
        summarize(&self.durations())
    }

    /// Sum of all memory deltas, or `None` when memory was not tracked.
    pub fn total_memory_delta(&self) -> Option<MemoryDelta> {
        let mut deltas = self.samples.iter().filter_map(|s| s.memory_delta).peekable();
        deltas.peek()?;
        let mut total = MemoryDelta::default();
        for delta in deltas {
            total.accumulate(&delta);
        }
        Some(total)
    }

    /// Drops the first `count` iterations.
    pub fn skip(mut self, count: usize) -> Self {
        let count = count.min(self.samples.len());
        self.outputs.drain(..count);
        self.samples.drain(..count);
        self
    }
}

struct Mark {
    started: Instant,
    memory: Option<MemorySnapshot>,
}

/// Times an operation over a fixed number of sequential iterations.
///
/// # Example
///
/// ```
/// use perfguard::core::measurement::Sampler;
/// use std::num::NonZeroUsize;
///
/// let sampler = Sampler::new();
/// let batch = sampler.run(NonZeroUsize::new(5).unwrap(), || 2 + 2);
/// assert_eq!(batch.outputs, vec![4; 5]);
/// assert_eq!(batch.samples.len(), 5);
/// ```
#[derive(Default)]
pub struct Sampler {
    probe: Option<Box<dyn MemoryProbe>>,
}

impl Sampler {
    /// Creates a sampler that records durations only.
    pub fn new() -> Self {
        Self { probe: None }
    }

    /// Creates a sampler that also records memory through `probe`.
    pub fn with_memory_probe(probe: impl MemoryProbe + 'static) -> Self {
        Self {
            probe: Some(Box::new(probe)),
        }
    }

    /// Creates a sampler using the process memory counters.
    pub fn with_process_memory() -> Self {
        Self::with_memory_probe(ProcStatmProbe)
    }

    /// Returns whether memory deltas are recorded.
    pub fn tracks_memory(&self) -> bool {
        self.probe.is_some()
    }

    fn mark(&self) -> Mark {
        let memory = self.probe.as_ref().map(|p| p.snapshot());
        Mark {
            started: Instant::now(),
            memory,
        }
    }

    fn sample_since(&self, mark: Mark) -> Sample {
        let duration_ms = mark.started.elapsed().as_secs_f64() * 1000.0;
        let memory_delta = match (&self.probe, mark.memory) {
            (Some(probe), Some(before)) => Some(probe.snapshot().delta_since(&before)),
            _ => None,
        };
        Sample {
            duration_ms,
            memory_delta,
        }
    }

    /// Runs a synchronous operation `iterations` times.
    pub fn run<T, F>(&self, iterations: NonZeroUsize, mut operation: F) -> SampleBatch<T>
    where
        F: FnMut() -> T,
    {
        match self.try_run(iterations, || Ok::<T, Infallible>(operation())) {
            Ok(batch) => batch,
            Err(never) => match never {},
        }
    }

    /// Runs a fallible synchronous operation `iterations` times.
    ///
    /// The first error aborts the batch and is returned unchanged.
    pub fn try_run<T, E, F>(
        &self,
        iterations: NonZeroUsize,
        mut operation: F,
    ) -> std::result::Result<SampleBatch<T>, E>
    where
        F: FnMut() -> std::result::Result<T, E>,
    {
        let mut outputs = Vec::with_capacity(iterations.get());
        let mut samples = Vec::with_capacity(iterations.get());

        for _ in 0..iterations.get() {
            let mark = self.mark();
            let output = operation()?;
            samples.push(self.sample_since(mark));
            outputs.push(output);
        }

        Ok(SampleBatch { outputs, samples })
    }

    /// Runs an async operation `iterations` times, awaiting each call in turn.
    pub async fn run_async<T, F, Fut>(&self, iterations: NonZeroUsize, mut operation: F) -> SampleBatch<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = T>,
    {
        let result = self
            .try_run_async(iterations, || {
                let fut = operation();
                async move { Ok::<T, Infallible>(fut.await) }
            })
            .await;
        match result {
            Ok(batch) => batch,
            Err(never) => match never {},
        }
    }

    /// Runs a fallible async operation `iterations` times.
    ///
    /// The first error aborts the batch and is returned unchanged.
    pub async fn try_run_async<T, E, F, Fut>(
        &self,
        iterations: NonZeroUsize,
        mut operation: F,
    ) -> std::result::Result<SampleBatch<T>, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        let mut outputs = Vec::with_capacity(iterations.get());
        let mut samples = Vec::with_capacity(iterations.get());

        for _ in 0..iterations.get() {
            let mark = self.mark();
            let output = operation().await?;
            samples.push(self.sample_since(mark));
            outputs.push(output);
        }

        Ok(SampleBatch { outputs, samples })
    }
}

impl std::fmt::Debug for Sampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sampler")
            .field("tracks_memory", &self.tracks_memory())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::thread;
    use std::time::Duration;

    fn iters(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    /// Each snapshot grows every counter by 100 bytes.
    struct SteppingProbe(AtomicU64);

    impl MemoryProbe for SteppingProbe {
        fn snapshot(&self) -> MemorySnapshot {
            let v = self.0.fetch_add(100, Ordering::SeqCst);
            MemorySnapshot {
                heap_used: v,
                heap_total: v,
                external: v,
                rss: v,
            }
        }
    }

    #[test]
    fn test_run_preserves_outputs_in_order() {
        let mut counter = 0;
        let batch = Sampler::new().run(iters(5), || {
            counter += 1;
            counter
        });
        assert_eq!(batch.outputs, vec![1, 2, 3, 4, 5]);
        assert_eq!(batch.len(), 5);
        assert!(batch.samples.iter().all(|s| s.memory_delta.is_none()));
    }

    #[test]
    fn test_run_measures_duration() {
        let batch = Sampler::new().run(iters(3), || thread::sleep(Duration::from_millis(2)));
        assert!(batch.durations().iter().all(|d| *d >= 2.0));
    }

    #[test]
    fn test_try_run_aborts_on_first_error() {
        let mut calls = 0;
        let result = Sampler::new().try_run(iters(10), || {
            calls += 1;
            if calls == 3 {
                Err("boom")
            } else {
                Ok(calls)
            }
        });
        assert_eq!(result.unwrap_err(), "boom");
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_memory_probe_deltas() {
        let sampler = Sampler::with_memory_probe(SteppingProbe(AtomicU64::new(0)));
        assert!(sampler.tracks_memory());

        let batch = sampler.run(iters(4), || ());
        for sample in &batch.samples {
            assert_eq!(
                sample.memory_delta,
                Some(MemoryDelta {
                    heap_used: 100,
                    heap_total: 100,
                    external: 100,
                    rss: 100
                })
            );
        }
        assert_eq!(batch.total_memory_delta().map(|d| d.rss), Some(400));
    }

    #[test]
    fn test_total_memory_delta_without_probe() {
        let batch = Sampler::new().run(iters(2), || ());
        assert!(batch.total_memory_delta().is_none());
    }

    #[test]
    fn test_skip_drops_leading_iterations() {
        let mut n = 0;
        let batch = Sampler::new()
            .run(iters(5), || {
                n += 1;
                n
            })
            .skip(2);
        assert_eq!(batch.outputs, vec![3, 4, 5]);
        assert_eq!(batch.samples.len(), 3);

        let empty = Sampler::new().run(iters(1), || ()).skip(4);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_batch_summarize() {
        let batch = SampleBatch {
            outputs: vec![(), ()],
            samples: vec![
                Sample {
                    duration_ms: 1.0,
                    memory_delta: None,
                },
                Sample {
                    duration_ms: 3.0,
                    memory_delta: None,
                },
            ],
        };
        let stats = batch.summarize().unwrap();
        assert_eq!(stats.mean, 2.0);
        assert_eq!(stats.max, 3.0);
    }

    #[test]
    fn test_parse_statm() {
        let snapshot = parse_statm("1000 200 50 10 0 300 0\n").unwrap();
        assert_eq!(snapshot.heap_total, 1000 * PAGE_SIZE);
        assert_eq!(snapshot.rss, 200 * PAGE_SIZE);
        assert_eq!(snapshot.external, 50 * PAGE_SIZE);
        assert_eq!(snapshot.heap_used, 300 * PAGE_SIZE);

        assert!(parse_statm("garbage").is_none());
        assert!(parse_statm("1 2 3").is_none());
    }

    #[test]
    fn test_delta_since_can_be_negative() {
        let before = MemorySnapshot {
            heap_used: 500,
            ..MemorySnapshot::default()
        };
        let after = MemorySnapshot::default();
        assert_eq!(after.delta_since(&before).heap_used, -500);
    }

    #[tokio::test]
    async fn test_run_async_awaits_each_iteration() {
        use std::cell::Cell;
        let in_flight = Cell::new(0);
        let max_in_flight = Cell::new(0);
        let mut n = 0;

        let batch = Sampler::new()
            .run_async(iters(4), || {
                n += 1;
                let id = n;
                let in_flight = &in_flight;
                let max_in_flight = &max_in_flight;
                async move {
                    in_flight.set(in_flight.get() + 1);
                    max_in_flight.set(max_in_flight.get().max(in_flight.get()));
                    tokio::time::sleep(Duration::from_millis(1)).await;
                    in_flight.set(in_flight.get() - 1);
                    id
                }
            })
            .await;

        assert_eq!(batch.outputs, vec![1, 2, 3, 4]);
        assert_eq!(max_in_flight.get(), 1);
        assert!(batch.durations().iter().all(|d| *d >= 1.0));
    }

    #[tokio::test]
    async fn test_try_run_async_propagates_error() {
        let mut n = 0;
        let result = Sampler::new()
            .try_run_async(iters(5), || {
                n += 1;
                let id = n;
                async move {
                    if id == 2 {
                        Err(format!("iteration {} failed", id))
                    } else {
                        Ok(id)
                    }
                }
            })
            .await;
        assert_eq!(result.unwrap_err(), "iteration 2 failed");
        assert_eq!(n, 2);
    }
}
