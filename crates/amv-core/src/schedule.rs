//! Parallel-for over index ranges with an explicit scheduling policy.
//!
//! Every call is one parallel region: worker threads are scoped threads
//! spawned for the region and joined before the call returns, so writes made
//! by workers are visible to the caller afterwards.

use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use tracing::trace;

use crate::error::{KernelError, Result};

/// How a range of work items is split into units and handed to workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Schedule {
    /// One contiguous range per worker, fixed before execution.
    /// The first `len % workers` ranges get one extra item.
    Static,
    /// Fixed-size units of `chunk` items, claimed at runtime.
    Dynamic { chunk: usize },
    /// Units of `ceil(remaining / workers)` items, never below `min_chunk`,
    /// claimed at runtime.
    Guided { min_chunk: usize },
}

impl Schedule {
    pub fn validate(&self) -> Result<()> {
        match *self {
            Schedule::Dynamic { chunk: 0 } => Err(KernelError::InvalidConfig(
                "dynamic schedule chunk must be > 0".to_string(),
            )),
            Schedule::Guided { min_chunk: 0 } => Err(KernelError::InvalidConfig(
                "guided schedule min_chunk must be > 0".to_string(),
            )),
            _ => Ok(()),
        }
    }

    /// Split `[0, len)` into ordered, disjoint, non-empty units covering the
    /// whole range.
    pub fn partition(&self, len: usize, workers: usize) -> Vec<Range<usize>> {
        let workers = workers.max(1);
        let mut units = Vec::new();
        match *self {
            Schedule::Static => {
                let base = len / workers;
                let rem = len % workers;
                let mut start = 0;
                for k in 0..workers {
                    let size = base + usize::from(k < rem);
                    if size == 0 {
                        break;
                    }
                    units.push(start..start + size);
                    start += size;
                }
            }
            Schedule::Dynamic { chunk } => {
                let chunk = chunk.max(1);
                let mut start = 0;
                while start < len {
                    let end = (start + chunk).min(len);
                    units.push(start..end);
                    start = end;
                }
            }
            Schedule::Guided { min_chunk } => {
                let mut start = 0;
                while start < len {
                    let remaining = len - start;
                    let size = remaining
                        .div_ceil(workers)
                        .max(min_chunk.max(1))
                        .min(remaining);
                    units.push(start..start + size);
                    start += size;
                }
            }
        }
        units
    }
}

/// Run `f` over every unit of `[0, len)` using up to `workers` threads.
///
/// `f` receives each unit exactly once. With one worker or a single unit the
/// region runs inline on the calling thread.
pub fn parallel_for<F>(len: usize, workers: usize, schedule: Schedule, f: F)
where
    F: Fn(Range<usize>) + Sync,
{
    let units = schedule.partition(len, workers);
    let threads = workers.min(units.len());
    trace!(len, workers, units = units.len(), ?schedule, "parallel_for");

    if threads <= 1 {
        units.into_iter().for_each(f);
        return;
    }

    let f = &f;
    match schedule {
        Schedule::Static => {
            std::thread::scope(|s| {
                for unit in units {
                    s.spawn(move || f(unit));
                }
            });
        }
        Schedule::Dynamic { .. } | Schedule::Guided { .. } => {
            let cursor = AtomicUsize::new(0);
            let cursor = &cursor;
            let units = &units;
            std::thread::scope(|s| {
                for _ in 0..threads {
                    s.spawn(move || {
                        while let Some(unit) = units.get(cursor.fetch_add(1, Ordering::Relaxed)) {
                            f(unit.clone());
                        }
                    });
                }
            });
        }
    }
}

/// Like [`parallel_for`], but also hands each unit the matching disjoint
/// sub-slice of `data`, so workers can write without synchronization.
pub fn parallel_for_mut<T, F>(data: &mut [T], workers: usize, schedule: Schedule, f: F)
where
    T: Send,
    F: Fn(Range<usize>, &mut [T]) + Sync,
{
    let units = schedule.partition(data.len(), workers);
    let threads = workers.min(units.len());
    trace!(len = data.len(), workers, units = units.len(), ?schedule, "parallel_for_mut");

    let mut parts = Vec::with_capacity(units.len());
    let mut rest = data;
    for unit in units {
        let (head, tail) = std::mem::take(&mut rest).split_at_mut(unit.len());
        parts.push((unit, head));
        rest = tail;
    }

    if threads <= 1 {
        for (unit, chunk) in parts {
            f(unit, chunk);
        }
        return;
    }

    let f = &f;
    match schedule {
        Schedule::Static => {
            std::thread::scope(|s| {
                for (unit, chunk) in parts {
                    s.spawn(move || f(unit, chunk));
                }
            });
        }
        Schedule::Dynamic { .. } | Schedule::Guided { .. } => {
            let queue = Mutex::new(parts.into_iter());
            let queue = &queue;
            std::thread::scope(|s| {
                for _ in 0..threads {
                    s.spawn(move || loop {
                        let next = queue.lock().unwrap_or_else(|e| e.into_inner()).next();
                        match next {
                            Some((unit, chunk)) => f(unit, chunk),
                            None => break,
                        }
                    });
                }
            });
        }
    }
}
