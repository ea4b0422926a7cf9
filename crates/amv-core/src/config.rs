use std::fmt;
use std::str::FromStr;

use crate::error::{KernelError, Result};
use crate::schedule::Schedule;

pub const DEFAULT_SEQUENTIAL_MAX: usize = 20;
pub const DEFAULT_FLAT_MAX: usize = 200;
pub const DEFAULT_TILE_EDGE: usize = 64;

pub const ENV_WORKERS: &str = "AMV_WORKERS";
pub const ENV_TILE_EDGE: &str = "AMV_TILE_EDGE";
pub const ENV_SEQUENTIAL_MAX: &str = "AMV_SEQUENTIAL_MAX";
pub const ENV_FLAT_MAX: &str = "AMV_FLAT_MAX";
pub const ENV_BLOCKED_REDUCTION: &str = "AMV_BLOCKED_REDUCTION";

/// How the blocked kernel merges per-tile partial sums into `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlockedReduction {
    /// Any worker may process any tile; partial sums are merged with an
    /// atomic fetch-add on `y[i]`.
    #[default]
    Atomic,
    /// Each row tile (with all of its column tiles) belongs to one worker,
    /// which accumulates privately and writes `y` without atomics.
    RowOwned,
}

impl fmt::Display for BlockedReduction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockedReduction::Atomic => write!(f, "atomic"),
            BlockedReduction::RowOwned => write!(f, "row-owned"),
        }
    }
}

impl FromStr for BlockedReduction {
    type Err = KernelError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "atomic" => Ok(BlockedReduction::Atomic),
            "row-owned" | "row_owned" | "rowowned" => Ok(BlockedReduction::RowOwned),
            other => Err(KernelError::InvalidConfig(format!(
                "unknown blocked reduction '{}'",
                other
            ))),
        }
    }
}

/// Tunables for the dispatcher and its kernels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelConfig {
    /// Largest `n` handled by the sequential kernel.
    pub sequential_max: usize,
    /// Largest `n` handled by the flat row-parallel kernel. Anything larger
    /// goes to the blocked kernel.
    pub flat_max: usize,
    /// Tile edge length for the blocked kernel.
    pub tile_edge: usize,
    /// Number of worker threads per parallel region.
    pub worker_count: usize,
    /// Row distribution policy of the flat kernel.
    pub flat_schedule: Schedule,
    /// Tile distribution policy of the blocked kernel.
    pub blocked_schedule: Schedule,
    pub reduction: BlockedReduction,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            sequential_max: DEFAULT_SEQUENTIAL_MAX,
            flat_max: DEFAULT_FLAT_MAX,
            tile_edge: DEFAULT_TILE_EDGE,
            worker_count: default_worker_count(),
            flat_schedule: Schedule::Static,
            blocked_schedule: Schedule::Dynamic { chunk: 1 },
            reduction: BlockedReduction::Atomic,
        }
    }
}

/// Available hardware parallelism, or 4 when it cannot be queried.
pub fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

impl KernelConfig {
    /// Defaults overridden by `AMV_*` environment variables.
    ///
    /// # Errors
    /// Returns `InvalidConfig` if a variable is set but does not parse, or
    /// the resulting config fails [`KernelConfig::validate`].
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each `AMV_*` key.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(v) = parse_usize(&lookup, ENV_WORKERS)? {
            config.worker_count = v;
        }
        if let Some(v) = parse_usize(&lookup, ENV_TILE_EDGE)? {
            config.tile_edge = v;
        }
        if let Some(v) = parse_usize(&lookup, ENV_SEQUENTIAL_MAX)? {
            config.sequential_max = v;
        }
        if let Some(v) = parse_usize(&lookup, ENV_FLAT_MAX)? {
            config.flat_max = v;
        }
        if let Some(v) = lookup(ENV_BLOCKED_REDUCTION) {
            config.reduction = v.parse()?;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.worker_count == 0 {
            return Err(KernelError::InvalidConfig(
                "worker_count must be > 0".to_string(),
            ));
        }
        if self.tile_edge == 0 {
            return Err(KernelError::InvalidConfig(
                "tile_edge must be > 0".to_string(),
            ));
        }
        if self.sequential_max > self.flat_max {
            return Err(KernelError::InvalidConfig(format!(
                "sequential_max ({}) must not exceed flat_max ({})",
                self.sequential_max, self.flat_max
            )));
        }
        self.flat_schedule.validate()?;
        self.blocked_schedule.validate()?;
        Ok(())
    }

    pub fn with_worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    pub fn with_tile_edge(mut self, tile_edge: usize) -> Self {
        self.tile_edge = tile_edge;
        self
    }

    pub fn with_thresholds(mut self, sequential_max: usize, flat_max: usize) -> Self {
        self.sequential_max = sequential_max;
        self.flat_max = flat_max;
        self
    }

    pub fn with_flat_schedule(mut self, schedule: Schedule) -> Self {
        self.flat_schedule = schedule;
        self
    }

    pub fn with_blocked_schedule(mut self, schedule: Schedule) -> Self {
        self.blocked_schedule = schedule;
        self
    }

    pub fn with_reduction(mut self, reduction: BlockedReduction) -> Self {
        self.reduction = reduction;
        self
    }
}

fn parse_usize<F>(lookup: &F, key: &str) -> Result<Option<usize>>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw.trim().parse::<usize>().map(Some).map_err(|e| {
            KernelError::InvalidConfig(format!("{}='{}': {}", key, raw, e))
        }),
    }
}
