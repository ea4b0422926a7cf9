use amv_core::{BlockedReduction, KernelConfig, KernelError, Schedule, Strategy};

/// Status codes returned by all FFI functions.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmvStatus {
    Ok = 0,
    ErrorInvalidArgument = 1,
    ErrorInvalidSize = 2,
    ErrorOutOfMemory = 3,
    ErrorInvalidConfig = 4,
    ErrorInternal = 5,
}

impl From<&KernelError> for AmvStatus {
    fn from(e: &KernelError) -> Self {
        match e {
            KernelError::InvalidSize { .. } => AmvStatus::ErrorInvalidSize,
            KernelError::AllocationFailure { .. } => AmvStatus::ErrorOutOfMemory,
            KernelError::DimensionMismatch { .. } => AmvStatus::ErrorInvalidArgument,
            KernelError::InvalidConfig(_) => AmvStatus::ErrorInvalidConfig,
        }
    }
}

/// Strategy that executed a multiply.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmvStrategy {
    Sequential = 0,
    FlatParallel = 1,
    BlockedParallel = 2,
}

impl From<Strategy> for AmvStrategy {
    fn from(s: Strategy) -> Self {
        match s {
            Strategy::Sequential => AmvStrategy::Sequential,
            Strategy::FlatParallel => AmvStrategy::FlatParallel,
            Strategy::BlockedParallel => AmvStrategy::BlockedParallel,
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmvScheduleKind {
    Static = 0,
    Dynamic = 1,
    Guided = 2,
}

/// Scheduling policy. `chunk` is the dynamic chunk size or the guided
/// minimum chunk; it is ignored for `Static`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmvSchedule {
    pub kind: AmvScheduleKind,
    pub chunk: usize,
}

impl From<Schedule> for AmvSchedule {
    fn from(s: Schedule) -> Self {
        match s {
            Schedule::Static => AmvSchedule {
                kind: AmvScheduleKind::Static,
                chunk: 0,
            },
            Schedule::Dynamic { chunk } => AmvSchedule {
                kind: AmvScheduleKind::Dynamic,
                chunk,
            },
            Schedule::Guided { min_chunk } => AmvSchedule {
                kind: AmvScheduleKind::Guided,
                chunk: min_chunk,
            },
        }
    }
}

impl From<AmvSchedule> for Schedule {
    fn from(s: AmvSchedule) -> Self {
        match s.kind {
            AmvScheduleKind::Static => Schedule::Static,
            AmvScheduleKind::Dynamic => Schedule::Dynamic { chunk: s.chunk },
            AmvScheduleKind::Guided => Schedule::Guided { min_chunk: s.chunk },
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmvReduction {
    Atomic = 0,
    RowOwned = 1,
}

/// Kernel configuration as seen from C. Obtain defaults with
/// `amv_config_default` and adjust fields before creating a context.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmvConfig {
    pub sequential_max: usize,
    pub flat_max: usize,
    pub tile_edge: usize,
    pub worker_count: usize,
    pub flat_schedule: AmvSchedule,
    pub blocked_schedule: AmvSchedule,
    pub reduction: AmvReduction,
}

impl From<&KernelConfig> for AmvConfig {
    fn from(c: &KernelConfig) -> Self {
        AmvConfig {
            sequential_max: c.sequential_max,
            flat_max: c.flat_max,
            tile_edge: c.tile_edge,
            worker_count: c.worker_count,
            flat_schedule: c.flat_schedule.into(),
            blocked_schedule: c.blocked_schedule.into(),
            reduction: match c.reduction {
                BlockedReduction::Atomic => AmvReduction::Atomic,
                BlockedReduction::RowOwned => AmvReduction::RowOwned,
            },
        }
    }
}

impl From<&AmvConfig> for KernelConfig {
    fn from(c: &AmvConfig) -> Self {
        KernelConfig {
            sequential_max: c.sequential_max,
            flat_max: c.flat_max,
            tile_edge: c.tile_edge,
            worker_count: c.worker_count,
            flat_schedule: c.flat_schedule.into(),
            blocked_schedule: c.blocked_schedule.into(),
            reduction: match c.reduction {
                AmvReduction::Atomic => BlockedReduction::Atomic,
                AmvReduction::RowOwned => BlockedReduction::RowOwned,
            },
        }
    }
}
