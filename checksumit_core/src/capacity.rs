//! Capacity planning for streaming reads
//!
//! The capacity bound is the largest chunk a single hashing operation may hold
//! in memory. Files no larger than the bound are read whole; larger files are
//! streamed through one reusable buffer of exactly that size.

use crate::platform::SystemMemory;
use log::debug;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One mebibyte
pub const MIB: u64 = 1024 * 1024;

/// Smallest capacity ever planned, so streaming always makes progress
pub const MIN_CAPACITY: u64 = MIB;

/// Largest capacity ever planned
pub const MAX_CAPACITY: u64 = 1024 * MIB;

/// Headroom at or above which the maximum capacity is granted outright
const FULL_CAPACITY_HEADROOM: u64 = 2048 * MIB;

/// Fixed reserve subtracted from half the headroom
const SAFETY_MARGIN: u64 = 10 * MIB;

static PROCESS_CAPACITY: OnceCell<CapacityBound> = OnceCell::new();

/// Source of the memory figures the planner works from
pub trait MemorySource: Send + Sync {
    /// Memory budget in bytes
    fn limit(&self) -> u64;

    /// Bytes of that budget already in use
    fn in_use(&self) -> u64;
}

/// Maximum chunk size for streaming reads, always within
/// [`MIN_CAPACITY`, `MAX_CAPACITY`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct CapacityBound(u64);

impl CapacityBound {
    /// Largest bound
    pub const MAX: CapacityBound = CapacityBound(MAX_CAPACITY);

    /// Smallest bound
    pub const MIN: CapacityBound = CapacityBound(MIN_CAPACITY);

    /// Build a bound from a byte count, clamped into the planner range
    pub fn clamped(bytes: u64) -> Self {
        Self(bytes.clamp(MIN_CAPACITY, MAX_CAPACITY))
    }

    /// Build a bound from a mebibyte count, clamped into the planner range
    pub fn from_mib(mib: u64) -> Self {
        Self::clamped(mib.saturating_mul(MIB))
    }

    /// Byte count of this bound
    pub fn bytes(self) -> u64 {
        self.0
    }

    /// Byte count usable as a buffer length
    pub fn as_usize(self) -> usize {
        usize::try_from(self.0).unwrap_or(usize::MAX)
    }

    /// Whether a file of `file_size` bytes fits in one buffer
    pub fn fits(self, file_size: u64) -> bool {
        file_size <= self.0
    }

    /// Capacity planned once per process from the host's memory figures
    pub fn process_wide() -> Self {
        *PROCESS_CAPACITY.get_or_init(|| plan_from(&SystemMemory::new()))
    }

    /// Capacity planned once per process from the given memory source
    ///
    /// Only the first caller's source is consulted; later calls return the
    /// cached bound.
    pub fn process_wide_with(memory: &dyn MemorySource) -> Self {
        *PROCESS_CAPACITY.get_or_init(|| plan_from(memory))
    }
}

impl TryFrom<u64> for CapacityBound {
    type Error = String;

    fn try_from(bytes: u64) -> std::result::Result<Self, Self::Error> {
        if (MIN_CAPACITY..=MAX_CAPACITY).contains(&bytes) {
            Ok(Self(bytes))
        } else {
            Err(format!(
                "capacity {bytes} outside {MIN_CAPACITY}..={MAX_CAPACITY} bytes"
            ))
        }
    }
}

impl From<CapacityBound> for u64 {
    fn from(bound: CapacityBound) -> Self {
        bound.0
    }
}

impl fmt::Display for CapacityBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % MIB == 0 {
            write!(f, "{} MiB", self.0 / MIB)
        } else {
            write!(f, "{} bytes", self.0)
        }
    }
}

/// Plan the streaming capacity from a memory limit and current usage
///
/// Half of the headroom is left for the rest of the process and a further
/// 10 MiB is held back. A limit below current usage is treated as zero
/// headroom.
pub fn plan_capacity(memory_limit: u64, memory_in_use: u64) -> CapacityBound {
    let headroom = memory_limit.saturating_sub(memory_in_use);
    if headroom >= FULL_CAPACITY_HEADROOM {
        return CapacityBound::MAX;
    }

    let candidate = (headroom / 2).saturating_sub(SAFETY_MARGIN);
    if candidate > MIN_CAPACITY {
        CapacityBound(candidate)
    } else {
        CapacityBound::MIN
    }
}

/// Plan the streaming capacity from a memory source
pub fn plan_from(memory: &dyn MemorySource) -> CapacityBound {
    let limit = memory.limit();
    let in_use = memory.in_use();
    let capacity = plan_capacity(limit, in_use);
    debug!("Planned capacity {capacity} (limit {limit} bytes, in use {in_use} bytes)");
    capacity
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedMemory {
        limit: u64,
        in_use: u64,
    }

    impl MemorySource for FixedMemory {
        fn limit(&self) -> u64 {
            self.limit
        }

        fn in_use(&self) -> u64 {
            self.in_use
        }
    }

    #[test]
    fn test_large_headroom_caps_at_one_gib() {
        assert_eq!(plan_capacity(4096 * MIB, 0).bytes(), 1024 * MIB);
        assert_eq!(plan_capacity(u64::MAX, 0), CapacityBound::MAX);
    }

    #[test]
    fn test_headroom_boundary_at_two_gib() {
        assert_eq!(plan_capacity(2048 * MIB, 0).bytes(), 1024 * MIB);
        // Just below the threshold the half-headroom rule applies
        assert_eq!(
            plan_capacity(2048 * MIB - 2, 0).bytes(),
            1024 * MIB - 1 - 10 * MIB
        );
    }

    #[test]
    fn test_half_headroom_minus_margin() {
        assert_eq!(plan_capacity(100 * MIB, 50 * MIB).bytes(), 15 * MIB);
        assert_eq!(plan_capacity(1024 * MIB, 0).bytes(), 502 * MIB);
    }

    #[test]
    fn test_floor_applies_to_small_headroom() {
        assert_eq!(plan_capacity(10 * MIB, 9 * MIB), CapacityBound::MIN);
        // 24 MiB headroom gives exactly 2 MiB, 22 MiB gives exactly the floor
        assert_eq!(plan_capacity(24 * MIB, 0).bytes(), 2 * MIB);
        assert_eq!(plan_capacity(22 * MIB, 0), CapacityBound::MIN);
    }

    #[test]
    fn test_usage_above_limit_does_not_underflow() {
        assert_eq!(plan_capacity(0, u64::MAX), CapacityBound::MIN);
        assert_eq!(plan_capacity(10 * MIB, 20 * MIB), CapacityBound::MIN);
    }

    #[test]
    fn test_plan_from_memory_source() {
        let memory = FixedMemory {
            limit: 100 * MIB,
            in_use: 50 * MIB,
        };
        assert_eq!(plan_from(&memory).bytes(), 15 * MIB);
    }

    #[test]
    fn test_clamped_construction() {
        assert_eq!(CapacityBound::clamped(0), CapacityBound::MIN);
        assert_eq!(CapacityBound::clamped(u64::MAX), CapacityBound::MAX);
        assert_eq!(CapacityBound::from_mib(64).bytes(), 64 * MIB);
        assert_eq!(CapacityBound::from_mib(u64::MAX), CapacityBound::MAX);
    }

    #[test]
    fn test_fits_is_inclusive() {
        let bound = CapacityBound::MIN;
        assert!(bound.fits(MIB));
        assert!(!bound.fits(MIB + 1));
        assert!(bound.fits(0));
    }

    #[test]
    fn test_display() {
        assert_eq!(CapacityBound::from_mib(15).to_string(), "15 MiB");
        assert_eq!(CapacityBound::clamped(MIB + 1).to_string(), "1048577 bytes");
    }

    #[test]
    fn test_try_from_rejects_out_of_range() {
        assert!(CapacityBound::try_from(0).is_err());
        assert!(CapacityBound::try_from(MAX_CAPACITY + 1).is_err());
        assert_eq!(CapacityBound::try_from(MIB).unwrap(), CapacityBound::MIN);
    }
}
