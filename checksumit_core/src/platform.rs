//! Host memory readings
//!
//! Supplies the memory limit and current usage the capacity planner works
//! from. On Linux usage is total memory minus `MemAvailable` from
//! `/proc/meminfo`, which counts reclaimable page cache as free; `sysconf` is
//! the fallback. Elsewhere a fixed budget with no usage is reported.

use crate::capacity::{MIB, MemorySource};
use log::trace;

/// Budget reported when the host cannot be queried (4 GiB)
pub const DEFAULT_MEMORY_LIMIT: u64 = 4096 * MIB;

/// Memory source backed by the operating system
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemMemory;

impl SystemMemory {
    /// Create a new system memory source
    pub fn new() -> Self {
        Self
    }

    #[cfg(any(target_os = "linux", target_os = "android"))]
    fn query() -> Option<(u64, u64)> {
        match std::fs::read_to_string("/proc/meminfo") {
            Ok(contents) => parse_meminfo(&contents).or_else(Self::query_sysconf),
            Err(e) => {
                trace!("/proc/meminfo unavailable: {e}");
                Self::query_sysconf()
            }
        }
    }

    #[cfg(any(target_os = "linux", target_os = "android"))]
    fn query_sysconf() -> Option<(u64, u64)> {
        // SAFETY: sysconf only reads process-independent system values
        let (total_pages, available_pages, page_size) = unsafe {
            (
                libc::sysconf(libc::_SC_PHYS_PAGES),
                libc::sysconf(libc::_SC_AVPHYS_PAGES),
                libc::sysconf(libc::_SC_PAGESIZE),
            )
        };

        if total_pages <= 0 || available_pages < 0 || page_size <= 0 {
            return None;
        }

        let page_size = page_size as u64;
        let total = (total_pages as u64).saturating_mul(page_size);
        let available = (available_pages as u64).saturating_mul(page_size);
        trace!("sysconf reports {total} bytes total, {available} bytes available");
        Some((total, total.saturating_sub(available)))
    }

    #[cfg(not(any(target_os = "linux", target_os = "android")))]
    fn query() -> Option<(u64, u64)> {
        None
    }
}

/// Total and used bytes from `/proc/meminfo` contents
///
/// Needs both `MemTotal` and `MemAvailable`; kernels before 3.14 lack the
/// latter.
#[cfg(any(target_os = "linux", target_os = "android", test))]
fn parse_meminfo(contents: &str) -> Option<(u64, u64)> {
    let field = |name: &str| -> Option<u64> {
        contents.lines().find_map(|line| {
            let rest = line.strip_prefix(name)?.strip_prefix(':')?;
            let kib: u64 = rest.trim().trim_end_matches("kB").trim().parse().ok()?;
            Some(kib.saturating_mul(1024))
        })
    };

    let total = field("MemTotal")?;
    let available = field("MemAvailable")?;
    if total == 0 {
        return None;
    }
    trace!("/proc/meminfo reports {total} bytes total, {available} bytes available");
    Some((total, total.saturating_sub(available)))
}

impl MemorySource for SystemMemory {
    fn limit(&self) -> u64 {
        Self::query()
            .map(|(total, _)| total)
            .unwrap_or(DEFAULT_MEMORY_LIMIT)
    }

    fn in_use(&self) -> u64 {
        Self::query().map(|(_, used)| used).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capacity::{CapacityBound, plan_from};

    #[test]
    fn test_system_memory_is_consistent() {
        let memory = SystemMemory::new();
        let limit = memory.limit();
        assert!(limit > 0);
        assert!(memory.in_use() <= limit);
    }

    #[test]
    fn test_meminfo_counts_page_cache_as_available() {
        let contents = "MemTotal:        8000000 kB\n\
                        MemFree:          500000 kB\n\
                        MemAvailable:    6000000 kB\n\
                        Buffers:          100000 kB\n\
                        Cached:          5000000 kB\n";

        let (total, used) = parse_meminfo(contents).unwrap();
        assert_eq!(total, 8_000_000 * 1024);
        assert_eq!(used, 2_000_000 * 1024);

        // Plenty of headroom once the cache is reclaimable
        assert_eq!(crate::capacity::plan_capacity(total, used), CapacityBound::MAX);
    }

    #[test]
    fn test_meminfo_without_available_is_rejected() {
        assert_eq!(parse_meminfo("MemTotal: 8000000 kB\nMemFree: 500000 kB\n"), None);
        assert_eq!(parse_meminfo("MemTotal: 0 kB\nMemAvailable: 0 kB\n"), None);
        assert_eq!(parse_meminfo(""), None);
    }

    #[test]
    fn test_meminfo_field_names_are_exact() {
        let contents = "MemTotalExtra: 1 kB\nMemTotal: 4096 kB\nMemAvailable: 1024 kB\n";
        assert_eq!(parse_meminfo(contents), Some((4096 * 1024, 3072 * 1024)));
    }

    #[test]
    fn test_system_plan_within_bounds() {
        let capacity = plan_from(&SystemMemory::new());
        assert!(capacity >= CapacityBound::MIN);
        assert!(capacity <= CapacityBound::MAX);
    }
}
