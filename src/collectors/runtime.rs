//! Allocator and runtime counters for `/gc-stats`.
//!
//! # Responsibilities
//! - Count allocator traffic when `CountingAllocator` is the global allocator
//! - Read Tokio runtime gauges when called inside a runtime
//! - Read process memory and uptime through `sysinfo`
//!
//! # Design Decisions
//! - Counters are relaxed atomics; readers get an approximate snapshot
//! - Optional sources are omitted from the object rather than failing it

use std::alloc::{GlobalAlloc, Layout, System};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use sysinfo::Pid;

use super::{CollectorError, RuntimeStats};

static ALLOCATIONS: AtomicU64 = AtomicU64::new(0);
static DEALLOCATIONS: AtomicU64 = AtomicU64::new(0);
static REALLOCATIONS: AtomicU64 = AtomicU64::new(0);
static ALLOCATED_BYTES: AtomicU64 = AtomicU64::new(0);
static FREED_BYTES: AtomicU64 = AtomicU64::new(0);

/// Global allocator wrapper that counts allocator traffic.
///
/// ```ignore
/// #[global_allocator]
/// static ALLOC: telemetry_exporter::collectors::CountingAllocator =
///     telemetry_exporter::collectors::CountingAllocator;
/// ```
pub struct CountingAllocator;

unsafe impl GlobalAlloc for CountingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = System.alloc(layout);
        if !ptr.is_null() {
            ALLOCATIONS.fetch_add(1, Ordering::Relaxed);
            ALLOCATED_BYTES.fetch_add(layout.size() as u64, Ordering::Relaxed);
        }
        ptr
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        let ptr = System.alloc_zeroed(layout);
        if !ptr.is_null() {
            ALLOCATIONS.fetch_add(1, Ordering::Relaxed);
            ALLOCATED_BYTES.fetch_add(layout.size() as u64, Ordering::Relaxed);
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout);
        DEALLOCATIONS.fetch_add(1, Ordering::Relaxed);
        FREED_BYTES.fetch_add(layout.size() as u64, Ordering::Relaxed);
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let new_ptr = System.realloc(ptr, layout, new_size);
        if !new_ptr.is_null() {
            REALLOCATIONS.fetch_add(1, Ordering::Relaxed);
            // A realloc frees the old block and allocates the new one.
            FREED_BYTES.fetch_add(layout.size() as u64, Ordering::Relaxed);
            ALLOCATED_BYTES.fetch_add(new_size as u64, Ordering::Relaxed);
        }
        new_ptr
    }
}

/// Default `RuntimeStats` producer for a Rust process.
pub struct ProcessRuntimeStats {
    system: Mutex<sysinfo::System>,
    pid: Option<Pid>,
}

impl ProcessRuntimeStats {
    pub fn new() -> Self {
        let pid = match sysinfo::get_current_pid() {
            Ok(pid) => Some(pid),
            Err(e) => {
                tracing::warn!(error = e, "Process figures unavailable on this platform");
                None
            }
        };

        Self {
            system: Mutex::new(sysinfo::System::new()),
            pid,
        }
    }

    fn allocator_counters(stats: &mut BTreeMap<String, u64>) {
        let allocated = ALLOCATED_BYTES.load(Ordering::Relaxed);
        let freed = FREED_BYTES.load(Ordering::Relaxed);

        stats.insert("allocations".into(), ALLOCATIONS.load(Ordering::Relaxed));
        stats.insert("deallocations".into(), DEALLOCATIONS.load(Ordering::Relaxed));
        stats.insert("reallocations".into(), REALLOCATIONS.load(Ordering::Relaxed));
        stats.insert("allocated_bytes".into(), allocated);
        stats.insert("freed_bytes".into(), freed);
        stats.insert("live_bytes".into(), allocated.saturating_sub(freed));
    }

    fn tokio_counters(stats: &mut BTreeMap<String, u64>) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return;
        };
        let metrics = handle.metrics();

        stats.insert("tokio_workers".into(), metrics.num_workers() as u64);
        stats.insert("tokio_alive_tasks".into(), metrics.num_alive_tasks() as u64);
        stats.insert(
            "tokio_global_queue_depth".into(),
            metrics.global_queue_depth() as u64,
        );
    }

    fn process_counters(&self, stats: &mut BTreeMap<String, u64>) -> Result<(), CollectorError> {
        let Some(pid) = self.pid else {
            return Ok(());
        };

        let mut system = self
            .system
            .lock()
            .map_err(|_| CollectorError::Unavailable("process info lock poisoned".into()))?;

        if !system.refresh_process(pid) {
            tracing::debug!(pid = %pid, "Process refresh failed, skipping process figures");
            return Ok(());
        }
        let Some(process) = system.process(pid) else {
            return Ok(());
        };

        stats.insert("rss_bytes".into(), process.memory());
        stats.insert("virtual_bytes".into(), process.virtual_memory());
        stats.insert("uptime_seconds".into(), process.run_time());
        Ok(())
    }
}

impl Default for ProcessRuntimeStats {
    fn default() -> Self {
        Self::new()
    }
}

impl RuntimeStats for ProcessRuntimeStats {
    fn snapshot(&self) -> Result<BTreeMap<String, u64>, CollectorError> {
        let mut stats = BTreeMap::new();

        Self::allocator_counters(&mut stats);
        Self::tokio_counters(&mut stats);
        self.process_counters(&mut stats)?;

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_outside_runtime_has_no_tokio_keys() {
        let stats = ProcessRuntimeStats::new().snapshot().unwrap();

        assert!(stats.contains_key("allocations"));
        assert!(stats.contains_key("live_bytes"));
        assert!(!stats.contains_key("tokio_workers"));
    }

    #[cfg(any(target_os = "linux", target_os = "macos", target_os = "windows"))]
    #[test]
    fn test_snapshot_reports_process_figures() {
        let stats = ProcessRuntimeStats::new().snapshot().unwrap();

        assert!(stats["rss_bytes"] > 0);
        assert!(stats["virtual_bytes"] >= stats["rss_bytes"]);
        assert!(stats.contains_key("uptime_seconds"));
    }

    #[cfg(any(target_os = "linux", target_os = "macos", target_os = "windows"))]
    #[test]
    fn test_uptime_is_process_uptime() {
        // Two producers built at different times still agree on process age.
        let early = ProcessRuntimeStats::new();
        std::thread::sleep(std::time::Duration::from_millis(1100));
        let late = ProcessRuntimeStats::new();

        let a = early.snapshot().unwrap()["uptime_seconds"];
        let b = late.snapshot().unwrap()["uptime_seconds"];
        assert!(a.abs_diff(b) <= 1, "{} vs {}", a, b);
        assert!(b >= 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_snapshot_inside_runtime_reports_workers() {
        let stats = ProcessRuntimeStats::new().snapshot().unwrap();
        assert_eq!(stats.get("tokio_workers"), Some(&2));
    }
}
