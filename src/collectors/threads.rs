//! Live thread enumeration for `/threads`.
//!
//! # Responsibilities
//! - List every thread of the process at the instant of the call
//! - Report each thread's name and whatever stack is observable
//!
//! # Design Decisions
//! - Linux: walk `/proc/self/task`; names come from the kernel `comm`
//! - `comm` holds at most 15 bytes, so longer std thread names arrive truncated
//!   (`background-worker-1` → `background-work`)
//! - An unnamed thread inherits its creator's `comm`, so `name` is only null
//!   when `comm` is empty or unreadable, not whenever the thread is unnamed
//! - The calling thread gets a full symbolized backtrace
//! - Other threads get their kernel stack when the kernel lets us read it
//! - The listing races thread exit; a vanished thread yields nulls, not an error

use std::path::{Path, PathBuf};

use super::{CollectorError, ThreadInfo, ThreadInspector};

/// `ThreadInspector` backed by procfs.
#[derive(Debug, Clone)]
pub struct ProcThreadInspector {
    task_dir: PathBuf,
}

impl ProcThreadInspector {
    pub fn new() -> Self {
        Self::with_task_dir("/proc/self/task")
    }

    /// Inspect a different task directory (layout `<tid>/comm`, `<tid>/stack`).
    pub fn with_task_dir(task_dir: impl Into<PathBuf>) -> Self {
        Self {
            task_dir: task_dir.into(),
        }
    }

    fn inspect(&self, tid: u64, current_tid: Option<u64>) -> ThreadInfo {
        let dir = self.task_dir.join(tid.to_string());
        let name = read_name(&dir);

        let backtrace = if Some(tid) == current_tid {
            Some(capture_current())
        } else {
            read_kernel_stack(&dir)
        };

        ThreadInfo { name, backtrace }
    }
}

impl Default for ProcThreadInspector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_os = "linux")]
impl ThreadInspector for ProcThreadInspector {
    fn list_threads(&self) -> Result<Vec<ThreadInfo>, CollectorError> {
        let current = current_tid();

        let mut tids: Vec<u64> = std::fs::read_dir(&self.task_dir)?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().to_str()?.parse().ok())
            .collect();
        tids.sort_unstable();

        tracing::trace!(count = tids.len(), "Enumerated threads");

        Ok(tids
            .into_iter()
            .map(|tid| self.inspect(tid, current))
            .collect())
    }
}

#[cfg(not(target_os = "linux"))]
impl ThreadInspector for ProcThreadInspector {
    fn list_threads(&self) -> Result<Vec<ThreadInfo>, CollectorError> {
        // No portable way to enumerate foreign threads; report ourselves only.
        Ok(vec![ThreadInfo {
            name: std::thread::current().name().map(str::to_string),
            backtrace: Some(capture_current()),
        }])
    }
}

/// Kernel thread id of the calling thread, via `/proc/thread-self`.
fn current_tid() -> Option<u64> {
    let link = std::fs::read_link("/proc/thread-self").ok()?;
    link.file_name()?.to_str()?.parse().ok()
}

fn read_name(dir: &Path) -> Option<String> {
    let comm = std::fs::read_to_string(dir.join("comm")).ok()?;
    let name = comm.trim_end_matches('\n');
    (!name.is_empty()).then(|| name.to_string())
}

fn read_kernel_stack(dir: &Path) -> Option<Vec<String>> {
    let stack = std::fs::read_to_string(dir.join("stack")).ok()?;
    let frames: Vec<String> = stack
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect();
    (!frames.is_empty()).then_some(frames)
}

fn capture_current() -> Vec<String> {
    let backtrace = std::backtrace::Backtrace::force_capture();
    parse_backtrace(&backtrace.to_string())
}

/// Fold the `Display` form of a std backtrace into one descriptor per frame.
///
/// `   3: foo::bar` followed by `      at src/foo.rs:10:5` becomes
/// `foo::bar at src/foo.rs:10:5`.
pub fn parse_backtrace(rendered: &str) -> Vec<String> {
    let mut frames: Vec<String> = Vec::new();

    for line in rendered.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Some(location) = line.strip_prefix("at ") {
            if let Some(last) = frames.last_mut() {
                last.push_str(" at ");
                last.push_str(location);
            }
            continue;
        }

        let symbol = match line.split_once(": ") {
            Some((index, symbol)) if index.chars().all(|c| c.is_ascii_digit()) => symbol,
            _ => line,
        };
        frames.push(symbol.to_string());
    }

    frames
}
