#[cfg(feature = "cli")]
use std::sync::Mutex;
use std::time::{Duration, Instant};
#[cfg(feature = "cli")]
use sysinfo::{Pid, ProcessesToUpdate, RefreshKind, System};

#[derive(Debug, Clone, serde::Serialize)]
pub struct ProcessStats {
    pub cpu_usage: f32,
    pub memory_mb: u64,
    pub uptime_seconds: u64,
}

/// Tracks process uptime and, with the `cli` feature, memory and CPU for `/health`.
#[cfg(feature = "cli")]
pub struct SystemMonitor {
    system: Mutex<System>,
    pid: Option<Pid>,
    start_time: Instant,
}

#[cfg(feature = "cli")]
impl SystemMonitor {
    pub fn new() -> Self {
        let system = System::new_with_specifics(RefreshKind::nothing());
        let pid = sysinfo::get_current_pid().ok();

        Self {
            system: Mutex::new(system),
            pid,
            start_time: Instant::now(),
        }
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn snapshot(&self) -> Option<ProcessStats> {
        let pid = self.pid?;
        let mut system = self.system.lock().ok()?;
        system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);

        let process = system.process(pid)?;

        Some(ProcessStats {
            cpu_usage: process.cpu_usage(),
            memory_mb: process.memory() / 1024 / 1024,
            uptime_seconds: self.uptime().as_secs(),
        })
    }

    pub fn log_stats(&self, phase: &str) {
        if let Some(stats) = self.snapshot() {
            tracing::info!(
                "{} - CPU: {:.1}%, Memory: {}MB, Uptime: {}s",
                phase,
                stats.cpu_usage,
                stats.memory_mb,
                stats.uptime_seconds
            );
        }
    }
}

#[cfg(not(feature = "cli"))]
pub struct SystemMonitor {
    start_time: Instant,
}

#[cfg(not(feature = "cli"))]
impl SystemMonitor {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
        }
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn snapshot(&self) -> Option<ProcessStats> {
        None
    }

    pub fn log_stats(&self, _phase: &str) {}
}

impl Default for SystemMonitor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uptime_is_monotonic() {
        let monitor = SystemMonitor::new();
        let first = monitor.uptime();
        assert!(monitor.uptime() >= first);
    }

    #[cfg(all(feature = "cli", target_os = "linux"))]
    #[test]
    fn test_snapshot_reports_own_process() {
        let monitor = SystemMonitor::new();
        let stats = monitor.snapshot().unwrap();
        assert!(stats.uptime_seconds < 60);

        assert!(monitor.snapshot().is_some());
    }
}
