//! CPU and memory usage from procfs.
//!
//! CPU usage needs two samples of `/proc/stat`; the manager takes one per
//! status-bar tick, so the figure covers roughly the last second.

use std::path::Path;

const PROC_STAT: &str = "/proc/stat";
const PROC_MEMINFO: &str = "/proc/meminfo";

/// Aggregate CPU jiffies: (idle, total).
pub fn parse_cpu_times(stat: &str) -> Option<(u64, u64)> {
    let line = stat.lines().find(|l| l.starts_with("cpu "))?;
    let fields: Vec<u64> = line
        .split_whitespace()
        .skip(1)
        .filter_map(|f| f.parse().ok())
        .collect();
    if fields.len() < 4 {
        return None;
    }
    // idle + iowait
    let idle = fields[3] + fields.get(4).copied().unwrap_or(0);
    let total = fields.iter().sum();
    Some((idle, total))
}

/// Used memory as a percentage of total.
pub fn parse_memory_percent(meminfo: &str) -> Option<f32> {
    let field = |name: &str| -> Option<u64> {
        meminfo
            .lines()
            .find(|l| l.starts_with(name))?
            .split_whitespace()
            .nth(1)?
            .parse()
            .ok()
    };
    let total = field("MemTotal:")?;
    let available = field("MemAvailable:")?;
    if total == 0 {
        return None;
    }
    Some((total.saturating_sub(available)) as f32 * 100.0 / total as f32)
}

#[derive(Debug, Default)]
pub struct SystemSampler {
    last_cpu: Option<(u64, u64)>,
    cpu_percent: Option<f32>,
    memory_percent: Option<f32>,
}

impl SystemSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a fresh sample. Files that can't be read leave the figure unknown.
    pub fn sample(&mut self) {
        let stat = read(PROC_STAT);
        self.record_cpu(stat.as_deref().and_then(parse_cpu_times));
        self.memory_percent = read(PROC_MEMINFO).as_deref().and_then(parse_memory_percent);
    }

    fn record_cpu(&mut self, times: Option<(u64, u64)>) {
        if let (Some((idle0, total0)), Some((idle1, total1))) = (self.last_cpu, times) {
            let total = total1.saturating_sub(total0);
            let idle = idle1.saturating_sub(idle0);
            if total > 0 {
                self.cpu_percent = Some((total.saturating_sub(idle)) as f32 * 100.0 / total as f32);
            }
        }
        self.last_cpu = times;
    }

    pub fn cpu_percent(&self) -> Option<f32> {
        self.cpu_percent
    }

    pub fn memory_percent(&self) -> Option<f32> {
        self.memory_percent
    }

    pub fn summary(&self) -> String {
        let fmt = |v: Option<f32>| v.map(|p| format!("{:.1}%", p)).unwrap_or_else(|| "unavailable".into());
        format!("cpu usage: {}\nmemory usage: {}", fmt(self.cpu_percent), fmt(self.memory_percent))
    }
}

fn read(path: &str) -> Option<String> {
    let path = Path::new(path);
    if !path.exists() {
        return None;
    }
    std::fs::read_to_string(path).ok()
}
