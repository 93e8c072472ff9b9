//! Context for region synchronization providing diagnostics, timing and build statistics
//!
//! Every entry is also forwarded to the `log` facade, so callers that only
//! care about the process log can ignore the context entirely.

use std::collections::HashMap;
use std::time::Duration;
use web_time::Instant;

/// Log level for context messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug = 0,
    Info = 1,
    Warning = 2,
    Error = 3,
}

impl From<LogLevel> for log::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Info => log::Level::Info,
            LogLevel::Warning => log::Level::Warn,
            LogLevel::Error => log::Level::Error,
        }
    }
}

/// Timer categories for sync profiling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerCategory {
    /// Polygon build from mesh geometry
    Build,
    /// Snapshot creation
    Duplicate,
    /// Merge of a rebuilt snapshot
    Merge,
}

/// Log entry containing message and metadata
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: LogLevel,
    pub timestamp: Instant,
    pub message: String,
    /// Optional category for grouping logs
    pub category: Option<String>,
}

/// Timer entry for performance measurement
#[derive(Debug, Clone)]
pub struct TimerEntry {
    pub category: TimerCategory,
    /// Accumulated duration over all runs
    pub duration: Duration,
    /// Number of times this timer was used
    pub count: usize,
}

/// Counters from the most recent polygon build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Faces read from the mesh
    pub faces: usize,
    /// Polygons produced
    pub polygons: usize,
    /// Faces rejected for referencing vertices outside the buffer
    pub skipped_faces: usize,
}

/// Context for region synchronization
#[derive(Debug)]
pub struct SyncContext {
    logs: Vec<LogEntry>,
    active_timers: HashMap<TimerCategory, Instant>,
    timers: HashMap<TimerCategory, TimerEntry>,
    stats: BuildStats,
    min_log_level: LogLevel,
    enable_timing: bool,
    max_log_entries: usize,
}

impl Default for SyncContext {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncContext {
    pub fn new() -> Self {
        Self {
            logs: Vec::new(),
            active_timers: HashMap::new(),
            timers: HashMap::new(),
            stats: BuildStats::default(),
            min_log_level: LogLevel::Info,
            enable_timing: true,
            max_log_entries: 1000,
        }
    }

    /// Sets the minimum log level recorded in the context
    pub fn set_log_level(&mut self, level: LogLevel) {
        self.min_log_level = level;
    }

    pub fn set_timing_enabled(&mut self, enabled: bool) {
        self.enable_timing = enabled;
    }

    /// Sets the maximum number of log entries to keep
    pub fn set_max_log_entries(&mut self, max_entries: usize) {
        self.max_log_entries = max_entries;
    }

    pub fn log_debug(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Debug, message, None);
    }

    pub fn log_info(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Info, message, None);
    }

    pub fn log_warning(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Warning, message, None);
    }

    /// Logs a warning message with category
    pub fn log_warning_with_category(
        &mut self,
        message: impl Into<String>,
        category: impl Into<String>,
    ) {
        self.log(LogLevel::Warning, message, Some(category.into()));
    }

    pub fn log_error(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Error, message, None);
    }

    fn log(&mut self, level: LogLevel, message: impl Into<String>, category: Option<String>) {
        let message = message.into();
        let log_level: log::Level = level.into();
        match &category {
            Some(category) => log::log!(log_level, "[{}] {}", category, message),
            None => log::log!(log_level, "{}", message),
        }

        if level >= self.min_log_level {
            self.logs.push(LogEntry {
                level,
                timestamp: Instant::now(),
                message,
                category,
            });

            if self.logs.len() > self.max_log_entries {
                self.logs.remove(0);
            }
        }
    }

    /// Starts a timer for the given category
    pub fn start_timer(&mut self, category: TimerCategory) {
        if self.enable_timing {
            self.active_timers.insert(category, Instant::now());
        }
    }

    /// Stops a timer and accumulates the duration
    pub fn stop_timer(&mut self, category: TimerCategory) {
        if let Some(start_time) = self.active_timers.remove(&category) {
            let entry = self.timers.entry(category).or_insert(TimerEntry {
                category,
                duration: Duration::ZERO,
                count: 0,
            });
            entry.duration += start_time.elapsed();
            entry.count += 1;
        }
    }

    /// Gets the total duration for a completed timer
    pub fn get_timer_duration(&self, category: TimerCategory) -> Option<Duration> {
        self.timers.get(&category).map(|entry| entry.duration)
    }

    /// Gets how many times a timer was stopped
    pub fn get_timer_count(&self, category: TimerCategory) -> usize {
        self.timers
            .get(&category)
            .map(|entry| entry.count)
            .unwrap_or(0)
    }

    pub(crate) fn record_build(&mut self, stats: BuildStats) {
        self.stats = stats;
    }

    /// Statistics of the most recent build run through this context, or the
    /// totals of the most recent batch for [`sync_regions`](crate::sync_regions)
    pub fn stats(&self) -> BuildStats {
        self.stats
    }

    /// Folds contexts from parallel builds into this one.
    ///
    /// Log entries are appended in order, timers accumulate, and the build
    /// statistics are replaced by the sum over `others`.
    pub(crate) fn absorb(&mut self, others: impl IntoIterator<Item = SyncContext>) {
        let min_level = self.min_log_level;
        let mut total = BuildStats::default();

        for other in others {
            total.faces += other.stats.faces;
            total.polygons += other.stats.polygons;
            total.skipped_faces += other.stats.skipped_faces;

            for (category, timer) in other.timers {
                let entry = self.timers.entry(category).or_insert(TimerEntry {
                    category,
                    duration: Duration::ZERO,
                    count: 0,
                });
                entry.duration += timer.duration;
                entry.count += timer.count;
            }

            self.logs.extend(
                other
                    .logs
                    .into_iter()
                    .filter(|entry| entry.level >= min_level),
            );
        }

        if self.logs.len() > self.max_log_entries {
            let excess = self.logs.len() - self.max_log_entries;
            self.logs.drain(..excess);
        }
        self.stats = total;
    }

    pub fn get_logs(&self) -> &[LogEntry] {
        &self.logs
    }

    pub fn get_logs_by_level(&self, level: LogLevel) -> Vec<&LogEntry> {
        self.logs
            .iter()
            .filter(|entry| entry.level == level)
            .collect()
    }

    pub fn get_logs_by_category(&self, category: &str) -> Vec<&LogEntry> {
        self.logs
            .iter()
            .filter(|entry| entry.category.as_deref() == Some(category))
            .collect()
    }

    /// Clears logs, timers and statistics
    pub fn reset(&mut self) {
        self.logs.clear();
        self.active_timers.clear();
        self.timers.clear();
        self.stats = BuildStats::default();
    }
}
