//! Message logging with pattern-based filtering and in-memory storage
//!
//! Commands, events and slice actions can all be traced and kept in a
//! bounded ring buffer. Which messages are recorded is decided by glob
//! patterns over [`Message::name`](crate::Message::name).
//!
//! # Example
//!
//! ```
//! use dashboard_dispatch_core::log::{MessageLog, MessageLogConfig, MessageLoggerConfig};
//! use dashboard_dispatch_core::state::{SliceAction, UserAction};
//!
//! let config = MessageLogConfig::new(10, MessageLoggerConfig::new(None, Some("Set*")));
//! let mut log = MessageLog::new(config);
//!
//! let action: SliceAction = UserAction::SetUser(None).into();
//! assert!(log.log(&action, None).is_none());
//! ```

use std::collections::VecDeque;
use std::time::Instant;

use serde::Deserialize;

use crate::message::MessageSummary;
use crate::store::Middleware;

/// Include/exclude glob patterns deciding which message names are logged.
///
/// Patterns support `*` (any sequence) and `?` (any single character).
///
/// - `Change*` matches ChangeDateFilterSelection, ChangeKpiWidgetHeader, ...
/// - `*Failed` matches CommandFailed
/// - `LayoutSection*` matches every layout section event
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MessageLoggerConfig {
    /// If non-empty, only log messages matching these patterns
    #[serde(rename = "include")]
    pub include_patterns: Vec<String>,
    /// Exclude messages matching these patterns (applied after include)
    #[serde(rename = "exclude")]
    pub exclude_patterns: Vec<String>,
}

impl MessageLoggerConfig {
    /// Create a config from comma-separated pattern strings
    ///
    /// # Example
    /// ```
    /// use dashboard_dispatch_core::log::MessageLoggerConfig;
    ///
    /// let config = MessageLoggerConfig::new(Some("Change*,LoadDashboard"), Some("*Kpi*"));
    /// assert!(config.should_log("ChangeDateFilterSelection"));
    /// assert!(config.should_log("LoadDashboard"));
    /// assert!(!config.should_log("ChangeKpiWidgetHeader"));
    /// assert!(!config.should_log("AddSectionItems"));
    /// ```
    pub fn new(include: Option<&str>, exclude: Option<&str>) -> Self {
        Self {
            include_patterns: split_patterns(include),
            exclude_patterns: split_patterns(exclude),
        }
    }

    pub fn with_patterns(include: Vec<String>, exclude: Vec<String>) -> Self {
        Self {
            include_patterns: include,
            exclude_patterns: exclude,
        }
    }

    /// Check if a message name passes the include/exclude patterns
    pub fn should_log(&self, name: &str) -> bool {
        if !self.include_patterns.is_empty()
            && !self.include_patterns.iter().any(|p| glob_match(p, name))
        {
            return false;
        }

        !self.exclude_patterns.iter().any(|p| glob_match(p, name))
    }
}

fn split_patterns(patterns: Option<&str>) -> Vec<String> {
    patterns
        .map(|s| {
            s.split(',')
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

/// An entry in the message log
#[derive(Debug, Clone)]
pub struct MessageLogEntry {
    /// Message name (from Message::name())
    pub name: &'static str,
    /// Summary representation (from MessageSummary::summary())
    pub summary: String,
    /// Correlation id of the command the message belongs to
    pub correlation_id: Option<String>,
    pub timestamp: Instant,
    /// Sequence number for ordering
    pub sequence: u64,
    /// Command succeeded, or slice action changed state; set once known
    pub outcome: Option<bool>,
}

impl MessageLogEntry {
    pub fn new(
        name: &'static str,
        summary: String,
        correlation_id: Option<String>,
        sequence: u64,
    ) -> Self {
        Self {
            name,
            summary,
            correlation_id,
            timestamp: Instant::now(),
            sequence,
            outcome: None,
        }
    }

    pub fn elapsed(&self) -> std::time::Duration {
        self.timestamp.elapsed()
    }

    /// Format the elapsed time for display (e.g., "2.3s", "150ms")
    pub fn elapsed_display(&self) -> String {
        let elapsed = self.elapsed();
        if elapsed.as_secs() >= 1 {
            format!("{:.1}s", elapsed.as_secs_f64())
        } else {
            format!("{}ms", elapsed.as_millis())
        }
    }
}

/// Configuration for the message log ring buffer
#[derive(Debug, Clone)]
pub struct MessageLogConfig {
    /// Maximum number of entries to keep
    pub capacity: usize,
    pub filter: MessageLoggerConfig,
}

impl Default for MessageLogConfig {
    fn default() -> Self {
        Self {
            capacity: 100,
            filter: MessageLoggerConfig::default(),
        }
    }
}

impl MessageLogConfig {
    pub fn new(capacity: usize, filter: MessageLoggerConfig) -> Self {
        Self { capacity, filter }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Default::default()
        }
    }
}

/// In-memory ring buffer of recent messages
///
/// Older entries are discarded once capacity is reached.
#[derive(Debug, Clone)]
pub struct MessageLog {
    entries: VecDeque<MessageLogEntry>,
    config: MessageLogConfig,
    next_sequence: u64,
}

impl Default for MessageLog {
    fn default() -> Self {
        Self::new(MessageLogConfig::default())
    }
}

impl MessageLog {
    pub fn new(config: MessageLogConfig) -> Self {
        Self {
            entries: VecDeque::with_capacity(config.capacity),
            config,
            next_sequence: 0,
        }
    }

    /// Log a message if it passes the filter
    ///
    /// Returns the entry if it was logged, None if filtered out.
    pub fn log<M: MessageSummary>(
        &mut self,
        message: &M,
        correlation_id: Option<&str>,
    ) -> Option<&MessageLogEntry> {
        let name = message.name();
        if self.config.capacity == 0 || !self.config.filter.should_log(name) {
            return None;
        }

        let entry = MessageLogEntry::new(
            name,
            message.summary(),
            correlation_id.map(str::to_string),
            self.next_sequence,
        );
        self.next_sequence += 1;

        if self.entries.len() >= self.config.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
        self.entries.back()
    }

    /// Record the outcome of the newest entry
    pub fn update_last_outcome(&mut self, outcome: bool) {
        if let Some(entry) = self.entries.back_mut() {
            entry.outcome = Some(outcome);
        }
    }

    /// All entries, oldest first
    pub fn entries(&self) -> impl Iterator<Item = &MessageLogEntry> {
        self.entries.iter()
    }

    /// All entries, newest first
    pub fn entries_rev(&self) -> impl Iterator<Item = &MessageLogEntry> {
        self.entries.iter().rev()
    }

    /// The most recent `count` entries, newest first
    pub fn recent(&self, count: usize) -> impl Iterator<Item = &MessageLogEntry> {
        self.entries.iter().rev().take(count)
    }

    /// Entries belonging to one command
    pub fn for_correlation<'a>(
        &'a self,
        correlation_id: &'a str,
    ) -> impl Iterator<Item = &'a MessageLogEntry> + 'a {
        self.entries
            .iter()
            .filter(move |e| e.correlation_id.as_deref() == Some(correlation_id))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn config(&self) -> &MessageLogConfig {
        &self.config
    }
}

/// Middleware that logs slice actions with pattern filtering.
///
/// Traces every action that passes the filter and, when created with
/// [`with_log`](Self::with_log), also keeps them in a [`MessageLog`].
#[derive(Debug, Clone)]
pub struct MessageLoggerMiddleware {
    config: MessageLoggerConfig,
    log: Option<MessageLog>,
    /// Whether the last action made it into the log
    last_logged: bool,
    active: bool,
}

impl MessageLoggerMiddleware {
    /// Tracing only, no in-memory storage
    pub fn new(config: MessageLoggerConfig) -> Self {
        Self {
            config,
            log: None,
            last_logged: false,
            active: true,
        }
    }

    pub fn with_log(config: MessageLogConfig) -> Self {
        Self {
            config: config.filter.clone(),
            log: Some(MessageLog::new(config)),
            last_logged: false,
            active: true,
        }
    }

    /// When inactive every hook is a no-op
    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn log(&self) -> Option<&MessageLog> {
        self.log.as_ref()
    }

    pub fn log_mut(&mut self) -> Option<&mut MessageLog> {
        self.log.as_mut()
    }

    pub fn config(&self) -> &MessageLoggerConfig {
        &self.config
    }
}

impl<A: MessageSummary> Middleware<A> for MessageLoggerMiddleware {
    fn before(&mut self, action: &A) {
        if !self.active {
            return;
        }

        let name = action.name();
        if self.config.should_log(name) {
            tracing::debug!(action = %name, "slice action");
        }

        self.last_logged = false;
        if let Some(ref mut log) = self.log {
            self.last_logged = log.log(action, None).is_some();
        }
    }

    fn after(&mut self, _action: &A, state_changed: bool) {
        if !self.active || !self.last_logged {
            return;
        }
        if let Some(ref mut log) = self.log {
            log.update_last_outcome(state_changed);
        }
    }
}

/// Simple glob pattern matching supporting `*` and `?`.
///
/// - `*` matches zero or more characters
/// - `?` matches exactly one character
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();

    let mut pi = 0;
    let mut ti = 0;
    let mut star_pi = None;
    let mut star_ti = 0;

    while ti < text.len() {
        if pi < pattern.len() && (pattern[pi] == '?' || pattern[pi] == text[ti]) {
            pi += 1;
            ti += 1;
        } else if pi < pattern.len() && pattern[pi] == '*' {
            star_pi = Some(pi);
            star_ti = ti;
            pi += 1;
        } else if let Some(spi) = star_pi {
            // backtrack: let the last star swallow one more character
            pi = spi + 1;
            star_ti += 1;
            ti = star_ti;
        } else {
            return false;
        }
    }

    while pi < pattern.len() && pattern[pi] == '*' {
        pi += 1;
    }

    pi == pattern.len()
}
