//! Transition event log
//!
//! The append-only record behind the dashboard's data panel. Every dispatched
//! state change lands here as one `TransitionEvent`; the log keeps the newest
//! entries first and evicts the oldest once the configured cap is exceeded.

use crate::types::Timestamp;
use chrono::Utc;
use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;

/// Default maximum number of retained entries
pub const DEFAULT_MAX_ENTRIES: usize = 100;

/// Which status module produced a transition event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EventSource {
    Connection,
    Door,
    Ranging,
    User,
    WelcomeLight,
    System,
}

impl fmt::Display for EventSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventSource::Connection => "Connection",
            EventSource::Door => "Door",
            EventSource::Ranging => "Ranging",
            EventSource::User => "User",
            EventSource::WelcomeLight => "Welcome Light",
            EventSource::System => "System",
        };
        write!(f, "{}", name)
    }
}

/// One observed state transition: `(source, field, previous -> new)`
#[derive(Debug, Clone, Serialize)]
pub struct TransitionEvent {
    /// Monotonic sequence number, for incremental rendering
    pub seq: u64,
    pub source: EventSource,
    /// Human-readable field name, e.g. "BLE Status" or "FrontLeft Lock"
    pub field: String,
    pub previous: String,
    pub new: String,
    pub timestamp: Timestamp,
}

/// Capped, newest-first transition log
pub struct EventLog {
    entries: VecDeque<TransitionEvent>,
    max_entries: usize,
    next_seq: u64,
}

impl EventLog {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_ENTRIES)
    }

    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            max_entries: max_entries.max(1),
            next_seq: 0,
        }
    }

    /// Append one transition record, evicting the oldest beyond the cap
    pub fn add_entry(
        &mut self,
        source: EventSource,
        field: impl Into<String>,
        previous: impl fmt::Display,
        new: impl fmt::Display,
    ) {
        let entry = TransitionEvent {
            seq: self.next_seq,
            source,
            field: field.into(),
            previous: previous.to_string(),
            new: new.to_string(),
            timestamp: Utc::now(),
        };
        self.next_seq += 1;

        log::debug!(
            "[{}] {}: {} -> {}",
            entry.source,
            entry.field,
            entry.previous,
            entry.new
        );

        self.entries.push_front(entry);
        while self.entries.len() > self.max_entries {
            self.entries.pop_back();
        }
    }

    /// Drop everything and leave a single System marker entry
    pub fn clear(&mut self) {
        self.entries.clear();
        self.add_entry(EventSource::System, "Table Cleared", "All entries", "None");
    }

    /// All retained entries, newest first
    pub fn entries(&self) -> impl Iterator<Item = &TransitionEvent> {
        self.entries.iter()
    }

    /// Entries from one source only, newest first
    pub fn filtered(&self, source: EventSource) -> impl Iterator<Item = &TransitionEvent> {
        self.entries.iter().filter(move |e| e.source == source)
    }

    /// Entries with a sequence number at or above `seq`, oldest first
    /// (the increment a renderer has not shown yet)
    pub fn since(&self, seq: u64) -> impl Iterator<Item = &TransitionEvent> {
        self.entries.iter().rev().filter(move |e| e.seq >= seq)
    }

    /// Sequence number the next entry will receive
    pub fn next_seq(&self) -> u64 {
        self.next_seq
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_are_newest_first() {
        let mut log = EventLog::new();
        log.add_entry(EventSource::Connection, "BLE Status", "Disconnected", "Connected");
        log.add_entry(EventSource::Door, "FrontLeft Position", "close", "open");

        let first = log.entries().next().unwrap();
        assert_eq!(first.source, EventSource::Door);
        assert_eq!(first.previous, "close");
        assert_eq!(first.new, "open");
    }

    #[test]
    fn test_fifo_eviction_at_cap() {
        let mut log = EventLog::with_capacity(3);
        for i in 0..5 {
            log.add_entry(EventSource::Ranging, format!("Field{}", i), i, i + 1);
        }

        // Count never exceeds the cap and the oldest entries are gone
        assert_eq!(log.len(), 3);
        let fields: Vec<&str> = log.entries().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["Field4", "Field3", "Field2"]);
    }

    #[test]
    fn test_clear_leaves_marker_entry() {
        let mut log = EventLog::new();
        log.add_entry(EventSource::Door, "Trunk Lock", "lock", "unlock");
        log.clear();

        assert_eq!(log.len(), 1);
        let entry = log.entries().next().unwrap();
        assert_eq!(entry.source, EventSource::System);
        assert_eq!(entry.field, "Table Cleared");
    }

    #[test]
    fn test_source_filtering() {
        let mut log = EventLog::new();
        log.add_entry(EventSource::Connection, "UWB Status", "NA", "Ranging");
        log.add_entry(EventSource::Door, "FrontLeft Lock", "lock", "unlock");
        log.add_entry(EventSource::Connection, "Vehicle Status", "Sleep", "Awake");

        assert_eq!(log.filtered(EventSource::Connection).count(), 2);
        assert_eq!(log.filtered(EventSource::Door).count(), 1);
        assert_eq!(log.filtered(EventSource::User).count(), 0);
    }

    #[test]
    fn test_since_returns_unseen_in_order() {
        let mut log = EventLog::new();
        log.add_entry(EventSource::Ranging, "Distance", 100, 200);
        let mark = log.next_seq();
        log.add_entry(EventSource::Ranging, "Distance", 200, 300);
        log.add_entry(EventSource::Ranging, "AOA", 10, 20);

        let unseen: Vec<&str> = log.since(mark).map(|e| e.field.as_str()).collect();
        assert_eq!(unseen, vec!["Distance", "AOA"]);
    }
}
