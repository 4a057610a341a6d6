use crate::logging::{LogEvent, LogFields, LogLevel};
use serde::Serialize;
use serde_json::Value;

/// Counters describing how much work width signals caused.
#[derive(Debug, Default, Clone)]
pub struct LayoutMetrics {
    signals: u64,
    transitions: u64,
    suppressed_signals: u64,
    deliveries: u64,
    blocked_deliveries: u64,
    skipped_deliveries: u64,
}

impl LayoutMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_signal(&mut self, changed: bool) {
        self.signals = self.signals.saturating_add(1);
        if changed {
            self.transitions = self.transitions.saturating_add(1);
        } else {
            self.suppressed_signals = self.suppressed_signals.saturating_add(1);
        }
    }

    pub fn record_fan_out(&mut self, delivered: usize, blocked: usize, skipped: usize) {
        self.deliveries = self.deliveries.saturating_add(delivered as u64);
        self.blocked_deliveries = self.blocked_deliveries.saturating_add(blocked as u64);
        self.skipped_deliveries = self.skipped_deliveries.saturating_add(skipped as u64);
    }

    pub fn snapshot(&self) -> MetricSnapshot {
        MetricSnapshot {
            signals: self.signals,
            transitions: self.transitions,
            suppressed_signals: self.suppressed_signals,
            deliveries: self.deliveries,
            blocked_deliveries: self.blocked_deliveries,
            skipped_deliveries: self.skipped_deliveries,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricSnapshot {
    pub signals: u64,
    pub transitions: u64,
    pub suppressed_signals: u64,
    pub deliveries: u64,
    pub blocked_deliveries: u64,
    pub skipped_deliveries: u64,
}

impl MetricSnapshot {
    pub fn as_fields(&self) -> LogFields {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => LogFields::new(),
        }
    }

    pub fn to_log_event(&self, target: &str) -> LogEvent {
        LogEvent::new(LogLevel::Info, target, "layout_metrics").with_fields(self.as_fields())
    }
}
