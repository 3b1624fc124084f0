//! In-memory diagnostics buffer fed by the tracing subscriber.
//!
//! The host owns a [`DiagnosticsSink`] handle, installs a
//! [`DiagnosticsLayer`] that forwards every event into it, and clears the
//! buffer whenever a fresh view is wanted (the simulator clears it after each
//! planet capture).

use std::collections::VecDeque;
use std::fmt::{self, Write as _};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

/// Records kept before the oldest are dropped.
const DEFAULT_CAPACITY: usize = 1024;

/// One captured log record.
#[derive(Clone, Debug, PartialEq)]
pub struct DiagnosticRecord {
    /// Time since the sink was created.
    pub timestamp: Duration,
    pub level: Level,
    pub message: String,
}

#[derive(Debug)]
struct SinkState {
    records: VecDeque<DiagnosticRecord>,
    capacity: usize,
}

/// Cloneable handle to a bounded, shared record buffer.
#[derive(Clone, Debug)]
pub struct DiagnosticsSink {
    state: Arc<Mutex<SinkState>>,
    start: Instant,
}

impl Default for DiagnosticsSink {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl DiagnosticsSink {
    /// Create a sink that keeps at most `capacity` records.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            state: Arc::new(Mutex::new(SinkState {
                records: VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY)),
                capacity: capacity.max(1),
            })),
            start: Instant::now(),
        }
    }

    /// Append a record, evicting the oldest one when full.
    pub fn record(&self, level: Level, message: impl Into<String>) {
        let record = DiagnosticRecord {
            timestamp: self.start.elapsed(),
            level,
            message: message.into(),
        };
        let mut state = self.lock();
        if state.records.len() == state.capacity {
            state.records.pop_front();
        }
        state.records.push_back(record);
    }

    /// Drop every buffered record.
    pub fn clear(&self) {
        self.lock().records.clear();
    }

    /// Snapshot of the buffered records, oldest first.
    pub fn records(&self) -> Vec<DiagnosticRecord> {
        self.lock().records.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().records.is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, SinkState> {
        // A panic while holding the lock cannot leave the deque inconsistent.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// `tracing_subscriber` layer that copies events into a [`DiagnosticsSink`].
pub struct DiagnosticsLayer {
    sink: DiagnosticsSink,
}

impl DiagnosticsLayer {
    pub fn new(sink: DiagnosticsSink) -> Self {
        Self { sink }
    }
}

impl<S: Subscriber> Layer<S> for DiagnosticsLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        self.sink.record(*event.metadata().level(), visitor.finish());
    }
}

/// Flattens an event into `message key=value ...`.
#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl MessageVisitor {
    fn finish(self) -> String {
        if self.fields.is_empty() {
            self.message
        } else if self.message.is_empty() {
            self.fields.trim_start().to_string()
        } else {
            format!("{}{}", self.message, self.fields)
        }
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }
}
