use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Verbosity of the planning trace: `0` silent, `1` lifecycle and result
/// summary, `2` additionally the full composed instruction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceLevel {
    Silent,
    #[default]
    Basic,
    Verbose,
}

impl TraceLevel {
    pub fn as_u8(&self) -> u8 {
        match self {
            Self::Silent => 0,
            Self::Basic => 1,
            Self::Verbose => 2,
        }
    }
}

impl fmt::Display for TraceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Silent => "silent",
            Self::Basic => "basic",
            Self::Verbose => "verbose",
        };
        write!(f, "{} ({name})", self.as_u8())
    }
}

impl std::str::FromStr for TraceLevel {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "0" | "silent" | "off" => Ok(Self::Silent),
            "1" | "basic" => Ok(Self::Basic),
            "2" | "verbose" => Ok(Self::Verbose),
            other => Err(format!("unsupported trace level `{other}` (expected 0|1|2)")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceEvent {
    pub event_id: String,
    pub event_type: String,
    pub level: TraceLevel,
    pub message: String,
    pub metadata: BTreeMap<String, String>,
    pub occurred_at: DateTime<Utc>,
}

impl TraceEvent {
    pub fn new(event_type: impl Into<String>, level: TraceLevel, message: impl Into<String>) -> Self {
        Self {
            event_id: Uuid::new_v4().to_string(),
            event_type: event_type.into(),
            level,
            message: message.into(),
            metadata: BTreeMap::new(),
            occurred_at: Utc::now(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Receives trace events. Implementations must not block or panic; there is
/// no way to report a failure back to the planner.
pub trait TraceSink: Send + Sync {
    fn emit(&self, event: TraceEvent);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopTraceSink;

impl TraceSink for NoopTraceSink {
    fn emit(&self, _event: TraceEvent) {}
}

/// Forwards events to the `tracing` subscriber installed by the host.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl TraceSink for TracingSink {
    fn emit(&self, event: TraceEvent) {
        let metadata = event
            .metadata
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join(" | ");

        match event.level {
            TraceLevel::Silent => {}
            TraceLevel::Basic => tracing::info!(
                event_name = %event.event_type,
                event_id = %event.event_id,
                metadata = %metadata,
                "{}",
                event.message
            ),
            TraceLevel::Verbose => tracing::info!(
                event_name = %event.event_type,
                event_id = %event.event_id,
                verbose = true,
                "{}\n{}",
                event.message,
                metadata
            ),
        }
    }
}

#[derive(Clone, Default)]
pub struct InMemoryTraceSink {
    events: Arc<Mutex<Vec<TraceEvent>>>,
}

impl InMemoryTraceSink {
    pub fn events(&self) -> Vec<TraceEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn event_types(&self) -> Vec<String> {
        self.events().into_iter().map(|event| event.event_type).collect()
    }
}

impl TraceSink for InMemoryTraceSink {
    fn emit(&self, event: TraceEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}

/// Level gate in front of a sink. Events above the configured level are
/// dropped before they reach the sink.
#[derive(Clone)]
pub struct Tracer {
    level: TraceLevel,
    sink: Arc<dyn TraceSink>,
}

impl Tracer {
    pub fn new(level: TraceLevel, sink: Arc<dyn TraceSink>) -> Self {
        Self { level, sink }
    }

    pub fn silent() -> Self {
        Self::new(TraceLevel::Silent, Arc::new(NoopTraceSink))
    }

    pub fn level(&self) -> TraceLevel {
        self.level
    }

    pub fn enabled(&self, level: TraceLevel) -> bool {
        level != TraceLevel::Silent && level <= self.level
    }

    pub fn emit(&self, event: TraceEvent) {
        if self.enabled(event.level) {
            self.sink.emit(event);
        }
    }
}

impl fmt::Debug for Tracer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracer").field("level", &self.level).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{InMemoryTraceSink, TraceEvent, TraceLevel, TraceSink, Tracer};

    #[test]
    fn in_memory_sink_records_events_with_metadata() {
        let sink = InMemoryTraceSink::default();
        sink.emit(
            TraceEvent::new("planner.step_started", TraceLevel::Basic, "node:start hotel planner")
                .with_metadata("city", "Paris")
                .with_metadata("nights", "3"),
        );

        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, "planner.step_started");
        assert_eq!(events[0].metadata.get("city").map(String::as_str), Some("Paris"));
    }

    #[test]
    fn tracer_drops_events_above_its_level() {
        let sink = InMemoryTraceSink::default();
        let tracer = Tracer::new(TraceLevel::Basic, Arc::new(sink.clone()));

        tracer.emit(TraceEvent::new("basic", TraceLevel::Basic, "kept"));
        tracer.emit(TraceEvent::new("verbose", TraceLevel::Verbose, "dropped"));

        assert_eq!(sink.event_types(), vec!["basic".to_string()]);
    }

    #[test]
    fn silent_tracer_emits_nothing() {
        let sink = InMemoryTraceSink::default();
        let tracer = Tracer::new(TraceLevel::Silent, Arc::new(sink.clone()));

        tracer.emit(TraceEvent::new("basic", TraceLevel::Basic, "dropped"));
        assert!(sink.events().is_empty());
        assert!(!tracer.enabled(TraceLevel::Silent));
    }

    #[test]
    fn levels_parse_from_numbers_and_names() {
        assert_eq!("0".parse::<TraceLevel>(), Ok(TraceLevel::Silent));
        assert_eq!("basic".parse::<TraceLevel>(), Ok(TraceLevel::Basic));
        assert_eq!(" 2 ".parse::<TraceLevel>(), Ok(TraceLevel::Verbose));
        assert!("3".parse::<TraceLevel>().is_err());
        assert_eq!(TraceLevel::Verbose.to_string(), "2 (verbose)");
    }
}
