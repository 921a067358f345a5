//! Tracing layer that writes formatted events to the browser console.
//!
//! Events are rendered as `LEVEL target: message key=value ...` and routed to
//! `console.debug/info/warn/error` on wasm32, or stderr on the host so native tests stay quiet
//! unless a subscriber is installed.

use std::fmt::{self, Write as _};

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::{Context, SubscriberExt};

type Sink = Box<dyn Fn(Level, &str) + Send + Sync>;

/// A `tracing_subscriber::Layer` writing one line per event to a sink.
pub struct ConsoleLayer {
    sink: Sink,
}

impl ConsoleLayer {
    /// Layer writing to the browser console (stderr off-wasm).
    pub fn browser() -> Self {
        Self { sink: Box::new(write_console) }
    }

    /// Layer writing to an arbitrary sink; used by tests to capture output.
    pub fn with_sink(sink: impl Fn(Level, &str) + Send + Sync + 'static) -> Self {
        Self { sink: Box::new(sink) }
    }
}

impl<S: Subscriber> Layer<S> for ConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        let mut visitor = LineVisitor::default();
        event.record(&mut visitor);
        let mut line = format!("{} {}: {}", meta.level(), meta.target(), visitor.message);
        if !visitor.fields.is_empty() {
            line.push(' ');
            line.push_str(&visitor.fields);
        }
        (self.sink)(*meta.level(), &line);
    }
}

#[derive(Default)]
struct LineVisitor {
    message: String,
    fields: String,
}

impl Visit for LineVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
        } else {
            if !self.fields.is_empty() {
                self.fields.push(' ');
            }
            let _ = write!(self.fields, "{}={value:?}", field.name());
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            if !self.fields.is_empty() {
                self.fields.push(' ');
            }
            let _ = write!(self.fields, "{}={value}", field.name());
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn write_console(level: Level, line: &str) {
    let v = wasm_bindgen::JsValue::from_str(line);
    match level {
        Level::ERROR => web_sys::console::error_1(&v),
        Level::WARN => web_sys::console::warn_1(&v),
        Level::INFO => web_sys::console::info_1(&v),
        _ => web_sys::console::debug_1(&v),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn write_console(_level: Level, line: &str) {
    eprintln!("{line}");
}

/// Parse a config level name.
pub fn parse_level(name: &str) -> Option<LevelFilter> {
    match name.to_ascii_lowercase().as_str() {
        "trace" => Some(LevelFilter::TRACE),
        "debug" => Some(LevelFilter::DEBUG),
        "info" => Some(LevelFilter::INFO),
        "warn" => Some(LevelFilter::WARN),
        "error" => Some(LevelFilter::ERROR),
        "off" => Some(LevelFilter::OFF),
        _ => None,
    }
}

/// Install the console layer as the global subscriber. Later calls are no-ops.
pub fn init(level: &str) {
    let filter = parse_level(level).unwrap_or(LevelFilter::INFO);
    let subscriber = tracing_subscriber::registry().with(ConsoleLayer::browser().with_filter(filter));
    // already installed (page restarted with a new config)
    let _ = tracing::subscriber::set_global_default(subscriber);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn capture() -> (ConsoleLayer, Arc<Mutex<Vec<(Level, String)>>>) {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let sink_lines = Arc::clone(&lines);
        let layer = ConsoleLayer::with_sink(move |level, line| {
            sink_lines.lock().unwrap().push((level, line.to_string()));
        });
        (layer, lines)
    }

    #[test]
    fn formats_message_and_fields() {
        let (layer, lines) = capture();
        let subscriber = tracing_subscriber::registry().with(layer);
        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!(target: "page", x = 12.5, screen = "intro", "moved");
        });
        let lines = lines.lock().unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].0, Level::WARN);
        assert_eq!(lines[0].1, "WARN page: moved x=12.5 screen=intro");
    }

    #[test]
    fn filter_drops_lower_levels() {
        let (layer, lines) = capture();
        let subscriber =
            tracing_subscriber::registry().with(layer.with_filter(LevelFilter::INFO));
        tracing::subscriber::with_default(subscriber, || {
            tracing::debug!("hidden");
            tracing::info!("shown");
        });
        let lines = lines.lock().unwrap();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].1.ends_with("shown"));
    }

    #[test]
    fn parse_level_is_case_insensitive() {
        assert_eq!(parse_level("DEBUG"), Some(LevelFilter::DEBUG));
        assert_eq!(parse_level("verbose"), None);
    }
}
