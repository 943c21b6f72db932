#![forbid(unsafe_code)]

//! Tracing layer that writes formatted events to a console.
//!
//! Provides a `tracing_subscriber::Layer` implementation that renders each
//! event as one line (`LEVEL target: message key=value ...`) and hands it to
//! a [`ConsoleSink`]. In the browser the sink is the devtools console, with
//! the level selecting `console.error` / `warn` / `info` / `debug` / `log`;
//! tests capture lines in memory.
//!
//! ```rust
//! use pawpage_web::logging::{ConsoleLayer, ConsoleSink};
//! use tracing::Level;
//! use tracing_subscriber::prelude::*;
//!
//! struct Stderr;
//! impl ConsoleSink for Stderr {
//!     fn write(&self, _level: Level, line: &str) {
//!         eprintln!("{line}");
//!     }
//! }
//!
//! let subscriber = tracing_subscriber::registry().with(ConsoleLayer::new(Stderr));
//! tracing::subscriber::with_default(subscriber, || tracing::info!("hello"));
//! ```

use std::fmt::{self, Write as FmtWrite};

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::Context;
use tracing_subscriber::prelude::*;

/// Destination for formatted log lines.
pub trait ConsoleSink: Send + Sync + 'static {
    fn write(&self, level: Level, line: &str);
}

/// What each line includes.
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// Show log level. Default: true.
    pub show_level: bool,
    /// Show the tracing target (module path). Default: true.
    pub show_target: bool,
    /// Show structured fields beyond `message`. Default: true.
    pub show_fields: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            show_level: true,
            show_target: true,
            show_fields: true,
        }
    }
}

fn level_str(level: Level) -> &'static str {
    match level {
        Level::ERROR => "ERROR",
        Level::WARN => "WARN ",
        Level::INFO => "INFO ",
        Level::DEBUG => "DEBUG",
        Level::TRACE => "TRACE",
    }
}

/// Extracts message and structured fields from a tracing event.
#[derive(Default)]
struct EventVisitor {
    message: Option<String>,
    fields: Vec<(String, String)>,
}

impl EventVisitor {
    fn push(&mut self, field: &Field, value: String) {
        if field.name() == "message" {
            self.message = Some(value);
        } else {
            self.fields.push((field.name().to_string(), value));
        }
    }
}

impl Visit for EventVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        let rendered = format!("{value:?}");
        self.push(field, strip_debug_quotes(&rendered));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.push(field, value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.push(field, value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.push(field, value.to_string());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.push(field, value.to_string());
    }
}

/// Remove surrounding quotes from Debug-formatted strings.
fn strip_debug_quotes(s: &str) -> String {
    if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        s[1..s.len() - 1].to_string()
    } else {
        s.to_string()
    }
}

/// A `tracing_subscriber::Layer` writing one line per event to a sink.
pub struct ConsoleLayer<S> {
    sink: S,
    config: ConsoleConfig,
}

impl<S: ConsoleSink> ConsoleLayer<S> {
    pub fn new(sink: S) -> Self {
        Self::with_config(sink, ConsoleConfig::default())
    }

    pub fn with_config(sink: S, config: ConsoleConfig) -> Self {
        Self { sink, config }
    }

    #[must_use]
    pub fn show_level(mut self, show: bool) -> Self {
        self.config.show_level = show;
        self
    }

    #[must_use]
    pub fn show_target(mut self, show: bool) -> Self {
        self.config.show_target = show;
        self
    }

    #[must_use]
    pub fn show_fields(mut self, show: bool) -> Self {
        self.config.show_fields = show;
        self
    }

    fn format_event(&self, event: &Event<'_>) -> String {
        let metadata = event.metadata();
        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let mut line = String::new();
        if self.config.show_level {
            line.push_str(level_str(*metadata.level()));
            line.push(' ');
        }
        if self.config.show_target {
            let _ = write!(line, "{}: ", metadata.target());
        }
        line.push_str(&visitor.message.unwrap_or_default());
        if self.config.show_fields {
            for (k, v) in &visitor.fields {
                let _ = write!(line, " {k}={v}");
            }
        }
        line
    }
}

impl<S, Sub> Layer<Sub> for ConsoleLayer<S>
where
    S: ConsoleSink,
    Sub: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, Sub>) {
        let line = self.format_event(event);
        self.sink.write(*event.metadata().level(), &line);
    }
}

/// Install a global subscriber writing to `sink` up to `max_level`.
///
/// Returns `false` when a global subscriber was already set; the existing
/// one stays in place.
pub fn install<S: ConsoleSink>(sink: S, max_level: Level) -> bool {
    let layer = ConsoleLayer::new(sink).with_filter(LevelFilter::from_level(max_level));
    tracing_subscriber::registry().with(layer).try_init().is_ok()
}
