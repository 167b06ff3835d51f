use chrono::Local;
use std::fmt;
use std::sync::{Arc, Mutex};

/// Destination for formatted log lines
pub trait LogSink: Send + Sync {
    fn write_line(&self, line: &str);
}

/// Buffers lines in memory so they can be printed (or asserted on) later.
#[derive(Clone, Default)]
pub struct MemorySink {
    buffer: Arc<Mutex<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        match self.buffer.lock() {
            Ok(buf) => buf.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }
}

impl LogSink for MemorySink {
    fn write_line(&self, line: &str) {
        let mut buf = match self.buffer.lock() {
            Ok(buf) => buf,
            Err(poisoned) => poisoned.into_inner(),
        };
        buf.push_str(line);
        buf.push('\n');
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Error,
    Warn,
    Debug,
}

impl Level {
    fn tag(self) -> &'static str {
        match self {
            Level::Error => "ERROR",
            Level::Warn => "WARN",
            Level::Debug => "DEBUG",
        }
    }
}

/// Leveled logger writing timestamped lines to a sink.
///
/// Every line is also forwarded to the `log` facade so `env_logger`
/// picks it up under `RUST_LOG`.
#[derive(Clone)]
pub struct Logger {
    sink: Arc<dyn LogSink>,
    prefix: &'static str,
}

impl Logger {
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self {
            sink,
            prefix: "RESTY",
        }
    }

    pub fn error(&self, args: fmt::Arguments<'_>) {
        log::error!("{}", args);
        self.output(Level::Error, args);
    }

    pub fn warn(&self, args: fmt::Arguments<'_>) {
        log::warn!("{}", args);
        self.output(Level::Warn, args);
    }

    pub fn debug(&self, args: fmt::Arguments<'_>) {
        log::debug!("{}", args);
        self.output(Level::Debug, args);
    }

    fn output(&self, level: Level, args: fmt::Arguments<'_>) {
        let timestamp = Local::now().format("%Y/%m/%d %H:%M:%S%.6f");
        let line = format!("{} {} {} {}", timestamp, level.tag(), self.prefix, args);
        self.sink.write_line(&line);
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}
