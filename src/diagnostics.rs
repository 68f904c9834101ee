//! Parse/write diagnostic sink.
//!
//! Non-fatal issues met during decoding (an unrecognized group code, an
//! entity skipped after a malformed value) are collected as `Diagnostic`
//! items rather than being printed or silently dropped.  The sink is
//! created by the caller and handed to the dispatch layer explicitly; there
//! is no process-wide logger state.
//!
//! After an operation the caller inspects the sink to see what happened.

use std::fmt;

/// Severity of a diagnostic.  Ordered so a sink can filter by level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    /// Per-field trace output.
    Debug,
    /// Progress information.
    Info,
    /// Non-fatal issue (unrecognized code, clamped value).
    Warning,
    /// Error that was recovered from (entity abandoned, decode resumed).
    Error,
    /// Suppress everything.
    Off,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Debug => write!(f, "Debug"),
            Self::Info => write!(f, "Info"),
            Self::Warning => write!(f, "Warning"),
            Self::Error => write!(f, "Error"),
            Self::Off => write!(f, "Off"),
        }
    }
}

/// A single diagnostic produced during reading or writing.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// The severity.
    pub level: LogLevel,
    /// A human-readable description of the issue.
    pub message: String,
}

impl Diagnostic {
    /// Create a new diagnostic.
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level, self.message)
    }
}

/// Collects diagnostics during a read/write operation.
///
/// Entries below the configured minimum level are discarded at the call
/// site and never stored.
#[derive(Debug, Clone)]
pub struct DiagnosticSink {
    min_level: LogLevel,
    items: Vec<Diagnostic>,
}

impl Default for DiagnosticSink {
    fn default() -> Self {
        Self::new(LogLevel::Warning)
    }
}

impl DiagnosticSink {
    /// Create a sink that keeps entries at or above `min_level`.
    pub fn new(min_level: LogLevel) -> Self {
        Self {
            min_level,
            items: Vec::new(),
        }
    }

    /// The configured minimum level.
    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    /// Record a diagnostic if it clears the configured level.
    pub fn log(&mut self, level: LogLevel, message: impl Into<String>) {
        if level >= self.min_level && level != LogLevel::Off {
            self.items.push(Diagnostic::new(level, message));
        }
    }

    /// Shorthand for `log(LogLevel::Warning, ..)`.
    pub fn warn(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Warning, message);
    }

    /// Shorthand for `log(LogLevel::Error, ..)`.
    pub fn error(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Error, message);
    }

    /// Check if there are any recorded diagnostics.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of recorded diagnostics.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Iterate over all recorded diagnostics.
    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.items.iter()
    }

    /// Get all diagnostics of a specific level.
    pub fn of_level(&self, level: LogLevel) -> Vec<&Diagnostic> {
        self.items.iter().filter(|d| d.level == level).collect()
    }

    /// Check whether any diagnostic of the given level exists.
    pub fn has_level(&self, level: LogLevel) -> bool {
        self.items.iter().any(|d| d.level == level)
    }

    /// Consume the sink into a `Vec`.
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}

impl<'a> IntoIterator for &'a DiagnosticSink {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_creation() {
        let d = Diagnostic::new(LogLevel::Warning, "code 999 skipped");
        assert_eq!(d.level, LogLevel::Warning);
        assert_eq!(d.message, "code 999 skipped");
    }

    #[test]
    fn test_sink_basics() {
        let mut sink = DiagnosticSink::new(LogLevel::Warning);
        assert!(sink.is_empty());

        sink.warn("w1");
        sink.error("e1");
        sink.warn("w2");

        assert_eq!(sink.len(), 3);
        assert_eq!(sink.of_level(LogLevel::Warning).len(), 2);
        assert!(sink.has_level(LogLevel::Error));
        assert!(!sink.has_level(LogLevel::Info));
    }

    #[test]
    fn test_level_filtering() {
        let mut sink = DiagnosticSink::new(LogLevel::Error);
        sink.log(LogLevel::Debug, "trace");
        sink.warn("warn");
        sink.error("err");
        assert_eq!(sink.len(), 1);
        assert!(sink.has_level(LogLevel::Error));
    }

    #[test]
    fn test_off_suppresses_everything() {
        let mut sink = DiagnosticSink::new(LogLevel::Off);
        sink.error("err");
        sink.log(LogLevel::Off, "nothing");
        assert!(sink.is_empty());
    }

    #[test]
    fn test_display() {
        let d = Diagnostic::new(LogLevel::Error, "SPLINE abandoned");
        assert_eq!(format!("{}", d), "[Error] SPLINE abandoned");
    }
}
