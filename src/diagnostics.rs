//! Side-channel events raised while normalizing results.
//!
//! "No match" and "several matches" are not errors, but operators usually
//! want to know about them. They are reported to a [`DiagnosticsSink`],
//! which is fire-and-forget: it returns nothing and must not block.

use serde::Serialize;
use serde_json::{Map, Value};

/// How much attention a diagnostic deserves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Expected, but worth recording.
    Info,
    /// Something may need a closer look.
    Warning,
}

/// A single diagnostic event with free-form context.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub extras: Map<String, Value>,
}

impl Diagnostic {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            message: message.into(),
            extras: Map::new(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            extras: Map::new(),
        }
    }

    /// Attaches a context value.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extras.insert(key.into(), value.into());
        self
    }
}

/// Receives diagnostics.
///
/// Implementations must not panic or block; a sink that forwards to a remote
/// service should queue and return.
pub trait DiagnosticsSink: Send + Sync {
    fn capture(&self, diagnostic: &Diagnostic);
}

/// Logs diagnostics through `tracing`. The client's default sink.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticsSink for TracingSink {
    fn capture(&self, diagnostic: &Diagnostic) {
        let extras = Value::Object(diagnostic.extras.clone());
        match diagnostic.severity {
            Severity::Info => {
                tracing::info!(extras = %extras, "{}", diagnostic.message)
            }
            Severity::Warning => {
                tracing::warn!(extras = %extras, "{}", diagnostic.message)
            }
        }
    }
}

/// Discards every diagnostic.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl DiagnosticsSink for NoopSink {
    fn capture(&self, _diagnostic: &Diagnostic) {}
}
