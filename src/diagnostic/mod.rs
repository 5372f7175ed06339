//! # diagnostic: processing context, message routing and the halt signal
//!
//! Every pipeline step runs inside a named context frame (`DPM dictionary #0`,
//! `Code list exp_dom_hier`, ...). The [`DiagnosticBridge`] keeps that frame stack,
//! counts messages by [`Severity`] and forwards everything to a pluggable
//! [`DiagnosticConsumer`].
//!
//! ## Control flow
//! - [`DiagnosticBridge::fatal`] records the message and hands back [`Stop::Halt`]; callers
//!   return it with `?`/`Err(..)`, which unwinds every enclosing context frame.
//! - [`DiagnosticBridge::error`] records a recoverable problem; processing continues until the
//!   next [`DiagnosticBridge::halt_if_unrecoverable_errors`] checkpoint.
//! - Panics inside a context action are caught and reported as FATAL `Internal error.` messages.
//!
//! ## Consumers
//! - [`TracingConsumer`]: production consumer, narrates through `tracing`.
//! - [`DiagnosticCollector`]: records events as plain strings for assertions.

mod bridge;
mod consumer;

pub use bridge::DiagnosticBridge;
pub use consumer::{DiagnosticCollector, TracingConsumer};

use std::fmt;

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

use crate::validation::{ValidatableInfo, ValidationResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Fatal,
    Error,
    Info,
    Debug,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Fatal => "FATAL",
            Severity::Error => "ERROR",
            Severity::Info => "INFO",
            Severity::Debug => "DEBUG",
        };
        f.write_str(name)
    }
}

/// What a context frame is processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextType {
    CompileDpmDb,
    ReplaceDictionaryInDpmDb,
    CaptureSources,
    InitConfiguration,
    InitSource,
    InitRecorder,
    InitDpmDb,
    DpmSource,
    DpmDictionary,
    CodeList,
    SubCodeList,
    Extension,
    MapMetrics,
    MapExplicitDomains,
    MapTypedDomains,
    MapExplicitDimensions,
    MapTypedDimensions,
    WriteDpmDb,
}

impl ContextType {
    pub fn title(&self) -> &'static str {
        match self {
            ContextType::CompileDpmDb => "Compiling DPM database",
            ContextType::ReplaceDictionaryInDpmDb => "Replacing dictionaries in DPM database",
            ContextType::CaptureSources => "Capturing DPM sources",
            ContextType::InitConfiguration => "Source configuration",
            ContextType::InitSource => "Opening DPM source",
            ContextType::InitRecorder => "Opening capture target",
            ContextType::InitDpmDb => "Opening DPM database",
            ContextType::DpmSource => "DPM source",
            ContextType::DpmDictionary => "DPM dictionary",
            ContextType::CodeList => "Code list",
            ContextType::SubCodeList => "Sub code list",
            ContextType::Extension => "Extension",
            ContextType::MapMetrics => "Metrics",
            ContextType::MapExplicitDomains => "Explicit domains and hierarchies",
            ContextType::MapTypedDomains => "Typed domains",
            ContextType::MapExplicitDimensions => "Explicit dimensions",
            ContextType::MapTypedDimensions => "Typed dimensions",
            ContextType::WriteDpmDb => "Writing dictionaries to DPM database",
        }
    }
}

/// One frame on the context stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextInfo {
    pub context_type: ContextType,
    pub label: String,
    pub identifier: String,
    /// Position among consecutive sibling frames of the same type (0-based).
    pub recurrence_index: usize,
}

impl ContextInfo {
    pub fn describe(&self) -> String {
        [self.context_type.title(), self.label.as_str(), self.identifier.as_str()]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Signal that stops the current run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Stop {
    /// A FATAL was reported or a checkpoint found unrecoverable errors.
    #[error("processing halted")]
    Halt,
    /// The caller asked for something that cannot be done.
    #[error("{0}")]
    Fail(String),
}

pub type StopResult<T> = Result<T, Stop>;

/// Reports a collaborator error as FATAL and turns it into [`Stop::Halt`].
pub trait OrFatal<T> {
    fn or_fatal(self, diagnostic: &DiagnosticBridge) -> Result<T, Stop>;
}

impl<T, E: fmt::Display> OrFatal<T> for Result<T, E> {
    fn or_fatal(self, diagnostic: &DiagnosticBridge) -> Result<T, Stop> {
        self.map_err(|e| diagnostic.fatal(e.to_string()))
    }
}

/// Receives context transitions, messages and validation results.
///
/// `stack` is ordered bottom first; the current frame is the last element.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait DiagnosticConsumer {
    fn context_enter(&self, stack: &[ContextInfo]);

    fn context_exit(&self, stack: &[ContextInfo], retired: &ContextInfo);

    fn top_context_details_change(&self, stack: &[ContextInfo], original: &ContextInfo);

    fn message(&self, severity: Severity, message: &str);

    fn validation_results(&self, info: &ValidatableInfo, results: &[ValidationResult]);
}
