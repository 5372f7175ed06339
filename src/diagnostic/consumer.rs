use std::sync::{Arc, Mutex};

use tracing::{debug, error, info};

use super::{ContextInfo, DiagnosticConsumer, Severity};
use crate::validation::{ValidatableInfo, ValidationResult};

/// Narrates the run through `tracing`, indenting by context depth.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingConsumer;

fn indent(depth: usize) -> String {
    "  ".repeat(depth.saturating_sub(1))
}

impl DiagnosticConsumer for TracingConsumer {
    fn context_enter(&self, stack: &[ContextInfo]) {
        if let Some(top) = stack.last() {
            info!(
                context_type = ?top.context_type,
                depth = stack.len(),
                recurrence = top.recurrence_index,
                label = %top.label,
                identifier = %top.identifier,
                "{}{}",
                indent(stack.len()),
                top.describe()
            );
        }
    }

    fn context_exit(&self, stack: &[ContextInfo], retired: &ContextInfo) {
        debug!(
            context_type = ?retired.context_type,
            depth = stack.len() + 1,
            "{}{}: done",
            indent(stack.len() + 1),
            retired.context_type.title()
        );
    }

    fn top_context_details_change(&self, stack: &[ContextInfo], original: &ContextInfo) {
        if let Some(top) = stack.last() {
            info!(
                context_type = ?top.context_type,
                depth = stack.len(),
                previous = %original.describe(),
                "{}{}",
                indent(stack.len()),
                top.describe()
            );
        }
    }

    fn message(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Fatal => error!(severity = %severity, "{message}"),
            Severity::Error => error!(severity = %severity, "{message}"),
            Severity::Info => info!("{message}"),
            Severity::Debug => debug!("{message}"),
        }
    }

    fn validation_results(&self, info: &ValidatableInfo, results: &[ValidationResult]) {
        error!(
            object_kind = %info.object_kind,
            object_address = %info.object_address,
            violations = results.len(),
            "Validation failed for {} {}",
            info.object_kind,
            info.object_address
        );
        for result in results {
            error!(
                object_kind = %result.object_kind,
                object_address = %result.object_address,
                property = %result.property,
                "  {result}"
            );
        }
    }
}

/// Records every diagnostic event as a line of text.
///
/// Clones share the same event log, so a test keeps one handle and boxes another
/// into the bridge.
#[derive(Debug, Default, Clone)]
pub struct DiagnosticCollector {
    events: Arc<Mutex<Vec<String>>>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<String> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Messages only, as `[SEVERITY] text`.
    pub fn messages(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| event.strip_prefix("MESSAGE ").map(str::to_string))
            .collect()
    }

    pub fn events_joined(&self) -> String {
        self.events().join("\n")
    }

    fn push(&self, event: String) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl DiagnosticConsumer for DiagnosticCollector {
    fn context_enter(&self, stack: &[ContextInfo]) {
        if let Some(top) = stack.last() {
            self.push(format!(
                "ENTER [{:?}] #{} [{}] [{}]",
                top.context_type, top.recurrence_index, top.label, top.identifier
            ));
        }
    }

    fn context_exit(&self, _stack: &[ContextInfo], retired: &ContextInfo) {
        self.push(format!("EXIT [{:?}]", retired.context_type));
    }

    fn top_context_details_change(&self, stack: &[ContextInfo], _original: &ContextInfo) {
        if let Some(top) = stack.last() {
            self.push(format!(
                "UPDATE [{:?}] [{}] [{}]",
                top.context_type, top.label, top.identifier
            ));
        }
    }

    fn message(&self, severity: Severity, message: &str) {
        self.push(format!("MESSAGE [{severity}] [{message}]"));
    }

    fn validation_results(&self, info: &ValidatableInfo, results: &[ValidationResult]) {
        for result in results {
            self.push(format!(
                "VALIDATION [{} {}] [{result}]",
                info.object_kind, info.object_address
            ));
        }
    }
}
