use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::RefCell;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};

use super::{ContextInfo, ContextType, DiagnosticConsumer, Severity, Stop};
use crate::validation::{collect_violations, Validatable};

#[derive(Default)]
struct BridgeState {
    stack: Vec<ContextInfo>,
    previous_retired: Option<ContextInfo>,
    counters: HashMap<Severity, usize>,
}

/// Context stack, severity counters and message routing for one run.
///
/// All methods take `&self` so the bridge can be shared by every step of a run;
/// it is intentionally not `Sync`.
pub struct DiagnosticBridge {
    consumer: Box<dyn DiagnosticConsumer>,
    state: RefCell<BridgeState>,
}

impl DiagnosticBridge {
    pub fn new(consumer: Box<dyn DiagnosticConsumer>) -> Self {
        Self {
            consumer,
            state: RefCell::new(BridgeState::default()),
        }
    }

    /// Runs `action` inside a new context frame.
    ///
    /// The frame is popped and its exit reported whether the action returns normally,
    /// stops, or panics. A panic is converted into a FATAL and [`Stop::Halt`].
    pub fn with_context<R>(
        &self,
        context_type: ContextType,
        label: impl Into<String>,
        identifier: impl Into<String>,
        action: impl FnOnce() -> Result<R, Stop>,
    ) -> Result<R, Stop> {
        self.enter(context_type, label.into(), identifier.into());

        let result = match panic::catch_unwind(AssertUnwindSafe(action)) {
            Ok(result) => result,
            Err(payload) => {
                let backtrace = Backtrace::force_capture();
                Err(self.fatal(format!(
                    "Internal error. {}\n{backtrace}",
                    panic_message(payload.as_ref())
                )))
            }
        };

        self.exit();
        result
    }

    fn enter(&self, context_type: ContextType, label: String, identifier: String) {
        let mut state = self.state.borrow_mut();

        let recurrence_index = match &state.previous_retired {
            Some(previous) if previous.context_type == context_type => {
                previous.recurrence_index + 1
            }
            _ => 0,
        };

        state.stack.push(ContextInfo {
            context_type,
            label,
            identifier,
            recurrence_index,
        });

        self.consumer.context_enter(&state.stack);
    }

    fn exit(&self) {
        let mut state = self.state.borrow_mut();
        if let Some(retired) = state.stack.pop() {
            self.consumer.context_exit(&state.stack, &retired);
            state.previous_retired = Some(retired);
        }
    }

    /// Replaces label and identifier of the current frame, once they become known.
    pub fn update_current_context_details(
        &self,
        label: Option<String>,
        identifier: Option<String>,
    ) {
        let mut state = self.state.borrow_mut();
        let Some(top) = state.stack.last_mut() else {
            return;
        };

        let original = top.clone();
        if let Some(label) = label {
            top.label = label;
        }
        if let Some(identifier) = identifier {
            top.identifier = identifier;
        }

        self.consumer
            .top_context_details_change(&state.stack, &original);
    }

    pub fn context_stack(&self) -> Vec<ContextInfo> {
        self.state.borrow().stack.clone()
    }

    fn record(&self, severity: Severity, message: &str) {
        *self
            .state
            .borrow_mut()
            .counters
            .entry(severity)
            .or_insert(0) += 1;
        self.consumer.message(severity, message);
    }

    /// Records an unrecoverable problem and returns the signal that stops the run.
    #[must_use = "the returned Stop must be propagated to halt processing"]
    pub fn fatal(&self, message: impl AsRef<str>) -> Stop {
        self.record(Severity::Fatal, message.as_ref());
        Stop::Halt
    }

    pub fn error(&self, message: impl AsRef<str>) {
        self.record(Severity::Error, message.as_ref());
    }

    pub fn info(&self, message: impl AsRef<str>) {
        self.record(Severity::Info, message.as_ref());
    }

    pub fn debug(&self, message: impl AsRef<str>) {
        self.record(Severity::Debug, message.as_ref());
    }

    /// Validates `subject` in one pass; any violations count as a single ERROR.
    pub fn validate(&self, subject: &dyn Validatable) {
        let results = collect_violations(subject);
        if results.is_empty() {
            return;
        }

        *self
            .state
            .borrow_mut()
            .counters
            .entry(Severity::Error)
            .or_insert(0) += 1;
        self.consumer
            .validation_results(&subject.validatable_info(), &results);
    }

    pub fn validate_all<V: Validatable>(&self, subjects: &[V]) {
        for subject in subjects {
            self.validate(subject);
        }
    }

    /// Checkpoint: stops the run if any FATAL or ERROR has been recorded so far.
    pub fn halt_if_unrecoverable_errors(
        &self,
        message: impl FnOnce() -> String,
    ) -> Result<(), Stop> {
        if self.has_unrecoverable_errors() {
            self.info(message());
            return Err(Stop::Halt);
        }
        Ok(())
    }

    pub fn has_unrecoverable_errors(&self) -> bool {
        self.counter(Severity::Fatal) > 0 || self.counter(Severity::Error) > 0
    }

    pub fn counter(&self, severity: Severity) -> usize {
        self.state
            .borrow()
            .counters
            .get(&severity)
            .copied()
            .unwrap_or(0)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
