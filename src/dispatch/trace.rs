//! Pipeline tracing.
//!
//! Every transition of the dispatch pipeline is reported as a
//! [`PipelineEvent`], logged and forwarded to an optional callback.

use crate::core::context::RequestId;
use crate::dispatch::pipeline::HaltStage;
use std::sync::Arc;
use std::time::Instant;

/// A pipeline transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    /// Pipeline started for an action.
    Started {
        /// Request being served.
        request_id: RequestId,
        /// Requested action.
        action: String,
    },
    /// A middleware step returned true.
    MiddlewarePassed {
        /// Position of the step.
        index: usize,
        /// Number of registered steps.
        total: usize,
    },
    /// The before-filter bound to the action returned true.
    BeforeFilterPassed {
        /// Action the filter is bound to.
        action: String,
    },
    /// The pipeline stopped early.
    Halted {
        /// Stage that halted.
        stage: HaltStage,
        /// Position of the middleware that halted, if any.
        index: Option<usize>,
    },
    /// The action handler is about to run.
    ActionInvoked {
        /// Action name.
        action: String,
        /// Number of positional parameters.
        params: usize,
    },
    /// No handler is registered for the action.
    ActionMissing {
        /// Action name.
        action: String,
    },
    /// The action handler returned an error.
    ActionFailed {
        /// Action name.
        action: String,
        /// Rendered handler error.
        message: String,
    },
    /// The after-filter ran; its result is informational only.
    AfterFilterRan {
        /// Action the filter is bound to.
        action: String,
        /// Value the filter returned.
        result: bool,
    },
    /// Pipeline finished without halting.
    Completed {
        /// Action name.
        action: String,
        /// Wall time of the whole pipeline.
        duration_ms: u64,
    },
}

/// Callback type for pipeline events.
pub type TraceCallback = Box<dyn Fn(PipelineEvent) + Send + Sync>;

/// Emits pipeline events for one request.
pub struct PipelineTracker {
    request_id: RequestId,
    callback: Option<Arc<TraceCallback>>,
    start_time: Option<Instant>,
}

impl PipelineTracker {
    /// Create a tracker for a request.
    pub fn new(request_id: RequestId) -> Self {
        Self {
            request_id,
            callback: None,
            start_time: None,
        }
    }

    /// Set a callback for events.
    pub fn with_callback(mut self, callback: Option<Arc<TraceCallback>>) -> Self {
        self.callback = callback;
        self
    }

    /// The request this tracker reports for.
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Start timing and report the start.
    pub fn start(&mut self, action: &str) {
        self.start_time = Some(Instant::now());
        self.emit(PipelineEvent::Started {
            request_id: self.request_id,
            action: action.to_string(),
        });
    }

    /// Milliseconds since [`start`](Self::start).
    pub fn elapsed_ms(&self) -> u64 {
        self.start_time
            .map(|t| t.elapsed().as_millis() as u64)
            .unwrap_or(0)
    }

    /// Report that the pipeline completed.
    pub fn complete(&self, action: &str) {
        self.emit(PipelineEvent::Completed {
            action: action.to_string(),
            duration_ms: self.elapsed_ms(),
        });
    }

    /// Log an event and forward it to the callback.
    pub fn emit(&self, event: PipelineEvent) {
        match &event {
            PipelineEvent::Halted { .. } | PipelineEvent::ActionMissing { .. } => {
                log::debug!("[{}] {:?}", self.request_id, event)
            }
            PipelineEvent::ActionFailed { action, message } => {
                log::warn!("[{}] action '{}' failed: {}", self.request_id, action, message)
            }
            _ => log::trace!("[{}] {:?}", self.request_id, event),
        }

        if let Some(callback) = &self.callback {
            callback(event);
        }
    }
}
