//! Controller dispatch.
//!
//! This module runs one request through a controller: global middleware,
//! the action's before-filter, the action handler and its after-filter.

pub mod actions;
pub mod pipeline;
pub mod redirect;
pub mod trace;

pub use actions::{ActionHandler, ActionTable, Controller};
pub use pipeline::{DispatchOptions, Dispatcher, HaltStage, PipelineOutcome, Predicate};
pub use redirect::Redirect;
pub use trace::{PipelineEvent, PipelineTracker, TraceCallback};
