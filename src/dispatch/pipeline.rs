//! Per-request execution pipeline.
//!
//! Stages always run in the order middleware → before-filter → action →
//! after-filter. A predicate returning `false` in the first two stages
//! halts the pipeline; that is a normal [`PipelineOutcome`], not an error.

use crate::config::DispatchConfig;
use crate::core::context::RequestId;
use crate::core::error::{DispatchError, DispatchResult};
use crate::core::types::Value;
use crate::dispatch::actions::{ActionTable, Controller};
use crate::dispatch::trace::{PipelineEvent, PipelineTracker, TraceCallback};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Guard run by the pipeline. Returning `false` halts it.
pub type Predicate = Box<dyn FnMut() -> bool>;

/// Stage at which a pipeline halted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HaltStage {
    /// A global middleware step returned false.
    Middleware,
    /// The action's before-filter returned false.
    BeforeFilter,
}

impl fmt::Display for HaltStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HaltStage::Middleware => f.write_str("middleware"),
            HaltStage::BeforeFilter => f.write_str("before-filter"),
        }
    }
}

/// Result of running the pipeline for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PipelineOutcome {
    /// Every stage ran.
    Completed,
    /// A guard returned false; later stages did not run.
    Halted {
        /// Stage whose guard returned false.
        stage: HaltStage,
    },
}

impl PipelineOutcome {
    /// Whether the pipeline ran to completion.
    pub fn is_completed(&self) -> bool {
        matches!(self, PipelineOutcome::Completed)
    }

    /// The halting stage, if the pipeline halted.
    pub fn halted_at(&self) -> Option<HaltStage> {
        match self {
            PipelineOutcome::Halted { stage } => Some(*stage),
            PipelineOutcome::Completed => None,
        }
    }
}

/// Dispatch options.
#[derive(Clone, Default)]
pub struct DispatchOptions {
    /// Report `ActionNotFound` instead of skipping a missing action.
    pub strict_actions: bool,
    /// Pipeline event callback.
    pub trace_callback: Option<Arc<TraceCallback>>,
}

impl fmt::Debug for DispatchOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchOptions")
            .field("strict_actions", &self.strict_actions)
            .field("trace_callback", &self.trace_callback.as_ref().map(|_| "<callback>"))
            .finish()
    }
}

impl DispatchOptions {
    /// Create default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable/disable strict action lookup.
    pub fn with_strict_actions(mut self, strict: bool) -> Self {
        self.strict_actions = strict;
        self
    }

    /// Set trace callback.
    pub fn with_trace<F>(mut self, callback: F) -> Self
    where
        F: Fn(PipelineEvent) + Send + Sync + 'static,
    {
        self.trace_callback = Some(Arc::new(Box::new(callback)));
        self
    }
}

impl From<&DispatchConfig> for DispatchOptions {
    fn from(config: &DispatchConfig) -> Self {
        Self::new().with_strict_actions(config.strict_actions)
    }
}

/// Runs middleware, filters and the action for one request.
///
/// A dispatcher owns the controller it dispatches to and lives for a single
/// request; registrations are never shared between requests.
pub struct Dispatcher<C> {
    controller: C,
    actions: ActionTable<C>,
    middleware: Vec<Predicate>,
    before_filters: IndexMap<String, Predicate>,
    after_filters: IndexMap<String, Predicate>,
    options: DispatchOptions,
    request_id: RequestId,
}

impl<C> Dispatcher<C> {
    /// Create a dispatcher for a controller and its action table.
    pub fn new(controller: C, actions: ActionTable<C>) -> Self {
        Self {
            controller,
            actions,
            middleware: Vec::new(),
            before_filters: IndexMap::new(),
            after_filters: IndexMap::new(),
            options: DispatchOptions::default(),
            request_id: RequestId::new(),
        }
    }

    /// Set options.
    pub fn with_options(mut self, options: DispatchOptions) -> Self {
        self.options = options;
        self
    }

    /// Use a specific request ID in events and log lines.
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = request_id;
        self
    }

    /// Append a global middleware step.
    pub fn register_middleware<F>(&mut self, step: F) -> &mut Self
    where
        F: FnMut() -> bool + 'static,
    {
        self.middleware.push(Box::new(step));
        self
    }

    /// Bind the before-filter of an action, replacing any previous one.
    pub fn register_before_filter<F>(&mut self, action: impl Into<String>, filter: F) -> &mut Self
    where
        F: FnMut() -> bool + 'static,
    {
        self.before_filters.insert(action.into(), Box::new(filter));
        self
    }

    /// Bind the after-filter of an action, replacing any previous one.
    pub fn register_after_filter<F>(&mut self, action: impl Into<String>, filter: F) -> &mut Self
    where
        F: FnMut() -> bool + 'static,
    {
        self.after_filters.insert(action.into(), Box::new(filter));
        self
    }

    /// Run the pipeline for `action` with positional `params`.
    ///
    /// Returns `Halted` when a middleware step or the before-filter returns
    /// false. Errors from the action handler are returned as-is and skip the
    /// after-filter.
    pub fn execute(&mut self, action: &str, params: &[Value]) -> DispatchResult<PipelineOutcome> {
        let mut tracker = PipelineTracker::new(self.request_id)
            .with_callback(self.options.trace_callback.clone());
        tracker.start(action);

        let total = self.middleware.len();
        for (index, step) in self.middleware.iter_mut().enumerate() {
            if !step() {
                tracker.emit(PipelineEvent::Halted {
                    stage: HaltStage::Middleware,
                    index: Some(index),
                });
                return Ok(PipelineOutcome::Halted {
                    stage: HaltStage::Middleware,
                });
            }
            tracker.emit(PipelineEvent::MiddlewarePassed { index, total });
        }

        if let Some(filter) = self.before_filters.get_mut(action) {
            if !filter() {
                tracker.emit(PipelineEvent::Halted {
                    stage: HaltStage::BeforeFilter,
                    index: None,
                });
                return Ok(PipelineOutcome::Halted {
                    stage: HaltStage::BeforeFilter,
                });
            }
            tracker.emit(PipelineEvent::BeforeFilterPassed {
                action: action.to_string(),
            });
        }

        match self.actions.get(action) {
            Some(handler) => {
                tracker.emit(PipelineEvent::ActionInvoked {
                    action: action.to_string(),
                    params: params.len(),
                });
                if let Err(source) = handler(&mut self.controller, params) {
                    tracker.emit(PipelineEvent::ActionFailed {
                        action: action.to_string(),
                        message: source.to_string(),
                    });
                    return Err(DispatchError::ActionFailed {
                        action: action.to_string(),
                        source,
                    });
                }
            }
            None => {
                tracker.emit(PipelineEvent::ActionMissing {
                    action: action.to_string(),
                });
                if self.options.strict_actions {
                    return Err(DispatchError::ActionNotFound {
                        action: action.to_string(),
                    });
                }
                log::warn!(
                    "[{}] no handler for action '{}'; skipping",
                    self.request_id,
                    action
                );
            }
        }

        if let Some(filter) = self.after_filters.get_mut(action) {
            let result = filter();
            tracker.emit(PipelineEvent::AfterFilterRan {
                action: action.to_string(),
                result,
            });
        }

        tracker.complete(action);
        Ok(PipelineOutcome::Completed)
    }

    /// The controller.
    pub fn controller(&self) -> &C {
        &self.controller
    }

    /// The controller, mutably.
    pub fn controller_mut(&mut self) -> &mut C {
        &mut self.controller
    }

    /// Consume the dispatcher and return its controller.
    pub fn into_controller(self) -> C {
        self.controller
    }

    /// The request this dispatcher serves.
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// The action table.
    pub fn actions(&self) -> &ActionTable<C> {
        &self.actions
    }

    /// Number of registered middleware steps.
    pub fn middleware_count(&self) -> usize {
        self.middleware.len()
    }

    /// Check if an action has a before-filter.
    pub fn has_before_filter(&self, action: &str) -> bool {
        self.before_filters.contains_key(action)
    }

    /// Check if an action has an after-filter.
    pub fn has_after_filter(&self, action: &str) -> bool {
        self.after_filters.contains_key(action)
    }
}

impl<C: Controller> Dispatcher<C> {
    /// Create a dispatcher using the controller's own action table.
    pub fn for_controller(controller: C) -> Self {
        Self::new(controller, C::actions())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use proptest::prelude::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Controller recording every call into a shared log.
    struct Recorder {
        log: Rc<RefCell<Vec<String>>>,
    }

    impl Controller for Recorder {
        fn actions() -> ActionTable<Self> {
            ActionTable::new()
                .with("save", |c: &mut Recorder, params| {
                    c.log.borrow_mut().push(format!("save:{}", params.len()));
                    Ok(())
                })
                .with("fail", |c: &mut Recorder, _| {
                    c.log.borrow_mut().push("fail".to_string());
                    anyhow::bail!("storage unavailable")
                })
        }
    }

    fn recorder() -> (Dispatcher<Recorder>, Rc<RefCell<Vec<String>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let dispatcher = Dispatcher::for_controller(Recorder { log: Rc::clone(&log) });
        (dispatcher, log)
    }

    fn step(log: &Rc<RefCell<Vec<String>>>, name: &str, result: bool) -> impl FnMut() -> bool {
        let log = Rc::clone(log);
        let name = name.to_string();
        move || {
            log.borrow_mut().push(name.clone());
            result
        }
    }

    #[test]
    fn test_stage_order() {
        let (mut dispatcher, log) = recorder();
        dispatcher
            .register_middleware(step(&log, "m0", true))
            .register_middleware(step(&log, "m1", true))
            .register_before_filter("save", step(&log, "before", true))
            .register_after_filter("save", step(&log, "after", true));

        let outcome = dispatcher.execute("save", &[Value::from(1), Value::from("x")]).unwrap();

        assert_eq!(outcome, PipelineOutcome::Completed);
        assert_eq!(*log.borrow(), vec!["m0", "m1", "before", "save:2", "after"]);
    }

    #[test]
    fn test_middleware_halt_stops_everything_after() {
        let (mut dispatcher, log) = recorder();
        dispatcher
            .register_middleware(step(&log, "m0", true))
            .register_middleware(step(&log, "m1", false))
            .register_middleware(step(&log, "m2", true))
            .register_before_filter("save", step(&log, "before", true))
            .register_after_filter("save", step(&log, "after", true));

        let outcome = dispatcher.execute("save", &[]).unwrap();

        assert_eq!(
            outcome,
            PipelineOutcome::Halted {
                stage: HaltStage::Middleware
            }
        );
        assert_eq!(*log.borrow(), vec!["m0", "m1"]);
    }

    #[test]
    fn test_before_filter_halt() {
        let (mut dispatcher, log) = recorder();
        dispatcher
            .register_before_filter("save", step(&log, "before", false))
            .register_after_filter("save", step(&log, "after", true));

        let outcome = dispatcher.execute("save", &[]).unwrap();

        assert_eq!(outcome.halted_at(), Some(HaltStage::BeforeFilter));
        assert_eq!(*log.borrow(), vec!["before"]);
    }

    #[test]
    fn test_after_filter_result_is_ignored() {
        let (mut dispatcher, log) = recorder();
        dispatcher.register_after_filter("save", step(&log, "after", false));

        let outcome = dispatcher.execute("save", &[]).unwrap();

        assert!(outcome.is_completed());
        assert_eq!(*log.borrow(), vec!["save:0", "after"]);
    }

    #[test]
    fn test_filters_are_bound_per_action() {
        let (mut dispatcher, log) = recorder();
        dispatcher.register_before_filter("other", step(&log, "other-before", false));

        assert!(dispatcher.execute("save", &[]).unwrap().is_completed());
        assert_eq!(*log.borrow(), vec!["save:0"]);
    }

    #[test]
    fn test_before_filter_registration_replaces() {
        let (mut dispatcher, log) = recorder();
        dispatcher
            .register_before_filter("save", step(&log, "first", false))
            .register_before_filter("save", step(&log, "second", true));

        assert!(dispatcher.execute("save", &[]).unwrap().is_completed());
        assert_eq!(*log.borrow(), vec!["second", "save:0"]);
    }

    #[test]
    fn test_after_filter_registration_replaces() {
        let (mut dispatcher, log) = recorder();
        dispatcher
            .register_after_filter("save", step(&log, "first", true))
            .register_after_filter("save", step(&log, "second", true));

        assert!(dispatcher.execute("save", &[]).unwrap().is_completed());
        assert_eq!(*log.borrow(), vec!["save:0", "second"]);
    }

    #[test]
    fn test_missing_action_is_noop_by_default() {
        let (mut dispatcher, log) = recorder();
        dispatcher.register_after_filter("ghost", step(&log, "after", true));

        let outcome = dispatcher.execute("ghost", &[]).unwrap();

        assert!(outcome.is_completed());
        assert_eq!(*log.borrow(), vec!["after"]);
    }

    #[test]
    fn test_missing_action_strict() {
        let (dispatcher, log) = recorder();
        let mut dispatcher = dispatcher.with_options(DispatchOptions::new().with_strict_actions(true));
        dispatcher.register_after_filter("ghost", step(&log, "after", true));

        let err = dispatcher.execute("ghost", &[]).unwrap_err();

        assert!(matches!(err, DispatchError::ActionNotFound { ref action } if action == "ghost"));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_action_error_propagates_and_skips_after_filter() {
        let (mut dispatcher, log) = recorder();
        dispatcher.register_after_filter("fail", step(&log, "after", true));

        let err = dispatcher.execute("fail", &[]).unwrap_err();

        match err {
            DispatchError::ActionFailed { action, source } => {
                assert_eq!(action, "fail");
                assert_eq!(source.to_string(), "storage unavailable");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(*log.borrow(), vec!["fail"]);
    }

    #[test]
    fn test_middleware_side_effects_are_kept_on_halt() {
        let counter = Rc::new(RefCell::new(0));
        let (mut dispatcher, _log) = recorder();
        let c = Rc::clone(&counter);
        dispatcher
            .register_middleware(move || {
                *c.borrow_mut() += 1;
                true
            })
            .register_middleware(|| false);

        dispatcher.execute("save", &[]).unwrap();
        dispatcher.execute("save", &[]).unwrap();
        assert_eq!(*counter.borrow(), 2);
    }

    #[test]
    fn test_trace_events() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let (dispatcher, _log) = recorder();
        let mut dispatcher = dispatcher
            .with_options(DispatchOptions::new().with_trace(move |e| sink.lock().push(e)));
        dispatcher
            .register_middleware(|| true)
            .register_after_filter("save", || false);

        dispatcher.execute("save", &[Value::from(1)]).unwrap();

        let events = events.lock();
        assert!(matches!(events[0], PipelineEvent::Started { .. }));
        assert_eq!(events[1], PipelineEvent::MiddlewarePassed { index: 0, total: 1 });
        assert_eq!(
            events[2],
            PipelineEvent::ActionInvoked {
                action: "save".to_string(),
                params: 1
            }
        );
        assert_eq!(
            events[3],
            PipelineEvent::AfterFilterRan {
                action: "save".to_string(),
                result: false
            }
        );
        assert!(matches!(events[4], PipelineEvent::Completed { .. }));
    }

    #[test]
    fn test_outcome_serialization() {
        let halted = PipelineOutcome::Halted {
            stage: HaltStage::BeforeFilter,
        };
        assert_eq!(
            serde_json::to_string(&halted).unwrap(),
            r#"{"outcome":"halted","stage":"before_filter"}"#
        );
        assert_eq!(
            serde_json::to_string(&PipelineOutcome::Completed).unwrap(),
            r#"{"outcome":"completed"}"#
        );
    }

    proptest! {
        #[test]
        fn prop_first_false_middleware_halts(results in proptest::collection::vec(any::<bool>(), 0..8)) {
            let (mut dispatcher, log) = recorder();
            for (i, passes) in results.iter().enumerate() {
                dispatcher.register_middleware(step(&log, &format!("m{i}"), *passes));
            }
            dispatcher.register_before_filter("save", step(&log, "before", true));

            let outcome = dispatcher.execute("save", &[]).unwrap();

            match results.iter().position(|passes| !passes) {
                Some(first) => {
                    prop_assert_eq!(outcome, PipelineOutcome::Halted { stage: HaltStage::Middleware });
                    let expected: Vec<String> = (0..=first).map(|i| format!("m{i}")).collect();
                    prop_assert_eq!(log.borrow().clone(), expected);
                }
                None => {
                    prop_assert_eq!(outcome, PipelineOutcome::Completed);
                    let tail: Vec<String> = log.borrow()[results.len()..].to_vec();
                    prop_assert_eq!(tail, vec!["before".to_string(), "save:0".to_string()]);
                }
            }
        }
    }
}
