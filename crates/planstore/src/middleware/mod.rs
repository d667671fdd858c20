//! Middleware system
//!
//! Middleware sits around reducer execution, allowing side effects, logging
//! and other cross-cutting concerns to be handled in a composable way.
//!
//! ## Design
//!
//! ```text
//! Action → Middleware (pre) → … → Reducer → … → Middleware (post) → State swap
//! ```
//!
//! The state swap happens only after the outermost middleware has returned
//! `Ok`, so an error in any post phase still aborts the dispatch with the
//! state unchanged. During the post phase the store still holds the previous
//! state; the reduced one is available through [`Reduced::state`].
//!
//! Each middleware receives a [`Next`] representing the rest of the chain,
//! terminal reducer included. `Next` is consumed when called, so a middleware
//! can forward at most once. It can:
//! - Inspect the action and current state
//! - Queue follow-up actions via the [`Dispatcher`]
//! - Forward a (possibly rewritten) action with [`Next::run`]
//! - Short-circuit with [`Next::skip`], leaving the state untouched
//! - Abort the dispatch by returning an error
//!
//! ## Example
//!
//! ```ignore
//! struct AuditMiddleware;
//!
//! impl Middleware<AppState, AppAction> for AuditMiddleware {
//!     fn handle(
//!         &mut self,
//!         action: &AppAction,
//!         _state: &AppState,
//!         _dispatcher: &Dispatcher<AppState, AppAction>,
//!         next: Next<'_, AppState, AppAction>,
//!     ) -> Result<Reduced<AppState>, DispatchError> {
//!         let reduced = next.run(action)?;
//!         log::info!("{:?} reduced, changed: {}", action, !reduced.is_skipped());
//!         Ok(reduced)
//!     }
//! }
//! ```

use crate::error::DispatchError;
use crate::reducer::Reducer;

// Module declarations
mod combined;
mod dispatcher;
mod handle_action;
mod logging;

// Re-exports
pub use combined::CombinedMiddleware;
pub use dispatcher::Dispatcher;
pub use handle_action::{filter, handle_action, Filter, HandleAction};
pub use logging::LoggingMiddleware;

/// Boxed middleware as stored in a chain
pub type BoxedMiddleware<S, A> = Box<dyn Middleware<S, A>>;

/// Middleware trait - intercepts plain actions around the reducer
///
/// Middleware is called in registration order for each plain action. The
/// store serializes dispatches, so `&mut self` is never shared.
pub trait Middleware<S, A>: Send {
    /// Handle an action
    ///
    /// # Parameters
    /// - `action`: The plain action being dispatched
    /// - `state`: State before this action (read-only)
    /// - `dispatcher`: Queues follow-up actions, sent after this one commits
    /// - `next`: The rest of the chain
    ///
    /// # Returns
    /// The [`Reduced`] produced by `next`, or an error to abort the dispatch.
    fn handle(
        &mut self,
        action: &A,
        state: &S,
        dispatcher: &Dispatcher<S, A>,
        next: Next<'_, S, A>,
    ) -> Result<Reduced<S>, DispatchError>;

    /// Name used in error reports and logs
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Outcome of running the rest of a middleware chain
///
/// Only the chain can produce one, so middleware can look at the reduced
/// state but never hand back a state of its own.
#[derive(Debug)]
pub struct Reduced<S> {
    state: Option<S>,
}

impl<S> Reduced<S> {
    fn committed(state: S) -> Self {
        Self { state: Some(state) }
    }

    fn skipped() -> Self {
        Self { state: None }
    }

    /// State that will be committed, `None` when the chain was short-circuited
    pub fn state(&self) -> Option<&S> {
        self.state.as_ref()
    }

    pub fn is_skipped(&self) -> bool {
        self.state.is_none()
    }

    pub(crate) fn into_state(self) -> Option<S> {
        self.state
    }
}

/// The remainder of a middleware chain, ending in the reducer
pub struct Next<'a, S, A> {
    rest: &'a mut [BoxedMiddleware<S, A>],
    tail: Tail<'a, S, A>,
    state: &'a S,
    dispatcher: &'a Dispatcher<S, A>,
}

enum Tail<'a, S, A> {
    Reduce(&'a dyn Reducer<S, A>),
    /// Continue into the chain that contains a nested combined middleware
    Outer(Box<Next<'a, S, A>>),
}

impl<'a, S: Clone, A> Next<'a, S, A> {
    pub(crate) fn new(
        chain: &'a mut [BoxedMiddleware<S, A>],
        reducer: &'a dyn Reducer<S, A>,
        state: &'a S,
        dispatcher: &'a Dispatcher<S, A>,
    ) -> Self {
        Self {
            rest: chain,
            tail: Tail::Reduce(reducer),
            state,
            dispatcher,
        }
    }

    fn nested(
        chain: &'a mut [BoxedMiddleware<S, A>],
        outer: Next<'a, S, A>,
        state: &'a S,
        dispatcher: &'a Dispatcher<S, A>,
    ) -> Self {
        Self {
            rest: chain,
            tail: Tail::Outer(Box::new(outer)),
            state,
            dispatcher,
        }
    }

    /// Run the rest of the chain for `action`
    pub fn run(self, action: &A) -> Result<Reduced<S>, DispatchError> {
        let Next {
            rest,
            tail,
            state,
            dispatcher,
        } = self;

        match rest.split_first_mut() {
            Some((middleware, rest)) => {
                let next = Next {
                    rest,
                    tail,
                    state,
                    dispatcher,
                };
                middleware.handle(action, state, dispatcher, next)
            }
            None => match tail {
                Tail::Reduce(reducer) => reducer
                    .try_reduce(state.clone(), action)
                    .map(Reduced::committed)
                    .map_err(DispatchError::Reducer),
                Tail::Outer(outer) => outer.run(action),
            },
        }
    }

    /// Stop here: no reduction, state stays as it is
    pub fn skip(self) -> Reduced<S> {
        Reduced::skipped()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use parking_lot::Mutex;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Total(i64);

    #[derive(Debug)]
    enum Msg {
        Add(i64),
        Fail,
    }

    fn total(state: Total, action: &Msg) -> Total {
        match action {
            Msg::Add(n) => Total(state.0 + n),
            Msg::Fail => state,
        }
    }

    /// Records `<tag>:pre` / `<tag>:post` around forwarding
    struct Recorder {
        tag: &'static str,
        trace: Arc<Mutex<Vec<String>>>,
    }

    impl Middleware<Total, Msg> for Recorder {
        fn handle(
            &mut self,
            action: &Msg,
            _state: &Total,
            _dispatcher: &Dispatcher<Total, Msg>,
            next: Next<'_, Total, Msg>,
        ) -> Result<Reduced<Total>, DispatchError> {
            self.trace.lock().push(format!("{}:pre", self.tag));
            if let Msg::Fail = action {
                return Err(DispatchError::middleware(self.tag, anyhow::anyhow!("boom")));
            }
            let reduced = next.run(action)?;
            self.trace.lock().push(format!("{}:post", self.tag));
            Ok(reduced)
        }
    }

    fn run_chain(
        chain: &mut [BoxedMiddleware<Total, Msg>],
        state: &Total,
        action: &Msg,
    ) -> Result<Reduced<Total>, DispatchError> {
        let dispatcher = Dispatcher::new();
        Next::new(chain, &total, state, &dispatcher).run(action)
    }

    #[test]
    fn test_chain_runs_in_registration_order() {
        let trace = Arc::new(Mutex::new(Vec::new()));
        let mut chain: Vec<BoxedMiddleware<Total, Msg>> = ["a", "b", "c"]
            .into_iter()
            .map(|tag| {
                Box::new(Recorder {
                    tag,
                    trace: trace.clone(),
                }) as BoxedMiddleware<Total, Msg>
            })
            .collect();

        let reduced = run_chain(&mut chain, &Total(1), &Msg::Add(2)).unwrap();
        assert_eq!(reduced.state(), Some(&Total(3)));
        assert_eq!(
            *trace.lock(),
            vec!["a:pre", "b:pre", "c:pre", "c:post", "b:post", "a:post"]
        );
    }

    #[test]
    fn test_empty_chain_reduces() {
        let reduced = run_chain(&mut [], &Total(0), &Msg::Add(5)).unwrap();
        assert!(!reduced.is_skipped());
        assert_eq!(reduced.into_state(), Some(Total(5)));
    }

    #[test]
    fn test_middleware_error_aborts_chain() {
        let trace = Arc::new(Mutex::new(Vec::new()));
        let mut chain: Vec<BoxedMiddleware<Total, Msg>> = vec![Box::new(Recorder {
            tag: "guard",
            trace: trace.clone(),
        })];

        let err = run_chain(&mut chain, &Total(0), &Msg::Fail).unwrap_err();
        assert!(err.is_reduction());
        assert_eq!(*trace.lock(), vec!["guard:pre"]);
    }

    #[test]
    fn test_middleware_can_rewrite_action() {
        struct Double;

        impl Middleware<Total, Msg> for Double {
            fn handle(
                &mut self,
                action: &Msg,
                _state: &Total,
                _dispatcher: &Dispatcher<Total, Msg>,
                next: Next<'_, Total, Msg>,
            ) -> Result<Reduced<Total>, DispatchError> {
                match action {
                    Msg::Add(n) => next.run(&Msg::Add(n * 2)),
                    other => next.run(other),
                }
            }
        }

        let mut chain: Vec<BoxedMiddleware<Total, Msg>> = vec![Box::new(Double)];
        let reduced = run_chain(&mut chain, &Total(0), &Msg::Add(4)).unwrap();
        assert_eq!(reduced.state(), Some(&Total(8)));
    }
}
