//! Closure-based middleware
//!
//! - [`HandleAction`]: run a side effect, then always forward
//! - [`Filter`]: short-circuit actions rejected by a predicate

use super::{Dispatcher, Middleware, Next, Reduced};
use crate::error::DispatchError;

/// Middleware that runs a side effect and always forwards afterwards
///
/// An error from the side effect aborts the dispatch.
pub struct HandleAction<F> {
    name: String,
    f: F,
}

pub fn handle_action<S, A, F>(f: F) -> HandleAction<F>
where
    F: FnMut(&A, &S, &Dispatcher<S, A>) -> anyhow::Result<()> + Send,
{
    HandleAction {
        name: "handle-action".to_string(),
        f,
    }
}

impl<F> HandleAction<F> {
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl<S, A, F> Middleware<S, A> for HandleAction<F>
where
    S: Clone,
    F: FnMut(&A, &S, &Dispatcher<S, A>) -> anyhow::Result<()> + Send,
{
    fn handle(
        &mut self,
        action: &A,
        state: &S,
        dispatcher: &Dispatcher<S, A>,
        next: Next<'_, S, A>,
    ) -> Result<Reduced<S>, DispatchError> {
        (self.f)(action, state, dispatcher)
            .map_err(|e| DispatchError::middleware(self.name.clone(), e))?;
        next.run(action)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Middleware that drops actions for which the predicate returns `false`
pub struct Filter<P> {
    predicate: P,
}

pub fn filter<S, A, P>(predicate: P) -> Filter<P>
where
    P: Fn(&A, &S) -> bool + Send,
{
    Filter { predicate }
}

impl<S, A, P> Middleware<S, A> for Filter<P>
where
    S: Clone,
    P: Fn(&A, &S) -> bool + Send,
{
    fn handle(
        &mut self,
        action: &A,
        state: &S,
        _dispatcher: &Dispatcher<S, A>,
        next: Next<'_, S, A>,
    ) -> Result<Reduced<S>, DispatchError> {
        if (self.predicate)(action, state) {
            next.run(action)
        } else {
            log::debug!("Filter: action short-circuited");
            Ok(next.skip())
        }
    }

    fn name(&self) -> &str {
        "filter"
    }
}
