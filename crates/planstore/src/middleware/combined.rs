//! CombinedMiddleware - several middleware acting as one

use super::{BoxedMiddleware, Dispatcher, Middleware, Next, Reduced};
use crate::error::DispatchError;

/// Ordered group of middleware that behaves like a single member
///
/// When handling an action, each member runs in order and forwards to the
/// next; the last member forwards to whatever follows the group in the
/// enclosing chain. Groups nest.
pub struct CombinedMiddleware<S, A> {
    members: Vec<BoxedMiddleware<S, A>>,
}

impl<S, A> CombinedMiddleware<S, A> {
    pub fn new() -> Self {
        Self {
            members: Vec::new(),
        }
    }

    pub fn with<M>(mut self, middleware: M) -> Self
    where
        M: Middleware<S, A> + 'static,
    {
        self.members.push(Box::new(middleware));
        self
    }

    pub fn push(&mut self, middleware: BoxedMiddleware<S, A>) {
        self.members.push(middleware);
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl<S, A> Default for CombinedMiddleware<S, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, A> From<Vec<BoxedMiddleware<S, A>>> for CombinedMiddleware<S, A> {
    fn from(members: Vec<BoxedMiddleware<S, A>>) -> Self {
        Self { members }
    }
}

impl<S: Clone, A> Middleware<S, A> for CombinedMiddleware<S, A> {
    fn handle(
        &mut self,
        action: &A,
        state: &S,
        dispatcher: &Dispatcher<S, A>,
        next: Next<'_, S, A>,
    ) -> Result<Reduced<S>, DispatchError> {
        Next::nested(&mut self.members, next, state, dispatcher).run(action)
    }

    fn name(&self) -> &str {
        "combined"
    }
}
