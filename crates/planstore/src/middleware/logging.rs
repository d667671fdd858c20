//! LoggingMiddleware - logs all actions for debugging

use std::fmt::Debug;

use super::{Dispatcher, Middleware, Next, Reduced};
use crate::error::DispatchError;

/// LoggingMiddleware - logs every plain action that passes through the chain
pub struct LoggingMiddleware {
    level: log::Level,
}

impl LoggingMiddleware {
    pub fn new() -> Self {
        Self {
            level: log::Level::Debug,
        }
    }

    /// Log at `level` instead of `Debug`
    pub fn with_level(level: log::Level) -> Self {
        Self { level }
    }
}

impl Default for LoggingMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Clone, A: Debug> Middleware<S, A> for LoggingMiddleware {
    fn handle(
        &mut self,
        action: &A,
        _state: &S,
        _dispatcher: &Dispatcher<S, A>,
        next: Next<'_, S, A>,
    ) -> Result<Reduced<S>, DispatchError> {
        log::log!(self.level, "Action: {:?}", action);

        let result = next.run(action);
        match &result {
            Ok(reduced) if reduced.is_skipped() => log::trace!("Action {:?} skipped", action),
            Ok(_) => {}
            Err(e) => log::log!(self.level, "Action {:?} failed: {}", action, e),
        }
        result
    }

    fn name(&self) -> &str {
        "logging"
    }
}
