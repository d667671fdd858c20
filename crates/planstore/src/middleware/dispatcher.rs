//! Dispatcher allows middleware to dispatch actions back to the store

use std::collections::VecDeque;
use std::fmt;

use parking_lot::Mutex;

use crate::action::Action;

/// Dispatcher allows middleware to dispatch new actions
///
/// Actions dispatched through the Dispatcher are queued and sent through the
/// store once the action currently being reduced has committed. They re-enter
/// `send` from the beginning, so every middleware observes them, and no
/// middleware ever re-enters the dispatch lock it is running under.
///
/// Each dispatch gets its own queue, borrowed for the duration of the chain.
pub struct Dispatcher<S, A> {
    queue: Mutex<VecDeque<Action<S, A>>>,
}

impl<S, A> Dispatcher<S, A> {
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
        }
    }

    /// Queue a plain action
    pub fn dispatch(&self, action: A) {
        self.queue.lock().push_back(Action::Plain(action));
    }

    /// Queue any kind of action, e.g. a plan reacting to this one
    pub fn send(&self, action: Action<S, A>) {
        self.queue.lock().push_back(action);
    }

    /// Number of queued actions
    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }

    /// Take everything queued so far, in dispatch order
    pub(crate) fn drain(&self) -> Vec<Action<S, A>> {
        self.queue.lock().drain(..).collect()
    }
}

impl<S, A> Default for Dispatcher<S, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, A> fmt::Debug for Dispatcher<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("pending", &self.pending())
            .finish()
    }
}
