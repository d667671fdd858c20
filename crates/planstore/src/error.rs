//! Errors surfaced by `send` / `dispatch`.

use thiserror::Error;

/// Errors that can occur while dispatching an action.
///
/// Reduction errors (`Middleware`, `Reducer`) leave the store's state
/// untouched. Plan errors (`Plan`, `Publishing`) come from plan bodies and
/// never corrupt state because no reduction happened on their behalf.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A middleware aborted the dispatch.
    #[error("middleware '{name}' failed: {source}")]
    Middleware {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    /// A fallible reducer rejected the action.
    #[error("reducer failed: {0}")]
    Reducer(#[source] anyhow::Error),

    /// A plan body returned an error.
    #[error("plan failed: {0}")]
    Plan(#[source] anyhow::Error),

    /// A publishing plan's action sequence terminated with an error.
    #[error("publishing plan failed: {0}")]
    Publishing(#[source] anyhow::Error),

    /// The plan run was torn down before it finished.
    #[error("plan was cancelled")]
    Cancelled,

    /// Asynchronous plans need a tokio runtime to be spawned on.
    #[error("no tokio runtime available to run asynchronous plan")]
    NoRuntime,
}

impl DispatchError {
    /// Wrap an error raised by a middleware
    pub fn middleware(name: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::Middleware {
            name: name.into(),
            source: source.into(),
        }
    }

    /// Whether this error aborted a plain-action reduction
    pub fn is_reduction(&self) -> bool {
        matches!(self, Self::Middleware { .. } | Self::Reducer(_))
    }

    /// Whether this error originated in a plan or publishing plan
    pub fn is_plan(&self) -> bool {
        matches!(self, Self::Plan(_) | Self::Publishing(_) | Self::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let err = DispatchError::middleware("auth", anyhow::anyhow!("denied"));
        assert!(err.is_reduction());
        assert!(!err.is_plan());
        assert_eq!(err.to_string(), "middleware 'auth' failed: denied");

        let err = DispatchError::Plan(anyhow::anyhow!("timeout"));
        assert!(err.is_plan());
        assert!(!err.is_reduction());

        assert!(DispatchError::Cancelled.is_plan());
        assert!(!DispatchError::NoRuntime.is_reduction());
    }
}
