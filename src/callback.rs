//! The callback registry: pending continuations of one future.
use crate::{
    context::{Job, ThreadContext},
    error::Error,
};
use std::{
    fmt::{self, Debug, Formatter},
    sync::Mutex,
};

/// A registered continuation.
pub(crate) enum Callback<T> {
    Success { context: ThreadContext, f: Box<dyn FnOnce(T) + Send + 'static> },
    Failure { f: Box<dyn FnOnce(Error) + Send + 'static> },
}

impl<T> Debug for Callback<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success { context, .. } => {
                f.debug_struct("Success").field("context", context).finish()
            }
            Self::Failure { .. } => f.write_str("Failure"),
        }
    }
}

impl<T: Send + 'static> Callback<T> {
    /// Pairs this callback with `result`. Mismatched kinds yield nothing.
    fn handler_for(self, result: &Result<T, Error>) -> Option<(ThreadContext, Job)>
    where
        T: Clone,
    {
        match (result, self) {
            (Ok(value), Self::Success { context, f }) => {
                let value = value.clone();
                Some((context, Box::new(move || f(value))))
            }
            (Err(error), Self::Failure { f }) => {
                let error = error.clone();
                Some((ThreadContext::Main, Box::new(move || f(error))))
            }
            _ => None,
        }
    }
}

/// Ordered, lock-guarded list of pending callbacks.
pub(crate) struct CallbackRegistry<T> {
    callbacks: Mutex<Vec<Callback<T>>>,
}

impl<T> CallbackRegistry<T> {
    pub(crate) fn new() -> Self {
        Self { callbacks: Mutex::new(Vec::new()) }
    }

    pub(crate) fn add(&self, callback: Callback<T>) {
        self.callbacks.lock().unwrap().push(callback);
    }

    pub(crate) fn len(&self) -> usize {
        self.callbacks.lock().unwrap().len()
    }
}

impl<T: Clone + Send + 'static> CallbackRegistry<T> {
    /// Empties the registry and dispatches every entry matching `result`.
    ///
    /// Dispatch happens under the lock so main-context deliveries keep
    /// registration order across concurrent drains. Submitting never blocks.
    pub(crate) fn drain(&self, result: &Result<T, Error>) {
        let mut callbacks = self.callbacks.lock().unwrap();
        if callbacks.is_empty() {
            return;
        }
        let mut dispatched = 0usize;
        for callback in callbacks.drain(..) {
            if let Some((context, job)) = callback.handler_for(result) {
                context.submit(job);
                dispatched += 1;
            }
        }
        tracing::trace!(dispatched, "registry.drain");
    }
}

impl<T> Debug for CallbackRegistry<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let pending = self.callbacks.lock().map(|callbacks| callbacks.len());
        let pending: &dyn Debug = match &pending {
            Ok(len) => len,
            Err(_) => &"<poisoned>",
        };
        f.debug_struct("CallbackRegistry").field("pending", pending).finish()
    }
}
