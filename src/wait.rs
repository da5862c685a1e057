//! Blocking bridge from a [`Future`] to its value.
use crate::{
    context::{is_main_context, Semaphore},
    error::{AwaitError, Error},
    future::Future,
};
use std::sync::{Arc, Mutex};

/// Blocks the calling thread until `future` settles, then returns its value
/// or its error. There is no timeout.
///
/// Success is delivered on a background context and errors on the main
/// context, so calling this from the main context would deadlock it; such
/// calls fail with [`AwaitError::CalledOnMainContext`] instead.
pub fn wait<T>(future: &Future<T>) -> Result<T, Error>
where
    T: Clone + Send + 'static,
{
    if is_main_context() {
        return Err(AwaitError::CalledOnMainContext.into());
    }
    let semaphore = Arc::new(Semaphore::new(0));
    let recorded = Arc::new(Mutex::new(None));

    let (value_semaphore, value_slot) = (semaphore.clone(), recorded.clone());
    let (error_semaphore, error_slot) = (semaphore.clone(), recorded.clone());
    future
        .on_success_on_background(move |value| {
            *value_slot.lock().unwrap() = Some(Ok(value));
            value_semaphore.signal();
        })
        .on_error(move |error| {
            *error_slot.lock().unwrap() = Some(Err(error));
            error_semaphore.signal();
        });

    semaphore.wait();
    let result = recorded.lock().unwrap().take();
    result.unwrap_or_else(|| Err(AwaitError::NoResult.into()))
}

impl<T: Clone + Send + 'static> Future<T> {
    /// See [`wait`](crate::wait()).
    pub fn wait(&self) -> Result<T, Error> {
        wait(self)
    }
}
