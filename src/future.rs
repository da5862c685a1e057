//! The consumer-facing future handle.
use crate::{
    callback::{Callback, CallbackRegistry},
    cell::ResultCell,
    context::ThreadContext,
    error::{catching, AlreadySettled, Error},
};
use std::{
    fmt::{self, Debug, Formatter},
    future::IntoFuture,
    pin::Pin,
    sync::{Arc, Mutex},
    task::{Context, Poll, Waker},
};

struct Inner<T> {
    cell: ResultCell<T>,
    callbacks: CallbackRegistry<T>,
}

/// A value that becomes available later, exactly once, as success or error.
///
/// Clones share the same state, so any clone can register callbacks or be
/// combined.
///
/// # Examples
///
/// ```
/// use future_promise::future;
///
/// let answer = future(|| Ok::<_, std::io::Error>(40)).map(|v| v + 2);
/// assert_eq!(answer.wait().unwrap(), 42);
/// ```
pub struct Future<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for Future<T> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl<T> Debug for Future<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Future")
            .field("settled", &self.inner.cell.is_written())
            .field("pending_callbacks", &self.inner.callbacks.len())
            .finish()
    }
}

impl<T: Clone + Send + 'static> Future<T> {
    fn from_cell(cell: ResultCell<T>) -> Self {
        Self { inner: Arc::new(Inner { cell, callbacks: CallbackRegistry::new() }) }
    }

    /// A future completed with `value`.
    pub fn ready(value: T) -> Self {
        Self::from_cell(ResultCell::with(Ok(value)))
    }

    /// A future completed with `error`.
    pub fn failed(error: impl Into<Error>) -> Self {
        Self::from_cell(ResultCell::with(Err(error.into())))
    }

    /// A future to be settled through a [`Promise`](crate::Promise).
    pub(crate) fn pending() -> Self {
        Self::from_cell(ResultCell::empty())
    }

    /// Runs `f` on a background context. Its `Ok` becomes the value, its `Err`
    /// (or a panic) the error. The cell is written before the background job
    /// returns.
    pub fn spawn<F, E>(f: F) -> Self
    where
        F: FnOnce() -> Result<T, E> + Send + 'static,
        E: Into<Error>,
    {
        let future = Self::pending();
        let producer = future.clone();
        ThreadContext::Background.submit(move || {
            let result = catching(|| f().map_err(Into::into));
            let _ = producer.set_result(result);
        });
        future
    }

    /// Writes the result once and flushes the registry against it.
    pub(crate) fn set_result(&self, result: Result<T, Error>) -> Result<(), AlreadySettled> {
        if let Err(settled) = self.inner.cell.write(result.clone()) {
            tracing::debug!("future already settled; dropping result");
            return Err(settled);
        }
        self.inner.callbacks.drain(&result);
        Ok(())
    }

    /// Adds `callback`, then drains immediately if a result is present.
    ///
    /// Either this drain or the one in `set_result` sees the callback; the
    /// registry lock makes sure only one of them takes it.
    fn add_callback(&self, callback: Callback<T>) -> &Self {
        self.inner.callbacks.add(callback);
        if let Some(result) = self.inner.cell.read() {
            self.inner.callbacks.drain(&result);
        }
        self
    }

    /// Calls `f` with the value on the main context.
    pub fn on_success<F>(&self, f: F) -> &Self
    where
        F: FnOnce(T) + Send + 'static,
    {
        self.add_callback(Callback::Success { context: ThreadContext::Main, f: Box::new(f) })
    }

    /// Calls `f` with the value on a fresh background context.
    pub fn on_success_on_background<F>(&self, f: F) -> &Self
    where
        F: FnOnce(T) + Send + 'static,
    {
        self.add_callback(Callback::Success { context: ThreadContext::Background, f: Box::new(f) })
    }

    /// Calls `f` with the error on the main context.
    pub fn on_error<F>(&self, f: F) -> &Self
    where
        F: FnOnce(Error) + Send + 'static,
    {
        self.add_callback(Callback::Failure { f: Box::new(f) })
    }

    /// Closes a chain of registrations.
    pub fn end(&self) {}

    pub fn is_settled(&self) -> bool {
        self.inner.cell.is_written()
    }

    /// The result, if already present. Never blocks on settlement.
    pub fn result(&self) -> Option<Result<T, Error>> {
        self.inner.cell.read()
    }

    #[cfg(test)]
    pub(crate) fn pending_callbacks(&self) -> usize {
        self.inner.callbacks.len()
    }
}

/// Runs `f` on a background context; see [`Future::spawn`].
pub fn future<T, E, F>(f: F) -> Future<T>
where
    T: Clone + Send + 'static,
    F: FnOnce() -> Result<T, E> + Send + 'static,
    E: Into<Error>,
{
    Future::spawn(f)
}

pub fn future_of<T: Clone + Send + 'static>(value: T) -> Future<T> {
    Future::ready(value)
}

pub fn future_failed<T: Clone + Send + 'static>(error: impl Into<Error>) -> Future<T> {
    Future::failed(error)
}

struct Slot<T> {
    value: Option<Result<T, Error>>,
    waker: Option<Waker>,
}

/// Adapter that lets a [`Future`] be `.await`ed from any executor.
///
/// # Examples
///
/// ```
/// use future_promise::Promise;
/// use futures::executor::block_on;
/// use std::thread;
///
/// let (promise, future) = Promise::<String>::pair();
/// let task = thread::spawn(move || block_on(async { future.await }));
/// promise.keep("Hi".into()).unwrap();
/// assert_eq!(task.join().unwrap().unwrap(), "Hi");
/// ```
pub struct Waiter<T> {
    future: Future<T>,
    slot: Option<Arc<Mutex<Slot<T>>>>,
}

impl<T: Clone + Send + 'static> std::future::Future for Waiter<T> {
    type Output = Result<T, Error>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match &this.slot {
            Some(slot) => {
                let mut slot = slot.lock().unwrap();
                match slot.value.take() {
                    Some(value) => Poll::Ready(value),
                    None => {
                        slot.waker = Some(cx.waker().clone());
                        Poll::Pending
                    }
                }
            }
            None => {
                if let Some(result) = this.future.result() {
                    return Poll::Ready(result);
                }
                let waker = Some(cx.waker().clone());
                let slot = Arc::new(Mutex::new(Slot { value: None, waker }));
                let on_value = slot.clone();
                let on_error = slot.clone();
                this.future
                    .on_success_on_background(move |value| wake(&on_value, Ok(value)))
                    .on_error(move |error| wake(&on_error, Err(error)));
                this.slot = Some(slot);
                Poll::Pending
            }
        }
    }
}

fn wake<T>(slot: &Mutex<Slot<T>>, result: Result<T, Error>) {
    let mut slot = slot.lock().unwrap();
    slot.value = Some(result);
    if let Some(waker) = slot.waker.take() {
        waker.wake()
    }
}

impl<T: Clone + Send + 'static> IntoFuture for Future<T> {
    type Output = Result<T, Error>;
    type IntoFuture = Waiter<T>;

    fn into_future(self) -> Self::IntoFuture {
        Waiter { future: self, slot: None }
    }
}
