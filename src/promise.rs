use crate::{
    error::{AlreadySettled, Error},
    future::Future,
};

/// The producer side of a [`Future`]: settles it exactly once.
///
/// Clones settle the same future; whichever settles first wins and every
/// later attempt gets [`AlreadySettled`].
///
/// # Examples
///
/// ```
/// use future_promise::Promise;
/// use std::thread;
///
/// let (promise, future) = Promise::<String>::pair();
/// let task = thread::spawn(move || future.wait());
/// promise.keep("🍓".into()).unwrap();
/// assert_eq!(task.join().unwrap().unwrap(), "🍓");
/// ```
#[derive(Debug)]
pub struct Promise<T> {
    future: Future<T>,
}

impl<T> Clone for Promise<T> {
    fn clone(&self) -> Self {
        Self { future: self.future.clone() }
    }
}

impl<T: Clone + Send + 'static> Default for Promise<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + 'static> Promise<T> {
    pub fn new() -> Self {
        Self { future: Future::pending() }
    }

    /// A fresh promise together with its future.
    pub fn pair() -> (Self, Future<T>) {
        let promise = Self::new();
        let future = promise.future();
        (promise, future)
    }

    pub fn future(&self) -> Future<T> {
        self.future.clone()
    }

    /// Settles the future with `value`.
    pub fn keep(&self, value: T) -> Result<(), AlreadySettled> {
        self.future.set_result(Ok(value))
    }

    /// Settles the future with `error`.
    pub fn fail(&self, error: impl Into<Error>) -> Result<(), AlreadySettled> {
        self.future.set_result(Err(error.into()))
    }

    /// Keeps or fails the promise according to `result`.
    pub fn settle(&self, result: Result<T, Error>) -> Result<(), AlreadySettled> {
        self.future.set_result(result)
    }

    pub fn is_settled(&self) -> bool {
        self.future.is_settled()
    }
}
