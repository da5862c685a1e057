//! Error types.
//!
//! Domain errors raised by producers, transforms and predicates are opaque to
//! this crate. They travel through the future graph as [`Error`], a cloneable
//! type-erased handle, so every error callback registered on a future can
//! receive its own copy.
use std::{
    error::Error as StdError,
    fmt::{self, Debug, Display, Formatter},
    sync::Arc,
};
use thiserror::Error;

/// A cloneable, type-erased error carried by a failed [`Future`](crate::Future).
///
/// Any `std::error::Error + Send + Sync + 'static` converts into it, so `?`
/// works inside producer and transform closures.
///
/// ```
/// use future_promise::{Error, PredicateNotSatisfied};
///
/// let error = Error::new(PredicateNotSatisfied { value: 1 });
/// let cloned = error.clone();
/// assert_eq!(cloned.downcast_ref::<PredicateNotSatisfied<i32>>().unwrap().value, 1);
/// ```
#[derive(Clone)]
pub struct Error {
    inner: Arc<dyn StdError + Send + Sync + 'static>,
}

impl Error {
    /// Wraps a concrete error.
    pub fn new<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self { inner: Arc::new(error) }
    }

    /// Wraps a plain message.
    pub fn msg<M>(message: M) -> Self
    where
        M: Display,
    {
        Self::new(Message(message.to_string()))
    }

    /// Returns the wrapped error if it is of type `E`.
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: StdError + 'static,
    {
        self.inner.downcast_ref::<E>()
    }

    pub fn is<E>(&self) -> bool
    where
        E: StdError + 'static,
    {
        self.inner.is::<E>()
    }
}

impl<E> From<E> for Error
where
    E: StdError + Send + Sync + 'static,
{
    fn from(error: E) -> Self {
        Self::new(error)
    }
}

impl AsRef<dyn StdError + Send + Sync> for Error {
    fn as_ref(&self) -> &(dyn StdError + Send + Sync + 'static) {
        &*self.inner
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(&*self.inner, f)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&*self.inner, f)
    }
}

#[derive(Debug, Error)]
#[error("{0}")]
struct Message(String);

/// Raised by [`Future::filter`](crate::Future::filter) when the predicate
/// returns `false`. Carries the rejected value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("value did not satisfy predicate: {value:?}")]
pub struct PredicateNotSatisfied<T: Debug> {
    pub value: T,
}

/// Raised by the blocking [`wait`](crate::wait()) bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AwaitError {
    /// Woken without a recorded result.
    #[error("woken without a result")]
    NoResult,
    /// Blocking on the serial main context would deadlock it.
    #[error("wait called on the main context")]
    CalledOnMainContext,
}

/// Returned when a [`Promise`](crate::Promise) is kept or broken a second time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("promise already settled")]
pub struct AlreadySettled;

/// A closure panicked while producing a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("panicked: {message}")]
pub struct Panicked {
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("thread contexts are already initialized")]
    AlreadyInitialized,
}

/// Runs `f`, turning a panic into a [`Panicked`] error.
pub(crate) fn catching<R, F>(f: F) -> Result<R, Error>
where
    F: FnOnce() -> Result<R, Error>,
{
    match std::panic::catch_unwind(std::panic::AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => {
            let message = if let Some(s) = payload.downcast_ref::<&str>() {
                (*s).to_owned()
            } else if let Some(s) = payload.downcast_ref::<String>() {
                s.clone()
            } else {
                "<opaque>".to_owned()
            };
            Err(Error::new(Panicked { message }))
        }
    }
}
