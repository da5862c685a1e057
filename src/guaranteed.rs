//! Futures that cannot fail, backed by a fallback value.
use crate::{
    combinator::sequence,
    error::Error,
    future::Future,
    promise::Promise,
};

/// A future that always succeeds: with the upstream value, or with the
/// fallback when the upstream fails.
///
/// Mapping a total function keeps the guarantee. Anything that can fail
/// (a fallible function, or one returning a plain [`Future`]) gives a plain
/// `Future` back.
///
/// ```
/// use future_promise::{future_failed, Error, GuaranteedFuture};
///
/// let upstream = future_failed::<u32>(Error::msg("offline"));
/// let count = GuaranteedFuture::new(&upstream, 0).map(|n| n + 1);
/// assert_eq!(count.wait().unwrap(), 1);
/// assert_eq!(*count.fallback(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct GuaranteedFuture<T> {
    future: Future<T>,
    fallback: T,
}

impl<T: Clone + Send + 'static> GuaranteedFuture<T> {
    pub fn new(upstream: &Future<T>, fallback: T) -> Self {
        let promise = Promise::new();
        let on_value = promise.clone();
        let on_error = promise.clone();
        let substitute = fallback.clone();
        upstream
            .on_success_on_background(move |value| {
                let _ = on_value.keep(value);
            })
            .on_error(move |_| {
                let _ = on_error.keep(substitute);
            });
        promise.future().on_error(|error| {
            tracing::error!(%error, "guaranteed future observed an error");
        });
        Self { future: promise.future(), fallback }
    }

    /// Already succeeded with `value`, which also serves as the fallback.
    pub fn ready(value: T) -> Self {
        Self::new(&Future::ready(value.clone()), value)
    }

    pub fn on_success<F>(&self, f: F) -> &Self
    where
        F: FnOnce(T) + Send + 'static,
    {
        self.future.on_success(f);
        self
    }

    pub fn on_success_on_background<F>(&self, f: F) -> &Self
    where
        F: FnOnce(T) + Send + 'static,
    {
        self.future.on_success_on_background(f);
        self
    }

    pub fn end(&self) {}

    /// The underlying future, which never fails.
    pub fn future(&self) -> &Future<T> {
        &self.future
    }

    pub fn fallback(&self) -> &T {
        &self.fallback
    }

    /// Applies a total function to both the value and the fallback.
    pub fn map<U, F>(&self, f: F) -> GuaranteedFuture<U>
    where
        U: Clone + Send + 'static,
        F: Fn(T) -> U + Send + 'static,
    {
        let fallback = f(self.fallback.clone());
        GuaranteedFuture::new(&self.future.map(f), fallback)
    }

    pub fn try_map<U, E, F>(&self, f: F) -> Future<U>
    where
        U: Clone + Send + 'static,
        E: Into<Error>,
        F: FnOnce(T) -> Result<U, E> + Send + 'static,
    {
        self.future.try_map(f)
    }

    pub fn flat_map<U, F>(&self, f: F) -> Future<U>
    where
        U: Clone + Send + 'static,
        F: FnOnce(T) -> Future<U> + Send + 'static,
    {
        self.future.flat_map(f)
    }

    pub fn try_flat_map<U, E, F>(&self, f: F) -> Future<U>
    where
        U: Clone + Send + 'static,
        E: Into<Error>,
        F: FnOnce(T) -> Result<Future<U>, E> + Send + 'static,
    {
        self.future.try_flat_map(f)
    }

    /// Pairs two guaranteed futures; the fallback is the pair of fallbacks.
    pub fn zip<U>(&self, other: &GuaranteedFuture<U>) -> GuaranteedFuture<(T, U)>
    where
        U: Clone + Send + 'static,
    {
        let fallback = (self.fallback.clone(), other.fallback.clone());
        GuaranteedFuture::new(&self.future.zip(&other.future), fallback)
    }

    pub fn zip3<U, V>(
        &self,
        u: &GuaranteedFuture<U>,
        v: &GuaranteedFuture<V>,
    ) -> GuaranteedFuture<(T, U, V)>
    where
        U: Clone + Send + 'static,
        V: Clone + Send + 'static,
    {
        self.zip(&u.zip(v)).map(|(t, (u, v))| (t, u, v))
    }

    pub fn zip4<U, V, W>(
        &self,
        u: &GuaranteedFuture<U>,
        v: &GuaranteedFuture<V>,
        w: &GuaranteedFuture<W>,
    ) -> GuaranteedFuture<(T, U, V, W)>
    where
        U: Clone + Send + 'static,
        V: Clone + Send + 'static,
        W: Clone + Send + 'static,
    {
        self.zip(&u.zip3(v, w)).map(|(t, (u, v, w))| (t, u, v, w))
    }

    /// Pairs with a plain future; the guarantee is lost.
    pub fn zip_future<U>(&self, other: &Future<U>) -> Future<(T, U)>
    where
        U: Clone + Send + 'static,
    {
        self.future.zip(other)
    }

    /// Blocks until the value is available. Only fails when called from the
    /// main context.
    pub fn wait(&self) -> Result<T, Error> {
        self.future.wait()
    }
}

impl<T> From<GuaranteedFuture<T>> for Future<T> {
    fn from(guaranteed: GuaranteedFuture<T>) -> Self {
        guaranteed.future
    }
}

/// Applies `f` to every item and collects the guaranteed results in order.
/// The fallback of the collected future is the list of every item's fallback.
pub fn traverse_guaranteed<I, U, F>(items: I, f: F) -> GuaranteedFuture<Vec<U>>
where
    I: IntoIterator,
    U: Clone + Send + 'static,
    F: FnMut(I::Item) -> GuaranteedFuture<U>,
{
    let all = items.into_iter().map(f).collect::<Vec<_>>();
    all.iter().fold(GuaranteedFuture::ready(Vec::new()), |collected, next| {
        collected.zip(next).map(|(mut values, value)| {
            values.push(value);
            values
        })
    })
}

/// Like [`traverse_guaranteed`] for a fallible `f`: any error from `f` fails
/// the collected future, so the result is a plain [`Future`].
pub fn try_traverse_guaranteed<I, U, E, F>(items: I, mut f: F) -> Future<Vec<U>>
where
    I: IntoIterator,
    U: Clone + Send + 'static,
    E: Into<Error>,
    F: FnMut(I::Item) -> Result<GuaranteedFuture<U>, E>,
{
    sequence(items.into_iter().map(|item| match f(item) {
        Ok(guaranteed) => guaranteed.future,
        Err(error) => Future::failed(error),
    }))
}
