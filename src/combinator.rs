//! Combinators. Each one creates a single hidden [`Promise`], subscribes to
//! its inputs and settles the promise when they resolve. Errors from upstream
//! pass through unchanged.
use crate::{
    error::{catching, Error, PredicateNotSatisfied},
    future::Future,
    promise::Promise,
};
use std::{
    fmt::Debug,
    sync::{Arc, Mutex},
};

impl<T: Clone + Send + 'static> Future<T> {
    /// Applies a total function to the value.
    pub fn map<U, F>(&self, f: F) -> Future<U>
    where
        U: Clone + Send + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        self.try_map(move |value| Ok::<_, Error>(f(value)))
    }

    /// Applies a fallible function to the value; its error fails the result.
    pub fn try_map<U, E, F>(&self, f: F) -> Future<U>
    where
        U: Clone + Send + 'static,
        E: Into<Error>,
        F: FnOnce(T) -> Result<U, E> + Send + 'static,
    {
        let promise = Promise::new();
        let on_value = promise.clone();
        let on_error = promise.clone();
        self.on_success_on_background(move |value| {
            let _ = on_value.settle(catching(|| f(value).map_err(Into::into)));
        })
        .on_error(move |error| {
            let _ = on_error.fail(error);
        });
        promise.future()
    }

    /// Applies a function producing another future and flattens the result.
    pub fn flat_map<U, F>(&self, f: F) -> Future<U>
    where
        U: Clone + Send + 'static,
        F: FnOnce(T) -> Future<U> + Send + 'static,
    {
        flatten(&self.map(f))
    }

    /// Like [`flat_map`](Self::flat_map) for a function that can fail before
    /// producing its future.
    pub fn try_flat_map<U, E, F>(&self, f: F) -> Future<U>
    where
        U: Clone + Send + 'static,
        E: Into<Error>,
        F: FnOnce(T) -> Result<Future<U>, E> + Send + 'static,
    {
        flatten(&self.try_map(f))
    }

    /// Pairs two futures. Succeeds once both succeed; fails with whichever
    /// error is delivered first.
    pub fn zip<U>(&self, other: &Future<U>) -> Future<(T, U)>
    where
        U: Clone + Send + 'static,
    {
        let promise = Promise::new();
        let slots = Arc::new(Mutex::new((None, None)));

        let (left_promise, left_slots) = (promise.clone(), slots.clone());
        self.on_success_on_background(move |value| {
            let ready = {
                let mut slots = left_slots.lock().unwrap();
                slots.0 = Some(value);
                take_pair(&mut slots)
            };
            if let Some(pair) = ready {
                let _ = left_promise.keep(pair);
            }
        });
        let (right_promise, right_slots) = (promise.clone(), slots);
        other.on_success_on_background(move |value| {
            let ready = {
                let mut slots = right_slots.lock().unwrap();
                slots.1 = Some(value);
                take_pair(&mut slots)
            };
            if let Some(pair) = ready {
                let _ = right_promise.keep(pair);
            }
        });

        // On a double failure the second one finds the promise settled.
        let left_error = promise.clone();
        self.on_error(move |error| {
            let _ = left_error.fail(error);
        });
        let right_error = promise.clone();
        other.on_error(move |error| {
            let _ = right_error.fail(error);
        });
        promise.future()
    }

    /// Keeps the value if `predicate` holds; otherwise fails with
    /// [`PredicateNotSatisfied`] carrying the value. An error from the
    /// predicate itself fails the result.
    pub fn filter<P, E>(&self, predicate: P) -> Future<T>
    where
        T: Debug + Sync,
        E: Into<Error>,
        P: FnOnce(&T) -> Result<bool, E> + Send + 'static,
    {
        let promise = Promise::new();
        let on_value = promise.clone();
        let on_error = promise.clone();
        self.on_success_on_background(move |value| {
            let result = catching(|| predicate(&value).map_err(Into::into)).and_then(|holds| {
                if holds {
                    Ok(value)
                } else {
                    Err(Error::new(PredicateNotSatisfied { value }))
                }
            });
            let _ = on_value.settle(result);
        })
        .on_error(move |error| {
            let _ = on_error.fail(error);
        });
        promise.future()
    }
}

fn take_pair<T, U>(slots: &mut (Option<T>, Option<U>)) -> Option<(T, U)> {
    if slots.0.is_some() && slots.1.is_some() {
        slots.0.take().zip(slots.1.take())
    } else {
        None
    }
}

impl<T: Clone + Send + 'static> Future<Future<T>> {
    pub fn flatten(&self) -> Future<T> {
        flatten(self)
    }
}

/// Resolves a future of a future into the inner future's outcome.
pub fn flatten<T>(future: &Future<Future<T>>) -> Future<T>
where
    T: Clone + Send + 'static,
{
    let promise = Promise::new();
    let on_value = promise.clone();
    let on_error = promise.clone();
    future
        .on_success_on_background(move |inner| {
            let on_inner_error = on_value.clone();
            inner
                .on_success_on_background(move |value| {
                    let _ = on_value.keep(value);
                })
                .on_error(move |error| {
                    let _ = on_inner_error.fail(error);
                });
        })
        .on_error(move |error| {
            let _ = on_error.fail(error);
        });
    promise.future()
}

pub fn zip3<A, B, C>(a: &Future<A>, b: &Future<B>, c: &Future<C>) -> Future<(A, B, C)>
where
    A: Clone + Send + 'static,
    B: Clone + Send + 'static,
    C: Clone + Send + 'static,
{
    a.zip(&b.zip(c)).map(|(a, (b, c))| (a, b, c))
}

pub fn zip4<A, B, C, D>(
    a: &Future<A>,
    b: &Future<B>,
    c: &Future<C>,
    d: &Future<D>,
) -> Future<(A, B, C, D)>
where
    A: Clone + Send + 'static,
    B: Clone + Send + 'static,
    C: Clone + Send + 'static,
    D: Clone + Send + 'static,
{
    a.zip(&zip3(b, c, d)).map(|(a, (b, c, d))| (a, b, c, d))
}

/// Applies `f` to every item, then collects the resulting futures in input
/// order.
///
/// If `f` itself fails for any item the result fails at once, before the
/// remaining items are visited. Otherwise the first failure seen by the
/// left-to-right zip chain wins.
///
/// ```
/// use future_promise::{future_of, traverse, Error};
///
/// let doubled = traverse(1..=3, |i| Ok::<_, Error>(future_of(i * 2)));
/// assert_eq!(doubled.wait().unwrap(), vec![2, 4, 6]);
/// ```
pub fn traverse<I, U, E, F>(items: I, f: F) -> Future<Vec<U>>
where
    I: IntoIterator,
    U: Clone + Send + 'static,
    E: Into<Error>,
    F: FnMut(I::Item) -> Result<Future<U>, E>,
{
    let futures = match items.into_iter().map(f).collect::<Result<Vec<_>, E>>() {
        Ok(futures) => futures,
        Err(error) => return Future::failed(error),
    };
    futures.iter().fold(Future::ready(Vec::new()), |collected, next| {
        collected.zip(next).map(|(mut values, value)| {
            values.push(value);
            values
        })
    })
}

/// Turns a sequence of futures into a future of their values, in order.
pub fn sequence<I, U>(futures: I) -> Future<Vec<U>>
where
    I: IntoIterator<Item = Future<U>>,
    U: Clone + Send + 'static,
{
    traverse(futures, Ok::<_, Error>)
}

/// Lifts a binary function over plain values into one over futures.
pub fn lift<S, T, U, E, F>(f: F) -> impl Fn(&Future<S>, &Future<T>) -> Future<U> + Clone
where
    S: Clone + Send + 'static,
    T: Clone + Send + 'static,
    U: Clone + Send + 'static,
    E: Into<Error>,
    F: Fn(S, T) -> Result<U, E> + Clone + Send + 'static,
{
    move |s: &Future<S>, t: &Future<T>| -> Future<U> {
        let f = f.clone();
        s.zip(t).try_map(move |(s, t)| f(s, t))
    }
}

/// Folds `futures` into `initial` with the lifted `f`. The first error met
/// along the fold fails the result.
///
/// ```
/// use future_promise::{future_of, reduce, Error};
///
/// let sum = reduce((1..=4).map(future_of), future_of(0), |acc, v| Ok::<_, Error>(acc + v));
/// assert_eq!(sum.wait().unwrap(), 10);
/// ```
pub fn reduce<I, T, U, E, F>(futures: I, initial: Future<U>, f: F) -> Future<U>
where
    I: IntoIterator<Item = Future<T>>,
    T: Clone + Send + 'static,
    U: Clone + Send + 'static,
    E: Into<Error>,
    F: Fn(U, T) -> Result<U, E> + Clone + Send + 'static,
{
    let lifted = lift(f);
    futures.into_iter().fold(initial, |accumulated, next| lifted(&accumulated, &next))
}
