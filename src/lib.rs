//! Futures and promises with callback delivery on thread contexts.
//!
//! A [`Future`] is a value that becomes available later, either as a value or
//! as an [`Error`]. A [`Promise`] is the producer side and settles its future
//! exactly once. Callbacks can be registered before or after settlement; each
//! fires exactly once, on the context it asked for:
//!
//! - [`Future::on_success`] and [`Future::on_error`] run on the serial main
//!   context,
//! - [`Future::on_success_on_background`] runs on a fresh background thread.
//!
//! Combinators ([`Future::map`], [`Future::zip`], [`Future::filter`],
//! [`traverse`], [`reduce`], ...) are built from these two primitives alone.
//!
//! # Examples
//!
//! ```
//! use future_promise::{future, future_of, Error, PredicateNotSatisfied};
//!
//! let pair = future(|| Ok::<_, Error>(1)).zip(&future_of("x"));
//! assert_eq!(pair.wait().unwrap(), (1, "x"));
//!
//! let rejected = future_of(1).filter(|v| Ok::<_, Error>(*v != 1));
//! let error = rejected.wait().unwrap_err();
//! assert_eq!(error.downcast_ref::<PredicateNotSatisfied<i32>>().unwrap().value, 1);
//! ```
mod callback;
mod cell;
mod combinator;
pub mod context;
mod error;
mod future;
mod guaranteed;
mod promise;
mod wait;

pub use combinator::{flatten, lift, reduce, sequence, traverse, zip3, zip4};
pub use context::{configure, is_main_context, ContextConfig, ThreadContext};
pub use error::{AlreadySettled, AwaitError, ConfigError, Error, Panicked, PredicateNotSatisfied};
pub use future::{future, future_failed, future_of, Future, Waiter};
pub use guaranteed::{traverse_guaranteed, try_traverse_guaranteed, GuaranteedFuture};
pub use promise::Promise;
pub use wait::wait;
