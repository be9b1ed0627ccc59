//! `verimock` coordinates mock expectations and verifies all of them in one pass.
//!
//! Mocks are created from traits annotated with [verimock]. Each mock can be wrapped in a
//! [MockProxy], which turns an expectation into a setup plus a deferred verification of the
//! exact call count. A [MockStorage] creates and tracks proxies, and verifies every mock it
//! knows about with a single [MockStorage::verify] call.
//!
//! ```rust,ignore
//! use verimock::*;
//!
//! #[verimock(api = WriterMock)]
//! trait Writer {
//!     fn write(&self, value: i32) -> bool;
//! }
//!
//! fn write_twice(writer: &impl Writer) {
//!     writer.write(42);
//!     writer.write(42);
//! }
//!
//! let storage = MockStorage::new(MockBehavior::Strict);
//! let writer = storage.create::<WriterMock>();
//! writer
//!     .expect(WriterMock::write(42).times(Times::exactly(2)))
//!     .returns(true);
//!
//! write_twice(&writer.object());
//!
//! storage.verify().unwrap();
//! ```
//!
//! # Expectations and setups
//! A setup only tells a mock how to respond. An expectation made with [MockProxy::expect] is a
//! setup that is also checked when the proxy is verified:
//!
//! * [MockProxy::verify] runs the recorded expectations in declaration order and fails with the
//!   first one that is not met, then checks the setups marked [Setup::verifiable].
//! * [MockProxy::verify_all] does the same, but requires every setup to have been matched.
//!
//! # Customization
//! [MockStorage::customize] resolves a [Factory] into a proxy and associates the two, so a later
//! [MockStorage::proxy_for] with the same factory finds that proxy again:
//!
//! ```rust,ignore
//! storage.customize(|c| {
//!     c.resolve(&start_process).expect(StartMock::start(it::any())).returns(handle);
//! });
//! ```
//!
//! # Strict and loose mocks
//! A [MockBehavior::Strict] mock panics as soon as it receives a call without a matching setup.
//! A [MockBehavior::Loose] mock answers such calls with the default value of the return type.
//!
//! # Logging
//! Creation of mocks and proxies, recorded expectations and verification runs are reported as
//! [tracing](https://docs.rs/tracing) events at `debug` level, resolved invocations at `trace`.
//!
//! # Threads
//! All handles are reference counted without atomics, so a storage and its mocks stay on the
//! thread that created them.

#![forbid(unsafe_code)]

mod error;
mod mismatch;
mod mock;
mod pattern;
mod proxy;
mod repository;
mod setup;
mod storage;
mod times;
mod value;
mod verify_actions;

/// Argument matchers for patterns.
pub mod it;

pub use error::{MockError, MockResult, VerifyError};
pub use mock::{Capability, Mock, MockBehavior, MockId, MockObject};
pub use pattern::{Expectation, Invocation, Pattern, PatternKind};
pub use proxy::{MockProxy, ProxyVerify};
pub use repository::MockRepository;
pub use setup::{Conditional, Setup};
pub use storage::{Customizer, DelegateKey, Factory, MockStorage, Preparable};
pub use times::{Range, Times};
pub use value::Value;
pub use verify_actions::VerifyActions;

///
/// Generate a mock API for a trait.
///
/// The macro keeps the trait as it is, and adds:
/// 1. A mock API type, named by the `api` parameter (default: the trait name with a `Mock` suffix),
///    which implements [Capability].
/// 2. A pattern constructor on the mock API type for every method, taking one argument matcher
///    per parameter: `WriterMock::write(42)`, `WriterMock::write(it::any())`.
/// 3. An implementation of the trait for [MockObject] of the mock API type.
///
/// # Arguments
/// Every argument must implement `Debug`, and is recorded by value. Reference arguments
/// (`&str`, `&[u8]`) are recorded in owned form (`String`, `Vec<u8>`), which is also the type
/// their matchers are written against.
///
/// # Properties
/// Methods can be marked as property accessors:
///
/// ```rust,ignore
/// #[verimock(api = NamedMock)]
/// trait Named {
///     #[verimock(get)]
///     fn name(&self) -> String;
///
///     #[verimock(set)]
///     fn set_name(&self, name: String);
/// }
/// ```
///
/// A getter takes no arguments and returns a `Clone` value. A setter takes exactly one argument,
/// and writes the property named after the method without its `set_` prefix.
///
/// # Parameters
/// | Keyword  | Type   | Default      | Description                              |
/// |----------|--------|--------------|------------------------------------------|
/// | `api`    | ident  | `{Trait}Mock`| Name of the generated mock API type      |
/// | `prefix` | path   | `::verimock` | Path to this crate, if it was renamed    |
///
/// # Restrictions
/// Generic traits, generic or async methods, methods without a `self` receiver, methods
/// returning references, associated types and associated constants are rejected at compile time.
pub use verimock_macros::verimock;
