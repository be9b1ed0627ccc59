use std::any::Any;
use std::marker::PhantomData;
use std::rc::Rc;

use crate::it::Arg;
use crate::mock::{responder, Capability, Condition, MockState, Response, SetupVerification};
use crate::pattern::Pattern;
use crate::value::Value;

/// Builder for the response of a single setup.
///
/// Every method consumes and returns the builder, so a setup is configured in one chain:
///
/// ```rust,ignore
/// mock.setup(WriterMock::write(42)).returns(true).verifiable();
/// ```
///
/// A setup added later takes precedence over earlier setups matching the same invocation.
pub struct Setup<T: Capability> {
    state: Rc<MockState>,
    index: usize,
    capability: PhantomData<fn() -> T>,
}

impl<T: Capability> Setup<T> {
    pub(crate) fn new(state: Rc<MockState>, index: usize) -> Self {
        Self {
            state,
            index,
            capability: PhantomData,
        }
    }

    /// Respond with a clone of `value`.
    pub fn returns<R: Clone + 'static>(self, value: R) -> Self {
        self.respond(Response::Value(responder(move |_| {
            Box::new(value.clone()) as Box<dyn Any>
        })))
    }

    /// Respond with the output of `f`, given the invocation arguments.
    pub fn returns_with<R: 'static>(self, f: impl Fn(&[Value]) -> R + 'static) -> Self {
        self.respond(Response::Value(responder(move |args| {
            Box::new(f(args)) as Box<dyn Any>
        })))
    }

    /// Run `f` with the invocation arguments before responding.
    pub fn callback(self, f: impl Fn(&[Value]) + 'static) -> Self {
        self.state
            .with_setup(self.index, |setup| setup.callbacks.push(Rc::new(f)));
        self
    }

    /// Fail every matching invocation with an explicit panic.
    pub fn panics(self, message: impl Into<String>) -> Self {
        self.respond(Response::Panic(message.into()))
    }

    /// Include this setup in `verify`.
    pub fn verifiable(self) -> Self {
        self.mark(SetupVerification::Verifiable(None))
    }

    /// Include this setup in `verify`, reporting `fail_message` if it was never matched.
    pub fn verifiable_with(self, fail_message: impl Into<String>) -> Self {
        self.mark(SetupVerification::Verifiable(Some(fail_message.into())))
    }

    pub fn pattern(&self) -> Pattern {
        self.state
            .with_setup(self.index, |setup| setup.pattern.clone())
    }

    /// Hand verification of this setup over to an external expectation.
    pub(crate) fn track(self) -> Self {
        self.state.with_setup(self.index, |setup| {
            setup.verification = SetupVerification::Tracked;
        });
        self
    }

    fn respond(self, response: Response) -> Self {
        self.state
            .with_setup(self.index, |setup| setup.response = Some(response));
        self
    }

    fn mark(self, verification: SetupVerification) -> Self {
        self.state.with_setup(self.index, |setup| {
            if setup.verification != SetupVerification::Tracked {
                setup.verification = verification;
            }
        });
        self
    }
}

/// Setups guarded by a condition, created by [crate::Mock::when].
///
/// A conditional setup only matches while its condition returns `true`.
pub struct Conditional<T: Capability> {
    state: Rc<MockState>,
    condition: Condition,
    capability: PhantomData<fn() -> T>,
}

impl<T: Capability> Conditional<T> {
    pub(crate) fn new(state: Rc<MockState>, condition: Condition) -> Self {
        Self {
            state,
            condition,
            capability: PhantomData,
        }
    }

    pub fn setup(&self, pattern: Pattern) -> Setup<T> {
        let index = self
            .state
            .add_setup(pattern, Some(self.condition.clone()));
        Setup::new(self.state.clone(), index)
    }

    pub fn setup_get(&self, member: &'static str) -> Setup<T> {
        self.setup(Pattern::getter(member))
    }

    pub fn setup_set<V: 'static>(&self, member: &'static str, value: Arg<V>) -> Setup<T> {
        self.setup(Pattern::setter(member, value))
    }
}
