use std::any::Any;
use std::fmt::{self, Debug};
use std::rc::Rc;

use crate::error::MockResult;
use crate::it::Arg;
use crate::mock::{Capability, Mock, MockBehavior, MockId, MockObject};
use crate::pattern::{Expectation, Pattern};
use crate::setup::{Conditional, Setup};
use crate::times::Times;
use crate::value::Value;
use crate::verify_actions::VerifyActions;

/// A proxy with its capability erased: identity and verification only.
pub trait ProxyVerify: Any {
    /// Identity of the mock behind the proxy.
    fn mock_id(&self) -> MockId;

    /// Run the recorded verification actions, then the mock's own `verify`.
    fn verify(&self) -> MockResult<()>;

    /// Run the recorded verification actions, then the mock's own `verify_all`.
    fn verify_all(&self) -> MockResult<()>;

    /// Run only the recorded verification actions, stopping at the first failure.
    fn verify_expectations(&self) -> MockResult<()>;

    /// Identity of the action list. Proxies sharing one list are the same proxy for verification.
    fn actions_key(&self) -> *const ();

    fn as_any(&self) -> &dyn Any;
}

/// Wraps one mock and adds deferred verification of expectations.
///
/// [MockProxy::expect] is a [Mock::setup] that also remembers to check the expected call
/// count when the proxy is verified. Everything else passes straight through to the mock.
///
/// ```rust,ignore
/// let writer = MockProxy::new(Mock::<WriterMock>::new());
/// writer.expect(WriterMock::write(42).times(Times::exactly(2))).returns(true);
///
/// system_under_test(&writer.object());
///
/// writer.verify()?;
/// ```
///
/// Clones share the same mock and the same verification actions.
pub struct MockProxy<T: Capability> {
    inner: Rc<ProxyInner<T>>,
}

struct ProxyInner<T: Capability> {
    source: Mock<T>,
    verify_actions: Rc<VerifyActions>,
}

impl<T: Capability> MockProxy<T> {
    pub fn new(source: Mock<T>) -> Self {
        tracing::debug!(mock = source.name(), "created proxy");
        Self::with_actions(source, Rc::new(VerifyActions::new()))
    }

    fn with_actions(source: Mock<T>, verify_actions: Rc<VerifyActions>) -> Self {
        Self {
            inner: Rc::new(ProxyInner {
                source,
                verify_actions,
            }),
        }
    }

    /// Build a fresh proxy over the mock behind `object`.
    pub fn get(object: &MockObject<T>) -> Self {
        Self::new(object.mock())
    }

    pub fn mock(&self) -> &Mock<T> {
        &self.inner.source
    }

    pub fn object(&self) -> MockObject<T> {
        self.inner.source.object()
    }

    pub fn id(&self) -> MockId {
        self.inner.source.id()
    }

    pub fn behavior(&self) -> MockBehavior {
        self.inner.source.behavior()
    }

    /// A proxy over the same mock, viewed through another capability.
    ///
    /// Both proxies share their verification actions: an expectation recorded through either
    /// one is checked when either one is verified.
    pub fn as_capability<U: Capability>(&self) -> MockProxy<U> {
        MockProxy::with_actions(
            self.inner.source.as_capability(),
            self.inner.verify_actions.clone(),
        )
    }

    /// Set up `expectation` and record a verification action for it.
    ///
    /// The call count defaults to [Times::once]. Expecting the same pattern twice records two
    /// independent actions, and both must hold.
    pub fn expect(&self, expectation: impl Into<Expectation>) -> Setup<T> {
        let Expectation {
            pattern,
            times,
            fail_message,
        } = expectation.into();
        let times = times.unwrap_or_else(Times::once);

        tracing::debug!(
            mock = self.inner.source.name(),
            %pattern,
            %times,
            "recorded expectation"
        );

        let source = self.inner.source.clone();
        let expected = pattern.clone();
        self.inner.verify_actions.record(move || {
            source
                .state()
                .verify_expectation(&expected, times, fail_message.as_deref())
        });

        self.inner.source.setup(pattern).track()
    }

    /// Expect a single read of the property `member`.
    pub fn expect_get(&self, member: &'static str) -> Setup<T> {
        self.expect(Pattern::getter(member))
    }

    /// Expect a single write of a value matching `value` to the property `member`.
    pub fn expect_set<V: 'static>(&self, member: &'static str, value: Arg<V>) -> Setup<T> {
        self.expect(Pattern::setter(member, value))
    }

    pub fn setup(&self, pattern: Pattern) -> Setup<T> {
        self.inner.source.setup(pattern)
    }

    pub fn setup_get(&self, member: &'static str) -> Setup<T> {
        self.inner.source.setup_get(member)
    }

    pub fn setup_set<V: 'static>(&self, member: &'static str, value: Arg<V>) -> Setup<T> {
        self.inner.source.setup_set(member, value)
    }

    pub fn setup_property<V: Clone + Debug + 'static>(
        &self,
        name: &'static str,
        initial: V,
    ) -> &Self {
        self.inner.source.setup_property(name, initial);
        self
    }

    pub fn setup_all_properties(&self) -> &Self {
        self.inner.source.setup_all_properties();
        self
    }

    pub fn when(&self, condition: impl Fn() -> bool + 'static) -> Conditional<T> {
        self.inner.source.when(condition)
    }

    pub fn set_returns_default<R: Clone + 'static>(&self, value: R) {
        self.inner.source.set_returns_default(value)
    }

    pub fn raise(&self, event: &str, args: Vec<Value>) {
        self.inner.source.raise(event, args)
    }

    /// Check `expectation` immediately instead of at verification time.
    pub fn verify_pattern(&self, expectation: impl Into<Expectation>) -> MockResult<()> {
        self.inner.source.verify_pattern(expectation)
    }

    /// Number of recorded verification actions.
    pub fn expectation_count(&self) -> usize {
        self.inner.verify_actions.len()
    }

    pub fn verify(&self) -> MockResult<()> {
        tracing::debug!(mock = self.inner.source.name(), "verifying proxy");
        self.inner.verify_actions.run_all()?;
        self.inner.source.verify()
    }

    pub fn verify_all(&self) -> MockResult<()> {
        tracing::debug!(mock = self.inner.source.name(), "verifying proxy (all setups)");
        self.inner.verify_actions.run_all()?;
        self.inner.source.verify_all()
    }
}

impl<T: Capability> ProxyVerify for MockProxy<T> {
    fn mock_id(&self) -> MockId {
        self.id()
    }

    fn verify(&self) -> MockResult<()> {
        MockProxy::verify(self)
    }

    fn verify_all(&self) -> MockResult<()> {
        MockProxy::verify_all(self)
    }

    fn verify_expectations(&self) -> MockResult<()> {
        self.inner.verify_actions.run_all()
    }

    fn actions_key(&self) -> *const () {
        Rc::as_ptr(&self.inner.verify_actions) as *const ()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl<T: Capability> Clone for MockProxy<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Capability> Debug for MockProxy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockProxy")
            .field("mock", &self.inner.source.name())
            .field("verify_actions", &self.inner.verify_actions)
            .finish()
    }
}
