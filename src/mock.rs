use std::any::{type_name, Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::{self, Debug, Display};
use std::marker::PhantomData;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

use once_cell::sync::Lazy;

use crate::error::{MockError, MockResult};
use crate::it::Arg;
use crate::mismatch::Candidates;
use crate::pattern::{Expectation, Invocation, Pattern};
use crate::setup::{Conditional, Setup};
use crate::times::Times;
use crate::value::Value;

/// A mockable interface.
///
/// Implemented for the mock API type generated by [crate::verimock], which stands in for
/// the mocked trait wherever the engine needs to name it.
pub trait Capability: 'static {
    /// Name used in diagnostics.
    const NAME: &'static str;
    /// Properties backed by [Mock::setup_all_properties].
    const PROPERTIES: &'static [&'static str] = &[];
}

/// What a mock does with an invocation that no setup matches.
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub enum MockBehavior {
    /// Fail the invocation immediately.
    Strict,
    /// Respond with the default value of the return type.
    #[default]
    Loose,
}

/// Process-unique identity of a mock.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct MockId(usize);

impl MockId {
    fn next() -> Self {
        static NEXT_ID: AtomicUsize = AtomicUsize::new(1);
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl Display for MockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub(crate) type Responder = Rc<dyn Fn(&[Value]) -> Box<dyn Any>>;
pub(crate) type Callback = Rc<dyn Fn(&[Value])>;
pub(crate) type Condition = Rc<dyn Fn() -> bool>;

pub(crate) fn responder<F>(f: F) -> Responder
where
    F: Fn(&[Value]) -> Box<dyn Any> + 'static,
{
    Rc::new(f)
}

#[derive(Clone)]
pub(crate) enum Response {
    Value(Responder),
    Panic(String),
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub(crate) enum SetupVerification {
    /// Only checked by `verify_all`.
    Optional,
    /// Checked by both `verify` and `verify_all`.
    Verifiable(Option<String>),
    /// Covered by a proxy's verification action, skipped by the engine.
    Tracked,
}

pub(crate) struct SetupState {
    pub pattern: Pattern,
    pub condition: Option<Condition>,
    pub response: Option<Response>,
    pub callbacks: Vec<Callback>,
    pub verification: SetupVerification,
    pub matched: usize,
}

type DefaultFactory = fn() -> Box<dyn Any>;

fn default_of<T: Default + 'static>() -> Box<dyn Any> {
    Box::new(T::default())
}

static BUILTIN_DEFAULTS: Lazy<HashMap<TypeId, DefaultFactory>> = Lazy::new(|| {
    let mut defaults: HashMap<TypeId, DefaultFactory> = HashMap::new();

    macro_rules! register {
        ($($ty:ty),*) => {
            $(defaults.insert(TypeId::of::<$ty>(), default_of::<$ty>);)*
        };
    }

    register!(
        (),
        bool,
        char,
        i8,
        i16,
        i32,
        i64,
        i128,
        isize,
        u8,
        u16,
        u32,
        u64,
        u128,
        usize,
        f32,
        f64,
        String
    );

    defaults
});

/// Shared state of one mock. Every handle to the mock points here.
pub(crate) struct MockState {
    id: MockId,
    name: String,
    behavior: MockBehavior,
    ctor_args: Vec<Value>,
    inner: RefCell<MockInner>,
}

#[derive(Default)]
struct MockInner {
    setups: Vec<SetupState>,
    invocations: Vec<Invocation>,
    returns_defaults: HashMap<TypeId, Responder>,
    // `None` until the property is first written
    properties: HashMap<&'static str, Option<Value>>,
    handlers: HashMap<String, Vec<Callback>>,
}

enum Resolution {
    Matched {
        pattern: Pattern,
        response: Option<Response>,
        callbacks: Vec<Callback>,
    },
    Unmatched,
}

impl MockState {
    fn new(capability: &'static str, behavior: MockBehavior, ctor_args: Vec<Value>) -> Self {
        let id = MockId::next();
        let name = if ctor_args.is_empty() {
            format!("{capability}{id}")
        } else {
            let args = ctor_args
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            format!("{capability}{id}({args})")
        };

        tracing::debug!(mock = %name, ?behavior, "created mock");

        Self {
            id,
            name,
            behavior,
            ctor_args,
            inner: RefCell::new(MockInner::default()),
        }
    }

    pub fn id(&self) -> MockId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_setup(&self, pattern: Pattern, condition: Option<Condition>) -> usize {
        tracing::trace!(mock = %self.name, %pattern, "added setup");

        let mut inner = self.inner.borrow_mut();
        inner.setups.push(SetupState {
            pattern,
            condition,
            response: None,
            callbacks: vec![],
            verification: SetupVerification::Optional,
            matched: 0,
        });
        inner.setups.len() - 1
    }

    pub fn with_setup<R>(&self, index: usize, f: impl FnOnce(&mut SetupState) -> R) -> R {
        f(&mut self.inner.borrow_mut().setups[index])
    }

    pub fn invoke<R: 'static>(&self, invocation: Invocation) -> MockResult<R> {
        match self.resolve(&invocation) {
            Resolution::Matched {
                pattern,
                response,
                callbacks,
            } => self.respond(&invocation, &pattern, response, &callbacks),
            Resolution::Unmatched => self.fallback(&invocation),
        }
    }

    pub fn get<R: Clone + 'static>(&self, member: &'static str) -> MockResult<R> {
        let invocation = Invocation::getter(member);

        match self.resolve(&invocation) {
            Resolution::Matched {
                pattern,
                response,
                callbacks,
            } => self.respond(&invocation, &pattern, response, &callbacks),
            Resolution::Unmatched => {
                let property = self.inner.borrow().properties.get(member).cloned();
                match property {
                    Some(Some(value)) => value.downcast_ref::<R>().cloned().ok_or_else(|| {
                        MockError::ReturnTypeMismatch {
                            mock: self.name.clone(),
                            invocation: invocation.to_string(),
                            pattern: format!("property {member} = {value}"),
                            expected: type_name::<R>(),
                        }
                    }),
                    Some(None) => self.default_value(&invocation),
                    None => self.fallback(&invocation),
                }
            }
        }
    }

    pub fn set(&self, member: &'static str, value: Value) -> MockResult<()> {
        let invocation = Invocation::setter(member, value.clone());

        match self.resolve(&invocation) {
            Resolution::Matched {
                pattern,
                response,
                callbacks,
            } => self.respond(&invocation, &pattern, response, &callbacks),
            Resolution::Unmatched => {
                let stored = {
                    let mut inner = self.inner.borrow_mut();
                    match inner.properties.get_mut(member) {
                        Some(slot) => {
                            *slot = Some(value);
                            true
                        }
                        None => false,
                    }
                };

                if stored {
                    Ok(())
                } else {
                    self.fallback(&invocation)
                }
            }
        }
    }

    /// Record the invocation and find the setup responsible for it.
    ///
    /// The last matching setup wins. No borrow is held while matchers and conditions run.
    fn resolve(&self, invocation: &Invocation) -> Resolution {
        let candidates: Vec<(usize, Pattern, Option<Condition>)> = {
            let mut inner = self.inner.borrow_mut();
            inner.invocations.push(invocation.clone());
            inner
                .setups
                .iter()
                .enumerate()
                .map(|(index, setup)| (index, setup.pattern.clone(), setup.condition.clone()))
                .collect()
        };

        let found = candidates
            .into_iter()
            .rev()
            .find(|(_, pattern, condition)| {
                pattern.matches(invocation)
                    && condition.as_ref().map_or(true, |condition| condition())
            });

        match found {
            Some((index, pattern, _)) => {
                tracing::trace!(mock = %self.name, %invocation, %pattern, "matched setup");

                let mut inner = self.inner.borrow_mut();
                let setup = &mut inner.setups[index];
                setup.matched += 1;

                Resolution::Matched {
                    pattern,
                    response: setup.response.clone(),
                    callbacks: setup.callbacks.clone(),
                }
            }
            None => {
                tracing::trace!(mock = %self.name, %invocation, "no matching setup");
                Resolution::Unmatched
            }
        }
    }

    fn respond<R: 'static>(
        &self,
        invocation: &Invocation,
        pattern: &Pattern,
        response: Option<Response>,
        callbacks: &[Callback],
    ) -> MockResult<R> {
        for callback in callbacks {
            callback(invocation.args());
        }

        match response {
            Some(Response::Value(responder)) => responder(invocation.args())
                .downcast::<R>()
                .map(|output| *output)
                .map_err(|_| MockError::ReturnTypeMismatch {
                    mock: self.name.clone(),
                    invocation: invocation.to_string(),
                    pattern: pattern.to_string(),
                    expected: type_name::<R>(),
                }),
            Some(Response::Panic(msg)) => Err(MockError::ExplicitPanic {
                mock: self.name.clone(),
                invocation: invocation.to_string(),
                pattern: pattern.to_string(),
                msg,
            }),
            None => self.default_value(invocation),
        }
    }

    fn fallback<R: 'static>(&self, invocation: &Invocation) -> MockResult<R> {
        match self.behavior {
            MockBehavior::Strict => {
                let inner = self.inner.borrow();
                let candidates = Candidates::collect(
                    invocation,
                    inner.setups.iter().map(|setup| &setup.pattern).enumerate(),
                );

                Err(MockError::StrictMismatch {
                    mock: self.name.clone(),
                    invocation: invocation.to_string(),
                    candidates: candidates.to_string(),
                })
            }
            MockBehavior::Loose => self.default_value(invocation),
        }
    }

    fn default_value<R: 'static>(&self, invocation: &Invocation) -> MockResult<R> {
        let registered = self
            .inner
            .borrow()
            .returns_defaults
            .get(&TypeId::of::<R>())
            .cloned();

        let produced = match registered {
            Some(responder) => Some(responder(invocation.args())),
            None => BUILTIN_DEFAULTS
                .get(&TypeId::of::<R>())
                .map(|factory| factory()),
        };

        produced
            .and_then(|output| output.downcast::<R>().ok())
            .map(|output| *output)
            .ok_or_else(|| MockError::NoDefaultValue {
                mock: self.name.clone(),
                invocation: invocation.to_string(),
                return_type: type_name::<R>(),
            })
    }

    pub fn set_returns_default(&self, type_id: TypeId, responder: Responder) {
        self.inner
            .borrow_mut()
            .returns_defaults
            .insert(type_id, responder);
    }

    pub fn back_property(&self, name: &'static str, initial: Option<Value>) {
        let mut inner = self.inner.borrow_mut();
        match initial {
            Some(value) => {
                inner.properties.insert(name, Some(value));
            }
            None => {
                inner.properties.entry(name).or_insert(None);
            }
        }
    }

    pub fn subscribe(&self, event: &str, handler: Callback) {
        self.inner
            .borrow_mut()
            .handlers
            .entry(event.to_string())
            .or_default()
            .push(handler);
    }

    pub fn raise(&self, event: &str, args: &[Value]) {
        let handlers = self
            .inner
            .borrow()
            .handlers
            .get(event)
            .cloned()
            .unwrap_or_default();

        tracing::trace!(mock = %self.name, event, handlers = handlers.len(), "raising event");

        for handler in handlers {
            handler(args);
        }
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.inner.borrow().invocations.clone()
    }

    /// Count the recorded invocations matching `pattern` and compare against `times`.
    pub fn verify_expectation(
        &self,
        pattern: &Pattern,
        times: Times,
        fail_message: Option<&str>,
    ) -> MockResult<()> {
        let invocations = self.invocations();
        let actual = invocations
            .iter()
            .filter(|invocation| pattern.matches(invocation))
            .count();

        if times.verify(actual) {
            return Ok(());
        }

        Err(MockError::UnmetExpectation {
            mock: self.name.clone(),
            pattern: pattern.to_string(),
            times,
            actual,
            fail_message: fail_message.map(str::to_string),
            invocations: invocations.iter().map(ToString::to_string).collect(),
        })
    }

    /// Check that setups were matched. `all` includes setups not marked verifiable.
    pub fn verify_setups(&self, all: bool) -> MockResult<()> {
        let inner = self.inner.borrow();
        let unmatched: Vec<String> = inner
            .setups
            .iter()
            .filter(|setup| setup.matched == 0)
            .filter_map(|setup| match &setup.verification {
                SetupVerification::Tracked => None,
                SetupVerification::Verifiable(Some(message)) => {
                    Some(format!("{}: {message}", setup.pattern))
                }
                SetupVerification::Verifiable(None) => Some(setup.pattern.to_string()),
                SetupVerification::Optional if all => Some(setup.pattern.to_string()),
                SetupVerification::Optional => None,
            })
            .collect();

        if unmatched.is_empty() {
            Ok(())
        } else {
            Err(MockError::UnmatchedSetups {
                mock: self.name.clone(),
                setups: unmatched,
            })
        }
    }
}

/// Handle to one mock of capability `T`.
///
/// Handles are cheap to clone, and all clones share the same setups and recorded invocations.
/// The system under test never sees the mock itself, only its [MockObject].
pub struct Mock<T: Capability> {
    state: Rc<MockState>,
    capability: PhantomData<fn() -> T>,
}

impl<T: Capability> Mock<T> {
    /// Create a loose mock.
    pub fn new() -> Self {
        Self::with_args(MockBehavior::default(), vec![])
    }

    pub fn with_behavior(behavior: MockBehavior) -> Self {
        Self::with_args(behavior, vec![])
    }

    /// Create a mock with constructor arguments. They become part of the mock's name.
    pub fn with_args(behavior: MockBehavior, ctor_args: Vec<Value>) -> Self {
        Self::from_state(Rc::new(MockState::new(T::NAME, behavior, ctor_args)))
    }

    pub(crate) fn from_state(state: Rc<MockState>) -> Self {
        Self {
            state,
            capability: PhantomData,
        }
    }

    pub(crate) fn state(&self) -> &Rc<MockState> {
        &self.state
    }

    pub fn id(&self) -> MockId {
        self.state.id
    }

    pub fn name(&self) -> &str {
        self.state.name()
    }

    pub fn behavior(&self) -> MockBehavior {
        self.state.behavior
    }

    pub fn ctor_args(&self) -> &[Value] {
        &self.state.ctor_args
    }

    /// The object to hand to the system under test.
    pub fn object(&self) -> MockObject<T> {
        MockObject {
            state: self.state.clone(),
            capability: PhantomData,
        }
    }

    /// Configure how the mock responds to `pattern`.
    pub fn setup(&self, pattern: Pattern) -> Setup<T> {
        let index = self.state.add_setup(pattern, None);
        Setup::new(self.state.clone(), index)
    }

    pub fn setup_get(&self, member: &'static str) -> Setup<T> {
        self.setup(Pattern::getter(member))
    }

    pub fn setup_set<V: 'static>(&self, member: &'static str, value: Arg<V>) -> Setup<T> {
        self.setup(Pattern::setter(member, value))
    }

    /// Back a property with a stored value: writes are remembered and returned by later reads.
    pub fn setup_property<V: Clone + Debug + 'static>(
        &self,
        name: &'static str,
        initial: V,
    ) -> &Self {
        self.state.back_property(name, Some(Value::new(initial)));
        self
    }

    /// Back every property of the capability with a stored value.
    ///
    /// Properties never written read as the default value of their type.
    pub fn setup_all_properties(&self) -> &Self {
        for name in T::PROPERTIES {
            self.state.back_property(*name, None);
        }
        self
    }

    /// Start setups that only apply while `condition` holds.
    pub fn when(&self, condition: impl Fn() -> bool + 'static) -> Conditional<T> {
        Conditional::new(self.state.clone(), Rc::new(condition))
    }

    /// Register the value returned for `R` when nothing else determines a response.
    pub fn set_returns_default<R: Clone + 'static>(&self, value: R) {
        self.state.set_returns_default(
            TypeId::of::<R>(),
            responder(move |_| Box::new(value.clone()) as Box<dyn Any>),
        );
    }

    /// Invoke every handler subscribed to `event`.
    pub fn raise(&self, event: &str, args: Vec<Value>) {
        self.state.raise(event, &args);
    }

    /// Check the recorded invocations against `expectation` right now.
    ///
    /// Without an explicit count, the pattern must have matched at least once.
    pub fn verify_pattern(&self, expectation: impl Into<Expectation>) -> MockResult<()> {
        let Expectation {
            pattern,
            times,
            fail_message,
        } = expectation.into();

        self.state.verify_expectation(
            &pattern,
            times.unwrap_or_else(Times::at_least_once),
            fail_message.as_deref(),
        )
    }

    /// Check that every verifiable setup was matched at least once.
    pub fn verify(&self) -> MockResult<()> {
        self.state.verify_setups(false)
    }

    /// Check that every setup was matched at least once.
    pub fn verify_all(&self) -> MockResult<()> {
        self.state.verify_setups(true)
    }

    /// View the same mock through another capability.
    pub fn as_capability<U: Capability>(&self) -> Mock<U> {
        Mock::from_state(self.state.clone())
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.state.invocations()
    }
}

impl<T: Capability> Default for Mock<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Capability> Clone for Mock<T> {
    fn clone(&self) -> Self {
        Self::from_state(self.state.clone())
    }
}

impl<T: Capability> Debug for Mock<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Mock({})", self.state.name)
    }
}

/// The mocked object. Trait implementations generated by [crate::verimock] are implemented for this type.
pub struct MockObject<T: Capability> {
    state: Rc<MockState>,
    capability: PhantomData<fn() -> T>,
}

impl<T: Capability> MockObject<T> {
    /// The mock behind this object.
    pub fn mock(&self) -> Mock<T> {
        Mock::from_state(self.state.clone())
    }

    /// Evaluate a call, panicking with the diagnostic if the mock cannot respond.
    #[track_caller]
    pub fn invoke<R: 'static>(&self, invocation: Invocation) -> R {
        match self.try_invoke(invocation) {
            Ok(output) => output,
            Err(error) => induce_panic(error),
        }
    }

    pub fn try_invoke<R: 'static>(&self, invocation: Invocation) -> MockResult<R> {
        self.state.invoke(invocation)
    }

    /// Read a property, panicking with the diagnostic if the mock cannot respond.
    #[track_caller]
    pub fn get<R: Clone + 'static>(&self, member: &'static str) -> R {
        match self.try_get(member) {
            Ok(output) => output,
            Err(error) => induce_panic(error),
        }
    }

    pub fn try_get<R: Clone + 'static>(&self, member: &'static str) -> MockResult<R> {
        self.state.get(member)
    }

    /// Write a property, panicking with the diagnostic if the mock cannot accept it.
    #[track_caller]
    pub fn set<V: Debug + 'static>(&self, member: &'static str, value: V) {
        if let Err(error) = self.try_set(member, value) {
            induce_panic(error)
        }
    }

    pub fn try_set<V: Debug + 'static>(&self, member: &'static str, value: V) -> MockResult<()> {
        self.state.set(member, Value::new(value))
    }

    /// Subscribe to an event raised through [Mock::raise].
    pub fn subscribe(&self, event: &str, handler: impl Fn(&[Value]) + 'static) {
        self.state.subscribe(event, Rc::new(handler));
    }
}

impl<T: Capability> Clone for MockObject<T> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            capability: PhantomData,
        }
    }
}

impl<T: Capability> Debug for MockObject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MockObject({})", self.state.name)
    }
}

#[track_caller]
fn induce_panic(error: MockError) -> ! {
    tracing::debug!(%error, "mock invocation failed");
    panic!("{error}")
}
