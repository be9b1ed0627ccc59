use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::error::{MockError, MockResult, VerifyError};
use crate::mock::{Capability, MockBehavior, MockId, MockObject};
use crate::proxy::{MockProxy, ProxyVerify};
use crate::repository::MockRepository;
use crate::value::Value;

/// Reference identity of a [Factory].
///
/// Two keys are equal exactly when they were taken from clones of the same factory.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct DelegateKey(usize);

/// A shared function producing a [Preparable], used as the key of a customization.
pub struct Factory<P> {
    func: Rc<dyn Fn() -> P>,
}

impl<P: 'static> Factory<P> {
    pub fn new(func: impl Fn() -> P + 'static) -> Self {
        Self {
            func: Rc::new(func),
        }
    }

    pub fn key(&self) -> DelegateKey {
        DelegateKey(Rc::as_ptr(&self.func) as *const () as usize)
    }

    pub fn produce(&self) -> P {
        (self.func)()
    }
}

impl<P> Clone for Factory<P> {
    fn clone(&self) -> Self {
        Self {
            func: self.func.clone(),
        }
    }
}

impl<P> fmt::Debug for Factory<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Factory({:p})", Rc::as_ptr(&self.func) as *const ())
    }
}

/// Something that knows how to materialize itself into a proxy against a storage.
///
/// The preparable decides the mocked capability and the behavior of the mock it creates.
pub trait Preparable {
    type Capability: Capability;

    fn body_by(self, storage: &MockStorage) -> MockProxy<Self::Capability>;
}

/// Handle passed to the closure given to [MockStorage::customize].
pub struct Customizer<'s> {
    storage: &'s MockStorage,
}

impl<'s> Customizer<'s> {
    /// Produce a preparable from `factory`, materialize it and associate the resulting proxy
    /// with the factory.
    ///
    /// The proxy is returned so expectations can be chained onto it directly.
    pub fn resolve<P>(&self, factory: &Factory<P>) -> MockProxy<P::Capability>
    where
        P: Preparable + 'static,
    {
        let proxy = factory.produce().body_by(self.storage);
        self.storage.assign(factory, &proxy);
        proxy
    }

    pub fn storage(&self) -> &'s MockStorage {
        self.storage
    }
}

struct DelegateEntry {
    proxy: Rc<dyn ProxyVerify>,
    // Keeps the factory allocation alive, so its key cannot be reused while the entry exists.
    _factory: Box<dyn Any>,
}

/// Registry of proxies on top of a [MockRepository].
///
/// Every mock the repository knows about is verified by [MockStorage::verify]: through its
/// proxy when one was registered, otherwise directly.
pub struct MockStorage {
    repository: MockRepository,
    proxies: RefCell<HashMap<MockId, Vec<Rc<dyn ProxyVerify>>>>,
    delegates: RefCell<HashMap<DelegateKey, DelegateEntry>>,
}

impl MockStorage {
    pub fn new(default_behavior: MockBehavior) -> Self {
        Self {
            repository: MockRepository::new(default_behavior),
            proxies: RefCell::new(HashMap::new()),
            delegates: RefCell::new(HashMap::new()),
        }
    }

    pub fn default_behavior(&self) -> MockBehavior {
        self.repository.default_behavior()
    }

    /// The underlying repository. Mocks created through it directly are bare: they have no proxy,
    /// but are still verified by the storage.
    pub fn repository(&self) -> &MockRepository {
        &self.repository
    }

    pub fn create<T: Capability>(&self) -> MockProxy<T> {
        self.create_with(self.default_behavior(), vec![])
    }

    pub fn create_with_behavior<T: Capability>(&self, behavior: MockBehavior) -> MockProxy<T> {
        self.create_with(behavior, vec![])
    }

    pub fn create_with_args<T: Capability>(&self, ctor_args: Vec<Value>) -> MockProxy<T> {
        self.create_with(self.default_behavior(), ctor_args)
    }

    /// Create a mock and wrap it in a fresh proxy. No two calls share a proxy.
    pub fn create_with<T: Capability>(
        &self,
        behavior: MockBehavior,
        ctor_args: Vec<Value>,
    ) -> MockProxy<T> {
        let proxy = MockProxy::new(self.repository.create_with(behavior, ctor_args));
        self.register(Rc::new(proxy.clone()));
        proxy
    }

    /// Associate `factory` with `proxy`, replacing any previous association of the factory.
    ///
    /// A proxy over a mock this storage does not know yet is adopted, so it takes part in verification.
    /// A second proxy over an already known mock is registered next to the first one.
    pub fn assign<P, T>(&self, factory: &Factory<P>, proxy: &MockProxy<T>)
    where
        P: 'static,
        T: Capability,
    {
        self.repository.adopt(proxy.mock());

        let registered: Rc<dyn ProxyVerify> = Rc::new(proxy.clone());
        self.register(registered.clone());

        let previous = self.delegates.borrow_mut().insert(
            factory.key(),
            DelegateEntry {
                proxy: registered,
                _factory: Box::new(factory.clone()),
            },
        );

        tracing::debug!(
            key = ?factory.key(),
            mock = proxy.mock().name(),
            replaced = previous.is_some(),
            "assigned proxy"
        );
    }

    fn register(&self, proxy: Rc<dyn ProxyVerify>) {
        let mut proxies = self.proxies.borrow_mut();
        let registered = proxies.entry(proxy.mock_id()).or_default();
        if !registered
            .iter()
            .any(|known| known.actions_key() == proxy.actions_key())
        {
            registered.push(proxy);
        }
    }

    /// Run `configure` with a [Customizer] bound to this storage.
    pub fn customize(&self, configure: impl FnOnce(&Customizer<'_>)) -> &Self {
        tracing::debug!("applying customization");
        configure(&Customizer { storage: self });
        self
    }

    /// The proxy associated with `key`, if it exists and wraps a mock of capability `T`.
    pub fn lookup<T: Capability>(&self, key: DelegateKey) -> Option<MockProxy<T>> {
        let delegates = self.delegates.borrow();
        let proxy = delegates
            .get(&key)?
            .proxy
            .as_any()
            .downcast_ref::<MockProxy<T>>()
            .cloned();
        proxy
    }

    /// The proxy most recently associated with `factory`.
    pub fn proxy_for<P>(&self, factory: &Factory<P>) -> Option<MockProxy<P::Capability>>
    where
        P: Preparable + 'static,
    {
        self.lookup(factory.key())
    }

    /// Number of mocks with at least one registered proxy.
    pub fn proxy_count(&self) -> usize {
        self.proxies.borrow().len()
    }

    /// Number of factories with an associated proxy.
    pub fn delegate_count(&self) -> usize {
        self.delegates.borrow().len()
    }

    /// Verify every mock known to the repository, in creation order.
    ///
    /// All mocks are checked even after a failure. Within one mock, only the first failing
    /// expectation is reported: the expectations of its proxies run in registration order, then
    /// the mock's own setups are checked once.
    pub fn verify(&self) -> Result<(), VerifyError> {
        self.verify_mocks(false)
    }

    /// Like [MockStorage::verify], but every setup must have been matched, verifiable or not.
    pub fn verify_all(&self) -> Result<(), VerifyError> {
        self.verify_mocks(true)
    }

    fn verify_mocks(&self, all: bool) -> Result<(), VerifyError> {
        let result = self.repository.verify_mocks(|state| {
            let proxies = self
                .proxies
                .borrow()
                .get(&state.id())
                .cloned()
                .unwrap_or_default();
            for proxy in &proxies {
                proxy.verify_expectations()?;
            }
            state.verify_setups(all)
        });

        match &result {
            Ok(()) => tracing::debug!(mocks = self.repository.len(), all, "verified storage"),
            Err(error) => tracing::debug!(
                mocks = error.checked(),
                failed = error.failures().len(),
                all,
                "storage verification failed"
            ),
        }

        result
    }

    /// Query-style extraction of mock objects is not supported.
    pub fn of<T: Capability>(&self) -> MockResult<Vec<MockObject<T>>> {
        Err(MockError::Unsupported {
            operation: "MockStorage::of",
        })
    }

    /// Query-style extraction of mock objects is not supported.
    pub fn of_where<T: Capability>(
        &self,
        _specification: impl Fn(&MockObject<T>) -> bool,
    ) -> MockResult<Vec<MockObject<T>>> {
        Err(MockError::Unsupported {
            operation: "MockStorage::of_where",
        })
    }

    /// Query-style extraction of mock objects is not supported.
    pub fn one_of<T: Capability>(&self) -> MockResult<MockObject<T>> {
        Err(MockError::Unsupported {
            operation: "MockStorage::one_of",
        })
    }

    /// Query-style extraction of mock objects is not supported.
    pub fn one_of_where<T: Capability>(
        &self,
        _specification: impl Fn(&MockObject<T>) -> bool,
    ) -> MockResult<MockObject<T>> {
        Err(MockError::Unsupported {
            operation: "MockStorage::one_of_where",
        })
    }
}

impl Default for MockStorage {
    fn default() -> Self {
        Self::new(MockBehavior::default())
    }
}

impl fmt::Debug for MockStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockStorage")
            .field("default_behavior", &self.default_behavior())
            .field("mocks", &self.repository.len())
            .field("proxies", &self.proxy_count())
            .field("delegates", &self.delegate_count())
            .finish()
    }
}
