use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{MockResult, VerifyError};
use crate::mock::{Capability, Mock, MockBehavior, MockId, MockState};
use crate::value::Value;

/// Factory that creates mocks with a shared default behavior and remembers them in creation order.
#[derive(Default)]
pub struct MockRepository {
    default_behavior: MockBehavior,
    mocks: RefCell<Vec<Rc<MockState>>>,
}

impl MockRepository {
    pub fn new(default_behavior: MockBehavior) -> Self {
        Self {
            default_behavior,
            mocks: RefCell::new(vec![]),
        }
    }

    pub fn default_behavior(&self) -> MockBehavior {
        self.default_behavior
    }

    pub fn create<T: Capability>(&self) -> Mock<T> {
        self.create_with(self.default_behavior, vec![])
    }

    pub fn create_with_behavior<T: Capability>(&self, behavior: MockBehavior) -> Mock<T> {
        self.create_with(behavior, vec![])
    }

    pub fn create_with_args<T: Capability>(&self, ctor_args: Vec<Value>) -> Mock<T> {
        self.create_with(self.default_behavior, ctor_args)
    }

    pub fn create_with<T: Capability>(
        &self,
        behavior: MockBehavior,
        ctor_args: Vec<Value>,
    ) -> Mock<T> {
        let mock = Mock::with_args(behavior, ctor_args);
        self.mocks.borrow_mut().push(mock.state().clone());
        mock
    }

    /// Start tracking a mock created elsewhere. Returns `false` if it was already tracked.
    pub fn adopt<T: Capability>(&self, mock: &Mock<T>) -> bool {
        if self.contains(mock.id()) {
            return false;
        }
        self.mocks.borrow_mut().push(mock.state().clone());
        true
    }

    pub fn contains(&self, id: MockId) -> bool {
        self.mocks.borrow().iter().any(|state| state.id() == id)
    }

    /// Ids of all tracked mocks, in creation order.
    pub fn mocks(&self) -> Vec<MockId> {
        self.mocks.borrow().iter().map(|state| state.id()).collect()
    }

    pub fn len(&self) -> usize {
        self.mocks.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.mocks.borrow().is_empty()
    }

    pub fn verify(&self) -> Result<(), VerifyError> {
        self.verify_mocks(|state| state.verify_setups(false))
    }

    pub fn verify_all(&self) -> Result<(), VerifyError> {
        self.verify_mocks(|state| state.verify_setups(true))
    }

    /// Run `verify` for every tracked mock and collect the failures.
    pub(crate) fn verify_mocks(
        &self,
        mut verify: impl FnMut(&MockState) -> MockResult<()>,
    ) -> Result<(), VerifyError> {
        // Snapshot, so verification may create or adopt mocks without a borrow conflict.
        let mocks = self.mocks.borrow().clone();
        let failures = mocks
            .iter()
            .filter_map(|state| verify(state).err())
            .collect();

        VerifyError::from_failures(mocks.len(), failures)
    }
}
