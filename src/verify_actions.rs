use std::cell::RefCell;
use std::fmt;

use crate::error::MockResult;

type Action = Box<dyn Fn() -> MockResult<()>>;

/// Ordered list of deferred verification checks.
///
/// Each action re-reads the mock's recorded invocations when it runs, so the outcome always
/// reflects the invocations at the time of verification, not at the time of recording.
#[derive(Default)]
pub struct VerifyActions {
    actions: RefCell<Vec<Action>>,
}

impl VerifyActions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an action. Actions run in the order they were recorded.
    pub fn record(&self, action: impl Fn() -> MockResult<()> + 'static) {
        self.actions.borrow_mut().push(Box::new(action));
    }

    /// Run every action in order, stopping at the first failure.
    ///
    /// Running the actions does not consume them; a second run checks them again.
    pub fn run_all(&self) -> MockResult<()> {
        let actions = self.actions.borrow();
        for action in actions.iter() {
            action()?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.actions.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.borrow().is_empty()
    }
}

impl fmt::Debug for VerifyActions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerifyActions")
            .field("len", &self.len())
            .finish()
    }
}
