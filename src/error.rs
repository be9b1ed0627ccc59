use crate::times::{NCalls, Times};

/// Result of a mock operation.
pub type MockResult<T> = Result<T, MockError>;

/// A failure reported by a mock, either at call time or at verification time.
#[derive(Clone, Debug, thiserror::Error)]
#[non_exhaustive]
pub enum MockError {
    /// A pattern was not matched the expected number of times.
    #[error(
        "{}{mock}: Expected {pattern} to match {times}, but it actually matched {}.{}",
        fail_message_line(.fail_message),
        n_calls(.actual),
        recorded_invocations(.invocations)
    )]
    UnmetExpectation {
        mock: String,
        pattern: String,
        times: Times,
        actual: usize,
        fail_message: Option<String>,
        invocations: Vec<String>,
    },
    /// One or more setups were never matched by any invocation.
    #[error("{mock}: The following setups were never matched:{}", bullet_list(.setups))]
    UnmatchedSetups { mock: String, setups: Vec<String> },
    /// A strict mock was invoked in a way no setup accounts for.
    #[error("{mock}: {invocation}: No setup matches this invocation on a strict mock.{candidates}")]
    StrictMismatch {
        mock: String,
        invocation: String,
        candidates: String,
    },
    /// The response configured for a setup has a different type than the invoked member returns.
    #[error("{mock}: {invocation}: Response from {pattern} is not of the expected return type {expected}.")]
    ReturnTypeMismatch {
        mock: String,
        invocation: String,
        pattern: String,
        expected: &'static str,
    },
    /// A loose mock had to produce a value it has no default for.
    #[error("{mock}: {invocation}: No default value available for return type {return_type}. Set up a response or register one with set_returns_default().")]
    NoDefaultValue {
        mock: String,
        invocation: String,
        return_type: &'static str,
    },
    /// A setup was configured to panic.
    #[error("{mock}: {invocation}: Explicit panic from {pattern}: {msg}")]
    ExplicitPanic {
        mock: String,
        invocation: String,
        pattern: String,
        msg: String,
    },
    /// Mocks are registered by key and cannot be recovered from a query over live mocks.
    #[error("{operation} is not supported: a mock cannot be extracted from a query over live mocks.")]
    Unsupported { operation: &'static str },
}

/// Every failure found by one aggregate verification pass, in mock creation order.
#[derive(Clone, Debug, thiserror::Error)]
#[error("{} of {checked} mocks failed verification:{}", .failures.len(), numbered_list(.failures))]
pub struct VerifyError {
    checked: usize,
    // Invariant: non-empty
    failures: Vec<MockError>,
}

impl VerifyError {
    pub(crate) fn from_failures(checked: usize, failures: Vec<MockError>) -> Result<(), Self> {
        if failures.is_empty() {
            Ok(())
        } else {
            Err(Self { checked, failures })
        }
    }

    /// The number of mocks that were verified.
    pub fn checked(&self) -> usize {
        self.checked
    }

    /// All failures, one per failing mock.
    pub fn failures(&self) -> &[MockError] {
        &self.failures
    }

    /// The failure of the earliest created mock that failed.
    pub fn first(&self) -> &MockError {
        &self.failures[0]
    }
}

fn fail_message_line(fail_message: &Option<String>) -> String {
    match fail_message {
        Some(message) => format!("{message}\n"),
        None => String::new(),
    }
}

fn n_calls(actual: &usize) -> NCalls {
    NCalls(*actual)
}

fn recorded_invocations(invocations: &[String]) -> String {
    if invocations.is_empty() {
        " No invocations were recorded.".to_string()
    } else {
        format!("\nRecorded invocations:{}", bullet_list(invocations))
    }
}

fn bullet_list(items: &[String]) -> String {
    items.iter().map(|item| format!("\n  - {item}")).collect()
}

fn numbered_list(failures: &[MockError]) -> String {
    failures
        .iter()
        .enumerate()
        .map(|(index, failure)| format!("\n[{}] {failure}", index + 1))
        .collect()
}
