use std::fmt::{self, Display};

/// How many times a call pattern is expected to match recorded invocations.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Times {
    /// Exactly `n` matching invocations.
    Exactly(usize),
    /// `n` or more matching invocations.
    AtLeast(usize),
    /// `n` or fewer matching invocations.
    AtMost(usize),
    /// A count between `from` and `to`.
    Between {
        /// Lower bound.
        from: usize,
        /// Upper bound.
        to: usize,
        /// Whether the bounds themselves are accepted.
        range: Range,
    },
}

/// Whether the bounds of [Times::Between] are part of the accepted range.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Range {
    /// `from <= n <= to`
    Inclusive,
    /// `from < n < to`
    Exclusive,
}

impl Times {
    /// The pattern must never match.
    pub fn never() -> Self {
        Self::Exactly(0)
    }

    /// The pattern must match exactly one time. This is the default for expectations.
    pub fn once() -> Self {
        Self::Exactly(1)
    }

    /// The pattern must match one or more times. This is the default for one-off verification.
    pub fn at_least_once() -> Self {
        Self::AtLeast(1)
    }

    /// The pattern may match zero or one time.
    pub fn at_most_once() -> Self {
        Self::AtMost(1)
    }

    pub fn exactly(times: usize) -> Self {
        Self::Exactly(times)
    }

    pub fn at_least(times: usize) -> Self {
        Self::AtLeast(times)
    }

    pub fn at_most(times: usize) -> Self {
        Self::AtMost(times)
    }

    /// A count between two bounds.
    ///
    /// Panics if `from` is greater than `to`, or if an exclusive range leaves no valid count.
    pub fn between(from: usize, to: usize, range: Range) -> Self {
        if from > to {
            panic!("Invalid call count range: {from} is greater than {to}");
        }
        if range == Range::Exclusive && to - from < 2 {
            panic!("Invalid call count range: no count lies strictly between {from} and {to}");
        }

        Self::Between { from, to, range }
    }

    /// Check an actual count against this expectation.
    pub fn verify(&self, actual: usize) -> bool {
        match *self {
            Self::Exactly(target) => actual == target,
            Self::AtLeast(target) => actual >= target,
            Self::AtMost(target) => actual <= target,
            Self::Between {
                from,
                to,
                range: Range::Inclusive,
            } => actual >= from && actual <= to,
            Self::Between {
                from,
                to,
                range: Range::Exclusive,
            } => actual > from && actual < to,
        }
    }
}

impl Display for Times {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Exactly(target) => write!(f, "exactly {}", NCalls(target)),
            Self::AtLeast(target) => write!(f, "at least {}", NCalls(target)),
            Self::AtMost(target) => write!(f, "at most {}", NCalls(target)),
            Self::Between {
                from,
                to,
                range: Range::Inclusive,
            } => write!(f, "between {from} and {} (inclusive)", NCalls(to)),
            Self::Between {
                from,
                to,
                range: Range::Exclusive,
            } => write!(f, "between {from} and {} (exclusive)", NCalls(to)),
        }
    }
}

pub(crate) struct NCalls(pub usize);

impl Display for NCalls {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            0 => write!(f, "no calls"),
            1 => write!(f, "1 call"),
            _ => write!(f, "{} calls", self.0),
        }
    }
}
