//! Argument matchers.
//!
//! A matcher describes which argument values a [crate::Pattern] accepts. Plain values
//! convert into equality matchers, so pattern constructors generated by
//! [crate::verimock] accept both `42` and `it::any()`.

use std::fmt::{self, Debug, Display};
use std::ops::RangeBounds;
use std::rc::Rc;

use crate::value::Value;

/// A typed matcher for one argument.
pub struct Arg<T> {
    matcher: Rc<dyn Fn(&T) -> bool>,
    debug: String,
}

impl<T: 'static> Arg<T> {
    /// Create a matcher from a predicate and the text that represents it in diagnostics.
    pub fn new(debug: impl Into<String>, matcher: impl Fn(&T) -> bool + 'static) -> Self {
        Self {
            matcher: Rc::new(matcher),
            debug: debug.into(),
        }
    }

    pub(crate) fn into_dyn(self) -> DynArg {
        let matcher = self.matcher;
        DynArg {
            matcher: Rc::new(move |value: &Value| match value.downcast_ref::<T>() {
                Some(value) => matcher(value),
                None => false,
            }),
            debug: self.debug,
        }
    }
}

impl<T> Clone for Arg<T> {
    fn clone(&self) -> Self {
        Self {
            matcher: self.matcher.clone(),
            debug: self.debug.clone(),
        }
    }
}

impl<T> Debug for Arg<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.debug)
    }
}

impl<T: PartialEq + Debug + 'static> From<T> for Arg<T> {
    fn from(expected: T) -> Self {
        eq(expected)
    }
}

impl From<&str> for Arg<String> {
    fn from(expected: &str) -> Self {
        eq(expected.to_string())
    }
}

/// Matches any value of type `T`.
pub fn any<T: 'static>() -> Arg<T> {
    Arg::new("_", |_| true)
}

/// Matches values equal to `expected`.
pub fn eq<T: PartialEq + Debug + 'static>(expected: T) -> Arg<T> {
    Arg::new(format!("{expected:?}"), move |actual| *actual == expected)
}

/// Matches values not equal to `unexpected`.
pub fn ne<T: PartialEq + Debug + 'static>(unexpected: T) -> Arg<T> {
    Arg::new(format!("!= {unexpected:?}"), move |actual| *actual != unexpected)
}

/// Matches values accepted by `predicate`. The label names the predicate in diagnostics.
pub fn is<T: 'static>(label: &str, predicate: impl Fn(&T) -> bool + 'static) -> Arg<T> {
    Arg::new(format!("is({label})"), predicate)
}

/// Matches values inside `range`.
pub fn in_range<T, R>(range: R) -> Arg<T>
where
    T: PartialOrd + 'static,
    R: RangeBounds<T> + Debug + 'static,
{
    Arg::new(format!("in {range:?}"), move |actual| range.contains(actual))
}

/// Type-erased matcher stored inside a pattern.
#[derive(Clone)]
pub(crate) struct DynArg {
    matcher: Rc<dyn Fn(&Value) -> bool>,
    debug: String,
}

impl DynArg {
    pub fn matches(&self, value: &Value) -> bool {
        (self.matcher)(value)
    }
}

impl Display for DynArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.debug)
    }
}
