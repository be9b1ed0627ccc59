use std::any::Any;
use std::fmt;
use std::rc::Rc;

/// A type-erased value passed to or through a mock.
///
/// Invocation arguments, constructor arguments and event arguments are stored as
/// values, so that patterns and verifications can inspect them after the fact.
/// The `Debug` rendering is captured at creation time and used in diagnostics.
#[derive(Clone)]
pub struct Value {
    inner: Rc<dyn Any>,
    debug: Rc<str>,
    type_name: &'static str,
}

impl Value {
    pub fn new<T: fmt::Debug + 'static>(value: T) -> Self {
        let debug: Rc<str> = format!("{value:?}").into();
        Self {
            inner: Rc::new(value),
            debug,
            type_name: std::any::type_name::<T>(),
        }
    }

    /// The unit value, used for members that produce nothing.
    pub fn unit() -> Self {
        Self::new(())
    }

    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.inner.downcast_ref()
    }

    pub fn is<T: 'static>(&self) -> bool {
        self.inner.is::<T>()
    }

    /// The name of the stored type, as reported by [std::any::type_name].
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.debug)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.debug)
    }
}

/// Build a `Vec<Value>` from a list of expressions.
///
/// ```rust
/// let args = verimock::values![42, "text", true];
/// assert_eq!(args.len(), 3);
/// ```
#[macro_export]
macro_rules! values {
    ($($value:expr),* $(,)?) => {
        ::std::vec![$($crate::Value::new($value)),*]
    };
}
