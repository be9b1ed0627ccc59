use std::fmt::{self, Display};

use crate::it::{Arg, DynArg};
use crate::times::Times;
use crate::value::Value;

/// The shape of a member access.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum PatternKind {
    /// A method call with arguments.
    Call,
    /// A property read.
    Getter,
    /// A property write, carrying the written value as its only argument.
    Setter,
}

/// Describes the member accesses a setup responds to, or a verification counts.
///
/// Patterns are usually produced by the pattern constructors that [crate::verimock]
/// generates on the mock API type, e.g. `WriterMock::write(42)`.
#[derive(Clone)]
pub struct Pattern {
    kind: PatternKind,
    member: &'static str,
    args: Vec<DynArg>,
}

impl Pattern {
    pub fn call(member: &'static str) -> Self {
        Self {
            kind: PatternKind::Call,
            member,
            args: vec![],
        }
    }

    pub fn getter(member: &'static str) -> Self {
        Self {
            kind: PatternKind::Getter,
            member,
            args: vec![],
        }
    }

    pub fn setter<T: 'static>(member: &'static str, value: Arg<T>) -> Self {
        Self {
            kind: PatternKind::Setter,
            member,
            args: vec![value.into_dyn()],
        }
    }

    /// Append an argument matcher to a call pattern.
    pub fn arg<T: 'static>(mut self, arg: Arg<T>) -> Self {
        if self.kind != PatternKind::Call {
            panic!("Arguments can only be appended to call patterns, {self} is not a call");
        }
        self.args.push(arg.into_dyn());
        self
    }

    pub fn kind(&self) -> PatternKind {
        self.kind
    }

    pub fn member(&self) -> &'static str {
        self.member
    }

    pub fn matches(&self, invocation: &Invocation) -> bool {
        self.kind == invocation.kind
            && self.member == invocation.member
            && self.args.len() == invocation.args.len()
            && self
                .args
                .iter()
                .zip(invocation.args.iter())
                .all(|(arg, value)| arg.matches(value))
    }

    /// Turn this pattern into an expectation with an explicit call count.
    pub fn times(self, times: Times) -> Expectation {
        Expectation::from(self).times(times)
    }

    /// Turn this pattern into an expectation that reports `message` when unmet.
    pub fn fail_message(self, message: impl Into<String>) -> Expectation {
        Expectation::from(self).fail_message(message)
    }
}

impl Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_access(f, self.kind, self.member, &self.args)
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pattern({self})")
    }
}

/// A member access observed on a mock object.
#[derive(Clone, Debug)]
pub struct Invocation {
    kind: PatternKind,
    member: &'static str,
    args: Vec<Value>,
}

impl Invocation {
    pub fn call(member: &'static str, args: Vec<Value>) -> Self {
        Self {
            kind: PatternKind::Call,
            member,
            args,
        }
    }

    pub fn getter(member: &'static str) -> Self {
        Self {
            kind: PatternKind::Getter,
            member,
            args: vec![],
        }
    }

    pub fn setter(member: &'static str, value: Value) -> Self {
        Self {
            kind: PatternKind::Setter,
            member,
            args: vec![value],
        }
    }

    pub fn kind(&self) -> PatternKind {
        self.kind
    }

    pub fn member(&self) -> &'static str {
        self.member
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }
}

impl Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_access(f, self.kind, self.member, &self.args)
    }
}

fn fmt_access<A: Display>(
    f: &mut fmt::Formatter<'_>,
    kind: PatternKind,
    member: &str,
    args: &[A],
) -> fmt::Result {
    match kind {
        PatternKind::Call => {
            write!(f, "{member}(")?;
            for (index, arg) in args.iter().enumerate() {
                if index > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{arg}")?;
            }
            write!(f, ")")
        }
        PatternKind::Getter => write!(f, "get {member}"),
        PatternKind::Setter => {
            write!(f, "set {member}")?;
            if let Some(value) = args.first() {
                write!(f, " = {value}")?;
            }
            Ok(())
        }
    }
}

/// A pattern together with the count it is expected to match and an optional failure message.
#[derive(Clone, Debug)]
pub struct Expectation {
    pub(crate) pattern: Pattern,
    pub(crate) times: Option<Times>,
    pub(crate) fail_message: Option<String>,
}

impl Expectation {
    pub fn times(mut self, times: Times) -> Self {
        self.times = Some(times);
        self
    }

    pub fn fail_message(mut self, message: impl Into<String>) -> Self {
        self.fail_message = Some(message.into());
        self
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }
}

impl From<Pattern> for Expectation {
    fn from(pattern: Pattern) -> Self {
        Self {
            pattern,
            times: None,
            fail_message: None,
        }
    }
}
