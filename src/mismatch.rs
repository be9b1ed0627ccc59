use std::fmt::{self, Display};

use crate::pattern::{Invocation, Pattern};

/// Setups on the same member that a strict invocation failed to match.
pub(crate) struct Candidates {
    actual: String,
    candidates: Vec<(usize, String)>,
}

impl Candidates {
    pub fn collect<'p>(
        invocation: &Invocation,
        patterns: impl Iterator<Item = (usize, &'p Pattern)>,
    ) -> Self {
        Self {
            actual: invocation.to_string(),
            candidates: patterns
                .filter(|(_, pattern)| {
                    pattern.member() == invocation.member() && pattern.kind() == invocation.kind()
                })
                .map(|(index, pattern)| (index, pattern.to_string()))
                .collect(),
        }
    }
}

impl Display for Candidates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.candidates.is_empty() {
            return Ok(());
        }

        writeln!(f)?;

        for (pat_index, expected) in &self.candidates {
            if *expected == self.actual {
                writeln!(f, "Setup #{pat_index} has the same rendering but did not match:")?;
                writeln!(f, "{expected}")?;
            } else {
                writeln!(f, "Mismatch for setup #{pat_index} (actual / expected):")?;
                Diff::new(&self.actual, expected).fmt(f)?;
            }
        }

        Ok(())
    }
}

struct Diff<'s> {
    actual: &'s str,
    expected: &'s str,
}

impl<'s> Diff<'s> {
    fn new(actual: &'s impl AsRef<str>, expected: &'s impl AsRef<str>) -> Self {
        Self {
            actual: actual.as_ref(),
            expected: expected.as_ref(),
        }
    }
}

impl<'s> Display for Diff<'s> {
    #[cfg(feature = "pretty-print")]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let comparison = pretty_assertions::StrComparison::new(self.actual, self.expected);
        write!(f, "{comparison}")
    }

    #[cfg(not(feature = "pretty-print"))]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  actual: {}", self.actual)?;
        writeln!(f, "expected: {}", self.expected)?;
        Ok(())
    }
}
