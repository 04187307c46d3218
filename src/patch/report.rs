use std::fmt;

use thiserror::Error;

use crate::Error;

/// Failure of one patch, recorded in the [`ApplyReport`].
///
/// Wraps the underlying error (resolution miss, install rejection, setup
/// fault) together with the patch name, so diagnostics can be read without
/// cross-referencing the patch set.
#[derive(Error, Debug)]
#[error("patch '{patch}' did not apply - {source}")]
pub struct PatchError {
    /// Name of the patch that failed
    pub patch: &'static str,
    /// The error that stopped it
    #[source]
    pub source: Error,
}

/// Outcome of one patch in a batch application
#[derive(Debug)]
pub struct PatchOutcome {
    pub(crate) name: &'static str,
    pub(crate) result: Result<(), PatchError>,
}

impl PatchOutcome {
    /// Name of the patch
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The patch's result
    #[must_use]
    pub fn result(&self) -> &Result<(), PatchError> {
        &self.result
    }

    /// True when the patch applied fully
    #[must_use]
    pub fn is_applied(&self) -> bool {
        self.result.is_ok()
    }
}

/// Aggregated result of [`crate::PatchSet::apply_all`].
///
/// Failure isolation is a contract, not a side effect: every patch appears
/// here exactly once with its own `Result`, and a recorded failure implies
/// only that the corresponding behavioral modification did not take effect -
/// the original behavior remains observable, which is always a safe
/// fallback.
#[derive(Debug, Default)]
pub struct ApplyReport {
    outcomes: Vec<PatchOutcome>,
}

impl ApplyReport {
    pub(crate) fn record(&mut self, name: &'static str, result: Result<(), PatchError>) {
        self.outcomes.push(PatchOutcome { name, result });
    }

    /// Per-patch outcomes, in application order
    #[must_use]
    pub fn outcomes(&self) -> &[PatchOutcome] {
        &self.outcomes
    }

    /// Number of patches that applied fully
    #[must_use]
    pub fn applied(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_applied()).count()
    }

    /// Number of patches that failed
    #[must_use]
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.applied()
    }

    /// True when every patch applied
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed() == 0
    }

    /// Iterates over the recorded failures
    pub fn failures(&self) -> impl Iterator<Item = &PatchError> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err())
    }
}

impl fmt::Display for ApplyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} patches applied",
            self.applied(),
            self.outcomes.len()
        )?;
        for failure in self.failures() {
            write!(f, "; {failure}")?;
        }
        Ok(())
    }
}
