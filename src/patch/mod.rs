//! Patches and isolated batch application.
//!
//! A [`Patch`] is a named, independent unit of behavioral modification: a
//! closure that resolves its symbol references and installs its hooks
//! through a [`PatchSession`]. A [`PatchSet`] applies patches as a batch at
//! module load, catching every failure at the patch boundary - a resolution
//! miss or install rejection in one patch never prevents its siblings from
//! applying. The outcome of the batch is an explicit [`ApplyReport`].
//!
//! # Examples
//!
//! ```rust
//! use hookscope::prelude::*;
//! use std::sync::Arc;
//!
//! let image = ImageBuilder::new("1.0")
//!     .with_class(ClassSpec::new("c").with_method(
//!         MethodSpec::new("m", 0).with_string_ref("marker"),
//!     ))
//!     .build();
//! let session = PatchSession::new(Arc::new(Dispatcher::new(image)));
//!
//! let set = PatchSet::new()
//!     .with(Patch::new("noop-hook", |session| {
//!         let reference =
//!             SymbolRef::new(Fingerprint::method("marked").with_string_ref("marker"));
//!         session.hook_after(&reference, |_| Ok(()))
//!     }))
//!     .with(Patch::new("will-miss", |session| {
//!         let reference =
//!             SymbolRef::new(Fingerprint::method("ghost").with_string_ref("nowhere"));
//!         session.hook_after(&reference, |_| Ok(()))
//!     }));
//!
//! let report = set.apply_all(&session);
//! assert_eq!(report.applied(), 1);
//! assert_eq!(report.failed(), 1);
//! ```

mod report;
mod session;

pub use report::{ApplyReport, PatchError, PatchOutcome};
pub use session::PatchSession;

use crate::Result;

/// A named, independent unit of behavioral modification.
///
/// The apply closure runs once, during the single-threaded setup phase; it
/// resolves the patch's symbol references, installs its hook registrations
/// and performs any one-time domain setup. Returning `Err` marks the patch
/// as not applied; it must not leave partial state that other patches could
/// trip over (installed hooks are fine - they only ever add behavior the
/// patch itself owns).
pub struct Patch {
    name: &'static str,
    apply: Box<dyn Fn(&PatchSession) -> Result<()> + Send + Sync>,
}

impl Patch {
    /// Creates a patch from a name and an apply closure
    #[must_use]
    pub fn new<F>(name: &'static str, apply: F) -> Self
    where
        F: Fn(&PatchSession) -> Result<()> + Send + Sync + 'static,
    {
        Patch {
            name,
            apply: Box::new(apply),
        }
    }

    /// Name of this patch, used in reports and diagnostics
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn apply(&self, session: &PatchSession) -> Result<()> {
        (self.apply)(session)
    }
}

/// An ordered collection of independent patches, applied as a batch.
#[derive(Default)]
pub struct PatchSet {
    patches: Vec<Patch>,
}

impl PatchSet {
    /// Creates an empty set
    #[must_use]
    pub fn new() -> Self {
        PatchSet::default()
    }

    /// Adds a patch
    #[must_use]
    pub fn with(mut self, patch: Patch) -> Self {
        self.patches.push(patch);
        self
    }

    /// Number of patches in the set
    #[must_use]
    pub fn len(&self) -> usize {
        self.patches.len()
    }

    /// True when the set holds no patches
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    /// Applies every patch, isolating failures at the patch boundary.
    ///
    /// Patches run in order; each failure is recorded in the report and the
    /// batch continues. Nothing here can fail the process - a patch that
    /// does not apply leaves the original behavior in place.
    #[must_use]
    pub fn apply_all(&self, session: &PatchSession) -> ApplyReport {
        let mut report = ApplyReport::default();
        for patch in &self.patches {
            match patch.apply(session) {
                Ok(()) => {
                    tracing::info!(patch = patch.name(), "patch applied");
                    report.record(patch.name(), Ok(()));
                }
                Err(source) => {
                    tracing::warn!(patch = patch.name(), error = %source, "patch did not apply");
                    report.record(
                        patch.name(),
                        Err(PatchError {
                            patch: patch.name(),
                            source,
                        }),
                    );
                }
            }
        }
        report
    }
}
