use std::sync::OnceLock;

use crate::fingerprint::{Fingerprint, FingerprintResolver};
use crate::hook::HookPair;
use crate::patch::PatchSession;
use crate::symbol::Symbol;
use crate::{Error, Result};

/// A lazily-resolved handle to a symbol in the target binary, identified by
/// a fingerprint rather than a literal name.
///
/// References are created at patch-definition time (typically in statics),
/// long before any image has been inspected. The first call to
/// [`SymbolRef::resolve`] performs the fingerprint lookup and memoizes the
/// outcome - success or miss - for the lifetime of the process; the
/// underlying resolver is never consulted again for this reference.
///
/// # Thread Safety
///
/// Memoization uses [`OnceLock`]: if resolution races, the first completed
/// lookup wins and every caller converges on the same cached outcome.
///
/// # Examples
///
/// ```rust
/// use hookscope::prelude::*;
///
/// let image = ImageBuilder::new("1.0")
///     .with_class(ClassSpec::new("k").with_method(
///         MethodSpec::new("f", 0).with_string_ref("pivot"),
///     ))
///     .build();
/// let resolver = FingerprintResolver::new(image);
///
/// let reference = SymbolRef::new(Fingerprint::method("pivot_fn").with_string_ref("pivot"));
/// assert!(!reference.is_resolved());
///
/// let first = reference.resolve(&resolver)?.token();
/// let second = reference.resolve(&resolver)?.token();
/// assert_eq!(first, second);
/// assert_eq!(resolver.lookup_count(), 1); // second resolve was a cache hit
/// # Ok::<(), hookscope::Error>(())
/// ```
pub struct SymbolRef {
    fingerprint: Fingerprint,
    resolved: OnceLock<Option<Symbol>>,
}

impl SymbolRef {
    /// Creates an unresolved reference from a fingerprint
    #[must_use]
    pub fn new(fingerprint: Fingerprint) -> Self {
        SymbolRef {
            fingerprint,
            resolved: OnceLock::new(),
        }
    }

    /// The fingerprint this reference is defined by
    #[must_use]
    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    /// Returns true once a resolution outcome (hit or miss) is memoized
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.resolved.get().is_some()
    }

    /// Returns the memoized symbol without triggering resolution
    #[must_use]
    pub fn peek(&self) -> Option<&Symbol> {
        self.resolved.get().and_then(Option::as_ref)
    }

    /// Resolves this reference, memoizing the outcome.
    ///
    /// The fingerprint lookup runs at most once per process; subsequent calls
    /// return the cached symbol (or the cached miss) without consulting the
    /// resolver.
    ///
    /// # Errors
    /// Returns [`Error::SymbolUnavailable`] when the fingerprint matched
    /// nothing in the loaded image. This is an expected outcome after the
    /// target binary changed shape and must be caught per use site - the
    /// patch that needed the symbol does not apply, nothing else is affected.
    pub fn resolve(&self, resolver: &FingerprintResolver) -> Result<&Symbol> {
        match self
            .resolved
            .get_or_init(|| resolver.resolve(&self.fingerprint))
        {
            Some(symbol) => Ok(symbol),
            None => Err(Error::SymbolUnavailable(
                self.fingerprint.label().to_string(),
            )),
        }
    }

    /// Resolves this reference and installs a callback pair on it, so
    /// callers never see the two-step resolve-then-install dance.
    ///
    /// # Errors
    /// Returns [`Error::SymbolUnavailable`] on a fingerprint miss or
    /// [`crate::Error::InstallRejected`] when the host refuses.
    pub fn hook(&self, session: &PatchSession, pair: HookPair) -> Result<()> {
        session.hook(self, pair)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{ClassSpec, ImageBuilder, MethodSpec};

    fn resolver() -> FingerprintResolver {
        let image = ImageBuilder::new("1.0")
            .with_class(
                ClassSpec::new("k")
                    .with_method(MethodSpec::new("f", 0).with_string_ref("pivot")),
            )
            .build();
        FingerprintResolver::new(image)
    }

    #[test]
    fn test_miss_is_memoized() {
        let resolver = resolver();
        let reference =
            SymbolRef::new(Fingerprint::method("absent").with_string_ref("no-such-constant"));

        assert!(matches!(
            reference.resolve(&resolver),
            Err(Error::SymbolUnavailable(_))
        ));
        assert!(reference.is_resolved());
        assert!(reference.peek().is_none());

        // the miss is cached; the resolver is not consulted again
        assert!(reference.resolve(&resolver).is_err());
        assert_eq!(resolver.lookup_count(), 1);
    }

    #[test]
    fn test_hit_resolves_once() {
        let resolver = resolver();
        let reference = SymbolRef::new(Fingerprint::method("pivot_fn").with_string_ref("pivot"));

        let token = reference.resolve(&resolver).unwrap().token();
        let again = reference.resolve(&resolver).unwrap().token();

        assert_eq!(token, again);
        assert_eq!(resolver.lookup_count(), 1);
        assert_eq!(reference.peek().unwrap().token(), token);
    }
}
