use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use crate::fingerprint::{Fingerprint, ImageIndex};
use crate::host::LoadedImage;
use crate::symbol::Symbol;

/// Resolves fingerprints against one loaded image.
///
/// The first lookup triggers a full scan of the image to build the
/// [`ImageIndex`]; the cost is amortized across every fingerprint in the
/// patch set. Resolution is deterministic for a fixed image, and an
/// unmatched fingerprint is a normal `None` outcome - the binary changed
/// shape, nothing is wrong with the process.
///
/// # Thread Safety
///
/// Index construction is guarded by [`OnceLock`], so concurrent first
/// lookups build it at most once. The lookup counter is a plain relaxed
/// atomic; it exists for diagnostics and for verifying memoization in tests.
pub struct FingerprintResolver {
    image: Arc<LoadedImage>,
    index: OnceLock<ImageIndex>,
    lookups: AtomicUsize,
}

impl FingerprintResolver {
    /// Creates a resolver over the given image; no scan happens yet
    #[must_use]
    pub fn new(image: Arc<LoadedImage>) -> Self {
        FingerprintResolver {
            image,
            index: OnceLock::new(),
            lookups: AtomicUsize::new(0),
        }
    }

    /// The image this resolver queries
    #[must_use]
    pub fn image(&self) -> &Arc<LoadedImage> {
        &self.image
    }

    /// Resolves a fingerprint to the unique matching symbol.
    ///
    /// Returns `None` when no symbol matches or the match is ambiguous.
    /// Never fails: absence is an expected outcome, not an error.
    #[must_use]
    pub fn resolve(&self, fingerprint: &Fingerprint) -> Option<Symbol> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        let index = self
            .index
            .get_or_init(|| ImageIndex::build(Arc::clone(&self.image)));

        match index.find(fingerprint) {
            Some(symbol) => {
                tracing::debug!(
                    label = fingerprint.label(),
                    symbol = %symbol.token(),
                    target = %symbol.full_name(),
                    "fingerprint resolved"
                );
                Some(symbol)
            }
            None => {
                tracing::debug!(label = fingerprint.label(), "fingerprint matched nothing");
                None
            }
        }
    }

    /// Number of full lookups performed so far (cache hits on
    /// [`crate::SymbolRef`] do not reach the resolver)
    #[must_use]
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{ClassSpec, ImageBuilder, MethodSpec};

    #[test]
    fn test_resolution_is_deterministic() {
        let image = ImageBuilder::new("1.0")
            .with_class(
                ClassSpec::new("a")
                    .with_method(MethodSpec::new("x", 0).with_string_ref("alpha"))
                    .with_method(MethodSpec::new("y", 0).with_string_ref("beta")),
            )
            .build();
        let resolver = FingerprintResolver::new(image);

        let fp = Fingerprint::method("alpha_method").with_string_ref("alpha");
        let first = resolver.resolve(&fp).unwrap();
        let second = resolver.resolve(&fp).unwrap();

        assert_eq!(first.token(), second.token());
        assert_eq!(resolver.lookup_count(), 2);
    }

    #[test]
    fn test_miss_is_not_an_error() {
        let image = ImageBuilder::new("1.0").build();
        let resolver = FingerprintResolver::new(image);

        let fp = Fingerprint::method("anything").with_string_ref("absent");
        assert!(resolver.resolve(&fp).is_none());
    }
}
