use std::sync::Arc;

use crate::fingerprint::FingerprintResolver;
use crate::hook::{Dispatcher, HookPair, InterceptContext};
use crate::symbol::{Symbol, SymbolRef};
use crate::{Error, Result};

/// The declarative registration surface handed to patches.
///
/// A session bundles the dispatcher of the instrumented process with a
/// fingerprint resolver over its image. Patch authors say "for this
/// fingerprint, run this before/after logic" and never see the underlying
/// resolve-then-install two-step.
///
/// # Examples
///
/// ```rust
/// use hookscope::prelude::*;
/// use std::sync::Arc;
///
/// let image = ImageBuilder::new("1.0")
///     .with_class(ClassSpec::new("c").with_method(
///         MethodSpec::new("m", 0).with_string_ref("marker"),
///     ))
///     .build();
/// let session = PatchSession::new(Arc::new(Dispatcher::new(image)));
///
/// let reference = SymbolRef::new(Fingerprint::method("marked").with_string_ref("marker"));
/// session.hook_after(&reference, |ctx| {
///     ctx.set_result(Value::Int(1));
///     Ok(())
/// })?;
/// # Ok::<(), hookscope::Error>(())
/// ```
pub struct PatchSession {
    dispatcher: Arc<Dispatcher>,
    resolver: FingerprintResolver,
}

impl PatchSession {
    /// Creates a session over the given dispatcher
    #[must_use]
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        let resolver = FingerprintResolver::new(Arc::clone(dispatcher.image()));
        PatchSession {
            dispatcher,
            resolver,
        }
    }

    /// The dispatcher this session installs into
    #[must_use]
    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// The fingerprint resolver over the session's image
    #[must_use]
    pub fn resolver(&self) -> &FingerprintResolver {
        &self.resolver
    }

    /// Resolves a symbol reference against this session's image
    ///
    /// # Errors
    /// Returns [`Error::SymbolUnavailable`] on a fingerprint miss.
    pub fn resolve<'a>(&self, reference: &'a SymbolRef) -> Result<&'a Symbol> {
        reference.resolve(&self.resolver)
    }

    /// Installs a callback pair on an already-resolved symbol
    ///
    /// # Errors
    /// Returns [`Error::InstallRejected`] when the host refuses.
    pub fn install(&self, symbol: &Symbol, pair: HookPair) -> Result<()> {
        self.dispatcher.install(symbol, pair)
    }

    /// Resolves a reference and installs a callback pair on it
    ///
    /// # Errors
    /// Returns [`Error::SymbolUnavailable`] on a fingerprint miss or
    /// [`Error::InstallRejected`] when the host refuses.
    pub fn hook(&self, reference: &SymbolRef, pair: HookPair) -> Result<()> {
        let symbol = self.resolve(reference)?;
        self.install(symbol, pair)
    }

    /// Resolves a reference and installs a before-callback
    ///
    /// # Errors
    /// See [`PatchSession::hook`].
    pub fn hook_before<F>(&self, reference: &SymbolRef, callback: F) -> Result<()>
    where
        F: Fn(&mut InterceptContext) -> Result<()> + Send + Sync + 'static,
    {
        self.hook(reference, HookPair::before(callback))
    }

    /// Resolves a reference and installs an after-callback
    ///
    /// # Errors
    /// See [`PatchSession::hook`].
    pub fn hook_after<F>(&self, reference: &SymbolRef, callback: F) -> Result<()>
    where
        F: Fn(&mut InterceptContext) -> Result<()> + Send + Sync + 'static,
    {
        self.hook(reference, HookPair::after(callback))
    }

    /// Resolves a class reference and installs the pair on every constructor
    /// of the class, returning how many interception points were installed.
    ///
    /// # Errors
    /// Returns [`Error::SymbolUnavailable`] when the class fingerprint
    /// misses, or [`Error::InstallRejected`] when the class declares no
    /// constructors or one of them refuses instrumentation.
    pub fn hook_constructors(&self, reference: &SymbolRef, pair: HookPair) -> Result<usize> {
        let class = self.resolve(reference)?;
        let image = self.dispatcher.image();

        let constructors = image.constructors_of(class.token());
        if constructors.is_empty() {
            return Err(Error::InstallRejected {
                symbol: class.token(),
                reason: "class declares no constructors".to_string(),
            });
        }

        let mut installed = 0;
        for entry in constructors {
            let symbol = Symbol::from_method(entry, class.name());
            self.install(&symbol, pair.clone())?;
            installed += 1;
        }
        Ok(installed)
    }
}
