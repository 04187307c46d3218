use std::sync::Arc;

use dashmap::DashMap;

use crate::hook::InterceptContext;
use crate::host::{LoadedImage, SymbolToken, Value};
use crate::symbol::Symbol;
use crate::{Error, Result};

/// A before/after callback installed on a symbol.
///
/// Callbacks run synchronously on the calling thread of the intercepted
/// call. A callback returning `Err` is recorded as a diagnostic and skipped;
/// it never alters the call path.
pub type HookFn = Arc<dyn Fn(&mut InterceptContext) -> Result<()> + Send + Sync>;

/// Zero-or-one before-callback and zero-or-one after-callback, installed as
/// one unit on a symbol.
#[derive(Clone, Default)]
pub struct HookPair {
    pub(crate) before: Option<HookFn>,
    pub(crate) after: Option<HookFn>,
}

impl HookPair {
    /// An empty pair; useful as a starting point for the `with_` builders
    #[must_use]
    pub fn new() -> Self {
        HookPair::default()
    }

    /// A pair with only a before-callback
    #[must_use]
    pub fn before<F>(callback: F) -> Self
    where
        F: Fn(&mut InterceptContext) -> Result<()> + Send + Sync + 'static,
    {
        HookPair::new().with_before(callback)
    }

    /// A pair with only an after-callback
    #[must_use]
    pub fn after<F>(callback: F) -> Self
    where
        F: Fn(&mut InterceptContext) -> Result<()> + Send + Sync + 'static,
    {
        HookPair::new().with_after(callback)
    }

    /// Sets the before-callback
    #[must_use]
    pub fn with_before<F>(mut self, callback: F) -> Self
    where
        F: Fn(&mut InterceptContext) -> Result<()> + Send + Sync + 'static,
    {
        self.before = Some(Arc::new(callback));
        self
    }

    /// Sets the after-callback
    #[must_use]
    pub fn with_after<F>(mut self, callback: F) -> Self
    where
        F: Fn(&mut InterceptContext) -> Result<()> + Send + Sync + 'static,
    {
        self.after = Some(Arc::new(callback));
        self
    }

    /// True when neither callback is set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.before.is_none() && self.after.is_none()
    }
}

/// Process-scoped registry of interception points: one ordered callback
/// chain per hooked symbol.
///
/// This is the single controlled indirection layer between the host's
/// dispatch and the installed hooks. Installation happens once, during the
/// single-threaded setup phase at module load; dispatch may then run
/// concurrently from any number of threads. The registry layout (keyed
/// chains) deliberately leaves room for an uninstall operation, though none
/// is offered today.
///
/// Execution order within one chain is installation order. Order across
/// independent patches is unspecified; a patch must only depend on its own
/// hooks.
pub struct HookRegistry {
    chains: DashMap<SymbolToken, Vec<HookPair>>,
}

impl Default for HookRegistry {
    fn default() -> Self {
        HookRegistry::new()
    }
}

impl HookRegistry {
    /// Creates an empty registry
    #[must_use]
    pub fn new() -> Self {
        HookRegistry {
            chains: DashMap::new(),
        }
    }

    /// Installs a callback pair on a resolved symbol.
    ///
    /// Every subsequent invocation of the symbol through the dispatch layer
    /// routes through the pair, for the remaining lifetime of the process.
    ///
    /// # Errors
    /// Returns [`Error::InstallRejected`] when the symbol is not callable,
    /// not present in the image, or its dispatch cannot be modified (native
    /// methods). The failure is per-symbol; nothing else is affected.
    pub fn install(&self, image: &LoadedImage, symbol: &Symbol, pair: HookPair) -> Result<()> {
        if !symbol.kind().is_callable() {
            return Err(Error::InstallRejected {
                symbol: symbol.token(),
                reason: format!("symbol kind {} is not callable", symbol.kind()),
            });
        }
        let Some(method) = image.method(symbol.token()) else {
            return Err(Error::InstallRejected {
                symbol: symbol.token(),
                reason: "symbol is not present in the loaded image".to_string(),
            });
        };
        if !method.is_hookable() {
            return Err(Error::InstallRejected {
                symbol: symbol.token(),
                reason: "native method dispatch cannot be modified".to_string(),
            });
        }

        self.chains.entry(symbol.token()).or_default().push(pair);
        tracing::debug!(
            symbol = %symbol.token(),
            target = %symbol.full_name(),
            "hook installed"
        );
        Ok(())
    }

    /// True when at least one pair is installed on the token
    #[must_use]
    pub fn has_hooks(&self, token: SymbolToken) -> bool {
        self.chains.get(&token).is_some_and(|chain| !chain.is_empty())
    }

    /// Number of pairs installed on the token
    #[must_use]
    pub fn hook_count(&self, token: SymbolToken) -> usize {
        self.chains.get(&token).map_or(0, |chain| chain.len())
    }

    /// Runs the interception protocol for one call.
    ///
    /// (1) build the context; (2) before-callbacks in installation order;
    /// (3) the original body, unless a before-callback declared a result or
    /// error; (4) after-callbacks in installation order; (5) the final
    /// result or error, exactly as a normal return.
    pub(crate) fn dispatch(
        &self,
        image: &Arc<LoadedImage>,
        symbol: Symbol,
        target: Option<Value>,
        args: Vec<Value>,
    ) -> Result<Value> {
        // Snapshot the chain so no registry guard is held while callbacks
        // run; a callback may invoke other (hooked) methods.
        let chain: Vec<HookPair> = self
            .chains
            .get(&symbol.token())
            .map(|entry| entry.clone())
            .unwrap_or_default();

        let token = symbol.token();
        let mut ctx = InterceptContext::new(symbol, Arc::clone(image), target, args);

        for pair in &chain {
            if let Some(before) = &pair.before {
                if let Err(fault) = before(&mut ctx) {
                    tracing::warn!(symbol = %token, error = %fault, "before-hook fault ignored");
                }
            }
        }

        if !ctx.is_short_circuited() {
            let outcome = image.invoke_raw(token, ctx.target(), ctx.args());
            ctx.record_outcome(outcome);
        }

        for pair in &chain {
            if let Some(after) = &pair.after {
                if let Err(fault) = after(&mut ctx) {
                    tracing::warn!(symbol = %token, error = %fault, "after-hook fault ignored");
                }
            }
        }

        ctx.into_outcome()
    }
}
