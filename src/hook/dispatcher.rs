use std::sync::Arc;

use crate::hook::{HookPair, HookRegistry};
use crate::host::{LoadedImage, SymbolToken, Value};
use crate::symbol::Symbol;
use crate::{Error, Result};

/// The instrumented call surface over one loaded image.
///
/// The host's call sites go through [`Dispatcher::invoke`]; calls to symbols
/// with installed hooks run the interception protocol, every other call is
/// forwarded to the original body untouched. This pairing of image and
/// [`HookRegistry`] is constructed once at startup, populated during the
/// setup phase, and read-only afterwards.
///
/// # Examples
///
/// ```rust
/// use hookscope::prelude::*;
/// use std::sync::Arc;
///
/// let image = ImageBuilder::new("1.0")
///     .with_class(ClassSpec::new("c").with_method(
///         MethodSpec::new("echo", 1).with_body(|_, args| Ok(args[0].clone())),
///     ))
///     .build();
/// let dispatcher = Dispatcher::new(image);
///
/// let token = dispatcher.image().methods()[0].token();
/// let out = dispatcher.invoke(token, None, &[Value::Int(5)])?;
/// assert_eq!(out, Value::Int(5));
/// # Ok::<(), hookscope::Error>(())
/// ```
pub struct Dispatcher {
    image: Arc<LoadedImage>,
    hooks: Arc<HookRegistry>,
}

impl Dispatcher {
    /// Creates a dispatcher with an empty hook registry
    #[must_use]
    pub fn new(image: Arc<LoadedImage>) -> Self {
        Dispatcher {
            image,
            hooks: Arc::new(HookRegistry::new()),
        }
    }

    /// The image this dispatcher fronts
    #[must_use]
    pub fn image(&self) -> &Arc<LoadedImage> {
        &self.image
    }

    /// The hook registry behind this dispatcher
    #[must_use]
    pub fn hooks(&self) -> &Arc<HookRegistry> {
        &self.hooks
    }

    /// Installs a callback pair on a resolved symbol
    ///
    /// # Errors
    /// Returns [`Error::InstallRejected`] when the host refuses, see
    /// [`HookRegistry::install`].
    pub fn install(&self, symbol: &Symbol, pair: HookPair) -> Result<()> {
        self.hooks.install(&self.image, symbol, pair)
    }

    /// Invokes a method through the interception layer.
    ///
    /// For symbols without installed hooks this is exactly the original
    /// call; for hooked symbols the interception protocol runs and the final
    /// declared result or error is returned as if the method always behaved
    /// that way.
    ///
    /// # Errors
    /// Returns [`Error::SymbolNotFound`] for a stale token, otherwise
    /// whatever the call (original or intercepted) produces.
    pub fn invoke(
        &self,
        token: SymbolToken,
        target: Option<&Value>,
        args: &[Value],
    ) -> Result<Value> {
        let method = self.image.method(token).ok_or(Error::SymbolNotFound(token))?;

        if !self.hooks.has_hooks(token) {
            return self.image.invoke_raw(token, target, args);
        }

        let class_name = self
            .image
            .class(method.class_token())
            .map_or("", |c| c.name());
        let symbol = Symbol::from_method(method, class_name);
        self.hooks
            .dispatch(&self.image, symbol, target.cloned(), args.to_vec())
    }

    /// Invokes the original, uninstrumented body, bypassing all hooks
    ///
    /// # Errors
    /// Returns [`Error::SymbolNotFound`] for a stale token, otherwise
    /// whatever the original body produces.
    pub fn invoke_original(
        &self,
        token: SymbolToken,
        target: Option<&Value>,
        args: &[Value],
    ) -> Result<Value> {
        self.image.invoke_raw(token, target, args)
    }
}
