use std::sync::Arc;

use crate::host::{LoadedImage, Value};
use crate::symbol::Symbol;
use crate::{Error, Result};

/// The mutable per-call record passed to before/after hooks.
///
/// One context is constructed for each intercepted call and dropped when the
/// call completes; it has no existence outside the call's duration and is
/// never shared between concurrent calls, so no locking guards its fields.
///
/// Before-hooks may rewrite arguments in place or supply a result directly
/// with [`InterceptContext::set_result`], which causes the original body to
/// be skipped. After-hooks observe the current result or error - whether it
/// came from the original body or from an earlier hook - and may overwrite
/// it. Whatever the context holds when the last after-hook returns is what
/// the original caller receives, indistinguishable from a normal return.
pub struct InterceptContext {
    symbol: Symbol,
    image: Arc<LoadedImage>,
    target: Option<Value>,
    args: Vec<Value>,
    result: Value,
    error: Option<Error>,
    skip_original: bool,
    body_completed: bool,
}

impl InterceptContext {
    pub(crate) fn new(
        symbol: Symbol,
        image: Arc<LoadedImage>,
        target: Option<Value>,
        args: Vec<Value>,
    ) -> Self {
        InterceptContext {
            symbol,
            image,
            target,
            args,
            result: Value::Null,
            error: None,
            skip_original: false,
            body_completed: false,
        }
    }

    /// Identity of the invoked symbol
    #[must_use]
    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// The instance target, `None` for static calls
    #[must_use]
    pub fn target(&self) -> Option<&Value> {
        self.target.as_ref()
    }

    /// The current argument list
    #[must_use]
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// One argument by index
    ///
    /// # Errors
    /// Returns [`Error::ArgumentOutOfRange`] for an invalid index.
    pub fn arg(&self, index: usize) -> Result<&Value> {
        self.args.get(index).ok_or(Error::ArgumentOutOfRange {
            index,
            len: self.args.len(),
        })
    }

    /// Rewrites one argument in place.
    ///
    /// Argument rewrites in before-hooks are visible to later before-hooks
    /// and to the original body.
    ///
    /// # Errors
    /// Returns [`Error::ArgumentOutOfRange`] for an invalid index.
    pub fn set_arg(&mut self, index: usize, value: Value) -> Result<()> {
        let len = self.args.len();
        match self.args.get_mut(index) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(Error::ArgumentOutOfRange { index, len }),
        }
    }

    /// The declared result (the absent value until one is produced)
    #[must_use]
    pub fn result(&self) -> &Value {
        &self.result
    }

    /// Declares the call's result.
    ///
    /// In a before-hook this short-circuits the call: the original body is
    /// bypassed and after-hooks observe the supplied result. Later
    /// before-hooks still run and may overwrite it. In an after-hook this
    /// simply replaces the result. Any declared error is cleared.
    pub fn set_result(&mut self, value: Value) {
        self.result = value;
        self.error = None;
        if !self.body_completed {
            self.skip_original = true;
        }
    }

    /// The declared error, if the call is currently failing
    #[must_use]
    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    /// Declares that the call fails with the given error.
    ///
    /// Like [`InterceptContext::set_result`], this bypasses the original
    /// body when used in a before-hook.
    pub fn set_error(&mut self, error: Error) {
        self.error = Some(error);
        if !self.body_completed {
            self.skip_original = true;
        }
    }

    /// Removes and returns the declared error, leaving the call successful
    /// with the current result
    pub fn take_error(&mut self) -> Option<Error> {
        self.error.take()
    }

    /// True once a result or error was declared before the original body
    /// ran, meaning the body was (or will be) bypassed. Stays false when an
    /// after-hook merely overwrites the body's outcome.
    #[must_use]
    pub fn is_short_circuited(&self) -> bool {
        self.skip_original
    }

    /// Invokes the original, uninstrumented body of the intercepted method
    /// with the given arguments and this call's target.
    ///
    /// Installed hooks do not run again; this is the re-invocation path used
    /// by hooks that want the original behavior under corrected arguments.
    ///
    /// # Errors
    /// Returns whatever the original body raises.
    pub fn invoke_original(&self, args: &[Value]) -> Result<Value> {
        self.image
            .invoke_raw(self.symbol.token(), self.target.as_ref(), args)
    }

    /// Captures the original body's outcome into the context
    pub(crate) fn record_outcome(&mut self, outcome: Result<Value>) {
        self.body_completed = true;
        match outcome {
            Ok(value) => {
                self.result = value;
                self.error = None;
            }
            Err(error) => self.error = Some(error),
        }
    }

    /// Finalizes the call: the declared error wins over the declared result
    pub(crate) fn into_outcome(self) -> Result<Value> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.result),
        }
    }
}
