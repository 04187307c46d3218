use thiserror::Error;

use crate::host::SymbolToken;

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// This enum covers all possible error conditions that can occur during fingerprint
/// resolution, hook installation and interception dispatch. Each variant provides specific
/// context about the failure mode to enable appropriate error handling.
///
/// # Error Categories
///
/// ## Resolution Errors
/// - [`Error::SymbolUnavailable`] - No symbol in the loaded image matched a fingerprint
/// - [`Error::SymbolNotFound`] - A token does not refer to any symbol in the image
///
/// ## Installation Errors
/// - [`Error::InstallRejected`] - The host refused to instrument a resolved symbol
///
/// ## Dispatch Errors
/// - [`Error::CallbackFault`] - A hook callback raised an unexpected error
/// - [`Error::CallFault`] - The original method body raised an error
///
/// ## Host Object Errors
/// - [`Error::MemberNotFound`] - Field or method access on a host object failed
/// - [`Error::TypeMismatch`] - A dynamic value was not of the expected kind
/// - [`Error::ArgumentOutOfRange`] - An argument index exceeded the argument list
///
/// # Examples
///
/// ```rust
/// use hookscope::{Error, Fingerprint, SymbolRef};
/// # use hookscope::FingerprintResolver;
/// # use hookscope::host::ImageBuilder;
///
/// let image = ImageBuilder::new("1.0.0").build();
/// let resolver = FingerprintResolver::new(image);
/// let reference = SymbolRef::new(Fingerprint::method("nonexistent").with_string_ref("no-such-string"));
///
/// match reference.resolve(&resolver) {
///     Ok(symbol) => println!("resolved {}", symbol.full_name()),
///     Err(Error::SymbolUnavailable(label)) => {
///         // Expected after an app update changed the binary's shape; the
///         // corresponding patch simply does not apply.
///         eprintln!("fingerprint '{label}' matched nothing");
///     }
///     Err(e) => eprintln!("other error: {e}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// No symbol in the currently loaded image matches the fingerprint.
    ///
    /// This is the expected outcome after the target binary changed shape
    /// (an app update, a different obfuscation pass). It must be caught at
    /// the patch boundary and never treated as fatal: the original behavior
    /// of the unmatched method is always a safe fallback.
    ///
    /// The associated value is the fingerprint's diagnostic label.
    #[error("No symbol in the loaded image matches fingerprint '{0}'")]
    SymbolUnavailable(String),

    /// The host refused to install an interception point on the symbol.
    ///
    /// Raised when the resolved symbol cannot be instrumented, for example
    /// a native method whose dispatch the host does not control, or a symbol
    /// kind that is not callable. Reported per patch; sibling patches proceed.
    #[error("Host rejected instrumentation of {symbol} - {reason}")]
    InstallRejected {
        /// Token of the symbol that could not be instrumented
        symbol: SymbolToken,
        /// Host-supplied reason for the rejection
        reason: String,
    },

    /// A before/after hook callback raised an unexpected error.
    ///
    /// Callback faults are recorded as diagnostics at dispatch time and the
    /// call proceeds as if the faulting callback had not run, preserving the
    /// indistinguishability of the interception layer.
    #[error("Hook callback failed - {0}")]
    CallbackFault(String),

    /// The original method body raised an error.
    ///
    /// This models the target method throwing; the error is captured into the
    /// interception context where after-hooks may observe or replace it.
    #[error("Original method raised - {0}")]
    CallFault(String),

    /// The token does not refer to any symbol in the loaded image.
    ///
    /// Indicates a stale or foreign token was passed to the dispatch layer.
    #[error("No symbol {0} in the loaded image")]
    SymbolNotFound(SymbolToken),

    /// Field or method access on a host object failed.
    ///
    /// The named member does not exist on the object's class in the
    /// currently loaded image version.
    #[error("No member named '{0}' on this object")]
    MemberNotFound(String),

    /// A dynamic value did not have the expected kind.
    ///
    /// Returned by the typed accessors on [`crate::host::Value`] when the
    /// runtime kind differs from the requested one.
    #[error("Value is not of kind {expected}, found {found}")]
    TypeMismatch {
        /// The kind the caller asked for
        expected: crate::host::ValueKind,
        /// The kind the value actually has
        found: crate::host::ValueKind,
    },

    /// An argument index exceeded the intercepted call's argument list.
    #[error("Argument index {index} out of range for a call with {len} arguments")]
    ArgumentOutOfRange {
        /// The requested argument index
        index: usize,
        /// Number of arguments in the intercepted call
        len: usize,
    },

    /// Generic error for miscellaneous failures.
    ///
    /// Used for errors that don't fit into other categories or for wrapping
    /// patch setup failures with additional context.
    #[error("{0}")]
    Error(String),
}
