//! The interception layer: per-call contexts, the hook registry and the
//! instrumented dispatch surface.
//!
//! # Key Components
//!
//! - [`InterceptContext`] - the mutable record one intercepted call exposes
//!   to its hooks: target, arguments, declared result/error, symbol identity
//! - [`HookPair`] / [`HookFn`] - the before/after callback pair installed on
//!   a symbol
//! - [`HookRegistry`] - process-scoped map from symbol token to its ordered
//!   callback chain, the single controlled indirection layer
//! - [`Dispatcher`] - the call surface the host routes through; unhooked
//!   symbols take the original path untouched
//!
//! # Dispatch Protocol
//!
//! For each intercepted call: construct the context; run before-callbacks in
//! installation order (argument rewrites are cumulative; declaring a result
//! bypasses the original body); run the original body unless bypassed,
//! capturing its result or raised error; run after-callbacks in installation
//! order (each observes the previous one's mutation); hand the final result
//! or error to the caller. The caller cannot tell from the call's own local
//! effects that interception occurred.
//!
//! # Thread Safety
//!
//! Installation happens once, synchronously, during module setup. Dispatch
//! is safe under concurrent invocation of the same hooked symbol: chains are
//! snapshotted per call and contexts are stack-local.

mod context;
mod dispatcher;
mod registry;

pub use context::InterceptContext;
pub use dispatcher::Dispatcher;
pub use registry::{HookFn, HookPair, HookRegistry};
