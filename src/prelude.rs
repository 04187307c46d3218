//! # hookscope Prelude
//!
//! This module provides a convenient prelude for the most commonly used
//! types from the hookscope library. Import it to get quick access to the
//! essentials for fingerprint resolution and hook installation.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all hookscope operations
pub use crate::Error;

/// The result type used throughout hookscope
pub use crate::Result;

// ================================================================================================
// Host Surface
// ================================================================================================

/// Packed symbol identity and its kind tag
pub use crate::host::{SymbolKind, SymbolToken};

/// Dynamic values crossing the hook boundary
pub use crate::host::{ObjectHandle, Value, ValueKind};

/// The loaded image and declarative construction of one
pub use crate::host::{ClassSpec, FieldSpec, ImageBuilder, LoadedImage, MethodFlags, MethodSpec};

// ================================================================================================
// Resolution
// ================================================================================================

/// Structural symbol descriptors
pub use crate::fingerprint::Fingerprint;

/// Deterministic fingerprint resolution over one image
pub use crate::fingerprint::FingerprintResolver;

/// Resolved symbols and lazy, memoized references
pub use crate::symbol::{Symbol, SymbolRef};

// ================================================================================================
// Interception
// ================================================================================================

/// Before/after callback pairs and the per-call context
pub use crate::hook::{HookPair, InterceptContext};

/// The process-scoped registry and invocation routing
pub use crate::hook::{Dispatcher, HookRegistry};

// ================================================================================================
// Patching
// ================================================================================================

/// Patch definition and isolated batch application
pub use crate::patch::{ApplyReport, Patch, PatchError, PatchOutcome, PatchSession, PatchSet};
