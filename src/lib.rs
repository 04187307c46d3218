// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]

//! # hookscope
//!
//! A fingerprint-based runtime patching framework: locate symbols in an
//! obfuscated application image by structural fingerprints, intercept their
//! invocations with before/after hooks, and ship behavioral modifications as
//! isolated, individually-failing patches.
//!
//! ## Features
//!
//! - **Fingerprint resolution** - Locate methods, classes, and fields by
//!   structural facts (string constants, parameter counts, neighboring
//!   calls) that survive release-to-release renames
//! - **Lazy, memoized references** - [`SymbolRef`] resolves on first use
//!   and caches the outcome, hit or miss, for the process lifetime
//! - **Method interception** - Before-hooks rewrite arguments or
//!   short-circuit the call; after-hooks observe and replace the result
//! - **Failure isolation** - A [`PatchSet`] applies each patch
//!   independently and reports per-patch outcomes; a miss or rejection
//!   never takes its siblings down
//! - **Transparent degradation** - Whatever does not apply leaves the
//!   original behavior in place, indistinguishable from an unpatched call
//!
//! ## Quick Start
//!
//! ```rust
//! use hookscope::prelude::*;
//! use std::sync::Arc;
//!
//! // An image as the host process would load it
//! let image = ImageBuilder::new("9.0.2")
//!     .with_class(ClassSpec::new("a7x").with_method(
//!         MethodSpec::new("b", 0)
//!             .with_string_ref("account-attributes")
//!             .with_body(|_, _| Ok(Value::Map(vec![]))),
//!     ))
//!     .build();
//!
//! // Hook the method located by its string constant, not its name
//! let session = PatchSession::new(Arc::new(Dispatcher::new(image)));
//! let attributes =
//!     SymbolRef::new(Fingerprint::method("attributes").with_string_ref("account-attributes"));
//! session.hook_after(&attributes, |ctx| {
//!     ctx.set_result(Value::Map(vec![("ads".to_string(), Value::Bool(false))]));
//!     Ok(())
//! })?;
//! # Ok::<(), hookscope::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`host`] - The instrumented process surface: tokens, values, the
//!   loaded image and its builder
//! - [`fingerprint`] - Structural descriptors and the deterministic
//!   resolver with its lazily-built index
//! - [`symbol`] - Resolved symbols and lazy, memoized references
//! - [`hook`] - The interception layer: contexts, callback pairs, the
//!   registry, and the dispatcher
//! - [`patch`] - Patches, sessions, batch application, and reports
//! - [`premium`] - The concrete premium-unlock patch catalog
//! - [`Error`] and [`Result`] - Error handling across the crate
//!
//! ## Error Handling
//!
//! Resolution misses and install rejections are expected operating
//! conditions, not faults; they surface as [`Error::SymbolUnavailable`] and
//! [`Error::InstallRejected`] and are caught at the patch boundary. Hook
//! callbacks returning `Err` are recorded as diagnostics and never alter
//! the intercepted call path.

#[macro_use]
pub(crate) mod macros;

pub(crate) mod error;

/// Convenient re-exports of the most commonly used types.
///
/// ```rust
/// use hookscope::prelude::*;
///
/// let fp = Fingerprint::method("attributes").with_string_ref("account-attributes");
/// let reference = SymbolRef::new(fp);
/// assert!(!reference.is_resolved());
/// ```
pub mod prelude;

/// Host process surface: symbol tokens, dynamic values, the loaded image
/// and the builder used to model one in tests.
///
/// # Key Types
///
/// - [`host::SymbolToken`] - Packed kind-and-row identity of a symbol
/// - [`host::Value`] - Dynamically-typed value crossing the hook boundary
/// - [`host::ObjectHandle`] - Shared, identity-comparable object instance
/// - [`host::LoadedImage`] - One loaded application image
/// - [`host::ImageBuilder`] - Declarative image construction
pub mod host;

/// Structural fingerprints and deterministic resolution.
///
/// A [`fingerprint::Fingerprint`] names a symbol by facts that survive
/// obfuscation: referenced string constants, parameter counts, neighboring
/// calls, and class-level constants. The
/// [`fingerprint::FingerprintResolver`] matches fingerprints against a
/// lazily-built index of one image; a lookup that matches nothing, or more
/// than one symbol, is a miss.
pub mod fingerprint;

/// Resolved symbols and lazy references.
///
/// [`symbol::Symbol`] is a resolved identity with field read/write
/// capability; [`symbol::SymbolRef`] is the lazy, memoized handle patches
/// hold in statics.
pub mod symbol;

/// The interception layer.
///
/// [`hook::HookPair`] bundles before/after callbacks, [`hook::HookRegistry`]
/// keeps the per-symbol chains, [`hook::InterceptContext`] is the mutable
/// per-call record, and [`hook::Dispatcher`] routes invocations through the
/// installed chains.
pub mod hook;

/// Patches, sessions, and isolated batch application.
pub mod patch;

/// The premium-unlock patch catalog and its pure transforms.
pub mod premium;

/// `hookscope` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type
/// is always [`Error`], used consistently for all fallible operations.
pub type Result<T> = std::result::Result<T, Error>;

/// `hookscope` Error type
///
/// The main error type for all operations in this crate. See the variant
/// documentation for which errors are expected operating conditions and
/// which indicate real faults.
pub use error::Error;

pub use fingerprint::{Fingerprint, FingerprintResolver};
pub use hook::{Dispatcher, HookPair, InterceptContext};
pub use patch::{ApplyReport, Patch, PatchSession, PatchSet};
pub use symbol::{Symbol, SymbolRef};
