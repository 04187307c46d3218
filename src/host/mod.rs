//! The host-facing data model: dynamic values, host objects and the loaded
//! binary image.
//!
//! The host process is treated as an opaque, versioned binary. This module
//! provides everything the rest of the crate needs to talk about it:
//!
//! - [`SymbolToken`] / [`SymbolKind`] - compact identity of one class, field,
//!   method or constructor within the currently loaded image
//! - [`Value`] / [`ValueKind`] - the dynamic value model for arguments,
//!   results and fields crossing the interception boundary
//! - [`ObjectHandle`] - shared mutable handle to a host object with named
//!   fields, including the detached-copy operation non-destructive
//!   transforms rely on
//! - [`LoadedImage`] / [`ImageBuilder`] - the introspectable model of the
//!   loaded binary, including per-method structural facts (referenced string
//!   constants, call-graph neighbors) that fingerprints match against
//!
//! Nothing here knows about hooks or patches; the dispatch layer in
//! [`crate::hook`] builds on the raw invocation path this module exposes.
//!
//! # Examples
//!
//! ```rust
//! use hookscope::prelude::*;
//!
//! let image = ImageBuilder::new("8.6.82")
//!     .with_class(
//!         ClassSpec::new("q7x").with_method(
//!             MethodSpec::new("a", 1)
//!                 .with_string_ref("checkDeviceCapability")
//!                 .with_body(|_, args| Ok(args[0].clone())),
//!         ),
//!     )
//!     .build();
//!
//! assert_eq!(image.version(), "8.6.82");
//! assert_eq!(image.methods().len(), 1);
//! ```

mod image;
mod token;
mod value;

pub use image::{
    ClassEntry, ClassSpec, FieldEntry, FieldSpec, ImageBuilder, LoadedImage, MethodBody,
    MethodEntry, MethodFlags, MethodSpec,
};
pub use token::{SymbolKind, SymbolToken};
pub use value::{ObjectHandle, Value, ValueKind};
