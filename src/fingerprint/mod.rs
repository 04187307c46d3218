//! Structural fingerprints and their resolution against a loaded image.
//!
//! The target binary is versioned and obfuscated: names and offsets change
//! between releases, but structure - referenced string constants, parameter
//! counts, call-graph neighbors - mostly survives. This module locates
//! symbols by that structure:
//!
//! - [`Fingerprint`] - an immutable structural descriptor of one class,
//!   method or field
//! - [`FingerprintResolver`] - resolves fingerprints against one image,
//!   lazily building a full-image index on first use
//! - `ImageIndex` - the internal inverted index (string constant → candidate
//!   symbols) the resolver queries
//!
//! Resolution is deterministic for a fixed image and treats both "no match"
//! and "more than one match" as an ordinary miss: guessing among candidates
//! would risk hooking the wrong method after an app update, and the original
//! behavior is always the safe fallback.
//!
//! # Examples
//!
//! ```rust
//! use hookscope::prelude::*;
//!
//! let image = ImageBuilder::new("8.6.82")
//!     .with_class(ClassSpec::new("zq").with_method(
//!         MethodSpec::new("a", 2).with_string_ref("checkDeviceCapability"),
//!     ))
//!     .build();
//!
//! let resolver = FingerprintResolver::new(image);
//! let fingerprint = Fingerprint::method("build_query_parameters")
//!     .with_param_count(2)
//!     .with_string_ref("checkDeviceCapability");
//!
//! let symbol = resolver.resolve(&fingerprint).expect("should match");
//! assert_eq!(symbol.full_name(), "zq::a");
//! ```

mod descriptor;
mod index;
mod resolver;

pub use descriptor::Fingerprint;
pub(crate) use index::ImageIndex;
pub use resolver::FingerprintResolver;
