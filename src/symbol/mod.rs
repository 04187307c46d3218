//! Resolved symbols and lazily-resolved symbol references.
//!
//! A [`Symbol`] is a concrete handle to one class, method or field in the
//! currently loaded image - the output of fingerprint resolution. A
//! [`SymbolRef`] is the static, lazily-resolved handle patches are written
//! against: it holds a [`crate::Fingerprint`] and memoizes the resolution
//! outcome (hit or miss) for the lifetime of the process.
//!
//! # Examples
//!
//! ```rust
//! use hookscope::prelude::*;
//!
//! let image = ImageBuilder::new("1.0")
//!     .with_class(
//!         ClassSpec::new("x").with_method(MethodSpec::new("m", 0).with_string_ref("marker")),
//!     )
//!     .build();
//! let resolver = FingerprintResolver::new(image);
//!
//! let reference = SymbolRef::new(Fingerprint::method("marker_method").with_string_ref("marker"));
//! let symbol = reference.resolve(&resolver)?;
//! assert_eq!(symbol.name(), "m");
//! # Ok::<(), hookscope::Error>(())
//! ```

mod reference;

pub use reference::SymbolRef;

use crate::host::{
    ClassEntry, FieldEntry, MethodEntry, MethodFlags, ObjectHandle, SymbolKind, SymbolToken, Value,
};
use crate::{Error, Result};

/// A concrete, resolved handle to a symbol in the currently loaded image.
///
/// Carries the token plus the in-image names for diagnostics and for the
/// typed field-access capability ([`Symbol::read`] / [`Symbol::write`]).
/// Symbols are only valid for the image that resolved them.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    token: SymbolToken,
    kind: SymbolKind,
    class_name: String,
    name: String,
}

impl Symbol {
    pub(crate) fn from_method(entry: &MethodEntry, class_name: &str) -> Symbol {
        let kind = if entry.flags().contains(MethodFlags::CONSTRUCTOR) {
            SymbolKind::Constructor
        } else {
            SymbolKind::Method
        };
        Symbol {
            token: entry.token(),
            kind,
            class_name: class_name.to_string(),
            name: entry.name().to_string(),
        }
    }

    pub(crate) fn from_field(entry: &FieldEntry, class_name: &str) -> Symbol {
        Symbol {
            token: entry.token(),
            kind: SymbolKind::Field,
            class_name: class_name.to_string(),
            name: entry.name().to_string(),
        }
    }

    pub(crate) fn from_class(entry: &ClassEntry) -> Symbol {
        Symbol {
            token: entry.token(),
            kind: SymbolKind::Class,
            class_name: entry.name().to_string(),
            name: entry.name().to_string(),
        }
    }

    /// Token of this symbol in the current image
    #[must_use]
    pub fn token(&self) -> SymbolToken {
        self.token
    }

    /// Kind of this symbol
    #[must_use]
    pub fn kind(&self) -> SymbolKind {
        self.kind
    }

    /// The symbol's in-image name (not stable across versions)
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the declaring class (for classes, the class itself)
    #[must_use]
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// `Class::member` rendering for diagnostics
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}::{}", self.class_name, self.name)
    }

    /// Reads this field symbol from a host object.
    ///
    /// # Errors
    /// Returns an error when this symbol is not a field, or the object does
    /// not declare it.
    pub fn read(&self, object: &ObjectHandle) -> Result<Value> {
        if self.kind != SymbolKind::Field {
            return Err(Error::Error(format!(
                "symbol {} is a {}, not a field",
                self.token, self.kind
            )));
        }
        object.get_field(&self.name)
    }

    /// Writes this field symbol on a host object.
    ///
    /// # Errors
    /// Returns an error when this symbol is not a field, or the object does
    /// not declare it.
    pub fn write(&self, object: &ObjectHandle, value: Value) -> Result<()> {
        if self.kind != SymbolKind::Field {
            return Err(Error::Error(format!(
                "symbol {} is a {}, not a field",
                self.token, self.kind
            )));
        }
        object.set_field(&self.name, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_capability() {
        let symbol = Symbol {
            token: SymbolToken::new(SymbolKind::Field, 1),
            kind: SymbolKind::Field,
            class_name: "a1b".to_string(),
            name: "d".to_string(),
        };
        let object = ObjectHandle::new("a1b", vec![("d".to_string(), Value::Bool(false))]);

        symbol.write(&object, Value::Bool(true)).unwrap();
        assert_eq!(symbol.read(&object).unwrap(), Value::Bool(true));
        assert_eq!(symbol.full_name(), "a1b::d");
    }

    #[test]
    fn test_non_field_access_is_rejected() {
        let symbol = Symbol {
            token: SymbolToken::new(SymbolKind::Method, 1),
            kind: SymbolKind::Method,
            class_name: "a1b".to_string(),
            name: "m".to_string(),
        };
        let object = ObjectHandle::new("a1b", vec![]);

        assert!(symbol.read(&object).is_err());
        assert!(symbol.write(&object, Value::Null).is_err());
    }
}
