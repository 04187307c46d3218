//! Dynamic value model for data crossing the interception boundary.
//!
//! Hooked methods in the target binary receive and return values whose shapes
//! are only known at runtime. [`Value`] is the tagged representation used for
//! arguments, results and object fields throughout the crate, and
//! [`ObjectHandle`] is the shared, mutable handle to a host object with named
//! fields.
//!
//! # Aliasing
//!
//! Domain transforms must not retain references into the host's internal
//! structures. [`ObjectHandle::shallow_clone`] exists for exactly this reason:
//! a transform that wants to override a field builds a detached copy and
//! leaves the original object untouched.

use std::fmt;
use std::sync::{Arc, RwLock};

use strum::Display;

use crate::{Error, Result};

/// The runtime kind of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ValueKind {
    /// The absent value
    Null,
    /// A boolean
    Bool,
    /// A signed 64-bit integer
    Int,
    /// An owned string
    Str,
    /// An ordered list of values
    List,
    /// An insertion-ordered string-keyed map
    Map,
    /// A handle to a host object
    Object,
}

/// A dynamically typed value observed or produced by an intercepted call.
///
/// Maps preserve insertion order, matching the host's attribute collections
/// whose serialization order is observable by the target application.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// The absent value; also the declared result before any hook or the
    /// original body has produced one
    Null,
    /// A boolean
    Bool(bool),
    /// A signed 64-bit integer
    Int(i64),
    /// An owned string
    Str(String),
    /// An ordered list of values
    List(Vec<Value>),
    /// An insertion-ordered map from string keys to values
    Map(Vec<(String, Value)>),
    /// A handle to a host object with named fields
    Object(ObjectHandle),
}

impl Value {
    /// Returns the runtime kind of this value
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::Str(_) => ValueKind::Str,
            Value::List(_) => ValueKind::List,
            Value::Map(_) => ValueKind::Map,
            Value::Object(_) => ValueKind::Object,
        }
    }

    /// Returns true for [`Value::Null`]
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the boolean payload
    ///
    /// # Errors
    /// Returns [`Error::TypeMismatch`] when the value is not a boolean.
    pub fn as_bool(&self) -> Result<bool> {
        match self {
            Value::Bool(b) => Ok(*b),
            other => Err(Error::TypeMismatch {
                expected: ValueKind::Bool,
                found: other.kind(),
            }),
        }
    }

    /// Returns the integer payload
    ///
    /// # Errors
    /// Returns [`Error::TypeMismatch`] when the value is not an integer.
    pub fn as_int(&self) -> Result<i64> {
        match self {
            Value::Int(i) => Ok(*i),
            other => Err(Error::TypeMismatch {
                expected: ValueKind::Int,
                found: other.kind(),
            }),
        }
    }

    /// Returns the string payload
    ///
    /// # Errors
    /// Returns [`Error::TypeMismatch`] when the value is not a string.
    pub fn as_str(&self) -> Result<&str> {
        match self {
            Value::Str(s) => Ok(s),
            other => Err(Error::TypeMismatch {
                expected: ValueKind::Str,
                found: other.kind(),
            }),
        }
    }

    /// Returns the list payload
    ///
    /// # Errors
    /// Returns [`Error::TypeMismatch`] when the value is not a list.
    pub fn as_list(&self) -> Result<&[Value]> {
        match self {
            Value::List(items) => Ok(items),
            other => Err(Error::TypeMismatch {
                expected: ValueKind::List,
                found: other.kind(),
            }),
        }
    }

    /// Returns the map payload
    ///
    /// # Errors
    /// Returns [`Error::TypeMismatch`] when the value is not a map.
    pub fn as_map(&self) -> Result<&[(String, Value)]> {
        match self {
            Value::Map(entries) => Ok(entries),
            other => Err(Error::TypeMismatch {
                expected: ValueKind::Map,
                found: other.kind(),
            }),
        }
    }

    /// Returns the object payload
    ///
    /// # Errors
    /// Returns [`Error::TypeMismatch`] when the value is not an object.
    pub fn as_object(&self) -> Result<&ObjectHandle> {
        match self {
            Value::Object(obj) => Ok(obj),
            other => Err(Error::TypeMismatch {
                expected: ValueKind::Object,
                found: other.kind(),
            }),
        }
    }

    /// Looks up a key in a map value, `None` when absent or not a map
    #[must_use]
    pub fn map_get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

impl From<ObjectHandle> for Value {
    fn from(value: ObjectHandle) -> Self {
        Value::Object(value)
    }
}

/// A shared, mutable handle to an object living in the host.
///
/// Equality is identity: two handles compare equal only when they refer to
/// the same underlying object. Cloning the handle is cheap and does not copy
/// the object; use [`ObjectHandle::shallow_clone`] for a detached copy.
///
/// # Thread Safety
///
/// Field access is synchronized with an internal `RwLock`; the host may read
/// the object concurrently with hooks inspecting it.
#[derive(Clone)]
pub struct ObjectHandle {
    inner: Arc<RwLock<ObjectData>>,
}

struct ObjectData {
    class: String,
    fields: Vec<(String, Value)>,
}

impl ObjectHandle {
    /// Creates a new host object of the given class with named fields
    #[must_use]
    pub fn new(class: &str, fields: Vec<(String, Value)>) -> Self {
        ObjectHandle {
            inner: Arc::new(RwLock::new(ObjectData {
                class: class.to_string(),
                fields,
            })),
        }
    }

    /// Returns the object's class name in the currently loaded image
    #[must_use]
    pub fn class_name(&self) -> String {
        read_lock!(self.inner).class.clone()
    }

    /// Returns true if the object declares a field with the given name
    #[must_use]
    pub fn has_field(&self, name: &str) -> bool {
        read_lock!(self.inner).fields.iter().any(|(n, _)| n == name)
    }

    /// Reads a field by name
    ///
    /// # Errors
    /// Returns [`Error::MemberNotFound`] when the field does not exist.
    pub fn get_field(&self, name: &str) -> Result<Value> {
        let data = read_lock!(self.inner);
        data.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
            .ok_or_else(|| Error::MemberNotFound(name.to_string()))
    }

    /// Overwrites a field by name
    ///
    /// # Errors
    /// Returns [`Error::MemberNotFound`] when the field does not exist.
    pub fn set_field(&self, name: &str, value: Value) -> Result<()> {
        let mut data = write_lock!(self.inner);
        match data.fields.iter_mut().find(|(n, _)| n == name) {
            Some((_, slot)) => {
                *slot = value;
                Ok(())
            }
            None => Err(Error::MemberNotFound(name.to_string())),
        }
    }

    /// Creates a detached copy of this object.
    ///
    /// The copy has the same class and field values but its own storage;
    /// mutating it leaves the original object untouched. Field values are
    /// cloned shallowly, so nested object handles still alias.
    #[must_use]
    pub fn shallow_clone(&self) -> ObjectHandle {
        let data = read_lock!(self.inner);
        ObjectHandle {
            inner: Arc::new(RwLock::new(ObjectData {
                class: data.class.clone(),
                fields: data.fields.clone(),
            })),
        }
    }

    /// Returns true when both handles refer to the same underlying object
    #[must_use]
    pub fn same_object(&self, other: &ObjectHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PartialEq for ObjectHandle {
    fn eq(&self, other: &Self) -> bool {
        self.same_object(other)
    }
}

impl fmt::Debug for ObjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = read_lock!(self.inner);
        f.debug_struct("ObjectHandle")
            .field("class", &data.class)
            .field("fields", &data.fields)
            .finish()
    }
}
