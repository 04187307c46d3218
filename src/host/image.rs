//! The in-process model of the currently loaded target binary.
//!
//! A [`LoadedImage`] is the crate's view of the host's class-loading
//! environment: the set of loaded classes, their fields and their methods,
//! with callable method bodies. Names inside an image are whatever the
//! current binary version shipped — typically obfuscated and unstable across
//! versions, which is why nothing in the resolution layer matches on them.
//!
//! Structural facts that survive obfuscation are carried per entry:
//! string constants referenced by a method body ([`MethodEntry::string_refs`])
//! and the names of its call-graph neighbors ([`MethodEntry::calls`]). The
//! fingerprint index is built from exactly these.
//!
//! Images are immutable once built. [`ImageBuilder`] assigns
//! [`SymbolToken`]s in declaration order, so token assignment is
//! deterministic for a fixed image description.

use std::sync::Arc;

use bitflags::bitflags;

use crate::host::{SymbolKind, SymbolToken, Value, ValueKind};
use crate::{Error, Result};

bitflags! {
    /// Attribute flags of a method in the loaded image
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MethodFlags: u32 {
        /// Method has no instance target
        const STATIC = 0x0001;
        /// Method is a constructor of its declaring class
        const CONSTRUCTOR = 0x0002;
        /// Method body is native; its dispatch cannot be instrumented
        const NATIVE = 0x0004;
    }
}

/// The callable body of a method in the loaded image.
///
/// Receives the instance target (`None` for static calls) and the argument
/// list; returns the method's result or the error it raised.
pub type MethodBody = Arc<dyn Fn(Option<&Value>, &[Value]) -> Result<Value> + Send + Sync>;

/// A method as it exists in the currently loaded image
pub struct MethodEntry {
    pub(crate) token: SymbolToken,
    pub(crate) class_token: SymbolToken,
    pub(crate) name: String,
    pub(crate) param_count: usize,
    pub(crate) flags: MethodFlags,
    pub(crate) string_refs: Vec<String>,
    pub(crate) calls: Vec<String>,
    pub(crate) body: MethodBody,
}

impl MethodEntry {
    /// Token of this method
    #[must_use]
    pub fn token(&self) -> SymbolToken {
        self.token
    }

    /// Token of the declaring class
    #[must_use]
    pub fn class_token(&self) -> SymbolToken {
        self.class_token
    }

    /// The method's name in this image version (not stable across versions)
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of declared parameters
    #[must_use]
    pub fn param_count(&self) -> usize {
        self.param_count
    }

    /// Attribute flags
    #[must_use]
    pub fn flags(&self) -> MethodFlags {
        self.flags
    }

    /// String constants referenced by the method body
    #[must_use]
    pub fn string_refs(&self) -> &[String] {
        &self.string_refs
    }

    /// Names of methods this body invokes (call-graph neighbors)
    #[must_use]
    pub fn calls(&self) -> &[String] {
        &self.calls
    }

    /// Returns true when the host's dispatch for this method can be modified
    #[must_use]
    pub fn is_hookable(&self) -> bool {
        !self.flags.contains(MethodFlags::NATIVE)
    }
}

/// A field as it exists in the currently loaded image
pub struct FieldEntry {
    pub(crate) token: SymbolToken,
    pub(crate) class_token: SymbolToken,
    pub(crate) name: String,
    pub(crate) kind: ValueKind,
}

impl FieldEntry {
    /// Token of this field
    #[must_use]
    pub fn token(&self) -> SymbolToken {
        self.token
    }

    /// Token of the declaring class
    #[must_use]
    pub fn class_token(&self) -> SymbolToken {
        self.class_token
    }

    /// The field's name in this image version (not stable across versions)
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared value kind of the field
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        self.kind
    }
}

/// A class as it exists in the currently loaded image
pub struct ClassEntry {
    pub(crate) token: SymbolToken,
    pub(crate) name: String,
    pub(crate) strings: Vec<String>,
    pub(crate) field_tokens: Vec<SymbolToken>,
    pub(crate) method_tokens: Vec<SymbolToken>,
}

impl ClassEntry {
    /// Token of this class
    #[must_use]
    pub fn token(&self) -> SymbolToken {
        self.token
    }

    /// The class name in this image version (not stable across versions)
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// String constants held at class level (static initializers, constant pools)
    #[must_use]
    pub fn strings(&self) -> &[String] {
        &self.strings
    }

    /// Tokens of the fields declared on this class
    #[must_use]
    pub fn field_tokens(&self) -> &[SymbolToken] {
        &self.field_tokens
    }

    /// Tokens of the methods and constructors declared on this class
    #[must_use]
    pub fn method_tokens(&self) -> &[SymbolToken] {
        &self.method_tokens
    }
}

/// An immutable model of the currently loaded target binary.
///
/// Construct through [`ImageBuilder`]. The image exposes introspection over
/// classes, fields and methods plus the raw (uninstrumented) invocation path
/// used by the dispatch layer.
pub struct LoadedImage {
    version: String,
    classes: Vec<ClassEntry>,
    methods: Vec<MethodEntry>,
    fields: Vec<FieldEntry>,
}

impl LoadedImage {
    /// Version string of the loaded binary
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// All classes, in token order
    #[must_use]
    pub fn classes(&self) -> &[ClassEntry] {
        &self.classes
    }

    /// All methods and constructors, in token order
    #[must_use]
    pub fn methods(&self) -> &[MethodEntry] {
        &self.methods
    }

    /// All fields, in token order
    #[must_use]
    pub fn fields(&self) -> &[FieldEntry] {
        &self.fields
    }

    /// Looks up a class by token
    #[must_use]
    pub fn class(&self, token: SymbolToken) -> Option<&ClassEntry> {
        let entry = self.classes.get(token.row().checked_sub(1)? as usize)?;
        (entry.token == token).then_some(entry)
    }

    /// Looks up a method or constructor by token
    #[must_use]
    pub fn method(&self, token: SymbolToken) -> Option<&MethodEntry> {
        let entry = self.methods.get(token.row().checked_sub(1)? as usize)?;
        (entry.token == token).then_some(entry)
    }

    /// Looks up a field by token
    #[must_use]
    pub fn field(&self, token: SymbolToken) -> Option<&FieldEntry> {
        let entry = self.fields.get(token.row().checked_sub(1)? as usize)?;
        (entry.token == token).then_some(entry)
    }

    /// All constructors declared on the given class, in token order
    #[must_use]
    pub fn constructors_of(&self, class_token: SymbolToken) -> Vec<&MethodEntry> {
        self.methods
            .iter()
            .filter(|m| {
                m.class_token == class_token && m.flags.contains(MethodFlags::CONSTRUCTOR)
            })
            .collect()
    }

    /// Invokes a method body directly, bypassing any installed hooks.
    ///
    /// This is the uninstrumented call path; the dispatch layer routes
    /// through here after its interception protocol has run.
    pub(crate) fn invoke_raw(
        &self,
        token: SymbolToken,
        target: Option<&Value>,
        args: &[Value],
    ) -> Result<Value> {
        let method = self.method(token).ok_or(Error::SymbolNotFound(token))?;
        if args.len() != method.param_count {
            return Err(Error::Error(format!(
                "method {} expects {} arguments, got {}",
                token,
                method.param_count,
                args.len()
            )));
        }
        (method.body)(target, args)
    }
}

/// Describes one field of a class under construction
pub struct FieldSpec {
    name: String,
    kind: ValueKind,
}

impl FieldSpec {
    /// Creates a field description with the given in-image name and kind
    #[must_use]
    pub fn new(name: &str, kind: ValueKind) -> Self {
        FieldSpec {
            name: name.to_string(),
            kind,
        }
    }
}

/// Describes one method of a class under construction
pub struct MethodSpec {
    name: String,
    param_count: usize,
    flags: MethodFlags,
    string_refs: Vec<String>,
    calls: Vec<String>,
    body: MethodBody,
}

impl MethodSpec {
    /// Creates a method description with the given in-image name and arity.
    ///
    /// The default body returns [`Value::Null`]; set a real one with
    /// [`MethodSpec::with_body`].
    #[must_use]
    pub fn new(name: &str, param_count: usize) -> Self {
        MethodSpec {
            name: name.to_string(),
            param_count,
            flags: MethodFlags::empty(),
            string_refs: Vec::new(),
            calls: Vec::new(),
            body: Arc::new(|_, _| Ok(Value::Null)),
        }
    }

    /// Sets attribute flags
    #[must_use]
    pub fn with_flags(mut self, flags: MethodFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Adds a string constant referenced by the method body
    #[must_use]
    pub fn with_string_ref(mut self, value: &str) -> Self {
        self.string_refs.push(value.to_string());
        self
    }

    /// Adds a call-graph neighbor (name of a method this body invokes)
    #[must_use]
    pub fn with_call(mut self, name: &str) -> Self {
        self.calls.push(name.to_string());
        self
    }

    /// Sets the callable body
    #[must_use]
    pub fn with_body<F>(mut self, body: F) -> Self
    where
        F: Fn(Option<&Value>, &[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        self.body = Arc::new(body);
        self
    }
}

/// Describes one class of an image under construction
pub struct ClassSpec {
    name: String,
    strings: Vec<String>,
    fields: Vec<FieldSpec>,
    methods: Vec<MethodSpec>,
}

impl ClassSpec {
    /// Creates a class description with the given in-image name
    #[must_use]
    pub fn new(name: &str) -> Self {
        ClassSpec {
            name: name.to_string(),
            strings: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Adds a class-level string constant
    #[must_use]
    pub fn with_string(mut self, value: &str) -> Self {
        self.strings.push(value.to_string());
        self
    }

    /// Adds a field
    #[must_use]
    pub fn with_field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    /// Adds a method or constructor
    #[must_use]
    pub fn with_method(mut self, method: MethodSpec) -> Self {
        self.methods.push(method);
        self
    }
}

/// Builder for [`LoadedImage`].
///
/// Token assignment is deterministic: classes, fields and methods receive
/// rows in declaration order, starting at 1 per symbol kind's row space
/// (methods and constructors share one row space).
pub struct ImageBuilder {
    version: String,
    classes: Vec<ClassSpec>,
}

impl ImageBuilder {
    /// Starts an image description for the given binary version
    #[must_use]
    pub fn new(version: &str) -> Self {
        ImageBuilder {
            version: version.to_string(),
            classes: Vec::new(),
        }
    }

    /// Adds a class
    #[must_use]
    pub fn with_class(mut self, class: ClassSpec) -> Self {
        self.classes.push(class);
        self
    }

    /// Finalizes the image, assigning tokens to every symbol
    #[must_use]
    pub fn build(self) -> Arc<LoadedImage> {
        let mut classes = Vec::with_capacity(self.classes.len());
        let mut methods = Vec::new();
        let mut fields = Vec::new();

        for (class_idx, class) in self.classes.into_iter().enumerate() {
            #[allow(clippy::cast_possible_truncation)]
            let class_token = SymbolToken::new(SymbolKind::Class, class_idx as u32 + 1);

            let mut field_tokens = Vec::with_capacity(class.fields.len());
            for field in class.fields {
                #[allow(clippy::cast_possible_truncation)]
                let token = SymbolToken::new(SymbolKind::Field, fields.len() as u32 + 1);
                field_tokens.push(token);
                fields.push(FieldEntry {
                    token,
                    class_token,
                    name: field.name,
                    kind: field.kind,
                });
            }

            let mut method_tokens = Vec::with_capacity(class.methods.len());
            for method in class.methods {
                let kind = if method.flags.contains(MethodFlags::CONSTRUCTOR) {
                    SymbolKind::Constructor
                } else {
                    SymbolKind::Method
                };
                #[allow(clippy::cast_possible_truncation)]
                let token = SymbolToken::new(kind, methods.len() as u32 + 1);
                method_tokens.push(token);
                methods.push(MethodEntry {
                    token,
                    class_token,
                    name: method.name,
                    param_count: method.param_count,
                    flags: method.flags,
                    string_refs: method.string_refs,
                    calls: method.calls,
                    body: method.body,
                });
            }

            classes.push(ClassEntry {
                token: class_token,
                name: class.name,
                strings: class.strings,
                field_tokens,
                method_tokens,
            });
        }

        Arc::new(LoadedImage {
            version: self.version,
            classes,
            methods,
            fields,
        })
    }
}
