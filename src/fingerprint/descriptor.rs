use crate::host::{SymbolKind, ValueKind};

/// A structural descriptor of one class, method or field in the target
/// binary.
///
/// A fingerprint never contains the symbol's name or address - those change
/// between binary versions and obfuscation passes. It matches on shape
/// instead:
///
/// - the symbol kind and, for methods, the parameter count
/// - string constants referenced by the method body ([`Fingerprint::with_string_ref`])
/// - names of call-graph neighbors ([`Fingerprint::with_call`])
/// - string constants found anywhere in the declaring class
///   ([`Fingerprint::with_class_string`])
/// - for fields, the declared value kind ([`Fingerprint::with_field_kind`])
///
/// The label passed to the constructors is purely diagnostic; it appears in
/// log lines and in [`crate::Error::SymbolUnavailable`] but is never used for
/// matching.
///
/// Fingerprints are immutable once defined. A fingerprint maps to at most one
/// symbol per loaded image: when the constraints match more than one
/// candidate, resolution treats the fingerprint as unmatched rather than
/// guessing.
///
/// # Examples
///
/// ```rust
/// use hookscope::Fingerprint;
///
/// let fingerprint = Fingerprint::method("build_query_parameters")
///     .with_param_count(2)
///     .with_string_ref("checkDeviceCapability");
/// assert_eq!(fingerprint.label(), "build_query_parameters");
/// ```
#[derive(Debug, Clone)]
pub struct Fingerprint {
    label: &'static str,
    kind: SymbolKind,
    param_count: Option<usize>,
    string_refs: Vec<String>,
    calls: Vec<String>,
    class_strings: Vec<String>,
    field_kind: Option<ValueKind>,
}

impl Fingerprint {
    fn new(label: &'static str, kind: SymbolKind) -> Self {
        Fingerprint {
            label,
            kind,
            param_count: None,
            string_refs: Vec::new(),
            calls: Vec::new(),
            class_strings: Vec::new(),
            field_kind: None,
        }
    }

    /// Starts a fingerprint for a regular method
    #[must_use]
    pub fn method(label: &'static str) -> Self {
        Fingerprint::new(label, SymbolKind::Method)
    }

    /// Starts a fingerprint for a constructor.
    ///
    /// A constructor fingerprint matches a single specific constructor;
    /// hooking every constructor of a class goes through
    /// [`crate::patch::PatchSession::hook_constructors`] with a class
    /// fingerprint instead.
    #[must_use]
    pub fn constructor(label: &'static str) -> Self {
        Fingerprint::new(label, SymbolKind::Constructor)
    }

    /// Starts a fingerprint for a class
    #[must_use]
    pub fn class(label: &'static str) -> Self {
        Fingerprint::new(label, SymbolKind::Class)
    }

    /// Starts a fingerprint for a field
    #[must_use]
    pub fn field(label: &'static str) -> Self {
        Fingerprint::new(label, SymbolKind::Field)
    }

    /// Requires an exact parameter count (methods only)
    #[must_use]
    pub fn with_param_count(mut self, count: usize) -> Self {
        self.param_count = Some(count);
        self
    }

    /// Requires a string constant referenced by the method body
    #[must_use]
    pub fn with_string_ref(mut self, value: &str) -> Self {
        self.string_refs.push(value.to_string());
        self
    }

    /// Requires a call-graph neighbor with the given name
    #[must_use]
    pub fn with_call(mut self, name: &str) -> Self {
        self.calls.push(name.to_string());
        self
    }

    /// Requires a string constant anywhere in the declaring class
    #[must_use]
    pub fn with_class_string(mut self, value: &str) -> Self {
        self.class_strings.push(value.to_string());
        self
    }

    /// Requires the field's declared value kind (fields only)
    #[must_use]
    pub fn with_field_kind(mut self, kind: ValueKind) -> Self {
        self.field_kind = Some(kind);
        self
    }

    /// Diagnostic label, never used for matching
    #[must_use]
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Kind of symbol this fingerprint targets
    #[must_use]
    pub fn kind(&self) -> SymbolKind {
        self.kind
    }

    /// Required parameter count, if any
    #[must_use]
    pub fn param_count(&self) -> Option<usize> {
        self.param_count
    }

    /// Required body string constants
    #[must_use]
    pub fn string_refs(&self) -> &[String] {
        &self.string_refs
    }

    /// Required call-graph neighbors
    #[must_use]
    pub fn calls(&self) -> &[String] {
        &self.calls
    }

    /// Required declaring-class string constants
    #[must_use]
    pub fn class_strings(&self) -> &[String] {
        &self.class_strings
    }

    /// Required field value kind, if any
    #[must_use]
    pub fn field_kind(&self) -> Option<ValueKind> {
        self.field_kind
    }
}
