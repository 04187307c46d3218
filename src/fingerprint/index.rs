use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;

use crate::fingerprint::Fingerprint;
use crate::host::{LoadedImage, MethodEntry, MethodFlags, SymbolKind, SymbolToken};
use crate::symbol::Symbol;

/// Precomputed index over one loaded image, built by a full scan on first
/// use and shared by every fingerprint lookup afterwards.
///
/// # Index Architecture
///
/// Candidate narrowing uses inverted maps from structural facts to tokens:
///
/// - **Body strings**: string constant referenced by a method body → method
///   tokens
/// - **Class strings**: string constant anywhere in a class (class-level
///   constants plus every declared body) → class tokens
///
/// A lookup narrows through the first required string when the fingerprint
/// has one, then verifies the remaining constraints entry by entry in token
/// order, which keeps resolution deterministic for a fixed image.
pub(crate) struct ImageIndex {
    image: Arc<LoadedImage>,
    methods_by_string: DashMap<String, Vec<SymbolToken>>,
    classes_by_string: DashMap<String, Vec<SymbolToken>>,
    class_strings: HashMap<SymbolToken, Vec<String>>,
}

impl ImageIndex {
    /// Scans the whole image once and builds the inverted maps
    pub(crate) fn build(image: Arc<LoadedImage>) -> Self {
        let methods_by_string: DashMap<String, Vec<SymbolToken>> = DashMap::new();
        let classes_by_string: DashMap<String, Vec<SymbolToken>> = DashMap::new();
        let mut class_strings: HashMap<SymbolToken, Vec<String>> = HashMap::new();

        for method in image.methods() {
            for value in method.string_refs() {
                methods_by_string
                    .entry(value.clone())
                    .or_default()
                    .push(method.token());
            }
        }

        for class in image.classes() {
            let mut aggregated: Vec<String> = class.strings().to_vec();
            for token in class.method_tokens() {
                if let Some(method) = image.method(*token) {
                    aggregated.extend(method.string_refs().iter().cloned());
                }
            }
            for value in &aggregated {
                classes_by_string
                    .entry(value.clone())
                    .or_default()
                    .push(class.token());
            }
            class_strings.insert(class.token(), aggregated);
        }

        tracing::debug!(
            version = image.version(),
            classes = image.classes().len(),
            methods = image.methods().len(),
            "built fingerprint index"
        );

        ImageIndex {
            image,
            methods_by_string,
            classes_by_string,
            class_strings,
        }
    }

    /// Finds the unique symbol matching the fingerprint, `None` when nothing
    /// matches or the match is ambiguous
    pub(crate) fn find(&self, fingerprint: &Fingerprint) -> Option<Symbol> {
        match fingerprint.kind() {
            SymbolKind::Method | SymbolKind::Constructor => self.find_method(fingerprint),
            SymbolKind::Class => self.find_class(fingerprint),
            SymbolKind::Field => self.find_field(fingerprint),
        }
    }

    fn method_candidates(&self, fingerprint: &Fingerprint) -> Vec<SymbolToken> {
        if let Some(first) = fingerprint.string_refs().first() {
            self.methods_by_string
                .get(first)
                .map(|tokens| tokens.clone())
                .unwrap_or_default()
        } else {
            self.image.methods().iter().map(MethodEntry::token).collect()
        }
    }

    fn class_candidates(&self, required: &[String]) -> Vec<SymbolToken> {
        if let Some(first) = required.first() {
            self.classes_by_string
                .get(first)
                .map(|tokens| tokens.clone())
                .unwrap_or_default()
        } else {
            self.image.classes().iter().map(|c| c.token()).collect()
        }
    }

    fn class_has_strings(&self, class_token: SymbolToken, required: &[String]) -> bool {
        match self.class_strings.get(&class_token) {
            Some(strings) => required.iter().all(|value| strings.contains(value)),
            None => required.is_empty(),
        }
    }

    fn matches_method(&self, entry: &MethodEntry, fingerprint: &Fingerprint) -> bool {
        let is_constructor = entry.flags().contains(MethodFlags::CONSTRUCTOR);
        match fingerprint.kind() {
            SymbolKind::Method if is_constructor => return false,
            SymbolKind::Constructor if !is_constructor => return false,
            _ => {}
        }
        if let Some(count) = fingerprint.param_count() {
            if entry.param_count() != count {
                return false;
            }
        }
        if !fingerprint
            .string_refs()
            .iter()
            .all(|value| entry.string_refs().contains(value))
        {
            return false;
        }
        if !fingerprint
            .calls()
            .iter()
            .all(|name| entry.calls().contains(name))
        {
            return false;
        }
        self.class_has_strings(entry.class_token(), fingerprint.class_strings())
    }

    fn find_method(&self, fingerprint: &Fingerprint) -> Option<Symbol> {
        let mut matched: Option<&MethodEntry> = None;
        for token in self.method_candidates(fingerprint) {
            let Some(entry) = self.image.method(token) else {
                continue;
            };
            if !self.matches_method(entry, fingerprint) {
                continue;
            }
            if matched.is_some() {
                tracing::debug!(
                    label = fingerprint.label(),
                    "fingerprint is ambiguous, treating as unmatched"
                );
                return None;
            }
            matched = Some(entry);
        }

        let entry = matched?;
        let class_name = self
            .image
            .class(entry.class_token())
            .map_or("", |c| c.name());
        Some(Symbol::from_method(entry, class_name))
    }

    fn find_class(&self, fingerprint: &Fingerprint) -> Option<Symbol> {
        // class fingerprints may carry their constraints in either bucket
        let mut required: Vec<String> = fingerprint.class_strings().to_vec();
        required.extend(fingerprint.string_refs().iter().cloned());

        let mut matched = None;
        for token in self.class_candidates(&required) {
            if !self.class_has_strings(token, &required) {
                continue;
            }
            if matched.is_some() {
                tracing::debug!(
                    label = fingerprint.label(),
                    "fingerprint is ambiguous, treating as unmatched"
                );
                return None;
            }
            matched = Some(token);
        }

        self.image.class(matched?).map(Symbol::from_class)
    }

    fn find_field(&self, fingerprint: &Fingerprint) -> Option<Symbol> {
        let mut matched = None;
        for class_token in self.class_candidates(fingerprint.class_strings()) {
            if !self.class_has_strings(class_token, fingerprint.class_strings()) {
                continue;
            }
            let Some(class) = self.image.class(class_token) else {
                continue;
            };
            for token in class.field_tokens() {
                let Some(field) = self.image.field(*token) else {
                    continue;
                };
                if let Some(kind) = fingerprint.field_kind() {
                    if field.kind() != kind {
                        continue;
                    }
                }
                if matched.is_some() {
                    tracing::debug!(
                        label = fingerprint.label(),
                        "fingerprint is ambiguous, treating as unmatched"
                    );
                    return None;
                }
                matched = Some((field, class.name().to_string()));
            }
        }

        matched.map(|(field, class_name)| Symbol::from_field(field, &class_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{ClassSpec, FieldSpec, ImageBuilder, MethodFlags, MethodSpec, ValueKind};

    fn index() -> ImageIndex {
        let image = ImageBuilder::new("1.2.3")
            .with_class(
                ClassSpec::new("a")
                    .with_string("context-menu")
                    .with_field(FieldSpec::new("f1", ValueKind::Bool))
                    .with_field(FieldSpec::new("f2", ValueKind::Str))
                    .with_method(
                        MethodSpec::new("m1", 2)
                            .with_string_ref("checkDeviceCapability")
                            .with_call("append_query"),
                    )
                    .with_method(MethodSpec::new("m2", 0).with_string_ref("home.evopage"))
                    .with_method(
                        MethodSpec::new("<init>", 1).with_flags(MethodFlags::CONSTRUCTOR),
                    ),
            )
            .with_class(
                ClassSpec::new("b")
                    .with_method(MethodSpec::new("m3", 0).with_string_ref("home.evopage")),
            )
            .build();
        ImageIndex::build(image)
    }

    #[test]
    fn test_unique_method_match() {
        let idx = index();
        let fp = Fingerprint::method("query")
            .with_param_count(2)
            .with_string_ref("checkDeviceCapability");

        let symbol = idx.find(&fp).unwrap();
        assert_eq!(symbol.name(), "m1");
        assert_eq!(symbol.class_name(), "a");
    }

    #[test]
    fn test_ambiguous_match_is_a_miss() {
        let idx = index();
        // two methods reference home.evopage
        let fp = Fingerprint::method("sections").with_string_ref("home.evopage");
        assert!(idx.find(&fp).is_none());

        // narrowing by class string disambiguates
        let fp = Fingerprint::method("sections")
            .with_string_ref("home.evopage")
            .with_class_string("context-menu");
        assert_eq!(idx.find(&fp).unwrap().name(), "m2");
    }

    #[test]
    fn test_constructor_kind_separates_from_methods() {
        let idx = index();

        // a constructor fingerprint never matches a regular method
        let fp = Fingerprint::constructor("ctor").with_string_ref("checkDeviceCapability");
        assert!(idx.find(&fp).is_none());

        let fp = Fingerprint::constructor("ctor").with_class_string("context-menu");
        let symbol = idx.find(&fp).unwrap();
        assert_eq!(symbol.name(), "<init>");
        assert_eq!(symbol.kind(), SymbolKind::Constructor);

        // and a method fingerprint skips constructors
        let fp = Fingerprint::method("one_arg").with_param_count(1);
        assert!(idx.find(&fp).is_none());
    }

    #[test]
    fn test_call_graph_constraint() {
        let idx = index();
        let fp = Fingerprint::method("query")
            .with_string_ref("checkDeviceCapability")
            .with_call("append_query");
        assert!(idx.find(&fp).is_some());

        let fp = Fingerprint::method("query")
            .with_string_ref("checkDeviceCapability")
            .with_call("no_such_neighbor");
        assert!(idx.find(&fp).is_none());
    }

    #[test]
    fn test_class_and_field_match() {
        let idx = index();

        let class = idx
            .find(&Fingerprint::class("menu_class").with_class_string("context-menu"))
            .unwrap();
        assert_eq!(class.name(), "a");

        let field = idx
            .find(
                &Fingerprint::field("upsell")
                    .with_class_string("context-menu")
                    .with_field_kind(ValueKind::Bool),
            )
            .unwrap();
        assert_eq!(field.name(), "f1");

        // without the kind constraint two fields match, which is a miss
        assert!(idx
            .find(&Fingerprint::field("upsell").with_class_string("context-menu"))
            .is_none());
    }

    #[test]
    fn test_param_count_mismatch() {
        let idx = index();
        let fp = Fingerprint::method("query")
            .with_param_count(3)
            .with_string_ref("checkDeviceCapability");
        assert!(idx.find(&fp).is_none());
    }
}
