use std::sync::LazyLock;

use crate::host::Value;
use crate::symbol::Symbol;

/// One account attribute the premium patch set overrides.
pub struct OverrideAttribute {
    /// Account attribute key
    pub key: &'static str,
    /// Replacement value
    pub value: Value,
    /// Whether the attribute is expected to be present in all situations.
    /// When false, a missing attribute is not worth a diagnostic.
    pub expected: bool,
}

impl OverrideAttribute {
    fn expected(key: &'static str, value: Value) -> Self {
        OverrideAttribute {
            key,
            value,
            expected: true,
        }
    }

    fn optional(key: &'static str, value: Value) -> Self {
        OverrideAttribute {
            key,
            value,
            expected: false,
        }
    }
}

/// The account attributes overridden to unlock premium behavior.
///
/// Keys and values mirror the upstream account-attribute vocabulary; the
/// last two are absent on some app targets and therefore optional.
pub static PREMIUM_OVERRIDES: LazyLock<Vec<OverrideAttribute>> = LazyLock::new(|| {
    vec![
        // Disables player and app ads.
        OverrideAttribute::expected("ads", Value::Bool(false)),
        // Works along on-demand, allows playing any song without restriction.
        OverrideAttribute::expected("player-license", Value::from("on-demand")),
        // Disables shuffle being initially enabled when first playing a playlist.
        OverrideAttribute::expected("shuffle", Value::Bool(false)),
        // Allows playing any song on-demand, without a shuffled order.
        OverrideAttribute::expected("on-demand", Value::Bool(true)),
        // Make sure playing songs is not disabled remotely and playlists show up.
        OverrideAttribute::expected("streaming", Value::Bool(true)),
        // Removes the smart shuffle mode restriction, allowing any mode.
        OverrideAttribute::expected("pick-and-shuffle", Value::Bool(false)),
        // Disables the shuffle-mode streaming rule which forces shuffled playback.
        OverrideAttribute::expected("streaming-rules", Value::from("")),
        // Enables premium UI in settings and removes the nav-bar upsell button.
        OverrideAttribute::expected("nft-disabled", Value::from("1")),
        // Discontinued hardware device; only present on older app targets.
        OverrideAttribute::optional("can_use_superbird", Value::Bool(true)),
        // Removes the nav-bar upsell button for tablet users.
        OverrideAttribute::optional("tablet-free", Value::Bool(false)),
    ]
});

/// Builds a copy of the attribute map with [`PREMIUM_OVERRIDES`] applied.
///
/// The copy is non-destructive: attribute objects whose value changes are
/// shallow-cloned first, so the objects inside the original map are never
/// mutated. The host serializes its own attribute state back to the server;
/// tampering with the originals would be detectable there.
///
/// Entries that are not objects with a `value_` field are left as they are,
/// and a missing-but-expected key only produces a diagnostic.
#[must_use]
pub fn override_attributes(attributes: &[(String, Value)]) -> Vec<(String, Value)> {
    let mut result = attributes.to_vec();

    for override_attr in PREMIUM_OVERRIDES.iter() {
        let Some((_, slot)) = result.iter_mut().find(|(key, _)| key == override_attr.key) else {
            if override_attr.expected {
                tracing::warn!(
                    key = override_attr.key,
                    "expected account attribute not found"
                );
            }
            continue;
        };

        let Value::Object(attribute) = &*slot else {
            continue;
        };
        let Ok(current) = attribute.get_field("value_") else {
            continue;
        };
        if current == override_attr.value {
            continue;
        }

        tracing::info!(
            key = override_attr.key,
            from = ?current,
            to = ?override_attr.value,
            "overriding account attribute"
        );

        let cloned = attribute.shallow_clone();
        if cloned.set_field("value_", override_attr.value.clone()).is_ok() {
            *slot = Value::Object(cloned);
        }
    }

    result
}

/// Removes the station marker from an assistant URI or URL.
///
/// `spotify:station:123` becomes `spotify:123`, letting the assistant play
/// the requested song or artist directly instead of a station.
#[must_use]
pub fn strip_station_marker(value: &str) -> String {
    value.replace("station:", "")
}

/// Returns a filtered copy of a section list, dropping sections whose
/// integer `id_field` is listed in `removed_ids`, plus the number dropped.
///
/// The original list and its section objects are untouched; entries that
/// are not objects or lack the id field are kept.
#[must_use]
pub fn filter_flagged_sections(
    sections: &[Value],
    removed_ids: &[i64],
    id_field: &str,
) -> (Vec<Value>, usize) {
    let mut kept = Vec::with_capacity(sections.len());
    for section in sections {
        let remove = match section {
            Value::Object(object) => object
                .get_field(id_field)
                .ok()
                .and_then(|id| id.as_int().ok())
                .is_some_and(|id| removed_ids.contains(&id)),
            _ => false,
        };
        if !remove {
            kept.push(section.clone());
        }
    }
    let dropped = sections.len() - kept.len();
    (kept, dropped)
}

/// Returns a filtered copy of a context-menu item list, dropping items
/// whose upsell flag field reads true, plus the number dropped.
///
/// Relative order of the remaining items is preserved. Items that are not
/// objects, or where the flag cannot be read as a boolean, are kept.
#[must_use]
pub fn filter_upsell_items(items: &[Value], upsell_flag: &Symbol) -> (Vec<Value>, usize) {
    let mut kept = Vec::with_capacity(items.len());
    for item in items {
        let is_upsell = match item {
            Value::Object(object) => upsell_flag
                .read(object)
                .ok()
                .and_then(|flag| flag.as_bool().ok())
                .unwrap_or(false),
            _ => false,
        };
        if !is_upsell {
            kept.push(item.clone());
        }
    }
    let dropped = items.len() - kept.len();
    (kept, dropped)
}
