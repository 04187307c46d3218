//! The premium-unlock patch set for the instrumented music app.
//!
//! This module is the concrete consumer of the framework: a catalog of
//! fingerprints for the obfuscated symbols the patches care about, a set of
//! pure transforms over host values, and [`patch_set`], which wires both
//! into independent [`Patch`] units. Every patch follows the same shape -
//! resolve lazily, install a before/after pair, keep the transform logic in
//! a named function so it stays testable without an image.
//!
//! # Patch Catalog
//!
//! | Patch | Interception point | Effect |
//! |-------|--------------------|--------|
//! | `premium-attributes` | account attribute map getter | overrides attributes to premium values |
//! | `assistant-context` | assistant playback context parser | strips forced station markers |
//! | `popular-tracks` | artist track-list query builder | re-issues the query with playback capability |
//! | `forced-shuffle` | player options builder | clears the forced-shuffle override |
//! | `context-menu` | context menu constructors | drops premium-upsell menu entries |
//! | `home-ads` | home sections getter | drops ad and merchandising sections |
//! | `browse-ads` | browse sections getter | drops ad sections |
//! | `popup-ads` | popup campaign fetch | substitutes the campaign with its empty fallback |
//!
//! All interception points are located structurally (string constants,
//! parameter counts, neighboring calls), never by obfuscated name, so the
//! catalog survives release-to-release renames. A patch whose fingerprint no
//! longer matches simply reports as not applied.

mod transforms;

pub use transforms::{
    filter_flagged_sections, filter_upsell_items, override_attributes, strip_station_marker,
    OverrideAttribute, PREMIUM_OVERRIDES,
};

use std::sync::LazyLock;

use crate::fingerprint::Fingerprint;
use crate::hook::HookPair;
use crate::host::{Value, ValueKind};
use crate::patch::{Patch, PatchSet};
use crate::symbol::SymbolRef;
use crate::Error;

/// Generated one-of discriminant field on home section records
const HOME_SECTION_ID_FIELD: &str = "featureTypeCase_";

/// Generated one-of discriminant field on browse section records
const BROWSE_SECTION_ID_FIELD: &str = "sectionTypeCase_";

/// Discriminants of home sections that carry ads or merchandising
pub const REMOVED_HOME_SECTION_IDS: &[i64] = &[55, 56];

/// Discriminants of browse sections that carry ads
pub const REMOVED_BROWSE_SECTION_IDS: &[i64] = &[38];

static PRODUCT_STATE_ATTRIBUTES: LazyLock<SymbolRef> = LazyLock::new(|| {
    SymbolRef::new(
        Fingerprint::method("product_state_attributes")
            .with_param_count(0)
            .with_string_ref("account-attributes"),
    )
});

static CONTEXT_FROM_JSON: LazyLock<SymbolRef> = LazyLock::new(|| {
    SymbolRef::new(
        Fingerprint::method("context_from_json")
            .with_param_count(1)
            .with_string_ref("uri")
            .with_string_ref("url")
            .with_call("from_json"),
    )
});

static TRACK_LIST_QUERY: LazyLock<SymbolRef> = LazyLock::new(|| {
    SymbolRef::new(
        Fingerprint::method("track_list_query")
            .with_param_count(2)
            .with_string_ref("checkDeviceCapability"),
    )
});

static PLAYER_OPTIONS_BUILD: LazyLock<SymbolRef> = LazyLock::new(|| {
    SymbolRef::new(
        Fingerprint::method("player_options_build")
            .with_param_count(0)
            .with_class_string("player-options-overrides"),
    )
});

static SHUFFLE_OVERRIDE_FIELD: LazyLock<SymbolRef> = LazyLock::new(|| {
    SymbolRef::new(
        Fingerprint::field("shuffle_override")
            .with_class_string("player-options-overrides")
            .with_field_kind(ValueKind::Bool),
    )
});

static CONTEXT_MENU_CLASS: LazyLock<SymbolRef> = LazyLock::new(|| {
    SymbolRef::new(Fingerprint::class("context_menu_view_model").with_class_string("context-menu"))
});

static UPSELL_FLAG_FIELD: LazyLock<SymbolRef> = LazyLock::new(|| {
    SymbolRef::new(
        Fingerprint::field("upsell_flag")
            .with_class_string("context-menu-item")
            .with_field_kind(ValueKind::Bool),
    )
});

static HOME_SECTIONS: LazyLock<SymbolRef> = LazyLock::new(|| {
    SymbolRef::new(
        Fingerprint::method("home_sections")
            .with_param_count(0)
            .with_string_ref("home.evopage"),
    )
});

static BROWSE_SECTIONS: LazyLock<SymbolRef> = LazyLock::new(|| {
    SymbolRef::new(
        Fingerprint::method("browse_sections")
            .with_param_count(0)
            .with_string_ref("browsita.v1"),
    )
});

static POPUP_FETCH: LazyLock<SymbolRef> = LazyLock::new(|| {
    SymbolRef::new(
        Fingerprint::method("popup_fetch")
            .with_param_count(1)
            .with_string_ref("pendragon"),
    )
});

static POPUP_FALLBACK_FIELD: LazyLock<SymbolRef> = LazyLock::new(|| {
    SymbolRef::new(Fingerprint::field("popup_fallback").with_class_string("pendragon"))
});

/// Builds the full premium-unlock patch set.
///
/// The set is pure data until applied; apply it through
/// [`crate::PatchSet::apply_all`] with a session over the target process and
/// inspect the returned report. Individual patches not matching the current
/// app build is the expected degradation mode.
#[must_use]
pub fn patch_set() -> PatchSet {
    PatchSet::new()
        .with(Patch::new("premium-attributes", |session| {
            session.hook_after(&PRODUCT_STATE_ATTRIBUTES, |ctx| {
                let attributes = ctx.result().as_map()?;
                let overridden = override_attributes(attributes);
                ctx.set_result(Value::Map(overridden));
                Ok(())
            })
        }))
        .with(Patch::new("assistant-context", |session| {
            session.hook_after(&CONTEXT_FROM_JSON, |ctx| {
                let context = ctx.result().as_object()?.clone();
                for field in ["uri", "url"] {
                    let value = context.get_field(field)?;
                    let stripped = strip_station_marker(value.as_str()?);
                    context.set_field(field, Value::from(stripped))?;
                }
                Ok(())
            })
        }))
        .with(Patch::new("popular-tracks", |session| {
            // The artist page requests popular tracks with playback
            // capability disabled for free accounts, which renders them
            // unplayable. Re-issue the query with the capability forced on.
            session.hook_after(&TRACK_LIST_QUERY, |ctx| {
                if !ctx.result().as_str()?.contains("checkDeviceCapability=false") {
                    return Ok(());
                }
                let replayed = ctx.invoke_original(&[ctx.arg(0)?.clone(), Value::Bool(true)])?;
                ctx.set_result(replayed);
                Ok(())
            })
        }))
        .with(Patch::new("forced-shuffle", |session| {
            let field = session.resolve(&SHUFFLE_OVERRIDE_FIELD)?.clone();
            session.hook_before(&PLAYER_OPTIONS_BUILD, move |ctx| {
                let target = ctx
                    .target()
                    .ok_or_else(|| Error::Error("options builder invoked statically".to_string()))?;
                // clear the override before the body reads it; the body
                // still runs and builds the options normally
                field.write(target.as_object()?, Value::Bool(false))
            })
        }))
        .with(Patch::new("context-menu", |session| {
            let flag = session.resolve(&UPSELL_FLAG_FIELD)?.clone();
            let pair = HookPair::before(move |ctx| {
                for index in 0..ctx.args().len() {
                    let Value::List(items) = ctx.arg(index)? else {
                        continue;
                    };
                    let (kept, dropped) = filter_upsell_items(items, &flag);
                    if dropped > 0 {
                        tracing::info!(filtered = dropped, "filtered context menu items");
                        ctx.set_arg(index, Value::List(kept))?;
                    }
                }
                Ok(())
            });
            session.hook_constructors(&CONTEXT_MENU_CLASS, pair)?;
            Ok(())
        }))
        .with(Patch::new("home-ads", |session| {
            session.hook_after(&HOME_SECTIONS, |ctx| {
                let (kept, dropped) = filter_flagged_sections(
                    ctx.result().as_list()?,
                    REMOVED_HOME_SECTION_IDS,
                    HOME_SECTION_ID_FIELD,
                );
                if dropped > 0 {
                    tracing::info!(filtered = dropped, "filtered home sections");
                    ctx.set_result(Value::List(kept));
                }
                Ok(())
            })
        }))
        .with(Patch::new("browse-ads", |session| {
            session.hook_after(&BROWSE_SECTIONS, |ctx| {
                let (kept, dropped) = filter_flagged_sections(
                    ctx.result().as_list()?,
                    REMOVED_BROWSE_SECTION_IDS,
                    BROWSE_SECTION_ID_FIELD,
                );
                if dropped > 0 {
                    tracing::info!(filtered = dropped, "filtered browse sections");
                    ctx.set_result(Value::List(kept));
                }
                Ok(())
            })
        }))
        .with(Patch::new("popup-ads", |session| {
            let fallback = session.resolve(&POPUP_FALLBACK_FIELD)?.clone();
            // Campaign popups come from a dedicated endpoint; substituting
            // the response with the endpoint's own empty fallback is
            // indistinguishable from the campaign service having nothing to
            // show.
            session.hook_after(&POPUP_FETCH, move |ctx| {
                let substituted = fallback.read(ctx.result().as_object()?)?;
                ctx.set_result(substituted);
                Ok(())
            })
        }))
}
