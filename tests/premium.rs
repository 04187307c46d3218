//! End-to-end premium patch set against a simulated app image.
//!
//! Every test builds the image through the same helper: the premium
//! fingerprint catalog memoizes its resolutions process-wide, so all tests
//! must present an identically-shaped image.

use std::sync::Arc;

use hookscope::premium;
use hookscope::prelude::*;

fn attribute(value: Value) -> Value {
    Value::Object(ObjectHandle::new(
        "AccountAttribute",
        vec![("value_".to_string(), value)],
    ))
}

fn section(class: &str, id_field: &str, id: i64) -> Value {
    Value::Object(ObjectHandle::new(
        class,
        vec![(id_field.to_string(), Value::Int(id))],
    ))
}

fn menu_item(label: &str, upsell: bool) -> Value {
    Value::Object(ObjectHandle::new(
        "mi",
        vec![
            ("u".to_string(), Value::Bool(upsell)),
            ("label_".to_string(), Value::from(label)),
        ],
    ))
}

fn map_get(map: &[(String, Value)], key: &str) -> Value {
    map.iter()
        .find(|(name, _)| name == key)
        .map_or(Value::Null, |(_, value)| value.clone())
}

fn image() -> Arc<LoadedImage> {
    let attributes: Vec<(String, Value)> = vec![
        ("ads".to_string(), attribute(Value::Bool(true))),
        ("player-license".to_string(), attribute(Value::from("free"))),
        ("shuffle".to_string(), attribute(Value::Bool(true))),
        ("on-demand".to_string(), attribute(Value::Bool(false))),
        ("streaming".to_string(), attribute(Value::Bool(true))),
        ("pick-and-shuffle".to_string(), attribute(Value::Bool(true))),
        (
            "streaming-rules".to_string(),
            attribute(Value::from("shuffle-mode")),
        ),
        ("nft-disabled".to_string(), attribute(Value::from("0"))),
    ];

    let home = vec![
        section("hs", "featureTypeCase_", 1),
        section("hs", "featureTypeCase_", 55),
        section("hs", "featureTypeCase_", 2),
        section("hs", "featureTypeCase_", 56),
    ];
    let browse = vec![
        section("bs", "sectionTypeCase_", 38),
        section("bs", "sectionTypeCase_", 3),
    ];

    ImageBuilder::new("9.0.2")
        .with_class(ClassSpec::new("ps").with_method(
            MethodSpec::new("b", 0)
                .with_string_ref("account-attributes")
                .with_body(move |_, _| Ok(Value::Map(attributes.clone()))),
        ))
        .with_class(ClassSpec::new("ac").with_method(
            MethodSpec::new("a", 1)
                .with_string_ref("uri")
                .with_string_ref("url")
                .with_call("from_json")
                .with_body(|_, args| {
                    let map = args[0].as_map()?;
                    Ok(Value::Object(ObjectHandle::new(
                        "ctx",
                        vec![
                            ("uri".to_string(), map_get(map, "uri")),
                            ("url".to_string(), map_get(map, "url")),
                        ],
                    )))
                }),
        ))
        .with_class(ClassSpec::new("tq").with_method(
            MethodSpec::new("q", 2)
                .with_string_ref("checkDeviceCapability")
                .with_body(|_, args| {
                    let query =
                        format!("{}?checkDeviceCapability={}", args[0].as_str()?, args[1].as_bool()?);
                    Ok(Value::from(query))
                }),
        ))
        .with_class(
            ClassSpec::new("ops")
                .with_string("player-options-overrides")
                .with_field(FieldSpec::new("sh", ValueKind::Bool))
                .with_method(MethodSpec::new("build", 0).with_body(|target, _| {
                    let overrides = target
                        .ok_or_else(|| Error::Error("no target".to_string()))?
                        .as_object()?;
                    overrides.get_field("sh")
                })),
        )
        .with_class(
            ClassSpec::new("menu").with_string("context-menu").with_method(
                MethodSpec::new("<init>", 1)
                    .with_flags(MethodFlags::CONSTRUCTOR)
                    .with_body(|_, args| {
                        Ok(Value::Object(ObjectHandle::new(
                            "menu",
                            vec![("items_".to_string(), args[0].clone())],
                        )))
                    }),
            ),
        )
        .with_class(
            ClassSpec::new("mi")
                .with_string("context-menu-item")
                .with_field(FieldSpec::new("u", ValueKind::Bool)),
        )
        .with_class(ClassSpec::new("hp").with_method(
            MethodSpec::new("h", 0)
                .with_string_ref("home.evopage")
                .with_body(move |_, _| Ok(Value::List(home.clone()))),
        ))
        .with_class(ClassSpec::new("bp").with_method(
            MethodSpec::new("br", 0)
                .with_string_ref("browsita.v1")
                .with_body(move |_, _| Ok(Value::List(browse.clone()))),
        ))
        .with_class(ClassSpec::new("pd").with_method(
            MethodSpec::new("f", 1)
                .with_string_ref("pendragon")
                .with_body(|_, _| {
                    Ok(Value::Object(ObjectHandle::new(
                        "resp",
                        vec![
                            ("fallback_".to_string(), Value::from("{}")),
                            ("payload_".to_string(), Value::from("campaign-popup")),
                        ],
                    )))
                }),
        ))
        .with_class(
            ClassSpec::new("resp")
                .with_string("pendragon")
                .with_field(FieldSpec::new("fallback_", ValueKind::Str)),
        )
        .build()
}

fn patched_session() -> PatchSession {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let session = PatchSession::new(Arc::new(Dispatcher::new(image())));
    let report = premium::patch_set().apply_all(&session);
    assert!(report.is_clean(), "patch set did not apply: {report}");
    session
}

fn method_token(session: &PatchSession, name: &str) -> SymbolToken {
    session
        .dispatcher()
        .image()
        .methods()
        .iter()
        .find(|m| m.name() == name)
        .map(hookscope::host::MethodEntry::token)
        .unwrap()
}

#[test]
fn test_every_patch_applies_cleanly() {
    // patched_session asserts a clean report
    let _session = patched_session();
    assert_eq!(premium::patch_set().len(), 8);
}

#[test]
fn test_account_attributes_are_overridden_non_destructively() {
    let session = patched_session();
    let token = method_token(&session, "b");

    let pristine = session.dispatcher().invoke_original(token, None, &[]).unwrap();
    let patched = session.dispatcher().invoke(token, None, &[]).unwrap();

    let patched_map = patched.as_map().unwrap();
    let ads = map_get(patched_map, "ads");
    assert_eq!(
        ads.as_object().unwrap().get_field("value_").unwrap(),
        Value::Bool(false)
    );
    assert_eq!(
        map_get(patched_map, "player-license")
            .as_object()
            .unwrap()
            .get_field("value_")
            .unwrap(),
        Value::from("on-demand")
    );
    assert_eq!(
        map_get(patched_map, "on-demand")
            .as_object()
            .unwrap()
            .get_field("value_")
            .unwrap(),
        Value::Bool(true)
    );

    // the attribute objects the host owns still hold their original values
    let pristine_ads = map_get(pristine.as_map().unwrap(), "ads");
    let pristine_ads = pristine_ads.as_object().unwrap();
    assert_eq!(pristine_ads.get_field("value_").unwrap(), Value::Bool(true));
    assert!(!pristine_ads.same_object(ads.as_object().unwrap()));
}

#[test]
fn test_assistant_station_markers_are_stripped() {
    let session = patched_session();
    let token = method_token(&session, "a");

    let payload = Value::Map(vec![
        ("uri".to_string(), Value::from("spotify:station:123")),
        ("url".to_string(), Value::from("https://x/station:123")),
    ]);
    let context = session.dispatcher().invoke(token, None, &[payload]).unwrap();
    let context = context.as_object().unwrap();

    assert_eq!(context.get_field("uri").unwrap(), Value::from("spotify:123"));
    assert_eq!(
        context.get_field("url").unwrap(),
        Value::from("https://x/123")
    );
}

#[test]
fn test_track_query_regains_playback_capability() {
    let session = patched_session();
    let token = method_token(&session, "q");

    let out = session
        .dispatcher()
        .invoke(token, None, &[Value::from("artist:42"), Value::Bool(false)])
        .unwrap();
    assert_eq!(out, Value::from("artist:42?checkDeviceCapability=true"));

    // a capable query passes through once, untouched
    let out = session
        .dispatcher()
        .invoke(token, None, &[Value::from("artist:42"), Value::Bool(true)])
        .unwrap();
    assert_eq!(out, Value::from("artist:42?checkDeviceCapability=true"));
}

#[test]
fn test_forced_shuffle_override_is_cleared() {
    let session = patched_session();
    let token = method_token(&session, "build");

    let overrides = Value::Object(ObjectHandle::new(
        "ops",
        vec![("sh".to_string(), Value::Bool(true))],
    ));
    let built = session
        .dispatcher()
        .invoke(token, Some(&overrides), &[])
        .unwrap();

    // the body observed the cleared override
    assert_eq!(built, Value::Bool(false));
    assert_eq!(
        overrides.as_object().unwrap().get_field("sh").unwrap(),
        Value::Bool(false)
    );
}

#[test]
fn test_context_menu_upsell_items_are_filtered() {
    let session = patched_session();
    let token = method_token(&session, "<init>");

    let items = Value::List(vec![
        menu_item("play", false),
        menu_item("queue", false),
        menu_item("go-premium", true),
        menu_item("share", false),
        menu_item("credits", false),
    ]);
    let menu = session.dispatcher().invoke(token, None, &[items]).unwrap();
    let menu = menu.as_object().unwrap();

    let kept = menu.get_field("items_").unwrap();
    let kept = kept.as_list().unwrap();
    assert_eq!(kept.len(), 4);

    // relative order of the surviving items is preserved
    let labels: Vec<Value> = kept
        .iter()
        .map(|item| item.as_object().unwrap().get_field("label_").unwrap())
        .collect();
    assert_eq!(
        labels,
        vec![
            Value::from("play"),
            Value::from("queue"),
            Value::from("share"),
            Value::from("credits"),
        ]
    );
}

#[test]
fn test_ad_sections_are_filtered() {
    let session = patched_session();

    let home = session
        .dispatcher()
        .invoke(method_token(&session, "h"), None, &[])
        .unwrap();
    let home = home.as_list().unwrap();
    assert_eq!(home.len(), 2);
    for section in home {
        let id = section
            .as_object()
            .unwrap()
            .get_field("featureTypeCase_")
            .unwrap();
        assert!(!premium::REMOVED_HOME_SECTION_IDS.contains(&id.as_int().unwrap()));
    }

    let browse = session
        .dispatcher()
        .invoke(method_token(&session, "br"), None, &[])
        .unwrap();
    assert_eq!(browse.as_list().unwrap().len(), 1);
}

#[test]
fn test_popup_campaign_is_replaced_with_fallback() {
    let session = patched_session();
    let token = method_token(&session, "f");

    let out = session
        .dispatcher()
        .invoke(token, None, &[Value::from("request")])
        .unwrap();
    assert_eq!(out, Value::from("{}"));
}
