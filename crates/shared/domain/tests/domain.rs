use hotbar_domain::bind::KeyBind;
use hotbar_domain::category::{Category, CategorySet};
use hotbar_domain::events::{EventKind, GameEvent, Notification, Severity};

#[test]
fn category_names_round_trip() {
    for category in Category::ALL {
        assert_eq!(Category::parse(category.as_str()), Some(category));
    }
    assert_eq!(Category::parse("COMBAT"), Some(Category::Combat));
    assert_eq!(Category::parse("weather"), None);
}

#[test]
fn persisted_set_excludes_cosmetic_categories() {
    let set = CategorySet::PERSISTED;
    assert!(!set.includes(Category::Misc));
    assert!(!set.includes(Category::Fun));
    assert!(!set.includes(Category::Render));
    assert!(set.includes(Category::Combat));
    assert!(set.includes(Category::Movement));
    assert_eq!(CategorySet::default(), CategorySet::PERSISTED);
}

#[test]
fn category_set_from_str() {
    assert_eq!(CategorySet::from("all"), CategorySet::ALL);
    assert_eq!(CategorySet::from("fun"), CategorySet::FUN);
    assert!(CategorySet::from("nope").is_empty());
}

#[test]
fn category_set_serializes_as_names() {
    let json = serde_json::to_value(CategorySet::COMBAT | CategorySet::WORLD).expect("serialize");
    assert_eq!(json, serde_json::json!(["combat", "world"]));
}

#[test]
fn key_bind_semantics() {
    assert!(!KeyBind::NONE.is_bound());
    assert_eq!(KeyBind::new(-7), KeyBind::NONE);
    assert!(KeyBind::new(82).matches(82));
    assert!(!KeyBind::NONE.matches(-1));
    assert_eq!(serde_json::to_string(&KeyBind::new(82)).expect("serialize"), "82");
}

#[test]
fn event_kind_matches_variant() {
    assert_eq!(GameEvent::Tick { tick: 3 }.kind(), EventKind::Tick);
    assert_eq!(GameEvent::WorldChange { world: None }.kind(), EventKind::WorldChange);
    assert_eq!(GameEvent::Disconnect.kind(), EventKind::Disconnect);
    assert_eq!(GameEvent::KeyPress { key: 1 }.kind(), EventKind::KeyPress);
}

#[test]
fn toggle_notification_severity() {
    let on = Notification::toggled("AutoClicker", true);
    let off = Notification::toggled("AutoClicker", false);
    assert_eq!(on.severity, Severity::Enabled);
    assert_eq!(off.severity, Severity::Disabled);
    assert_eq!(on.to_string(), "[enabled] AutoClicker: Enabled");
}
