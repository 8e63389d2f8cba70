use super::*;
use crate::property::{PropertyPerm, PropertyState, VectorMeta};
use chrono::Utc;

fn meta() -> VectorMeta {
    VectorMeta {
        device: "FilterWheel".into(),
        name: "FILTER_NAME".into(),
        label: "Filter Names".into(),
        group: "Main".into(),
        state: PropertyState::Ok,
        perm: PropertyPerm::Rw,
        timeout: 0.0,
        timestamp: Utc::now(),
        message: None,
    }
}

fn vector() -> TextVector {
    let mut elements = ElementMap::new();
    elements.insert("SLOT_0", TextElement { name: "SLOT_0".into(), label: "0".into(), value: "R".into() });
    TextVector { meta: meta(), elements }
}

#[test]
fn is_set_matches_on_equal_string() {
    let v = vector();
    assert!(v.is_set(&[("SLOT_0".to_string(), "R".to_string())]));
}

#[test]
fn is_set_false_on_mismatch() {
    let v = vector();
    assert!(!v.is_set(&[("SLOT_0".to_string(), "G".to_string())]));
}
