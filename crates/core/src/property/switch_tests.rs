use super::*;
use crate::property::{PropertyPerm, PropertyState, VectorMeta};
use chrono::Utc;

fn meta() -> VectorMeta {
    VectorMeta {
        device: "FilterWheel".into(),
        name: "FILTER_SLOT".into(),
        label: "Slot".into(),
        group: "Main".into(),
        state: PropertyState::Ok,
        perm: PropertyPerm::Rw,
        timeout: 0.0,
        timestamp: Utc::now(),
        message: None,
    }
}

fn three_way(rule: SwitchRule, on: &str) -> SwitchVector {
    let mut elements = ElementMap::new();
    for name in ["A", "B", "C"] {
        let value = if name == on { SwitchState::On } else { SwitchState::Off };
        elements.insert(name, SwitchElement { name: name.to_string(), label: name.to_string(), value });
    }
    SwitchVector { meta: meta(), rule, elements }
}

#[test]
fn single_on_write_expands_to_force_siblings_off() {
    // S2: A=On, B=Off, C=Off; write B=On.
    let v = three_way(SwitchRule::OneOfMany, "A");
    let expanded = v.expand_write(&[("B".to_string(), SwitchState::On)]).unwrap();
    assert_eq!(
        expanded,
        vec![
            ("A".to_string(), SwitchState::Off),
            ("B".to_string(), SwitchState::On),
            ("C".to_string(), SwitchState::Off),
        ]
    );
}

#[test]
fn one_of_many_off_with_two_elements_forces_other_on() {
    let mut elements = ElementMap::new();
    elements.insert("A", SwitchElement { name: "A".into(), label: "A".into(), value: SwitchState::On });
    elements.insert("B", SwitchElement { name: "B".into(), label: "B".into(), value: SwitchState::Off });
    let v = SwitchVector { meta: meta(), rule: SwitchRule::OneOfMany, elements };

    let expanded = v.expand_write(&[("A".to_string(), SwitchState::Off)]).unwrap();
    assert_eq!(
        expanded,
        vec![("A".to_string(), SwitchState::Off), ("B".to_string(), SwitchState::On)]
    );
}

#[test]
fn one_of_many_off_with_three_elements_is_ambiguous() {
    let v = three_way(SwitchRule::OneOfMany, "A");
    let err = v.expand_write(&[("A".to_string(), SwitchState::Off)]).unwrap_err();
    assert_eq!(err.element, "A");
}

#[test]
fn at_most_one_off_is_allowed_alone() {
    let v = three_way(SwitchRule::AtMostOne, "A");
    let expanded = v.expand_write(&[("A".to_string(), SwitchState::Off)]).unwrap();
    assert_eq!(expanded, vec![("A".to_string(), SwitchState::Off)]);
}

#[test]
fn apply_update_enforces_one_of_many_after_echo() {
    let mut v = three_way(SwitchRule::OneOfMany, "A");
    v.apply_update("B", SwitchState::On);
    assert_eq!(v.elements.get("A").unwrap().value, SwitchState::Off);
    assert_eq!(v.elements.get("B").unwrap().value, SwitchState::On);
    assert_eq!(v.elements.get("C").unwrap().value, SwitchState::Off);
}

#[test]
fn switch_state_parses_case_insensitively() {
    use std::str::FromStr;
    assert_eq!(SwitchState::from_str(" On ").unwrap(), SwitchState::On);
    assert_eq!(SwitchState::from_str("off").unwrap(), SwitchState::Off);
    assert!(SwitchState::from_str("maybe").is_err());
}
