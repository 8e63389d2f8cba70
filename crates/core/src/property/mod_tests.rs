use super::*;

#[test]
fn element_map_preserves_insertion_order() {
    let mut map = ElementMap::new();
    map.insert("c", 1);
    map.insert("a", 2);
    map.insert("b", 3);
    assert_eq!(map.names().collect::<Vec<_>>(), vec!["c", "a", "b"]);
}

#[test]
fn element_map_replace_keeps_position() {
    let mut map = ElementMap::new();
    map.insert("a", 1);
    map.insert("b", 2);
    map.insert("a", 99);
    assert_eq!(map.names().collect::<Vec<_>>(), vec!["a", "b"]);
    assert_eq!(map.get("a"), Some(&99));
}

#[test]
fn property_state_round_trips_display_and_parse() {
    use std::str::FromStr;
    for state in [PropertyState::Idle, PropertyState::Ok, PropertyState::Busy, PropertyState::Alert] {
        let s = state.to_string();
        assert_eq!(PropertyState::from_str(&s).unwrap(), state);
    }
}

#[test]
fn property_perm_rejects_unknown_value() {
    use std::str::FromStr;
    assert!(PropertyPerm::from_str("xx").is_err());
}
