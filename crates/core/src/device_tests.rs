use super::*;
use crate::property::{ElementMap, NumberElement, NumberVector, PropertyPerm, PropertyState, VectorMeta};
use chrono::Utc;

fn number_vector(name: &str, group: &str) -> PropertyVector {
    PropertyVector::Number(NumberVector {
        meta: VectorMeta {
            device: "Mount".into(),
            name: name.into(),
            label: name.into(),
            group: group.into(),
            state: PropertyState::Ok,
            perm: PropertyPerm::Rw,
            timeout: 0.0,
            timestamp: Utc::now(),
            message: None,
        },
        elements: ElementMap::new(),
    })
}

#[test]
fn insert_and_get_round_trip() {
    let mut device = Device::new("Mount");
    device.insert(number_vector("EQUATORIAL_EOD_COORD", "Main"));
    assert!(device.contains("EQUATORIAL_EOD_COORD"));
    assert_eq!(device.get("EQUATORIAL_EOD_COORD").unwrap().name(), "EQUATORIAL_EOD_COORD");
}

#[test]
fn remove_drops_property() {
    let mut device = Device::new("Mount");
    device.insert(number_vector("A", "Main"));
    device.remove("A");
    assert!(!device.contains("A"));
}

#[test]
fn groups_buckets_by_group_attribute() {
    let mut device = Device::new("Mount");
    device.insert(number_vector("A", "Main"));
    device.insert(number_vector("B", "Main"));
    device.insert(number_vector("C", "Site"));

    let groups = device.groups();
    assert_eq!(groups.get("Main").unwrap().len(), 2);
    assert_eq!(groups.get("Site").unwrap().len(), 1);
}
