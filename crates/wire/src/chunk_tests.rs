use super::*;
use proptest::prelude::*;

#[test]
fn self_closed_element_is_extracted_whole() {
    let mut chunker = Chunker::new();
    let found = chunker.push(r#"<delProperty device="d" name="p"/>"#);
    assert_eq!(found, vec![r#"<delProperty device="d" name="p"/>"#.to_string()]);
}

#[test]
fn balanced_element_waits_for_closer() {
    let mut chunker = Chunker::new();
    let found = chunker.push(r#"<message device="d" message="hi">"#);
    assert!(found.is_empty());
    assert!(chunker.has_pending_open());

    let found = chunker.push("</message>");
    assert_eq!(found, vec![r#"<message device="d" message="hi"></message>"#.to_string()]);
    assert!(!chunker.has_pending_open());
}

#[test]
fn leading_garbage_before_first_angle_bracket_is_dropped() {
    let mut chunker = Chunker::new();
    let found = chunker.push(r#"garbage<delProperty device="d" name="p"/>"#);
    assert_eq!(found, vec![r#"<delProperty device="d" name="p"/>"#.to_string()]);
}

#[test]
fn two_consecutive_elements_are_both_extracted() {
    let mut chunker = Chunker::new();
    let found = chunker.push(r#"<a device="d" name="x"/>  <b device="d" name="y"/>"#);
    assert_eq!(found.len(), 2);
}

#[test]
fn s1_chunk_reassembly_split_every_seven_bytes() {
    let xml = r#"<defNumberVector device="d" name="v" state="Ok" perm="rw"><defNumber name="x" format="%g" min="0" max="10" step="1">5</defNumber></defNumberVector>"#;
    let mut chunker = Chunker::new();
    let mut found = Vec::new();
    for piece in xml.as_bytes().chunks(7) {
        let text = std::str::from_utf8(piece).expect("ascii fixture");
        found.extend(chunker.push(text));
    }
    assert_eq!(found, vec![xml.to_string()]);
}

proptest! {
    /// Invariant 1: for every prefix of the stream, chunking produces a
    /// prefix of the full-stream element sequence (monotonic chunking).
    #[test]
    fn monotonic_chunking(split_at in 0usize..200) {
        let xml = concat!(
            r#"<defSwitchVector device="d" name="s" state="Ok" perm="rw" rule="OneOfMany">"#,
            r#"<defSwitch name="a">On</defSwitch><defSwitch name="b">Off</defSwitch>"#,
            r#"</defSwitchVector>"#,
            r#"<delProperty device="d" name="s"/>"#,
            r#"<message device="d" message="hi"/>"#,
        );
        let split_at = split_at.min(xml.len());
        let split_at = (0..=split_at).rev().find(|i| xml.is_char_boundary(*i)).unwrap_or(0);

        let mut whole = Chunker::new();
        let full = whole.push(xml);

        let mut partial = Chunker::new();
        let prefix_found = partial.push(&xml[..split_at]);

        prop_assert!(full.len() >= prefix_found.len());
        prop_assert_eq!(&full[..prefix_found.len()], prefix_found.as_slice());
    }
}
