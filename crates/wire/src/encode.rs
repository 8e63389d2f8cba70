//! Build outbound `new*Vector` mutation elements from a property vector's
//! current definition plus a requested set of element writes (spec §4.1
//! "Encoding"). Blob vectors are read-only from the client side and have
//! no `encode_new_blob` counterpart.

use crate::WireError;
use obs_core::property::VectorMeta;
use obs_core::{BlobVector, NumberVector, SwitchRule, SwitchState, SwitchVector, TextVector};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::writer::Writer;

pub fn encode_new_number(vector: &NumberVector, values: &[(String, f64)]) -> Result<String, WireError> {
    vector.validate_write(values)?;
    encode_new_vector(
        "newNumberVector",
        "oneNumber",
        &vector.meta.device,
        &vector.meta.name,
        values.iter().map(|(name, value)| (name.as_str(), value.to_string())),
    )
}

pub fn encode_new_text(vector: &TextVector, values: &[(String, String)]) -> Result<String, WireError> {
    encode_new_vector(
        "newTextVector",
        "oneText",
        &vector.meta.device,
        &vector.meta.name,
        values.iter().map(|(name, value)| (name.as_str(), value.clone())),
    )
}

pub fn encode_new_switch(vector: &SwitchVector, values: &[(String, SwitchState)]) -> Result<String, WireError> {
    let expanded = vector.expand_write(values)?;
    encode_new_vector(
        "newSwitchVector",
        "oneSwitch",
        &vector.meta.device,
        &vector.meta.name,
        expanded.iter().map(|(name, state)| (name.as_str(), switch_body(*state).to_string())),
    )
}

/// Build the `def*Vector` element a device would publish for this vector.
/// Not used by the client at runtime (definitions only flow server→client)
/// but grounds invariant 2's round-trip property and doubles as the
/// encoder for test fixtures that simulate the remote daemon.
pub fn encode_def_number(vector: &NumberVector) -> Result<String, WireError> {
    encode_def_vector(&vector.meta, "defNumberVector", vector.elements.iter().map(|(name, e)| {
        let mut attrs = vec![
            ("format".to_string(), e.format.clone()),
            ("min".to_string(), e.min.to_string()),
            ("max".to_string(), e.max.to_string()),
            ("step".to_string(), e.step.to_string()),
        ];
        attrs.insert(0, ("label".to_string(), e.label.clone()));
        ("defNumber", name.to_string(), attrs, e.value.to_string())
    }))
}

pub fn encode_def_text(vector: &TextVector) -> Result<String, WireError> {
    encode_def_vector(&vector.meta, "defTextVector", vector.elements.iter().map(|(name, e)| {
        ("defText", name.to_string(), vec![("label".to_string(), e.label.clone())], e.value.clone())
    }))
}

pub fn encode_def_switch(vector: &SwitchVector) -> Result<String, WireError> {
    let tag = match vector.rule {
        SwitchRule::OneOfMany => "OneOfMany",
        SwitchRule::AtMostOne => "AtMostOne",
        SwitchRule::AnyOfMany => "AnyOfMany",
    };
    encode_def_vector_with_root_attr(
        &vector.meta,
        "defSwitchVector",
        ("rule", tag),
        vector.elements.iter().map(|(name, e)| {
            (
                "defSwitch",
                name.to_string(),
                vec![("label".to_string(), e.label.clone())],
                switch_body(e.value).to_string(),
            )
        }),
    )
}

pub fn encode_def_blob(vector: &BlobVector) -> Result<String, WireError> {
    encode_def_vector(&vector.meta, "defBlobVector", vector.elements.iter().map(|(name, e)| {
        let mut attrs = vec![("label".to_string(), e.label.clone())];
        if let Some(format) = &e.format {
            attrs.push(("format".to_string(), format.clone()));
        }
        ("defBLOB", name.to_string(), attrs, String::new())
    }))
}

fn encode_def_vector<'a>(
    meta: &VectorMeta,
    tag: &str,
    children: impl Iterator<Item = (&'a str, String, Vec<(String, String)>, String)>,
) -> Result<String, WireError> {
    encode_def_vector_with_extra_root_attrs(meta, tag, &[], children)
}

fn encode_def_vector_with_root_attr<'a>(
    meta: &VectorMeta,
    tag: &str,
    extra_root_attr: (&str, &str),
    children: impl Iterator<Item = (&'a str, String, Vec<(String, String)>, String)>,
) -> Result<String, WireError> {
    encode_def_vector_with_extra_root_attrs(
        meta,
        tag,
        &[(extra_root_attr.0.to_string(), extra_root_attr.1.to_string())],
        children,
    )
}

fn encode_def_vector_with_extra_root_attrs<'a>(
    meta: &VectorMeta,
    tag: &str,
    extra_root_attrs: &[(String, String)],
    children: impl Iterator<Item = (&'a str, String, Vec<(String, String)>, String)>,
) -> Result<String, WireError> {
    let mut writer = Writer::new(Vec::new());
    let mut root = BytesStart::new(tag);
    root.push_attribute(("device", meta.device.as_str()));
    root.push_attribute(("name", meta.name.as_str()));
    root.push_attribute(("label", meta.label.as_str()));
    root.push_attribute(("group", meta.group.as_str()));
    root.push_attribute(("state", meta.state.to_string().as_str()));
    root.push_attribute(("perm", meta.perm.to_string().as_str()));
    root.push_attribute(("timeout", meta.timeout.to_string().as_str()));
    for (key, value) in extra_root_attrs {
        root.push_attribute((key.as_str(), value.as_str()));
    }
    writer.write_event(Event::Start(root)).map_err(|e| WireError::Parse(e.to_string()))?;

    for (child_tag, name, attrs, text) in children {
        let mut el = BytesStart::new(child_tag);
        el.push_attribute(("name", name.as_str()));
        for (key, value) in &attrs {
            el.push_attribute((key.as_str(), value.as_str()));
        }
        writer.write_event(Event::Start(el)).map_err(|e| WireError::Parse(e.to_string()))?;
        if !text.is_empty() {
            writer
                .write_event(Event::Text(BytesText::new(&text)))
                .map_err(|e| WireError::Parse(e.to_string()))?;
        }
        writer
            .write_event(Event::End(BytesEnd::new(child_tag)))
            .map_err(|e| WireError::Parse(e.to_string()))?;
    }

    writer.write_event(Event::End(BytesEnd::new(tag))).map_err(|e| WireError::Parse(e.to_string()))?;
    Ok(String::from_utf8(writer.into_inner())?)
}

fn switch_body(state: SwitchState) -> &'static str {
    match state {
        SwitchState::On => "On",
        SwitchState::Off => "Off",
    }
}

fn encode_new_vector<'a>(
    tag: &str,
    element_tag: &str,
    device: &str,
    name: &str,
    values: impl Iterator<Item = (&'a str, String)>,
) -> Result<String, WireError> {
    let mut writer = Writer::new(Vec::new());
    let mut root = BytesStart::new(tag);
    root.push_attribute(("device", device));
    root.push_attribute(("name", name));
    writer.write_event(Event::Start(root)).map_err(|e| WireError::Parse(e.to_string()))?;

    for (element_name, value) in values {
        let mut el = BytesStart::new(element_tag);
        el.push_attribute(("name", element_name));
        writer.write_event(Event::Start(el)).map_err(|e| WireError::Parse(e.to_string()))?;
        writer
            .write_event(Event::Text(BytesText::new(&value)))
            .map_err(|e| WireError::Parse(e.to_string()))?;
        writer
            .write_event(Event::End(BytesEnd::new(element_tag)))
            .map_err(|e| WireError::Parse(e.to_string()))?;
    }

    writer
        .write_event(Event::End(BytesEnd::new(tag)))
        .map_err(|e| WireError::Parse(e.to_string()))?;

    Ok(String::from_utf8(writer.into_inner())?)
}
