//! Decode a single already-framed element (see [`crate::chunk`]) into an
//! [`Element`], dispatching on its lowercased tag per spec §4.1.

use crate::element::{BlobValue, Element, SetVector};
use crate::WireError;
use base64::Engine;
use chrono::{DateTime, Utc};
use obs_core::property::{ElementMap, VectorMeta};
use obs_core::{
    BlobElement, BlobVector, NumberElement, NumberVector, PropertyPerm, PropertyState,
    SwitchElement, SwitchRule, SwitchState, SwitchVector, TextElement, TextVector,
};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use std::collections::HashMap;
use std::str::FromStr;
use tracing::warn;

struct RawChild {
    attrs: HashMap<String, String>,
    text: String,
}

fn tag_name(e: &BytesStart) -> String {
    String::from_utf8_lossy(e.name().as_ref()).to_string()
}

fn parse_err(e: impl std::fmt::Display) -> WireError {
    WireError::Parse(e.to_string())
}

fn start_attrs(e: &BytesStart) -> Result<HashMap<String, String>, WireError> {
    let mut map = HashMap::new();
    for attr in e.attributes() {
        let attr = attr.map_err(parse_err)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = attr.unescape_value().map_err(parse_err)?.into_owned();
        map.insert(key, value);
    }
    Ok(map)
}

fn required<'a>(attrs: &'a HashMap<String, String>, key: &'static str) -> Result<&'a str, WireError> {
    attrs.get(key).map(String::as_str).ok_or(WireError::MissingAttribute(key))
}

fn parse_timestamp(attrs: &HashMap<String, String>) -> Result<DateTime<Utc>, WireError> {
    match attrs.get("timestamp") {
        Some(raw) => Ok(DateTime::parse_from_rfc3339(raw)?.with_timezone(&Utc)),
        None => Ok(Utc::now()),
    }
}

/// Read every child of the currently-open root element, stopping at the
/// root's own closing tag. Children here are always flat (`defNumber`,
/// `oneText`, ...) — no further nesting appears in this protocol.
fn read_children(reader: &mut Reader<&[u8]>) -> Result<Vec<RawChild>, WireError> {
    let mut children = Vec::new();
    loop {
        let mut buf = Vec::new();
        match reader.read_event_into(&mut buf).map_err(parse_err)? {
            Event::Empty(e) => {
                children.push(RawChild { attrs: start_attrs(&e)?, text: String::new() });
            }
            Event::Start(e) => {
                let attrs = start_attrs(&e)?;
                let mut text = String::new();
                loop {
                    let mut inner = Vec::new();
                    match reader.read_event_into(&mut inner).map_err(parse_err)? {
                        Event::Text(t) => text.push_str(&t.unescape().map_err(parse_err)?),
                        Event::CData(t) => text.push_str(&String::from_utf8_lossy(t.into_inner().as_ref())),
                        Event::End(_) => break,
                        Event::Eof => return Err(WireError::Parse("unexpected eof inside child element".into())),
                        _ => {}
                    }
                }
                children.push(RawChild { attrs, text: text.trim().to_string() });
            }
            Event::End(_) => break,
            Event::Eof => return Err(WireError::Parse("unexpected eof reading children".into())),
            _ => {}
        }
    }
    Ok(children)
}

/// Decode one complete, already-framed top-level element.
pub fn decode_element(xml: &str) -> Result<Option<Element>, WireError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let (tag, attrs, self_closed) = loop {
        let mut buf = Vec::new();
        match reader.read_event_into(&mut buf).map_err(parse_err)? {
            Event::Start(e) => break (tag_name(&e), start_attrs(&e)?, false),
            Event::Empty(e) => break (tag_name(&e), start_attrs(&e)?, true),
            Event::Eof => return Err(WireError::Parse("empty element".into())),
            _ => {}
        }
    };

    let children = if self_closed { Vec::new() } else { read_children(&mut reader)? };
    let lower = tag.to_ascii_lowercase();

    match lower.as_str() {
        "defnumbervector" => Ok(Some(Element::DefNumber(decode_def_number(&attrs, children)?))),
        "deftextvector" => Ok(Some(Element::DefText(decode_def_text(&attrs, children)?))),
        "defswitchvector" => Ok(Some(Element::DefSwitch(decode_def_switch(&attrs, children)?))),
        "defblobvector" => Ok(Some(Element::DefBlob(decode_def_blob(&attrs, children)?))),
        "setnumbervector" => Ok(Some(Element::SetNumber(decode_set(&attrs, children, decode_number_value)?))),
        "settextvector" => Ok(Some(Element::SetText(decode_set(&attrs, children, decode_text_value)?))),
        "setswitchvector" => Ok(Some(Element::SetSwitch(decode_set(&attrs, children, decode_switch_value)?))),
        "setblobvector" => Ok(Some(Element::SetBlob(decode_set(&attrs, children, decode_blob_value)?))),
        "delproperty" => Ok(Some(Element::DelProperty {
            device: required(&attrs, "device")?.to_string(),
            name: attrs.get("name").cloned(),
        })),
        "message" => Ok(Some(Element::Message {
            device: attrs.get("device").cloned(),
            timestamp: parse_timestamp(&attrs)?,
            message: attrs.get("message").cloned().unwrap_or_default(),
        })),
        other if other.starts_with("new") => Ok(None),
        other => {
            warn!(tag = other, "unknown element tag, skipping");
            Ok(None)
        }
    }
}

fn decode_vector_meta(attrs: &HashMap<String, String>) -> Result<VectorMeta, WireError> {
    let device = required(attrs, "device")?.to_string();
    let name = required(attrs, "name")?.to_string();
    let label = attrs.get("label").cloned().unwrap_or_else(|| name.clone());
    let group = attrs.get("group").cloned().unwrap_or_default();
    let state = PropertyState::from_str(required(attrs, "state")?)?;
    let perm = PropertyPerm::from_str(required(attrs, "perm")?)?;
    let timeout = match attrs.get("timeout") {
        Some(raw) => raw.parse::<f64>()?,
        None => 0.0,
    };
    let timestamp = parse_timestamp(attrs)?;
    let message = attrs.get("message").cloned();
    Ok(VectorMeta { device, name, label, group, state, perm, timeout, timestamp, message })
}

fn decode_def_number(attrs: &HashMap<String, String>, children: Vec<RawChild>) -> Result<NumberVector, WireError> {
    let meta = decode_vector_meta(attrs)?;
    let mut elements = ElementMap::new();
    for child in children {
        let name = required(&child.attrs, "name")?.to_string();
        let label = child.attrs.get("label").cloned().unwrap_or_else(|| name.clone());
        let format = required(&child.attrs, "format")?.to_string();
        let min = required(&child.attrs, "min")?.parse::<f64>()?;
        let max = required(&child.attrs, "max")?.parse::<f64>()?;
        let step = required(&child.attrs, "step")?.parse::<f64>()?;
        let value = child.text.trim().parse::<f64>()?;
        elements.insert(name.clone(), NumberElement { name, label, format, min, max, step, value });
    }
    Ok(NumberVector { meta, elements })
}

fn decode_def_text(attrs: &HashMap<String, String>, children: Vec<RawChild>) -> Result<TextVector, WireError> {
    let meta = decode_vector_meta(attrs)?;
    let mut elements = ElementMap::new();
    for child in children {
        let name = required(&child.attrs, "name")?.to_string();
        let label = child.attrs.get("label").cloned().unwrap_or_else(|| name.clone());
        let value = child.text.clone();
        elements.insert(name.clone(), TextElement { name, label, value });
    }
    Ok(TextVector { meta, elements })
}

fn decode_def_switch(attrs: &HashMap<String, String>, children: Vec<RawChild>) -> Result<SwitchVector, WireError> {
    let meta = decode_vector_meta(attrs)?;
    let rule = match required(attrs, "rule")? {
        "OneOfMany" => SwitchRule::OneOfMany,
        "AtMostOne" => SwitchRule::AtMostOne,
        "AnyOfMany" => SwitchRule::AnyOfMany,
        other => return Err(WireError::Parse(format!("unknown switch rule {other:?}"))),
    };
    let mut elements = ElementMap::new();
    for child in children {
        let name = required(&child.attrs, "name")?.to_string();
        let label = child.attrs.get("label").cloned().unwrap_or_else(|| name.clone());
        let value = SwitchState::from_str(&child.text)?;
        elements.insert(name.clone(), SwitchElement { name, label, value });
    }
    Ok(SwitchVector { meta, rule, elements })
}

fn decode_def_blob(attrs: &HashMap<String, String>, children: Vec<RawChild>) -> Result<BlobVector, WireError> {
    let meta = decode_vector_meta(attrs)?;
    let mut elements = ElementMap::new();
    for child in children {
        let name = required(&child.attrs, "name")?.to_string();
        let label = child.attrs.get("label").cloned().unwrap_or_else(|| name.clone());
        let format = child.attrs.get("format").cloned();
        let size = child.attrs.get("size").map(|s| s.parse::<u64>()).transpose()?;
        elements.insert(name.clone(), BlobElement { name, label, format, size, value: None });
    }
    Ok(BlobVector { meta, elements })
}

fn decode_set<T>(
    attrs: &HashMap<String, String>,
    children: Vec<RawChild>,
    parse_value: impl Fn(&RawChild) -> Result<T, WireError>,
) -> Result<SetVector<T>, WireError> {
    let device = required(attrs, "device")?.to_string();
    let name = required(attrs, "name")?.to_string();
    let state = attrs.get("state").map(|s| PropertyState::from_str(s)).transpose()?;
    let timeout = attrs.get("timeout").map(|s| s.parse::<f64>()).transpose()?;
    let timestamp = parse_timestamp(attrs)?;
    let message = attrs.get("message").cloned();
    let mut values = Vec::with_capacity(children.len());
    for child in &children {
        let element_name = required(&child.attrs, "name")?.to_string();
        let value = parse_value(child)?;
        values.push((element_name, value));
    }
    Ok(SetVector { device, name, state, timeout, timestamp, message, values })
}

fn decode_number_value(child: &RawChild) -> Result<f64, WireError> {
    Ok(child.text.trim().parse::<f64>()?)
}

fn decode_text_value(child: &RawChild) -> Result<String, WireError> {
    Ok(child.text.clone())
}

fn decode_switch_value(child: &RawChild) -> Result<SwitchState, WireError> {
    Ok(SwitchState::from_str(&child.text)?)
}

fn decode_blob_value(child: &RawChild) -> Result<BlobValue, WireError> {
    let bytes = base64::engine::general_purpose::STANDARD.decode(child.text.trim())?;
    let size = child.attrs.get("size").map(|s| s.parse::<u64>()).transpose()?;
    Ok(BlobValue { format: child.attrs.get("format").cloned(), size, bytes })
}
