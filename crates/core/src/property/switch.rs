//! Switch vectors: `{label, value: On|Off}` elements, constrained by a rule.

use super::{ElementMap, VectorMeta};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwitchRule {
    OneOfMany,
    AtMostOne,
    AnyOfMany,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwitchState {
    On,
    Off,
}

impl std::str::FromStr for SwitchState {
    type Err = InvalidSwitchState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "on" => Ok(SwitchState::On),
            "off" => Ok(SwitchState::Off),
            _ => Err(InvalidSwitchState(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("{0:?} is not a valid switch state")]
pub struct InvalidSwitchState(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchElement {
    pub name: String,
    pub label: String,
    pub value: SwitchState,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwitchVector {
    #[serde(flatten)]
    pub meta: VectorMeta,
    pub rule: SwitchRule,
    pub elements: ElementMap<SwitchElement>,
}

/// A single-element write against a `one-of-many` vector that cannot be
/// unambiguously expanded into a full On/Off assignment.
#[derive(Debug, Clone, Error)]
#[error("{device}.{vector}: turning {element:?} Off is ambiguous under OneOfMany with {count} elements")]
pub struct SwitchRuleAmbiguity {
    pub device: String,
    pub vector: String,
    pub element: String,
    pub count: usize,
}

impl SwitchVector {
    /// Expand a (possibly single-element) requested write into the full set
    /// of `{element -> state}` pairs that must be sent on the wire to keep
    /// the vector's rule satisfied. See spec §4.1 "Encoding".
    pub fn expand_write(
        &self,
        requested: &[(String, SwitchState)],
    ) -> Result<Vec<(String, SwitchState)>, SwitchRuleAmbiguity> {
        if requested.len() != 1
            || !matches!(self.rule, SwitchRule::OneOfMany | SwitchRule::AtMostOne)
        {
            return Ok(requested.to_vec());
        }

        let (set_name, new_val) = &requested[0];
        match new_val {
            SwitchState::On => {
                let mut out = Vec::with_capacity(self.elements.len());
                for name in self.elements.names() {
                    let state = if name == set_name { SwitchState::On } else { SwitchState::Off };
                    out.push((name.to_string(), state));
                }
                Ok(out)
            }
            SwitchState::Off if self.rule == SwitchRule::OneOfMany && self.elements.len() == 2 => {
                let other = self
                    .elements
                    .names()
                    .find(|n| *n != set_name)
                    .expect("exactly two elements, one is set_name");
                Ok(vec![(set_name.clone(), SwitchState::Off), (other.to_string(), SwitchState::On)])
            }
            SwitchState::Off if self.rule == SwitchRule::AtMostOne => Ok(requested.to_vec()),
            SwitchState::Off => Err(SwitchRuleAmbiguity {
                device: self.meta.device.clone(),
                vector: self.meta.name.clone(),
                element: set_name.clone(),
                count: self.elements.len(),
            }),
        }
    }

    /// `is_set` predicate: enum equality against every requested element.
    pub fn is_set(&self, values: &[(String, SwitchState)]) -> bool {
        values
            .iter()
            .all(|(name, want)| self.elements.get(name).is_some_and(|e| e.value == *want))
    }

    /// Apply a server-echoed `setSwitchVector` update, enforcing the rule
    /// invariant: after applying a new `On`, all siblings are forced `Off`
    /// for `one-of-many`/`at-most-one` vectors (spec §3 invariant).
    pub fn apply_update(&mut self, name: &str, new_state: SwitchState) {
        if let Some(element) = self.elements.get_mut(name) {
            element.value = new_state;
        }
        if new_state == SwitchState::On
            && matches!(self.rule, SwitchRule::OneOfMany | SwitchRule::AtMostOne)
        {
            for (other_name, element) in self.elements.iter_mut() {
                if other_name != name {
                    element.value = SwitchState::Off;
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "switch_tests.rs"]
mod tests;
