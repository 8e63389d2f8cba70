//! The single source of truth for remote device state.

use crate::device::Device;
use std::collections::BTreeMap;

/// Mapping from device-name to [`Device`].
///
/// Snapshots handed to callers are plain clones (`#[derive(Clone)]`), giving
/// value semantics: mutating the live mirror afterward never affects a
/// snapshot already delivered. Mirrors `original_source/system.py`'s
/// `State(UserDict)`.
#[derive(Debug, Clone, Default)]
pub struct State {
    devices: BTreeMap<String, Device>,
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, device: &str) -> Option<&Device> {
        self.devices.get(device)
    }

    pub fn get_mut(&mut self, device: &str) -> Option<&mut Device> {
        self.devices.get_mut(device)
    }

    pub fn get_or_insert(&mut self, device: &str) -> &mut Device {
        self.devices.entry(device.to_string()).or_insert_with(|| Device::new(device))
    }

    pub fn remove_device(&mut self, device: &str) -> Option<Device> {
        self.devices.remove(device)
    }

    pub fn contains(&self, device: &str) -> bool {
        self.devices.contains_key(device)
    }

    pub fn device_names(&self) -> impl Iterator<Item = &str> {
        self.devices.keys().map(|s| s.as_str())
    }

    pub fn devices(&self) -> impl Iterator<Item = &Device> {
        self.devices.values()
    }

    /// Devices that publish at least one blob (camera) vector.
    pub fn find_cameras(&self) -> Vec<&str> {
        self.devices
            .values()
            .filter(|d| d.is_camera())
            .map(|d| d.name.as_str())
            .collect()
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
