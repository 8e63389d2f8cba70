//! The client-side handle to a Connection (spec §4.2 "Public contract").

use obs_core::{PropertyVector, State, SwitchState};
use obs_wire::{encode_new_number, encode_new_switch, encode_new_text};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

use crate::error::ConnectionError;
use crate::task::Task;
use crate::worker::Worker;

/// Default timeout for a blocking `set_value` (spec §4.2: `timeout = 10s`).
pub const DEFAULT_SET_TIMEOUT: Duration = Duration::from_secs(10);

const SET_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// `enableBLOB` mode sent via [`Connection::set_camera_recv`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlobMode {
    #[default]
    Also,
    Only,
    Never,
}

impl BlobMode {
    fn as_str(self) -> &'static str {
        match self {
            BlobMode::Also => "Also",
            BlobMode::Only => "Only",
            BlobMode::Never => "Never",
        }
    }
}

/// A typed value to write to a property element, dispatched against the
/// target vector's kind.
#[derive(Debug, Clone)]
pub enum WriteValue {
    Number(f64),
    Text(String),
    Switch(SwitchState),
}

/// A live mirror of one remote device tree (spec §4.2).
///
/// Cloning a `Connection` shares the same worker and channels; dropping the
/// last handle does not stop the worker (call [`Connection::close`]
/// explicitly, matching the original's `stop()`/`join()` pair).
#[derive(Clone)]
pub struct Connection {
    task_tx: mpsc::UnboundedSender<Task>,
    response_rx: std::sync::Arc<Mutex<mpsc::UnboundedReceiver<State>>>,
    worker: std::sync::Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl Connection {
    /// Open a TCP connection to `(host, port)` and spawn its worker.
    pub async fn connect(host: impl AsRef<str>, port: u16) -> Result<Self, ConnectionError> {
        let stream = TcpStream::connect((host.as_ref(), port)).await?;
        let (task_tx, task_rx) = mpsc::unbounded_channel();
        let (response_tx, response_rx) = mpsc::unbounded_channel();
        let worker = Worker::new(stream, task_rx, response_tx);
        let handle = tokio::spawn(worker.run());
        Ok(Self {
            task_tx,
            response_rx: std::sync::Arc::new(Mutex::new(response_rx)),
            worker: std::sync::Arc::new(Mutex::new(Some(handle))),
        })
    }

    /// The newest available snapshot, draining to the latest if several
    /// have queued up. Fails with [`ConnectionError::NotConnected`] if the
    /// worker has died.
    pub async fn state(&self) -> Result<State, ConnectionError> {
        self.task_tx.send(Task::GetState).map_err(|_| ConnectionError::NotConnected)?;
        let mut rx = self.response_rx.lock().await;
        let mut latest = rx.recv().await.ok_or(ConnectionError::NotConnected)?;
        while let Ok(next) = rx.try_recv() {
            latest = next;
        }
        Ok(latest)
    }

    /// Look up `device.property` in the current snapshot, build and send a
    /// mutation element, and optionally block until the mirror reflects it.
    pub async fn set_value(
        &self,
        device: &str,
        property: &str,
        values: Vec<(String, WriteValue)>,
        block: bool,
        timeout: Duration,
    ) -> Result<(), ConnectionError> {
        let snapshot = self.state().await?;
        let dev = snapshot.get(device).ok_or_else(|| ConnectionError::UnknownDevice(device.to_string()))?;
        let vector = dev
            .get(property)
            .ok_or_else(|| ConnectionError::UnknownProperty { device: device.to_string(), property: property.to_string() })?;

        let mismatch = || ConnectionError::ValueKindMismatch {
            device: device.to_string(),
            property: property.to_string(),
        };

        match vector {
            PropertyVector::Number(nv) => {
                let vals = as_numbers(&values).ok_or_else(mismatch)?;
                let xml = encode_new_number(nv, &vals)?;
                self.enqueue_send(xml)?;
            }
            PropertyVector::Text(tv) => {
                let vals = as_texts(&values).ok_or_else(mismatch)?;
                let xml = encode_new_text(tv, &vals)?;
                self.enqueue_send(xml)?;
            }
            PropertyVector::Switch(sv) => {
                let vals = as_switches(&values).ok_or_else(mismatch)?;
                let xml = encode_new_switch(sv, &vals)?;
                self.enqueue_send(xml)?;
            }
            PropertyVector::Blob(_) => return Err(ConnectionError::BlobNotWritable),
        }

        if !block {
            return Ok(());
        }

        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let snapshot = self.state().await?;
            if is_set(&snapshot, device, property, &values) {
                return Ok(());
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(ConnectionError::SetTimeout);
            }
            tokio::time::sleep(SET_POLL_INTERVAL).await;
        }
    }

    /// Enable (or disable) blob forwarding for camera devices.
    pub async fn set_camera_recv(&self, devices: Option<Vec<String>>, mode: BlobMode) -> Result<(), ConnectionError> {
        let snapshot = self.state().await?;
        let targets: Vec<String> = match devices {
            Some(devices) => devices,
            None => snapshot.find_cameras().into_iter().map(str::to_string).collect(),
        };
        for device in targets {
            let xml = format!(r#"<enableBLOB device="{device}">{}</enableBLOB>"#, mode.as_str());
            self.enqueue_send(xml)?;
        }
        Ok(())
    }

    /// Enqueue `stop` and wait for the worker to terminate.
    pub async fn close(&self) -> Result<(), ConnectionError> {
        let _ = self.task_tx.send(Task::Stop);
        if let Some(handle) = self.worker.lock().await.take() {
            let _ = handle.await;
        }
        Ok(())
    }

    fn enqueue_send(&self, xml: String) -> Result<(), ConnectionError> {
        self.task_tx.send(Task::Send(xml)).map_err(|_| ConnectionError::NotConnected)
    }
}

fn as_numbers(values: &[(String, WriteValue)]) -> Option<Vec<(String, f64)>> {
    values
        .iter()
        .map(|(name, value)| match value {
            WriteValue::Number(v) => Some((name.clone(), *v)),
            _ => None,
        })
        .collect()
}

fn as_texts(values: &[(String, WriteValue)]) -> Option<Vec<(String, String)>> {
    values
        .iter()
        .map(|(name, value)| match value {
            WriteValue::Text(v) => Some((name.clone(), v.clone())),
            _ => None,
        })
        .collect()
}

fn as_switches(values: &[(String, WriteValue)]) -> Option<Vec<(String, SwitchState)>> {
    values
        .iter()
        .map(|(name, value)| match value {
            WriteValue::Switch(v) => Some((name.clone(), *v)),
            _ => None,
        })
        .collect()
}

fn is_set(snapshot: &State, device: &str, property: &str, values: &[(String, WriteValue)]) -> bool {
    let Some(vector) = snapshot.get(device).and_then(|d| d.get(property)) else {
        return false;
    };
    match vector {
        PropertyVector::Number(nv) => as_numbers(values).is_some_and(|v| nv.is_set(&v)),
        PropertyVector::Text(tv) => as_texts(values).is_some_and(|v| tv.is_set(&v)),
        PropertyVector::Switch(sv) => as_switches(values).is_some_and(|v| sv.is_set(&v)),
        PropertyVector::Blob(_) => true,
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
