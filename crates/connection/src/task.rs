/// A message enqueued onto the worker's task queue (spec §4.2 step 4).
#[derive(Debug)]
pub(crate) enum Task {
    /// Serialize a deep copy of the mirror onto the response queue.
    GetState,
    /// Write these already-encoded bytes to the socket verbatim.
    Send(String),
    /// Close the socket and terminate the worker.
    Stop,
}
