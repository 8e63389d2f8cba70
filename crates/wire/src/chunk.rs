//! Framing: break an accumulating text stream into top-level elements.
//!
//! Ported from `original_source/parsing.py`'s `chunk_xml`/`_digest_chunk`:
//! infallible, best-effort, and tolerant of leading garbage. The input is a
//! stream of concatenated XML elements with no enclosing document root, so
//! there is no general grammar to lean on — we scan for the literal `/>`
//! (self-closed) or a literal `</tagname>` closer (balanced), exactly as
//! the original does.

use tracing::warn;

/// Accumulates residual text across reads and extracts complete elements.
#[derive(Debug, Default)]
pub struct Chunker {
    buffer: String,
}

impl Chunker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append newly-read text and return every complete top-level element
    /// found so far, leaving any incomplete tail buffered for next time.
    pub fn push(&mut self, text: &str) -> Vec<String> {
        self.buffer.push_str(text);
        let mut out = Vec::new();
        while let Some(chunk) = self.digest_one() {
            out.push(chunk);
        }
        out
    }

    /// True once the buffer holds the start of an element whose closing
    /// tag has not yet arrived. The connection worker uses this to decide
    /// whether to keep reading past the normal readiness poll (spec §4.2).
    pub fn has_pending_open(&self) -> bool {
        !self.buffer.trim_start().is_empty()
    }

    /// Discard whatever has accumulated, e.g. after the reassembly
    /// timeout elapses without a closer arriving.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    fn digest_one(&mut self) -> Option<String> {
        let trimmed_len = self.buffer.trim_start().len();
        let skipped = self.buffer.len() - trimmed_len;
        if skipped > 0 {
            self.buffer.drain(..skipped);
        }
        if self.buffer.is_empty() {
            return None;
        }

        if !self.buffer.starts_with('<') {
            match self.buffer.find('<') {
                Some(idx) => {
                    warn!(skipped = idx, "text does not begin with '<', skipping ahead");
                    self.buffer.drain(..idx);
                }
                None => {
                    warn!("no element start found in residual text, discarding");
                    self.buffer.clear();
                    return None;
                }
            }
        }

        if self.buffer.len() < 2 {
            return None;
        }

        let elem_name = element_name(&self.buffer);
        let bytes = self.buffer.as_bytes();
        let mut self_close_end = None;
        let mut opener_end = None;
        let mut idx = 0;
        while idx + 1 < bytes.len() {
            if &bytes[idx..idx + 2] == b"/>" {
                self_close_end = Some(idx + 2);
                break;
            } else if bytes[idx] == b'>' {
                opener_end = Some(idx + 1);
                break;
            }
            idx += 1;
        }

        if let Some(end) = self_close_end {
            let chunk = self.buffer[..end].trim().to_string();
            self.buffer.drain(..end);
            return if chunk.is_empty() { None } else { Some(chunk) };
        }

        opener_end?;

        let end_str = format!("</{elem_name}>");
        let pos = self.buffer.find(end_str.as_str())?;
        let end = pos + end_str.len();
        let chunk = self.buffer[..end].trim().to_string();
        self.buffer.drain(..end);
        Some(chunk)
    }
}

/// The tag name of an element starting at `text[0] == '<'`: everything up
/// to the first whitespace, `>`, or `/`.
fn element_name(text: &str) -> String {
    text[1..]
        .chars()
        .take_while(|c| !c.is_whitespace() && *c != '>' && *c != '/')
        .collect()
}

#[cfg(test)]
#[path = "chunk_tests.rs"]
mod tests;
