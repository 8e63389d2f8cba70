//! Job identifier.
//!
//! Unlike the teacher's locally-minted IDs (fixed prefix + nanoid, sized to
//! fit a 23-byte inline buffer), job ids here are opaque record ids assigned
//! by the external catalog service and simply round-tripped. There is no
//! fixed length or prefix to rely on, so `JobId` wraps `SmolStr` rather than
//! the fixed-capacity `IdBuf` scheme.

use smol_str::SmolStr;
use std::fmt;

/// Catalog-assigned identifier for a scheduled job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(SmolStr);

impl JobId {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(SmolStr::new(id.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        Self(SmolStr::new(s))
    }
}

impl AsRef<str> for JobId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl std::borrow::Borrow<str> for JobId {
    fn borrow(&self) -> &str {
        self.0.as_str()
    }
}

impl std::ops::Deref for JobId {
    type Target = str;

    fn deref(&self) -> &str {
        self.0.as_str()
    }
}

impl serde::Serialize for JobId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for JobId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = <&str>::deserialize(deserializer)?;
        Ok(JobId::new(s))
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
