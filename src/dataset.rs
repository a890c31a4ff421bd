//! Static host dataset: loading and IP lookup.
//!
//! The dataset file is re-read on every call; nothing is cached between requests.

use serde::Deserialize;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::{HostSummaryError, Result};

/// Parsed `{"hosts": [...]}` document. Host records are kept as opaque JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct Dataset {
    pub hosts: Vec<Value>,
}

impl Dataset {
    /// First host whose `ip` field is a string exactly equal to `ip`.
    pub fn find_host(&self, ip: &str) -> Option<&Value> {
        self.hosts
            .iter()
            .find(|host| host.get("ip").and_then(Value::as_str) == Some(ip))
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}

/// Load the dataset from `path`.
///
/// Returns `Ok(None)` when the file does not exist, or when it holds `null` or an
/// empty object. Read failures, malformed JSON and documents without a `hosts`
/// array are errors.
pub fn load_dataset(path: &Path) -> Result<Option<Dataset>> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), "Dataset file not found");
            return Ok(None);
        }
        Err(e) => {
            return Err(HostSummaryError::Dataset {
                message: format!("failed to read {}: {}", path.display(), e),
            });
        }
    };

    let value: Value = serde_json::from_str(&raw).map_err(|e| HostSummaryError::Dataset {
        message: format!("invalid JSON in {}: {}", path.display(), e),
    })?;

    let empty = match &value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    };
    if empty {
        tracing::warn!(path = %path.display(), "Dataset file is empty");
        return Ok(None);
    }

    let dataset: Dataset =
        serde_json::from_value(value).map_err(|e| HostSummaryError::Dataset {
            message: format!("unexpected dataset layout in {}: {}", path.display(), e),
        })?;

    tracing::debug!(path = %path.display(), hosts = dataset.len(), "Loaded dataset");
    Ok(Some(dataset))
}
