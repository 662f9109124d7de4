//! Read-only view of the externally maintained backlog (`bmad/backlog.json`).

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::core::selector::first_todo;
use crate::core::types::{BacklogItem, ItemStatus};

/// Source of pending work items.
pub trait Backlog {
    /// First `TODO` item in stored order.
    ///
    /// Absent or malformed backlogs resolve to `None`: a broken backlog must
    /// never crash the host loop.
    fn next_todo(&self) -> Option<BacklogItem>;
}

/// Accepted on-disk shapes: `{"stories": [...]}` or a bare array.
///
/// Items stay raw so one oddly shaped entry cannot hide the rest.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BacklogDocument {
    Stories { stories: Vec<Value> },
    Items(Vec<Value>),
}

impl BacklogDocument {
    fn into_items(self) -> Vec<BacklogItem> {
        let raw = match self {
            Self::Stories { stories } => stories,
            Self::Items(items) => items,
        };
        raw.iter().map(read_item).collect()
    }
}

/// Read one entry, tolerating missing, null, or mistyped fields.
///
/// A non-string `id` is stringified; a missing or null one reads as
/// `unknown`. Anything but a string `status` is never `TODO`.
fn read_item(value: &Value) -> BacklogItem {
    BacklogItem {
        id: text_field(value, "id").unwrap_or_else(|| "unknown".to_string()),
        title: text_field(value, "title").unwrap_or_default(),
        status: match value.get("status") {
            Some(Value::String(status)) => ItemStatus::from(status.clone()),
            _ => ItemStatus::Other(String::new()),
        },
    }
}

fn text_field(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

#[derive(Debug, Clone)]
pub struct FileBacklog {
    path: PathBuf,
}

impl FileBacklog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load every item, or `None` when the file does not exist.
    pub fn load_items(&self) -> Result<Option<Vec<BacklogItem>>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err).with_context(|| format!("read backlog {}", self.path.display()));
            }
        };
        let doc: BacklogDocument = serde_json::from_str(&contents)
            .with_context(|| format!("parse backlog {}", self.path.display()))?;
        Ok(Some(doc.into_items()))
    }
}

impl Backlog for FileBacklog {
    fn next_todo(&self) -> Option<BacklogItem> {
        match self.load_items() {
            Ok(Some(items)) => {
                let next = first_todo(&items).cloned();
                debug!(items = items.len(), next = ?next.as_ref().map(|i| &i.id), "backlog scanned");
                next
            }
            Ok(None) => {
                debug!(path = %self.path.display(), "no backlog file");
                None
            }
            Err(err) => {
                warn!(err = %format!("{err:#}"), "ignoring unreadable backlog");
                None
            }
        }
    }
}
