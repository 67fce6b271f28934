//! Typed model for a structured multi-file fix proposal.

use serde::{Deserialize, Deserializer, Serialize};

/// One described change within a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeDescriptor {
    /// Approximate starting line of the change; `None` when the model could
    /// not name one. Accepts a number, a numeric string, or an unknown
    /// marker on the wire.
    #[serde(default, deserialize_with = "deserialize_line")]
    pub line: Option<u32>,
    /// One-sentence description of what was changed.
    pub description: String,
    /// Why the change was necessary.
    pub reason: String,
}

/// A complete replacement for one file, with its change summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    /// Absolute path of the file to change, as it was sent in the request.
    pub file_path: String,
    /// Logical changes applied within the file.
    #[serde(default)]
    pub summary_of_changes: Vec<ChangeDescriptor>,
    /// The complete new content for the file.
    pub fixed_code: String,
}

/// The structured multi-file edit response returned by the generation
/// service for one fix request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixProposal {
    /// Files to modify, in the order the service proposed them. An empty
    /// list is a valid "nothing to change" proposal.
    pub changes: Vec<FileChange>,
}

impl FixProposal {
    /// Whether the proposal contains no changes at all.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Models emit the line number in several shapes: a plain integer, a quoted
/// integer, `null`, or a marker such as `"unknown"`. All non-numeric shapes
/// map to `None`.
fn deserialize_line<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(number) => number.as_u64().and_then(|n| u32::try_from(n).ok()),
        serde_json::Value::String(text) => text.trim().parse().ok(),
        _ => None,
    })
}
