use serde::{Deserialize, Serialize};

use crate::features::session::Identity;

/// A file record as listed by the endpoint.
///
/// Local copies are read-only snapshots; the endpoint owns the data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub id: i64,
    pub filename: String,
    pub file_size: u64,
    #[serde(default)]
    pub description: Option<String>,
    pub uploaded_at: String,
    pub username: String,
}

impl FileRecord {
    /// Description text, empty when none was given
    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }

    /// Whether the delete action is offered for this record.
    ///
    /// Only a display hint: the endpoint decides who may delete.
    pub fn is_owned_by(&self, identity: &Identity) -> bool {
        !identity.is_blank() && self.username == identity.as_str()
    }
}
