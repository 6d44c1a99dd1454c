//! Template records owned by the caller.
//!
//! Only `code` is read. Migration returns a new record and leaves unknown
//! metadata fields exactly as they were.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub code: String,
    #[serde(flatten)]
    pub metadata: Map<String, Json>,
}

impl Template {
    pub fn new(id: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            code: code.into(),
            metadata: Map::new(),
        }
    }

    /// Copy of `self` with `code` replaced and `fields` merged into metadata.
    pub fn with_code(&self, code: String, fields: Map<String, Json>) -> Self {
        let mut metadata = self.metadata.clone();
        for (k, v) in fields {
            metadata.insert(k, v);
        }
        Self {
            id: self.id.clone(),
            code,
            metadata,
        }
    }
}
