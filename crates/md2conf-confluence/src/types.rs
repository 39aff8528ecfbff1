//! Confluence content types.

use serde::{Deserialize, Serialize};

/// Confluence page as returned by the content API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RemotePage {
    /// Page ID, assigned by Confluence.
    pub id: String,
    /// Page title.
    pub title: String,
    /// Version information.
    pub version: Version,
    /// Page body content (only when expanded).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Body>,
}

impl RemotePage {
    /// Storage-format body, if it was part of the response.
    #[must_use]
    pub fn storage_value(&self) -> Option<&str> {
        self.body
            .as_ref()
            .and_then(|b| b.storage.as_ref())
            .map(|s| s.value.as_str())
    }
}

/// Page version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct Version {
    /// Version number, starting at 1.
    pub number: u32,
}

/// Page body content.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Body {
    /// Storage format content.
    #[serde(default)]
    pub storage: Option<Storage>,
}

/// Storage format representation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Storage {
    /// XHTML content in Confluence storage format.
    pub value: String,
    /// Content representation (always "storage").
    pub representation: String,
}

/// Paged result of a content search.
#[derive(Debug, Deserialize)]
pub(crate) struct ContentResults {
    pub results: Vec<RemotePage>,
}
