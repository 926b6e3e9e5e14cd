use chrono::{DateTime, Utc};
use content_id::{Codec, ContentId, HashAlgorithm};
use dom_inspector::DEFAULT_PATH_SEGMENTS;
use serde::{Deserialize, Serialize};

use crate::document::DEFAULT_CHANNEL_CAPACITY;
use crate::scan::HiddenReason;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HandleKind {
    #[default]
    DomNode,
}

/// Snapshot of one element, emitted per interaction or per qualifying hidden element.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualObjectHandle {
    /// Hex digest of `(url, event, selector, content)`.
    pub id: String,
    pub cid: ContentId,
    pub kind: HandleKind,
    /// Structural path of the element.
    pub selector: String,
    pub label: String,
    pub event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<HiddenReason>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub reduced_strength: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LiveOptions {
    pub max_content_bytes: usize,
    pub batch_limit: usize,
    pub path_segments: usize,
    pub label_chars: usize,
    pub algorithm: HashAlgorithm,
    pub codec: Codec,
    pub channel_capacity: usize,
}

impl Default for LiveOptions {
    fn default() -> Self {
        Self {
            max_content_bytes: 4096,
            batch_limit: 32,
            path_segments: DEFAULT_PATH_SEGMENTS,
            label_chars: 80,
            algorithm: HashAlgorithm::Sha256,
            codec: Codec::Raw,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl LiveOptions {
    /// Elements examined per mutation batch.
    pub fn scan_budget(&self) -> usize {
        self.batch_limit.saturating_mul(4)
    }
}
