//! Request context for catalogue operations.

use uuid::Uuid;

/// Per-request tracking information, used for log correlation.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Unique identifier for this request
    pub request_id: String,
}

impl RequestContext {
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
        }
    }

    pub fn with_generated_id() -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
        }
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::with_generated_id()
    }
}
