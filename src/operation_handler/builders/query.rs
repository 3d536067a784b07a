//! Query builder utilities for PageQuery

use crate::operation_handler::core::PageQuery;

impl PageQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set pagination parameters.
    pub fn with_pagination(mut self, offset: usize, limit: usize) -> Self {
        self.offset = Some(offset);
        self.limit = Some(limit);
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}
