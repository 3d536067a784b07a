//! Builder utilities for operation handler types
//!
//! Convenience constructors for [`OperationRequest`](super::OperationRequest) and
//! [`PageQuery`](super::PageQuery), provided as impl blocks on the core types.

pub mod query;
pub mod request;
