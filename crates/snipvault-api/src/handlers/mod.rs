//! Request handlers, grouped by resource.

pub mod ai;
pub mod collections;
pub mod snippets;
