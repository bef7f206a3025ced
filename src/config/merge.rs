//! Configuration merge: source ordering and the defaults layer.

pub mod merge_policy;
pub mod service;
