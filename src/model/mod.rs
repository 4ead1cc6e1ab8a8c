//! Data models for the labeller.

mod class_set;

pub use class_set::{ClassId, ClassSet};
