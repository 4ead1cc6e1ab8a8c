//! Labeller state: per-image labels and the current image index.

mod labels;
mod navigation;

pub use labels::{LabelMode, LabelStore};
pub use navigation::Navigator;
