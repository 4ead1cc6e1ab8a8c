//! Error types for labeller construction and bulk label assignment.
//!
//! Key presses never produce errors: unknown tokens are ignored and
//! out-of-range navigation is clamped. Everything here is raised
//! synchronously by the call that violated its contract.

use thiserror::Error;

/// Errors that can occur when building a labeller or replacing its labels.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LabellerError {
    /// Invalid or missing construction arguments
    #[error("Invalid configuration: {message}")]
    Config {
        /// Description of the problem
        message: String,
    },

    /// More classes than the chosen keymap preset has keys
    #[error(
        "{classes} classes but the '{keymap}' keymap only has {capacity} keys, please provide a custom keymap"
    )]
    Capacity {
        /// Number of classes requested
        classes: usize,
        /// Number of keys available in the preset
        capacity: usize,
        /// Name of the preset
        keymap: String,
    },

    /// A label collection whose length differs from the image count
    #[error("Expected labels for {expected} images, got {found}")]
    LengthMismatch {
        /// Number of images
        expected: usize,
        /// Length of the supplied collection
        found: usize,
    },

    /// A label that is not part of the class set
    #[error("Label for image {index} is not a known class: {class}")]
    UnknownClass {
        /// Image index carrying the label
        index: usize,
        /// Display form of the offending label
        class: String,
    },

    /// More than one class for an image in exclusive mode
    #[error("Image {index} has more than one class, which is only allowed in multiclass mode")]
    MultipleLabels {
        /// Image index carrying the labels
        index: usize,
    },
}

impl LabellerError {
    /// Create a configuration error with a message.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a length mismatch error.
    pub fn length_mismatch(expected: usize, found: usize) -> Self {
        Self::LengthMismatch { expected, found }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, LabellerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_message_names_keymap() {
        let err = LabellerError::Capacity {
            classes: 11,
            capacity: 10,
            keymap: "digits".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("11 classes"));
        assert!(msg.contains("'digits'"));
    }

    #[test]
    fn test_helper_constructors() {
        assert_eq!(
            LabellerError::length_mismatch(5, 4),
            LabellerError::LengthMismatch {
                expected: 5,
                found: 4
            }
        );
        assert!(matches!(
            LabellerError::config("missing count"),
            LabellerError::Config { message } if message == "missing count"
        ));
    }
}
