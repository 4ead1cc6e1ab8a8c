//! Class set data model: the ordered, immutable list of labels an image can carry.

use std::fmt;

use crate::error::{LabellerError, Result};

/// Anything usable as a class identifier.
///
/// Classes are compared for equality when labels are assigned in bulk and
/// displayed in titles and legends.
pub trait ClassId: Clone + PartialEq + fmt::Display {}

impl<T: Clone + PartialEq + fmt::Display> ClassId for T {}

/// Ordered set of class identifiers.
///
/// The position of a class is its column in the one-hot label matrix and
/// the index a keymap entry resolves to.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassSet<C> {
    classes: Vec<C>,
}

impl<C: ClassId> ClassSet<C> {
    /// Create a class set, rejecting empty or duplicate entries.
    pub fn new(classes: Vec<C>) -> Result<Self> {
        if classes.is_empty() {
            return Err(LabellerError::config("at least one class is required"));
        }
        for (i, class) in classes.iter().enumerate() {
            if classes[..i].contains(class) {
                return Err(LabellerError::config(format!(
                    "class '{}' is listed more than once",
                    class
                )));
            }
        }
        Ok(Self { classes })
    }

    /// Number of classes.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Always false, a class set holds at least one class.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Get the class at a position.
    pub fn get(&self, index: usize) -> Option<&C> {
        self.classes.get(index)
    }

    /// Find the position of a class.
    pub fn position(&self, class: &C) -> Option<usize> {
        self.classes.iter().position(|c| c == class)
    }

    /// Iterate over classes in order.
    pub fn iter(&self) -> std::slice::Iter<'_, C> {
        self.classes.iter()
    }
}

impl<'a, C> IntoIterator for &'a ClassSet<C> {
    type Item = &'a C;
    type IntoIter = std::slice::Iter<'a, C>;

    fn into_iter(self) -> Self::IntoIter {
        self.classes.iter()
    }
}
