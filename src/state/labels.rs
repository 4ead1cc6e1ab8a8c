//! Per-image label storage.
//!
//! Labels live in a single N x C boolean matrix. The exclusive view (at most
//! one class per image) is a projection of that matrix, so converting between
//! the two views can never drift out of sync.

use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::error::{LabellerError, Result};
use crate::model::{ClassId, ClassSet};

/// Whether an image carries one class or an independent flag per class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelMode {
    /// Each image carries at most one class
    #[default]
    Exclusive,
    /// Each image carries any subset of the classes
    Multiclass,
}

impl LabelMode {
    /// Select the mode from a multiclass flag.
    pub fn from_multiclass(multiclass: bool) -> Self {
        if multiclass {
            LabelMode::Multiclass
        } else {
            LabelMode::Exclusive
        }
    }

    /// Check if this is multiclass mode.
    pub fn is_multiclass(&self) -> bool {
        matches!(self, LabelMode::Multiclass)
    }
}

/// Label state for a fixed number of images.
#[derive(Debug, Clone)]
pub struct LabelStore<C> {
    classes: ClassSet<C>,
    one_hot: Array2<bool>,
    mode: LabelMode,
}

impl<C: ClassId> LabelStore<C> {
    /// Create an empty store: no image carries any class.
    pub fn new(classes: ClassSet<C>, image_count: usize, mode: LabelMode) -> Self {
        let one_hot = Array2::from_elem((image_count, classes.len()), false);
        Self {
            classes,
            one_hot,
            mode,
        }
    }

    /// Number of images.
    pub fn len(&self) -> usize {
        self.one_hot.nrows()
    }

    /// Check whether the store holds no images.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The labelling mode, fixed at construction.
    pub fn mode(&self) -> LabelMode {
        self.mode
    }

    /// The class set.
    pub fn classes(&self) -> &ClassSet<C> {
        &self.classes
    }

    /// Get the single class of an image.
    ///
    /// Returns `None` for out-of-range indices, unlabelled images, and
    /// multiclass rows with more than one flag set.
    pub fn get(&self, index: usize) -> Option<&C> {
        let row = self.row(index)?;
        single_class(row).and_then(|column| self.classes.get(column))
    }

    /// All classes carried by an image, in class order.
    pub fn classes_of(&self, index: usize) -> Vec<&C> {
        let Some(row) = self.row(index) else {
            return Vec::new();
        };
        row.iter()
            .zip(self.classes.iter())
            .filter(|(flag, _)| **flag)
            .map(|(_, class)| class)
            .collect()
    }

    /// The one-hot row of an image.
    pub fn row(&self, index: usize) -> Option<ArrayView1<'_, bool>> {
        (index < self.len()).then(|| self.one_hot.row(index))
    }

    /// Check whether an image carries more than one class.
    pub fn is_ambiguous(&self, index: usize) -> bool {
        self.row(index)
            .is_some_and(|row| row.iter().filter(|flag| **flag).count() > 1)
    }

    /// Replace the label of an image with a single class.
    ///
    /// Returns false if either index is out of range.
    pub fn assign(&mut self, index: usize, class_index: usize) -> bool {
        if index >= self.len() || class_index >= self.classes.len() {
            return false;
        }
        let mut row = self.one_hot.row_mut(index);
        row.fill(false);
        row[class_index] = true;
        true
    }

    /// Flip one class flag of an image, leaving the others untouched.
    ///
    /// Returns the new flag value, or `None` if either index is out of range.
    pub fn toggle(&mut self, index: usize, class_index: usize) -> Option<bool> {
        let flag = self.one_hot.get_mut((index, class_index))?;
        *flag = !*flag;
        Some(*flag)
    }

    /// Exclusive view: one optional class per image.
    ///
    /// Lossy for multiclass rows with more than one flag, which map to `None`.
    /// Use [`LabelStore::as_class_lists`] for a lossless view.
    pub fn as_exclusive(&self) -> Vec<Option<C>> {
        self.one_hot
            .rows()
            .into_iter()
            .map(|row| single_class(row).and_then(|column| self.classes.get(column).cloned()))
            .collect()
    }

    /// Per-image list of classes, in class order.
    pub fn as_class_lists(&self) -> Vec<Vec<C>> {
        (0..self.len())
            .map(|index| self.classes_of(index).into_iter().cloned().collect())
            .collect()
    }

    /// One-hot view: row i, column j is true iff image i carries class j.
    pub fn as_one_hot(&self) -> &Array2<bool> {
        &self.one_hot
    }

    /// Replace all labels from an exclusive label list.
    ///
    /// Nothing is changed unless the whole input is valid.
    pub fn set_all(&mut self, labels: &[Option<C>]) -> Result<()> {
        self.check_len(labels.len())?;
        let mut one_hot = Array2::from_elem(self.one_hot.dim(), false);
        for (index, label) in labels.iter().enumerate() {
            if let Some(class) = label {
                one_hot[[index, self.column_of(index, class)?]] = true;
            }
        }
        self.one_hot = one_hot;
        log::debug!("Replaced labels for {} images", self.len());
        Ok(())
    }

    /// Replace all labels from per-image class lists.
    ///
    /// In exclusive mode a list with more than one class is rejected.
    pub fn set_all_class_lists(&mut self, labels: &[Vec<C>]) -> Result<()> {
        self.check_len(labels.len())?;
        let mut one_hot = Array2::from_elem(self.one_hot.dim(), false);
        for (index, classes) in labels.iter().enumerate() {
            for class in classes {
                one_hot[[index, self.column_of(index, class)?]] = true;
            }
        }
        self.check_exclusive(&one_hot)?;
        self.one_hot = one_hot;
        log::debug!("Replaced class lists for {} images", self.len());
        Ok(())
    }

    /// Replace the whole one-hot matrix.
    pub fn set_all_one_hot(&mut self, one_hot: Array2<bool>) -> Result<()> {
        self.check_len(one_hot.nrows())?;
        if one_hot.ncols() != self.classes.len() {
            return Err(LabellerError::config(format!(
                "one-hot labels have {} columns but there are {} classes",
                one_hot.ncols(),
                self.classes.len()
            )));
        }
        self.check_exclusive(&one_hot)?;
        self.one_hot = one_hot;
        log::debug!("Replaced one-hot labels for {} images", self.len());
        Ok(())
    }

    fn check_len(&self, found: usize) -> Result<()> {
        if found != self.len() {
            return Err(LabellerError::length_mismatch(self.len(), found));
        }
        Ok(())
    }

    fn column_of(&self, index: usize, class: &C) -> Result<usize> {
        self.classes
            .position(class)
            .ok_or_else(|| LabellerError::UnknownClass {
                index,
                class: class.to_string(),
            })
    }

    fn check_exclusive(&self, one_hot: &Array2<bool>) -> Result<()> {
        if self.mode.is_multiclass() {
            return Ok(());
        }
        match one_hot
            .rows()
            .into_iter()
            .position(|row| row.iter().filter(|flag| **flag).count() > 1)
        {
            Some(index) => Err(LabellerError::MultipleLabels { index }),
            None => Ok(()),
        }
    }
}

/// Column of the only true entry, if exactly one exists.
fn single_class(row: ArrayView1<'_, bool>) -> Option<usize> {
    let mut set = row.iter().enumerate().filter(|(_, flag)| **flag);
    match (set.next(), set.next()) {
        (Some((column, _)), None) => Some(column),
        _ => None,
    }
}
