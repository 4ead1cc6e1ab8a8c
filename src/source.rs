//! Image sources: an in-memory collection or an index-based accessor.
//!
//! The labeller never decodes images itself. It hands whatever `I` the source
//! produces to the presenter and to image-changed subscribers.

use std::borrow::Cow;
use std::fmt;

/// Accessor producing the image at an index.
pub type ImageFn<I> = Box<dyn Fn(usize) -> I>;

/// Where images come from.
pub enum ImageSource<I> {
    /// Images held in memory, counted by the collection length
    Collection(Vec<I>),
    /// Images produced on demand; the count must be supplied explicitly
    Function {
        /// Accessor called with an index in `0..count`
        get: ImageFn<I>,
        /// Number of images, required before a labeller can be built
        count: Option<usize>,
    },
}

impl<I: Clone> ImageSource<I> {
    /// Use an in-memory collection.
    pub fn from_vec(images: Vec<I>) -> Self {
        ImageSource::Collection(images)
    }

    /// Use an accessor function. A count must be set with [`ImageSource::with_count`].
    pub fn from_fn<F>(get: F) -> Self
    where
        F: Fn(usize) -> I + 'static,
    {
        ImageSource::Function {
            get: Box::new(get),
            count: None,
        }
    }

    /// Set the image count of an accessor source. Ignored for collections.
    pub fn with_count(self, count: usize) -> Self {
        match self {
            ImageSource::Function { get, .. } => ImageSource::Function {
                get,
                count: Some(count),
            },
            collection @ ImageSource::Collection(_) => collection,
        }
    }

    /// Number of images, or `None` for an accessor without a count.
    pub fn count(&self) -> Option<usize> {
        match self {
            ImageSource::Collection(images) => Some(images.len()),
            ImageSource::Function { count, .. } => *count,
        }
    }

    /// Get the image at `index`.
    ///
    /// Collections borrow, accessors produce an owned image. Callers keep
    /// `index` within `0..count`.
    pub fn get(&self, index: usize) -> Cow<'_, I> {
        match self {
            ImageSource::Collection(images) => Cow::Borrowed(&images[index]),
            ImageSource::Function { get, .. } => Cow::Owned(get(index)),
        }
    }
}

impl<I> fmt::Debug for ImageSource<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageSource::Collection(images) => f
                .debug_struct("Collection")
                .field("len", &images.len())
                .finish(),
            ImageSource::Function { count, .. } => {
                f.debug_struct("Function").field("count", count).finish()
            }
        }
    }
}
