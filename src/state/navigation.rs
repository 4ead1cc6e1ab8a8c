//! Current-image navigation with clamping.

/// Current image index over a fixed number of images.
///
/// The index always stays within `0..len`. Requests outside that range are
/// clamped to the nearest end rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Navigator {
    index: usize,
    len: usize,
}

impl Navigator {
    /// Start at the first of `len` images. `len` must be at least one.
    pub fn new(len: usize) -> Self {
        debug_assert!(len > 0, "navigator needs at least one image");
        Self { index: 0, len }
    }

    /// The current index.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of images.
    pub fn count(&self) -> usize {
        self.len
    }

    /// Index of the last image.
    pub fn last(&self) -> usize {
        self.len.saturating_sub(1)
    }

    /// Check whether the current image is the last one.
    pub fn is_last(&self) -> bool {
        self.index == self.last()
    }

    /// Move to `value`, clamped into range.
    ///
    /// Returns the new index if it differs from the old one, `None` if the
    /// (clamped) request leaves the index where it was.
    pub fn set_index(&mut self, value: isize) -> Option<usize> {
        let target = usize::try_from(value).map_or(0, |v| v.min(self.last()));
        self.move_to(target)
    }

    /// Move by `delta` images, clamped into range.
    pub fn step(&mut self, delta: isize) -> Option<usize> {
        let target = self
            .index
            .checked_add_signed(delta)
            .map_or(0, |v| v.min(self.last()));
        self.move_to(target)
    }

    /// Move to the next image, staying put on the last one.
    pub fn next(&mut self) -> Option<usize> {
        self.step(1)
    }

    /// Move to the previous image, staying put on the first one.
    pub fn previous(&mut self) -> Option<usize> {
        self.step(-1)
    }

    fn move_to(&mut self, target: usize) -> Option<usize> {
        if target == self.index {
            return None;
        }
        log::debug!("Image index {} -> {}", self.index, target);
        self.index = target;
        Some(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_starts_at_zero() {
        let nav = Navigator::new(5);
        assert_eq!(nav.index(), 0);
        assert_eq!(nav.last(), 4);
        assert!(!nav.is_last());
    }

    #[test]
    fn test_same_index_is_no_op() {
        let mut nav = Navigator::new(5);
        assert_eq!(nav.set_index(3), Some(3));
        assert_eq!(nav.set_index(3), None);
        assert_eq!(nav.index(), 3);
    }

    #[test]
    fn test_clamps_to_bounds() {
        let mut nav = Navigator::new(5);
        assert_eq!(nav.set_index(100), Some(4));
        assert_eq!(nav.set_index(100), None);
        assert_eq!(nav.set_index(-3), Some(0));
        assert_eq!(nav.set_index(-3), None);
        assert_eq!(nav.index(), 0);
    }

    #[test]
    fn test_next_and_previous_stop_at_ends() {
        let mut nav = Navigator::new(2);
        assert_eq!(nav.previous(), None);
        assert_eq!(nav.next(), Some(1));
        assert!(nav.is_last());
        assert_eq!(nav.next(), None);
        assert_eq!(nav.previous(), Some(0));
    }

    #[test]
    fn test_single_image() {
        let mut nav = Navigator::new(1);
        assert!(nav.is_last());
        assert_eq!(nav.next(), None);
        assert_eq!(nav.set_index(isize::MAX), None);
        assert_eq!(nav.set_index(isize::MIN), None);
    }

    proptest! {
        #[test]
        fn in_range_index_reads_back(len in 1usize..50, raw in 0usize..50) {
            let mut nav = Navigator::new(len);
            let target = raw % len;
            nav.set_index(target as isize);
            prop_assert_eq!(nav.index(), target);
            prop_assert_eq!(nav.set_index(target as isize), None);
        }

        #[test]
        fn out_of_range_index_clamps(len in 1usize..50, value in any::<isize>()) {
            let mut nav = Navigator::new(len);
            nav.set_index(value);
            let expected = if value < 0 {
                0
            } else if value as usize >= len {
                len - 1
            } else {
                value as usize
            };
            prop_assert_eq!(nav.index(), expected);
        }
    }
}
