//! Typed publish/subscribe hub for labeller events.
//!
//! Two fixed event kinds are supported:
//!
//! - image changed: `(index, &image)` after the current image moves
//! - label assigned: `(index, &class)` after a class key is handled, for both
//!   toggle-on and toggle-off in multiclass mode
//!
//! Delivery is synchronous and in subscription order.
//!
//! # Examples
//!
//! ```
//! use image_labeller::Observers;
//!
//! let mut observers: Observers<Vec<u8>, String> = Observers::new();
//! let id = observers.on_label_assigned(|index, class| println!("{index}: {class}"));
//! observers.emit_label_assigned(0, &"good".to_string());
//! assert!(observers.unsubscribe(id));
//! ```

use std::fmt;

/// Kind of event a subscription listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// The current image changed
    ImageChanged,
    /// A class key was handled for the current image
    LabelAssigned,
}

/// Opaque handle returned by a subscription, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId {
    kind: EventKind,
    id: u64,
}

impl SubscriptionId {
    /// The event kind this subscription listens to.
    pub fn kind(&self) -> EventKind {
        self.kind
    }
}

type ImageChangedFn<I> = Box<dyn FnMut(usize, &I)>;
type LabelAssignedFn<C> = Box<dyn FnMut(usize, &C)>;

/// Registered callbacks for both event kinds.
pub struct Observers<I, C> {
    next_id: u64,
    image_changed: Vec<(u64, ImageChangedFn<I>)>,
    label_assigned: Vec<(u64, LabelAssignedFn<C>)>,
}

impl<I, C> Observers<I, C> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            next_id: 0,
            image_changed: Vec::new(),
            label_assigned: Vec::new(),
        }
    }

    /// Call `f` with the new index and image whenever the current image changes.
    pub fn on_image_changed<F>(&mut self, f: F) -> SubscriptionId
    where
        F: FnMut(usize, &I) + 'static,
    {
        let id = self.allocate(EventKind::ImageChanged);
        self.image_changed.push((id.id, Box::new(f)));
        id
    }

    /// Call `f` with the image index and class whenever a class key is handled.
    pub fn on_label_assigned<F>(&mut self, f: F) -> SubscriptionId
    where
        F: FnMut(usize, &C) + 'static,
    {
        let id = self.allocate(EventKind::LabelAssigned);
        self.label_assigned.push((id.id, Box::new(f)));
        id
    }

    /// Remove a subscription. Returns false if it was already removed.
    pub fn unsubscribe(&mut self, subscription: SubscriptionId) -> bool {
        let before = self.len();
        match subscription.kind {
            EventKind::ImageChanged => self.image_changed.retain(|(id, _)| *id != subscription.id),
            EventKind::LabelAssigned => {
                self.label_assigned.retain(|(id, _)| *id != subscription.id)
            }
        }
        let removed = self.len() < before;
        if removed {
            log::debug!("Removed {:?} subscription {}", subscription.kind, subscription.id);
        }
        removed
    }

    /// Deliver an image-changed event to every subscriber.
    pub fn emit_image_changed(&mut self, index: usize, image: &I) {
        for (_, callback) in &mut self.image_changed {
            callback(index, image);
        }
    }

    /// Deliver a label-assigned event to every subscriber.
    pub fn emit_label_assigned(&mut self, index: usize, class: &C) {
        for (_, callback) in &mut self.label_assigned {
            callback(index, class);
        }
    }

    /// Total number of subscriptions.
    pub fn len(&self) -> usize {
        self.image_changed.len() + self.label_assigned.len()
    }

    /// Check whether there are no subscriptions.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn allocate(&mut self, kind: EventKind) -> SubscriptionId {
        let id = self.next_id;
        self.next_id += 1;
        SubscriptionId { kind, id }
    }
}

impl<I, C> Default for Observers<I, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I, C> fmt::Debug for Observers<I, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("image_changed", &self.image_changed.len())
            .field("label_assigned", &self.label_assigned.len())
            .finish()
    }
}
