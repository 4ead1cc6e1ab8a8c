//! The image labeller: navigation, label storage and key dispatch.
//!
//! An [`ImageLabeller`] is built once from a [`LabellerBuilder`]. After that
//! the image count, class set, keymap and labelling mode are fixed. Key
//! presses go through [`ImageLabeller::handle_key`], which either moves the
//! current image or assigns a class to it and notifies subscribers.
//!
//! Subscriber callbacks receive plain values and cannot reach the labeller,
//! so they cannot trigger a nested key press while one is being handled.

use std::borrow::Cow;

use ndarray::Array2;

use crate::error::{LabellerError, Result};
use crate::events::{Observers, SubscriptionId};
use crate::keybindings::{
    KeyAction, KeyBindings, Keymap, KeymapSpec, NavigationKeys, key_to_string,
};
use crate::model::{ClassId, ClassSet};
use crate::presenter::{Legend, PresentationOptions, Presenter};
use crate::source::ImageSource;
use crate::state::{LabelMode, LabelStore, Navigator};

/// Initial labels supplied at construction.
#[derive(Debug, Clone)]
enum InitialLabels<C> {
    Exclusive(Vec<Option<C>>),
    ClassLists(Vec<Vec<C>>),
    OneHot(Array2<bool>),
}

/// Construction parameters for an [`ImageLabeller`].
pub struct LabellerBuilder<I, C> {
    images: ImageSource<I>,
    classes: Vec<C>,
    init_labels: Option<InitialLabels<C>>,
    keymap: KeymapSpec,
    navigation: NavigationKeys,
    labelling_advances_image: bool,
    multiclass: bool,
    presentation: PresentationOptions,
    presenter: Option<Box<dyn Presenter<I>>>,
}

impl<I: Clone, C: ClassId> LabellerBuilder<I, C> {
    /// Start a builder with the default `digits` keymap, arrow-key navigation,
    /// exclusive mode and advance-on-label enabled.
    pub fn new(images: ImageSource<I>, classes: Vec<C>) -> Self {
        Self {
            images,
            classes,
            init_labels: None,
            keymap: KeymapSpec::default(),
            navigation: NavigationKeys::default(),
            labelling_advances_image: true,
            multiclass: false,
            presentation: PresentationOptions::new(),
            presenter: None,
        }
    }

    /// Initial exclusive labels, one per image.
    pub fn init_labels(mut self, labels: Vec<Option<C>>) -> Self {
        self.init_labels = Some(InitialLabels::Exclusive(labels));
        self
    }

    /// Initial labels as per-image class lists.
    pub fn init_class_labels(mut self, labels: Vec<Vec<C>>) -> Self {
        self.init_labels = Some(InitialLabels::ClassLists(labels));
        self
    }

    /// Initial labels as an N x C one-hot matrix.
    pub fn init_labels_one_hot(mut self, labels: Array2<bool>) -> Self {
        self.init_labels = Some(InitialLabels::OneHot(labels));
        self
    }

    /// How class keys are chosen.
    pub fn keymap(mut self, keymap: KeymapSpec) -> Self {
        self.keymap = keymap;
        self
    }

    /// Keys for previous/next image.
    pub fn navigation(mut self, navigation: NavigationKeys) -> Self {
        self.navigation = navigation;
        self
    }

    /// Whether labelling an image moves on to the next one. Ignored in multiclass mode.
    pub fn labelling_advances_image(mut self, advances: bool) -> Self {
        self.labelling_advances_image = advances;
        self
    }

    /// Allow any subset of classes per image instead of at most one.
    pub fn multiclass(mut self, multiclass: bool) -> Self {
        self.multiclass = multiclass;
        self
    }

    /// Options forwarded unchanged to the presenter.
    pub fn presentation_options(mut self, options: PresentationOptions) -> Self {
        self.presentation = options;
        self
    }

    /// Attach a presenter. It receives the initial view when the labeller is built.
    pub fn presenter(mut self, presenter: Box<dyn Presenter<I>>) -> Self {
        self.presenter = Some(presenter);
        self
    }

    /// Validate the parameters and build the labeller.
    pub fn build(self) -> Result<ImageLabeller<I, C>> {
        let image_count = self.images.count().ok_or_else(|| {
            LabellerError::config("an image accessor function needs an explicit image count")
        })?;
        if image_count == 0 {
            return Err(LabellerError::config("at least one image is required"));
        }

        let classes = ClassSet::new(self.classes)?;
        let keymap = Keymap::resolve(&self.keymap, classes.len())?;
        let bindings = KeyBindings::new(self.navigation, keymap)?;

        let mode = LabelMode::from_multiclass(self.multiclass);
        let mut store = LabelStore::new(classes, image_count, mode);
        match self.init_labels {
            None => {}
            Some(InitialLabels::Exclusive(labels)) => store.set_all(&labels)?,
            Some(InitialLabels::ClassLists(labels)) => store.set_all_class_lists(&labels)?,
            Some(InitialLabels::OneHot(labels)) => store.set_all_one_hot(labels)?,
        }

        if mode.is_multiclass() && !self.labelling_advances_image {
            log::debug!("labelling_advances_image has no effect in multiclass mode");
        }
        log::info!(
            "Created {:?} labeller: {} images, {} classes, {} class keys",
            mode,
            image_count,
            store.classes().len(),
            bindings.keymap.len()
        );

        let mut labeller = ImageLabeller {
            images: self.images,
            store,
            navigator: Navigator::new(image_count),
            bindings,
            advances_on_label: self.labelling_advances_image && !mode.is_multiclass(),
            observers: Observers::new(),
            presentation: self.presentation,
            presenter: None,
        };
        if let Some(presenter) = self.presenter {
            labeller.set_presenter(presenter);
        }
        Ok(labeller)
    }
}

/// Result of handling one key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// The current image changed
    Navigated {
        /// New image index
        index: usize,
    },
    /// A navigation key was pressed at the boundary; nothing changed
    AtBoundary,
    /// A class was assigned in exclusive mode
    Labelled {
        /// Image that received the label
        index: usize,
        /// Assigned class
        class_index: usize,
        /// Whether the labeller moved on to the next image
        advanced: bool,
    },
    /// A class flag was flipped in multiclass mode
    Toggled {
        /// Image whose flag changed
        index: usize,
        /// Toggled class
        class_index: usize,
        /// New flag value
        active: bool,
    },
    /// The key is not bound to anything
    Ignored,
}

/// Keyboard-driven image labeller.
pub struct ImageLabeller<I, C> {
    images: ImageSource<I>,
    store: LabelStore<C>,
    navigator: Navigator,
    bindings: KeyBindings,
    advances_on_label: bool,
    observers: Observers<I, C>,
    presentation: PresentationOptions,
    presenter: Option<Box<dyn Presenter<I>>>,
}

impl<I: Clone, C: ClassId> ImageLabeller<I, C> {
    /// Start building a labeller.
    pub fn builder(images: ImageSource<I>, classes: Vec<C>) -> LabellerBuilder<I, C> {
        LabellerBuilder::new(images, classes)
    }

    // ------------------------------------------------------------------------
    // Presentation
    // ------------------------------------------------------------------------

    /// Attach a presenter and push the full current view to it.
    pub fn set_presenter(&mut self, presenter: Box<dyn Presenter<I>>) {
        self.presenter = Some(presenter);
        let legend = self.legend();
        let title = self.title();
        let index = self.navigator.index();
        let image = self.images.get(index);
        let buttons = self.button_states();
        if let Some(presenter) = self.presenter.as_mut() {
            presenter.configure(&self.presentation);
            presenter.set_legend(&legend);
            presenter.show_image(index, &image);
            presenter.set_title(&title);
            if let Some(states) = buttons {
                presenter.set_button_states(&states);
            }
            presenter.redraw();
        }
    }

    /// Detach and return the presenter.
    pub fn take_presenter(&mut self) -> Option<Box<dyn Presenter<I>>> {
        self.presenter.take()
    }

    /// Options given at construction for the presenter.
    pub fn presentation_options(&self) -> &PresentationOptions {
        &self.presentation
    }

    /// Title text for the current image.
    pub fn title(&self) -> String {
        let index = self.navigator.index();
        match self.store.mode() {
            LabelMode::Multiclass => format!("Image {}", index),
            LabelMode::Exclusive => match self.store.get(index) {
                Some(class) => format!("Image {}\nLabel: {}", index, class),
                None => format!("Image {}\nLabel: None", index),
            },
        }
    }

    /// Keybinding legend for navigation and classes.
    pub fn legend(&self) -> Legend {
        let navigation = &self.bindings.navigation;
        let keymap = &self.bindings.keymap;
        let classes = self.store.classes();
        Legend {
            navigation: vec![
                (
                    key_to_string(&navigation.previous).to_string(),
                    "Previous Image".to_string(),
                ),
                (
                    key_to_string(&navigation.next).to_string(),
                    "Next Image".to_string(),
                ),
            ],
            classes: keymap
                .iter()
                .filter_map(|(key, index)| {
                    classes
                        .get(index)
                        .map(|class| (key_to_string(key).to_string(), class.to_string()))
                })
                .collect(),
            buttons: classes
                .iter()
                .enumerate()
                .map(|(index, class)| match keymap.key_for_class_index(index) {
                    Some(key) => format!("[{}]\n{}", key_to_string(key), class),
                    None => format!("[ ]\n{}", class),
                })
                .collect(),
        }
    }

    /// Check whether a key is bound by the labeller, either as a class key
    /// or as a navigation key.
    ///
    /// Presenters must not pass reserved keys on to their own default handling.
    pub fn is_reserved(&self, key: &str) -> bool {
        self.bindings.action_for_key(key).is_some()
    }

    /// Keys bound by the labeller: class keys in class order, then the
    /// previous and next navigation keys.
    pub fn reserved_keys(&self) -> Vec<&str> {
        let navigation = &self.bindings.navigation;
        self.bindings
            .keymap
            .keys()
            .chain([navigation.previous.as_str(), navigation.next.as_str()])
            .collect()
    }

    // ------------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------------

    /// Index of the current image.
    pub fn image_index(&self) -> usize {
        self.navigator.index()
    }

    /// Move to an image, clamping out-of-range values.
    ///
    /// Returns true if the current image changed. Nothing is emitted or
    /// redrawn otherwise.
    pub fn set_image_index(&mut self, index: isize) -> bool {
        let changed = self.navigator.set_index(index);
        self.after_navigation(changed)
    }

    /// Move to the next image. Returns true if the current image changed.
    pub fn next_image(&mut self) -> bool {
        let changed = self.navigator.next();
        self.after_navigation(changed)
    }

    /// Move to the previous image. Returns true if the current image changed.
    pub fn previous_image(&mut self) -> bool {
        let changed = self.navigator.previous();
        self.after_navigation(changed)
    }

    /// Number of images.
    pub fn image_count(&self) -> usize {
        self.navigator.count()
    }

    /// The current image.
    pub fn current_image(&self) -> Cow<'_, I> {
        self.images.get(self.navigator.index())
    }

    // ------------------------------------------------------------------------
    // Labels
    // ------------------------------------------------------------------------

    /// Labelling mode.
    pub fn mode(&self) -> LabelMode {
        self.store.mode()
    }

    /// The class set.
    pub fn classes(&self) -> &ClassSet<C> {
        self.store.classes()
    }

    /// Keybindings in use.
    pub fn key_bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    /// Whether labelling moves to the next image. Always false in multiclass mode.
    pub fn advances_on_label(&self) -> bool {
        self.advances_on_label
    }

    /// The single class of an image, if it has exactly one.
    pub fn label(&self, index: usize) -> Option<&C> {
        self.store.get(index)
    }

    /// One optional class per image.
    ///
    /// In multiclass mode images with several classes read as `None`; use
    /// [`ImageLabeller::class_labels`] to see them.
    pub fn labels(&self) -> Vec<Option<C>> {
        self.store.as_exclusive()
    }

    /// Replace all labels. The list length must equal the image count.
    pub fn set_labels(&mut self, labels: Vec<Option<C>>) -> Result<()> {
        self.store.set_all(&labels)?;
        self.refresh_labels_view();
        Ok(())
    }

    /// Classes carried by each image.
    pub fn class_labels(&self) -> Vec<Vec<C>> {
        self.store.as_class_lists()
    }

    /// Replace all labels from per-image class lists.
    pub fn set_class_labels(&mut self, labels: Vec<Vec<C>>) -> Result<()> {
        self.store.set_all_class_lists(&labels)?;
        self.refresh_labels_view();
        Ok(())
    }

    /// One-hot label matrix: row i, column j is true iff image i has class j.
    pub fn labels_one_hot(&self) -> &Array2<bool> {
        self.store.as_one_hot()
    }

    /// Replace the one-hot label matrix.
    pub fn set_labels_one_hot(&mut self, labels: Array2<bool>) -> Result<()> {
        self.store.set_all_one_hot(labels)?;
        self.refresh_labels_view();
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------------

    /// Call `f` with the image index and class whenever a class key is handled.
    pub fn on_label_assigned<F>(&mut self, f: F) -> SubscriptionId
    where
        F: FnMut(usize, &C) + 'static,
    {
        self.observers.on_label_assigned(f)
    }

    /// Call `f` with the new index and image whenever the current image changes.
    ///
    /// The presenter is redrawn after the callbacks run.
    pub fn on_image_changed<F>(&mut self, f: F) -> SubscriptionId
    where
        F: FnMut(usize, &I) + 'static,
    {
        self.observers.on_image_changed(f)
    }

    /// Remove a subscription. Returns false if it was already removed.
    pub fn unsubscribe(&mut self, subscription: SubscriptionId) -> bool {
        self.observers.unsubscribe(subscription)
    }

    // ------------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------------

    /// Handle one key press.
    ///
    /// Navigation keys move the current image, class keys assign (exclusive)
    /// or toggle (multiclass) a class on it. Unbound keys are ignored.
    pub fn handle_key(&mut self, key: &str) -> KeyOutcome {
        let Some(action) = self.bindings.action_for_key(key) else {
            log::trace!("Ignoring unbound key '{}'", key);
            return KeyOutcome::Ignored;
        };
        log::debug!("Key '{}' -> {:?}", key, action);

        match action {
            KeyAction::Previous => self.navigation_outcome(|labeller| labeller.previous_image()),
            KeyAction::Next => self.navigation_outcome(|labeller| labeller.next_image()),
            KeyAction::Class(class_index) => self
                .select_class(class_index)
                .unwrap_or(KeyOutcome::Ignored),
        }
    }

    /// Apply a class to the current image, as if its key had been pressed.
    ///
    /// This is also the entry point for multiclass toggle buttons. Returns
    /// `None` if `class_index` is out of range.
    pub fn select_class(&mut self, class_index: usize) -> Option<KeyOutcome> {
        let class = self.store.classes().get(class_index)?.clone();
        let index = self.navigator.index();

        match self.store.mode() {
            LabelMode::Multiclass => {
                let active = self.store.toggle(index, class_index)?;
                log::debug!(
                    "Image {}: class '{}' {}",
                    index,
                    class,
                    if active { "on" } else { "off" }
                );
                if let Some(states) = self.button_states() {
                    if let Some(presenter) = self.presenter.as_mut() {
                        presenter.set_button_states(&states);
                    }
                }
                self.observers.emit_label_assigned(index, &class);
                self.refresh_title();
                Some(KeyOutcome::Toggled {
                    index,
                    class_index,
                    active,
                })
            }
            LabelMode::Exclusive => {
                self.store.assign(index, class_index);
                log::debug!("Image {}: labelled '{}'", index, class);
                self.observers.emit_label_assigned(index, &class);

                let advanced = self.advances_on_label && !self.navigator.is_last();
                if advanced {
                    self.next_image();
                } else {
                    self.refresh_title();
                }
                Some(KeyOutcome::Labelled {
                    index,
                    class_index,
                    advanced,
                })
            }
        }
    }

    fn navigation_outcome(&mut self, step: impl FnOnce(&mut Self) -> bool) -> KeyOutcome {
        if step(self) {
            KeyOutcome::Navigated {
                index: self.navigator.index(),
            }
        } else {
            KeyOutcome::AtBoundary
        }
    }

    /// Redraw and notify after a navigation attempt that may have changed the index.
    fn after_navigation(&mut self, changed: Option<usize>) -> bool {
        let Some(index) = changed else {
            return false;
        };

        let title = self.title();
        let buttons = self.button_states();
        let image = self.images.get(index);
        if let Some(presenter) = self.presenter.as_mut() {
            presenter.show_image(index, &image);
            presenter.set_title(&title);
        }
        self.observers.emit_image_changed(index, &image);
        if let Some(presenter) = self.presenter.as_mut() {
            if let Some(states) = buttons {
                presenter.set_button_states(&states);
            }
            presenter.redraw();
        }
        true
    }

    fn button_states(&self) -> Option<Vec<bool>> {
        if !self.store.mode().is_multiclass() {
            return None;
        }
        self.store
            .row(self.navigator.index())
            .map(|row| row.to_vec())
    }

    fn refresh_title(&mut self) {
        let title = self.title();
        if let Some(presenter) = self.presenter.as_mut() {
            presenter.set_title(&title);
            presenter.redraw();
        }
    }

    fn refresh_labels_view(&mut self) {
        if let Some(states) = self.button_states() {
            if let Some(presenter) = self.presenter.as_mut() {
                presenter.set_button_states(&states);
            }
        }
        self.refresh_title();
    }
}

impl<I, C: std::fmt::Debug> std::fmt::Debug for ImageLabeller<I, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageLabeller")
            .field("images", &self.images)
            .field("store", &self.store)
            .field("navigator", &self.navigator)
            .field("bindings", &self.bindings)
            .field("advances_on_label", &self.advances_on_label)
            .field("observers", &self.observers)
            .field("presenter", &self.presenter.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keybindings::KeymapPreset;
    use crate::presenter::{PresenterCall, RecordingPresenter};
    use ndarray::array;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        ImageChanged(usize, u32),
        LabelAssigned(usize, String),
    }

    fn images(n: u32) -> ImageSource<u32> {
        ImageSource::from_vec((0..n).map(|i| i * 10).collect())
    }

    fn classes(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn s(value: &str) -> Option<String> {
        Some(value.to_string())
    }

    /// Subscribe to both events, recording them in order.
    fn record_events(labeller: &mut ImageLabeller<u32, String>) -> Rc<RefCell<Vec<Event>>> {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        labeller.on_image_changed(move |index, image| {
            sink.borrow_mut().push(Event::ImageChanged(index, *image))
        });
        let sink = Rc::clone(&events);
        labeller.on_label_assigned(move |index, class| {
            sink.borrow_mut()
                .push(Event::LabelAssigned(index, class.clone()))
        });
        events
    }

    #[test]
    fn test_function_source_without_count_fails() {
        let err = ImageLabeller::builder(ImageSource::from_fn(|i| i as u32), classes(&["a"]))
            .build()
            .unwrap_err();
        assert!(matches!(err, LabellerError::Config { .. }));

        let labeller =
            ImageLabeller::builder(ImageSource::from_fn(|i| i as u32).with_count(3), classes(&["a"]))
                .build()
                .unwrap();
        assert_eq!(labeller.image_count(), 3);
        assert_eq!(*labeller.current_image(), 0);
    }

    #[test]
    fn test_no_images_fails() {
        let err = ImageLabeller::builder(images(0), classes(&["a"]))
            .build()
            .unwrap_err();
        assert!(matches!(err, LabellerError::Config { .. }));
    }

    #[test]
    fn test_capacity_checked_at_construction() {
        let names: Vec<String> = (0..11).map(|i| format!("class{i}")).collect();
        let err = ImageLabeller::builder(images(2), names.clone())
            .build()
            .unwrap_err();
        assert!(matches!(err, LabellerError::Capacity { classes: 11, .. }));

        assert!(
            ImageLabeller::builder(images(2), names[..10].to_vec())
                .build()
                .is_ok()
        );
    }

    #[test]
    fn test_init_labels_length_checked() {
        let err = ImageLabeller::builder(images(5), classes(&["good", "bad"]))
            .init_labels(vec![None; 4])
            .build()
            .unwrap_err();
        assert_eq!(err, LabellerError::length_mismatch(5, 4));

        let init = vec![s("good"), None, s("bad"), None, s("bad")];
        let labeller = ImageLabeller::builder(images(5), classes(&["good", "bad"]))
            .init_labels(init.clone())
            .build()
            .unwrap();
        assert_eq!(labeller.labels(), init);
    }

    #[test]
    fn test_labels_round_trip_and_atomic_failure() {
        let mut labeller = ImageLabeller::builder(images(3), classes(&["good", "bad"]))
            .build()
            .unwrap();
        let labels = vec![s("bad"), s("good"), None];
        labeller.set_labels(labels.clone()).unwrap();
        assert_eq!(labeller.labels(), labels);

        assert!(matches!(
            labeller.set_labels(vec![None]),
            Err(LabellerError::LengthMismatch { .. })
        ));
        assert_eq!(labeller.labels(), labels);
        assert_eq!(
            labeller.labels_one_hot(),
            &array![[false, true], [true, false], [false, false]]
        );
    }

    #[test]
    fn test_advance_on_label_scenario() {
        let mut labeller = ImageLabeller::builder(images(5), classes(&["good", "bad"]))
            .build()
            .unwrap();
        let events = record_events(&mut labeller);

        let outcome = labeller.handle_key("2");
        assert_eq!(
            outcome,
            KeyOutcome::Labelled {
                index: 0,
                class_index: 1,
                advanced: true
            }
        );
        assert_eq!(labeller.label(0).map(String::as_str), Some("bad"));
        assert_eq!(labeller.image_index(), 1);
        assert_eq!(
            *events.borrow(),
            vec![
                Event::LabelAssigned(0, "bad".to_string()),
                Event::ImageChanged(1, 10)
            ]
        );

        labeller.set_image_index(4);
        events.borrow_mut().clear();
        let outcome = labeller.handle_key("2");
        assert_eq!(
            outcome,
            KeyOutcome::Labelled {
                index: 4,
                class_index: 1,
                advanced: false
            }
        );
        assert_eq!(labeller.label(4).map(String::as_str), Some("bad"));
        assert_eq!(labeller.image_index(), 4);
        assert_eq!(
            *events.borrow(),
            vec![Event::LabelAssigned(4, "bad".to_string())]
        );
    }

    #[test]
    fn test_last_image_label_only_refreshes_title() {
        let recorder = RecordingPresenter::new();
        let mut labeller = ImageLabeller::builder(images(2), classes(&["good", "bad"]))
            .presenter(Box::new(recorder.clone()))
            .build()
            .unwrap();
        labeller.set_image_index(1);
        recorder.take();

        labeller.handle_key("1");
        assert_eq!(
            recorder.calls(),
            vec![
                PresenterCall::Title("Image 1\nLabel: good".to_string()),
                PresenterCall::Redraw
            ]
        );
    }

    #[test]
    fn test_no_advance_keeps_index() {
        let mut labeller = ImageLabeller::builder(images(3), classes(&["good", "bad"]))
            .labelling_advances_image(false)
            .build()
            .unwrap();
        let events = record_events(&mut labeller);

        labeller.handle_key("1");
        labeller.handle_key("2");
        assert_eq!(labeller.image_index(), 0);
        assert_eq!(labeller.label(0).map(String::as_str), Some("bad"));
        assert_eq!(labeller.title(), "Image 0\nLabel: bad");
        assert_eq!(events.borrow().len(), 2);
    }

    #[test]
    fn test_multiclass_toggle_twice() {
        let recorder = RecordingPresenter::new();
        let mut labeller = ImageLabeller::builder(images(3), classes(&["cat", "dog", "bird"]))
            .multiclass(true)
            .presenter(Box::new(recorder.clone()))
            .build()
            .unwrap();
        assert!(!labeller.advances_on_label());
        let events = record_events(&mut labeller);

        assert_eq!(
            labeller.handle_key("2"),
            KeyOutcome::Toggled {
                index: 0,
                class_index: 1,
                active: true
            }
        );
        assert_eq!(recorder.last_buttons(), Some(vec![false, true, false]));
        assert_eq!(
            labeller.handle_key("2"),
            KeyOutcome::Toggled {
                index: 0,
                class_index: 1,
                active: false
            }
        );

        assert_eq!(labeller.image_index(), 0);
        assert!(labeller.labels_one_hot().row(0).iter().all(|flag| !flag));
        assert_eq!(recorder.last_buttons(), Some(vec![false, false, false]));
        assert_eq!(
            *events.borrow(),
            vec![
                Event::LabelAssigned(0, "dog".to_string()),
                Event::LabelAssigned(0, "dog".to_string())
            ]
        );
    }

    #[test]
    fn test_multiclass_keeps_several_classes() {
        let mut labeller = ImageLabeller::builder(images(2), classes(&["cat", "dog"]))
            .multiclass(true)
            .build()
            .unwrap();
        labeller.handle_key("1");
        labeller.handle_key("2");
        assert_eq!(
            labeller.class_labels(),
            vec![vec!["cat".to_string(), "dog".to_string()], vec![]]
        );
        assert_eq!(labeller.labels(), vec![None, None]);
        assert_eq!(labeller.title(), "Image 0");
    }

    #[test]
    fn test_multiclass_navigation_syncs_buttons() {
        let recorder = RecordingPresenter::new();
        let mut labeller = ImageLabeller::builder(images(2), classes(&["cat", "dog"]))
            .multiclass(true)
            .init_labels_one_hot(array![[false, false], [true, true]])
            .presenter(Box::new(recorder.clone()))
            .build()
            .unwrap();
        recorder.take();

        labeller.handle_key("right");
        assert_eq!(
            recorder.calls(),
            vec![
                PresenterCall::ShowImage(1),
                PresenterCall::Title("Image 1".to_string()),
                PresenterCall::Buttons(vec![true, true]),
                PresenterCall::Redraw
            ]
        );
    }

    #[test]
    fn test_navigation_keys_and_boundaries() {
        let mut labeller = ImageLabeller::builder(images(3), classes(&["a", "b"]))
            .build()
            .unwrap();
        let events = record_events(&mut labeller);

        assert_eq!(labeller.handle_key("left"), KeyOutcome::AtBoundary);
        assert_eq!(
            labeller.handle_key("right"),
            KeyOutcome::Navigated { index: 1 }
        );
        assert_eq!(
            labeller.handle_key("right"),
            KeyOutcome::Navigated { index: 2 }
        );
        assert_eq!(labeller.handle_key("right"), KeyOutcome::AtBoundary);
        assert_eq!(
            *events.borrow(),
            vec![Event::ImageChanged(1, 10), Event::ImageChanged(2, 20)]
        );
    }

    #[test]
    fn test_set_image_index_clamps_and_dedupes_events() {
        let mut labeller = ImageLabeller::builder(images(5), classes(&["a"]))
            .build()
            .unwrap();
        let events = record_events(&mut labeller);

        assert!(labeller.set_image_index(3));
        assert!(!labeller.set_image_index(3));
        assert!(labeller.set_image_index(99));
        assert_eq!(labeller.image_index(), 4);
        assert!(!labeller.set_image_index(10));
        assert!(labeller.set_image_index(-7));
        assert_eq!(labeller.image_index(), 0);
        assert!(!labeller.set_image_index(-1));

        assert_eq!(
            *events.borrow(),
            vec![
                Event::ImageChanged(3, 30),
                Event::ImageChanged(4, 40),
                Event::ImageChanged(0, 0)
            ]
        );
    }

    #[test]
    fn test_unknown_key_is_ignored() {
        let recorder = RecordingPresenter::new();
        let mut labeller = ImageLabeller::builder(images(2), classes(&["a", "b"]))
            .presenter(Box::new(recorder.clone()))
            .build()
            .unwrap();
        let events = record_events(&mut labeller);
        recorder.take();

        assert_eq!(labeller.handle_key("z"), KeyOutcome::Ignored);
        assert_eq!(labeller.handle_key("3"), KeyOutcome::Ignored);
        assert!(events.borrow().is_empty());
        assert!(recorder.calls().is_empty());
        assert_eq!(labeller.labels(), vec![None, None]);
    }

    #[test]
    fn test_short_explicit_keymap() {
        let mut labeller = ImageLabeller::builder(images(2), classes(&["good", "bad", "meh"]))
            .keymap(KeymapSpec::explicit(["a", "s"]))
            .labelling_advances_image(false)
            .build()
            .unwrap();
        assert_eq!(labeller.reserved_keys(), vec!["a", "s", "left", "right"]);
        assert_eq!(labeller.handle_key("d"), KeyOutcome::Ignored);
        assert_eq!(labeller.handle_key("s"), KeyOutcome::Labelled {
            index: 0,
            class_index: 1,
            advanced: false
        });

        // The third class is only reachable programmatically.
        assert!(labeller.select_class(2).is_some());
        assert_eq!(labeller.label(0).map(String::as_str), Some("meh"));
        assert_eq!(labeller.select_class(3), None);

        let legend = labeller.legend();
        assert_eq!(legend.classes.len(), 2);
        assert_eq!(legend.buttons[2], "[ ]\nmeh");
    }

    #[test]
    fn test_row_keymap_and_reserved_keys() {
        let labeller = ImageLabeller::builder(images(1), classes(&["a", "b"]))
            .keymap(KeymapSpec::Preset(KeymapPreset::Row))
            .build()
            .unwrap();
        assert!(labeller.is_reserved("q"));
        assert!(labeller.is_reserved("w"));
        assert!(!labeller.is_reserved("e"));
        assert!(labeller.is_reserved("right"));
    }

    #[test]
    fn test_custom_navigation_keys_are_reserved() {
        let navigation = NavigationKeys {
            previous: "p".to_string(),
            next: "q".to_string(),
        };
        let mut labeller = ImageLabeller::builder(images(3), classes(&["a", "b"]))
            .navigation(navigation)
            .build()
            .unwrap();
        assert!(labeller.is_reserved("q"));
        assert!(labeller.is_reserved("p"));
        assert!(!labeller.is_reserved("left"));
        assert_eq!(labeller.reserved_keys(), vec!["1", "2", "p", "q"]);
        assert_eq!(labeller.handle_key("q"), KeyOutcome::Navigated { index: 1 });
        assert_eq!(labeller.handle_key("p"), KeyOutcome::Navigated { index: 0 });
    }

    #[test]
    fn test_initial_view_and_legend() {
        let recorder = RecordingPresenter::new();
        let mut options = PresentationOptions::new();
        options.insert("aspect".to_string(), serde_json::json!("equal"));

        let labeller = ImageLabeller::builder(images(2), classes(&["good", "bad"]))
            .keymap(KeymapSpec::explicit(["a", "s"]))
            .presentation_options(options)
            .presenter(Box::new(recorder.clone()))
            .build()
            .unwrap();

        let calls = recorder.calls();
        assert_eq!(calls[0], PresenterCall::Configure(1));
        assert!(matches!(&calls[1], PresenterCall::Legend(legend)
            if legend.classes == vec![
                ("a".to_string(), "good".to_string()),
                ("s".to_string(), "bad".to_string())
            ]));
        assert_eq!(calls[2], PresenterCall::ShowImage(0));
        assert_eq!(calls[3], PresenterCall::Title("Image 0\nLabel: None".to_string()));
        assert_eq!(calls.last(), Some(&PresenterCall::Redraw));
        assert_eq!(
            labeller.presentation_options().get("aspect"),
            Some(&serde_json::json!("equal"))
        );
        assert_eq!(labeller.legend().navigation[0].0, "<-");
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let mut labeller = ImageLabeller::builder(images(3), classes(&["a"]))
            .build()
            .unwrap();
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);
        let id = labeller.on_image_changed(move |_, _| *sink.borrow_mut() += 1);

        labeller.next_image();
        assert!(labeller.unsubscribe(id));
        labeller.next_image();
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn test_exclusive_rejects_multi_class_init() {
        let err = ImageLabeller::builder(images(1), classes(&["a", "b"]))
            .init_class_labels(vec![vec!["a".to_string(), "b".to_string()]])
            .build()
            .unwrap_err();
        assert_eq!(err, LabellerError::MultipleLabels { index: 0 });
    }

    #[test]
    fn test_navigation_conflicting_with_keymap_fails() {
        let err = ImageLabeller::builder(images(1), classes(&["a", "b"]))
            .keymap(KeymapSpec::explicit(["left", "x"]))
            .build()
            .unwrap_err();
        assert!(matches!(err, LabellerError::Config { .. }));
    }
}
