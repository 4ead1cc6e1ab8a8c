//! Presentation adapter seam.
//!
//! The labeller drives a [`Presenter`] but never depends on how it draws.
//! Adapters receive the current image, the title text, the keybinding legend
//! and, in multiclass mode, the state of one toggle button per class. Every
//! state change is followed by a call to [`Presenter::redraw`].
//!
//! Adapters that forward raw key presses must not let class or navigation
//! keys reach their own default bindings (see
//! `ImageLabeller::is_reserved`).

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Presentation options, opaque to the labeller and forwarded to the presenter.
pub type PresentationOptions = serde_json::Map<String, serde_json::Value>;

/// Keybinding legend shown next to the image.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Legend {
    /// Navigation entries as (key, description)
    pub navigation: Vec<(String, String)>,
    /// Class entries as (key, class) in class order; classes without a key are omitted
    pub classes: Vec<(String, String)>,
    /// Button captions, one per class, in class order
    pub buttons: Vec<String>,
}

impl fmt::Display for Legend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Keybindings")?;
        for (key, action) in &self.navigation {
            writeln!(f, "{} : {}", key, action)?;
        }
        writeln!(f)?;
        writeln!(f, "Class Keybindings:")?;
        for (key, class) in &self.classes {
            writeln!(f, "{} : {}", key, class)?;
        }
        Ok(())
    }
}

/// Rendering side of the labeller. All methods default to doing nothing.
pub trait Presenter<I> {
    /// Receive the presentation options given at construction.
    fn configure(&mut self, _options: &PresentationOptions) {}

    /// Display the image at `index`.
    fn show_image(&mut self, _index: usize, _image: &I) {}

    /// Replace the title text.
    fn set_title(&mut self, _title: &str) {}

    /// Replace the keybinding legend.
    fn set_legend(&mut self, _legend: &Legend) {}

    /// Update the per-class toggle buttons (multiclass mode only).
    fn set_button_states(&mut self, _states: &[bool]) {}

    /// Flush pending changes to the screen.
    fn redraw(&mut self) {}
}

/// A call received by a [`RecordingPresenter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenterCall {
    /// `configure` with the number of options
    Configure(usize),
    /// `show_image` with the image index
    ShowImage(usize),
    /// `set_title`
    Title(String),
    /// `set_legend`
    Legend(Legend),
    /// `set_button_states`
    Buttons(Vec<bool>),
    /// `redraw`
    Redraw,
}

/// Presenter that records every call, for headless use and tests.
///
/// Clones share the same log, so a clone can be kept for inspection after
/// the presenter itself is handed to a labeller.
#[derive(Debug, Clone, Default)]
pub struct RecordingPresenter {
    calls: Rc<RefCell<Vec<PresenterCall>>>,
}

impl RecordingPresenter {
    /// Create a presenter with an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// All calls so far.
    pub fn calls(&self) -> Vec<PresenterCall> {
        self.calls.borrow().clone()
    }

    /// Remove and return all calls so far.
    pub fn take(&self) -> Vec<PresenterCall> {
        std::mem::take(&mut *self.calls.borrow_mut())
    }

    /// The most recent title, if any.
    pub fn last_title(&self) -> Option<String> {
        self.calls.borrow().iter().rev().find_map(|call| match call {
            PresenterCall::Title(title) => Some(title.clone()),
            _ => None,
        })
    }

    /// The most recent button states, if any.
    pub fn last_buttons(&self) -> Option<Vec<bool>> {
        self.calls.borrow().iter().rev().find_map(|call| match call {
            PresenterCall::Buttons(states) => Some(states.clone()),
            _ => None,
        })
    }

    fn push(&self, call: PresenterCall) {
        self.calls.borrow_mut().push(call);
    }
}

impl<I> Presenter<I> for RecordingPresenter {
    fn configure(&mut self, options: &PresentationOptions) {
        self.push(PresenterCall::Configure(options.len()));
    }

    fn show_image(&mut self, index: usize, _image: &I) {
        self.push(PresenterCall::ShowImage(index));
    }

    fn set_title(&mut self, title: &str) {
        self.push(PresenterCall::Title(title.to_string()));
    }

    fn set_legend(&mut self, legend: &Legend) {
        self.push(PresenterCall::Legend(legend.clone()));
    }

    fn set_button_states(&mut self, states: &[bool]) {
        self.push(PresenterCall::Buttons(states.to_vec()));
    }

    fn redraw(&mut self) {
        self.push(PresenterCall::Redraw);
    }
}
