//! Image Labeller - keyboard-driven image classification
//!
//! Page through a sequence of images and assign each one a class (or, in
//! multiclass mode, a set of classes) with single key presses.
//!
//! ```
//! use image_labeller::{ImageLabeller, ImageSource, KeyOutcome, KeymapSpec};
//!
//! let images = ImageSource::from_vec(vec![[0u8; 4]; 5]);
//! let mut labeller = ImageLabeller::builder(images, vec!["good", "bad", "meh"])
//!     .keymap(KeymapSpec::explicit(["a", "s", "d"]))
//!     .build()?;
//!
//! labeller.on_label_assigned(|index, class| println!("image {index}: {class}"));
//! assert!(matches!(labeller.handle_key("s"), KeyOutcome::Labelled { advanced: true, .. }));
//! assert_eq!(labeller.image_index(), 1);
//! assert_eq!(labeller.labels()[0], Some("bad"));
//! # Ok::<(), image_labeller::LabellerError>(())
//! ```

mod config;
mod error;
mod events;
mod folder;
mod keybindings;
mod labeller;
mod model;
mod presenter;
mod source;
mod state;
mod terminal;
mod test_image;

pub use config::{CONFIG_VERSION, ConfigFileError, LabellerConfig, LogLevel};
pub use error::{LabellerError, Result};
pub use events::{EventKind, Observers, SubscriptionId};
pub use folder::{IMAGE_EXTENSIONS, folder_source, is_image_file, list_images, load_grayscale};
pub use keybindings::{
    DIGIT_KEYS, KeyAction, KeyBindings, Keymap, KeymapPreset, KeymapSpec, NavigationKeys,
    ROW_KEYS, key_to_string,
};
pub use labeller::{ImageLabeller, KeyOutcome, LabellerBuilder};
pub use model::{ClassId, ClassSet};
pub use presenter::{Legend, PresentationOptions, Presenter, PresenterCall, RecordingPresenter};
pub use source::{ImageFn, ImageSource};
pub use state::{LabelMode, LabelStore, Navigator};
pub use terminal::{DEFAULT_COLUMNS, DEFAULT_SHADES, TerminalPresenter, render_ascii};
pub use test_image::{PATTERN_COUNT, generate_test_image, generate_test_images};
