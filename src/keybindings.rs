//! Keybindings for navigation and class assignment.
//!
//! Class keys come from a [`KeymapSpec`]: either a named preset (number row
//! or top letter row) or an explicit list of key tokens assigned to classes in
//! order. Navigation keys are a separate pair that must not overlap the class
//! keys.

use serde::{Deserialize, Serialize};

use crate::error::{LabellerError, Result};

/// Keys of the `digits` preset: 1-9 then 0 for the tenth class.
pub const DIGIT_KEYS: [&str; 10] = ["1", "2", "3", "4", "5", "6", "7", "8", "9", "0"];

/// Keys of the `row` preset: the QWERTY top letter row.
pub const ROW_KEYS: [&str; 10] = ["q", "w", "e", "r", "t", "y", "u", "i", "o", "p"];

/// Named keymap presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeymapPreset {
    /// Number keys 1, 2, ..., 9, 0
    #[serde(rename = "digits", alias = "1234")]
    Digits,
    /// QWERTY top row q, w, ..., p
    #[serde(rename = "row", alias = "qwerty")]
    Row,
}

impl KeymapPreset {
    /// Get the display name for this preset.
    pub fn name(&self) -> &'static str {
        match self {
            KeymapPreset::Digits => "digits",
            KeymapPreset::Row => "row",
        }
    }

    /// Keys in assignment order.
    pub fn keys(&self) -> &'static [&'static str] {
        match self {
            KeymapPreset::Digits => &DIGIT_KEYS,
            KeymapPreset::Row => &ROW_KEYS,
        }
    }
}

/// How class keys should be chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeymapSpec {
    /// One of the built-in presets
    Preset(KeymapPreset),
    /// Explicit tokens, assigned to classes in order
    Explicit(Vec<String>),
}

impl Default for KeymapSpec {
    fn default() -> Self {
        KeymapSpec::Preset(KeymapPreset::Digits)
    }
}

impl KeymapSpec {
    /// Build an explicit keymap from anything string-like.
    pub fn explicit<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        KeymapSpec::Explicit(keys.into_iter().map(Into::into).collect())
    }
}

/// Resolved mapping from key token to class index.
///
/// Entries are kept in class order so legends list classes the way they
/// were declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keymap {
    entries: Vec<(String, usize)>,
}

impl Keymap {
    /// Resolve a keymap spec for `class_count` classes.
    ///
    /// Presets fail with [`LabellerError::Capacity`] when there are more classes
    /// than keys. An explicit list shorter than the class count leaves the
    /// remaining classes without a key; keys beyond the class count are
    /// dropped unchecked. Empty or repeated keys among the used ones fail
    /// with [`LabellerError::Config`].
    pub fn resolve(spec: &KeymapSpec, class_count: usize) -> Result<Self> {
        let entries = match spec {
            KeymapSpec::Preset(preset) => {
                let keys = preset.keys();
                if class_count > keys.len() {
                    return Err(LabellerError::Capacity {
                        classes: class_count,
                        capacity: keys.len(),
                        keymap: preset.name().to_string(),
                    });
                }
                keys.iter()
                    .take(class_count)
                    .enumerate()
                    .map(|(index, key)| (key.to_string(), index))
                    .collect::<Vec<_>>()
            }
            KeymapSpec::Explicit(keys) => {
                // Extra keys beyond the class count would point at no class.
                let used = &keys[..keys.len().min(class_count)];
                for (i, key) in used.iter().enumerate() {
                    if key.is_empty() {
                        return Err(LabellerError::config("keymap contains an empty key"));
                    }
                    if used[..i].contains(key) {
                        return Err(LabellerError::config(format!(
                            "key '{}' is bound to more than one class",
                            key
                        )));
                    }
                }
                if keys.len() < class_count {
                    log::warn!(
                        "Keymap has {} keys for {} classes, the last {} classes have no key",
                        keys.len(),
                        class_count,
                        class_count - keys.len()
                    );
                }
                used.iter()
                    .enumerate()
                    .map(|(index, key)| (key.clone(), index))
                    .collect()
            }
        };

        Ok(Self { entries })
    }

    /// Get the class index (0-based) that corresponds to a key press, if any.
    pub fn class_index_for_key(&self, key: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, index)| *index)
    }

    /// Get the key bound to a class index, if any.
    pub fn key_for_class_index(&self, index: usize) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, i)| *i == index)
            .map(|(k, _)| k.as_str())
    }

    /// Iterate over (key, class index) pairs in class order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> + '_ {
        self.entries.iter().map(|(k, i)| (k.as_str(), *i))
    }

    /// Keys reserved by this keymap.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Check whether a key is bound to a class.
    pub fn contains_key(&self, key: &str) -> bool {
        self.class_index_for_key(key).is_some()
    }

    /// Number of bound keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether no key is bound.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Keys that move between images.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationKeys {
    /// Key for the previous image
    #[serde(default = "default_previous_key")]
    pub previous: String,
    /// Key for the next image
    #[serde(default = "default_next_key")]
    pub next: String,
}

fn default_previous_key() -> String {
    "left".to_string()
}

fn default_next_key() -> String {
    "right".to_string()
}

impl Default for NavigationKeys {
    fn default() -> Self {
        Self {
            previous: default_previous_key(),
            next: default_next_key(),
        }
    }
}

/// What a key press resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Go to the previous image
    Previous,
    /// Go to the next image
    Next,
    /// Assign or toggle the class at this index
    Class(usize),
}

/// Complete keybinding configuration: navigation plus class keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBindings {
    /// Navigation key pair
    pub navigation: NavigationKeys,
    /// Class keymap
    pub keymap: Keymap,
}

impl KeyBindings {
    /// Combine navigation keys with a class keymap, rejecting overlaps.
    pub fn new(navigation: NavigationKeys, keymap: Keymap) -> Result<Self> {
        if navigation.previous == navigation.next {
            return Err(LabellerError::config(format!(
                "previous and next image share the key '{}'",
                navigation.next
            )));
        }
        if let Some(conflict) = [&navigation.previous, &navigation.next]
            .into_iter()
            .find(|key| keymap.contains_key(key.as_str()))
        {
            return Err(LabellerError::config(format!(
                "key '{}' is used for both navigation and a class",
                conflict
            )));
        }
        Ok(Self { navigation, keymap })
    }

    /// Get the action that corresponds to a key press, if any.
    pub fn action_for_key(&self, key: &str) -> Option<KeyAction> {
        if key == self.navigation.previous {
            Some(KeyAction::Previous)
        } else if key == self.navigation.next {
            Some(KeyAction::Next)
        } else {
            self.keymap.class_index_for_key(key).map(KeyAction::Class)
        }
    }
}

/// Convert a key token to its legend form.
pub fn key_to_string(key: &str) -> &str {
    match key {
        "left" => "<-",
        "right" => "->",
        "up" => "^",
        "down" => "v",
        " " | "space" => "Space",
        other => other,
    }
}
