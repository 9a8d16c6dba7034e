use jamo_core::settings::{settings, Settings};

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub max_characters: usize,
}

impl SessionConfig {
    pub fn from_settings(s: &Settings) -> Self {
        Self {
            max_characters: s.limits.max_characters,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from_settings(settings())
    }
}

/// Receives change notifications from an `InputSession`.
///
/// Both methods may fire for the same operation; buffer first.
pub trait SessionObserver {
    fn buffer_changed(&mut self, _buffer: &str) {}
    fn composing_changed(&mut self, _composing: &str) {}
}

/// What a session operation changed, for the host text field to mirror.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditResponse {
    pub consumed: bool,
    /// Text appended to the committed buffer.
    pub commit: Option<String>,
    /// Number of characters removed from the end of the buffer.
    pub deleted: usize,
    /// New composing text, present only when it changed.
    pub composing: Option<String>,
}

impl EditResponse {
    pub(crate) fn ignored() -> Self {
        Self::default()
    }

    pub fn buffer_changed(&self) -> bool {
        self.commit.is_some() || self.deleted > 0
    }

    pub fn composing_changed(&self) -> bool {
        self.composing.is_some()
    }

    pub fn changed(&self) -> bool {
        self.buffer_changed() || self.composing_changed()
    }
}
