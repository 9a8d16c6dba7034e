//! Character-level Unicode classification for Korean text.

use crate::hangul::algebra::{SYLLABLE_BASE, SYLLABLE_LAST};

/// Precomposed syllable block (U+AC00..U+D7A3).
pub fn is_hangul_syllable(c: char) -> bool {
    (SYLLABLE_BASE..=SYLLABLE_LAST).contains(&(c as u32))
}

/// Hangul Compatibility Jamo block (U+3131..U+318E), the code points
/// keyboards emit for individual letters.
pub fn is_compatibility_jamo(c: char) -> bool {
    ('\u{3131}'..='\u{318E}').contains(&c)
}
