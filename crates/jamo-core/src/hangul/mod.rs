//! Hangul syllable composition from individual jamo keystrokes.
//!
//! `algebra` holds the static jamo tables and the code point arithmetic;
//! `composer` drives the per-syllable state machine on top of it.

pub mod algebra;
mod composer;

pub use algebra::{compose, decompose, decompose_text, JamoKind};
pub use composer::{CompositionState, HangulComposer, Step};
