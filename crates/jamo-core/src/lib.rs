//! Core algorithms for Korean text input: jamo-to-syllable composition,
//! response caching, and engine settings.

pub mod cache;
pub mod hangul;
pub mod settings;
pub mod unicode;
