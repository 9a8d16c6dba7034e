//! Unicode algebraic syllable construction.
//!
//! A precomposed syllable is `0xAC00 + (initial * 21 + vowel) * 28 + final`.
//! Jamo are exchanged with callers as Hangul Compatibility Jamo
//! (U+3131..U+318E), which is what on-screen keyboards emit.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::unicode::is_hangul_syllable;

pub const SYLLABLE_BASE: u32 = 0xAC00;
pub const SYLLABLE_LAST: u32 = 0xD7A3;
pub const INITIAL_COUNT: u8 = 19;
pub const VOWEL_COUNT: u8 = 21;
pub const FINAL_COUNT: u8 = 28;

/// Index of "no final consonant".
pub const NO_FINAL: u8 = 0;

pub const INITIALS: [char; INITIAL_COUNT as usize] = [
    'ㄱ', 'ㄲ', 'ㄴ', 'ㄷ', 'ㄸ', 'ㄹ', 'ㅁ', 'ㅂ', 'ㅃ', 'ㅅ', 'ㅆ', 'ㅇ', 'ㅈ', 'ㅉ', 'ㅊ', 'ㅋ',
    'ㅌ', 'ㅍ', 'ㅎ',
];

pub const VOWELS: [char; VOWEL_COUNT as usize] = [
    'ㅏ', 'ㅐ', 'ㅑ', 'ㅒ', 'ㅓ', 'ㅔ', 'ㅕ', 'ㅖ', 'ㅗ', 'ㅘ', 'ㅙ', 'ㅚ', 'ㅛ', 'ㅜ', 'ㅝ', 'ㅞ',
    'ㅟ', 'ㅠ', 'ㅡ', 'ㅢ', 'ㅣ',
];

/// Slot 0 is unused (`NO_FINAL`).
pub const FINALS: [Option<char>; FINAL_COUNT as usize] = [
    None,
    Some('ㄱ'),
    Some('ㄲ'),
    Some('ㄳ'),
    Some('ㄴ'),
    Some('ㄵ'),
    Some('ㄶ'),
    Some('ㄷ'),
    Some('ㄹ'),
    Some('ㄺ'),
    Some('ㄻ'),
    Some('ㄼ'),
    Some('ㄽ'),
    Some('ㄾ'),
    Some('ㄿ'),
    Some('ㅀ'),
    Some('ㅁ'),
    Some('ㅂ'),
    Some('ㅄ'),
    Some('ㅅ'),
    Some('ㅆ'),
    Some('ㅇ'),
    Some('ㅈ'),
    Some('ㅊ'),
    Some('ㅋ'),
    Some('ㅌ'),
    Some('ㅍ'),
    Some('ㅎ'),
];

/// (first vowel, second vowel) → compound vowel, all as vowel indices.
const COMPOUND_VOWELS: [(u8, u8, u8); 7] = [
    (8, 0, 9),    // ㅗ+ㅏ → ㅘ
    (8, 1, 10),   // ㅗ+ㅐ → ㅙ
    (8, 20, 11),  // ㅗ+ㅣ → ㅚ
    (13, 4, 14),  // ㅜ+ㅓ → ㅝ
    (13, 5, 15),  // ㅜ+ㅔ → ㅞ
    (13, 20, 16), // ㅜ+ㅣ → ㅟ
    (18, 20, 19), // ㅡ+ㅣ → ㅢ
];

/// (first final, second final) → compound final, all as final indices.
const COMPOUND_FINALS: [(u8, u8, u8); 11] = [
    (1, 19, 3),   // ㄱ+ㅅ → ㄳ
    (4, 22, 5),   // ㄴ+ㅈ → ㄵ
    (4, 27, 6),   // ㄴ+ㅎ → ㄶ
    (8, 1, 9),    // ㄹ+ㄱ → ㄺ
    (8, 16, 10),  // ㄹ+ㅁ → ㄻ
    (8, 17, 11),  // ㄹ+ㅂ → ㄼ
    (8, 19, 12),  // ㄹ+ㅅ → ㄽ
    (8, 25, 13),  // ㄹ+ㅌ → ㄾ
    (8, 26, 14),  // ㄹ+ㅍ → ㄿ
    (8, 27, 15),  // ㄹ+ㅎ → ㅀ
    (17, 19, 18), // ㅂ+ㅅ → ㅄ
];

/// Simple final index → initial index it becomes when a vowel follows.
const FINAL_TO_INITIAL: [(u8, u8); 16] = [
    (1, 0),
    (2, 1),
    (4, 2),
    (7, 3),
    (8, 5),
    (16, 6),
    (17, 7),
    (19, 9),
    (20, 10),
    (21, 11),
    (22, 12),
    (23, 14),
    (24, 15),
    (25, 16),
    (26, 17),
    (27, 18),
];

/// Classification of a single keyboard character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JamoKind {
    /// A consonant that can open a syllable, with its initial index.
    Consonant(u8),
    /// A vowel with its vowel index.
    Vowel(u8),
    Other,
}

struct JamoTables {
    initial: HashMap<char, u8>,
    vowel: HashMap<char, u8>,
    final_: HashMap<char, u8>,
    compound_vowel: HashMap<(u8, u8), u8>,
    split_vowel: HashMap<u8, (u8, u8)>,
    compound_final: HashMap<(u8, u8), u8>,
    split_final: HashMap<u8, (u8, u8)>,
    final_to_initial: HashMap<u8, u8>,
}

impl JamoTables {
    fn global() -> &'static JamoTables {
        static INSTANCE: OnceLock<JamoTables> = OnceLock::new();
        INSTANCE.get_or_init(|| {
            let initial = INITIALS
                .iter()
                .enumerate()
                .map(|(i, &c)| (c, i as u8))
                .collect();
            let vowel = VOWELS
                .iter()
                .enumerate()
                .map(|(i, &c)| (c, i as u8))
                .collect();
            let final_ = FINALS
                .iter()
                .enumerate()
                .filter_map(|(i, c)| c.map(|c| (c, i as u8)))
                .collect();
            JamoTables {
                initial,
                vowel,
                final_,
                compound_vowel: COMPOUND_VOWELS
                    .iter()
                    .map(|&(a, b, c)| ((a, b), c))
                    .collect(),
                split_vowel: COMPOUND_VOWELS
                    .iter()
                    .map(|&(a, b, c)| (c, (a, b)))
                    .collect(),
                compound_final: COMPOUND_FINALS
                    .iter()
                    .map(|&(a, b, c)| ((a, b), c))
                    .collect(),
                split_final: COMPOUND_FINALS
                    .iter()
                    .map(|&(a, b, c)| (c, (a, b)))
                    .collect(),
                final_to_initial: FINAL_TO_INITIAL.iter().copied().collect(),
            }
        })
    }
}

/// Compose an (initial, vowel, final) index triple into a precomposed syllable.
///
/// Indices outside their tables are a programming error; the composer never
/// produces them.
pub fn compose(initial: u8, vowel: u8, final_: u8) -> char {
    assert!(
        initial < INITIAL_COUNT && vowel < VOWEL_COUNT && final_ < FINAL_COUNT,
        "jamo index out of range: ({initial}, {vowel}, {final_})"
    );
    let code = SYLLABLE_BASE
        + (initial as u32 * VOWEL_COUNT as u32 + vowel as u32) * FINAL_COUNT as u32
        + final_ as u32;
    // Every in-range triple lands inside U+AC00..=U+D7A3.
    char::from_u32(code).unwrap_or('\u{FFFD}')
}

/// Inverse of [`compose`]. Returns `None` outside the precomposed block.
pub fn decompose(syllable: char) -> Option<(u8, u8, u8)> {
    if !is_hangul_syllable(syllable) {
        return None;
    }
    let offset = syllable as u32 - SYLLABLE_BASE;
    let final_ = offset % FINAL_COUNT as u32;
    let vowel = (offset / FINAL_COUNT as u32) % VOWEL_COUNT as u32;
    let initial = offset / (FINAL_COUNT as u32 * VOWEL_COUNT as u32);
    Some((initial as u8, vowel as u8, final_ as u8))
}

pub fn classify(c: char) -> JamoKind {
    let t = JamoTables::global();
    if let Some(&i) = t.initial.get(&c) {
        JamoKind::Consonant(i)
    } else if let Some(&v) = t.vowel.get(&c) {
        JamoKind::Vowel(v)
    } else {
        JamoKind::Other
    }
}

pub fn initial_index(c: char) -> Option<u8> {
    JamoTables::global().initial.get(&c).copied()
}

pub fn vowel_index(c: char) -> Option<u8> {
    JamoTables::global().vowel.get(&c).copied()
}

/// Final index for a jamo that may close a syllable. ㄸ, ㅃ and ㅉ never can.
pub fn final_index(c: char) -> Option<u8> {
    JamoTables::global().final_.get(&c).copied()
}

pub fn initial_jamo(index: u8) -> char {
    INITIALS[index as usize]
}

pub fn vowel_jamo(index: u8) -> char {
    VOWELS[index as usize]
}

pub fn final_jamo(index: u8) -> Option<char> {
    FINALS.get(index as usize).copied().flatten()
}

pub fn compound_vowel(first: u8, second: u8) -> Option<u8> {
    JamoTables::global()
        .compound_vowel
        .get(&(first, second))
        .copied()
}

pub fn split_vowel(compound: u8) -> Option<(u8, u8)> {
    JamoTables::global().split_vowel.get(&compound).copied()
}

pub fn compound_final(first: u8, second: u8) -> Option<u8> {
    JamoTables::global()
        .compound_final
        .get(&(first, second))
        .copied()
}

pub fn split_final(compound: u8) -> Option<(u8, u8)> {
    JamoTables::global().split_final.get(&compound).copied()
}

pub fn final_to_initial(final_: u8) -> Option<u8> {
    JamoTables::global().final_to_initial.get(&final_).copied()
}

/// Expand precomposed syllables into compatibility jamo.
///
/// Compound finals are written as their two members; compound vowels stay a
/// single jamo since they are typed as one visual unit. Everything else is
/// passed through unchanged.
pub fn decompose_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 3);
    for c in text.chars() {
        let Some((i, v, f)) = decompose(c) else {
            out.push(c);
            continue;
        };
        out.push(initial_jamo(i));
        out.push(vowel_jamo(v));
        match split_final(f) {
            Some((f1, f2)) => {
                out.extend(final_jamo(f1));
                out.extend(final_jamo(f2));
            }
            None => out.extend(final_jamo(f)),
        }
    }
    out
}
