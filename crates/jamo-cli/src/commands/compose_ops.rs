use std::fmt;

use serde::Serialize;

use jamo_engine::jamo_core::hangul::{algebra, decompose, decompose_text};
use jamo_engine::jamo_core::unicode::is_compatibility_jamo;
use jamo_engine::jamo_session::{InputSession, SessionConfig};

use super::emit;

/// Key that replays as backspace in a key script.
pub const BACKSPACE_KEY: char = '<';

#[derive(Debug, Serialize)]
pub struct ComposeReport {
    pub buffer: String,
    pub composing: String,
    pub full_text: String,
    pub length: usize,
    pub remaining: usize,
    pub state: String,
}

impl fmt::Display for ComposeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "buffer:    {:?}", self.buffer)?;
        writeln!(f, "composing: {:?} ({})", self.composing, self.state)?;
        writeln!(f, "full text: {:?}", self.full_text)?;
        write!(f, "length:    {} ({} remaining)", self.length, self.remaining)
    }
}

/// Feed a key script through a fresh session. `<` is backspace, space and
/// newline are separators, compatibility jamo are Hangul keys and anything
/// else is a literal.
pub fn replay(keys: &str, max_characters: usize) -> InputSession {
    let mut session = InputSession::new(SessionConfig { max_characters });
    for key in keys.chars() {
        match key {
            BACKSPACE_KEY => session.handle_backspace(),
            ' ' => session.handle_space(),
            '\n' => session.handle_newline(),
            k => session.handle_key(k, is_compatibility_jamo(k)),
        };
    }
    session
}

pub fn report(session: &InputSession) -> ComposeReport {
    ComposeReport {
        buffer: session.buffer().to_string(),
        composing: session.composing_text(),
        full_text: session.full_text(),
        length: session.length(),
        remaining: session.remaining(),
        state: format!("{:?}", session.composition_state()),
    }
}

pub fn compose(keys: &str, max_characters: usize, json: bool) {
    let session = replay(keys, max_characters);
    emit(&report(&session), json);
}

#[derive(Debug, Serialize)]
pub struct SyllableParts {
    pub syllable: char,
    pub initial: char,
    pub vowel: char,
    #[serde(rename = "final")]
    pub final_: Option<char>,
}

#[derive(Debug, Serialize)]
pub struct DecomposeReport {
    pub text: String,
    pub jamo: String,
    pub syllables: Vec<SyllableParts>,
}

impl fmt::Display for DecomposeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for s in &self.syllables {
            let final_ = s.final_.map(String::from).unwrap_or_else(|| "-".into());
            writeln!(f, "{}  {} {} {}", s.syllable, s.initial, s.vowel, final_)?;
        }
        write!(f, "{}", self.jamo)
    }
}

pub fn decompose_report(text: &str) -> DecomposeReport {
    let syllables = text
        .chars()
        .filter_map(|c| {
            let (i, v, f) = decompose(c)?;
            Some(SyllableParts {
                syllable: c,
                initial: algebra::initial_jamo(i),
                vowel: algebra::vowel_jamo(v),
                final_: algebra::final_jamo(f),
            })
        })
        .collect();
    DecomposeReport {
        text: text.to_string(),
        jamo: decompose_text(text),
        syllables,
    }
}

pub fn decompose_cmd(text: &str, json: bool) {
    emit(&decompose_report(text), json);
}
