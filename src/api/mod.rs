//! Host-facing facade: one editing session wired to the assist pipelines.

mod assistant;


pub use assistant::{Assistant, AssistantConfig};

/// Which assist feature, if any, receives the session's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssistMode {
    #[default]
    Off,
    Translate,
    Correct,
}
