use std::fmt;
use std::io;

pub mod compose_ops;
pub mod config_ops;
pub mod service_ops;

macro_rules! die {
    ($result:expr, $($arg:tt)*) => {
        $result.unwrap_or_else(|e| {
            eprintln!($($arg)*, e);
            std::process::exit(1);
        })
    };
}
pub(crate) use die;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{path}: {source}")]
    Io { path: String, source: io::Error },
    #[error(transparent)]
    Settings(#[from] jamo_engine::jamo_core::settings::SettingsError),
    #[error(transparent)]
    Service(#[from] jamo_engine::ServiceError),
    #[error("no response within {0}s")]
    NoResponse(u64),
}

/// Print `value` as pretty JSON, or through its `Display` impl.
pub(crate) fn emit<T: serde::Serialize + fmt::Display>(value: &T, json: bool) {
    if json {
        let out = die!(serde_json::to_string_pretty(value), "Error: {}");
        println!("{out}");
    } else {
        println!("{value}");
    }
}
