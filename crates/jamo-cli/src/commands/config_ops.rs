use std::fs;

use jamo_engine::jamo_core::settings::{self, parse_settings_toml, Settings};

use super::{die, CliError};

pub fn settings_export() {
    print!("{}", settings::default_toml());
}

pub fn load_settings_file(file: &str) -> Result<Settings, CliError> {
    let content = fs::read_to_string(file).map_err(|source| CliError::Io {
        path: file.to_string(),
        source,
    })?;
    Ok(parse_settings_toml(&content)?)
}

pub fn settings_validate(file: &str) {
    let s = die!(load_settings_file(file), "Error: {}");
    println!(
        "OK: limits.max_characters={}, limits.debounce_ms={}, limits.cache_max_items={}, network.base_url={}",
        s.limits.max_characters, s.limits.debounce_ms, s.limits.cache_max_items, s.network.base_url
    );
}
