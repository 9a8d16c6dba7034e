const SETTINGS_PATH: &str = "src/default_settings.toml";
const REQUIRED_SECTIONS: &[&str] = &["limits", "network"];

fn main() {
    println!("cargo:rerun-if-changed={SETTINGS_PATH}");
    check_settings(include_str!("src/default_settings.toml"));
}

fn check_settings(content: &str) {
    let value = match content.parse::<toml::Table>() {
        Ok(v) => v,
        Err(e) => panic!("{SETTINGS_PATH} contains invalid TOML: {e}"),
    };
    for section in REQUIRED_SECTIONS {
        if !value.get(*section).is_some_and(toml::Value::is_table) {
            panic!("{SETTINGS_PATH} is missing the [{section}] table");
        }
    }
}
