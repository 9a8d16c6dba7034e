use std::time::Duration;

use clap::{Parser, Subcommand};

use jamo_cli::commands::service_ops::OneShot;
use jamo_cli::commands::{compose_ops, config_ops, service_ops};
use jamo_engine::jamo_core::settings::settings;

#[derive(Parser)]
#[command(name = "jamotool", about = "Jamo input and assist diagnostics")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replay a key script through an input session ('<' = backspace)
    Compose {
        /// Keys to type, e.g. "ㅎㅏㄴㄱㅡㄹ"
        keys: String,
        /// Character limit (default: limits.max_characters)
        #[arg(long)]
        max_chars: Option<usize>,
        /// Output as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Split precomposed syllables into jamo
    Decompose {
        text: String,
        /// Output as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Translate text once against the service
    Translate {
        text: String,
        #[arg(long, default_value = "ko")]
        from: String,
        #[arg(long, default_value = "en")]
        to: String,
        #[command(flatten)]
        service: ServiceArgs,
    },
    /// Correct text once against the service
    Correct {
        text: String,
        #[arg(long, default_value = "ko")]
        language: String,
        #[arg(long, default_value = "neutral")]
        tone: String,
        #[command(flatten)]
        service: ServiceArgs,
    },
    /// Export default settings as TOML
    SettingsExport,
    /// Validate a custom settings TOML file
    SettingsValidate {
        /// Path to the TOML file
        file: String,
    },
}

#[derive(clap::Args)]
struct ServiceArgs {
    /// Service base URL (default: network.base_url)
    #[arg(long)]
    base_url: Option<String>,
    /// Request timeout in seconds (default: network.timeout_secs)
    #[arg(long)]
    timeout: Option<u64>,
    #[arg(long, default_value = "jamotool")]
    device_id: String,
}

impl ServiceArgs {
    fn into_one_shot(self) -> OneShot {
        let net = &settings().network;
        OneShot {
            base_url: self.base_url.unwrap_or_else(|| net.base_url.clone()),
            translate_path: net.translate_path.clone(),
            correct_path: net.correct_path.clone(),
            timeout: self
                .timeout
                .map(Duration::from_secs)
                .unwrap_or_else(|| net.timeout()),
            max_retries: net.max_retries,
            tier: net.tier.clone(),
            device_id: self.device_id,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    // No-op unless built with `--features trace`
    jamo_engine::trace_init::init_tracing(&std::env::temp_dir());

    match cli.command {
        Command::Compose {
            keys,
            max_chars,
            json,
        } => {
            let max = max_chars.unwrap_or(settings().limits.max_characters);
            compose_ops::compose(&keys, max, json);
        }
        Command::Decompose { text, json } => compose_ops::decompose_cmd(&text, json),
        Command::Translate {
            text,
            from,
            to,
            service,
        } => service_ops::translate(&text, &from, &to, &service.into_one_shot()),
        Command::Correct {
            text,
            language,
            tone,
            service,
        } => service_ops::correct(&text, &language, &tone, &service.into_one_shot()),
        Command::SettingsExport => config_ops::settings_export(),
        Command::SettingsValidate { file } => config_ops::settings_validate(&file),
    }
}
