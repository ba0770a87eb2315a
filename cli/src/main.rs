use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

use commands::{Commands, SessionOptions};
use crate::config::AppConfig;

/// Crates whose events `--debug` turns on
const DEBUG_TARGETS: &[&str] = &[
    "tunniplaan",
    "tunniplaan_shared",
    "tunniplaan_tara",
    "tunniplaan_api",
];

#[derive(Parser, PartialEq, Debug)]
#[command(name = "tunniplaan")]
#[command(about = "Tahvel profile and timetable via TARA Smart-ID", long_about = None)]
struct Cli {
    /// National identity code for the Smart-ID login
    #[arg(long = "id-code")]
    id_code: Option<String>,

    /// Suppress the login handshake's log events
    #[arg(short = 'q', long = "quiet", default_value_t = false)]
    quiet: bool,

    /// Enable debug output
    #[arg(long = "debug", default_value_t = false)]
    debug: bool,

    /// Emit logs as JSON lines
    #[arg(long = "json-logs", default_value_t = false)]
    json_logs: bool,

    /// Path to the config file (default: ~/.tunniplaan/config.toml)
    #[arg(long = "config")]
    config_path: Option<String>,

    /// Try the cached session before logging in
    #[arg(long = "reuse-session", default_value_t = false)]
    reuse_session: bool,

    /// Do not cache the session after logging in
    #[arg(long = "no-save-session", default_value_t = false)]
    no_save_session: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl Cli {
    fn session_options(&self) -> SessionOptions {
        SessionOptions {
            quiet: self.quiet,
            reuse_session: self.reuse_session,
            no_save_session: self.no_save_session,
        }
    }
}

fn init_tracing(debug: bool, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if debug {
            let targets: Vec<String> = DEBUG_TARGETS
                .iter()
                .map(|target| format!("{}=debug", target))
                .collect();
            format!("warn,{}", targets.join(",")).into()
        } else {
            "warn".into()
        }
    });

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.debug, cli.json_logs);

    let config = match AppConfig::load(cli.config_path.as_deref()) {
        Ok(config) => config.with_id_code(cli.id_code.clone()),
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            std::process::exit(1);
        }
    };

    let options = cli.session_options();
    let command = cli.command.unwrap_or(Commands::User);

    if let Err(e) = command.run(config, options).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
