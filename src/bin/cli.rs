use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::{Map, Value};
use tokio::io::{AsyncBufReadExt, BufReader};

use cue_remote::error::AppError;
use cue_remote::paths;
use cue_remote::registry::{catalog, execute, ActionOutput};
use cue_remote::settings::{self, DeviceConfig};
use cue_remote::state::AppState;
use cue_remote::variables::VARIABLE_DEFINITIONS;

// ── CLI argument parsing ─────────────────────────────────────────

#[derive(Parser)]
#[command(name = "cue-remote-cli", about = "Send remote commands to the playback controller", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Device host, overriding the stored config for this process
    #[arg(long, global = true)]
    host: Option<String>,

    /// Directory holding config.json
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    /// Output raw JSON instead of formatted text
    #[arg(long, global = true)]
    json: bool,

    /// Debug logging (shows outgoing URLs)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List available actions, or the options of one action
    Actions { id: Option<String> },
    /// Run one action, e.g. `run intensity mode=increase step=26`
    Run {
        id: String,
        /// Option values as key=value pairs
        options: Vec<String>,
    },
    /// Read actions from stdin, one per line, in a single session so toggles carry over
    Shell,
    /// Show or change the stored configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the stored configuration
    Show,
    /// Store a new device host
    SetHost { host: String },
    /// Print the JSON schema of the configuration
    Schema,
}

// ── Option parsing ───────────────────────────────────────────────

/// Parse `key=value` pairs. Values that parse as JSON keep their type,
/// anything else is taken as a string.
fn parse_options<S: AsRef<str>>(pairs: &[S]) -> Result<Map<String, Value>, AppError> {
    let mut map = Map::new();
    for pair in pairs {
        let pair = pair.as_ref();
        let (key, raw) = pair
            .split_once('=')
            .ok_or_else(|| AppError::validation(format!("Expected key=value, got '{pair}'")))?;
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        map.insert(key.trim().to_string(), value);
    }
    Ok(map)
}

// ── Output ───────────────────────────────────────────────────────

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("Error: {e}"),
    }
}

fn print_output(output: &ActionOutput, raw: bool) {
    if raw {
        print_json(output);
    } else {
        println!("{}", output.message);
    }
}

// ── State initialization ─────────────────────────────────────────

fn initialize_state(cli: &Cli) -> Result<AppState, AppError> {
    let config_dir = cli.config_dir.clone().unwrap_or_else(paths::default_config_dir);
    let mut config = settings::load_config(&config_dir)?;
    if let Some(host) = &cli.host {
        config.host.clone_from(host);
    }
    Ok(AppState::with_http(config)?.with_config_dir(config_dir))
}

// ── Subcommands ──────────────────────────────────────────────────

async fn run_shell(state: &AppState, raw: bool) -> Result<(), AppError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((first, rest)) = words.split_first() else {
            continue;
        };
        match *first {
            "quit" | "exit" => break,
            "help" => println!("{}", catalog::help_text(&state.registry, rest.first().copied())),
            "vars" if raw => print_json(&state.variables.snapshot()),
            "vars" => {
                for def in VARIABLE_DEFINITIONS {
                    let value = state.variables.get(def.id).unwrap_or_default();
                    println!("{}: {value}", def.name);
                }
            }
            id => {
                let result = match parse_options(rest) {
                    Ok(options) => execute::execute(state, id, &options).await,
                    Err(e) => Err(e),
                };
                match result {
                    Ok(output) => print_output(&output, raw),
                    // A failed command does not end the session.
                    Err(e) => eprintln!("Error: {e}"),
                }
            }
        }
    }
    Ok(())
}

fn run_config(cli: &Cli, action: &ConfigAction) -> Result<(), AppError> {
    let config_dir = cli.config_dir.clone().unwrap_or_else(paths::default_config_dir);
    match action {
        ConfigAction::Show => {
            let config = settings::load_config(&config_dir)?;
            if cli.json {
                print_json(&config);
            } else if config.host.is_empty() {
                println!("host: (not configured)");
            } else {
                println!("host: {}", config.host);
            }
        }
        ConfigAction::SetHost { host } => {
            settings::save_config(&config_dir, &DeviceConfig::new(host.trim()))?;
            println!("Saved host to {}", paths::config_path(&config_dir).display());
        }
        ConfigAction::Schema => print_json(&settings::config_schema()),
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<(), AppError> {
    match &cli.command {
        Commands::Config { action } => run_config(&cli, action),
        Commands::Actions { id } => {
            let state = initialize_state(&cli)?;
            if cli.json {
                let json = match id {
                    Some(id) => serde_json::to_value(state.registry.get(id)?)?,
                    None => catalog::to_json(&state.registry),
                };
                print_json(&json);
            } else {
                println!("{}", catalog::help_text(&state.registry, id.as_deref()));
            }
            Ok(())
        }
        Commands::Run { id, options } => {
            let state = initialize_state(&cli)?;
            let options = parse_options(options)?;
            let output = execute::execute(&state, id, &options).await?;
            print_output(&output, cli.json);
            Ok(())
        }
        Commands::Shell => {
            let state = initialize_state(&cli)?;
            run_shell(&state, cli.json).await
        }
    }
}

// ── Main ─────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
