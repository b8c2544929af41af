//! Magic Mount console - state orchestration for the Magic Mount module manager
//!
//! This is the binary entry point. All logic lives in the library crates.

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

use mmui::{run_headless, HeadlessOptions};
use mmui_app::{config_dir, Endpoint};
use mmui_core::ThemeMode;

/// Magic Mount console - drives the console stores and prints NDJSON events
#[derive(Parser, Debug)]
#[command(name = "mmui")]
#[command(about = "State orchestration console for Magic Mount", long_about = None)]
struct Args {
    /// Config directory (defaults to $MMUI_CONFIG_DIR or the user config dir)
    #[arg(long, value_name = "DIR")]
    config_dir: Option<PathBuf>,

    /// Switch to this language after init
    #[arg(long, value_name = "CODE")]
    lang: Option<String>,

    /// Switch to this theme after init (auto, light, dark)
    #[arg(long, value_name = "MODE")]
    theme: Option<String>,

    /// Report the system as being in dark mode
    #[arg(long)]
    dark: bool,

    /// Keep refreshing logs silently until Ctrl-C
    #[arg(long)]
    poll: bool,

    /// Make a mock API endpoint fail (repeatable), e.g. --fail loadConfig
    #[arg(long, value_name = "ENDPOINT", value_parser = parse_endpoint)]
    fail: Vec<Endpoint>,
}

fn parse_endpoint(name: &str) -> Result<Endpoint, String> {
    Endpoint::from_name(name).ok_or_else(|| {
        let known: Vec<&str> = Endpoint::ALL.iter().map(|e| e.name()).collect();
        format!("unknown endpoint '{}', expected one of: {}", name, known.join(", "))
    })
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    // Stdout carries the event stream, so logs go to a file
    mmui_core::logging::init()?;

    let options = HeadlessOptions {
        config_dir: args.config_dir.unwrap_or_else(config_dir),
        lang: args.lang,
        theme: args.theme.as_deref().map(ThemeMode::parse),
        dark: args.dark,
        poll: args.poll,
        fail: args.fail,
    };

    let result = run_headless(options).await;
    if let Err(ref e) = result {
        error!("Application error: {:?}", e);
    }

    info!("Magic Mount console exiting");
    Ok(result?)
}
