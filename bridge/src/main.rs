//! Splash bridge
//!
//! Serves a shop database to the Splash sync engine from the command line:
//! schemas, listings, reads and writes of synchronized objects.
//!
//! Usage:
//!   splash-bridge --db shop.db list ThirdParty --max 20
//!   splash-bridge --db shop.db set ThirdParty --json '{"email":"a@b.com"}'

use std::path::PathBuf;
use anyhow::Result;
use clap::Parser;
use splash_bridge::{load_settings, Bridge, Command};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "splash-bridge")]
#[command(about = "Splash field-synchronization bridge")]
struct Args {
    /// Path to the shop database
    #[arg(long, default_value = "shop.db")]
    db: PathBuf,

    /// Path to a JSON settings file
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let default_level = if args.verbose { "debug" } else { "warn" };
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    let settings = load_settings(args.settings.as_deref())?;
    let bridge = Bridge::open(&args.db, settings)?;
    let output = bridge.run(args.command)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
