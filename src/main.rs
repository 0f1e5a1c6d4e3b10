//! Parchment - a paragraph-structured document served to an editing agent.
//!
//! # Usage
//!
//! ```bash
//! parchment                       # read commands from stdin
//! parchment --sample              # start from the sample document
//! parchment --load draft script.txt
//! ```

use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use parchment::config::{
    clear_config_flags, global_config_path, load_config_flags, local_override_path,
    parse_flag_tokens, save_config_flags, ConfigFlags,
};
use parchment::console::Console;
use parchment::editor::{DocumentHandle, TextBuffer};
use parchment::store::SaveStore;

/// Edit a server-held document through flat-index commands
#[derive(Parser, Debug)]
#[command(name = "parchment", version, about, long_about = None)]
struct Cli {
    /// Command script to run instead of reading stdin
    #[arg(value_name = "SCRIPT")]
    script: Option<PathBuf>,

    /// Start from the sample document instead of an empty one
    #[arg(long)]
    sample: bool,

    /// Load this save before running commands
    #[arg(long, value_name = "NAME")]
    load: Option<String>,

    /// Directory holding saved documents
    #[arg(long, value_name = "DIR")]
    saves_dir: Option<PathBuf>,

    /// Default bound for `wait` commands, in milliseconds
    #[arg(long, value_name = "MS")]
    wait_timeout_ms: Option<u64>,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = parse_flag_tokens(&raw_args);

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);

    let buffer = if effective.sample {
        TextBuffer::sample()
    } else {
        TextBuffer::new()
    };
    let handle = Arc::new(DocumentHandle::new(buffer));
    let store = SaveStore::new(effective.resolve_saves_dir());
    tracing::debug!(saves_dir = %store.root().display(), "store ready");

    if let Some(name) = &cli.load {
        store
            .load(name, &handle)
            .with_context(|| format!("Failed to load save '{name}'"))?;
    }

    let console = Console::new(handle, store).with_wait_timeout(effective.wait_timeout());
    let stdout = io::stdout();
    let result = match &cli.script {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open script {}", path.display()))?;
            console.run(BufReader::new(file), stdout.lock())
        }
        None => console.run(io::stdin().lock(), stdout.lock()),
    };
    result.context("Console error")
}
